use std::collections::BTreeSet;
use std::fmt;

use super::model::{GrantDataset, GrantRecord};

// ---------------------------------------------------------------------------
// Choice – one selector's value
// ---------------------------------------------------------------------------

/// Label shown for the "no constraint" entry of a selector.
pub const ALL_LABEL: &str = "All";

/// A single selector value: either no constraint, or one exact category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Choice {
    #[default]
    All,
    Only(String),
}

impl Choice {
    pub fn only(value: impl Into<String>) -> Self {
        Choice::Only(value.into())
    }

    /// Whether `value` passes this constraint.
    pub fn admits(&self, value: &str) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(wanted) => wanted == value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Choice::All)
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::All => write!(f, "{ALL_LABEL}"),
            Choice::Only(v) => write!(f, "{v}"),
        }
    }
}

// ---------------------------------------------------------------------------
// FilterSelection – session-scoped selector state
// ---------------------------------------------------------------------------

/// The program and strategy currently selected by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub program: Choice,
    pub strategy: Choice,
}

impl FilterSelection {
    pub fn new(program: Choice, strategy: Choice) -> Self {
        FilterSelection { program, strategy }
    }

    pub fn matches(&self, record: &GrantRecord) -> bool {
        self.program.admits(&record.program) && self.strategy.admits(&record.strategy)
    }

    /// Back to `(All, All)`.
    pub fn reset(&mut self) {
        *self = FilterSelection::default();
    }

    /// Change the program. A strategy that never co-occurs with the new
    /// program falls back to `All`.
    pub fn set_program(&mut self, program: Choice, dataset: &GrantDataset) {
        self.program = program;
        if let Choice::Only(strategy) = &self.strategy {
            let options = filter_options(dataset, &self.program);
            if !options.strategies.contains(strategy) {
                self.strategy = Choice::All;
            }
        }
    }

    /// Change the strategy; the program is left alone.
    pub fn set_strategy(&mut self, strategy: Choice) {
        self.strategy = strategy;
    }
}

// ---------------------------------------------------------------------------
// Selector options
// ---------------------------------------------------------------------------

/// Distinct values offered by the two selectors (excluding "All").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub programs: BTreeSet<String>,
    /// Only strategies that co-occur with the selected program.
    pub strategies: BTreeSet<String>,
}

/// Enumerate selector values for the given program choice.
pub fn filter_options(dataset: &GrantDataset, program: &Choice) -> FilterOptions {
    let mut options = FilterOptions::default();
    for record in dataset.records() {
        options.programs.insert(record.program.clone());
        if program.admits(&record.program) {
            options.strategies.insert(record.strategy.clone());
        }
    }
    options
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Return a new dataset with only the records matching `selection`.
pub fn apply_filter(dataset: &GrantDataset, selection: &FilterSelection) -> GrantDataset {
    if selection.program.is_all() && selection.strategy.is_all() {
        return dataset.clone();
    }
    GrantDataset::from_records(
        dataset
            .records()
            .iter()
            .filter(|r| selection.matches(r))
            .cloned()
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::{record, sample_dataset};

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn all_all_returns_same_records() {
        let ds = sample_dataset();
        let filtered = apply_filter(&ds, &FilterSelection::default());
        assert_eq!(filtered, ds);
    }

    #[test]
    fn program_filter_keeps_first_two_records() {
        let ds = sample_dataset();
        let selection = FilterSelection::new(Choice::only("ProgA"), Choice::All);
        let filtered = apply_filter(&ds, &selection);
        assert_eq!(filtered.records(), &ds.records()[..2]);
    }

    #[test]
    fn program_and_strategy_are_conjunctive() {
        let ds = sample_dataset();
        let selection = FilterSelection::new(Choice::only("ProgA"), Choice::only("Strat1"));
        let filtered = apply_filter(&ds, &selection);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.records()[0].request_id, "R1");

        let strategy_only = FilterSelection::new(Choice::All, Choice::only("Strat1"));
        let kept = apply_filter(&ds, &strategy_only);
        let ids: Vec<&str> = kept
            .records()
            .iter()
            .map(|r| r.request_id.as_str())
            .collect();
        assert_eq!(ids, ["R1", "R3"]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let ds = sample_dataset();
        let selection = FilterSelection::new(Choice::only("ProgA"), Choice::only("Strat2"));
        let once = apply_filter(&ds, &selection);
        let twice = apply_filter(&once, &selection);
        assert_eq!(once, twice);
    }

    #[test]
    fn strategy_options_follow_program() {
        let ds = sample_dataset();

        let all = filter_options(&ds, &Choice::All);
        assert_eq!(all.programs, set(&["ProgA", "ProgB"]));
        assert_eq!(all.strategies, set(&["Strat1", "Strat2"]));

        let prog_a = filter_options(&ds, &Choice::only("ProgA"));
        assert_eq!(prog_a.programs, set(&["ProgA", "ProgB"]));
        assert_eq!(prog_a.strategies, set(&["Strat1", "Strat2"]));

        let prog_b = filter_options(&ds, &Choice::only("ProgB"));
        assert_eq!(prog_b.strategies, set(&["Strat1"]));
    }

    #[test]
    fn strategy_options_equal_distinct_strategies_of_program() {
        let ds = GrantDataset::from_records(vec![
            record("P1", "S3", "O", "T1", "1", 1.0),
            record("P2", "S1", "O", "T2", "2", 1.0),
            record("P1", "S2", "O", "T3", "3", 1.0),
            record("P1", "S3", "O", "T4", "4", 1.0),
        ]);
        for program in ["P1", "P2"] {
            let expected: BTreeSet<String> = ds
                .records()
                .iter()
                .filter(|r| r.program == program)
                .map(|r| r.strategy.clone())
                .collect();
            let options = filter_options(&ds, &Choice::only(program));
            assert_eq!(options.strategies, expected);
        }
    }

    #[test]
    fn unknown_program_has_no_strategies() {
        let options = filter_options(&sample_dataset(), &Choice::only("Nope"));
        assert!(options.strategies.is_empty());
    }

    #[test]
    fn changing_program_drops_impossible_strategy() {
        let ds = sample_dataset();
        let mut selection = FilterSelection::new(Choice::only("ProgA"), Choice::only("Strat2"));

        selection.set_program(Choice::only("ProgB"), &ds);
        assert_eq!(selection.strategy, Choice::All);

        selection.set_strategy(Choice::only("Strat1"));
        selection.set_program(Choice::only("ProgA"), &ds);
        assert_eq!(selection.strategy, Choice::only("Strat1"));
    }

    #[test]
    fn reset_returns_to_all_all() {
        let mut selection = FilterSelection::new(Choice::only("ProgA"), Choice::only("Strat1"));
        selection.reset();
        assert_eq!(selection, FilterSelection::default());
        assert_eq!(selection.program.to_string(), "All");
    }
}
