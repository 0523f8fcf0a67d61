use super::stats;

// ---------------------------------------------------------------------------
// Source column names (exact match, case-sensitive)
// ---------------------------------------------------------------------------

pub const PROGRAM_COLUMN: &str = "Top Level Primary Program";
pub const STRATEGY_COLUMN: &str = "Primary Strategy";
pub const ORGANIZATION_COLUMN: &str = "Organization: Organization Name";
pub const PROJECT_TITLE_COLUMN: &str = "Project Title";
pub const REQUEST_ID_COLUMN: &str = "Request: ID";
pub const AMOUNT_COLUMN: &str = "Amount";

/// Every column a source must provide, in source order.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    PROGRAM_COLUMN,
    STRATEGY_COLUMN,
    ORGANIZATION_COLUMN,
    PROJECT_TITLE_COLUMN,
    REQUEST_ID_COLUMN,
    AMOUNT_COLUMN,
];

// ---------------------------------------------------------------------------
// RawGrantRow – one source row before cleaning
// ---------------------------------------------------------------------------

/// A row exactly as read from the source. Every cell may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGrantRow {
    pub program: Option<String>,
    pub strategy: Option<String>,
    pub organization: Option<String>,
    pub project_title: Option<String>,
    pub request_id: Option<String>,
    pub amount: Option<f64>,
}

impl RawGrantRow {
    /// Promote to a [`GrantRecord`] if every field is present and the
    /// amount is a positive finite number. Values are never altered.
    pub fn into_record(self) -> Option<GrantRecord> {
        let amount = self.amount.filter(|a| a.is_finite() && *a > 0.0)?;
        Some(GrantRecord {
            program: present(self.program)?,
            strategy: present(self.strategy)?,
            organization: present(self.organization)?,
            project_title: present(self.project_title)?,
            request_id: present(self.request_id)?,
            amount,
        })
    }
}

/// Blank cells count as missing, the same as empty spreadsheet cells.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl From<&GrantRecord> for RawGrantRow {
    fn from(record: &GrantRecord) -> Self {
        RawGrantRow {
            program: Some(record.program.clone()),
            strategy: Some(record.strategy.clone()),
            organization: Some(record.organization.clone()),
            project_title: Some(record.project_title.clone()),
            request_id: Some(record.request_id.clone()),
            amount: Some(record.amount),
        }
    }
}

// ---------------------------------------------------------------------------
// GrantRecord – one valid grant
// ---------------------------------------------------------------------------

/// A single validated grant.
#[derive(Debug, Clone, PartialEq)]
pub struct GrantRecord {
    pub program: String,
    pub strategy: String,
    pub organization: String,
    pub project_title: String,
    /// Only used to build the external reference link.
    pub request_id: String,
    pub amount: f64,
}

// ---------------------------------------------------------------------------
// GrantDataset – an immutable collection of valid grants
// ---------------------------------------------------------------------------

/// Valid grants in source order, with median and mean computed up front.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GrantDataset {
    records: Vec<GrantRecord>,
    median: Option<f64>,
    mean: Option<f64>,
}

impl GrantDataset {
    /// Build from records that are already known to be valid.
    pub fn from_records(records: Vec<GrantRecord>) -> Self {
        let amounts: Vec<f64> = records.iter().map(|r| r.amount).collect();
        GrantDataset {
            median: stats::median(&amounts),
            mean: stats::mean(&amounts),
            records,
        }
    }

    /// Drop every row with a missing field or a non-positive amount.
    pub fn clean<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = RawGrantRow>,
    {
        Self::from_records(
            rows.into_iter()
                .filter_map(RawGrantRow::into_record)
                .collect(),
        )
    }

    pub fn records(&self) -> &[GrantRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn median(&self) -> Option<f64> {
        self.median
    }

    pub fn mean(&self) -> Option<f64> {
        self.mean
    }

    pub fn total(&self) -> f64 {
        self.records.iter().map(|r| r.amount).sum()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(
        program: &str,
        strategy: &str,
        organization: &str,
        title: &str,
        id: &str,
        amount: f64,
    ) -> GrantRecord {
        GrantRecord {
            program: program.into(),
            strategy: strategy.into(),
            organization: organization.into(),
            project_title: title.into(),
            request_id: id.into(),
            amount,
        }
    }

    /// The three-grant dataset used throughout the pipeline tests.
    pub(crate) fn sample_dataset() -> GrantDataset {
        GrantDataset::from_records(vec![
            record("ProgA", "Strat1", "OrgX", "Proj1", "R1", 100.0),
            record("ProgA", "Strat2", "OrgY", "Proj2", "R2", 300.0),
            record("ProgB", "Strat1", "OrgZ", "Proj3", "R3", 200.0),
        ])
    }

    fn raw(record: &GrantRecord) -> RawGrantRow {
        RawGrantRow::from(record)
    }

    #[test]
    fn clean_drops_zero_amount_and_missing_organization() {
        let good = record("ProgA", "Strat1", "OrgX", "Proj1", "R1", 100.0);
        let zero = raw(&record("ProgA", "Strat1", "OrgX", "Proj2", "R2", 0.0));
        let mut no_org = raw(&record("ProgA", "Strat1", "OrgX", "Proj3", "R3", 50.0));
        no_org.organization = None;

        let ds = GrantDataset::clean(vec![raw(&good), zero, no_org]);
        assert_eq!(ds.records(), &[good]);
    }

    #[test]
    fn clean_rejects_negative_nan_blank_and_missing_amount() {
        let base = record("P", "S", "O", "T", "R", 10.0);
        let mut negative = raw(&base);
        negative.amount = Some(-5.0);
        let mut nan = raw(&base);
        nan.amount = Some(f64::NAN);
        let mut missing = raw(&base);
        missing.amount = None;
        let mut blank_title = raw(&base);
        blank_title.project_title = Some("   ".into());
        let mut no_id = raw(&base);
        no_id.request_id = None;

        let ds = GrantDataset::clean(vec![negative, nan, missing, blank_title, no_id]);
        assert!(ds.is_empty());
        assert_eq!(ds.median(), None);
        assert_eq!(ds.mean(), None);
    }

    #[test]
    fn clean_preserves_valid_rows_unchanged_and_in_order() {
        let ds = sample_dataset();
        let rows: Vec<RawGrantRow> = ds.records().iter().map(raw).collect();
        let cleaned = GrantDataset::clean(rows);
        assert_eq!(cleaned, ds);
    }

    #[test]
    fn clean_is_idempotent() {
        let mut rows: Vec<RawGrantRow> = sample_dataset().records().iter().map(raw).collect();
        rows.push(RawGrantRow::default());
        rows.push(RawGrantRow {
            amount: Some(0.0),
            ..raw(&record("P", "S", "O", "T", "R", 1.0))
        });

        let once = GrantDataset::clean(rows);
        let twice = GrantDataset::clean(once.records().iter().map(raw).collect::<Vec<_>>());
        assert_eq!(once, twice);
    }

    #[test]
    fn dataset_caches_summary_scalars() {
        let ds = sample_dataset();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.total(), 600.0);
        assert_eq!(ds.median(), Some(200.0));
        assert_eq!(ds.mean(), Some(200.0));
    }
}
