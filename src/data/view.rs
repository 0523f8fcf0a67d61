use super::filter::{apply_filter, filter_options, FilterOptions, FilterSelection};
use super::format::LinkTemplate;
use super::hierarchy::{
    amount_by_strategy, build_hierarchy, layout, SunburstSegment, SunburstTree,
};
use super::model::GrantDataset;
use super::stats::StatsComparison;
use super::table::{build_table, DisplayRow};

/// Everything the dashboard draws for one selection.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub selection: FilterSelection,
    pub options: FilterOptions,
    pub chart: SunburstTree,
    pub segments: Vec<SunburstSegment>,
    pub strategy_totals: Vec<(String, f64)>,
    pub stats: StatsComparison,
    pub table: Vec<DisplayRow>,
}

/// Recompute the whole view from the full dataset and the selection.
pub fn render(
    dataset: &GrantDataset,
    selection: &FilterSelection,
    links: &LinkTemplate,
) -> DashboardView {
    let filtered = apply_filter(dataset, selection);
    let chart = build_hierarchy(&filtered, links);
    log::debug!(
        "Rendered {} / {} grants for program={} strategy={}",
        filtered.len(),
        dataset.len(),
        selection.program,
        selection.strategy
    );
    DashboardView {
        selection: selection.clone(),
        options: filter_options(dataset, &selection.program),
        segments: layout(&chart),
        chart,
        strategy_totals: amount_by_strategy(&filtered),
        stats: StatsComparison::new(dataset, &filtered),
        table: build_table(&filtered, links),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::Choice;
    use crate::data::model::tests::sample_dataset;

    #[test]
    fn view_is_consistent_across_parts() {
        let ds = sample_dataset();
        let selection = FilterSelection::new(Choice::only("ProgA"), Choice::All);
        let view = render(&ds, &selection, &LinkTemplate::default());

        assert_eq!(view.table.len(), 2);
        assert_eq!(view.stats.filtered.count, view.table.len());
        assert_eq!(view.chart.total, view.stats.filtered.total);
        assert_eq!(view.stats.all.count, 3);
        assert_eq!(view.options.strategies.len(), 2);
        assert_eq!(view.strategy_totals.len(), 2);
    }

    #[test]
    fn rendering_twice_gives_the_same_view() {
        let ds = sample_dataset();
        let selection = FilterSelection::new(Choice::All, Choice::only("Strat1"));
        let links = LinkTemplate::default();
        assert_eq!(render(&ds, &selection, &links), render(&ds, &selection, &links));
    }

    #[test]
    fn empty_selection_renders_no_data() {
        let ds = sample_dataset();
        let selection = FilterSelection::new(Choice::only("ProgB"), Choice::only("Strat2"));
        let view = render(&ds, &selection, &LinkTemplate::default());
        assert!(view.table.is_empty());
        assert!(view.segments.is_empty());
        assert_eq!(view.stats.filtered.median, None);
        assert_eq!(view.stats.filtered.mean, None);
    }
}
