use super::model::GrantDataset;

// ---------------------------------------------------------------------------
// Scalar helpers
// ---------------------------------------------------------------------------

/// Median of `values`; `None` when there is nothing to take the median of.
/// An even count averages the two middle values.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Arithmetic mean; `None` for an empty slice rather than NaN.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

// ---------------------------------------------------------------------------
// SummaryStats
// ---------------------------------------------------------------------------

/// Count, sum, median and mean of grant amounts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryStats {
    pub count: usize,
    pub total: f64,
    pub median: Option<f64>,
    pub mean: Option<f64>,
}

impl SummaryStats {
    pub fn of(dataset: &GrantDataset) -> Self {
        SummaryStats {
            count: dataset.len(),
            total: dataset.total(),
            median: dataset.median(),
            mean: dataset.mean(),
        }
    }
}

/// Statistics for the whole dataset and the filtered subset, side by side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsComparison {
    pub all: SummaryStats,
    pub filtered: SummaryStats,
}

impl StatsComparison {
    pub fn new(all: &GrantDataset, filtered: &GrantDataset) -> Self {
        StatsComparison {
            all: SummaryStats::of(all),
            filtered: SummaryStats::of(filtered),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{apply_filter, Choice, FilterSelection};
    use crate::data::model::tests::sample_dataset;

    #[test]
    fn median_handles_odd_and_even_counts() {
        assert_eq!(median(&[300.0, 100.0, 200.0]), Some(200.0));
        assert_eq!(median(&[100.0, 300.0]), Some(200.0));
        assert_eq!(median(&[7.5]), Some(7.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn mean_of_empty_is_absent() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 6.0]), Some(3.0));
    }

    #[test]
    fn empty_dataset_reports_no_data() {
        let stats = SummaryStats::of(&GrantDataset::default());
        assert_eq!(stats.count, 0);
        assert_eq!(stats.total, 0.0);
        assert_eq!(stats.median, None);
        assert_eq!(stats.mean, None);
    }

    #[test]
    fn program_filter_example() {
        let all = sample_dataset();
        let selection = FilterSelection::new(Choice::only("ProgA"), Choice::All);
        let filtered = apply_filter(&all, &selection);
        let cmp = StatsComparison::new(&all, &filtered);

        assert_eq!(cmp.filtered.count, 2);
        assert_eq!(cmp.filtered.total, 400.0);
        assert_eq!(cmp.filtered.median, Some(200.0));
        assert_eq!(cmp.filtered.mean, Some(200.0));
        assert_eq!(cmp.all.count, 3);
        assert_eq!(cmp.all.total, 600.0);
    }

    #[test]
    fn comparison_keeps_whole_dataset_when_filter_matches_nothing() {
        let all = sample_dataset();
        let selection = FilterSelection::new(Choice::only("ProgB"), Choice::only("Strat2"));
        let filtered = apply_filter(&all, &selection);
        let cmp = StatsComparison::new(&all, &filtered);

        assert_eq!(cmp.filtered.count, 0);
        assert_eq!(cmp.filtered.median, None);
        assert_eq!(cmp.all.median, Some(200.0));
    }
}
