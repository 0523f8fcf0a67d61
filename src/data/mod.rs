/// Data layer: grant records, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file, drop invalid rows → GrantDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterSelection → filtered GrantDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────────────────────────┐
///   │ stats / hierarchy / table     │  summary, sunburst, display rows
///   └──────────────────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │   view    │  render(dataset, selection) → DashboardView
///   └──────────┘
/// ```

pub mod filter;
pub mod format;
pub mod hierarchy;
pub mod loader;
pub mod model;
pub mod stats;
pub mod table;
pub mod view;
