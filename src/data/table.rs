use std::io::Write;
use std::path::Path;

use thiserror::Error;

use super::format::{format_currency, html_anchor, LinkTemplate};
use super::model::{
    GrantDataset, AMOUNT_COLUMN, ORGANIZATION_COLUMN, PROGRAM_COLUMN, STRATEGY_COLUMN,
};

/// Header of the link-bearing project title column.
pub const LINK_COLUMN: &str = "Salesforce Link";

/// Display and export column order.
pub const TABLE_COLUMNS: [&str; 5] = [
    PROGRAM_COLUMN,
    STRATEGY_COLUMN,
    ORGANIZATION_COLUMN,
    LINK_COLUMN,
    AMOUNT_COLUMN,
];

/// Default name offered when saving the export.
pub const EXPORT_FILE_NAME: &str = "filtered_data.csv";

// ---------------------------------------------------------------------------
// Display rows
// ---------------------------------------------------------------------------

/// One row of the filtered data table. The request identifier is gone;
/// only the link built from it remains.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRow {
    pub program: String,
    pub strategy: String,
    pub organization: String,
    pub project_title: String,
    pub link: String,
    /// Numeric amount, for anything that computes.
    pub amount: f64,
    /// Currency text, for display and export.
    pub amount_display: String,
}

impl DisplayRow {
    /// Cells in [`TABLE_COLUMNS`] order, as exported.
    pub fn export_cells(&self) -> [String; 5] {
        [
            self.program.clone(),
            self.strategy.clone(),
            self.organization.clone(),
            html_anchor(&self.link, &self.project_title),
            self.amount_display.clone(),
        ]
    }
}

/// Build the table rows: generate each link first, then leave the raw
/// identifier behind.
pub fn build_table(dataset: &GrantDataset, links: &LinkTemplate) -> Vec<DisplayRow> {
    dataset
        .records()
        .iter()
        .map(|r| DisplayRow {
            link: links.url_for(&r.request_id),
            program: r.program.clone(),
            strategy: r.strategy.clone(),
            organization: r.organization.clone(),
            project_title: r.project_title.clone(),
            amount: r.amount,
            amount_display: format_currency(r.amount),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("could not write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("could not write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Serialise rows as CSV into any writer.
fn write_csv<W: Write>(rows: &[DisplayRow], writer: W) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(TABLE_COLUMNS)?;
    for row in rows {
        csv_writer.write_record(row.export_cells())?;
    }
    csv_writer.flush().map_err(|source| ExportError::Io {
        path: "<writer>".into(),
        source,
    })?;
    Ok(())
}

/// CSV export as an in-memory UTF-8 string.
pub fn to_csv(rows: &[DisplayRow]) -> Result<String, ExportError> {
    let mut buf = Vec::new();
    write_csv(rows, &mut buf)?;
    // csv only ever writes the UTF-8 it was given.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write the export to `path` as UTF-8.
pub fn export_csv(rows: &[DisplayRow], path: &Path) -> Result<(), ExportError> {
    let text = to_csv(rows)?;
    std::fs::write(path, text).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    log::info!("Exported {} rows to {}", rows.len(), path.display());
    Ok(())
}
