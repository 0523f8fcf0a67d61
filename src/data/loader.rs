use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use arrow::array::{Array, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use calamine::{open_workbook_auto, Data, Reader};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::format::parse_currency;
use super::model::{GrantDataset, RawGrantRow, AMOUNT_COLUMN, REQUIRED_COLUMNS};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a data file could not be turned into a dataset.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("data file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),
    #[error("sheet '{sheet}' not found (available: {})", .available.join(", "))]
    MissingSheet { sheet: String, available: Vec<String> },
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("could not read {}: {source:#}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

/// A successfully loaded file.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub source: PathBuf,
    /// Data rows present in the file, before cleaning.
    pub rows_read: usize,
    pub dataset: GrantDataset,
}

impl LoadedData {
    pub fn rows_dropped(&self) -> usize {
        self.rows_read - self.dataset.len()
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load and clean a grants file. Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xls` – the worksheet named `sheet`
/// * `.csv`     – header row with the required column names
/// * `.json`    – `[{ "Top Level Primary Program": "...", ... }, ...]`
/// * `.parquet` – one column per required field
pub fn load_file(path: &Path, sheet: &str) -> Result<LoadedData, DataLoadError> {
    if !path.exists() {
        return Err(DataLoadError::NotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let rows = match ext.as_str() {
        "xlsx" | "xlsm" | "xls" => load_excel(path, sheet)?,
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(DataLoadError::UnsupportedFormat(other.to_string())),
    };

    let rows_read = rows.len();
    let dataset = GrantDataset::clean(rows);
    log::info!(
        "Loaded {} from {}: {} valid grants ({} rows dropped)",
        ext,
        path.display(),
        dataset.len(),
        rows_read - dataset.len()
    );
    Ok(LoadedData {
        source: path.to_path_buf(),
        rows_read,
        dataset,
    })
}

fn unreadable(path: &Path) -> impl FnOnce(anyhow::Error) -> DataLoadError + '_ {
    move |source| DataLoadError::Unreadable {
        path: path.to_path_buf(),
        source,
    }
}

// ---------------------------------------------------------------------------
// Cells and column resolution
// ---------------------------------------------------------------------------

/// A source cell before it is interpreted as text or amount.
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    fn into_text(self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => Some(s),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => Some(format!("{n:.0}")),
            Cell::Number(n) => Some(n.to_string()),
        }
    }

    /// Numeric amounts pass through; text is coerced, anything else is missing.
    fn into_amount(self) -> Option<f64> {
        match self {
            Cell::Empty => None,
            Cell::Number(n) => Some(n),
            Cell::Text(s) => parse_currency(&s),
        }
    }
}

/// Positions of the required columns within a source header.
#[derive(Debug)]
struct ColumnIndex([usize; REQUIRED_COLUMNS.len()]);

impl ColumnIndex {
    fn resolve<S: AsRef<str>>(headers: &[S]) -> Result<Self, DataLoadError> {
        let mut positions = [0; REQUIRED_COLUMNS.len()];
        let mut missing = Vec::new();
        for (slot, name) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
            match headers.iter().position(|h| h.as_ref() == name) {
                Some(idx) => *slot = idx,
                None => missing.push(name.to_string()),
            }
        }
        if missing.is_empty() {
            Ok(ColumnIndex(positions))
        } else {
            Err(DataLoadError::MissingColumns(missing))
        }
    }

    fn row(&self, mut cells: Vec<Cell>) -> RawGrantRow {
        let mut take = |i: usize| {
            cells
                .get_mut(self.0[i])
                .map(|c| std::mem::replace(c, Cell::Empty))
                .unwrap_or(Cell::Empty)
        };
        RawGrantRow {
            program: take(0).into_text(),
            strategy: take(1).into_text(),
            organization: take(2).into_text(),
            project_title: take(3).into_text(),
            request_id: take(4).into_text(),
            amount: take(5).into_amount(),
        }
    }
}

// ---------------------------------------------------------------------------
// Excel loader
// ---------------------------------------------------------------------------

fn load_excel(path: &Path, sheet: &str) -> Result<Vec<RawGrantRow>, DataLoadError> {
    let mut workbook = open_workbook_auto(path)
        .context("opening workbook")
        .map_err(unreadable(path))?;

    let available = workbook.sheet_names();
    if !available.iter().any(|name| name == sheet) {
        return Err(DataLoadError::MissingSheet {
            sheet: sheet.to_string(),
            available,
        });
    }

    let range = workbook
        .worksheet_range(sheet)
        .with_context(|| format!("reading sheet '{sheet}'"))
        .map_err(unreadable(path))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|header| header.iter().map(|c| c.to_string()).collect())
        .unwrap_or_default();
    let columns = ColumnIndex::resolve(&headers)?;

    Ok(rows
        .map(|row| columns.row(row.iter().map(excel_cell).collect()))
        .collect())
}

fn excel_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) => Cell::Text(s.clone()),
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Vec<RawGrantRow>, DataLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")
        .map_err(unreadable(path))?;

    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")
        .map_err(unreadable(path))?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let columns = ColumnIndex::resolve(&headers)?;

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result
            .with_context(|| format!("CSV row {row_no}"))
            .map_err(unreadable(path))?;
        let cells = record
            .iter()
            .map(|v| {
                if v.trim().is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(v.to_string())
                }
            })
            .collect();
        rows.push(columns.row(cells));
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')` layout.
fn load_json(path: &Path) -> Result<Vec<RawGrantRow>, DataLoadError> {
    let records = read_json_records(path).map_err(unreadable(path))?;

    let mut headers: Vec<String> = Vec::new();
    for obj in &records {
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }
    let columns = ColumnIndex::resolve(&headers)?;

    Ok(records
        .iter()
        .map(|obj| {
            let cells = headers
                .iter()
                .map(|h| obj.get(h).map(json_cell).unwrap_or(Cell::Empty))
                .collect();
            columns.row(cells)
        })
        .collect())
}

fn read_json_records(path: &Path) -> Result<Vec<serde_json::Map<String, JsonValue>>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;
    let JsonValue::Array(items) = root else {
        anyhow::bail!("Expected top-level JSON array");
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            JsonValue::Object(obj) => Ok(obj),
            _ => anyhow::bail!("Row {i} is not a JSON object"),
        })
        .collect()
}

fn json_cell(val: &JsonValue) -> Cell {
    match val {
        JsonValue::Null => Cell::Empty,
        JsonValue::String(s) => Cell::Text(s.clone()),
        JsonValue::Number(n) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Empty),
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Text columns may be any type Arrow can cast to Utf8. A string `Amount`
/// column is read as text and coerced like CSV; anything else is cast to
/// Float64 (values that do not fit become null).
fn load_parquet(path: &Path) -> Result<Vec<RawGrantRow>, DataLoadError> {
    let file = std::fs::File::open(path)
        .context("opening parquet file")
        .map_err(unreadable(path))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")
        .map_err(unreadable(path))?;

    let field_names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let columns = ColumnIndex::resolve(&field_names)?;
    let amount_target = amount_type(builder.schema().field(columns.0[5]).data_type());

    let reader = builder
        .build()
        .context("building parquet reader")
        .map_err(unreadable(path))?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result
            .context("reading parquet record batch")
            .map_err(unreadable(path))?;

        // Cast every required column up front, in REQUIRED_COLUMNS order.
        let mut cast_columns = Vec::with_capacity(REQUIRED_COLUMNS.len());
        for (&idx, name) in columns.0.iter().zip(REQUIRED_COLUMNS) {
            let target = if name == AMOUNT_COLUMN {
                amount_target.clone()
            } else {
                DataType::Utf8
            };
            let array = cast(batch.column(idx), &target)
                .with_context(|| format!("column '{name}' cannot be read as {target}"))
                .map_err(unreadable(path))?;
            cast_columns.push(array);
        }

        for row in 0..batch.num_rows() {
            let cells = cast_columns
                .iter()
                .map(|array| {
                    if array.is_null(row) {
                        Cell::Empty
                    } else if array.data_type() == &DataType::Float64 {
                        Cell::Number(array.as_primitive::<Float64Type>().value(row))
                    } else {
                        Cell::Text(array.as_string::<i32>().value(row).to_string())
                    }
                })
                .collect();
            rows.push(ColumnIndex([0, 1, 2, 3, 4, 5]).row(cells));
        }
    }
    Ok(rows)
}

fn amount_type(source: &DataType) -> DataType {
    match source {
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => DataType::Utf8,
        _ => DataType::Float64,
    }
}
