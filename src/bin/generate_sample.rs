use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;

const COLUMNS: [&str; 6] = [
    "Top Level Primary Program",
    "Primary Strategy",
    "Organization: Organization Name",
    "Project Title",
    "Request: ID",
    "Amount",
];

const PROGRAMS: [(&str, &[&str]); 4] = [
    ("Education", &["Deeper Learning", "Open Education", "Student Voice"]),
    ("Environment", &["Climate", "Western Conservation", "Energy"]),
    ("Global Development", &["Gender Equity", "Transparency", "Evidence"]),
    ("Performing Arts", &["Arts Education", "Continuing Excellence"]),
];

const ORG_PREFIXES: [&str; 6] = [
    "Center for",
    "Institute of",
    "Alliance for",
    "Fund for",
    "Friends of",
    "Council on",
];
const ORG_SUBJECTS: [&str; 6] = [
    "Civic Learning",
    "Clean Air",
    "Open Data",
    "Rural Futures",
    "Public Media",
    "Fair Budgets",
];
const PROJECT_KINDS: [&str; 5] = [
    "General Support",
    "Research Program",
    "Capacity Building",
    "Pilot Initiative",
    "Convening",
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// Grant sizes are heavily skewed: log-uniform between 10k and 5M.
    fn amount(&mut self) -> f64 {
        let exp = 4.0 + self.next_f64() * (6.7 - 4.0);
        (10f64.powf(exp) / 100.0).round() * 100.0
    }
}

struct Row {
    program: Option<String>,
    strategy: Option<String>,
    organization: Option<String>,
    title: Option<String>,
    request_id: Option<String>,
    amount: Option<f64>,
}

fn generate(rng: &mut SimpleRng, n: usize) -> Vec<Row> {
    (0..n)
        .map(|i| {
            let (program, strategies) = PROGRAMS[i % PROGRAMS.len()];
            let organization = format!(
                "{} {}",
                rng.pick(&ORG_PREFIXES),
                rng.pick(&ORG_SUBJECTS)
            );
            let mut row = Row {
                program: Some(program.to_string()),
                strategy: Some(rng.pick(strategies).to_string()),
                organization: Some(organization),
                title: Some(format!("{} {}", rng.pick(&PROJECT_KINDS), 2024 + i % 3)),
                request_id: Some(format!("a0B{:012X}", rng.next_u64() & 0xFFFF_FFFF_FFFF)),
                amount: Some(rng.amount()),
            };
            // A few rows the dashboard must drop.
            match i % 50 {
                7 => row.amount = Some(0.0),
                19 => row.organization = None,
                31 => row.amount = None,
                _ => {}
            }
            row
        })
        .collect()
}

fn write_csv(rows: &[Row], path: &str) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record(COLUMNS)?;
    for row in rows {
        writer.write_record([
            row.program.clone().unwrap_or_default(),
            row.strategy.clone().unwrap_or_default(),
            row.organization.clone().unwrap_or_default(),
            row.title.clone().unwrap_or_default(),
            row.request_id.clone().unwrap_or_default(),
            row.amount.map(|a| a.to_string()).unwrap_or_default(),
        ])?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(rows: &[Row], path: &str) -> Result<RecordBatch> {
    let text = |f: fn(&Row) -> &Option<String>| -> ArrayRef {
        Arc::new(StringArray::from(
            rows.iter().map(|r| f(r).as_deref()).collect::<Vec<_>>(),
        ))
    };

    let mut fields: Vec<Field> = COLUMNS[..5]
        .iter()
        .map(|name| Field::new(*name, DataType::Utf8, true))
        .collect();
    fields.push(Field::new(COLUMNS[5], DataType::Float64, true));
    let schema = Arc::new(Schema::new(fields));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            text(|r| &r.program),
            text(|r| &r.strategy),
            text(|r| &r.organization),
            text(|r| &r.title),
            text(|r| &r.request_id),
            Arc::new(Float64Array::from(
                rows.iter().map(|r| r.amount).collect::<Vec<_>>(),
            )),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer =
        ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(batch)
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(2024);
    let rows = generate(&mut rng, 400);

    write_csv(&rows, "sample_grants.csv")?;
    let batch = write_parquet(&rows, "sample_grants.parquet")?;

    println!("{}", pretty_format_batches(&[batch.slice(0, 5)])?);
    println!(
        "Wrote {} grants to sample_grants.csv and sample_grants.parquet",
        rows.len()
    );
    Ok(())
}
