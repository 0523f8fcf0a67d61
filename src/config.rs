use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::format::LinkTemplate;
use crate::data::table::EXPORT_FILE_NAME;

/// Looked up in the working directory at startup.
pub const CONFIG_FILE: &str = "grant-sunburst.json";

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Settings read from [`CONFIG_FILE`]; every field is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Data file loaded at startup.
    pub data_file: PathBuf,
    /// Worksheet read from spreadsheet files.
    pub sheet_name: String,
    pub links: LinkTemplate,
    pub export_file_name: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("default_grants_data.xlsx"),
            sheet_name: "2024 Grants GMS Export".into(),
            links: LinkTemplate::default(),
            export_file_name: EXPORT_FILE_NAME.into(),
        }
    }
}

impl DashboardConfig {
    /// Parse a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// Config file (if present) → env vars → first CLI argument.
    /// A broken config file is logged and ignored.
    pub fn resolve(config_path: &Path, cli_data_file: Option<PathBuf>) -> Self {
        let mut config = Self::from_file_or_default(config_path);
        config.apply_overrides(Overrides {
            data_file: std::env::var_os("GRANTS_DATA_FILE").map(PathBuf::from),
            sheet_name: std::env::var("GRANTS_SHEET_NAME").ok(),
            cli_data_file,
        });
        log::debug!("Resolved config: {config:?}");
        config
    }

    fn from_file_or_default(config_path: &Path) -> Self {
        if !config_path.exists() {
            return Self::default();
        }
        Self::from_file(config_path).unwrap_or_else(|e| {
            log::warn!("Ignoring config: {e:#}");
            Self::default()
        })
    }

    /// The CLI data file wins over the environment.
    fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(file) = overrides.cli_data_file.or(overrides.data_file) {
            self.data_file = file;
        }
        if let Some(sheet) = overrides.sheet_name {
            self.sheet_name = sheet;
        }
    }
}

/// Values layered over the config file.
#[derive(Debug, Default)]
struct Overrides {
    data_file: Option<PathBuf>,
    sheet_name: Option<String>,
    cli_data_file: Option<PathBuf>,
}
