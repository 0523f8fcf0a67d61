mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use std::path::PathBuf;

use app::GrantSunburstApp;
use clap::Parser;
use config::{DashboardConfig, CONFIG_FILE};
use eframe::egui;

/// Interactive grants dashboard.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Grants file to load at startup (.xlsx, .csv, .json or .parquet)
    data_file: Option<PathBuf>,

    /// Dashboard settings file
    #[arg(long, default_value = CONFIG_FILE)]
    config: PathBuf,
}

fn main() -> eframe::Result {
    env_logger::init();

    let args = Args::parse();
    let config = DashboardConfig::resolve(&args.config, args.data_file);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Dynamic Sunburst Diagram of 2024 Grants",
        options,
        Box::new(|_cc| Ok(Box::new(GrantSunburstApp::new(config)))),
    )
}
