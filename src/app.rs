use std::time::Duration;

use eframe::egui::{self, ScrollArea};

use crate::config::DashboardConfig;
use crate::state::{AppState, Notice};
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct GrantSunburstApp {
    pub state: AppState,
}

impl GrantSunburstApp {
    /// Start the app and kick off the initial load of the configured file.
    pub fn new(config: DashboardConfig) -> Self {
        let data_file = config.data_file.clone();
        let mut state = AppState::new(config);
        state.begin_load(data_file);
        Self { state }
    }
}

impl eframe::App for GrantSunburstApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.poll_load();
        if self.state.is_loading() {
            // Keep polling the worker while the spinner shows.
            ctx.request_repaint_after(Duration::from_millis(50));
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: chart, metrics, table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(view) = &self.state.view else {
                ui.centered_and_justified(|ui| {
                    let msg = match &self.state.status {
                        Some(Notice::EmptyDataset(msg)) => msg.as_str(),
                        _ if self.state.is_loading() => "Updating data…",
                        _ => "Upload a grants file to begin  (File → Open…)",
                    };
                    ui.heading(msg);
                });
                return;
            };

            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    plot::sunburst(ui, view);
                    ui.separator();
                    panels::metrics(ui, &view.stats);
                    ui.separator();
                    plot::strategy_bars(ui, view);
                    ui.separator();
                    table::grants_table(ui, &view.table);
                });
        });
    }
}
