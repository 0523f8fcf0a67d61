use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::filter::{Choice, ALL_LABEL};
use crate::data::format::{format_currency, format_optional_currency};
use crate::data::stats::StatsComparison;
use crate::state::{AppState, Notice};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter Options");
    ui.separator();

    let Some(view) = &state.view else {
        ui.label("No dataset loaded.");
        ui.add_space(8.0);
        data_buttons(ui, state);
        return;
    };

    // Clone what we need so we can mutate state after the widgets.
    let selection = view.selection.clone();
    let options = view.options.clone();

    ui.strong("Select Top Level Program:");
    let program = choice_combo(ui, "program", &selection.program, &options.programs);
    if let Some(program) = program {
        log::debug!("Program selected: {program}");
        state.set_program(program);
    }
    ui.add_space(6.0);

    ui.strong("Select Primary Strategy:");
    let strategy = choice_combo(
        ui,
        "strategy",
        &selection.strategy,
        &options.strategies,
    );
    if let Some(strategy) = strategy {
        log::debug!("Strategy selected: {strategy}");
        state.set_strategy(strategy);
    }
    ui.add_space(6.0);

    if ui.button("Reset Filters").clicked() {
        state.reset_filters();
    }

    ui.separator();
    data_buttons(ui, state);
}

/// Single-choice selector with a leading "All" entry.
/// Returns the newly picked value, if the user changed it.
fn choice_combo<'a>(
    ui: &mut Ui,
    id: &str,
    current: &Choice,
    values: impl IntoIterator<Item = &'a String>,
) -> Option<Choice> {
    let mut picked = None;
    egui::ComboBox::from_id_salt(id)
        .selected_text(current.to_string())
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            if ui.selectable_label(current.is_all(), ALL_LABEL).clicked() {
                picked = Some(Choice::All);
            }
            for value in values {
                let is_current = matches!(current, Choice::Only(v) if v == value);
                if ui.selectable_label(is_current, value).clicked() {
                    picked = Some(Choice::only(value.clone()));
                }
            }
        });
    picked.filter(|p| p != current)
}

fn data_buttons(ui: &mut Ui, state: &mut AppState) {
    ui.add_enabled_ui(!state.is_loading(), |ui: &mut Ui| {
        if ui.button("Upload the Grants Excel File…").clicked() {
            open_file_dialog(state);
        }
    });
    let can_export = state.view.as_ref().is_some_and(|v| !v.table.is_empty());
    ui.add_enabled_ui(can_export, |ui: &mut Ui| {
        if ui.button("Download Filtered Data as CSV").clicked() {
            save_file_dialog(state);
        }
    });
    if let Some(source) = &state.source {
        ui.add_space(4.0);
        ui.label(RichText::new(format!("Source: {}", source.display())).weak().small());
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Export CSV…").clicked() {
                save_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(path) = state.loading_path() {
            ui.spinner();
            ui.label(format!("Loading {}…", path.display()));
        } else if let (Some(ds), Some(view)) = (&state.dataset, &state.view) {
            ui.label(format!(
                "{} grants loaded, {} visible",
                ds.len(),
                view.table.len()
            ));
        }

        ui.separator();

        match &state.status {
            Some(Notice::Error(msg)) => {
                ui.label(RichText::new(msg).color(Color32::RED));
            }
            Some(Notice::EmptyDataset(msg)) => {
                ui.label(RichText::new(msg).color(Color32::YELLOW));
            }
            Some(Notice::Info(msg)) => {
                ui.label(msg);
            }
            None => {}
        }
    });
}

// ---------------------------------------------------------------------------
// Summary metrics
// ---------------------------------------------------------------------------

/// Filtered totals, then median and mean for all grants beside the filtered set.
pub fn metrics(ui: &mut Ui, stats: &StatsComparison) {
    egui::Grid::new("metrics")
        .num_columns(2)
        .spacing([48.0, 12.0])
        .show(ui, |ui: &mut Ui| {
            metric(ui, "Total Records", stats.filtered.count.to_string());
            metric(ui, "Total Amount", format_currency(stats.filtered.total));
            ui.end_row();

            metric(
                ui,
                "Median (All Grants)",
                format_optional_currency(stats.all.median),
            );
            metric(
                ui,
                "Median (Filtered)",
                format_optional_currency(stats.filtered.median),
            );
            ui.end_row();

            metric(
                ui,
                "Mean (All Grants)",
                format_optional_currency(stats.all.mean),
            );
            metric(
                ui,
                "Mean (Filtered)",
                format_optional_currency(stats.filtered.mean),
            );
            ui.end_row();
        });
}

fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(label).weak());
        ui.label(RichText::new(value).size(22.0).strong());
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open grants data")
        .add_filter(
            "Supported files",
            &["xlsx", "xlsm", "xls", "csv", "json", "parquet", "pq"],
        )
        .add_filter("Excel", &["xlsx", "xlsm", "xls"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        log::info!("Loading {}", path.display());
        state.begin_load(path);
    }
}

pub fn save_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Download filtered data")
        .add_filter("CSV", &["csv"])
        .set_file_name(state.config.export_file_name.as_str())
        .save_file();

    if let Some(path) = file {
        if let Err(e) = state.export_to(&path) {
            log::error!("Export to {} failed: {e}", path.display());
        }
    }
}
