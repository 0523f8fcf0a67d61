use eframe::egui::{Align, Layout, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::table::{DisplayRow, TABLE_COLUMNS};

// ---------------------------------------------------------------------------
// Filtered data table
// ---------------------------------------------------------------------------

/// Render the filtered rows once; project titles link to their records.
pub fn grants_table(ui: &mut Ui, rows: &[DisplayRow]) {
    ui.heading("Filtered Data Table");
    if rows.is_empty() {
        ui.label("No Data");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(Layout::left_to_right(Align::Center))
        .column(Column::auto().at_least(120.0))
        .column(Column::auto().at_least(120.0))
        .column(Column::auto().at_least(160.0))
        .column(Column::remainder().at_least(200.0))
        .column(Column::auto().at_least(100.0))
        .min_scrolled_height(0.0)
        .max_scroll_height(420.0)
        .header(22.0, |mut header| {
            for name in TABLE_COLUMNS {
                header.col(|ui: &mut Ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(20.0, rows.len(), |mut row| {
                let grant = &rows[row.index()];
                row.col(|ui: &mut Ui| {
                    ui.label(&grant.program);
                });
                row.col(|ui: &mut Ui| {
                    ui.label(&grant.strategy);
                });
                row.col(|ui: &mut Ui| {
                    ui.label(&grant.organization);
                });
                row.col(|ui: &mut Ui| {
                    ui.hyperlink_to(&grant.project_title, &grant.link);
                });
                row.col(|ui: &mut Ui| {
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui: &mut Ui| {
                        ui.label(&grant.amount_display);
                    });
                });
            });
        });
}
