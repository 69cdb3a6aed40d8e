use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

/// Headline columns shown beside the selected metric.
const HEADLINE_FIELDS: &[&str] = &["population", "per_capita_gni", "exports", "imports", "gdp"];

// ---------------------------------------------------------------------------
// Data table – the active year slice, filtered to the selected countries
// ---------------------------------------------------------------------------

pub fn data_table(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open an indicator table to begin  (File → Open data…)");
        });
        return;
    }

    let records: Vec<_> = state
        .year_records()
        .into_iter()
        .filter(|r| state.selected_countries.contains(&r.country))
        .collect();

    let show_metric = !HEADLINE_FIELDS.contains(&state.metric.as_str());
    let mut fields: Vec<&str> = HEADLINE_FIELDS.to_vec();
    if show_metric {
        fields.push(state.metric.as_str());
    }

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(140.0))
        .column(Column::auto())
        .columns(Column::remainder(), fields.len())
        .header(20.0, |mut header| {
            header.col(|ui: &mut Ui| {
                ui.strong("Country");
            });
            header.col(|ui: &mut Ui| {
                ui.strong("ID");
            });
            for field in &fields {
                header.col(|ui: &mut Ui| {
                    ui.strong(*field);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, records.len(), |mut row| {
                let rec = records[row.index()];
                row.col(|ui: &mut Ui| {
                    ui.label(&rec.country);
                });
                row.col(|ui: &mut Ui| {
                    ui.label(&rec.country_id);
                });
                for field in &fields {
                    let value = rec.numeric(field).unwrap_or(0.0);
                    row.col(|ui: &mut Ui| {
                        ui.label(compact(value));
                    });
                }
            });
        });
}

/// Compact human form for the wide range of magnitudes in the table.
fn compact(v: f64) -> String {
    let abs = v.abs();
    if abs >= 1e12 {
        format!("{:.2} T", v / 1e12)
    } else if abs >= 1e9 {
        format!("{:.2} B", v / 1e9)
    } else if abs >= 1e6 {
        format!("{:.2} M", v / 1e6)
    } else if abs >= 1e3 {
        format!("{:.1} K", v / 1e3)
    } else {
        format!("{v:.2}")
    }
}
