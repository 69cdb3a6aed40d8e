use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color::generate_palette;
use crate::data::model::NUMERIC_FIELDS;
use crate::state::{AppState, ChartKind};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar: file menu, year slider, dataset summary.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open data…").clicked() {
                open_data_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open map…").clicked() {
                open_map_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} records, {} countries",
                ds.len(),
                ds.countries.len()
            ));
            ui.separator();
        }

        if let Some((lo, hi)) = state.dataset.as_ref().and_then(|ds| ds.year_range()) {
            let mut year = state.year;
            if ui
                .add(egui::Slider::new(&mut year, lo..=hi).text("Year"))
                .changed()
            {
                state.set_year(year);
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Left side panel – chart and filter controls
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Charts");
    ui.separator();

    for kind in ChartKind::ALL {
        if ui
            .selectable_label(state.chart == kind, kind.label())
            .clicked()
        {
            state.chart = kind;
        }
    }

    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone what we need so we can mutate state inside the widgets.
    let countries = dataset.countries.clone();
    let palette = generate_palette(countries.len());

    ui.strong("Indicator");
    egui::ComboBox::from_id_salt("metric")
        .selected_text(state.metric.clone())
        .show_ui(ui, |ui: &mut Ui| {
            for field in NUMERIC_FIELDS {
                if ui.selectable_label(state.metric == *field, *field).clicked() {
                    state.metric = (*field).to_string();
                }
            }
        });

    match state.chart {
        ChartKind::Bar => {
            ui.horizontal(|ui: &mut Ui| {
                ui.label("Top");
                ui.add(egui::DragValue::new(&mut state.top_n).range(1..=50_usize));
                ui.label("countries");
            });
        }
        ChartKind::Pie => {
            let current = state.pie_country.clone().unwrap_or_default();
            ui.horizontal(|ui: &mut Ui| {
                ui.label("Country");
                egui::ComboBox::from_id_salt("pie_country")
                    .selected_text(current.clone())
                    .show_ui(ui, |ui: &mut Ui| {
                        for country in &countries {
                            if ui.selectable_label(current == *country, country).clicked() {
                                state.pie_country = Some(country.clone());
                            }
                        }
                    });
            });
        }
        ChartKind::Scatter => {
            axis_combo(ui, "x axis", "scatter_x", &mut state.scatter_x);
            axis_combo(ui, "y axis", "scatter_y", &mut state.scatter_y);
        }
        _ => {}
    }

    ui.separator();

    // ---- Country filter (collapsible) ----
    let n_selected = state.selected_countries.len();
    let header_text = format!("Countries  ({n_selected}/{})", countries.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt("country_filter")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all_countries();
                }
                if ui.small_button("None").clicked() {
                    state.select_no_countries();
                }
            });

            ScrollArea::vertical()
                .auto_shrink([false, true])
                .max_height(300.0)
                .show(ui, |ui: &mut Ui| {
                    for (i, country) in countries.iter().enumerate() {
                        let mut checked = state.selected_countries.contains(country);
                        let text = RichText::new(country).color(palette[i]);
                        if ui.checkbox(&mut checked, text).changed() {
                            state.toggle_country(country);
                        }
                    }
                });
        });
}

fn axis_combo(ui: &mut Ui, label: &str, salt: &str, slot: &mut String) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(label);
        egui::ComboBox::from_id_salt(salt)
            .selected_text(slot.clone())
            .show_ui(ui, |ui: &mut Ui| {
                for field in NUMERIC_FIELDS {
                    if ui.selectable_label(slot.as_str() == *field, *field).clicked() {
                        *slot = (*field).to_string();
                    }
                }
            });
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_data_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open indicator table")
        .add_filter("Supported files", &["csv", "parquet", "pq", "json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.loading = true;
        match crate::data::loader::load_file(&path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} records across {} years",
                    dataset.len(),
                    dataset.years.len()
                );
                state.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load data: {e}");
                state.status_message = Some(format!("Error: {e}"));
                state.loading = false;
            }
        }
    }
}

pub fn open_map_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open country shapes")
        .add_filter("GeoJSON", &["geojson", "json"])
        .pick_file();

    if let Some(path) = file {
        state.loading = true;
        match crate::data::shapes::load_geojson(&path) {
            Ok(shapes) => {
                log::info!("Loaded {} country shapes", shapes.len());
                state.set_shapes(shapes);
            }
            Err(e) => {
                log::error!("Failed to load shapes: {e}");
                state.status_message = Some(format!("Error: {e}"));
                state.loading = false;
            }
        }
    }
}
