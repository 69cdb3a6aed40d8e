use std::collections::BTreeMap;

use eframe::egui::{Color32, Stroke, Ui};
use egui_plot::{Plot, PlotPoints, Polygon};

use crate::color::DivergingScale;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Choropleth – metric by country for the active year
// ---------------------------------------------------------------------------

/// World map shaded by the selected metric. The join is purely by string
/// id: `country_id` against the shape file's feature ids. Countries with no
/// joined value, or an exact zero (the source's "no data"), stay gray.
pub fn choropleth(ui: &mut Ui, state: &AppState) {
    let Some(_ds) = &state.dataset else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open an indicator table to begin  (File → Open data…)");
        });
        return;
    };
    let Some(shapes) = &state.shapes else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a GeoJSON shape file to see the map  (File → Open map…)");
        });
        return;
    };

    let values: BTreeMap<&str, f64> = state
        .year_records()
        .into_iter()
        .filter_map(|r| {
            r.numeric(&state.metric)
                .map(|v| (r.country_id.as_str(), v))
        })
        .collect();

    // Zeros mean "no data" in this table; keep them off the color ramp.
    let scale = DivergingScale::from_values(
        values.values().copied().filter(|v| *v != 0.0),
    );

    Plot::new("choropleth")
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .show(ui, |plot_ui| {
            for shape in &shapes.shapes {
                let fill = match (values.get(shape.id.as_str()), &scale) {
                    (Some(&v), Some(scale)) if v != 0.0 => scale.color_for(v),
                    _ => DivergingScale::no_data(),
                };

                for ring in &shape.rings {
                    let polygon = Polygon::new(PlotPoints::from(ring.clone()))
                        .fill_color(fill)
                        .stroke(Stroke::new(0.5, Color32::WHITE));
                    plot_ui.polygon(polygon);
                }
            }
        });
}
