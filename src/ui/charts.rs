use eframe::egui::{Color32, Stroke, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points, Polygon};

use crate::color::generate_palette;
use crate::data::model::SECTOR_FIELDS;
use crate::data::query;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Shared bits
// ---------------------------------------------------------------------------

fn empty_hint(ui: &mut Ui) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.heading("Open an indicator table to begin  (File → Open data…)");
    });
}

/// Stable per-country color: index into the dataset's sorted country list.
fn country_color(countries: &[String], palette: &[Color32], name: &str) -> Color32 {
    countries
        .iter()
        .position(|c| c == name)
        .and_then(|i| palette.get(i).copied())
        .unwrap_or(Color32::LIGHT_BLUE)
}

// ---------------------------------------------------------------------------
// Bar chart – top-n countries for the active year
// ---------------------------------------------------------------------------

/// Ranking snapshot: the `top_n` countries by the selected metric.
pub fn bar_chart(ui: &mut Ui, state: &AppState) {
    let Some(ds) = &state.dataset else {
        empty_hint(ui);
        return;
    };

    let ranking = match query::top_n_by_year(ds, &[state.year], &state.metric, state.top_n) {
        Ok(mut by_year) => by_year.remove(&state.year).unwrap_or_default(),
        Err(e) => {
            ui.label(e.to_string());
            return;
        }
    };

    let palette = generate_palette(ranking.len());

    Plot::new("bar_chart")
        .legend(Legend::default())
        .x_axis_label("rank")
        .y_axis_label(state.metric.clone())
        .show(ui, |plot_ui| {
            for (i, rec) in ranking.iter().enumerate() {
                let value = rec.numeric(&state.metric).unwrap_or(0.0);
                let bar = Bar::new(i as f64 + 1.0, value).width(0.7).fill(palette[i]);
                plot_ui.bar_chart(
                    BarChart::new(vec![bar])
                        .name(&rec.country)
                        .color(palette[i]),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Line chart – one series per selected country, all years
// ---------------------------------------------------------------------------

pub fn line_chart(ui: &mut Ui, state: &AppState) {
    let Some(ds) = &state.dataset else {
        empty_hint(ui);
        return;
    };

    let palette = generate_palette(ds.countries.len());

    Plot::new("line_chart")
        .legend(Legend::default())
        .x_axis_label("year")
        .y_axis_label(state.metric.clone())
        .show(ui, |plot_ui| {
            for country in &ds.countries {
                if !state.selected_countries.contains(country) {
                    continue;
                }
                let series = query::series_for_country(ds, country, &state.metric);
                if series.is_empty() {
                    continue;
                }
                let line = Line::new(PlotPoints::from(series))
                    .name(country)
                    .color(country_color(&ds.countries, &palette, country))
                    .width(1.5);
                plot_ui.line(line);
            }
        });
}

// ---------------------------------------------------------------------------
// Scatter – metric vs metric across countries for the active year
// ---------------------------------------------------------------------------

pub fn scatter_chart(ui: &mut Ui, state: &AppState) {
    let Some(ds) = &state.dataset else {
        empty_hint(ui);
        return;
    };

    let palette = generate_palette(ds.countries.len());

    Plot::new("scatter_chart")
        .legend(Legend::default())
        .x_axis_label(state.scatter_x.clone())
        .y_axis_label(state.scatter_y.clone())
        .show(ui, |plot_ui| {
            for rec in state.year_records() {
                if !state.selected_countries.contains(&rec.country) {
                    continue;
                }
                let (Some(x), Some(y)) = (
                    rec.numeric(&state.scatter_x),
                    rec.numeric(&state.scatter_y),
                ) else {
                    continue;
                };
                let points = Points::new(PlotPoints::from(vec![[x, y]]))
                    .name(&rec.country)
                    .color(country_color(&ds.countries, &palette, &rec.country))
                    .radius(3.0);
                plot_ui.points(points);
            }
        });
}

// ---------------------------------------------------------------------------
// Pie – sector shares for one country and year
// ---------------------------------------------------------------------------

/// Sector-share pie built from filled wedge polygons. A zero sector sum is
/// a recoverable condition: the view falls back to a "no data" message.
pub fn pie_chart(ui: &mut Ui, state: &AppState) {
    let Some(ds) = &state.dataset else {
        empty_hint(ui);
        return;
    };
    let Some(country) = &state.pie_country else {
        ui.label("Pick a country to see its sector shares.");
        return;
    };

    let shares = match query::sector_share(ds, country, state.year, SECTOR_FIELDS) {
        Ok(shares) => shares,
        Err(e) => {
            log::debug!("sector pie fallback: {e}");
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading(format!("No sector data for {country} in {}", state.year));
            });
            return;
        }
    };

    let palette = generate_palette(shares.len());

    Plot::new("pie_chart")
        .legend(Legend::default())
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .show(ui, |plot_ui| {
            let mut start = 0.0_f64;
            for (i, (sector, fraction)) in shares.iter().enumerate() {
                let sweep = fraction * std::f64::consts::TAU;
                let steps = ((sweep / 0.05).ceil() as usize).max(2);

                let mut points = vec![[0.0, 0.0]];
                for s in 0..=steps {
                    let angle = start + sweep * s as f64 / steps as f64;
                    points.push([angle.cos(), angle.sin()]);
                }

                let wedge = Polygon::new(PlotPoints::from(points))
                    .name(format!("{sector}  {:.1}%", fraction * 100.0))
                    .fill_color(palette[i])
                    .stroke(Stroke::new(1.0, Color32::WHITE));
                plot_ui.polygon(wedge);

                start += sweep;
            }
        });
}
