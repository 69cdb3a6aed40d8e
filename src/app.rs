use eframe::egui;

use crate::state::{AppState, ChartKind};
use crate::ui::{charts, map, panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct EconAtlasApp {
    pub state: AppState,
}

impl eframe::App for EconAtlasApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar + year slider ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: chart and filter controls ----
        egui::SidePanel::left("control_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: the active chart ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.chart {
            ChartKind::Map => map::choropleth(ui, &self.state),
            ChartKind::Bar => charts::bar_chart(ui, &self.state),
            ChartKind::Pie => charts::pie_chart(ui, &self.state),
            ChartKind::Line => charts::line_chart(ui, &self.state),
            ChartKind::Scatter => charts::scatter_chart(ui, &self.state),
            ChartKind::Table => table::data_table(ui, &self.state),
        });
    }
}
