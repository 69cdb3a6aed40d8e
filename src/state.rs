use std::collections::BTreeSet;

use crate::data::model::{IndicatorDataset, IndicatorRecord};
use crate::data::shapes::ShapeSet;

// ---------------------------------------------------------------------------
// Chart selection
// ---------------------------------------------------------------------------

/// The dashboard's chart kinds. All of them read the same year-sliced
/// projections; none owns any data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Map,
    Bar,
    Pie,
    Line,
    Scatter,
    Table,
}

impl ChartKind {
    pub const ALL: [ChartKind; 6] = [
        ChartKind::Map,
        ChartKind::Bar,
        ChartKind::Pie,
        ChartKind::Line,
        ChartKind::Scatter,
        ChartKind::Table,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Map => "World map",
            ChartKind::Bar => "Top countries",
            ChartKind::Pie => "Sector shares",
            ChartKind::Line => "Time series",
            ChartKind::Scatter => "Scatter",
            ChartKind::Table => "Table",
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// `dataset` is the immutable snapshot loaded once per file; everything else
/// is selection state. `year_slice` caches the indices of the active year's
/// records so per-frame chart code never re-scans the table.
pub struct AppState {
    /// Loaded dataset (None until a file is opened).
    pub dataset: Option<IndicatorDataset>,

    /// Country outlines for the choropleth (None until a map file is opened).
    pub shapes: Option<ShapeSet>,

    /// Active year, driven by the slider.
    pub year: i32,

    /// Countries included in the line/scatter/table views.
    pub selected_countries: BTreeSet<String>,

    pub chart: ChartKind,

    /// Canonical numeric field driving the map, bar, and line views.
    pub metric: String,

    /// Ranking depth for the bar view.
    pub top_n: usize,

    /// Country whose sector shares the pie view shows.
    pub pie_country: Option<String>,

    /// Scatter axes (canonical numeric fields).
    pub scatter_x: String,
    pub scatter_y: String,

    /// Indices of records for the active year (cached).
    pub year_slice: Vec<usize>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether a file loading operation is in progress.
    pub loading: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            shapes: None,
            year: 0,
            selected_countries: BTreeSet::new(),
            chart: ChartKind::Map,
            metric: "gdp".to_string(),
            top_n: 12,
            pie_country: None,
            scatter_x: "population".to_string(),
            scatter_y: "gdp".to_string(),
            year_slice: Vec::new(),
            status_message: None,
            loading: false,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded dataset and reset the selections.
    pub fn set_dataset(&mut self, dataset: IndicatorDataset) {
        self.year = dataset.year_range().map(|(_, hi)| hi).unwrap_or(0);
        self.selected_countries = dataset.countries.iter().cloned().collect();
        self.pie_country = dataset.countries.first().cloned();

        self.dataset = Some(dataset);
        self.reslice();
        self.status_message = None;
        self.loading = false;
    }

    /// Ingest a newly loaded shape set.
    pub fn set_shapes(&mut self, shapes: ShapeSet) {
        self.shapes = Some(shapes);
        self.status_message = None;
        self.loading = false;
    }

    /// Move the year slider, clamped into the dataset's range.
    pub fn set_year(&mut self, year: i32) {
        let clamped = match self.dataset.as_ref().and_then(|ds| ds.year_range()) {
            Some((lo, hi)) => year.clamp(lo, hi),
            None => year,
        };
        if clamped != self.year {
            self.year = clamped;
            self.reslice();
        }
    }

    /// Recompute the cached indices for the active year.
    pub fn reslice(&mut self) {
        self.year_slice = match &self.dataset {
            Some(ds) => ds
                .records
                .iter()
                .enumerate()
                .filter(|(_, r)| r.year == self.year)
                .map(|(i, _)| i)
                .collect(),
            None => Vec::new(),
        };
    }

    /// Records of the active year, in dataset order.
    pub fn year_records(&self) -> Vec<&IndicatorRecord> {
        match &self.dataset {
            Some(ds) => self.year_slice.iter().map(|&i| &ds.records[i]).collect(),
            None => Vec::new(),
        }
    }

    /// Toggle one country in the selection.
    pub fn toggle_country(&mut self, country: &str) {
        if !self.selected_countries.remove(country) {
            self.selected_countries.insert(country.to_string());
        }
    }

    /// Select every country.
    pub fn select_all_countries(&mut self) {
        if let Some(ds) = &self.dataset {
            self.selected_countries = ds.countries.iter().cloned().collect();
        }
    }

    /// Clear the country selection.
    pub fn select_no_countries(&mut self) {
        self.selected_countries.clear();
    }
}
