use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// IndicatorRecord – one row of the indicator table
// ---------------------------------------------------------------------------

/// A single (country, year) observation with all 26 canonical fields.
///
/// Every numeric field is guaranteed present after loading: absent source
/// cells are coerced to `0.0` (the source conflates "no data" with zero and
/// that policy is preserved here).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorRecord {
    /// Stable country identifier, kept as a string so it can be joined
    /// against geographic shape ids without a type mismatch.
    pub country_id: String,
    /// Display name, whitespace-trimmed.
    pub country: String,
    /// Primary slicing key.
    pub year: i32,
    pub currency: String,

    pub ama_exchange_rate: f64,
    pub imf_exchange_rate: f64,
    pub population: f64,
    pub per_capita_gni: f64,
    pub agr_hunt_forest_fish_gva: f64,
    pub changes_in_inventories: f64,
    pub construction_gva: f64,
    pub exports: f64,
    pub final_consumption_expenditure: f64,
    pub gov_final_consumption_expenditure: f64,
    pub gross_capital_formation: f64,
    pub gross_fixed_capital_formation: f64,
    pub household_consumption_expenditure: f64,
    pub imports: f64,
    pub manufacturing_gva: f64,
    pub mining_manufacturing_utilities_gva: f64,
    pub other_activities_gva: f64,
    pub total_value_added: f64,
    pub transport_storage_comm_gva: f64,
    pub wholesale_retail_trade_gva: f64,
    pub gni_usd: f64,
    pub gdp: f64,
}

/// Canonical names of the 22 numeric columns, in source-table order.
/// Queries and the UI address numeric fields through this registry.
pub const NUMERIC_FIELDS: &[&str] = &[
    "ama_exchange_rate",
    "imf_exchange_rate",
    "population",
    "per_capita_gni",
    "agr_hunt_forest_fish_gva",
    "changes_in_inventories",
    "construction_gva",
    "exports",
    "final_consumption_expenditure",
    "gov_final_consumption_expenditure",
    "gross_capital_formation",
    "gross_fixed_capital_formation",
    "household_consumption_expenditure",
    "imports",
    "manufacturing_gva",
    "mining_manufacturing_utilities_gva",
    "other_activities_gva",
    "total_value_added",
    "transport_storage_comm_gva",
    "wholesale_retail_trade_gva",
    "gni_usd",
    "gdp",
];

/// The GVA sectors that partition total value added (ISIC A-B, C-E, F,
/// G-H, I, J-P). Used by the sector-share pie.
pub const SECTOR_FIELDS: &[&str] = &[
    "agr_hunt_forest_fish_gva",
    "mining_manufacturing_utilities_gva",
    "construction_gva",
    "wholesale_retail_trade_gva",
    "transport_storage_comm_gva",
    "other_activities_gva",
];

impl IndicatorRecord {
    /// Look up a numeric field by canonical name. `None` for names outside
    /// [`NUMERIC_FIELDS`].
    pub fn numeric(&self, field: &str) -> Option<f64> {
        let v = match field {
            "ama_exchange_rate" => self.ama_exchange_rate,
            "imf_exchange_rate" => self.imf_exchange_rate,
            "population" => self.population,
            "per_capita_gni" => self.per_capita_gni,
            "agr_hunt_forest_fish_gva" => self.agr_hunt_forest_fish_gva,
            "changes_in_inventories" => self.changes_in_inventories,
            "construction_gva" => self.construction_gva,
            "exports" => self.exports,
            "final_consumption_expenditure" => self.final_consumption_expenditure,
            "gov_final_consumption_expenditure" => self.gov_final_consumption_expenditure,
            "gross_capital_formation" => self.gross_capital_formation,
            "gross_fixed_capital_formation" => self.gross_fixed_capital_formation,
            "household_consumption_expenditure" => self.household_consumption_expenditure,
            "imports" => self.imports,
            "manufacturing_gva" => self.manufacturing_gva,
            "mining_manufacturing_utilities_gva" => self.mining_manufacturing_utilities_gva,
            "other_activities_gva" => self.other_activities_gva,
            "total_value_added" => self.total_value_added,
            "transport_storage_comm_gva" => self.transport_storage_comm_gva,
            "wholesale_retail_trade_gva" => self.wholesale_retail_trade_gva,
            "gni_usd" => self.gni_usd,
            "gdp" => self.gdp,
            _ => return None,
        };
        Some(v)
    }

    /// Set a numeric field by canonical name. Returns false for unknown names.
    pub(crate) fn set_numeric(&mut self, field: &str, value: f64) -> bool {
        let slot = match field {
            "ama_exchange_rate" => &mut self.ama_exchange_rate,
            "imf_exchange_rate" => &mut self.imf_exchange_rate,
            "population" => &mut self.population,
            "per_capita_gni" => &mut self.per_capita_gni,
            "agr_hunt_forest_fish_gva" => &mut self.agr_hunt_forest_fish_gva,
            "changes_in_inventories" => &mut self.changes_in_inventories,
            "construction_gva" => &mut self.construction_gva,
            "exports" => &mut self.exports,
            "final_consumption_expenditure" => &mut self.final_consumption_expenditure,
            "gov_final_consumption_expenditure" => &mut self.gov_final_consumption_expenditure,
            "gross_capital_formation" => &mut self.gross_capital_formation,
            "gross_fixed_capital_formation" => &mut self.gross_fixed_capital_formation,
            "household_consumption_expenditure" => &mut self.household_consumption_expenditure,
            "imports" => &mut self.imports,
            "manufacturing_gva" => &mut self.manufacturing_gva,
            "mining_manufacturing_utilities_gva" => &mut self.mining_manufacturing_utilities_gva,
            "other_activities_gva" => &mut self.other_activities_gva,
            "total_value_added" => &mut self.total_value_added,
            "transport_storage_comm_gva" => &mut self.transport_storage_comm_gva,
            "wholesale_retail_trade_gva" => &mut self.wholesale_retail_trade_gva,
            "gni_usd" => &mut self.gni_usd,
            "gdp" => &mut self.gdp,
            _ => return false,
        };
        *slot = value;
        true
    }
}

// ---------------------------------------------------------------------------
// IndicatorDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full normalized table with pre-computed indices.
///
/// Built once at load time and treated as immutable afterwards; every query
/// borrows it and returns non-owning projections.
#[derive(Debug, Clone, Default)]
pub struct IndicatorDataset {
    /// All records, in source-file order (one per (country_id, year)).
    pub records: Vec<IndicatorRecord>,
    /// Sorted unique years present in the table.
    pub years: Vec<i32>,
    /// Sorted unique country display names.
    pub countries: Vec<String>,
}

impl IndicatorDataset {
    /// Build the derived indices from normalized records.
    pub fn from_records(records: Vec<IndicatorRecord>) -> Self {
        let mut year_set: BTreeSet<i32> = BTreeSet::new();
        let mut country_set: BTreeSet<String> = BTreeSet::new();
        for rec in &records {
            year_set.insert(rec.year);
            country_set.insert(rec.country.clone());
        }
        IndicatorDataset {
            records,
            years: year_set.into_iter().collect(),
            countries: country_set.into_iter().collect(),
        }
    }

    /// Inclusive (min, max) year range, `None` for an empty table.
    pub fn year_range(&self) -> Option<(i32, i32)> {
        match (self.years.first(), self.years.last()) {
            (Some(&lo), Some(&hi)) => Some((lo, hi)),
            _ => None,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
