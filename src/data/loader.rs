use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use arrow::array::{Array, ArrayRef, Float32Array, Float64Array, Int32Array, Int64Array, StringArray};
use arrow::datatypes::DataType;
use log::warn;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{IndicatorDataset, IndicatorRecord};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Everything that can go wrong while loading the indicator table.
///
/// A missing column or unreadable file aborts the whole load; the table is
/// never partially loaded. Absent numeric cells are not errors (they become
/// `0.0`), but a non-empty cell that fails to parse is.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("required column '{column}' is missing from the source header")]
    SchemaMismatch { column: String },

    #[error("row {row}, column '{column}': '{value}' is not numeric")]
    Parse {
        row: usize,
        column: String,
        value: String,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("malformed table: {0}")]
    Malformed(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),
}

// ---------------------------------------------------------------------------
// Rename table: verbatim source header → canonical field name
// ---------------------------------------------------------------------------

/// The fixed mapping from the 26 verbatim source headers to canonical field
/// names. Validated against the actual header on every load; a source column
/// missing from the file is a [`LoadError::SchemaMismatch`].
pub const RENAME_TABLE: &[(&str, &str)] = &[
    ("CountryID", "country_id"),
    ("Country", "country"),
    ("Year", "year"),
    ("AMA exchange rate", "ama_exchange_rate"),
    ("IMF based exchange rate", "imf_exchange_rate"),
    ("Population", "population"),
    ("Currency", "currency"),
    ("Per capita GNI", "per_capita_gni"),
    (
        "Agriculture, hunting, forestry, fishing (ISIC A-B)",
        "agr_hunt_forest_fish_gva",
    ),
    ("Changes in inventories", "changes_in_inventories"),
    ("Construction (ISIC F)", "construction_gva"),
    ("Exports of goods and services", "exports"),
    ("Final consumption expenditure", "final_consumption_expenditure"),
    (
        "General government final consumption expenditure",
        "gov_final_consumption_expenditure",
    ),
    ("Gross capital formation", "gross_capital_formation"),
    (
        "Gross fixed capital formation (including Acquisitions less disposals of valuables)",
        "gross_fixed_capital_formation",
    ),
    (
        "Household consumption expenditure (including Non-profit institutions serving households)",
        "household_consumption_expenditure",
    ),
    ("Imports of goods and services", "imports"),
    ("Manufacturing (ISIC D)", "manufacturing_gva"),
    (
        "Mining, Manufacturing, Utilities (ISIC C-E)",
        "mining_manufacturing_utilities_gva",
    ),
    ("Other Activities (ISIC J-P)", "other_activities_gva"),
    ("Total Value Added", "total_value_added"),
    (
        "Transport, storage and communication (ISIC I)",
        "transport_storage_comm_gva",
    ),
    (
        "Wholesale, retail trade, restaurants and hotels (ISIC G-H)",
        "wholesale_retail_trade_gva",
    ),
    ("Gross National Income(GNI) in USD", "gni_usd"),
    ("Gross Domestic Product (GDP)", "gdp"),
];

/// Canonical name for a (pre-trimmed) source header, if it is one of ours.
fn canonical_for(source: &str) -> Option<&'static str> {
    RENAME_TABLE
        .iter()
        .find(|(s, _)| *s == source)
        .map(|(_, c)| *c)
}

/// Fail with the first missing source column, in rename-table order.
fn require_all_columns<'a>(present: impl IntoIterator<Item = &'a str>) -> Result<(), LoadError> {
    let present: BTreeSet<&str> = present.into_iter().collect();
    for (source, _) in RENAME_TABLE {
        if !present.contains(source) {
            return Err(LoadError::SchemaMismatch {
                column: (*source).to_string(),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the indicator table from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – the canonical delimited source (recommended)
/// * `.parquet` – the same table as flat Parquet columns
/// * `.json`    – records-oriented array keyed by the source header names
pub fn load_file(path: &Path) -> Result<IndicatorDataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        other => Err(LoadError::UnsupportedFormat(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Normalization shared by every format
// ---------------------------------------------------------------------------

/// Collapse duplicates to one record per (country_id, year), keeping the
/// first occurrence so dataset order is preserved.
fn dedup_records(records: Vec<IndicatorRecord>) -> Vec<IndicatorRecord> {
    let mut seen: BTreeSet<(String, i32)> = BTreeSet::new();
    let mut out = Vec::with_capacity(records.len());
    for rec in records {
        if seen.insert((rec.country_id.clone(), rec.year)) {
            out.push(rec);
        } else {
            warn!(
                "dropping duplicate record for country_id={} year={}",
                rec.country_id, rec.year
            );
        }
    }
    out
}

fn parse_year(cell: &str, row: usize) -> Result<i32, LoadError> {
    if cell.is_empty() {
        return Ok(0);
    }
    if let Ok(y) = cell.parse::<i32>() {
        return Ok(y);
    }
    // Accept float-encoded integers ("2020.0") from numeric exports.
    if let Ok(f) = cell.parse::<f64>() {
        if f.fract() == 0.0 && f >= i32::MIN as f64 && f <= i32::MAX as f64 {
            return Ok(f as i32);
        }
    }
    Err(LoadError::Parse {
        row,
        column: "year".to_string(),
        value: cell.to_string(),
    })
}

/// Apply one already-trimmed cell to the record under its canonical name.
/// Empty numeric cells become `0.0`.
fn apply_cell(
    rec: &mut IndicatorRecord,
    field: &'static str,
    cell: &str,
    row: usize,
) -> Result<(), LoadError> {
    match field {
        "country_id" => rec.country_id = cell.to_string(),
        "country" => rec.country = cell.to_string(),
        "currency" => rec.currency = cell.to_string(),
        "year" => rec.year = parse_year(cell, row)?,
        _ => {
            let value = if cell.is_empty() {
                0.0
            } else {
                cell.parse::<f64>().map_err(|_| LoadError::Parse {
                    row,
                    column: field.to_string(),
                    value: cell.to_string(),
                })?
            };
            rec.set_numeric(field, value);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<IndicatorDataset, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_csv(BufReader::new(file))
}

/// Parse the CSV encoding of the table from any reader.
///
/// Header names are trimmed before matching; columns outside the rename
/// table are ignored; all 26 recognized columns must be present.
pub fn parse_csv<R: Read>(reader: R) -> Result<IndicatorDataset, LoadError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    require_all_columns(headers.iter().map(String::as_str))?;

    // Per-position canonical name; None for columns we don't recognize.
    let columns: Vec<Option<&'static str>> =
        headers.iter().map(|h| canonical_for(h)).collect();

    let mut records = Vec::new();
    for (row_no, result) in rdr.records().enumerate() {
        let row = result?;
        let mut rec = IndicatorRecord::default();
        for (idx, canonical) in columns.iter().enumerate() {
            let Some(field) = *canonical else { continue };
            let cell = row.get(idx).unwrap_or("").trim();
            apply_cell(&mut rec, field, cell, row_no)?;
        }
        records.push(rec);
    }

    Ok(IndicatorDataset::from_records(dedup_records(records)))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "CountryID": 840, "Country": "USA", "Year": 2020, "Gross Domestic Product (GDP)": 1.0, ... },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<IndicatorDataset, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_json(&text)
}

/// Parse the records-oriented JSON encoding of the table.
pub fn parse_json(text: &str) -> Result<IndicatorDataset, LoadError> {
    let root: JsonValue = serde_json::from_str(text)?;
    let rows = root
        .as_array()
        .ok_or_else(|| LoadError::Malformed("expected a top-level JSON array of records".into()))?;

    if let Some(first) = rows.first() {
        let obj = first
            .as_object()
            .ok_or_else(|| LoadError::Malformed("row 0 is not a JSON object".into()))?;
        require_all_columns(obj.keys().map(|k| k.trim()))?;
    }

    let mut records = Vec::with_capacity(rows.len());
    for (row_no, value) in rows.iter().enumerate() {
        let obj = value
            .as_object()
            .ok_or_else(|| LoadError::Malformed(format!("row {row_no} is not a JSON object")))?;

        let mut rec = IndicatorRecord::default();
        for (source, canonical) in RENAME_TABLE {
            // Keys may carry incidental whitespace, same as CSV headers.
            let cell = obj
                .iter()
                .find(|(k, _)| k.trim() == *source)
                .map(|(_, v)| v);
            apply_json_cell(&mut rec, *canonical, cell, row_no)?;
        }
        records.push(rec);
    }

    Ok(IndicatorDataset::from_records(dedup_records(records)))
}

fn apply_json_cell(
    rec: &mut IndicatorRecord,
    field: &'static str,
    value: Option<&JsonValue>,
    row: usize,
) -> Result<(), LoadError> {
    let cell = match value {
        None | Some(JsonValue::Null) => String::new(),
        // CountryID and Year are often numeric in JSON exports; stringify
        // integers without a trailing fraction.
        Some(JsonValue::Number(n)) => match n.as_i64() {
            Some(i) => i.to_string(),
            None => n.to_string(),
        },
        Some(JsonValue::String(s)) => s.clone(),
        Some(other) => {
            return Err(LoadError::Malformed(format!(
                "row {row}, column '{field}': unexpected value {other}"
            )))
        }
    };
    apply_cell(rec, field, cell.trim(), row)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load the Parquet encoding of the table: flat scalar columns named with
/// the verbatim source headers. String, integer, and float physical types
/// are accepted per field class; numeric nulls become `0.0`.
fn load_parquet(path: &Path) -> Result<IndicatorDataset, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let reader = builder.build()?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let schema = batch.schema();

        require_all_columns(schema.fields().iter().map(|f| f.name().trim()))?;

        let columns: Vec<(usize, &'static str)> = schema
            .fields()
            .iter()
            .enumerate()
            .filter_map(|(i, f)| canonical_for(f.name().trim()).map(|c| (i, c)))
            .collect();

        for row in 0..batch.num_rows() {
            let mut rec = IndicatorRecord::default();
            for &(col_idx, field) in &columns {
                let col = batch.column(col_idx);
                let cell = extract_cell(col, row, field)?;
                apply_cell(&mut rec, field, cell.trim(), row)?;
            }
            records.push(rec);
        }
    }

    Ok(IndicatorDataset::from_records(dedup_records(records)))
}

/// Render one Arrow cell as the textual form `apply_cell` expects.
/// Nulls become the empty string (and thus `0.0` for numeric fields).
fn extract_cell(col: &ArrayRef, row: usize, field: &str) -> Result<String, LoadError> {
    if col.is_null(row) {
        return Ok(String::new());
    }
    let text = match col.data_type() {
        DataType::Utf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| LoadError::Malformed(format!("column '{field}': expected StringArray")))?;
            arr.value(row).to_string()
        }
        DataType::Int32 => {
            let arr = col.as_any().downcast_ref::<Int32Array>().unwrap();
            arr.value(row).to_string()
        }
        DataType::Int64 => {
            let arr = col.as_any().downcast_ref::<Int64Array>().unwrap();
            arr.value(row).to_string()
        }
        DataType::Float32 => {
            let arr = col.as_any().downcast_ref::<Float32Array>().unwrap();
            format_float(arr.value(row) as f64)
        }
        DataType::Float64 => {
            let arr = col.as_any().downcast_ref::<Float64Array>().unwrap();
            format_float(arr.value(row))
        }
        other => {
            return Err(LoadError::Malformed(format!(
                "column '{field}': unsupported Arrow type {other:?}"
            )))
        }
    };
    Ok(text)
}

/// Integral floats print without a fraction so identifier columns exported
/// as Float64 still coerce to clean id strings.
fn format_float(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::NUMERIC_FIELDS;

    /// Build CSV text with the full 26-column source header; each row maps
    /// canonical field name → cell text, unlisted cells stay empty.
    fn build_csv(rows: &[Vec<(&str, &str)>]) -> String {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(RENAME_TABLE.iter().map(|(s, _)| *s))
            .unwrap();
        for row in rows {
            let cells: Vec<String> = RENAME_TABLE
                .iter()
                .map(|(_, canonical)| {
                    row.iter()
                        .find(|(k, _)| k == canonical)
                        .map(|(_, v)| (*v).to_string())
                        .unwrap_or_default()
                })
                .collect();
            wtr.write_record(&cells).unwrap();
        }
        String::from_utf8(wtr.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn rename_table_is_a_bijection() {
        assert_eq!(RENAME_TABLE.len(), 26);

        let sources: BTreeSet<&str> = RENAME_TABLE.iter().map(|(s, _)| *s).collect();
        let canonicals: BTreeSet<&str> = RENAME_TABLE.iter().map(|(_, c)| *c).collect();
        assert_eq!(sources.len(), 26, "duplicate source names");
        assert_eq!(canonicals.len(), 26, "two sources collide on one canonical name");

        // The canonical side is exactly the record's fields.
        let mut expected: BTreeSet<&str> =
            ["country_id", "country", "year", "currency"].into_iter().collect();
        expected.extend(NUMERIC_FIELDS);
        assert_eq!(canonicals, expected);
    }

    #[test]
    fn absent_cells_become_zero() {
        let csv = build_csv(&[vec![
            ("country_id", "840"),
            ("country", "USA"),
            ("year", "2020"),
            ("population", "331000000"),
        ]]);
        let ds = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(ds.len(), 1);
        let rec = &ds.records[0];
        assert_eq!(rec.population, 331_000_000.0);
        for field in NUMERIC_FIELDS {
            if *field != "population" {
                assert_eq!(rec.numeric(field), Some(0.0), "{field}");
            }
        }
    }

    #[test]
    fn text_fields_are_trimmed_and_stringly() {
        let csv = build_csv(&[vec![
            ("country_id", " 840 "),
            ("country", "  United States "),
            ("currency", " US Dollar "),
            ("year", "2020"),
        ]]);
        let ds = parse_csv(csv.as_bytes()).unwrap();
        let rec = &ds.records[0];
        assert_eq!(rec.country_id, "840");
        assert_eq!(rec.country, "United States");
        assert_eq!(rec.currency, "US Dollar");
        assert_eq!(rec.year, 2020);
    }

    #[test]
    fn header_whitespace_is_tolerated() {
        // Hand-rolled header with padded names; quoting keeps inner commas.
        let mut csv = String::new();
        for (i, (source, _)) in RENAME_TABLE.iter().enumerate() {
            if i > 0 {
                csv.push(',');
            }
            csv.push_str(&format!("\" {source} \""));
        }
        csv.push('\n');
        // 26 cells: id, country, year, then 23 blanks.
        csv.push_str("1,Albania,1999");
        csv.push_str(&",".repeat(23));
        csv.push('\n');

        let ds = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(ds.records[0].country, "Albania");
        assert_eq!(ds.records[0].year, 1999);
    }

    #[test]
    fn missing_column_is_a_schema_mismatch() {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(
            RENAME_TABLE
                .iter()
                .filter(|(_, c)| *c != "gdp")
                .map(|(s, _)| *s),
        )
        .unwrap();
        let csv = String::from_utf8(wtr.into_inner().unwrap()).unwrap();

        let err = parse_csv(csv.as_bytes()).unwrap_err();
        match err {
            LoadError::SchemaMismatch { column } => {
                assert_eq!(column, "Gross Domestic Product (GDP)")
            }
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }

    #[test]
    fn garbage_numeric_cell_is_a_parse_error() {
        let csv = build_csv(&[vec![
            ("country_id", "840"),
            ("country", "USA"),
            ("year", "2020"),
            ("gdp", "not-a-number"),
        ]]);
        let err = parse_csv(csv.as_bytes()).unwrap_err();
        match err {
            LoadError::Parse { row, column, value } => {
                assert_eq!(row, 0);
                assert_eq!(column, "gdp");
                assert_eq!(value, "not-a-number");
            }
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn float_encoded_year_is_accepted() {
        let csv = build_csv(&[vec![
            ("country_id", "840"),
            ("country", "USA"),
            ("year", "2020.0"),
        ]]);
        let ds = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(ds.records[0].year, 2020);
    }

    #[test]
    fn duplicate_country_year_keeps_first() {
        let csv = build_csv(&[
            vec![("country_id", "840"), ("country", "USA"), ("year", "2020"), ("gdp", "1.0")],
            vec![("country_id", "840"), ("country", "USA"), ("year", "2020"), ("gdp", "2.0")],
            vec![("country_id", "840"), ("country", "USA"), ("year", "2021"), ("gdp", "3.0")],
        ]);
        let ds = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].gdp, 1.0);
        assert_eq!(ds.records[1].year, 2021);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_file(Path::new("indicators.txt")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat(ext) if ext == "txt"));
    }

    #[test]
    fn unreadable_path_is_an_io_error() {
        let err = load_file(Path::new("/no/such/dir/indicators.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn json_records_parse_with_numeric_ids() {
        let mut obj = serde_json::Map::new();
        for (source, canonical) in RENAME_TABLE {
            let v = match *canonical {
                "country_id" => serde_json::json!(840),
                "country" => serde_json::json!(" USA "),
                "year" => serde_json::json!(2020),
                "currency" => serde_json::json!("US Dollar"),
                "gdp" => serde_json::json!(21.0),
                _ => JsonValue::Null,
            };
            obj.insert((*source).to_string(), v);
        }
        let text = serde_json::to_string(&vec![JsonValue::Object(obj)]).unwrap();

        let ds = parse_json(&text).unwrap();
        assert_eq!(ds.len(), 1);
        let rec = &ds.records[0];
        assert_eq!(rec.country_id, "840");
        assert_eq!(rec.country, "USA");
        assert_eq!(rec.gdp, 21.0);
        assert_eq!(rec.exports, 0.0);
    }

    #[test]
    fn json_missing_column_is_a_schema_mismatch() {
        let mut obj = serde_json::Map::new();
        for (source, canonical) in RENAME_TABLE {
            if *canonical == "population" {
                continue;
            }
            obj.insert((*source).to_string(), JsonValue::Null);
        }
        let text = serde_json::to_string(&vec![JsonValue::Object(obj)]).unwrap();

        let err = parse_json(&text).unwrap_err();
        assert!(
            matches!(err, LoadError::SchemaMismatch { ref column } if column == "Population"),
            "{err:?}"
        );
    }
}
