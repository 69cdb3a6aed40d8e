use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use econ_atlas::data::loader::{load_file, LoadError, RENAME_TABLE};
use econ_atlas::data::query;

/// Write a CSV fixture with the full 26-column source header. Each row maps
/// canonical field name → cell text; unlisted cells stay empty.
fn write_csv(dir: &tempfile::TempDir, name: &str, rows: &[Vec<(&str, &str)>]) -> PathBuf {
    let path = dir.path().join(name);
    let mut wtr = csv::Writer::from_path(&path).unwrap();
    wtr.write_record(RENAME_TABLE.iter().map(|(source, _)| *source))
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
    wtr.flush().unwrap();
    path
}

#[test]
fn csv_to_queries_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(
        &dir,
        "indicators.csv",
        &[
            vec![
                ("country_id", "840"),
                ("country", " United States "),
                ("year", "2020"),
                ("gdp", "100.0"),
                ("population", "330.0"),
                ("construction_gva", "40.0"),
                ("manufacturing_gva", "60.0"),
            ],
            vec![
                ("country_id", "156"),
                ("country", "China"),
                ("year", "2020"),
                ("gdp", "90.0"),
                ("population", "1400.0"),
            ],
            vec![
                ("country_id", "840"),
                ("country", "United States"),
                ("year", "2021"),
                // gdp left blank on purpose: must load as 0.
                ("population", "331.0"),
            ],
            // Duplicate of the first (country_id, year): dropped on load.
            vec![
                ("country_id", "840"),
                ("country", "United States"),
                ("year", "2020"),
                ("gdp", "999.0"),
            ],
        ],
    );

    let ds = load_file(&path).unwrap();

    // Duplicate collapsed; names trimmed; ids stringly.
    assert_eq!(ds.len(), 3);
    assert_eq!(ds.countries, vec!["China", "United States"]);
    assert_eq!(ds.years, vec![2020, 2021]);
    assert!(ds.records.iter().all(|r| !r.country_id.is_empty()));

    // Partition property: year slices cover every record exactly once.
    let total: usize = ds
        .years
        .iter()
        .map(|&y| query::filter_by_year(&ds, y).len())
        .sum();
    assert_eq!(total, ds.len());

    // Blank gdp became 0, and the 2020 duplicate didn't clobber the first row.
    let y2021 = query::filter_by_year(&ds, 2021);
    assert_eq!(y2021.len(), 1);
    assert_eq!(y2021[0].gdp, 0.0);

    let top = query::top_n_by_year(&ds, &[2020, 2021], "gdp", 1).unwrap();
    assert_eq!(top[&2020][0].gdp, 100.0);
    assert_eq!(top[&2020][0].country, "United States");
    assert_eq!(top[&2021][0].gdp, 0.0);

    // Country filter preserves dataset order.
    let names: BTreeSet<String> = ["United States".to_string()].into_iter().collect();
    let us = query::filter_by_countries(&ds, &names);
    assert_eq!(us.len(), 2);
    assert!(us[0].year < us[1].year);

    // Sector shares over the two populated GVA fields.
    let shares = query::sector_share(
        &ds,
        "United States",
        2020,
        &["construction_gva", "manufacturing_gva"],
    )
    .unwrap();
    assert!((shares[0].1 - 0.4).abs() < 1e-12);
    assert!((shares[1].1 - 0.6).abs() < 1e-12);

    // And the recoverable zero-sum case on the all-blank China row.
    let err = query::sector_share(&ds, "China", 2020, &["construction_gva"]).unwrap_err();
    assert!(matches!(err, query::QueryError::DivisionUndefined { .. }));
}

#[test]
fn missing_column_aborts_the_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.csv");

    let mut wtr = csv::Writer::from_path(&path).unwrap();
    wtr.write_record(
        RENAME_TABLE
            .iter()
            .filter(|(_, canonical)| *canonical != "year")
            .map(|(source, _)| *source),
    )
    .unwrap();
    wtr.flush().unwrap();

    let err = load_file(&path).unwrap_err();
    match err {
        LoadError::SchemaMismatch { column } => assert_eq!(column, "Year"),
        other => panic!("expected SchemaMismatch, got {other:?}"),
    }
}

#[test]
fn unreadable_source_is_io() {
    let err = load_file(&PathBuf::from("/definitely/missing/indicators.csv")).unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
}

#[test]
fn json_encoding_loads_identically() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("indicators.json");

    let mut obj = serde_json::Map::new();
    for (source, canonical) in RENAME_TABLE {
        let v = match *canonical {
            "country_id" => serde_json::json!(76),
            "country" => serde_json::json!("Brazil"),
            "year" => serde_json::json!(2019),
            "currency" => serde_json::json!("Brazilian Real"),
            "gdp" => serde_json::json!(1.8e12),
            _ => serde_json::Value::Null,
        };
        obj.insert((*source).to_string(), v);
    }
    fs::write(
        &path,
        serde_json::to_string(&vec![serde_json::Value::Object(obj)]).unwrap(),
    )
    .unwrap();

    let ds = load_file(&path).unwrap();
    assert_eq!(ds.len(), 1);
    assert_eq!(ds.records[0].country_id, "76");
    assert_eq!(ds.records[0].gdp, 1.8e12);
    assert_eq!(ds.records[0].exports, 0.0);
}
