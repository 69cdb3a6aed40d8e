use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use super::model::{IndicatorDataset, IndicatorRecord};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Recoverable query failures. Callers decide the fallback (the pie view
/// shows "no data" on [`QueryError::DivisionUndefined`]); nothing here
/// aborts the application.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("no record for country '{country}' in year {year}")]
    RecordNotFound { country: String, year: i32 },

    #[error("sector sum for country '{country}' in year {year} is zero")]
    DivisionUndefined { country: String, year: i32 },

    #[error("unknown numeric field '{0}'")]
    UnknownField(String),
}

// ---------------------------------------------------------------------------
// Year / country slices
// ---------------------------------------------------------------------------

/// All records for the given year, in dataset order. An empty slice is a
/// valid answer, not an error.
pub fn filter_by_year(ds: &IndicatorDataset, year: i32) -> Vec<&IndicatorRecord> {
    ds.records.iter().filter(|r| r.year == year).collect()
}

/// All records whose country name is in `names`, preserving dataset order.
pub fn filter_by_countries<'a>(
    ds: &'a IndicatorDataset,
    names: &BTreeSet<String>,
) -> Vec<&'a IndicatorRecord> {
    ds.records
        .iter()
        .filter(|r| names.contains(&r.country))
        .collect()
}

// ---------------------------------------------------------------------------
// Rankings
// ---------------------------------------------------------------------------

/// For each requested year, the `n` records with the largest value of
/// `field`, descending. The sort is stable: ties keep dataset order. Each
/// slice has length `min(n, records available for that year)`.
pub fn top_n_by_year<'a>(
    ds: &'a IndicatorDataset,
    years: &[i32],
    field: &str,
    n: usize,
) -> Result<BTreeMap<i32, Vec<&'a IndicatorRecord>>, QueryError> {
    // Reject the field up front rather than per row.
    if IndicatorRecord::default().numeric(field).is_none() {
        return Err(QueryError::UnknownField(field.to_string()));
    }

    let mut out = BTreeMap::new();
    for &year in years {
        let mut slice = filter_by_year(ds, year);
        slice.sort_by(|a, b| {
            let av = a.numeric(field).unwrap_or(0.0);
            let bv = b.numeric(field).unwrap_or(0.0);
            bv.total_cmp(&av)
        });
        slice.truncate(n);
        out.insert(year, slice);
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Sector shares
// ---------------------------------------------------------------------------

/// Fraction of the sector sum contributed by each of `sector_fields` for
/// the single (country, year) record, in caller order.
///
/// A zero sector sum is [`QueryError::DivisionUndefined`] so the caller can
/// show a fallback instead of a meaningless pie.
pub fn sector_share(
    ds: &IndicatorDataset,
    country: &str,
    year: i32,
    sector_fields: &[&str],
) -> Result<Vec<(String, f64)>, QueryError> {
    let rec = ds
        .records
        .iter()
        .find(|r| r.country == country && r.year == year)
        .ok_or_else(|| QueryError::RecordNotFound {
            country: country.to_string(),
            year,
        })?;

    let mut values = Vec::with_capacity(sector_fields.len());
    for field in sector_fields {
        let v = rec
            .numeric(field)
            .ok_or_else(|| QueryError::UnknownField((*field).to_string()))?;
        values.push(((*field).to_string(), v));
    }

    let total: f64 = values.iter().map(|(_, v)| v).sum();
    if total == 0.0 {
        return Err(QueryError::DivisionUndefined {
            country: country.to_string(),
            year,
        });
    }

    Ok(values.into_iter().map(|(f, v)| (f, v / total)).collect())
}

// ---------------------------------------------------------------------------
// Per-country series
// ---------------------------------------------------------------------------

/// (year, value) points for one country over every year it appears in,
/// sorted by year. The one parametrized projection behind the line and
/// scatter views; chart kinds share it instead of re-filtering themselves.
pub fn series_for_country(ds: &IndicatorDataset, country: &str, field: &str) -> Vec<[f64; 2]> {
    let mut points: Vec<[f64; 2]> = ds
        .records
        .iter()
        .filter(|r| r.country == country)
        .filter_map(|r| r.numeric(field).map(|v| [f64::from(r.year), v]))
        .collect();
    points.sort_by(|a, b| a[0].total_cmp(&b[0]));
    points
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(country_id: &str, country: &str, year: i32, gdp: f64) -> IndicatorRecord {
        IndicatorRecord {
            country_id: country_id.to_string(),
            country: country.to_string(),
            year,
            gdp,
            ..Default::default()
        }
    }

    fn sample() -> IndicatorDataset {
        IndicatorDataset::from_records(vec![
            rec("840", "USA", 2020, 100.0),
            rec("156", "China", 2020, 90.0),
            rec("276", "Germany", 2020, 90.0),
            rec("840", "USA", 2021, 0.0),
            rec("156", "China", 2021, 95.0),
        ])
    }

    #[test]
    fn year_slices_partition_the_dataset() {
        let ds = sample();
        let total: usize = ds
            .years
            .iter()
            .map(|&y| filter_by_year(&ds, y).len())
            .sum();
        assert_eq!(total, ds.len());
        for &y in &ds.years {
            assert!(filter_by_year(&ds, y).iter().all(|r| r.year == y));
        }
    }

    #[test]
    fn missing_year_yields_empty_slice() {
        let ds = sample();
        assert!(filter_by_year(&ds, 1900).is_empty());
    }

    #[test]
    fn country_filter_preserves_dataset_order() {
        let ds = sample();
        let names: BTreeSet<String> =
            ["USA".to_string(), "Germany".to_string()].into_iter().collect();
        let got = filter_by_countries(&ds, &names);
        let countries: Vec<&str> = got.iter().map(|r| r.country.as_str()).collect();
        assert_eq!(countries, vec!["USA", "Germany", "USA"]);
    }

    #[test]
    fn top_n_is_descending_and_stable() {
        let ds = sample();
        let top = top_n_by_year(&ds, &[2020], "gdp", 3).unwrap();
        let slice = &top[&2020];
        let gdps: Vec<f64> = slice.iter().map(|r| r.gdp).collect();
        assert_eq!(gdps, vec![100.0, 90.0, 90.0]);
        // China precedes Germany in the dataset, so the tie keeps that order.
        assert_eq!(slice[1].country, "China");
        assert_eq!(slice[2].country, "Germany");
    }

    #[test]
    fn top_n_is_capped_by_availability() {
        let ds = sample();
        let top = top_n_by_year(&ds, &[2021, 1900], "gdp", 10).unwrap();
        assert_eq!(top[&2021].len(), 2);
        assert!(top[&1900].is_empty());
    }

    #[test]
    fn top_n_rejects_unknown_fields() {
        let ds = sample();
        let err = top_n_by_year(&ds, &[2020], "gdppp", 3).unwrap_err();
        assert_eq!(err, QueryError::UnknownField("gdppp".to_string()));
    }

    #[test]
    fn spec_example_two_rows() {
        // (id "1", USA, 2020, gdp=100, pop=10) and (id "1", USA, 2021,
        // gdp absent→0, pop=12).
        let mut a = rec("1", "USA", 2020, 100.0);
        a.population = 10.0;
        let mut b = rec("1", "USA", 2021, 0.0);
        b.population = 12.0;
        let ds = IndicatorDataset::from_records(vec![a, b]);

        let slice = filter_by_year(&ds, 2021);
        assert_eq!(slice.len(), 1);
        assert_eq!(slice[0].gdp, 0.0);

        let top = top_n_by_year(&ds, &[2020, 2021], "gdp", 1).unwrap();
        assert_eq!(top[&2020][0].gdp, 100.0);
        assert_eq!(top[&2021][0].gdp, 0.0);
    }

    #[test]
    fn sector_shares_sum_to_one() {
        let mut r = rec("840", "USA", 2020, 0.0);
        r.agr_hunt_forest_fish_gva = 10.0;
        r.construction_gva = 30.0;
        r.manufacturing_gva = 60.0;
        let ds = IndicatorDataset::from_records(vec![r]);

        let fields = ["agr_hunt_forest_fish_gva", "construction_gva", "manufacturing_gva"];
        let shares = sector_share(&ds, "USA", 2020, &fields).unwrap();
        assert_eq!(shares.len(), 3);
        assert_eq!(shares[0], ("agr_hunt_forest_fish_gva".to_string(), 0.1));
        let total: f64 = shares.iter().map(|(_, v)| v).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_sector_sum_is_division_undefined() {
        let ds = IndicatorDataset::from_records(vec![rec("840", "USA", 2020, 5.0)]);
        let err = sector_share(&ds, "USA", 2020, &["construction_gva"]).unwrap_err();
        assert_eq!(
            err,
            QueryError::DivisionUndefined { country: "USA".to_string(), year: 2020 }
        );
    }

    #[test]
    fn sector_share_for_missing_record() {
        let ds = sample();
        let err = sector_share(&ds, "Atlantis", 2020, &["construction_gva"]).unwrap_err();
        assert_eq!(
            err,
            QueryError::RecordNotFound { country: "Atlantis".to_string(), year: 2020 }
        );
    }

    #[test]
    fn country_series_is_year_sorted() {
        let ds = IndicatorDataset::from_records(vec![
            rec("840", "USA", 2021, 7.0),
            rec("840", "USA", 2019, 5.0),
            rec("840", "USA", 2020, 6.0),
        ]);
        let series = series_for_country(&ds, "USA", "gdp");
        assert_eq!(series, vec![[2019.0, 5.0], [2020.0, 6.0], [2021.0, 7.0]]);
        assert!(series_for_country(&ds, "Atlantis", "gdp").is_empty());
    }
}
