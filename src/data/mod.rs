/// Data layer: the normalized indicator table and the pure projections the
/// charts consume.
///
/// Architecture:
/// ```text
///  .csv / .parquet / .json          .geojson
///        │                              │
///        ▼                              ▼
///   ┌──────────┐                  ┌──────────┐
///   │  loader   │ rename + fill   │  shapes   │ country outlines
///   └──────────┘ + coerce         └──────────┘ keyed by country_id
///        │
///        ▼
///   ┌────────────────┐
///   │ IndicatorDataset│  Vec<IndicatorRecord>, derived indices
///   └────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  query    │  year/country slices, top-n, sector shares
///   └──────────┘
/// ```
///
/// The dataset is loaded once and immutable afterwards; every query borrows
/// it and returns non-owning projections.

pub mod loader;
pub mod model;
pub mod query;
pub mod shapes;
