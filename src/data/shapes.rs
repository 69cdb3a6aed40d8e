use std::path::Path;

use log::warn;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::loader::LoadError;

// ---------------------------------------------------------------------------
// Country shapes – the geographic join collaborator
// ---------------------------------------------------------------------------

/// Outline of one country, keyed by the same string id scheme as
/// `IndicatorRecord::country_id`. Geometry is stored, never interpreted:
/// the map view joins by id and hands the rings straight to the plot layer.
#[derive(Debug, Clone)]
pub struct CountryShape {
    pub id: String,
    /// Display name from `properties.name`, when the file carries one.
    pub name: Option<String>,
    /// Outer rings in lon/lat, one per polygon of the (multi)polygon.
    pub rings: Vec<Vec<[f64; 2]>>,
}

/// All shapes from one GeoJSON file.
#[derive(Debug, Clone, Default)]
pub struct ShapeSet {
    pub shapes: Vec<CountryShape>,
}

impl ShapeSet {
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

// ---------------------------------------------------------------------------
// GeoJSON parsing
// ---------------------------------------------------------------------------

/// Outer GeoJSON structure. `coordinates` nesting depends on the geometry
/// kind, so it stays a raw value until we know which ring walk to apply.
#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    id: Option<JsonValue>,
    #[serde(default)]
    properties: Option<serde_json::Map<String, JsonValue>>,
    #[serde(default)]
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: JsonValue,
}

/// Load country outlines from a GeoJSON FeatureCollection. Features without
/// a usable id or geometry are skipped with a warning; Polygon and
/// MultiPolygon are the only recognized geometry kinds.
pub fn load_geojson(path: &Path) -> Result<ShapeSet, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_geojson(&text)
}

/// Parse GeoJSON text into a [`ShapeSet`].
pub fn parse_geojson(text: &str) -> Result<ShapeSet, LoadError> {
    let collection: FeatureCollection = serde_json::from_str(text)?;

    let mut shapes = Vec::with_capacity(collection.features.len());
    for (i, feature) in collection.features.iter().enumerate() {
        let Some(id) = feature_id(feature) else {
            warn!("skipping feature {i}: no id");
            continue;
        };

        let Some(geometry) = &feature.geometry else {
            warn!("skipping feature {id}: no geometry");
            continue;
        };

        let rings = match geometry.kind.as_str() {
            "Polygon" => polygon_rings(&geometry.coordinates, &id)?,
            "MultiPolygon" => {
                let polys = geometry.coordinates.as_array().ok_or_else(|| {
                    LoadError::Malformed(format!("feature {id}: MultiPolygon coordinates"))
                })?;
                let mut rings = Vec::new();
                for poly in polys {
                    rings.extend(polygon_rings(poly, &id)?);
                }
                rings
            }
            other => {
                warn!("skipping feature {id}: unsupported geometry '{other}'");
                continue;
            }
        };

        let name = feature
            .properties
            .as_ref()
            .and_then(|p| p.get("name"))
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_string());

        shapes.push(CountryShape { id, name, rings });
    }

    Ok(ShapeSet { shapes })
}

/// The join key: `id` on the feature, falling back to `properties.id`.
/// Numeric ids are stringified so they match the coerced `country_id`.
fn feature_id(feature: &Feature) -> Option<String> {
    let raw = feature.id.as_ref().or_else(|| {
        feature
            .properties
            .as_ref()
            .and_then(|p| p.get("id"))
    })?;
    match raw {
        JsonValue::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Some(i.to_string()),
            None => Some(n.to_string()),
        },
        _ => None,
    }
}

/// Outer ring of one polygon (holes are dropped; the map fills whole
/// countries).
fn polygon_rings(coordinates: &JsonValue, id: &str) -> Result<Vec<Vec<[f64; 2]>>, LoadError> {
    let rings = coordinates
        .as_array()
        .ok_or_else(|| LoadError::Malformed(format!("feature {id}: Polygon coordinates")))?;

    let Some(outer) = rings.first() else {
        return Ok(Vec::new());
    };
    let points = outer
        .as_array()
        .ok_or_else(|| LoadError::Malformed(format!("feature {id}: ring is not an array")))?;

    let mut ring = Vec::with_capacity(points.len());
    for point in points {
        let pair = point
            .as_array()
            .filter(|p| p.len() >= 2)
            .ok_or_else(|| LoadError::Malformed(format!("feature {id}: bad position")))?;
        let lon = pair[0]
            .as_f64()
            .ok_or_else(|| LoadError::Malformed(format!("feature {id}: bad longitude")))?;
        let lat = pair[1]
            .as_f64()
            .ok_or_else(|| LoadError::Malformed(format!("feature {id}: bad latitude")))?;
        ring.push([lon, lat]);
    }
    Ok(vec![ring])
}
