use geojson::GeoJson;
use tracing::warn;

use crate::constants::{self, PROP_ADM0_A3, PROP_ADMIN};
use crate::error::{Result, RiskError};
use crate::observability::metrics;
use crate::types::BoundaryRecord;

/// Parse the world map GeoJSON into one boundary per feature.
pub fn parse_boundaries(bytes: &[u8]) -> Result<Vec<BoundaryRecord>> {
    let source = constants::BOUNDARIES_SOURCE;
    let text = std::str::from_utf8(bytes)
        .map_err(|e| RiskError::ingestion(source, format!("not UTF-8: {e}")))?;
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let collection = match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(fc) => fc,
        GeoJson::Feature(_) | GeoJson::Geometry(_) => {
            return Err(RiskError::ingestion(
                source,
                "expected a FeatureCollection",
            ))
        }
    };

    let mut boundaries = Vec::with_capacity(collection.features.len());
    let mut dropped = 0;
    for feature in collection.features {
        let country = feature
            .property(PROP_ADMIN)
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let Some(country) = country else {
            dropped += 1;
            continue;
        };
        let stateabb = feature
            .property(PROP_ADM0_A3)
            .and_then(|v| v.as_str())
            .map(str::to_string);
        boundaries.push(BoundaryRecord {
            country,
            stateabb,
            geometry: feature.geometry,
        });
    }

    if dropped > 0 {
        warn!("Dropped {} boundary features without an '{}' property", dropped, PROP_ADMIN);
        metrics::sources::rows_dropped(source, dropped);
    }
    metrics::sources::rows_read(source, boundaries.len());
    Ok(boundaries)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature",
             "properties": {"admin": "Chad", "adm0_a3": "TCD"},
             "geometry": {"type": "Polygon", "coordinates": [[[14.0, 8.0], [15.0, 8.0], [15.0, 9.0], [14.0, 8.0]]]}},
            {"type": "Feature",
             "properties": {"adm0_a3": "XXX"},
             "geometry": null}
        ]
    }"#;

    #[test]
    fn parses_features_with_admin_name() {
        let boundaries = parse_boundaries(MAP.as_bytes()).unwrap();
        assert_eq!(boundaries.len(), 1);
        assert_eq!(boundaries[0].country, "Chad");
        assert_eq!(boundaries[0].stateabb.as_deref(), Some("TCD"));
        assert!(boundaries[0].geometry.is_some());
    }

    #[test]
    fn rejects_non_collections() {
        let point = r#"{"type": "Point", "coordinates": [1.0, 2.0]}"#;
        assert!(parse_boundaries(point.as_bytes()).is_err());
    }

    #[test]
    fn empty_payload_is_empty() {
        assert!(parse_boundaries(b"  ").unwrap().is_empty());
    }
}
