use geojson::{Feature, FeatureCollection, JsonObject, JsonValue};
use tracing::debug;

use super::percent;
use crate::constants::NO_DATA;
use crate::error::Result;
use crate::observability::metrics;
use crate::pipeline::processing::fusion::join::{left_join, unmatched};
use crate::types::{BoundaryRecord, MonthlyRow, RiskSlot};

/// Boundaries (driving) LEFT JOIN the chosen map view on country.
///
/// Every boundary becomes one feature; boundaries with no view row carry the
/// `No data` sentinel in every attribute.
pub fn map_features(boundaries: &[BoundaryRecord], view: &[MonthlyRow]) -> FeatureCollection {
    let joined = left_join(boundaries, view, |b| b.country.clone(), |r| r.country.clone());
    let missing = unmatched(&joined);
    debug!(features = joined.len(), unmatched = missing, "map join complete");
    metrics::fusion::rows_out("map", joined.len());
    metrics::fusion::unmatched_rows("map", missing);

    let features = joined
        .into_iter()
        .map(|(boundary, row)| Feature {
            bbox: None,
            geometry: boundary.geometry.clone(),
            id: None,
            properties: Some(properties(boundary, row)),
            foreign_members: None,
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn properties(boundary: &BoundaryRecord, row: Option<&MonthlyRow>) -> JsonObject {
    let mut props = JsonObject::new();
    props.insert("country".to_string(), JsonValue::from(boundary.country.clone()));
    props.insert(
        "stateabb".to_string(),
        JsonValue::from(boundary.stateabb.clone().unwrap_or_else(|| NO_DATA.to_string())),
    );

    match row {
        Some(row) => {
            props.insert("leader".to_string(), JsonValue::from(row.leader.clone()));
            props.insert(
                "tenure_months".to_string(),
                row.tenure_months.map(JsonValue::from).unwrap_or_else(no_data),
            );
            props.insert("government".to_string(), JsonValue::from(row.government.clone()));
            props.insert("anticipation".to_string(), JsonValue::from(row.anticipation));
            props.insert("period".to_string(), JsonValue::from(row.period.to_string()));
            props.insert("dates".to_string(), JsonValue::from(row.election.to_string()));
            props.insert("pred_risk".to_string(), risk_value(row.pred_vio));
            props.insert(
                "pred_risk_pct".to_string(),
                risk_value(RiskSlot::from(row.pred_vio.value().map(percent))),
            );
        }
        None => {
            for key in [
                "leader",
                "tenure_months",
                "government",
                "anticipation",
                "period",
                "dates",
                "pred_risk",
                "pred_risk_pct",
            ] {
                props.insert(key.to_string(), no_data());
            }
        }
    }
    props
}

fn risk_value(slot: RiskSlot) -> JsonValue {
    match slot {
        RiskSlot::Scored(v) => JsonValue::from(v),
        RiskSlot::Unscored => JsonValue::from(slot.to_string()),
    }
}

fn no_data() -> JsonValue {
    JsonValue::from(NO_DATA)
}

pub fn map_geojson(collection: &FeatureCollection) -> Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec(collection)?;
    bytes.push(b'\n');
    Ok(bytes)
}
