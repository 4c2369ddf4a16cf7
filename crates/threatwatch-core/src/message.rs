//! Stream message boundary: raw backend frames become a closed
//! [`StreamEvent`] union here, so nothing downstream has to probe optional
//! JSON fields.

use std::collections::HashSet;

use serde::Deserialize;

use crate::error::ParseError;
use crate::types::{Alert, MlStatus, Unit};

/// Type tags that only the local stream client may produce.
const RESERVED_TYPES: [&str; 2] = ["connected", "disconnected"];

/// Collections carried by one backend message. Each `Some` field replaces
/// the stored collection in full; `None` leaves it untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotUpdate {
    pub units: Option<Vec<Unit>>,
    pub active_alerts: Option<Vec<Alert>>,
    pub ml_status: Option<MlStatus>,
}

impl SnapshotUpdate {
    pub fn units(units: Vec<Unit>) -> Self {
        Self {
            units: Some(units),
            ..Self::default()
        }
    }

    pub fn alerts(alerts: Vec<Alert>) -> Self {
        Self {
            active_alerts: Some(alerts),
            ..Self::default()
        }
    }

    /// True when the message carried none of the known collections.
    pub fn is_empty(&self) -> bool {
        self.units.is_none() && self.active_alerts.is_none() && self.ml_status.is_none()
    }
}

/// Everything a stream subscriber can observe.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Synthesized locally when the channel opens.
    Connected,
    /// Synthesized locally when the channel closes for any reason.
    Disconnected,
    Snapshot(SnapshotUpdate),
}

impl StreamEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Snapshot(_) => "snapshot",
        }
    }
}

#[derive(Debug, Deserialize)]
struct WirePayload {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    units: Option<Vec<Unit>>,
    #[serde(default)]
    active_alerts: Option<Vec<Alert>>,
    #[serde(default)]
    ml_status: Option<MlStatus>,
}

/// Validate one inbound text frame.
///
/// Unknown `type` values are ignored and the collections are still read.
/// A `units` array with a repeated `unit_id` is rejected as a whole.
pub fn parse_stream_message(text: &str) -> Result<StreamEvent, ParseError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    if !value.is_object() {
        return Err(ParseError::NotAnObject);
    }
    let payload: WirePayload = serde_json::from_value(value)?;

    if let Some(kind) = payload.kind.as_deref() {
        if RESERVED_TYPES.contains(&kind) {
            return Err(ParseError::ReservedType(kind.to_string()));
        }
    }

    if let Some(units) = &payload.units {
        let mut seen = HashSet::with_capacity(units.len());
        for unit in units {
            if !seen.insert(unit.unit_id.as_str()) {
                return Err(ParseError::DuplicateUnit(unit.unit_id.clone()));
            }
        }
    }

    Ok(StreamEvent::Snapshot(SnapshotUpdate {
        units: payload.units,
        active_alerts: payload.active_alerts,
        ml_status: payload.ml_status,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AlertSeverity, UnitStatus};

    fn unit_json(id: &str, risk: f64) -> String {
        format!(
            r#"{{"unit_id":"{id}","lat":37.77,"lon":-122.41,"status":"active","speed_mps":3.0,"direction_deg":45.0,"anomaly_score":0.1,"risk_score":{risk},"last_update":"2026-01-01T00:00:00Z"}}"#
        )
    }

    #[test]
    fn full_snapshot_parses() {
        let text = format!(
            r#"{{"units":[{},{}],"active_alerts":[{{"alert_id":"a-1","severity":"critical","message":"convergence","affected_units":["u-1","u-9"],"created_at":"2026-01-01T00:00:00Z"}}],"ml_status":{{"trained":true}}}}"#,
            unit_json("u-1", 0.8),
            unit_json("u-2", 0.2)
        );
        let StreamEvent::Snapshot(update) = parse_stream_message(&text).expect("should parse") else {
            panic!("expected snapshot");
        };
        let units = update.units.expect("units present");
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].status, UnitStatus::Active);
        let alerts = update.active_alerts.expect("alerts present");
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
        assert_eq!(alerts[0].affected_units, vec!["u-1", "u-9"]);
        assert!(update.ml_status.expect("ml_status present").trained);
    }

    #[test]
    fn alerts_only_payload_leaves_units_absent() {
        let text = r#"{"active_alerts":[]}"#;
        let StreamEvent::Snapshot(update) = parse_stream_message(text).expect("should parse") else {
            panic!("expected snapshot");
        };
        assert!(update.units.is_none());
        assert_eq!(update.active_alerts, Some(vec![]));
    }

    #[test]
    fn empty_units_array_is_present_not_absent() {
        let StreamEvent::Snapshot(update) = parse_stream_message(r#"{"units":[]}"#).expect("should parse") else {
            panic!("expected snapshot");
        };
        assert_eq!(update.units, Some(vec![]));
    }

    #[test]
    fn unknown_type_is_ignored() {
        let text = format!(r#"{{"type":"state_update","units":[{}]}}"#, unit_json("u-1", 0.5));
        let event = parse_stream_message(&text).expect("should parse");
        assert_eq!(event.kind(), "snapshot");
    }

    #[test]
    fn reserved_types_are_rejected() {
        for kind in ["connected", "disconnected"] {
            let text = format!(r#"{{"type":"{kind}"}}"#);
            assert!(
                matches!(parse_stream_message(&text), Err(ParseError::ReservedType(_))),
                "{kind} must not be accepted from the wire"
            );
        }
    }

    #[test]
    fn duplicate_unit_ids_are_rejected() {
        let text = format!(r#"{{"units":[{},{}]}}"#, unit_json("u-1", 0.1), unit_json("u-1", 0.2));
        match parse_stream_message(&text) {
            Err(ParseError::DuplicateUnit(id)) => assert_eq!(id, "u-1"),
            other => panic!("expected duplicate error, got {other:?}"),
        }
    }

    #[test]
    fn non_object_payloads_are_rejected() {
        assert!(matches!(parse_stream_message("[1,2,3]"), Err(ParseError::NotAnObject)));
        assert!(matches!(parse_stream_message("42"), Err(ParseError::NotAnObject)));
    }

    #[test]
    fn invalid_json_is_rejected() {
        assert!(matches!(parse_stream_message("not json {{"), Err(ParseError::Json(_))));
    }

    #[test]
    fn malformed_unit_rejects_message() {
        let text = r#"{"units":[{"unit_id":"u-1","lat":"north"}]}"#;
        assert!(parse_stream_message(text).is_err());
    }

    #[test]
    fn null_collections_count_as_absent() {
        let StreamEvent::Snapshot(update) =
            parse_stream_message(r#"{"units":null,"ml_status":{"trained":false}}"#).expect("should parse")
        else {
            panic!("expected snapshot");
        };
        assert!(update.units.is_none());
        assert!(!update.is_empty());
    }

    #[test]
    fn empty_object_is_an_empty_snapshot() {
        let StreamEvent::Snapshot(update) = parse_stream_message("{}").expect("should parse") else {
            panic!("expected snapshot");
        };
        assert!(update.is_empty());
    }
}
