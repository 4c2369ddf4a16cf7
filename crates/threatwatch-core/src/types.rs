use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::risk::RiskLevel;

// ─── Position ─────────────────────────────────────────────────────

/// WGS84 coordinate in decimal degrees.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
}

impl Position {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lon)
    }
}

// ─── Unit ─────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitStatus {
    Active,
    #[default]
    Idle,
    Paused,
    Offline,
}

impl UnitStatus {
    pub const ALL: [Self; 4] = [Self::Active, Self::Idle, Self::Paused, Self::Offline];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Idle => "idle",
            Self::Paused => "paused",
            Self::Offline => "offline",
        }
    }
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "idle" => Ok(Self::Idle),
            "paused" => Ok(Self::Paused),
            "offline" => Ok(Self::Offline),
            _ => Err(ParseError::UnknownVariant {
                kind: "unit status",
                value: s.to_string(),
            }),
        }
    }
}

/// A tracked field unit as last reported by the backend.
///
/// `risk_score` and `anomaly_score` are in `[0, 1]` by upstream contract;
/// nothing in this workspace clamps them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub unit_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Flattened: the wire carries `lat`/`lon` at the top level.
    #[serde(flatten)]
    pub position: Position,
    pub status: UnitStatus,
    #[serde(default)]
    pub speed_mps: f64,
    #[serde(default)]
    pub direction_deg: f64,
    #[serde(default)]
    pub anomaly_score: f64,
    #[serde(default)]
    pub risk_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<Position>,
    pub last_update: DateTime<Utc>,
}

impl Unit {
    /// Idle unit with zeroed scores.
    pub fn new(unit_id: impl Into<String>, position: Position, last_update: DateTime<Utc>) -> Self {
        Self {
            unit_id: unit_id.into(),
            label: None,
            position,
            status: UnitStatus::Idle,
            speed_mps: 0.0,
            direction_deg: 0.0,
            anomaly_score: 0.0,
            risk_score: 0.0,
            destination: None,
            last_update,
        }
    }

    /// Operator-facing name: the label when set, the id otherwise.
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.unit_id)
    }

    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::classify(self.risk_score)
    }
}

// ─── Alert ────────────────────────────────────────────────────────

/// Ordered: `Low` < `Elevated` < `High` < `Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Elevated,
    High,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Elevated => "elevated",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable once received; replaced wholesale by the next alert snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub alert_id: String,
    pub severity: AlertSeverity,
    pub message: String,
    /// May reference units that are not in the current unit snapshot.
    #[serde(default)]
    pub affected_units: Vec<String>,
    pub created_at: DateTime<Utc>,
}

// ─── ML status ────────────────────────────────────────────────────

/// Auxiliary model status pushed alongside snapshots. Fields other than
/// `trained` are opaque and kept verbatim.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlStatus {
    #[serde(default)]
    pub trained: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_deserializes_flat_wire_shape() {
        let json = r#"{
            "unit_id": "alpha-1",
            "lat": 37.7749,
            "lon": -122.4194,
            "status": "active",
            "speed_mps": 4.5,
            "direction_deg": 90.0,
            "anomaly_score": 0.12,
            "risk_score": 0.31,
            "destination": {"lat": 37.8, "lon": -122.4},
            "last_update": "2026-01-01T00:00:00Z"
        }"#;
        let unit: Unit = serde_json::from_str(json).expect("unit should parse");
        assert_eq!(unit.unit_id, "alpha-1");
        assert_eq!(unit.position, Position::new(37.7749, -122.4194));
        assert_eq!(unit.status, UnitStatus::Active);
        assert_eq!(unit.destination, Some(Position::new(37.8, -122.4)));
        assert_eq!(unit.label, None);
        assert_eq!(unit.risk_level(), RiskLevel::Elevated);
    }

    #[test]
    fn unit_serializes_back_to_flat_shape() {
        let json = r#"{"unit_id":"u-1","lat":1.0,"lon":2.0,"status":"idle","last_update":"2026-01-01T00:00:00Z"}"#;
        let unit: Unit = serde_json::from_str(json).expect("unit should parse");
        let value = serde_json::to_value(&unit).expect("serialize");
        assert_eq!(value["lat"], 1.0);
        assert_eq!(value["lon"], 2.0);
        assert!(value.get("position").is_none());
        assert!(value.get("destination").is_none());
    }

    #[test]
    fn unit_rejects_unknown_status() {
        let json = r#"{"unit_id":"u-1","lat":1.0,"lon":2.0,"status":"sleeping","last_update":"2026-01-01T00:00:00Z"}"#;
        assert!(serde_json::from_str::<Unit>(json).is_err());
    }

    #[test]
    fn unit_status_from_str_roundtrips_all() {
        for status in UnitStatus::ALL {
            assert_eq!(status.as_str().parse::<UnitStatus>().ok(), Some(status));
        }
        assert!("ACTIVE".parse::<UnitStatus>().is_ok());
        assert!("moving".parse::<UnitStatus>().is_err());
    }

    #[test]
    fn alert_severity_is_ordered() {
        assert!(AlertSeverity::Low < AlertSeverity::Elevated);
        assert!(AlertSeverity::Elevated < AlertSeverity::High);
        assert!(AlertSeverity::High < AlertSeverity::Critical);
    }

    #[test]
    fn alert_defaults_affected_units() {
        let json = r#"{"alert_id":"a-1","severity":"high","message":"m","created_at":"2026-01-01T00:00:00Z"}"#;
        let alert: Alert = serde_json::from_str(json).expect("alert should parse");
        assert!(alert.affected_units.is_empty());
        assert_eq!(alert.severity, AlertSeverity::High);
    }

    #[test]
    fn ml_status_keeps_extra_fields() {
        let json = r#"{"trained": true, "samples": 120, "model": "iforest"}"#;
        let status: MlStatus = serde_json::from_str(json).expect("ml_status should parse");
        assert!(status.trained);
        assert_eq!(status.extra.get("samples"), Some(&serde_json::json!(120)));
        assert_eq!(status.extra.len(), 2);
    }

    #[test]
    fn display_name_prefers_label() {
        let ts = DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
            .expect("timestamp")
            .with_timezone(&Utc);
        let mut unit = Unit::new("u-7", Position::new(0.0, 0.0), ts);
        assert_eq!(unit.display_name(), "u-7");
        unit.label = Some("Bravo".into());
        assert_eq!(unit.display_name(), "Bravo");
        assert_eq!(unit.status, UnitStatus::Idle);
    }
}
