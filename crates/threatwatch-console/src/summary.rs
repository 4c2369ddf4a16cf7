//! Read-only digests of the store for the operator console.

use std::fmt;

use serde::Serialize;

use threatwatch_core::{Alert, RiskLevel, Unit, UnitStatus};

use crate::store::EntityStore;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthSummary {
    pub connected: bool,
    pub total_units: usize,
    pub active_units: usize,
    /// Mean `risk_score`; zero with no units.
    pub mean_risk: f64,
    pub mean_risk_level: RiskLevel,
    pub ml_trained: bool,
    pub alert_count: usize,
}

impl HealthSummary {
    pub fn from_store(store: &EntityStore) -> Self {
        let units = store.units();
        let mean_risk = if units.is_empty() {
            0.0
        } else {
            units.iter().map(|u| u.risk_score).sum::<f64>() / units.len() as f64
        };
        Self {
            connected: store.is_connected(),
            total_units: units.len(),
            active_units: units.iter().filter(|u| u.status == UnitStatus::Active).count(),
            mean_risk,
            mean_risk_level: RiskLevel::classify(mean_risk),
            ml_trained: store.ml_status().trained,
            alert_count: store.alerts().len(),
        }
    }
}

impl fmt::Display for HealthSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} UNITS | {} ACTIVE | AVG RISK {:.1}% ({}) | ML {} | {} ALERTS",
            if self.connected { "UPLINK ACTIVE" } else { "NO UPLINK" },
            self.total_units,
            self.active_units,
            self.mean_risk * 100.0,
            self.mean_risk_level,
            if self.ml_trained { "TRAINED" } else { "COLLECTING" },
            self.alert_count,
        )
    }
}

/// Units with any risk, highest first. Ties keep snapshot order.
pub fn rank_by_risk(units: &[Unit]) -> Vec<&Unit> {
    let mut ranked: Vec<&Unit> = units.iter().filter(|u| u.risk_score > 0.0).collect();
    ranked.sort_by(|a, b| b.risk_score.total_cmp(&a.risk_score));
    ranked
}

/// One listing row: id, status, speed, heading, anomaly, risk.
pub fn unit_line(unit: &Unit) -> String {
    format!(
        "{:<12} {:<8} {:>6.1} m/s {:>4.0}\u{00B0} anomaly {:.3} risk {:.3} {}",
        unit.display_name(),
        unit.status.as_str(),
        unit.speed_mps,
        unit.direction_deg,
        unit.anomaly_score,
        unit.risk_score,
        unit.risk_level().tag(),
    )
}

pub fn alert_line(alert: &Alert) -> String {
    let mut line = format!(
        "{} {} {}",
        alert.created_at.format("%H:%M:%S"),
        alert.severity.as_str().to_ascii_uppercase(),
        alert.message
    );
    if !alert.affected_units.is_empty() {
        line.push_str(" [");
        line.push_str(&alert.affected_units.join(", "));
        line.push(']');
    }
    line
}
