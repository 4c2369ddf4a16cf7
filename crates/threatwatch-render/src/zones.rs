//! Area-risk geometry. Rebuilt from scratch on every snapshot.

use serde::Serialize;

use threatwatch_core::{Position, RiskLevel, Unit};

use crate::config::RenderConfig;

pub const CORRIDOR_COLOR: &str = "#ff1744";

/// Circular influence area around one risky unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskZone {
    pub unit_id: String,
    pub center: Position,
    pub radius_m: f64,
    pub level: RiskLevel,
    pub color: &'static str,
}

/// Area linking two nearby high-risk units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreatCorridor {
    pub unit_ids: (String, String),
    pub center: Position,
    pub radius_m: f64,
    pub separation_m: f64,
}

pub fn risk_zones(units: &[Unit], config: &RenderConfig) -> Vec<RiskZone> {
    units
        .iter()
        .filter(|u| u.risk_score > config.zone_min_risk)
        .map(|u| {
            let level = u.risk_level();
            RiskZone {
                unit_id: u.unit_id.clone(),
                center: u.position,
                radius_m: config.zone_base_radius_m + u.risk_score * config.zone_risk_scale_m,
                level,
                color: level.color(),
            }
        })
        .collect()
}

/// One corridor per unordered pair of high-risk units closer than the
/// proximity cutoff. Quadratic in the high-risk subset only.
pub fn threat_corridors(units: &[Unit], config: &RenderConfig) -> Vec<ThreatCorridor> {
    let hot: Vec<&Unit> = units
        .iter()
        .filter(|u| u.risk_score > config.corridor_min_risk)
        .collect();

    let mut corridors = Vec::new();
    for (i, a) in hot.iter().enumerate() {
        for b in &hot[i + 1..] {
            let separation_m = a.position.distance_m(&b.position);
            if separation_m < config.corridor_max_separation_m {
                corridors.push(ThreatCorridor {
                    unit_ids: (a.unit_id.clone(), b.unit_id.clone()),
                    center: a.position.midpoint(&b.position),
                    radius_m: separation_m / 2.0 + config.corridor_radius_margin_m,
                    separation_m,
                });
            }
        }
    }
    corridors
}
