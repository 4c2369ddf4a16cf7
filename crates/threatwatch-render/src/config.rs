//! Render tuning. Defaults reproduce the operational map view.

use crate::trail::TRAIL_CAPACITY;

#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Moves at or below this distance snap instead of animating.
    pub animation_threshold_m: f64,
    pub animation_duration_ms: u64,
    /// Minimum step between consecutive trail points.
    pub trail_threshold_m: f64,
    pub trail_capacity: usize,
    /// Units strictly above this score get a risk zone.
    pub zone_min_risk: f64,
    pub zone_base_radius_m: f64,
    pub zone_risk_scale_m: f64,
    /// Both units of a pair must be strictly above this score.
    pub corridor_min_risk: f64,
    /// Pairs strictly closer than this get a corridor.
    pub corridor_max_separation_m: f64,
    pub corridor_radius_margin_m: f64,
    /// Fraction of the marker bounds added on every side when fitting.
    pub fit_padding: f64,
    pub fit_max_zoom: u8,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            animation_threshold_m: 0.5,
            animation_duration_ms: 800,
            trail_threshold_m: 1.0,
            trail_capacity: TRAIL_CAPACITY,
            zone_min_risk: 0.15,
            zone_base_radius_m: 80.0,
            zone_risk_scale_m: 500.0,
            corridor_min_risk: 0.55,
            corridor_max_separation_m: 3_000.0,
            corridor_radius_margin_m: 200.0,
            fit_padding: 0.4,
            fit_max_zoom: 14,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = RenderConfig::default();
        assert_eq!(config.animation_duration_ms, 800);
        assert_eq!(config.trail_capacity, 60);
        assert_eq!(config.corridor_max_separation_m, 3_000.0);
        assert_eq!(config.fit_max_zoom, 14);
    }
}
