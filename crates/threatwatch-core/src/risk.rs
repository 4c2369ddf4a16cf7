//! Risk classification shared by every visual layer.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const CRITICAL_THRESHOLD: f64 = 0.75;
pub const HIGH_THRESHOLD: f64 = 0.55;
pub const ELEVATED_THRESHOLD: f64 = 0.30;

/// Ordered: `Low` < `Elevated` < `High` < `Critical`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Elevated,
    High,
    Critical,
}

impl RiskLevel {
    /// Lower bounds are inclusive. Scores that compare false against every
    /// threshold (NaN) fall through to `Low`.
    pub fn classify(score: f64) -> Self {
        if score >= CRITICAL_THRESHOLD {
            Self::Critical
        } else if score >= HIGH_THRESHOLD {
            Self::High
        } else if score >= ELEVATED_THRESHOLD {
            Self::Elevated
        } else {
            Self::Low
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Self::Critical => "#ff1744",
            Self::High => "#ff6d00",
            Self::Elevated => "#ffd600",
            Self::Low => "#4caf50",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::High => "HIGH",
            Self::Elevated => "ELEVATED",
            Self::Low => "NORMAL",
        }
    }

    /// Four-letter tag used in compact listings.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Critical => "CRIT",
            Self::High => "HIGH",
            Self::Elevated => "ELEV",
            Self::Low => "LOW",
        }
    }

    /// High and critical units get the enlarged marker.
    pub fn is_emphasized(self) -> bool {
        self >= Self::High
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_scores_classify() {
        assert_eq!(RiskLevel::classify(0.80), RiskLevel::Critical);
        assert_eq!(RiskLevel::classify(0.60), RiskLevel::High);
        assert_eq!(RiskLevel::classify(0.40), RiskLevel::Elevated);
        assert_eq!(RiskLevel::classify(0.10), RiskLevel::Low);
    }

    #[test]
    fn thresholds_are_inclusive() {
        assert_eq!(RiskLevel::classify(0.75), RiskLevel::Critical);
        assert_eq!(RiskLevel::classify(0.55), RiskLevel::High);
        assert_eq!(RiskLevel::classify(0.30), RiskLevel::Elevated);
        assert_eq!(RiskLevel::classify(0.2999), RiskLevel::Low);
    }

    #[test]
    fn classification_is_monotonic_over_unit_interval() {
        let mut previous = RiskLevel::classify(0.0);
        for i in 0..=1000 {
            let score = f64::from(i) / 1000.0;
            let level = RiskLevel::classify(score);
            assert!(level >= previous, "score {score} dropped from {previous:?} to {level:?}");
            assert_eq!(level, RiskLevel::classify(score), "classification must be stable");
            previous = level;
        }
        assert_eq!(previous, RiskLevel::Critical);
    }

    #[test]
    fn nan_is_low() {
        assert_eq!(RiskLevel::classify(f64::NAN), RiskLevel::Low);
    }

    #[test]
    fn emphasis_starts_at_high() {
        assert!(!RiskLevel::Elevated.is_emphasized());
        assert!(RiskLevel::High.is_emphasized());
        assert!(RiskLevel::Critical.is_emphasized());
    }

    #[test]
    fn colors_are_distinct_per_level() {
        let colors = [
            RiskLevel::Low.color(),
            RiskLevel::Elevated.color(),
            RiskLevel::High.color(),
            RiskLevel::Critical.color(),
        ];
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
