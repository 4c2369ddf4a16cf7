//! Per-unit marker: rendered position, cooperative move animation, and
//! visual style derived from risk and status.

use serde::Serialize;

use threatwatch_core::{Position, RiskLevel, Unit, UnitStatus};

// ─── Style ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerShape {
    Square,
    Round,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarkerStyle {
    pub level: RiskLevel,
    pub color: &'static str,
    pub glyph: char,
    pub shape: MarkerShape,
    pub size_px: u32,
    pub pulsing: bool,
}

impl MarkerStyle {
    pub fn new(level: RiskLevel, status: UnitStatus) -> Self {
        let glyph = match status {
            UnitStatus::Active => '\u{25B2}',
            UnitStatus::Paused => '\u{25A0}',
            UnitStatus::Idle => '\u{25CF}',
            UnitStatus::Offline => '\u{25CB}',
        };
        let shape = if status == UnitStatus::Active {
            MarkerShape::Square
        } else {
            MarkerShape::Round
        };
        Self {
            level,
            color: level.color(),
            glyph,
            shape,
            size_px: if level.is_emphasized() { 22 } else { 16 },
            pulsing: level == RiskLevel::Critical,
        }
    }

    pub fn for_unit(unit: &Unit) -> Self {
        Self::new(unit.risk_level(), unit.status)
    }
}

// ─── Animation ────────────────────────────────────────────────────

/// Ease-out quadratic `t·(2−t)`; input is clamped to `[0, 1]`.
pub fn ease_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * (2.0 - t)
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct MarkerAnimation {
    from: Position,
    to: Position,
    started_at_ms: u64,
    duration_ms: u64,
}

impl MarkerAnimation {
    fn progress(&self, now_ms: u64) -> f64 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        let elapsed = now_ms.saturating_sub(self.started_at_ms) as f64;
        let duration = self.duration_ms as f64;
        (elapsed / duration).min(1.0)
    }
}

/// What a position update did to the marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    /// Started (or restarted) a move animation.
    Animated,
    /// Jumped straight to the new position.
    Snapped,
    /// Same target as the running animation; left untouched.
    Continuing,
}

// ─── Marker ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    unit_id: String,
    position: Position,
    target: Position,
    style: MarkerStyle,
    animation: Option<MarkerAnimation>,
}

impl Marker {
    pub fn new(unit_id: impl Into<String>, position: Position, style: MarkerStyle) -> Self {
        Self {
            unit_id: unit_id.into(),
            position,
            target: position,
            style,
            animation: None,
        }
    }

    pub fn unit_id(&self) -> &str {
        &self.unit_id
    }

    /// Where the marker is currently drawn.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Where the marker is heading (the last reported position).
    pub fn target(&self) -> Position {
        self.target
    }

    pub fn style(&self) -> &MarkerStyle {
        &self.style
    }

    pub fn set_style(&mut self, style: MarkerStyle) {
        self.style = style;
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Point the marker at a newly reported position.
    ///
    /// The decision is made against the rendered position at `now_ms`, so a
    /// target arriving mid-animation continues smoothly from wherever the
    /// marker currently is.
    pub fn move_to(
        &mut self,
        target: Position,
        now_ms: u64,
        threshold_m: f64,
        duration_ms: u64,
    ) -> Motion {
        self.advance(now_ms);

        if let Some(anim) = &self.animation {
            if anim.to.distance_m(&target) <= threshold_m {
                self.target = target;
                return Motion::Continuing;
            }
        }

        self.target = target;
        if self.position.distance_m(&target) > threshold_m {
            self.animation = Some(MarkerAnimation {
                from: self.position,
                to: target,
                started_at_ms: now_ms,
                duration_ms,
            });
            Motion::Animated
        } else {
            self.position = target;
            self.animation = None;
            Motion::Snapped
        }
    }

    /// Per-frame step. Returns `true` while the animation is still running.
    pub fn advance(&mut self, now_ms: u64) -> bool {
        let Some(anim) = self.animation else {
            return false;
        };
        let t = anim.progress(now_ms);
        if t >= 1.0 {
            self.position = anim.to;
            self.animation = None;
            return false;
        }
        self.position = anim.from.lerp(&anim.to, ease_out(t));
        true
    }
}
