//! Bounded per-unit motion history.

use std::collections::VecDeque;

use threatwatch_core::{Position, RiskLevel};

pub const TRAIL_CAPACITY: usize = 60;

/// FIFO of recent positions. Never longer than its capacity; a point is
/// only appended when it is farther than `min_step_m` from the newest one.
#[derive(Debug, Clone, PartialEq)]
pub struct TrailBuffer {
    points: VecDeque<Position>,
    capacity: usize,
    min_step_m: f64,
    color: &'static str,
}

impl TrailBuffer {
    pub fn new() -> Self {
        Self::with_limits(TRAIL_CAPACITY, 1.0)
    }

    /// A zero capacity is raised to one.
    pub fn with_limits(capacity: usize, min_step_m: f64) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
            min_step_m,
            color: RiskLevel::Low.color(),
        }
    }

    /// Returns `true` if the point was appended.
    pub fn push(&mut self, point: Position) -> bool {
        if let Some(last) = self.points.back() {
            if last.distance_m(&point) <= self.min_step_m {
                return false;
            }
        }
        self.points.push_back(point);
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
        true
    }

    pub fn last(&self) -> Option<&Position> {
        self.points.back()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.points.iter()
    }

    pub fn to_vec(&self) -> Vec<Position> {
        self.points.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn color(&self) -> &'static str {
        self.color
    }

    pub fn set_color(&mut self, color: &'static str) {
        self.color = color;
    }
}

impl Default for TrailBuffer {
    fn default() -> Self {
        Self::new()
    }
}
