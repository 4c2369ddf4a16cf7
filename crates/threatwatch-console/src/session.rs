//! Destination-assignment workflow: select a unit, then pick a point.
//!
//! The session only captures intent. It never touches the store; the
//! destination becomes real once it comes back through the stream.

use serde::Serialize;

use threatwatch_core::Position;
use threatwatch_render::MapEvent;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Idle,
    Armed { unit_id: String },
}

/// Operator intent to send `unit_id` to `destination`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DestinationIntent {
    pub unit_id: String,
    pub destination: Position,
}

#[derive(Debug, Clone, Default)]
pub struct CommandSession {
    state: SessionState,
}

impl CommandSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn armed_unit(&self) -> Option<&str> {
        match &self.state {
            SessionState::Armed { unit_id } => Some(unit_id.as_str()),
            SessionState::Idle => None,
        }
    }

    /// Arm for `unit_id`. Re-arms directly when another unit is armed.
    pub fn select(&mut self, unit_id: impl Into<String>) {
        self.state = SessionState::Armed {
            unit_id: unit_id.into(),
        };
    }

    /// Emits an intent only when armed. Always leaves the session idle.
    pub fn pick_point(&mut self, destination: Position) -> Option<DestinationIntent> {
        match std::mem::take(&mut self.state) {
            SessionState::Armed { unit_id } => Some(DestinationIntent {
                unit_id,
                destination,
            }),
            SessionState::Idle => None,
        }
    }

    /// Returns `true` if something was armed.
    pub fn cancel(&mut self) -> bool {
        matches!(std::mem::take(&mut self.state), SessionState::Armed { .. })
    }

    /// Drive the session from a map interaction.
    pub fn handle(&mut self, event: MapEvent) -> Option<DestinationIntent> {
        match event {
            MapEvent::UnitSelected { unit_id } => {
                self.select(unit_id);
                None
            }
            MapEvent::PointPicked { position } => self.pick_point(position),
            MapEvent::Cancel => {
                self.cancel();
                None
            }
        }
    }
}
