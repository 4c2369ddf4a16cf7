//! Bounded operator status log, newest entry first.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};

use crate::session::DestinationIntent;

pub const COMMAND_LOG_CAPACITY: usize = 30;

#[derive(Debug, Clone)]
pub struct CommandLog {
    entries: VecDeque<String>,
    capacity: usize,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::with_capacity(COMMAND_LOG_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Prepend `[HH:MM:SS] message` (UTC) and return the stored line.
    pub fn push(&mut self, at: DateTime<Utc>, message: impl fmt::Display) -> &str {
        self.entries
            .push_front(format!("[{}] {message}", at.format("%H:%M:%S")));
        self.entries.truncate(self.capacity);
        self.entries.front().map_or("", String::as_str)
    }

    pub fn record_assign(&mut self, at: DateTime<Utc>, intent: &DestinationIntent) -> &str {
        self.push(
            at,
            format_args!(
                "ASSIGN {} \u{2192} {:.4}, {:.4}",
                intent.unit_id, intent.destination.lat, intent.destination.lon
            ),
        )
    }

    pub fn record_confirmed(&mut self, at: DateTime<Utc>, unit_id: &str) -> &str {
        self.push(at, format_args!("\u{2713} {unit_id} destination confirmed"))
    }

    pub fn record_failure(&mut self, at: DateTime<Utc>, detail: impl fmt::Display) -> &str {
        self.push(at, format_args!("\u{2717} FAIL: {detail}"))
    }

    /// Newest first.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CommandLog {
    fn default() -> Self {
        Self::new()
    }
}
