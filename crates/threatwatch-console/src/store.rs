//! EntityStore: the single authoritative copy of what the backend last said.
//!
//! Every present collection in a snapshot replaces the stored one in full.
//! Readers get `Arc` slices; the same allocation is handed out until the
//! next replacement, so consecutive reads between two applies are identical.

use std::sync::Arc;

use tracing::debug;

use threatwatch_core::{Alert, MlStatus, SnapshotUpdate, StreamEvent, Unit};

/// Which parts of the store an event touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreChange {
    pub units: bool,
    pub alerts: bool,
    pub ml_status: bool,
    pub connectivity: bool,
}

impl StoreChange {
    pub fn is_empty(&self) -> bool {
        !(self.units || self.alerts || self.ml_status || self.connectivity)
    }
}

#[derive(Debug, Clone)]
pub struct EntityStore {
    units: Arc<[Unit]>,
    alerts: Arc<[Alert]>,
    ml_status: MlStatus,
    connected: bool,
    revision: u64,
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            units: Arc::from(Vec::new()),
            alerts: Arc::from(Vec::new()),
            ml_status: MlStatus::default(),
            connected: false,
            revision: 0,
        }
    }

    /// Route any stream event. Connectivity events flip the uplink flag and
    /// leave the data untouched.
    pub fn apply(&mut self, event: StreamEvent) -> StoreChange {
        match event {
            StreamEvent::Connected => self.set_connected(true),
            StreamEvent::Disconnected => self.set_connected(false),
            StreamEvent::Snapshot(update) => self.apply_snapshot(update),
        }
    }

    pub fn apply_snapshot(&mut self, update: SnapshotUpdate) -> StoreChange {
        let mut change = StoreChange::default();
        if let Some(units) = update.units {
            self.units = Arc::from(units);
            change.units = true;
        }
        if let Some(alerts) = update.active_alerts {
            self.alerts = Arc::from(alerts);
            change.alerts = true;
        }
        if let Some(status) = update.ml_status {
            self.ml_status = status;
            change.ml_status = true;
        }
        if !change.is_empty() {
            self.revision += 1;
            debug!(
                revision = self.revision,
                units = self.units.len(),
                alerts = self.alerts.len(),
                "snapshot applied"
            );
        }
        change
    }

    fn set_connected(&mut self, connected: bool) -> StoreChange {
        let changed = self.connected != connected;
        self.connected = connected;
        StoreChange {
            connectivity: changed,
            ..StoreChange::default()
        }
    }

    // ─── Reads ────────────────────────────────────────────────────

    pub fn units(&self) -> Arc<[Unit]> {
        Arc::clone(&self.units)
    }

    pub fn alerts(&self) -> Arc<[Alert]> {
        Arc::clone(&self.alerts)
    }

    pub fn unit(&self, unit_id: &str) -> Option<&Unit> {
        self.units.iter().find(|u| u.unit_id == unit_id)
    }

    pub fn ml_status(&self) -> &MlStatus {
        &self.ml_status
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Bumped once per snapshot that replaced anything.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}
