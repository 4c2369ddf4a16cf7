//! GeoRenderEngine: owns every derived map projection of the unit snapshot.
//!
//! The engine never holds authoritative data. Markers and trails are keyed
//! by `unit_id` and torn down as soon as a unit is absent from a snapshot;
//! zones and corridors are recomputed in full on each `sync`.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{debug, info};

use threatwatch_core::{GeoBounds, Position, Unit};

use crate::config::RenderConfig;
use crate::marker::{Marker, MarkerStyle, Motion};
use crate::trail::TrailBuffer;
use crate::viewport::Viewport;
use crate::zones::{RiskZone, ThreatCorridor, risk_zones, threat_corridors};

// ─── Map events ───────────────────────────────────────────────────

/// Operator interactions surfaced by the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MapEvent {
    UnitSelected { unit_id: String },
    PointPicked { position: Position },
    Cancel,
}

// ─── Destination indicator ────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RouteLine {
    pub from: Position,
    pub to: Position,
}

/// The single pending destination shown on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DestinationIndicator {
    pub unit_id: String,
    pub target: Position,
    /// Absent when the unit's position was unknown at pick time.
    pub route: Option<RouteLine>,
}

// ─── Sync report ──────────────────────────────────────────────────

/// What one `sync` changed. Used for logging and by tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub created: Vec<String>,
    pub removed: Vec<String>,
    pub animated: usize,
    pub snapped: usize,
    pub trail_appends: usize,
    pub fitted: bool,
}

// ─── Engine ───────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct GeoRenderEngine {
    config: RenderConfig,
    markers: BTreeMap<String, Marker>,
    trails: BTreeMap<String, TrailBuffer>,
    risk_zones: Vec<RiskZone>,
    corridors: Vec<ThreatCorridor>,
    viewport: Viewport,
    destination: Option<DestinationIndicator>,
}

impl GeoRenderEngine {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            markers: BTreeMap::new(),
            trails: BTreeMap::new(),
            risk_zones: Vec::new(),
            corridors: Vec::new(),
            viewport: Viewport::new(),
            destination: None,
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Reconcile the map with a full unit snapshot.
    pub fn sync(&mut self, units: &[Unit], now_ms: u64) -> SyncReport {
        let mut report = SyncReport::default();
        let live: BTreeSet<&str> = units.iter().map(|u| u.unit_id.as_str()).collect();

        let stale: Vec<String> = self
            .markers
            .keys()
            .filter(|id| !live.contains(id.as_str()))
            .cloned()
            .collect();
        for id in stale {
            self.markers.remove(&id);
            self.trails.remove(&id);
            if self.destination.as_ref().is_some_and(|d| d.unit_id == id) {
                self.destination = None;
            }
            debug!(unit_id = %id, "marker removed");
            report.removed.push(id);
        }

        for unit in units {
            let style = MarkerStyle::for_unit(unit);
            match self.markers.get_mut(&unit.unit_id) {
                Some(marker) => {
                    marker.set_style(style);
                    match marker.move_to(
                        unit.position,
                        now_ms,
                        self.config.animation_threshold_m,
                        self.config.animation_duration_ms,
                    ) {
                        Motion::Animated => report.animated += 1,
                        Motion::Snapped => report.snapped += 1,
                        Motion::Continuing => {}
                    }
                }
                None => {
                    self.markers.insert(
                        unit.unit_id.clone(),
                        Marker::new(unit.unit_id.clone(), unit.position, style),
                    );
                    debug!(unit_id = %unit.unit_id, "marker created");
                    report.created.push(unit.unit_id.clone());
                }
            }

            let trail = self.trails.entry(unit.unit_id.clone()).or_insert_with(|| {
                TrailBuffer::with_limits(self.config.trail_capacity, self.config.trail_threshold_m)
            });
            if trail.push(unit.position) {
                trail.set_color(style.color);
                report.trail_appends += 1;
            }
        }

        self.risk_zones = risk_zones(units, &self.config);
        self.corridors = threat_corridors(units, &self.config);

        let positions: Vec<Position> = units.iter().map(|u| u.position).collect();
        if self
            .viewport
            .fit_once(&positions, self.config.fit_padding, self.config.fit_max_zoom)
        {
            info!(units = units.len(), "viewport fitted to units");
            report.fitted = true;
        }

        report
    }

    /// Advance every in-flight animation. Returns `true` while any is running.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        let mut running = false;
        for marker in self.markers.values_mut() {
            running |= marker.advance(now_ms);
        }
        running
    }

    pub fn is_animating(&self) -> bool {
        self.markers.values().any(Marker::is_animating)
    }

    /// Replace the pending destination indicator.
    pub fn show_destination(&mut self, unit_id: &str, origin: Option<Position>, target: Position) {
        self.destination = Some(DestinationIndicator {
            unit_id: unit_id.to_string(),
            target,
            route: origin.map(|from| RouteLine { from, to: target }),
        });
    }

    pub fn clear_destination(&mut self) {
        self.destination = None;
    }

    pub fn set_view(&mut self, bounds: GeoBounds) {
        self.viewport.set_view(bounds);
    }

    /// `None` when no marker exists for `unit_id`.
    pub fn select_unit(&self, unit_id: &str) -> Option<MapEvent> {
        self.markers.contains_key(unit_id).then(|| MapEvent::UnitSelected {
            unit_id: unit_id.to_string(),
        })
    }

    pub fn pick_point(&self, position: Position) -> MapEvent {
        MapEvent::PointPicked { position }
    }

    // ─── Accessors ────────────────────────────────────────────────

    pub fn markers(&self) -> impl Iterator<Item = &Marker> {
        self.markers.values()
    }

    pub fn marker(&self, unit_id: &str) -> Option<&Marker> {
        self.markers.get(unit_id)
    }

    pub fn trail(&self, unit_id: &str) -> Option<&TrailBuffer> {
        self.trails.get(unit_id)
    }

    pub fn risk_zones(&self) -> &[RiskZone] {
        &self.risk_zones
    }

    pub fn corridors(&self) -> &[ThreatCorridor] {
        &self.corridors
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn destination(&self) -> Option<&DestinationIndicator> {
        self.destination.as_ref()
    }
}

impl Default for GeoRenderEngine {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}
