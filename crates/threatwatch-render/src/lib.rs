//! threatwatch-render: turns unit snapshots into a map picture — marker
//! placement and animation, motion trails, risk zones, threat corridors,
//! and one-shot viewport fitting.
//!
//! Pure and deterministic: the host passes its animation clock in as
//! `now_ms`, and reads the resulting scene back through accessors.

pub mod config;
pub mod engine;
pub mod marker;
pub mod trail;
pub mod viewport;
pub mod zones;

pub use config::RenderConfig;
pub use engine::{DestinationIndicator, GeoRenderEngine, MapEvent, RouteLine, SyncReport};
pub use marker::{Marker, MarkerShape, MarkerStyle, Motion, ease_out};
pub use trail::{TRAIL_CAPACITY, TrailBuffer};
pub use viewport::Viewport;
pub use zones::{CORRIDOR_COLOR, RiskZone, ThreatCorridor, risk_zones, threat_corridors};
