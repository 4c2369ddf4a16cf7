//! threatwatch-core: unit/alert data model, stream payload validation,
//! geodesy helpers, and risk classification.
//! Pure library — no IO, no async, no clocks.

pub mod error;
pub mod geo;
pub mod message;
pub mod risk;
pub mod types;

pub use error::ParseError;
pub use geo::{EARTH_RADIUS_M, GeoBounds};
pub use message::{SnapshotUpdate, StreamEvent, parse_stream_message};
pub use risk::RiskLevel;
pub use types::{Alert, AlertSeverity, MlStatus, Position, Unit, UnitStatus};
