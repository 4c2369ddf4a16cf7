//! threatwatch-console: the operator-side state that sits between the
//! stream and the map.
//!
//! - [`EntityStore`]: authoritative unit/alert snapshots.
//! - [`CommandSession`]: select-then-pick destination workflow.
//! - [`CommandLog`]: bounded operator status lines.
//! - [`HealthSummary`] and [`rank_by_risk`]: read-only digests.

pub mod command_log;
pub mod session;
pub mod store;
pub mod summary;

pub use command_log::{COMMAND_LOG_CAPACITY, CommandLog};
pub use session::{CommandSession, DestinationIntent, SessionState};
pub use store::{EntityStore, StoreChange};
pub use summary::{HealthSummary, alert_line, rank_by_risk, unit_line};
