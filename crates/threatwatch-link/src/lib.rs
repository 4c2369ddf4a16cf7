//! threatwatch-link: the network edge of the console.
//!
//! - [`StreamClient`]: resilient WebSocket subscription with fixed-delay
//!   reconnect and locally synthesized connectivity events.
//! - [`CommandGateway`]: one-shot HTTP commands to the backend API.
//!
//! Both are built from an explicit [`LinkConfig`]; reconfiguring means
//! building new instances.

pub mod config;
pub mod error;
pub mod gateway;
pub mod stream;
pub mod transport;

pub use config::LinkConfig;
pub use error::LinkError;
pub use gateway::{CommandGateway, RegisterUnit, TelemetryUpdate};
pub use stream::{StreamClient, Subscription};
pub use transport::{FrameStream, Transport, WsTransport};
