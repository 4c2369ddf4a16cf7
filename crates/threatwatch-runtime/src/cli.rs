//! CLI definition using clap derive.

use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use threatwatch_core::UnitStatus;
use threatwatch_link::LinkConfig;
use threatwatch_link::config::{DEFAULT_API_URL, DEFAULT_STREAM_URL};

#[derive(Parser, Debug)]
#[command(name = "threatwatch", about = "Operator console for autonomous field units")]
pub struct Cli {
    /// Snapshot stream endpoint
    #[arg(long, global = true, env = "THREATWATCH_STREAM_URL", default_value = DEFAULT_STREAM_URL)]
    pub stream_url: String,

    /// Command API base URL
    #[arg(long, global = true, env = "THREATWATCH_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Wait before reopening a closed stream
    #[arg(long, global = true, env = "THREATWATCH_RECONNECT_DELAY_MS", default_value_t = 3_000)]
    pub reconnect_delay_ms: u64,

    /// Upper bound for one command request
    #[arg(long, global = true, env = "THREATWATCH_REQUEST_TIMEOUT_MS", default_value_t = 10_000)]
    pub request_timeout_ms: u64,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    pub fn link_config(&self) -> LinkConfig {
        LinkConfig {
            stream_url: self.stream_url.clone(),
            api_url: self.api_url.clone(),
            reconnect_delay: Duration::from_millis(self.reconnect_delay_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Live console: stream, map state, and operator commands on stdin (default)
    Console,
    /// Send one unit to a destination
    Assign(AssignOpts),
    /// Register a new unit
    Register(RegisterOpts),
    /// Push a telemetry update for a unit
    Telemetry(TelemetryOpts),
}

#[derive(Args, Debug)]
pub struct AssignOpts {
    pub unit_id: String,
    #[arg(allow_negative_numbers = true)]
    pub lat: f64,
    #[arg(allow_negative_numbers = true)]
    pub lon: f64,
}

#[derive(Args, Debug)]
pub struct RegisterOpts {
    pub unit_id: String,
    #[arg(allow_negative_numbers = true)]
    pub lat: f64,
    #[arg(allow_negative_numbers = true)]
    pub lon: f64,
    #[arg(long)]
    pub label: Option<String>,
    #[arg(long, default_value_t = 0.0)]
    pub speed: f64,
    #[arg(long, default_value_t = 0.0)]
    pub direction: f64,
}

#[derive(Args, Debug)]
pub struct TelemetryOpts {
    pub unit_id: String,
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,
    #[arg(long)]
    pub speed: Option<f64>,
    #[arg(long)]
    pub direction: Option<f64>,
    /// active, idle, paused or offline
    #[arg(long)]
    pub status: Option<UnitStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_console() {
        let cli = Cli::try_parse_from(["threatwatch"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn link_config_from_flags() {
        let cli = Cli::try_parse_from([
            "threatwatch",
            "--stream-url",
            "ws://10.0.0.5:8000/ws",
            "--api-url",
            "http://10.0.0.5:8000/api",
            "--reconnect-delay-ms",
            "500",
            "console",
        ])
        .unwrap();
        let config = cli.link_config();
        assert_eq!(config.stream_url, "ws://10.0.0.5:8000/ws");
        assert_eq!(config.api_url, "http://10.0.0.5:8000/api");
        assert_eq!(config.reconnect_delay, Duration::from_millis(500));
    }

    #[test]
    fn assign_accepts_negative_longitude() {
        let cli = Cli::try_parse_from(["threatwatch", "assign", "alpha-1", "37.81", "-122.45"]).unwrap();
        let Some(Command::Assign(opts)) = cli.command else {
            panic!("expected assign");
        };
        assert_eq!(opts.unit_id, "alpha-1");
        assert_eq!(opts.lat, 37.81);
        assert_eq!(opts.lon, -122.45);
    }

    #[test]
    fn telemetry_status_parses() {
        let cli = Cli::try_parse_from(["threatwatch", "telemetry", "alpha-1", "--status", "paused"]).unwrap();
        let Some(Command::Telemetry(opts)) = cli.command else {
            panic!("expected telemetry");
        };
        assert_eq!(opts.status, Some(UnitStatus::Paused));
        assert!(opts.lat.is_none());
    }

    #[test]
    fn telemetry_lat_requires_lon() {
        assert!(Cli::try_parse_from(["threatwatch", "telemetry", "alpha-1", "--lat", "1.0"]).is_err());
    }

    #[test]
    fn telemetry_rejects_unknown_status() {
        assert!(Cli::try_parse_from(["threatwatch", "telemetry", "alpha-1", "--status", "asleep"]).is_err());
    }
}
