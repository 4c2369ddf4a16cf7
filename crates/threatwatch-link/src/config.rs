//! Link configuration: a plain value handed to the client constructors.

use std::time::Duration;

use reqwest::Url;

use crate::error::LinkError;

pub const DEFAULT_STREAM_URL: &str = "ws://localhost:8000/ws";
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(3_000);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    pub stream_url: String,
    pub api_url: String,
    /// Wait between a channel close and the next open attempt.
    pub reconnect_delay: Duration,
    /// Upper bound for one gateway request, connect included.
    pub request_timeout: Duration,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            stream_url: DEFAULT_STREAM_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl LinkConfig {
    /// Copy with new endpoints; `api_url = None` keeps the current one.
    pub fn with_endpoints(&self, stream_url: &str, api_url: Option<&str>) -> Self {
        Self {
            stream_url: stream_url.to_string(),
            api_url: api_url.map_or_else(|| self.api_url.clone(), str::to_string),
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<(), LinkError> {
        check_scheme(&self.stream_url, &["ws", "wss"])?;
        check_scheme(&self.api_url, &["http", "https"])?;
        Ok(())
    }

    /// `<api_url>/<path>`, tolerating a trailing slash on the base.
    pub fn api_endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

fn check_scheme(url: &str, allowed: &[&str]) -> Result<(), LinkError> {
    let parsed = Url::parse(url).map_err(|e| LinkError::InvalidEndpoint {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    if !allowed.contains(&parsed.scheme()) {
        return Err(LinkError::InvalidEndpoint {
            url: url.to_string(),
            reason: format!("expected scheme {}", allowed.join(" or ")),
        });
    }
    Ok(())
}
