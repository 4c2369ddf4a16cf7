//! CommandGateway: outbound commands over HTTP.
//!
//! One POST per call, bounded by the configured timeout. Nothing is retried
//! or queued; callers report the outcome and move on.

use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use threatwatch_core::{Position, Unit, UnitStatus};

use crate::config::LinkConfig;
use crate::error::LinkError;

const ASSIGN_DESTINATION: &str = "assign-destination";
const REGISTER_UNIT: &str = "register-unit";
const UPDATE_TELEMETRY: &str = "update-telemetry";

#[derive(Debug, Serialize)]
struct AssignDestination<'a> {
    unit_id: &'a str,
    destination: Position,
}

/// Body of `register-unit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterUnit {
    pub unit_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub position: Position,
    #[serde(default)]
    pub speed_mps: f64,
    #[serde(default)]
    pub direction_deg: f64,
}

/// Body of `update-telemetry`. Absent fields are left unchanged upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryUpdate {
    pub unit_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_mps: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction_deg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<UnitStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<Position>,
}

impl TelemetryUpdate {
    pub fn new(unit_id: impl Into<String>) -> Self {
        Self {
            unit_id: unit_id.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommandGateway {
    client: Client,
    config: LinkConfig,
}

impl CommandGateway {
    pub fn new(config: LinkConfig) -> Result<Self, LinkError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.request_timeout)
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Ask the backend to send `unit_id` to `destination`. The new destination
    /// only becomes visible once it comes back through the stream.
    pub async fn assign_destination(
        &self,
        unit_id: &str,
        destination: Position,
    ) -> Result<(), LinkError> {
        self.post(ASSIGN_DESTINATION, &AssignDestination { unit_id, destination })
            .await?;
        Ok(())
    }

    /// Returns the unit as registered by the backend.
    pub async fn register_unit(&self, request: &RegisterUnit) -> Result<Unit, LinkError> {
        let response = self.post(REGISTER_UNIT, request).await?;
        Ok(response.json::<Unit>().await?)
    }

    pub async fn update_telemetry(&self, request: &TelemetryUpdate) -> Result<Unit, LinkError> {
        let response = self.post(UPDATE_TELEMETRY, request).await?;
        Ok(response.json::<Unit>().await?)
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response, LinkError> {
        let url = self.config.api_endpoint(path);
        debug!(url = %url, "gateway request");
        let response = self.client.post(&url).json(body).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "gateway request failed");
            LinkError::Http(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let detail = rejection_detail(status, &body);
        warn!(url = %url, status = status.as_u16(), detail = %detail, "gateway request rejected");
        Err(LinkError::Rejected(detail))
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// The backend's `detail` verbatim when present, a generic line otherwise.
fn rejection_detail(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: serde_json::Value::String(detail),
        }) => detail,
        Ok(ErrorBody { detail }) if !detail.is_null() => detail.to_string(),
        _ => format!("Request failed ({})", status.as_u16()),
    }
}
