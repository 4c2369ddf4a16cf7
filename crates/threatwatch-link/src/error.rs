use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("websocket: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response. Carries the backend `detail` verbatim.
    #[error("{0}")]
    Rejected(String),

    #[error("invalid endpoint {url:?}: {reason}")]
    InvalidEndpoint { url: String, reason: String },
}
