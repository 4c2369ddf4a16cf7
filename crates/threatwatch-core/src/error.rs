//! Error types for stream payload validation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed stream payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("stream payload is not a JSON object")]
    NotAnObject,

    #[error("duplicate unit_id in snapshot: {0}")]
    DuplicateUnit(String),

    #[error("event type {0:?} is local-only and must not arrive on the wire")]
    ReservedType(String),

    #[error("unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },
}
