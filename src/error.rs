pub use anyhow::{anyhow, Result};

use reqwest::StatusCode;
use thiserror::Error as TError;

/// Errors surfaced by the gateway client and the synchronizer.
///
/// Remote error bodies are carried verbatim so callers can show the
/// store's own message instead of a generic one.
#[derive(Debug, TError)]
pub enum Error {
    #[error("ValidationError: {0}")]
    Validation(#[from] ValidationError),

    /// Non-success response to a GET. Display is the response body as-is.
    #[error("{body}")]
    Retrieval { status: StatusCode, body: String },

    /// Non-success response to a PUT/PATCH. Display is the response body as-is.
    #[error("{body}")]
    Write { status: StatusCode, body: String },

    /// 409 from the store on write. The write policy is last-write-wins and
    /// no resourceVersion is asserted, so this is currently only produced
    /// when the store itself rejects the write.
    #[error("Conflict: {body}")]
    Conflict { body: String },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, TError, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("rule header must not be empty")]
    EmptyHeader,

    #[error("rule value must not be empty")]
    EmptyValue,

    #[error("unknown pool {0:?}: not in the configured pool list")]
    UnknownPool(String),
}
