use std::time::Duration;

use thiserror::Error;

use crate::Step;

/// A relay attempt that stopped at `step`.
#[derive(Debug, Error)]
#[error("{step}: {source}")]
pub struct RelayError {
    pub step: Step,
    #[source]
    pub source: SessionError,
}

impl RelayError {
    pub fn new(step: Step, source: SessionError) -> Self {
        Self { step, source }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("{code} {text}")]
    Rejected { code: u16, text: String },

    #[error("malformed reply: {0:?}")]
    Malformed(String),

    #[error("tls: {0}")]
    Tls(String),

    #[error("message: {0}")]
    Message(String),

    #[error("connection closed")]
    Closed,
}
