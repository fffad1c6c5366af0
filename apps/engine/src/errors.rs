//! Engine-level error taxonomy.
//!
//! Adapter failures stay inside `ProviderError` until both adapters have
//! been tried; only total failure crosses this boundary. Callers never see
//! these as raw errors; the orchestrator folds them into the error-status
//! response envelope via `ErrorDetail`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::providers::ProviderError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("All providers failed (primary: {primary}; secondary: {secondary})")]
    ProvidersExhausted {
        primary: ProviderError,
        secondary: ProviderError,
    },

    #[error("Generation queue cleared before dispatch")]
    QueueCleared,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Validation(_) => ErrorKind::Validation,
            EngineError::ProvidersExhausted { .. } => ErrorKind::Provider,
            EngineError::QueueCleared => ErrorKind::QueueCleared,
            EngineError::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// Machine-readable error class carried in the response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Provider,
    QueueCleared,
    Validation,
    Internal,
}

/// Error payload of an error-status `GenerationResponse`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<EngineError> for ErrorDetail {
    fn from(err: EngineError) -> Self {
        ErrorDetail {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
