//! Error taxonomy for the kernel.
//!
//! Small-sample guards are never errors. Only malformed configuration and
//! malformed observations are rejected, and both are rejected before any
//! state is touched.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum KernelError {
    /// A configuration field is outside its domain.
    #[error("invalid config: {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    /// An observation cannot be ingested (non-finite or out-of-range sentiment).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The serialized kernel task is no longer running.
    #[error("kernel service closed")]
    ServiceClosed,
}

impl KernelError {
    pub fn config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }

    pub fn input(reason: impl Into<String>) -> Self {
        Self::InvalidInput(reason.into())
    }
}

pub type KernelResult<T> = Result<T, KernelError>;
