//! Core error type.
//!
//! Sub-crates define their own error enums and either convert into
//! `PaxError` or wrap it as one variant, whichever keeps error sites clean.

use thiserror::Error;

use crate::AgentId;

/// The base error type for `pax-core` and a common variant for sub-crates.
#[derive(Debug, Error)]
pub enum PaxError {
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `pax-core`.
pub type PaxResult<T> = Result<T, PaxError>;
