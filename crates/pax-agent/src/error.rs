use pax_core::AgentId;
use thiserror::Error;

use crate::AgentState;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("{agent} cannot go from {from} to {to}")]
    InvalidTransition {
        agent: AgentId,
        from:  AgentState,
        to:    AgentState,
    },

    #[error("{0} not found")]
    NotFound(AgentId),
}

pub type AgentResult<T> = Result<T, AgentError>;
