use pax_agent::AgentError;
use pax_core::{AgentId, PaxError};
use pax_gate::GateError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StopError {
    #[error(transparent)]
    Config(#[from] PaxError),

    #[error(transparent)]
    Gate(#[from] GateError),

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error("layout error: {0}")]
    Layout(String),

    #[error("{0} is not a passenger of this stop")]
    UnknownAgent(AgentId),
}

pub type StopResult<T> = Result<T, StopError>;
