use pax_core::{AgentId, Vec3};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NavError {
    #[error("target {target} for {agent} is off the walkable surface")]
    Unreachable { agent: AgentId, target: Vec3 },

    #[error("{0} has no body in the world")]
    UnknownAgent(AgentId),
}

pub type NavResult<T> = Result<T, NavError>;
