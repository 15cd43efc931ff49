use pax_core::{GateId, PaxError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GateError {
    #[error("{0} has no transit slots")]
    NoSlots(GateId),

    #[error(transparent)]
    Config(#[from] PaxError),
}

pub type GateResult<T> = Result<T, GateError>;
