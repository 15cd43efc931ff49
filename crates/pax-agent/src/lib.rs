//! `pax-agent`: passengers and the shared resources they compete for.
//!
//! # Crate layout
//!
//! | Module    | Contents                                                  |
//! |-----------|-----------------------------------------------------------|
//! | [`state`] | `AgentState`: activity phase enum and legal transitions   |
//! | [`agent`] | `Agent`: per-passenger state machine and queue hysteresis |
//! | [`store`] | `AgentStore`: owning slot storage keyed by `AgentId`      |
//! | [`seat`]  | `SeatPool`, `SeatSlot`: exclusive seat reservations       |
//! | [`queue`] | `QueueChain`: ordered, self-repairing waiting line        |
//! | [`error`] | `AgentError`, `AgentResult<T>`                            |
//!
//! # Ownership
//!
//! Cross references between passengers, seats and the queue are `AgentId` /
//! `SeatId` keys into owning collections, never pointers.  A key may outlive
//! the thing it names; every lookup tolerates that.

pub mod agent;
pub mod error;
pub mod queue;
pub mod seat;
pub mod state;
pub mod store;


pub use agent::Agent;
pub use error::{AgentError, AgentResult};
pub use queue::QueueChain;
pub use seat::{SeatPool, SeatSlot};
pub use state::AgentState;
pub use store::AgentStore;
