//! `pax-stop`: the stop-visit cycle.
//!
//! A [`StopScheduler`] drives one vehicle through an endless series of stops.
//! At each stop both doors are held open, the exit door runs an
//! [`AlightFlow`] and the entry door a [`BoardFlow`] side by side, then each
//! door is shut by a [`CloseDoorTask`] that either clears it or forces it
//! within a bound.  Alighted passengers walk away under a [`RecycleTask`].
//!
//! All tasks are explicit state machines polled once per tick on one thread;
//! none of them ever blocks.
//!
//! # Crate layout
//!
//! | Module        | Contents                                              |
//! |---------------|-------------------------------------------------------|
//! | [`scheduler`] | `StopScheduler` tick loop, `Phase`                    |
//! | [`builder`]   | `StopSchedulerBuilder`: validated construction        |
//! | [`alight`]    | `AlightFlow`: windowed alighting                      |
//! | [`board`]     | `BoardFlow`, `board_target`                           |
//! | [`close`]     | `CloseDoorTask`, `CloseOutcome`                       |
//! | [`recycle`]   | `RecycleTask`: walk away, then destroy                |
//! | [`ctx`]       | `StopCtx`, `FlowStatus`: what a task sees when polled |
//! | [`layout`]    | `StopLayout`, `DoorLayout`: vehicle geometry          |
//! | [`observer`]  | `StopObserver` hooks, `NoopObserver`                  |
//! | [`report`]    | `StopReport`: per-stop summary                        |
//! | [`error`]     | `StopError`, `StopResult<T>`                          |

pub mod alight;
pub mod board;
pub mod builder;
pub mod close;
pub mod ctx;
pub mod error;
pub mod layout;
pub mod observer;
pub mod recycle;
pub mod report;
pub mod scheduler;

#[cfg(test)]
mod tests;

pub use alight::AlightFlow;
pub use board::{BoardFlow, board_target};
pub use builder::{ENTRY_GATE, EXIT_GATE, StopSchedulerBuilder};
pub use close::{CloseDoorTask, CloseOutcome};
pub use ctx::{FlowStatus, StopCtx};
pub use error::{StopError, StopResult};
pub use layout::{DoorLayout, StopLayout};
pub use observer::{NoopObserver, StopObserver};
pub use recycle::RecycleTask;
pub use report::StopReport;
pub use scheduler::{Phase, StopScheduler};
