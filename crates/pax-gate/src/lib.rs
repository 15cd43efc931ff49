//! `pax-gate`: doorway admission control.
//!
//! A [`Gate`] turns a doorway into a bounded critical section without locks:
//! passengers poll [`Gate::try_admit`] until a transit slot is free, walk
//! through it, and hand the slot back.  The scheduler holds the door open
//! while it works and closes it through a bounded clear-or-force routine.
//!
//! # Crate layout
//!
//! | Module    | Contents                              |
//! |-----------|---------------------------------------|
//! | [`gate`]  | `Gate`, `GateEvent`                   |
//! | [`hold`]  | `HoldOwner`: keep-open owner tokens   |
//! | [`side`]  | `Side`, `Admission`: half-space tests |
//! | [`error`] | `GateError`, `GateResult<T>`          |

pub mod error;
pub mod gate;
pub mod hold;
pub mod side;


pub use error::{GateError, GateResult};
pub use gate::{Gate, GateEvent};
pub use hold::HoldOwner;
pub use side::{Admission, Side};
