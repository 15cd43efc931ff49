//! `pax-core`: foundational types for the `pax` passenger-stop simulator.
//!
//! This crate is a dependency of every other `pax-*` crate.  It has no
//! `pax-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module     | Contents                                           |
//! |------------|----------------------------------------------------|
//! | [`ids`]    | `AgentId`, `SeatId`, `GateId`                      |
//! | [`geo`]    | `Vec3`, `Pose`, ground-plane helpers               |
//! | [`time`]   | `Tick`, `SimClock`, `SimConfig`                    |
//! | [`rng`]    | `SimRng` (seeded, single-threaded)                 |
//! | [`config`] | `StopConfig`, `GateConfig`, `AgentConfig`, `Range` |
//! | [`error`]  | `PaxError`, `PaxResult`                            |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|-----------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types. |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{AgentConfig, GateConfig, Range, StopConfig};
pub use error::{PaxError, PaxResult};
pub use geo::{Pose, Vec3};
pub use ids::{AgentId, GateId, SeatId};
pub use rng::SimRng;
pub use time::{SimClock, SimConfig, Tick};
