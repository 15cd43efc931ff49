//! `pax-world`: the boundary between the stop cycle and the physical world.
//!
//! The stop cycle never moves bodies itself.  It asks a [`Navigator`] to
//! walk a passenger toward a point and later asks whether it has arrived,
//! and it asks a [`ProximityOracle`] whether anyone is standing near a point.
//! Both are pluggable; [`KinematicWorld`] is a small reference
//! implementation (straight-line walking on rectangular floor areas, R-tree
//! proximity) used by tests and the demo.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                      |
//! |---------------|---------------------------------------------------------------|
//! | [`nav`]       | `Navigator`, `ProximityOracle`, `World`, `Detection`, `steer` |
//! | [`body`]      | `Body`: per-passenger kinematic state                         |
//! | [`index`]     | R-tree entries for proximity queries                          |
//! | [`kinematic`] | `KinematicWorld`, `WalkArea`                                  |
//! | [`error`]     | `NavError`, `NavResult<T>`                                    |

pub mod body;
pub mod error;
pub mod index;
pub mod kinematic;
pub mod nav;


pub use body::Body;
pub use error::{NavError, NavResult};
pub use kinematic::{KinematicWorld, WalkArea};
pub use nav::{Detection, Navigator, ProximityOracle, World, steer};
