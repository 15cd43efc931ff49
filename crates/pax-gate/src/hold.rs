//! Keep-open owner tokens.

use std::fmt;

/// Who is holding a doorway open.
///
/// A doorway stays open while any owner holds it; `Gate::close` is refused
/// until every owner has released.  Only a handful of subsystems ever hold a
/// door, so owners are plain values rather than object identities.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HoldOwner {
    /// The stop scheduler, from arrival until its close-safety routine ends.
    StopCycle,
    /// Any other subsystem, keyed by a caller-chosen number.
    External(u16),
}

impl fmt::Display for HoldOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HoldOwner::StopCycle => f.write_str("stop_cycle"),
            HoldOwner::External(n) => write!(f, "external({n})"),
        }
    }
}
