//! Half-space tests against a doorway frame.
//!
//! A doorway's `forward` axis points into the vehicle.  Sides are decided by
//! the sign of the ground-plane dot product; a point exactly on the doorway
//! plane is on neither side.

use pax_core::{Pose, Vec3};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    Inside,
    Outside,
}

impl Side {
    /// Which side of `frame` `point` stands on.
    pub fn of(frame: &Pose, point: Vec3) -> Option<Side> {
        let offset = frame.ground_offset(point);
        if offset > 0.0 {
            Some(Side::Inside)
        } else if offset < 0.0 {
            Some(Side::Outside)
        } else {
            None
        }
    }

    /// Unit ground direction that leads deeper into this side.
    pub fn direction(self, frame: &Pose) -> Vec3 {
        match self {
            Side::Inside => frame.forward,
            Side::Outside => -frame.forward,
        }
    }
}

/// Directional admission variant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Admission {
    /// Entering: the passenger must stand outside.
    Board,
    /// Leaving: the passenger must stand inside, unless it is already close
    /// to the doorway.
    Alight,
    /// No side check.
    Any,
}

impl Admission {
    /// The side a passenger heads for once through the slot.
    pub fn destination(self) -> Option<Side> {
        match self {
            Admission::Board => Some(Side::Inside),
            Admission::Alight => Some(Side::Outside),
            Admission::Any => None,
        }
    }
}
