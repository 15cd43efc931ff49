//! Minimal 3-D vector math for doorway and queue geometry.
//!
//! The simulator lives on a flat floor: `y` is height, `x`/`z` span the
//! ground plane.  Side-of-door tests and queue offsets use the ground
//! projection only, so a passenger stepping up into the vehicle does not
//! change which side of the doorway they are on.

use std::ops::{Add, Mul, Neg, Sub};

/// A point or direction in world space, single precision.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    /// World forward (+z).
    pub const FORWARD: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 1.0 };

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[inline]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    #[inline]
    pub fn distance(self, other: Vec3) -> f32 {
        (self - other).length()
    }

    #[inline]
    pub fn distance_squared(self, other: Vec3) -> f32 {
        (self - other).length_squared()
    }

    /// Projection onto the ground plane (`y = 0`).
    #[inline]
    pub fn ground(self) -> Vec3 {
        Vec3::new(self.x, 0.0, self.z)
    }

    /// Unit vector in the same direction, or `None` for (near-)zero vectors.
    pub fn normalized(self) -> Option<Vec3> {
        let len = self.length();
        if len < 1e-4 {
            None
        } else {
            Some(self * (1.0 / len))
        }
    }

    /// Move from `self` toward `target` by at most `max_step`.  Returns the
    /// target exactly once it is within reach, so callers can compare with `==`.
    pub fn move_towards(self, target: Vec3, max_step: f32) -> Vec3 {
        let delta = target - self;
        let dist = delta.length();
        if dist <= max_step || dist < 1e-6 {
            target
        } else {
            self + delta * (max_step / dist)
        }
    }

    /// Array form, handy for spatial indices.
    #[inline]
    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    #[inline]
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    #[inline]
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    #[inline]
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl std::fmt::Display for Vec3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

// ── Pose ──────────────────────────────────────────────────────────────────────

/// A position with a facing direction, e.g. a doorway or a queue anchor.
///
/// For doorways `forward` points *into* the vehicle.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pose {
    pub position: Vec3,
    pub forward:  Vec3,
}

impl Pose {
    /// Build a pose, normalising `forward` on the ground plane.  A degenerate
    /// direction falls back to world forward.
    pub fn new(position: Vec3, forward: Vec3) -> Self {
        Self {
            position,
            forward: forward.ground().normalized().unwrap_or(Vec3::FORWARD),
        }
    }

    /// Signed ground-plane distance of `point` along `forward`.  Positive in
    /// front of the pose, negative behind it.
    #[inline]
    pub fn ground_offset(&self, point: Vec3) -> f32 {
        (point - self.position).ground().dot(self.forward)
    }

    /// Point `distance` metres in front of the pose (negative = behind).
    #[inline]
    pub fn ahead(&self, distance: f32) -> Vec3 {
        self.position + self.forward * distance
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self { position: Vec3::ZERO, forward: Vec3::FORWARD }
    }
}
