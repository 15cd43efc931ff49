//! Per-passenger kinematic state.

use pax_core::Vec3;

/// Default walking speed in metres per second.
pub const DEFAULT_SPEED: f32 = 1.4;

/// The movement state of a single passenger body.
///
/// A body is either idle (`target == None`) or walking in a straight line
/// toward `target` at `speed * speed_scale`.  Reaching the target does not
/// clear it; only `stop` does, so `remaining_distance` reads 0 on arrival.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub position: Vec3,

    /// Where the body is walking to, if anywhere.
    pub target: Option<Vec3>,

    /// Unit ground-plane facing direction.
    pub forward: Vec3,

    /// Full walking speed, metres per second.
    pub speed: f32,

    /// Multiplier on `speed` in `[0, 1]`.
    pub speed_scale: f32,

    /// Trigger-only bodies are invisible to `Detection::SolidOnly` probes.
    pub solid: bool,
}

impl Body {
    /// An idle, solid body at `position` facing world forward.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            target:      None,
            forward:     Vec3::FORWARD,
            speed:       DEFAULT_SPEED,
            speed_scale: 1.0,
            solid:       true,
        }
    }

    /// Distance left to walk; 0 when idle.
    pub fn remaining_distance(&self) -> f32 {
        self.target.map_or(0.0, |t| self.position.distance(t))
    }

    /// `true` while the body still has ground to cover.
    pub fn is_moving(&self) -> bool {
        self.remaining_distance() > 1e-4 && self.speed * self.speed_scale > 0.0
    }

    /// Walk toward the target for `dt_secs`.
    pub fn step(&mut self, dt_secs: f32) {
        let Some(target) = self.target else { return };
        let reach = self.speed * self.speed_scale.clamp(0.0, 1.0) * dt_secs;
        if reach <= 0.0 {
            return;
        }
        if let Some(dir) = (target - self.position).ground().normalized() {
            self.forward = dir;
        }
        self.position = self.position.move_towards(target, reach);
    }
}
