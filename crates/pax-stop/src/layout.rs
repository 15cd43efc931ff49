//! Vehicle geometry: doors, queue anchor, exit point, seats.

use pax_core::{GateConfig, Pose, Vec3};
use pax_world::WalkArea;

use crate::{StopError, StopResult};

/// One doorway.  `frame.forward` must point into the vehicle.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DoorLayout {
    pub frame:  Pose,
    /// Transit points in admission scan order.
    pub slots:  Vec<Vec3>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub config: GateConfig,
}

impl DoorLayout {
    /// A door at `position` facing `forward`, with one slot on the threshold
    /// and one a short step inside.
    pub fn at(position: Vec3, forward: Vec3) -> Self {
        let frame = Pose::new(position, forward);
        Self {
            frame,
            slots: vec![frame.position, frame.ahead(0.3)],
            config: GateConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StopLayout {
    /// Boarding door.
    pub entry: DoorLayout,
    /// Alighting door.
    pub exit: DoorLayout,
    /// Where the head of the queue stands, facing the entry door.
    pub queue_anchor: Pose,
    /// Where alighted passengers walk before being recycled.
    pub exit_point: Vec3,
    /// Seat positions.  Boarders beyond the seat count ride standing.
    pub seats: Vec<Pose>,
}

impl StopLayout {
    /// A 10 m single-deck bus parked along +x with its doors on the kerb side
    /// (`z = 0`).  Inside is `z > 0`; the kerb is `z < 0`.
    pub fn city_bus() -> Self {
        let inward = Vec3::FORWARD;
        let mut seats = Vec::new();
        for row in 0..8 {
            let x = 2.0 + row as f32;
            for z in [1.2, 1.8] {
                seats.push(Pose::new(Vec3::new(x, 0.0, z), -Vec3::FORWARD));
            }
        }
        Self {
            entry: DoorLayout::at(Vec3::new(1.0, 0.0, 0.0), inward),
            exit: DoorLayout::at(Vec3::new(8.0, 0.0, 0.0), inward),
            queue_anchor: Pose::new(Vec3::new(1.0, 0.0, -0.8), inward),
            exit_point: Vec3::new(12.0, 0.0, -3.0),
            seats,
        }
    }

    /// Walkable floor for [`city_bus`][Self::city_bus]: the cabin plus a wide
    /// kerb the queue can stretch along.
    pub fn city_bus_areas() -> Vec<WalkArea> {
        vec![
            WalkArea::new(0.0, 10.0, 0.0, 2.4),
            WalkArea::new(-10.0, 20.0, -40.0, 0.0),
        ]
    }

    pub fn validate(&self) -> StopResult<()> {
        let mut points = vec![self.queue_anchor.position, self.exit_point];
        for door in [&self.entry, &self.exit] {
            points.push(door.frame.position);
            points.extend(door.slots.iter().copied());
        }
        points.extend(self.seats.iter().map(|s| s.position));
        if let Some(p) = points.iter().find(|p| !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite())) {
            return Err(StopError::Layout(format!("non-finite coordinate {p:?}")));
        }
        if self.entry.frame.position == self.exit.frame.position && self.entry.slots == self.exit.slots {
            return Err(StopError::Layout("entry and exit doors coincide".into()));
        }
        Ok(())
    }
}

impl Default for StopLayout {
    fn default() -> Self {
        Self::city_bus()
    }
}
