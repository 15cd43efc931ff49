//! R-tree spatial index over body positions.
//!
//! Rebuilt after every movement step and every spawn/despawn, so proximity
//! queries between steps see a consistent snapshot.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use pax_core::AgentId;

/// Entry stored in the R-tree: a 3-D point with its owner and solidity.
#[derive(Clone, Debug)]
pub struct BodyEntry {
    pub point: [f32; 3],
    pub agent: AgentId,
    pub solid: bool,
}

impl RTreeObject for BodyEntry {
    type Envelope = AABB<[f32; 3]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for BodyEntry {
    fn distance_2(&self, point: &[f32; 3]) -> f32 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        let dz = self.point[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

pub type BodyIndex = RTree<BodyEntry>;
