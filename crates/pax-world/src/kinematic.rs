//! `KinematicWorld`: straight-line walkers on rectangular floor areas.
//!
//! # Movement model
//!
//! Each body walks directly toward its target at `speed * speed_scale`.
//! There is no collision avoidance; two passengers may overlap.  Targets are
//! snapped onto the nearest walkable area within `sample_radius`, the way a
//! navigation mesh samples a requested point; farther targets are rejected
//! with [`NavError::Unreachable`].
//!
//! With no walk areas registered the whole plane is walkable.

use std::collections::BTreeMap;

use pax_core::{AgentId, Vec3};

use crate::body::{Body, DEFAULT_SPEED};
use crate::index::{BodyEntry, BodyIndex};
use crate::{Detection, NavError, NavResult, Navigator, ProximityOracle, World};

/// Default search radius when snapping a target onto the floor.
pub const DEFAULT_SAMPLE_RADIUS: f32 = 1.5;

// ── WalkArea ──────────────────────────────────────────────────────────────────

/// Axis-aligned rectangle of walkable floor on the ground plane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WalkArea {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl WalkArea {
    pub fn new(min_x: f32, max_x: f32, min_z: f32, max_z: f32) -> Self {
        Self {
            min_x: min_x.min(max_x),
            max_x: min_x.max(max_x),
            min_z: min_z.min(max_z),
            max_z: min_z.max(max_z),
        }
    }

    /// Closest point of the area to `p` (height preserved).
    pub fn clamp(&self, p: Vec3) -> Vec3 {
        Vec3::new(p.x.clamp(self.min_x, self.max_x), p.y, p.z.clamp(self.min_z, self.max_z))
    }
}

// ── KinematicWorld ────────────────────────────────────────────────────────────

pub struct KinematicWorld {
    /// Live bodies keyed by `AgentId`.
    bodies: BTreeMap<AgentId, Body>,

    /// Walkable floor.  Empty = everywhere.
    areas: Vec<WalkArea>,

    /// Snap radius for `move_to` targets.
    pub sample_radius: f32,

    /// Speed given to newly placed bodies.
    pub default_speed: f32,

    index: BodyIndex,
}

impl Default for KinematicWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl KinematicWorld {
    /// An unbounded world: every point is walkable.
    pub fn new() -> Self {
        Self {
            bodies:        BTreeMap::new(),
            areas:         Vec::new(),
            sample_radius: DEFAULT_SAMPLE_RADIUS,
            default_speed: DEFAULT_SPEED,
            index:         BodyIndex::new(),
        }
    }

    /// Restrict walking to the union of `areas`.
    pub fn with_areas(mut self, areas: Vec<WalkArea>) -> Self {
        self.areas = areas;
        self
    }

    pub fn with_default_speed(mut self, speed: f32) -> Self {
        self.default_speed = speed;
        self
    }

    pub fn body(&self, agent: AgentId) -> Option<&Body> {
        self.bodies.get(&agent)
    }

    pub fn body_mut(&mut self, agent: AgentId) -> Option<&mut Body> {
        self.bodies.get_mut(&agent)
    }

    /// Number of live bodies.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Override one body's full walking speed.
    pub fn set_speed(&mut self, agent: AgentId, speed: f32) {
        if let Some(b) = self.body_mut(agent) {
            b.speed = speed.max(0.0);
        }
    }

    /// Mark a body solid or trigger-only.
    pub fn set_solid(&mut self, agent: AgentId, solid: bool) {
        if let Some(b) = self.body_mut(agent) {
            b.solid = solid;
        }
        self.reindex();
    }

    /// Move a body instantly, keeping its target.
    pub fn teleport(&mut self, agent: AgentId, to: Vec3) {
        if let Some(b) = self.body_mut(agent) {
            b.position = to;
        }
        self.reindex();
    }

    /// Snap `p` onto the floor, or `None` if no area is within `sample_radius`.
    pub fn sample(&self, p: Vec3) -> Option<Vec3> {
        if self.areas.is_empty() {
            return Some(p);
        }
        self.areas
            .iter()
            .map(|a| a.clamp(p))
            .map(|q| (q.ground().distance(p.ground()), q))
            .filter(|(d, _)| *d <= self.sample_radius)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, q)| q)
    }

    fn reindex(&mut self) {
        let entries = self
            .bodies
            .iter()
            .map(|(&agent, b)| BodyEntry {
                point: b.position.to_array(),
                agent,
                solid: b.solid,
            })
            .collect();
        self.index = BodyIndex::bulk_load(entries);
    }
}

impl Navigator for KinematicWorld {
    fn place(&mut self, agent: AgentId, at: Vec3) -> Vec3 {
        let pos = match self.sample(at) {
            Some(p) => p,
            None => {
                tracing::warn!(%agent, at = %at, "spawn point off the walkable surface");
                at
            }
        };
        let mut body = Body::at(pos);
        body.speed = self.default_speed;
        self.bodies.insert(agent, body);
        self.reindex();
        pos
    }

    fn remove(&mut self, agent: AgentId) {
        if self.bodies.remove(&agent).is_some() {
            self.reindex();
        }
    }

    fn move_to(&mut self, agent: AgentId, point: Vec3) -> NavResult<()> {
        let snapped = self
            .sample(point)
            .ok_or(NavError::Unreachable { agent, target: point })?;
        let body = self.body_mut(agent).ok_or(NavError::UnknownAgent(agent))?;
        body.target = Some(snapped);
        Ok(())
    }

    fn stop(&mut self, agent: AgentId) {
        if let Some(b) = self.body_mut(agent) {
            b.target = None;
        }
    }

    fn set_speed_scale(&mut self, agent: AgentId, scale: f32) {
        if let Some(b) = self.body_mut(agent) {
            b.speed_scale = scale.clamp(0.0, 1.0);
        }
    }

    fn has_arrived(&self, agent: AgentId, threshold: f32) -> bool {
        self.body(agent).is_some_and(|b| b.remaining_distance() <= threshold)
    }

    fn position(&self, agent: AgentId) -> Option<Vec3> {
        self.body(agent).map(|b| b.position)
    }

    fn facing(&self, agent: AgentId) -> Option<Vec3> {
        self.body(agent).map(|b| b.forward)
    }

    fn warp(&mut self, agent: AgentId, to: Vec3) {
        if let Some(b) = self.body_mut(agent) {
            b.position = to;
            b.target = None;
        }
        self.reindex();
    }

    fn face(&mut self, agent: AgentId, direction: Vec3) {
        if let (Some(b), Some(dir)) = (self.body_mut(agent), direction.ground().normalized()) {
            b.forward = dir;
        }
    }
}

impl ProximityOracle for KinematicWorld {
    fn agents_near(&self, point: Vec3, radius: f32, detection: Detection) -> Vec<AgentId> {
        let mut hits: Vec<AgentId> = self
            .index
            .locate_within_distance(point.to_array(), radius * radius)
            .filter(|e| detection == Detection::Any || e.solid)
            .map(|e| e.agent)
            .collect();
        hits.sort_unstable();
        hits
    }
}

impl World for KinematicWorld {
    fn advance(&mut self, dt_secs: f32) {
        let mut moved = false;
        for body in self.bodies.values_mut() {
            if body.is_moving() {
                body.step(dt_secs);
                moved = true;
            }
        }
        if moved {
            self.reindex();
        }
    }
}
