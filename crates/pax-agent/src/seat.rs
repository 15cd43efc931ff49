//! Exclusive seat reservations.
//!
//! A slot's back-reference is the only reservation flag: `reserved_by ==
//! Some(a)` *is* "reserved", so the flag and the holder can never disagree.

use pax_core::{AgentId, Pose, SeatId, Vec3};

use crate::AgentStore;

#[derive(Clone, Debug, PartialEq)]
pub struct SeatSlot {
    /// Where the passenger sits and which way it faces.
    pub pose: Pose,
    reserved_by: Option<AgentId>,
}

impl SeatSlot {
    pub fn new(pose: Pose) -> Self {
        Self { pose, reserved_by: None }
    }

    #[inline]
    pub fn is_reserved(&self) -> bool {
        self.reserved_by.is_some()
    }

    #[inline]
    pub fn reserved_by(&self) -> Option<AgentId> {
        self.reserved_by
    }
}

#[derive(Clone, Debug, Default)]
pub struct SeatPool {
    slots: Vec<SeatSlot>,
}

impl SeatPool {
    pub fn new(poses: impl IntoIterator<Item = Pose>) -> Self {
        Self { slots: poses.into_iter().map(SeatSlot::new).collect() }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot(&self, seat: SeatId) -> Option<&SeatSlot> {
        self.slots.get(seat.index())
    }

    pub fn free_count(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_reserved()).count()
    }

    /// Reserve `seat` for `agent`.  Fails if the seat is taken or unknown.
    pub fn try_reserve(&mut self, seat: SeatId, agent: AgentId) -> bool {
        match self.slots.get_mut(seat.index()) {
            Some(slot) if !slot.is_reserved() => {
                slot.reserved_by = Some(agent);
                true
            }
            _ => false,
        }
    }

    /// Release `seat` if, and only if, `agent` holds it.  Returns whether a
    /// reservation was dropped.
    pub fn release(&mut self, seat: SeatId, agent: AgentId) -> bool {
        match self.slots.get_mut(seat.index()) {
            Some(slot) if slot.reserved_by == Some(agent) => {
                slot.reserved_by = None;
                true
            }
            _ => false,
        }
    }

    /// Drop every reservation held by `agent`.  Used when a passenger
    /// vanishes without going through `release`.
    pub fn release_all(&mut self, agent: AgentId) -> usize {
        let mut n = 0;
        for slot in self.slots.iter_mut().filter(|s| s.reserved_by == Some(agent)) {
            slot.reserved_by = None;
            n += 1;
        }
        n
    }

    /// The free seat closest to `from`.  Ties go to the lower id.
    pub fn nearest_free(&self, from: Vec3) -> Option<SeatId> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.is_reserved())
            .min_by(|a, b| {
                let da = a.1.pose.position.distance_squared(from);
                let db = b.1.pose.position.distance_squared(from);
                da.total_cmp(&db)
            })
            .and_then(|(i, _)| SeatId::from_index(i))
    }

    /// Reserve the nearest free seat for `agent` in one step.
    pub fn reserve_nearest(&mut self, from: Vec3, agent: AgentId) -> Option<SeatId> {
        let seat = self.nearest_free(from)?;
        self.try_reserve(seat, agent).then_some(seat)
    }

    /// Every reservation points at a live passenger that points back.
    pub fn is_consistent_with(&self, agents: &AgentStore) -> bool {
        self.slots.iter().enumerate().all(|(i, slot)| match slot.reserved_by {
            None => true,
            Some(a) => agents.get(a).is_some_and(|ag| ag.seat() == Some(SeatId(i as u32))),
        })
    }
}
