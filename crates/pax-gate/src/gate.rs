//! `Gate`: admission controller for one doorway.
//!
//! # Admission
//!
//! A doorway is a short, ordered list of transit slots.  A passenger is
//! admitted by being assigned the first slot nobody is standing near and
//! told to walk onto it; at most `throughput` passengers hold a slot at once.
//! Admission is polled, never blocking: a refused passenger simply asks again
//! on a later tick.
//!
//! # Lifecycle
//!
//! ```text
//!   open / ensure_open / hold_open ──► open (passage unblocked)
//!   close            ──► closed, unless any owner still holds the door
//!   force_close      ──► closed, holds dropped, whatever stands in the slots
//! ```
//!
//! `admit_enabled` is independent of open/closed: an open door that no longer
//! accepts new entrants lets current occupants drain before it closes.

use std::mem;

use pax_core::{AgentId, GateConfig, GateId, Pose, Vec3};
use pax_world::{Detection, Navigator, ProximityOracle, steer};
use rustc_hash::FxHashSet;

use crate::{Admission, GateError, GateResult, HoldOwner, Side};

// ── GateEvent ─────────────────────────────────────────────────────────────────

/// Presentation signal emitted on every open/close.  Drained by
/// [`Gate::take_events`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GateEvent {
    Opened,
    Closed,
    /// Closed by `force_close`, possibly on top of a passenger.
    ForceClosed,
}

// ── Gate ──────────────────────────────────────────────────────────────────────

pub struct Gate {
    id: GateId,

    /// Doorway centre; `forward` points into the vehicle.
    frame: Pose,

    /// Transit points in scan order.
    slots: Vec<Vec3>,

    config: GateConfig,

    is_open:       bool,
    admit_enabled: bool,

    /// Keep-open requests.  `close` is refused while non-empty.
    holders: FxHashSet<HoldOwner>,

    /// Passengers currently assigned a slot.  Never more than `throughput`.
    occupants: FxHashSet<AgentId>,

    /// Simulated time at which the slots were first seen empty, if they
    /// still are.
    clear_since: Option<f64>,

    /// Closed doors block the passage; open ones do not.
    passage_blocked: bool,

    events: Vec<GateEvent>,
}

impl Gate {
    /// A closed doorway accepting admissions once opened.
    pub fn new(id: GateId, frame: Pose, slots: Vec<Vec3>, config: GateConfig) -> GateResult<Self> {
        config.validate()?;
        if slots.is_empty() {
            return Err(GateError::NoSlots(id));
        }
        Ok(Self {
            id,
            frame,
            slots,
            config,
            is_open:         false,
            admit_enabled:   true,
            holders:         FxHashSet::default(),
            occupants:       FxHashSet::default(),
            clear_since:     None,
            passage_blocked: true,
            events:          Vec::new(),
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn id(&self) -> GateId {
        self.id
    }

    #[inline]
    pub fn frame(&self) -> &Pose {
        &self.frame
    }

    #[inline]
    pub fn slots(&self) -> &[Vec3] {
        &self.slots
    }

    #[inline]
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    #[inline]
    pub fn throughput(&self) -> usize {
        self.config.throughput as usize
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    #[inline]
    pub fn admit_enabled(&self) -> bool {
        self.admit_enabled
    }

    #[inline]
    pub fn is_passage_blocked(&self) -> bool {
        self.passage_blocked
    }

    pub fn is_held(&self) -> bool {
        !self.holders.is_empty()
    }

    pub fn is_held_by(&self, owner: HoldOwner) -> bool {
        self.holders.contains(&owner)
    }

    pub fn holder_count(&self) -> usize {
        self.holders.len()
    }

    pub fn occupant_count(&self) -> usize {
        self.occupants.len()
    }

    pub fn is_occupant(&self, agent: AgentId) -> bool {
        self.occupants.contains(&agent)
    }

    /// Current occupants in ascending id order.
    pub fn occupants(&self) -> Vec<AgentId> {
        let mut v: Vec<AgentId> = self.occupants.iter().copied().collect();
        v.sort_unstable();
        v
    }

    /// Drain open/close signals raised since the last call.
    pub fn take_events(&mut self) -> Vec<GateEvent> {
        mem::take(&mut self.events)
    }

    // ── Open / close ──────────────────────────────────────────────────────

    /// Open unconditionally and unblock the passage.  Restarts the clearance
    /// debounce.
    pub fn open(&mut self) {
        self.is_open = true;
        self.passage_blocked = false;
        self.clear_since = None;
        self.events.push(GateEvent::Opened);
    }

    /// Open if closed; otherwise nothing changes.
    pub fn ensure_open(&mut self) {
        if !self.is_open {
            self.open();
        }
    }

    /// Close unless held.  Returns whether the door is now closed.
    pub fn close(&mut self) -> bool {
        if !self.holders.is_empty() {
            tracing::debug!(gate = %self.id, holders = self.holders.len(), "close refused while held");
            return false;
        }
        self.shut(GateEvent::Closed);
        true
    }

    /// Drop every hold and close, regardless of who is in the doorway.
    pub fn force_close(&mut self) {
        self.holders.clear();
        self.shut(GateEvent::ForceClosed);
    }

    fn shut(&mut self, event: GateEvent) {
        self.is_open = false;
        self.passage_blocked = true;
        self.clear_since = None;
        self.events.push(event);
    }

    /// Register a keep-open request and open the door.
    pub fn hold_open(&mut self, owner: HoldOwner) {
        self.holders.insert(owner);
        self.open();
    }

    /// Withdraw `owner`'s keep-open request.  Does not close the door.
    pub fn release_hold(&mut self, owner: HoldOwner) -> bool {
        self.holders.remove(&owner)
    }

    pub fn set_admit_enabled(&mut self, enabled: bool) {
        self.admit_enabled = enabled;
    }

    // ── Admission ─────────────────────────────────────────────────────────

    fn slot_detection(&self) -> Detection {
        if self.config.ignore_triggers { Detection::SolidOnly } else { Detection::Any }
    }

    fn slot_taken<O: ProximityOracle + ?Sized>(&self, slot: Vec3, oracle: &O) -> bool {
        oracle.any_agent_near(slot, self.config.slot_radius, self.slot_detection())
    }

    /// Try to assign `agent` a free slot and send it there.
    ///
    /// Refused when the door is closed, admission is disabled, the doorway is
    /// at throughput, the passenger is on the wrong side for `admission`, or
    /// every slot has someone standing near it.  An occupant asking again is
    /// already admitted.
    pub fn try_admit<W>(&mut self, agent: AgentId, admission: Admission, world: &mut W) -> bool
    where
        W: Navigator + ProximityOracle + ?Sized,
    {
        if !self.is_open || !self.admit_enabled {
            return false;
        }
        if self.occupants.contains(&agent) {
            return true;
        }
        if self.occupants.len() >= self.throughput() {
            return false;
        }
        let Some(pos) = world.position(agent) else { return false };
        if !self.side_allows(admission, pos) {
            return false;
        }

        let probe: &W = world;
        let Some(slot) = self.slots.iter().copied().find(|&s| !self.slot_taken(s, probe)) else {
            return false;
        };
        steer(world, agent, slot);
        self.occupants.insert(agent);
        tracing::debug!(gate = %self.id, %agent, ?admission, slot = %slot, "admitted");
        true
    }

    pub fn try_admit_board<W>(&mut self, agent: AgentId, world: &mut W) -> bool
    where
        W: Navigator + ProximityOracle + ?Sized,
    {
        self.try_admit(agent, Admission::Board, world)
    }

    pub fn try_admit_alight<W>(&mut self, agent: AgentId, world: &mut W) -> bool
    where
        W: Navigator + ProximityOracle + ?Sized,
    {
        self.try_admit(agent, Admission::Alight, world)
    }

    fn side_allows(&self, admission: Admission, pos: Vec3) -> bool {
        let side = Side::of(&self.frame, pos);
        match admission {
            Admission::Board => side == Some(Side::Outside),
            Admission::Alight => {
                pos.distance(self.frame.position) <= self.config.admit_near_radius
                    || side == Some(Side::Inside)
            }
            Admission::Any => true,
        }
    }

    /// Give back `agent`'s slot.  Returns whether it held one.
    pub fn release_agent(&mut self, agent: AgentId) -> bool {
        let released = self.occupants.remove(&agent);
        if released {
            tracing::debug!(gate = %self.id, %agent, "released");
        }
        released
    }

    /// Drop occupants that have walked clear of every slot, or whose body no
    /// longer exists.  Returns how many were dropped.
    pub fn flush_occupants<N: Navigator + ?Sized>(&mut self, nav: &N) -> usize {
        let clear = self.config.pass_clear_distance;
        let gone: Vec<AgentId> = self
            .occupants
            .iter()
            .copied()
            .filter(|&a| match nav.position(a) {
                Some(p) => self.slots.iter().map(|s| s.distance(p)).fold(f32::INFINITY, f32::min) > clear,
                None => true,
            })
            .collect();
        for a in &gone {
            self.occupants.remove(a);
        }
        if !gone.is_empty() {
            tracing::debug!(gate = %self.id, flushed = gone.len(), "occupants flushed");
        }
        gone.len()
    }

    // ── Clearance ─────────────────────────────────────────────────────────

    /// `true` once no passenger has been detected at any slot for longer than
    /// `clear_debounce_secs`.  Any detection restarts the debounce.
    pub fn is_clear<O: ProximityOracle + ?Sized>(&mut self, now: f64, oracle: &O) -> bool {
        if self.slots.iter().any(|&s| self.slot_taken(s, oracle)) {
            self.clear_since = None;
            return false;
        }
        let since = *self.clear_since.get_or_insert(now);
        now - since > self.config.clear_debounce_secs as f64
    }

    /// [`is_clear`][Self::is_clear] after a flush, and no occupant left.
    pub fn is_clear_strict<W>(&mut self, now: f64, world: &W) -> bool
    where
        W: Navigator + ProximityOracle + ?Sized,
    {
        self.flush_occupants(world);
        self.is_clear(now, world) && self.occupants.is_empty()
    }

    /// Push anyone standing on a slot one nudge further along the side it
    /// is already on.  Returns how many were nudged.
    pub fn nudge_stragglers<W>(&self, world: &mut W) -> usize
    where
        W: Navigator + ProximityOracle + ?Sized,
    {
        let radius = self.config.slot_radius * self.config.nudge_radius_factor;
        let mut seen: Vec<AgentId> = Vec::new();
        for &slot in &self.slots {
            for agent in world.agents_near(slot, radius, Detection::Any) {
                if !seen.contains(&agent) {
                    seen.push(agent);
                }
            }
        }
        for &agent in &seen {
            let Some(pos) = world.position(agent) else { continue };
            let side = match Side::of(&self.frame, pos) {
                Some(Side::Inside) => Side::Inside,
                _ => Side::Outside,
            };
            let target = pos + side.direction(&self.frame) * self.config.nudge_distance;
            tracing::debug!(gate = %self.id, %agent, ?side, "nudging straggler");
            steer(world, agent, target);
        }
        seen.len()
    }

    // ── Geometry ──────────────────────────────────────────────────────────

    /// The slot closest to `point`.  Ties go to the earlier slot.
    pub fn nearest_slot(&self, point: Vec3) -> Option<Vec3> {
        self.slots
            .iter()
            .copied()
            .min_by(|a, b| a.distance_squared(point).total_cmp(&b.distance_squared(point)))
    }

    /// One pace past `slot` toward `side`.
    pub fn pass_point(&self, slot: Vec3, side: Side) -> Vec3 {
        slot + side.direction(&self.frame) * self.config.pass_step
    }

    /// Where alighters gather before asking for a slot.
    pub fn inner_wait_point(&self) -> Vec3 {
        self.frame.ahead(self.config.inner_wait_offset)
    }

    /// Where a boarder stands when no seat is free.
    pub fn standing_point(&self) -> Vec3 {
        self.frame.ahead(self.config.standing_offset)
    }

    /// Is `point` close enough to the inner wait point to ask for a slot?
    pub fn at_inner_wait(&self, point: Vec3) -> bool {
        point.distance(self.inner_wait_point()) < self.config.inner_wait_radius
    }
}
