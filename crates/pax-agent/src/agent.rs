//! The per-passenger state machine.
//!
//! An `Agent` never moves itself.  Each transition records the new phase and
//! tells the [`Navigator`] where to walk; the world does the walking.  The
//! two per-tick behaviours (queue following and riding arrival) are driven
//! by the stop scheduler.

use pax_core::{AgentConfig, AgentId, GateId, Pose, SeatId, Vec3};
use pax_world::{Navigator, steer};

use crate::{AgentError, AgentResult, AgentState, SeatPool};

/// Speed scale reached at the outer edge of the queue slow zone.
const QUEUE_SLOW_SCALE: f32 = 0.6;
/// Width of the slow zone beyond the settle radius.
const QUEUE_SLOW_BAND: f32 = 0.20;
/// The stop zone sits this far inside the settle radius...
const QUEUE_STOP_INSET: f32 = 0.03;
/// ...but never shrinks below this.
const QUEUE_STOP_MIN: f32 = 0.1;

// ── QueueFollow ───────────────────────────────────────────────────────────────

/// Settle/wake hysteresis for a passenger standing in line.
#[derive(Clone, Debug, Default, PartialEq)]
struct QueueFollow {
    /// Stopped near the anchor; no re-pathing until woken.
    settled: bool,
    /// Leader position when last observed while not settled.
    last_leader_pos: Option<Vec3>,
    /// Earliest simulated time of the next re-path.
    next_repath_at: f64,
}

// ── Agent ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Agent {
    pub id: AgentId,

    state: AgentState,

    /// Rolled (or carried over) at each stop.
    pub will_alight_here: bool,

    /// Held seat.  `SeatPool` holds the matching back-reference.
    seat: Option<SeatId>,

    /// The passenger directly ahead in line, if any.
    follow: Option<AgentId>,

    /// Where the head of the line stands.
    queue_anchor: Option<Pose>,

    pub entry_gate: Option<GateId>,
    pub exit_gate:  Option<GateId>,

    queue: QueueFollow,

    /// Riding passenger has reached its place and stopped.
    parked: bool,

    /// Last state delivered to observers.
    reported: AgentState,
}

impl Agent {
    pub fn new(id: AgentId) -> Self {
        Self {
            id,
            state:            AgentState::IdleOutside,
            will_alight_here: false,
            seat:             None,
            follow:           None,
            queue_anchor:     None,
            entry_gate:       None,
            exit_gate:        None,
            queue:            QueueFollow::default(),
            parked:           false,
            reported:         AgentState::IdleOutside,
        }
    }

    #[inline]
    pub fn state(&self) -> AgentState {
        self.state
    }

    #[inline]
    pub fn seat(&self) -> Option<SeatId> {
        self.seat
    }

    #[inline]
    pub fn follow_target(&self) -> Option<AgentId> {
        self.follow
    }

    #[inline]
    pub fn queue_anchor(&self) -> Option<Pose> {
        self.queue_anchor
    }

    #[inline]
    pub fn is_queue_settled(&self) -> bool {
        self.queue.settled
    }

    /// Return the state once if it changed since the last call.
    pub fn take_state_change(&mut self) -> Option<AgentState> {
        if self.reported == self.state {
            None
        } else {
            self.reported = self.state;
            Some(self.state)
        }
    }

    fn enter(&mut self, next: AgentState) -> AgentResult<()> {
        if !self.state.can_enter(next) {
            return Err(AgentError::InvalidTransition { agent: self.id, from: self.state, to: next });
        }
        self.state = next;
        Ok(())
    }

    // ── Queue ─────────────────────────────────────────────────────────────

    /// Join (or rejoin) the line headed at `anchor` and walk toward it.
    pub fn begin_queue<N: Navigator + ?Sized>(&mut self, anchor: Pose, nav: &mut N) -> AgentResult<()> {
        self.enter(AgentState::QueueOutside)?;
        self.queue_anchor = Some(anchor);
        self.parked = false;
        steer(nav, self.id, anchor.position);
        nav.set_speed_scale(self.id, 1.0);
        self.queue = QueueFollow::default();
        Ok(())
    }

    /// Follow `leader` in line.
    pub fn set_follow_target(&mut self, leader: AgentId) -> AgentResult<()> {
        self.enter(AgentState::QueueOutside)?;
        self.follow = Some(leader);
        Ok(())
    }

    pub fn clear_follow(&mut self) {
        self.follow = None;
    }

    /// The line was re-linked around this passenger: start following afresh.
    pub fn on_queue_rebound(&mut self) {
        self.queue.settled = false;
        self.queue.last_leader_pos = None;
    }

    /// Per-tick queue following with settle/wake hysteresis.
    ///
    /// A settled passenger stays put until its leader has moved at least
    /// `queue_wake_distance` or it has drifted more than
    /// `queue_settle_radius + queue_wake_margin` from its anchor.
    pub fn update_queue_follow<N: Navigator + ?Sized>(
        &mut self,
        now: f64,
        cfg: &AgentConfig,
        nav: &mut N,
    ) {
        if self.state != AgentState::QueueOutside {
            return;
        }
        let Some(own) = nav.position(self.id) else { return };

        let leader_pos = self.follow.and_then(|l| nav.position(l));
        let (anchor_pos, anchor_fwd) = match (self.follow, leader_pos, self.queue_anchor) {
            (Some(leader), Some(pos), anchor) => {
                let fwd = nav
                    .facing(leader)
                    .or(anchor.map(|a| a.forward))
                    .unwrap_or(Vec3::FORWARD);
                (pos - fwd * cfg.follow_distance, fwd)
            }
            (_, _, Some(anchor)) => (anchor.position, anchor.forward),
            _ => return,
        };

        let dist = own.distance(anchor_pos);
        let leader_moved = match leader_pos {
            Some(pos) => pos.distance(*self.queue.last_leader_pos.get_or_insert(pos)),
            None => 0.0,
        };

        let stop_zone = (cfg.queue_settle_radius - QUEUE_STOP_INSET).max(QUEUE_STOP_MIN);
        let slow_zone = cfg.queue_settle_radius + QUEUE_SLOW_BAND;
        let desired = if dist <= stop_zone {
            0.0
        } else if dist <= slow_zone {
            let t = (dist - stop_zone) / (slow_zone - stop_zone);
            QUEUE_SLOW_SCALE * t
        } else {
            1.0
        };

        if !self.queue.settled {
            if now >= self.queue.next_repath_at {
                steer(nav, self.id, anchor_pos);
                self.queue.next_repath_at = now + cfg.queue_repath_secs as f64;
            }
            if dist <= cfg.queue_settle_radius || desired <= 0.01 {
                self.queue.settled = true;
                nav.stop(self.id);
                nav.face(self.id, anchor_fwd);
            }
        } else {
            let wake = leader_moved >= cfg.queue_wake_distance
                || dist > cfg.queue_settle_radius + cfg.queue_wake_margin;
            if wake {
                self.queue.settled = false;
                steer(nav, self.id, anchor_pos);
                self.queue.next_repath_at = now + cfg.queue_repath_secs as f64;
                self.queue.last_leader_pos = leader_pos;
            } else {
                nav.face(self.id, anchor_fwd);
            }
        }

        nav.set_speed_scale(self.id, desired);

        if !self.queue.settled && leader_pos.is_some() {
            self.queue.last_leader_pos = leader_pos;
        }
    }

    // ── Boarding & riding ─────────────────────────────────────────────────

    /// Leave the line for the entry door.  The passenger moves once the door
    /// admits it.
    pub fn begin_board<N: Navigator + ?Sized>(&mut self, gate: GateId, nav: &mut N) -> AgentResult<()> {
        self.enter(AgentState::Boarding)?;
        self.entry_gate = Some(gate);
        self.follow = None;
        self.queue = QueueFollow::default();
        nav.set_speed_scale(self.id, 1.0);
        Ok(())
    }

    /// Ride in `seat` (already reserved by the caller) or standing at `place`.
    pub fn begin_ride<N: Navigator + ?Sized>(
        &mut self,
        seat: Option<SeatId>,
        place: Vec3,
        nav: &mut N,
    ) -> AgentResult<()> {
        self.enter(AgentState::Riding)?;
        self.seat = seat;
        self.parked = false;
        steer(nav, self.id, place);
        Ok(())
    }

    /// Stop walking once the seat or standing place is reached.  A seated
    /// passenger is snapped onto the seat and turned to face its way.
    pub fn update_riding<N: Navigator + ?Sized>(&mut self, cfg: &AgentConfig, seats: &SeatPool, nav: &mut N) {
        if self.state != AgentState::Riding || self.parked {
            return;
        }
        if !nav.has_arrived(self.id, cfg.arrive_threshold) {
            return;
        }
        match self.seat.and_then(|s| seats.slot(s)) {
            Some(slot) => {
                nav.warp(self.id, slot.pose.position);
                nav.face(self.id, slot.pose.forward);
            }
            None => nav.stop(self.id),
        }
        self.parked = true;
    }

    // ── Alighting ─────────────────────────────────────────────────────────

    /// Give up the seat and head for the exit door at `door`.
    pub fn begin_prepare_alight<N: Navigator + ?Sized>(
        &mut self,
        exit_gate: GateId,
        door: Vec3,
        seats: &mut SeatPool,
        nav: &mut N,
    ) -> AgentResult<()> {
        self.enter(AgentState::PrepareAlight)?;
        self.exit_gate = Some(exit_gate);
        if let Some(seat) = self.seat.take() {
            seats.release(seat, self.id);
        }
        self.parked = false;
        nav.stop(self.id);
        nav.set_speed_scale(self.id, 1.0);
        steer(nav, self.id, door);
        Ok(())
    }

    /// Through the exit door: walk to `exit_point`.
    pub fn begin_alight<N: Navigator + ?Sized>(&mut self, exit_point: Vec3, nav: &mut N) -> AgentResult<()> {
        self.enter(AgentState::Alighting)?;
        self.will_alight_here = false;
        steer(nav, self.id, exit_point);
        Ok(())
    }

    /// Drop the seat reference without touching the pool.  Used when the pool
    /// side has already been cleared.
    pub fn forget_seat(&mut self) -> Option<SeatId> {
        self.seat.take()
    }
}
