//! `BoardFlow`: windowed boarding through the entry door.
//!
//! The head of the queue is taken, admitted through the entry door, stepped
//! one pace inside and sent to the nearest free seat (or the standing place
//! by the door when every seat is taken).  Boarding stops when the window
//! closes, the target is met, the vehicle is full or the queue is empty.

use pax_core::{AgentId, Vec3};
use pax_gate::{Gate, Side};
use pax_world::{World, steer};

use crate::{FlowStatus, StopCtx};

#[derive(Copy, Clone, Debug, PartialEq)]
enum Step {
    Next,
    Admit { agent: AgentId },
    Transit { agent: AgentId, until: f64 },
    StepIn { agent: AgentId, slot: Vec3, until: f64 },
    Pace { until: f64 },
    Finished,
}

pub struct BoardFlow {
    target:   u32,
    boarded:  u32,
    deadline: f64,
    step:     Step,
}

impl BoardFlow {
    /// Fix this stop's boarding target at
    /// `min(wish, capacity left, queue length)`, enable admission on `gate`
    /// and open the window.
    pub fn start<W: World + ?Sized>(wish: u32, ctx: &mut StopCtx<'_, W>, gate: &mut Gate) -> Self {
        gate.set_admit_enabled(true);
        gate.ensure_open();
        ctx.queue.purge_stale(ctx.agents, ctx.world);

        let target = board_target(wish, ctx.config.capacity, ctx.inside.len(), ctx.queue.len());
        ctx.report.board_target = target;

        let deadline = ctx.now + ctx.config.board_window() as f64;
        tracing::debug!(gate = %gate.id(), wish, target, deadline, "board window opened");
        Self { target, boarded: 0, deadline, step: Step::Next }
    }

    #[inline]
    pub fn target(&self) -> u32 {
        self.target
    }

    #[inline]
    pub fn boarded(&self) -> u32 {
        self.boarded
    }

    #[inline]
    pub fn deadline(&self) -> f64 {
        self.deadline
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.step == Step::Finished
    }

    /// Advance to the next suspension point.
    pub fn poll<W: World + ?Sized>(&mut self, ctx: &mut StopCtx<'_, W>, gate: &mut Gate) -> FlowStatus {
        let now = ctx.now;
        loop {
            match self.step {
                Step::Finished => return FlowStatus::Done,

                Step::Next => {
                    ctx.queue.purge_stale(ctx.agents, ctx.world);
                    let full = ctx.inside.len() >= ctx.config.capacity as usize;
                    if now >= self.deadline || self.boarded >= self.target || full || ctx.queue.is_empty() {
                        self.finish(gate);
                        return FlowStatus::Done;
                    }
                    let Some(agent) = ctx.queue.pop_front(ctx.agents, ctx.world) else { continue };
                    let Some(a) = ctx.agents.get_mut(agent) else { continue };
                    if let Err(e) = a.begin_board(gate.id(), ctx.world) {
                        tracing::warn!(error = %e, "board transition refused");
                        ctx.queue.push_front(agent, ctx.agents, ctx.world);
                        self.finish(gate);
                        return FlowStatus::Done;
                    }
                    gate.ensure_open();
                    self.step = Step::Admit { agent };
                }

                Step::Admit { agent } => {
                    if !ctx.agents.contains(agent) {
                        self.step = Step::Next;
                        continue;
                    }
                    if gate.try_admit_board(agent, ctx.world) {
                        let until = now.max(self.deadline) + ctx.config.transit_grace_secs as f64;
                        self.step = Step::Transit { agent, until };
                    } else if now >= self.deadline {
                        tracing::debug!(%agent, "boarder not admitted before the window closed; back to the head of the queue");
                        ctx.queue.push_front(agent, ctx.agents, ctx.world);
                        ctx.report.board_abandoned += 1;
                        self.step = Step::Next;
                    } else {
                        return FlowStatus::Running;
                    }
                }

                Step::Transit { agent, until } => {
                    if !ctx.agents.contains(agent) {
                        gate.release_agent(agent);
                        self.step = Step::Next;
                        continue;
                    }
                    if !ctx.world.has_arrived(agent, ctx.agent_config.arrive_threshold) && now < until {
                        return FlowStatus::Running;
                    }
                    let pos = ctx.world.position(agent).unwrap_or(gate.frame().position);
                    let slot = gate.nearest_slot(pos).unwrap_or(gate.frame().position);
                    steer(ctx.world, agent, gate.pass_point(slot, Side::Inside));
                    self.step = Step::StepIn { agent, slot, until };
                }

                Step::StepIn { agent, slot, until } => {
                    if !ctx.agents.contains(agent) {
                        gate.release_agent(agent);
                        self.step = Step::Next;
                        continue;
                    }
                    let clear = ctx
                        .world
                        .position(agent)
                        .is_none_or(|p| p.distance(slot) > gate.config().pass_clear_distance);
                    if !clear
                        && !ctx.world.has_arrived(agent, ctx.agent_config.loose_arrive_threshold)
                        && now < until
                    {
                        return FlowStatus::Running;
                    }
                    gate.release_agent(agent);
                    self.seat(ctx, gate, agent);
                    self.step = Step::Pace { until: now + ctx.config.gate_interval_secs as f64 };
                }

                Step::Pace { until } => {
                    if now < until {
                        return FlowStatus::Running;
                    }
                    self.step = Step::Next;
                }
            }
        }
    }

    /// On board: nearest free seat, else stand by the door.
    fn seat<W: World + ?Sized>(&mut self, ctx: &mut StopCtx<'_, W>, gate: &Gate, agent: AgentId) {
        let from = ctx.world.position(agent).unwrap_or(gate.frame().position);
        let seat = ctx.seats.reserve_nearest(from, agent);
        let place = seat
            .and_then(|s| ctx.seats.slot(s))
            .map_or(gate.standing_point(), |slot| slot.pose.position);

        let Some(a) = ctx.agents.get_mut(agent) else { return };
        if let Err(e) = a.begin_ride(seat, place, ctx.world) {
            tracing::warn!(error = %e, "ride transition refused");
            if let Some(s) = seat {
                ctx.seats.release(s, agent);
            }
            return;
        }
        ctx.inside.push(agent);
        self.boarded += 1;
        ctx.report.board_completed = self.boarded;
        tracing::debug!(%agent, ?seat, "boarded");
    }

    fn finish(&mut self, gate: &mut Gate) {
        gate.set_admit_enabled(false);
        self.step = Step::Finished;
        tracing::debug!(gate = %gate.id(), boarded = self.boarded, target = self.target, "board window closed");
    }
}

/// `min(wish, capacity − inside, queue length)`, never negative.
pub fn board_target(wish: u32, capacity: u32, inside: usize, queued: usize) -> u32 {
    let capacity_left = (capacity as usize).saturating_sub(inside);
    (wish as usize).min(capacity_left).min(queued) as u32
}
