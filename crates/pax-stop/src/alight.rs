//! `AlightFlow`: windowed alighting through the exit door.
//!
//! # Per-passenger sequence
//!
//! ```text
//!   Approach  walk to the inner wait point          (bounded by the window)
//!   Admit     poll Gate::try_admit_alight           (bounded by the window)
//!   Transit   walk onto the assigned slot           (window + transit grace)
//!   StepOut   one pace outward past the slot, then release the slot
//!   ──►       off the inside list, walk to the exit point, hand to recycling
//!   Pace      gate_interval_secs before the next passenger
//! ```
//!
//! New passengers are only started while the window is open.  A passenger
//! still waiting when it closes stays on board, `PrepareAlight`, selected
//! for the next stop.

use pax_core::{AgentId, Vec3};
use pax_gate::{Gate, Side};
use pax_world::{World, steer};

use crate::{FlowStatus, RecycleTask, StopCtx};

#[derive(Copy, Clone, Debug, PartialEq)]
enum Step {
    Next,
    Approach { agent: AgentId },
    Admit { agent: AgentId },
    Transit { agent: AgentId, until: f64 },
    StepOut { agent: AgentId, slot: Vec3, until: f64 },
    Pace { until: f64 },
    Finished,
}

pub struct AlightFlow {
    alighters: Vec<AgentId>,
    next:      usize,
    deadline:  f64,
    completed: u32,
    step:      Step,
}

impl AlightFlow {
    /// Collect every passenger on board marked to alight, enable admission on
    /// `gate` and open the window.
    pub fn start<W: World + ?Sized>(ctx: &mut StopCtx<'_, W>, gate: &mut Gate) -> Self {
        gate.set_admit_enabled(true);
        gate.ensure_open();

        let agents = &*ctx.agents;
        let alighters: Vec<AgentId> = ctx
            .inside
            .iter()
            .copied()
            .filter(|&a| agents.get(a).is_some_and(|ag| ag.will_alight_here))
            .collect();
        ctx.report.alight_selected = alighters.len() as u32;

        let deadline = ctx.now + ctx.config.alight_window() as f64;
        tracing::debug!(gate = %gate.id(), selected = alighters.len(), deadline, "alight window opened");
        Self { alighters, next: 0, deadline, completed: 0, step: Step::Next }
    }

    #[inline]
    pub fn deadline(&self) -> f64 {
        self.deadline
    }

    #[inline]
    pub fn completed(&self) -> u32 {
        self.completed
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.step == Step::Finished
    }

    /// Passengers this flow was started with, in processing order.
    pub fn selected(&self) -> &[AgentId] {
        &self.alighters
    }

    /// Advance to the next suspension point.
    pub fn poll<W: World + ?Sized>(&mut self, ctx: &mut StopCtx<'_, W>, gate: &mut Gate) -> FlowStatus {
        let now = ctx.now;
        loop {
            match self.step {
                Step::Finished => return FlowStatus::Done,

                Step::Next => {
                    if self.next >= self.alighters.len() || now >= self.deadline {
                        self.finish(ctx, gate);
                        return FlowStatus::Done;
                    }
                    let agent = self.alighters[self.next];
                    self.next += 1;
                    if !ctx.agents.contains(agent) {
                        continue;
                    }
                    gate.ensure_open();
                    steer(ctx.world, agent, gate.inner_wait_point());
                    self.step = Step::Approach { agent };
                }

                Step::Approach { agent } => {
                    if !ctx.agents.contains(agent) {
                        self.step = Step::Next;
                        continue;
                    }
                    let waiting = ctx.world.position(agent).is_some_and(|p| gate.at_inner_wait(p))
                        || ctx.world.has_arrived(agent, ctx.agent_config.loose_arrive_threshold);
                    if waiting {
                        self.step = Step::Admit { agent };
                    } else if now >= self.deadline {
                        tracing::debug!(%agent, "alighter did not reach the door in time");
                        self.step = Step::Next;
                    } else {
                        return FlowStatus::Running;
                    }
                }

                Step::Admit { agent } => {
                    if !ctx.agents.contains(agent) {
                        self.step = Step::Next;
                        continue;
                    }
                    if gate.try_admit_alight(agent, ctx.world) {
                        let until = now.max(self.deadline) + ctx.config.transit_grace_secs as f64;
                        self.step = Step::Transit { agent, until };
                    } else if now >= self.deadline {
                        tracing::debug!(%agent, "alighter not admitted before the window closed");
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
                    steer(ctx.world, agent, gate.pass_point(slot, Side::Outside));
                    self.step = Step::StepOut { agent, slot, until };
                }

                Step::StepOut { agent, slot, until } => {
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
                    self.complete(ctx, agent);
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

    /// Off the vehicle: leave the inside list now, walk away, recycle later.
    fn complete<W: World + ?Sized>(&mut self, ctx: &mut StopCtx<'_, W>, agent: AgentId) {
        let exit_point = ctx.exit_point;
        if let Some(a) = ctx.agents.get_mut(agent) {
            if let Err(e) = a.begin_alight(exit_point, ctx.world) {
                tracing::warn!(error = %e, "alight transition refused");
            }
            if let Some(seat) = a.forget_seat() {
                ctx.seats.release(seat, agent);
            }
        }
        ctx.remove_inside(agent);
        ctx.recycling.push(RecycleTask::new(agent, ctx.now));
        self.completed += 1;
        ctx.report.alight_completed = self.completed;
        tracing::debug!(%agent, "alighted");
    }

    fn finish<W: World + ?Sized>(&mut self, ctx: &mut StopCtx<'_, W>, gate: &mut Gate) {
        gate.set_admit_enabled(false);
        self.step = Step::Finished;
        let abandoned = self.alighters.len() as u32 - self.completed;
        ctx.report.alight_abandoned = abandoned;
        tracing::debug!(gate = %gate.id(), completed = self.completed, abandoned, "alight window closed");
    }
}
