//! `RecycleTask`: walk an alighted passenger away, then destroy it.
//!
//! Runs independently of the door: the passenger is already off the inside
//! list.  The walk to the exit point is re-issued while the passenger is
//! close to it, and the passenger is destroyed once within
//! `recycle_clear_distance`, or after `recycle_timeout_secs` regardless.

use pax_core::AgentId;
use pax_world::{World, steer};

use crate::{FlowStatus, StopCtx};

#[derive(Clone, Debug, PartialEq)]
pub struct RecycleTask {
    pub agent: AgentId,
    started:   f64,
}

impl RecycleTask {
    pub fn new(agent: AgentId, now: f64) -> Self {
        Self { agent, started: now }
    }

    pub fn poll<W: World + ?Sized>(&mut self, ctx: &mut StopCtx<'_, W>) -> FlowStatus {
        let agent = self.agent;
        if !ctx.agents.contains(agent) {
            return FlowStatus::Done;
        }
        let Some(pos) = ctx.world.position(agent) else {
            ctx.retire(agent);
            return FlowStatus::Done;
        };

        let dist = pos.distance(ctx.exit_point);
        if dist <= ctx.config.recycle_clear_distance {
            tracing::debug!(%agent, "recycled");
            ctx.retire(agent);
            return FlowStatus::Done;
        }
        if ctx.now - self.started >= ctx.config.recycle_timeout_secs as f64 {
            tracing::warn!(%agent, remaining = dist, "never reached the exit point; recycling anyway");
            ctx.retire(agent);
            return FlowStatus::Done;
        }
        if dist < ctx.config.recycle_nudge_distance {
            steer(ctx.world, agent, ctx.exit_point);
        }
        FlowStatus::Running
    }
}
