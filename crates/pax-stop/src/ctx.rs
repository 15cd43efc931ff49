//! Shared state handed to each cooperative task when it is polled.

use pax_agent::{AgentStore, QueueChain, SeatPool};
use pax_core::{AgentConfig, AgentId, StopConfig, Vec3};
use pax_world::World;

use crate::StopReport;

/// Result of polling a task once.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlowStatus {
    /// Suspended; poll again next tick.
    Running,
    /// Finished.  Further polls are no-ops.
    Done,
}

impl FlowStatus {
    #[inline]
    pub fn is_done(self) -> bool {
        self == FlowStatus::Done
    }
}

/// Mutable view of everything a task may touch during one poll.
///
/// Tasks run one at a time on the scheduler's thread, and each poll runs to
/// its next suspension point, so no other task ever sees a half-applied
/// update.
pub struct StopCtx<'a, W: World + ?Sized> {
    /// Simulated seconds at this tick.
    pub now: f64,

    pub config:       &'a StopConfig,
    pub agent_config: &'a AgentConfig,

    pub world:  &'a mut W,
    pub agents: &'a mut AgentStore,
    pub seats:  &'a mut SeatPool,
    pub queue:  &'a mut QueueChain,

    /// Passengers on board, in boarding order.
    pub inside: &'a mut Vec<AgentId>,

    /// Alighted passengers walking away.
    pub recycling: &'a mut Vec<crate::RecycleTask>,

    pub report: &'a mut StopReport,

    /// Where alighted passengers walk to before being recycled.
    pub exit_point: Vec3,
}

impl<W: World + ?Sized> StopCtx<'_, W> {
    /// Drop `agent` from the inside list.
    pub fn remove_inside(&mut self, agent: AgentId) {
        self.inside.retain(|&a| a != agent);
    }

    /// Destroy `agent` and scrub every reference the cycle holds to it.
    /// Returns whether it existed.
    pub fn retire(&mut self, agent: AgentId) -> bool {
        self.remove_inside(agent);
        self.queue.remove(agent, self.agents, self.world);
        self.seats.release_all(agent);
        self.world.remove(agent);
        self.agents.despawn(agent).is_some()
    }
}
