//! Stop-cycle observer hooks.

use pax_agent::AgentState;
use pax_core::{AgentId, GateId, Tick};
use pax_gate::GateEvent;

use crate::{Phase, StopReport};

/// Callbacks invoked by [`StopScheduler`][crate::StopScheduler] as the cycle
/// runs.  Presentation layers (animation cues, door visuals, logging) hang
/// off these; nothing in the cycle depends on them.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
pub trait StopObserver {
    /// Called at the end of each tick.
    fn on_tick(&mut self, _tick: Tick, _phase: Phase) {}

    /// Called whenever the cycle moves to a new phase.
    fn on_phase(&mut self, _stop_index: u32, _phase: Phase) {}

    /// A passenger entered a new state this tick.
    fn on_agent_state(&mut self, _agent: AgentId, _state: AgentState) {}

    /// A passenger was recycled or removed and no longer exists.
    fn on_agent_removed(&mut self, _agent: AgentId) {}

    /// A door opened or closed.
    fn on_gate_event(&mut self, _gate: GateId, _event: GateEvent) {}

    /// Called once per stop, after both doors have closed.
    fn on_stop_complete(&mut self, _report: &StopReport) {}
}

/// A [`StopObserver`] that does nothing.
pub struct NoopObserver;

impl StopObserver for NoopObserver {}
