//! `CloseDoorTask`: close a door without trapping anyone, within a bound.
//!
//! Each poll flushes passed occupants and checks strict clearance.  While the
//! door is not clear, anyone still standing on a slot is nudged further along
//! the side it is on.  Once clear the scheduler's hold is released and the
//! door closed normally; if `close_timeout_secs` runs out first the door is
//! force-closed.  Either way the task ends within the timeout.

use pax_gate::{Gate, HoldOwner};
use pax_world::World;

use crate::FlowStatus;

/// How a close attempt ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CloseOutcome {
    /// Cleared and closed normally.
    Closed,
    /// Cleared, but another owner still holds the door open.
    StillHeld,
    /// Timed out and force-closed.
    Forced,
}

pub struct CloseDoorTask {
    owner:   HoldOwner,
    started: f64,
    timeout: f64,
    outcome: Option<CloseOutcome>,
}

impl CloseDoorTask {
    pub fn new(owner: HoldOwner, now: f64, timeout_secs: f32) -> Self {
        Self { owner, started: now, timeout: timeout_secs.max(0.0) as f64, outcome: None }
    }

    pub fn outcome(&self) -> Option<CloseOutcome> {
        self.outcome
    }

    pub fn poll<W: World + ?Sized>(&mut self, now: f64, gate: &mut Gate, world: &mut W) -> FlowStatus {
        if self.outcome.is_some() {
            return FlowStatus::Done;
        }

        if gate.is_clear_strict(now, &*world) {
            gate.release_hold(self.owner);
            let outcome = if gate.close() { CloseOutcome::Closed } else { CloseOutcome::StillHeld };
            tracing::debug!(gate = %gate.id(), ?outcome, "door closed");
            self.outcome = Some(outcome);
            return FlowStatus::Done;
        }

        if now - self.started >= self.timeout {
            tracing::warn!(
                gate = %gate.id(),
                occupants = gate.occupant_count(),
                "doorway never cleared; forcing it shut"
            );
            gate.force_close();
            gate.release_hold(self.owner);
            self.outcome = Some(CloseOutcome::Forced);
            return FlowStatus::Done;
        }

        gate.nudge_stragglers(world);
        FlowStatus::Running
    }
}
