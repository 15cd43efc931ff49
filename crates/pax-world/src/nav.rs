//! Traits for the external collaborators the stop cycle drives.

use pax_core::{AgentId, Vec3};

use crate::NavResult;

/// Which bodies count when probing a point.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Detection {
    /// Only solid bodies; trigger-only volumes are ignored.
    #[default]
    SolidOnly,
    /// Every tracked body.
    Any,
}

/// Answers "is anyone standing near this point?".
pub trait ProximityOracle {
    /// All tracked agents within `radius` of `point`, in ascending id order.
    fn agents_near(&self, point: Vec3, radius: f32, detection: Detection) -> Vec<AgentId>;

    fn any_agent_near(&self, point: Vec3, radius: f32, detection: Detection) -> bool {
        !self.agents_near(point, radius, detection).is_empty()
    }
}

/// Moves passengers around the walkable surface.
///
/// `move_to` is fire-and-forget: it starts movement and returns.  Callers
/// poll [`has_arrived`][Self::has_arrived] on later ticks.
pub trait Navigator {
    /// Create a body for `agent` near `at` and return where it was placed.
    /// If `at` is off the surface the body is placed there anyway.
    fn place(&mut self, agent: AgentId, at: Vec3) -> Vec3;

    /// Remove `agent`'s body.  Unknown agents are ignored.
    fn remove(&mut self, agent: AgentId);

    /// Start walking `agent` toward `point`.
    fn move_to(&mut self, agent: AgentId, point: Vec3) -> NavResult<()>;

    /// Clear the current path; the body stays where it is.
    fn stop(&mut self, agent: AgentId);

    /// Scale the agent's walking speed (0 = stand still, 1 = full speed).
    fn set_speed_scale(&mut self, agent: AgentId, scale: f32);

    /// `true` once the remaining distance to the current target is within
    /// `threshold`, or the agent has no target.  Unknown agents never arrive.
    fn has_arrived(&self, agent: AgentId, threshold: f32) -> bool;

    fn position(&self, agent: AgentId) -> Option<Vec3>;

    /// Unit ground-plane facing direction.
    fn facing(&self, agent: AgentId) -> Option<Vec3>;

    /// Turn the agent to face `direction` without moving.  Presentation only.
    fn face(&mut self, _agent: AgentId, _direction: Vec3) {}

    /// Put the agent exactly at `to` and clear its path.
    fn warp(&mut self, agent: AgentId, _to: Vec3) {
        self.stop(agent);
    }
}

/// A world the stop cycle can step: navigation plus proximity.
pub trait World: Navigator + ProximityOracle {
    /// Advance body movement by `dt_secs` of simulated time.
    fn advance(&mut self, dt_secs: f32);
}

/// `move_to` that logs and swallows failures.
///
/// An unreachable target leaves the agent at its last position; the flow that
/// asked carries on and the agent is retried or abandoned by deadline.
pub fn steer<N: Navigator + ?Sized>(nav: &mut N, agent: AgentId, point: Vec3) -> bool {
    match nav.move_to(agent, point) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(%agent, error = %e, "navigation target rejected");
            false
        }
    }
}
