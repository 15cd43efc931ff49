//! Passenger activity phases.

/// What a passenger is currently doing.
///
/// ```text
/// IdleOutside → QueueOutside → Boarding → Riding → PrepareAlight → Alighting
///                    ↑            │                     ↺
///                    └────────────┘ (not admitted before the window closed)
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AgentState {
    /// Just spawned, not yet in line.
    #[default]
    IdleOutside,
    /// Waiting in the boarding queue.
    QueueOutside,
    /// Admitted (or about to be) through the entry door.
    Boarding,
    /// Inside, seated or standing.
    Riding,
    /// Seat released, heading for the exit door.
    PrepareAlight,
    /// Through the exit door, walking away.
    Alighting,
}

impl AgentState {
    /// `true` if moving from `self` to `next` is a legal transition.
    pub fn can_enter(self, next: AgentState) -> bool {
        use AgentState::*;
        matches!(
            (self, next),
            (IdleOutside | QueueOutside | Boarding, QueueOutside)
                | (QueueOutside, Boarding)
                | (Boarding, Riding)
                | (Riding | PrepareAlight, PrepareAlight)
                | (PrepareAlight, Alighting)
        )
    }

    /// `true` for the phases in which the passenger counts as inside.
    #[inline]
    pub fn is_inside(self) -> bool {
        matches!(self, AgentState::Riding | AgentState::PrepareAlight)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AgentState::IdleOutside   => "idle_outside",
            AgentState::QueueOutside  => "queue_outside",
            AgentState::Boarding      => "boarding",
            AgentState::Riding        => "riding",
            AgentState::PrepareAlight => "prepare_alight",
            AgentState::Alighting     => "alighting",
        }
    }
}

impl std::fmt::Display for AgentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
