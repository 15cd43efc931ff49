//! `AgentStore`: owning storage for every live passenger.
//!
//! Passengers live in a `BTreeMap` keyed by `AgentId`, so iteration is in
//! ascending id order and only touches live entries.  Ids come from a
//! monotonic counter and are never handed out twice: a stale id held anywhere
//! else resolves to "gone" instead of aliasing a newer passenger.

use std::collections::BTreeMap;

use pax_core::AgentId;

use crate::Agent;

#[derive(Default)]
pub struct AgentStore {
    agents:  BTreeMap<AgentId, Agent>,
    next_id: u32,
}

impl AgentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh `IdleOutside` passenger and return its id.
    pub fn spawn(&mut self) -> AgentId {
        let id = AgentId(self.next_id);
        self.next_id += 1;
        self.agents.insert(id, Agent::new(id));
        id
    }

    /// Remove and return a passenger.  `None` if it was already gone.
    pub fn despawn(&mut self, id: AgentId) -> Option<Agent> {
        self.agents.remove(&id)
    }

    #[inline]
    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(&id)
    }

    #[inline]
    pub fn contains(&self, id: AgentId) -> bool {
        self.agents.contains_key(&id)
    }

    /// Number of live passengers.
    #[inline]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Live passengers in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Agent> + '_ {
        self.agents.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Agent> + '_ {
        self.agents.values_mut()
    }

    /// Ids of live passengers in ascending order.
    pub fn ids(&self) -> Vec<AgentId> {
        self.agents.keys().copied().collect()
    }
}
