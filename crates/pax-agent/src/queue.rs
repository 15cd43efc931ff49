//! `QueueChain`: the boarding line.
//!
//! The head stands at the anchor; everyone else follows the passenger
//! directly ahead.  Removing anyone re-links the tail behind them to the
//! nearest live predecessor, falling back to the anchor, so the line never
//! points at a passenger who has left.

use pax_core::{AgentId, Pose, Vec3};
use pax_world::Navigator;

use crate::AgentStore;

/// Gap between the anchor and the first spawn position behind it.
const SPAWN_LEAD_GAP: f32 = 1.0;

pub struct QueueChain {
    anchor: Pose,
    order:  Vec<AgentId>,
}

impl QueueChain {
    pub fn new(anchor: Pose) -> Self {
        Self { anchor, order: Vec::new() }
    }

    #[inline]
    pub fn anchor(&self) -> Pose {
        self.anchor
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn head(&self) -> Option<AgentId> {
        self.order.first().copied()
    }

    pub fn as_slice(&self) -> &[AgentId] {
        &self.order
    }

    pub fn contains(&self, agent: AgentId) -> bool {
        self.order.contains(&agent)
    }

    pub fn position(&self, agent: AgentId) -> Option<usize> {
        self.order.iter().position(|&a| a == agent)
    }

    /// Spawn position for the passenger who will stand at `index`.
    pub fn back_of_line(&self, index: usize, spacing: f32) -> Vec3 {
        self.anchor.ahead(-(SPAWN_LEAD_GAP + spacing * (index as f32 + 1.0)))
    }

    /// Join at the tail, following the current last passenger.
    pub fn push_back<N: Navigator + ?Sized>(&mut self, agent: AgentId, store: &mut AgentStore, nav: &mut N) {
        let leader = self.order.last().copied();
        self.order.push(agent);
        let Some(a) = store.get_mut(agent) else { return };
        if let Err(e) = a.begin_queue(self.anchor, nav) {
            tracing::warn!(error = %e, "cannot enqueue");
            return;
        }
        match leader {
            Some(leader) => {
                if let Err(e) = a.set_follow_target(leader) {
                    tracing::warn!(error = %e, "cannot follow leader");
                }
            }
            None => a.clear_follow(),
        }
    }

    /// Put `agent` back at the head of the line.
    pub fn push_front<N: Navigator + ?Sized>(&mut self, agent: AgentId, store: &mut AgentStore, nav: &mut N) {
        self.order.insert(0, agent);
        self.relink_from(0, store, nav);
    }

    /// Take the head of the line and re-link the new head to the anchor.
    pub fn pop_front<N: Navigator + ?Sized>(&mut self, store: &mut AgentStore, nav: &mut N) -> Option<AgentId> {
        if self.order.is_empty() {
            return None;
        }
        let head = self.order.remove(0);
        self.relink_from(0, store, nav);
        Some(head)
    }

    /// Remove `agent` from anywhere in the line.  Returns whether it was queued.
    pub fn remove<N: Navigator + ?Sized>(&mut self, agent: AgentId, store: &mut AgentStore, nav: &mut N) -> bool {
        let Some(idx) = self.position(agent) else { return false };
        self.order.remove(idx);
        self.relink_from(idx, store, nav);
        true
    }

    /// Drop ids whose passengers no longer exist.  Returns how many went.
    pub fn purge_stale<N: Navigator + ?Sized>(&mut self, store: &mut AgentStore, nav: &mut N) -> usize {
        let before = self.order.len();
        self.order.retain(|&a| store.contains(a));
        let removed = before - self.order.len();
        if removed > 0 {
            self.relink_from(0, store, nav);
        }
        removed
    }

    /// Re-point every passenger from `start` to the tail at its nearest live
    /// predecessor, or at the anchor if none is left.
    pub fn relink_from<N: Navigator + ?Sized>(&mut self, start: usize, store: &mut AgentStore, nav: &mut N) {
        for i in start..self.order.len() {
            let agent = self.order[i];
            if !store.contains(agent) {
                continue;
            }
            let leader = self.order[..i].iter().rev().copied().find(|&p| store.contains(p));
            let Some(a) = store.get_mut(agent) else { continue };
            let linked = match leader {
                Some(leader) => a.set_follow_target(leader),
                None => {
                    a.clear_follow();
                    a.begin_queue(self.anchor, nav)
                }
            };
            if let Err(e) = linked {
                tracing::warn!(error = %e, "queue re-link refused");
            }
            a.on_queue_rebound();
        }
    }

    /// `(passenger, follow target)` for every live queued passenger, in order.
    pub fn links(&self, store: &AgentStore) -> Vec<(AgentId, Option<AgentId>)> {
        self.order
            .iter()
            .filter_map(|&a| store.get(a).map(|ag| (a, ag.follow_target())))
            .collect()
    }

    /// `true` if the head follows nobody and each later passenger follows the
    /// live passenger directly ahead of it.
    pub fn is_intact(&self, store: &AgentStore) -> bool {
        let links = self.links(store);
        links.iter().enumerate().all(|(i, &(_, follow))| match i {
            0 => follow.is_none(),
            _ => follow == Some(links[i - 1].0),
        })
    }
}
