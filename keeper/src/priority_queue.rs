//! Priority queue for tracking participant health (min-heap by health factor)

use std::cmp::Reverse;
use std::collections::HashMap;

use krona_engine::ParticipantId;
use priority_queue::PriorityQueue;

use crate::health::ParticipantHealth;

/// Health-based priority queue (min-heap: lowest health factor first)
pub struct HealthQueue {
    /// Priority queue (using Reverse for min-heap)
    queue: PriorityQueue<ParticipantId, Reverse<u128>>,
    /// Map for O(1) lookups
    map: HashMap<ParticipantId, ParticipantHealth>,
}

impl HealthQueue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self {
            queue: PriorityQueue::new(),
            map: HashMap::new(),
        }
    }

    /// Push or update a participant's snapshot
    pub fn push(&mut self, snapshot: ParticipantHealth) {
        let participant = snapshot.participant;
        let health_factor = snapshot.health_factor;

        self.map.insert(participant, snapshot);
        self.queue.push(participant, Reverse(health_factor));
    }

    /// Pop the participant with the lowest health factor
    pub fn pop(&mut self) -> Option<ParticipantHealth> {
        let (participant, _priority) = self.queue.pop()?;
        self.map.remove(&participant)
    }

    /// Peek at the worst position without removing it
    pub fn peek(&self) -> Option<&ParticipantHealth> {
        let (participant, _priority) = self.queue.peek()?;
        self.map.get(participant)
    }

    /// Remove a participant from the queue
    pub fn remove(&mut self, participant: &ParticipantId) -> Option<ParticipantHealth> {
        self.queue.remove(participant);
        self.map.remove(participant)
    }

    /// Get a participant's snapshot
    pub fn get(&self, participant: &ParticipantId) -> Option<&ParticipantHealth> {
        self.map.get(participant)
    }

    /// Check if queue contains a participant
    pub fn contains(&self, participant: &ParticipantId) -> bool {
        self.map.contains_key(participant)
    }

    /// Number of tracked participants
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// All participants below the minimum health factor, worst first
    pub fn get_liquidatable(&self, min_health_factor: u128) -> Vec<ParticipantHealth> {
        let mut liquidatable: Vec<ParticipantHealth> = self
            .map
            .values()
            .filter(|snapshot| snapshot.needs_liquidation(min_health_factor))
            .cloned()
            .collect();
        liquidatable.sort_by_key(|snapshot| snapshot.health_factor);
        liquidatable
    }

    /// Clear all entries
    pub fn clear(&mut self) {
        self.queue.clear();
        self.map.clear();
    }
}

impl Default for HealthQueue {
    fn default() -> Self {
        Self::new()
    }
}
