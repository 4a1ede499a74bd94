//! Configuration of [`ReplayBuffer`](super::ReplayBuffer).
use serde::{Deserialize, Serialize};

/// Configuration of [`ReplayBuffer`](super::ReplayBuffer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ReplayBufferConfig {
    /// The maximum number of transitions, `max_memory_length`.
    pub capacity: usize,
}

impl Default for ReplayBufferConfig {
    fn default() -> Self {
        Self { capacity: 50000 }
    }
}

impl ReplayBufferConfig {
    /// Sets the capacity of the replay buffer.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }
}
