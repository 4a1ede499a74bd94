//! Counters and reward history of a training run.
use std::collections::VecDeque;

/// Progress of a training run.
///
/// `running_reward` is the mean of the last `reward_window` episode rewards.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingState {
    /// Number of environment steps taken since the beginning of training.
    pub frame_count: usize,

    /// Number of finished episodes.
    pub episode_count: usize,

    /// Mean reward of the episodes in the history.
    pub running_reward: f32,

    episode_reward_history: VecDeque<f32>,
    reward_window: usize,
}

impl TrainingState {
    /// Constructs the state at the beginning of training.
    pub fn new(reward_window: usize) -> Self {
        Self::resumed(0, reward_window)
    }

    /// Constructs the state of a run resumed at `frame_count`.
    ///
    /// Episode counters and the reward history are not part of a checkpoint
    /// and start over.
    pub fn resumed(frame_count: usize, reward_window: usize) -> Self {
        Self {
            frame_count,
            episode_count: 0,
            running_reward: 0.0,
            episode_reward_history: VecDeque::with_capacity(reward_window),
            reward_window,
        }
    }

    /// Increments the frame counter and returns the new value.
    pub fn next_frame(&mut self) -> usize {
        self.frame_count += 1;
        self.frame_count
    }

    /// Records the reward of a finished episode.
    pub fn record_episode(&mut self, episode_reward: f32) {
        if self.episode_reward_history.len() == self.reward_window {
            self.episode_reward_history.pop_front();
        }
        self.episode_reward_history.push_back(episode_reward);
        self.running_reward = self.episode_reward_history.iter().sum::<f32>()
            / self.episode_reward_history.len() as f32;
        self.episode_count += 1;
    }

    /// Returns rewards of the recent episodes, the oldest first.
    pub fn episode_reward_history(&self) -> &VecDeque<f32> {
        &self.episode_reward_history
    }

    /// Returns `true` if the running reward exceeds `threshold`.
    pub fn is_solved(&self, threshold: f32) -> bool {
        !self.episode_reward_history.is_empty() && self.running_reward > threshold
    }
}
