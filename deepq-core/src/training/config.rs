//! Configuration of [`TrainingLoop`](super::TrainingLoop).
use crate::{error::DeepqError, replay_buffer::ReplayBufferConfig, ExplorationConfig};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`TrainingLoop`](super::TrainingLoop).
///
/// Intervals are counted in environment steps. An interval of zero disables
/// the corresponding action.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TrainingConfig {
    /// Seed of the random number generator.
    pub seed: u64,

    /// Discount factor.
    pub gamma: f32,

    /// Number of transitions in a batch.
    pub batch_size: usize,

    /// The maximum number of environment steps in an episode.
    pub max_steps_per_episode: usize,

    /// Interval of optimization steps.
    pub update_after_actions: usize,

    /// Interval of target network synchronization and checkpointing.
    pub update_target_network: usize,

    /// Training stops once the running reward exceeds this value.
    pub solved_threshold: f32,

    /// Number of recent episodes averaged in the running reward.
    pub reward_window: usize,

    /// Configuration of the replay buffer.
    pub replay_buffer: ReplayBufferConfig,

    /// Configuration of exploration.
    pub explorer: ExplorationConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            gamma: 0.99,
            batch_size: 32,
            max_steps_per_episode: 10000,
            update_after_actions: 4,
            update_target_network: 10000,
            solved_threshold: 1000.0,
            reward_window: 100,
            replay_buffer: ReplayBufferConfig::default(),
            explorer: ExplorationConfig::default(),
        }
    }
}

impl TrainingConfig {
    /// Sets the seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Sets the discount factor.
    pub fn gamma(mut self, v: f32) -> Self {
        self.gamma = v;
        self
    }

    /// Sets the batch size.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Sets the maximum number of steps in an episode.
    pub fn max_steps_per_episode(mut self, v: usize) -> Self {
        self.max_steps_per_episode = v;
        self
    }

    /// Sets the interval of optimization steps.
    pub fn update_after_actions(mut self, v: usize) -> Self {
        self.update_after_actions = v;
        self
    }

    /// Sets the interval of target network synchronization.
    pub fn update_target_network(mut self, v: usize) -> Self {
        self.update_target_network = v;
        self
    }

    /// Sets the threshold of the running reward.
    pub fn solved_threshold(mut self, v: f32) -> Self {
        self.solved_threshold = v;
        self
    }

    /// Sets the number of episodes averaged in the running reward.
    pub fn reward_window(mut self, v: usize) -> Self {
        self.reward_window = v;
        self
    }

    /// Sets the configuration of the replay buffer.
    pub fn replay_buffer(mut self, v: ReplayBufferConfig) -> Self {
        self.replay_buffer = v;
        self
    }

    /// Sets the configuration of exploration.
    pub fn explorer(mut self, v: ExplorationConfig) -> Self {
        self.explorer = v;
        self
    }

    /// Checks values that the training loop cannot work with.
    pub fn validate(&self) -> Result<()> {
        let check = |ok: bool, msg: &str| -> Result<()> {
            if ok {
                Ok(())
            } else {
                Err(DeepqError::InvalidConfig(msg.to_string()).into())
            }
        };
        check(self.batch_size > 0, "batch_size must be positive")?;
        check(
            self.max_steps_per_episode > 0,
            "max_steps_per_episode must be positive",
        )?;
        check(self.reward_window > 0, "reward_window must be positive")?;
        check(
            (0.0..=1.0).contains(&self.gamma),
            "gamma must be within [0, 1]",
        )?;
        Ok(())
    }

    /// Constructs [`TrainingConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TrainingConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
