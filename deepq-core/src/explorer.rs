//! Epsilon-greedy exploration with a random warm-up.
use crate::{error::DeepqError, QFunction};
use anyhow::Result;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::slice;

/// Configuration of [`ExplorationSchedule`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ExplorationConfig {
    /// Initial value of epsilon.
    pub epsilon_max: f64,

    /// Lower bound of epsilon.
    pub epsilon_min: f64,

    /// Number of frames during which the warm-up gate may force random actions.
    pub epsilon_random_frames: usize,

    /// Number of frames over which epsilon decays from `epsilon_max` to `epsilon_min`.
    pub epsilon_greedy_frames: usize,

    /// A warm-up draw above this value forces a random action.
    pub random_frame_threshold: f64,

    /// Number of discrete actions.
    pub num_actions: usize,
}

impl Default for ExplorationConfig {
    fn default() -> Self {
        Self {
            epsilon_max: 1.0,
            epsilon_min: 0.1,
            epsilon_random_frames: 50000,
            epsilon_greedy_frames: 1_000_000,
            random_frame_threshold: 0.33,
            num_actions: 4,
        }
    }
}

impl ExplorationConfig {
    /// Sets the initial value of epsilon.
    pub fn epsilon_max(mut self, v: f64) -> Self {
        self.epsilon_max = v;
        self
    }

    /// Sets the lower bound of epsilon.
    pub fn epsilon_min(mut self, v: f64) -> Self {
        self.epsilon_min = v;
        self
    }

    /// Sets the length of the random warm-up in frames.
    pub fn epsilon_random_frames(mut self, v: usize) -> Self {
        self.epsilon_random_frames = v;
        self
    }

    /// Sets the length of the linear decay in frames.
    pub fn epsilon_greedy_frames(mut self, v: usize) -> Self {
        self.epsilon_greedy_frames = v;
        self
    }

    /// Sets the threshold of the warm-up gate.
    pub fn random_frame_threshold(mut self, v: f64) -> Self {
        self.random_frame_threshold = v;
        self
    }

    /// Sets the number of actions.
    pub fn num_actions(mut self, v: usize) -> Self {
        self.num_actions = v;
        self
    }
}

/// Chooses actions with a decaying epsilon-greedy rule.
///
/// A random action is taken when either gate fires:
///
/// * warm-up: `frame_count < epsilon_random_frames` and a uniform draw exceeds
///   `random_frame_threshold`,
/// * epsilon: a second uniform draw falls below the current epsilon.
///
/// The second draw is skipped when the warm-up gate fires. Otherwise the greedy
/// action of the online network is taken. Epsilon decays by a constant step
/// after every selection and never goes below `epsilon_min`.
#[derive(Debug, Clone)]
pub struct ExplorationSchedule {
    config: ExplorationConfig,
    epsilon: f64,
    step_size: f64,
}

impl ExplorationSchedule {
    /// Builds the schedule with `epsilon = epsilon_max`.
    pub fn build(config: ExplorationConfig) -> Result<Self> {
        if config.num_actions == 0 {
            return Err(DeepqError::InvalidConfig("num_actions must be positive".into()).into());
        }
        if config.epsilon_greedy_frames == 0 {
            return Err(DeepqError::InvalidConfig(
                "epsilon_greedy_frames must be positive".into(),
            )
            .into());
        }
        if !(0.0..=1.0).contains(&config.epsilon_min)
            || !(0.0..=1.0).contains(&config.epsilon_max)
            || config.epsilon_min > config.epsilon_max
        {
            return Err(DeepqError::InvalidConfig(format!(
                "epsilon range [{}, {}] is not within [0, 1]",
                config.epsilon_min, config.epsilon_max
            ))
            .into());
        }

        let step_size =
            (config.epsilon_max - config.epsilon_min) / config.epsilon_greedy_frames as f64;

        Ok(Self {
            epsilon: config.epsilon_max,
            step_size,
            config,
        })
    }

    /// Returns the current epsilon.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Returns the decrement of epsilon per selection.
    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ExplorationConfig {
        &self.config
    }

    /// Sets epsilon to the value it has after `frame_count` selections.
    pub fn resume_at(&mut self, frame_count: usize) {
        self.epsilon = (self.config.epsilon_max - frame_count as f64 * self.step_size)
            .max(self.config.epsilon_min);
    }

    /// Selects an action for `obs` and decays epsilon.
    ///
    /// `q` is queried only when neither random gate fires.
    pub fn select_action<O, Q, R>(
        &mut self,
        obs: &O,
        frame_count: usize,
        q: &Q,
        rng: &mut R,
    ) -> Result<usize>
    where
        Q: QFunction<O>,
        R: Rng + ?Sized,
    {
        let is_random = (frame_count < self.config.epsilon_random_frames
            && rng.gen::<f64>() > self.config.random_frame_threshold)
            || self.epsilon > rng.gen::<f64>();

        let act = if is_random {
            rng.gen_range(0..self.config.num_actions)
        } else {
            let q_values = q.predict(slice::from_ref(obs))?;
            let row = q_values.first().ok_or(DeepqError::EmptyActionValues)?;
            argmax(row).ok_or(DeepqError::EmptyActionValues)?
        };

        self.decay();

        Ok(act)
    }

    /// Decreases epsilon by one step, floored at `epsilon_min`.
    pub fn decay(&mut self) {
        self.epsilon = (self.epsilon - self.step_size).max(self.config.epsilon_min);
    }
}

/// Returns the index of the largest value, the first one on ties.
///
/// Returns `None` for an empty slice.
pub fn argmax(xs: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &x) in xs.iter().enumerate() {
        match best {
            Some((_, v)) if x <= v => {}
            _ => best = Some((i, x)),
        }
    }
    best.map(|(i, _)| i)
}
