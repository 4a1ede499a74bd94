//! Bellman targets.
use crate::{error::DeepqError, replay_buffer::TransitionBatch, QFunction};
use anyhow::{ensure, Result};

/// Value of the target on a terminal transition, whatever the reward.
const TERMINAL_TARGET: f32 = -1.0;

/// Computes targets `r + gamma * max_a Q(o_t+1, a)`.
///
/// The target of a terminal transition is exactly -1. A NaN among the action
/// values of a non-terminal transition makes its target NaN.
pub fn bellman_targets(
    reward: &[f32],
    is_done: &[bool],
    next_q: &[Vec<f32>],
    gamma: f32,
) -> Result<Vec<f32>> {
    ensure!(
        reward.len() == is_done.len() && reward.len() == next_q.len(),
        "batch size mismatch: {} rewards, {} flags, {} action-value rows",
        reward.len(),
        is_done.len(),
        next_q.len()
    );

    reward
        .iter()
        .zip(is_done)
        .zip(next_q)
        .map(|((&r, &done), q)| -> Result<f32> {
            let future = q
                .iter()
                .copied()
                .reduce(|a, b| if a.is_nan() || b.is_nan() { f32::NAN } else { a.max(b) })
                .ok_or(DeepqError::EmptyActionValues)?;
            Ok(if done {
                TERMINAL_TARGET
            } else {
                r + gamma * future
            })
        })
        .collect()
}

/// Builds regression targets of the online network with the target network.
#[derive(Debug, Clone)]
pub struct TargetComputer {
    gamma: f32,
}

impl TargetComputer {
    /// Constructs with the discount factor.
    pub fn new(gamma: f32) -> Self {
        Self { gamma }
    }

    /// Returns the discount factor.
    pub fn gamma(&self) -> f32 {
        self.gamma
    }

    /// Computes the targets of a batch, evaluating `target` on the next observations.
    pub fn compute<O, Q: QFunction<O>>(&self, batch: &TransitionBatch<O>, target: &Q) -> Result<Vec<f32>> {
        let next_q = target.predict(&batch.next_obs)?;
        bellman_targets(&batch.reward, &batch.is_done, &next_q, self.gamma)
    }
}
