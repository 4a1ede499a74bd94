//! Environment step.

/// Outcome of an environment step, `(o_t+1, r_t, is_done_t)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Step<F> {
    /// Observation after the action was applied.
    pub obs: F,

    /// Reward.
    pub reward: f32,

    /// Flag denoting if the episode is terminated.
    pub is_done: bool,
}

impl<F> Step<F> {
    /// Constructs a [`Step`] object.
    pub fn new(obs: F, reward: f32, is_done: bool) -> Self {
        Self {
            obs,
            reward,
            is_done,
        }
    }
}
