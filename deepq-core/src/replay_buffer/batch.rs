//! Transitions and batches of transitions.

/// A transition `(o_t, a_t, r_t, o_t+1, is_done_t)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition<O> {
    /// Observation.
    pub obs: O,

    /// Index of the action taken.
    pub act: usize,

    /// Reward.
    pub reward: f32,

    /// Next observation.
    pub next_obs: O,

    /// Flag denoting if the episode is terminated.
    pub is_done: bool,
}

impl<O> Transition<O> {
    /// Constructs a transition.
    pub fn new(obs: O, act: usize, reward: f32, next_obs: O, is_done: bool) -> Self {
        Self {
            obs,
            act,
            reward,
            next_obs,
            is_done,
        }
    }
}

/// A batch of transitions sampled from [`ReplayBuffer`](super::ReplayBuffer).
#[derive(Clone, Debug)]
pub struct TransitionBatch<O> {
    /// Observations.
    pub obs: Vec<O>,

    /// Actions.
    pub act: Vec<usize>,

    /// Next observations.
    pub next_obs: Vec<O>,

    /// Rewards.
    pub reward: Vec<f32>,

    /// Done flags.
    pub is_done: Vec<bool>,

    /// Sample indices, counted from the oldest transition in the buffer.
    pub ix_sample: Vec<usize>,
}

impl<O> TransitionBatch<O> {
    /// Returns the number of transitions in the batch.
    pub fn len(&self) -> usize {
        self.reward.len()
    }

    /// Returns `true` if the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.reward.is_empty()
    }
}
