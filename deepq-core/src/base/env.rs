//! Environment.
use super::Step;
use anyhow::Result;

/// Represents a simulated world with a discrete action space.
///
/// Failures of the environment are not recovered by the training loop;
/// they are propagated to the caller and end the run.
pub trait Env {
    /// Raw observation emitted by the environment, one frame.
    type Frame: Clone;

    /// Resets the environment to the beginning of a new episode.
    fn init(&mut self) -> Result<()>;

    /// Returns the current raw observation.
    fn state(&self) -> Result<Self::Frame>;

    /// Applies the action of index `act` and returns the outcome.
    fn step(&mut self, act: usize) -> Result<Step<Self::Frame>>;
}
