//! Experience replay.
//!
//! [`ReplayBuffer`] stores transitions in five parallel sequences (observation,
//! action, next observation, reward, done flag) of equal length. When the
//! capacity is reached, a push overwrites the oldest transition in all five
//! sequences at once.
mod base;
mod batch;
mod config;
pub use base::ReplayBuffer;
pub use batch::{Transition, TransitionBatch};
pub use config::ReplayBufferConfig;
