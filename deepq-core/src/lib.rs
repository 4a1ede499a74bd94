#![warn(missing_docs)]
//! Training core of a Deep Q-Learning agent.
//!
//! This crate does not depend on any tensor library. The function approximator,
//! the environment and the routine composing raw frames into one observation are
//! given through the [`QFunction`], [`Env`] and [`ObsComposer`] traits, and
//! [`TrainingLoop`] drives them:
//!
//! 1. The environment is reset and the [`FrameStack`] is refilled.
//! 2. At every environment step, [`ExplorationSchedule`] picks an action, the
//!    resulting [`Transition`] is pushed into the [`ReplayBuffer`].
//! 3. Every `update_after_actions` frames, a batch is sampled,
//!    [`TargetComputer`] builds Bellman targets with the target network and
//!    the online network takes one optimization step.
//! 4. Every `update_target_network` frames, [`Synchronizer`] copies the online
//!    parameters into the target network and saves a checkpoint.
//! 5. Episodes repeat until the running reward exceeds the solved threshold.
//!
//! [`Transition`]: replay_buffer::Transition
//! [`ReplayBuffer`]: replay_buffer::ReplayBuffer
pub mod checkpoint;
pub mod error;
pub mod record;
pub mod replay_buffer;

mod base;
pub use base::{Env, QFunction, Step};

mod explorer;
pub use explorer::{argmax, ExplorationConfig, ExplorationSchedule};

mod frame_stack;
pub use frame_stack::{FrameStack, ObsComposer, N_FRAMES};

mod target;
pub use target::{bellman_targets, TargetComputer};

mod sync;
pub use sync::Synchronizer;

mod training;
pub use training::{EpisodePhase, TrainingConfig, TrainingLoop, TrainingState, TrainingSummary};
