//! Types and traits for recording training progress.
//!
//! A [`Record`] is a set of named values emitted by the training loop, for
//! example at every synchronization of the target network. Records are passed
//! to a [`Recorder`], which writes them to an output destination.
//!
//! ```rust
//! use deepq_core::record::{Record, RecordValue};
//!
//! let mut record = Record::from_scalar("running_reward", 12.5);
//! record.insert("frame_count", RecordValue::Count(10000));
//! assert_eq!(record.get_count("frame_count").unwrap(), 10000);
//! ```
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
