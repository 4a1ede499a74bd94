//! Writes progress records of the Deep Q-Learning trainer to TFRecord.
use deepq_core::record::{Record, RecordValue, Recorder};
use log::warn;
use std::path::Path;
use tensorboard_rs::summary_writer::SummaryWriter;

/// Key of the count used as the step of every value.
const STEP_KEY: &str = "frame_count";

/// Write records to TFRecord.
///
/// Values are indexed by the `frame_count` of the record. Scalars and counts
/// are written, timestamps are ignored.
pub struct TensorboardRecorder {
    writer: SummaryWriter,
}

impl TensorboardRecorder {
    /// Construct a [`TensorboardRecorder`].
    ///
    /// TFRecord will be stored in `logdir`.
    pub fn new<P: AsRef<Path>>(logdir: P) -> Self {
        Self {
            writer: SummaryWriter::new(logdir),
        }
    }
}

impl Recorder for TensorboardRecorder {
    /// Write a given [`Record`] into a TFRecord.
    ///
    /// A record without a `frame_count` count is discarded.
    fn write(&mut self, record: Record) {
        let step = match record.get_count(STEP_KEY) {
            Ok(step) => step,
            Err(e) => {
                warn!("Record is discarded: {}", e);
                return;
            }
        };

        for (k, v) in record.iter() {
            if k != STEP_KEY {
                match v {
                    RecordValue::Scalar(v) => self.writer.add_scalar(k, *v, step),
                    RecordValue::Count(n) => self.writer.add_scalar(k, *n as f32, step),
                    RecordValue::DateTime(_) => {} // discard value
                }
            }
        }
        self.writer.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_write_creates_event_file() -> std::io::Result<()> {
        let dir = TempDir::new("tensorboard")?;
        {
            let mut recorder = TensorboardRecorder::new(dir.path());
            let mut record = Record::from_scalar("running_reward", 3.5);
            record.insert(STEP_KEY, RecordValue::Count(20_000_001));
            record.insert("episode_count", RecordValue::Count(12));
            recorder.write(record);

            // Discarded without panic
            recorder.write(Record::from_scalar("running_reward", 1.0));
            recorder.write(Record::from_scalar(STEP_KEY, 10000.0));
        }
        assert!(std::fs::read_dir(dir.path())?.count() > 0);
        Ok(())
    }
}
