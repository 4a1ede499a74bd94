//! Target network synchronization and checkpointing.
use crate::{
    checkpoint::Checkpoints,
    record::{Record, RecordValue},
    QFunction, TrainingState,
};
use anyhow::Result;
use chrono::Local;
use log::info;

/// Copies the online network into the target network at a fixed interval.
///
/// Each synchronization also saves a checkpoint of the online network named by
/// the current frame count and produces a progress record.
pub struct Synchronizer {
    interval: usize,
    checkpoints: Checkpoints,
    episodes_at_last_sync: usize,
    loss_sum: f32,
    n_losses: usize,
}

impl Synchronizer {
    /// Constructs a synchronizer running every `interval` frames.
    ///
    /// With `interval == 0` synchronization never happens.
    pub fn new(interval: usize, checkpoints: Checkpoints) -> Self {
        Self {
            interval,
            checkpoints,
            episodes_at_last_sync: 0,
            loss_sum: 0.0,
            n_losses: 0,
        }
    }

    /// Returns the checkpoint layout.
    pub fn checkpoints(&self) -> &Checkpoints {
        &self.checkpoints
    }

    /// Returns `true` if synchronization is due at `frame_count`.
    pub fn is_due(&self, frame_count: usize) -> bool {
        self.interval > 0 && frame_count % self.interval == 0
    }

    /// Accumulates the loss of an optimization step, reported at the next sync.
    pub fn record_loss(&mut self, loss: f32) {
        self.loss_sum += loss;
        self.n_losses += 1;
    }

    /// Returns the mean loss since the last synchronization, if any.
    pub fn mean_loss(&self) -> Option<f32> {
        (self.n_losses > 0).then(|| self.loss_sum / self.n_losses as f32)
    }

    /// Copies `online` into `target`, saves a checkpoint and returns the progress record.
    pub fn sync<O, Q: QFunction<O>>(
        &mut self,
        state: &TrainingState,
        epsilon: f64,
        online: &Q,
        target: &mut Q,
    ) -> Result<Record> {
        target.set_params(&online.params()?)?;

        self.checkpoints.create_dir()?;
        let path = self.checkpoints.path(state.frame_count);
        online.save(&path)?;
        info!("Saved the model in {:?}", path);

        let episodes_since_sync = state.episode_count.saturating_sub(self.episodes_at_last_sync);
        info!(
            "running reward: {:.2} at episode {}, frame count {}, episodes since last sync: {}",
            state.running_reward, state.episode_count, state.frame_count, episodes_since_sync
        );

        let mut record = Record::from_slice(&[
            ("frame_count", RecordValue::Count(state.frame_count)),
            ("episode_count", RecordValue::Count(state.episode_count)),
            ("running_reward", RecordValue::Scalar(state.running_reward)),
            ("episodes_since_sync", RecordValue::Count(episodes_since_sync)),
            ("epsilon", RecordValue::Scalar(epsilon as f32)),
            ("datetime", RecordValue::DateTime(Local::now())),
        ]);
        if let Some(loss) = self.mean_loss() {
            record.insert("mean_loss", RecordValue::Scalar(loss));
        }

        self.episodes_at_last_sync = state.episode_count;
        self.loss_sum = 0.0;
        self.n_losses = 0;

        Ok(record)
    }
}
