//! Action-value function.
use anyhow::Result;
use std::path::Path;

/// A differentiable action-value function on observations of type `O`.
///
/// The training loop holds two instances: the online network, trained with
/// [`QFunction::train_batch`], and the target network, which is only read with
/// [`QFunction::predict`] and overwritten with [`QFunction::set_params`].
pub trait QFunction<O> {
    /// A snapshot of all trainable parameters.
    type Params;

    /// Returns action values for each observation in the batch.
    ///
    /// No gradient is tracked. The `i`-th row has one value per action.
    fn predict(&self, obs: &[O]) -> Result<Vec<Vec<f32>>>;

    /// Performs one optimization step.
    ///
    /// The predicted value of the taken action `act[i]` for `obs[i]` is regressed
    /// towards `tgt[i]`. Returns the loss before the update.
    fn train_batch(&mut self, obs: &[O], act: &[usize], tgt: &[f32]) -> Result<f32>;

    /// Returns a copy of the parameters.
    fn params(&self) -> Result<Self::Params>;

    /// Replaces all parameters with the given ones.
    fn set_params(&mut self, params: &Self::Params) -> Result<()>;

    /// Saves the parameters to a file.
    fn save(&self, path: &Path) -> Result<()>;

    /// Loads the parameters from a file.
    fn load(&mut self, path: &Path) -> Result<()>;
}
