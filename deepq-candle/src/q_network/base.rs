use super::QNetworkConfig;
use crate::{model::SubModel1, trainer::Trainer, util::{NamedTensors, OutDim}};
use anyhow::{ensure, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};
use deepq_core::QFunction;
use log::info;
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;

/// Action-value network.
///
/// Owns the variables of the model `Q` and the optimizer updating them.
/// Observations are `f32` tensors without the batch dimension; a batch is
/// stacked along a new first axis.
pub struct QNetwork<Q>
where
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim,
{
    device: Device,
    varmap: VarMap,
    q: Q,
    trainer: Trainer,
}

impl<Q> QNetwork<Q>
where
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Clone,
{
    /// Constructs [`QNetwork`] with randomly initialized parameters.
    pub fn build(config: QNetworkConfig<Q::Config>) -> Result<Self> {
        let device = config.device.build()?;
        let varmap = VarMap::new();
        let q = {
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
            Q::build(vb, config.q_config.clone())?
        };
        let opt = config.opt_config.build(varmap.all_vars())?;
        let trainer = Trainer::new(opt, config.clip_grad_norm);

        Ok(Self {
            device,
            varmap,
            q,
            trainer,
        })
    }

    /// Stacks observations into a batch on the device of the network.
    fn batch(&self, obs: &[Tensor]) -> Result<Tensor> {
        ensure!(!obs.is_empty(), "empty batch of observations");
        Ok(Tensor::stack(obs, 0)?.to_device(&self.device)?)
    }

    /// Outputs action values with gradient tracking, shape `(batch, out_dim)`.
    pub fn forward(&self, obs: &[Tensor]) -> Result<Tensor> {
        self.q.forward(&self.batch(obs)?)
    }
}

impl<Q> QFunction<Tensor> for QNetwork<Q>
where
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Clone,
{
    type Params = NamedTensors;

    fn predict(&self, obs: &[Tensor]) -> Result<Vec<Vec<f32>>> {
        Ok(self.forward(obs)?.detach().to_vec2::<f32>()?)
    }

    fn train_batch(&mut self, obs: &[Tensor], act: &[usize], tgt: &[f32]) -> Result<f32> {
        ensure!(
            obs.len() == act.len() && obs.len() == tgt.len(),
            "batch size mismatch: {} observations, {} actions, {} targets",
            obs.len(),
            act.len(),
            tgt.len()
        );
        let n = act.len();
        let act = act.iter().map(|&a| a as u32).collect::<Vec<_>>();
        let act = Tensor::from_vec(act, (n,), &self.device)?;
        let tgt = Tensor::from_slice(tgt, (n,), &self.device)?;
        let q = self.forward(obs)?;

        self.trainer.step(&q, &act, &tgt, &self.varmap.all_vars())
    }

    fn params(&self) -> Result<NamedTensors> {
        NamedTensors::copy_from(&self.varmap)
    }

    fn set_params(&mut self, params: &NamedTensors) -> Result<()> {
        params.copy_to(&self.varmap)
    }

    fn save(&self, path: &Path) -> Result<()> {
        self.varmap.save(path)?;
        info!("Save q-network to {:?}", path);
        Ok(())
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        self.varmap.load(path)?;
        info!("Load q-network from {:?}", path);
        Ok(())
    }
}
