use crate::{opt::OptimizerConfig, util::OutDim, Device};
use anyhow::Result;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`QNetwork`](super::QNetwork).
pub struct QNetworkConfig<Q>
where
    Q: OutDim,
{
    /// Configuration of the action-value function.
    pub q_config: Q,

    /// Configuration of the optimizer.
    pub opt_config: OptimizerConfig,

    /// The maximum global norm of gradients, no clipping if `None`.
    pub clip_grad_norm: Option<f64>,

    /// Device on which the network is placed.
    pub device: Device,
}

impl<Q> Default for QNetworkConfig<Q>
where
    Q: OutDim + Default,
{
    fn default() -> Self {
        Self {
            q_config: Q::default(),
            opt_config: OptimizerConfig::default(),
            clip_grad_norm: Some(1.0),
            device: Device::Cpu,
        }
    }
}

impl<Q> QNetworkConfig<Q>
where
    Q: DeserializeOwned + Serialize + OutDim,
{
    /// Sets configurations for action-value function.
    pub fn q_config(mut self, v: Q) -> Self {
        self.q_config = v;
        self
    }

    /// Sets output dimension of the model.
    pub fn out_dim(mut self, v: usize) -> Self {
        self.q_config.set_out_dim(v);
        self
    }

    /// Sets optimizer configuration.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }

    /// Sets the maximum global norm of gradients.
    pub fn clip_grad_norm(mut self, v: Option<f64>) -> Self {
        self.clip_grad_norm = v;
        self
    }

    /// Sets the device.
    pub fn device(mut self, v: Device) -> Self {
        self.device = v;
        self
    }

    /// Constructs [`QNetworkConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`QNetworkConfig`] to as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
