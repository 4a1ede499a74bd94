//! Action-value function of the Deep Q-Learning trainer implemented with
//! [candle](https://crates.io/crates/candle-core).
//!
//! [`QNetwork`] implements [`deepq_core::QFunction`] on batches of `f32` tensors.
//! Stacked frames are turned into these tensors by [`FrameComposer`].
//!
//! [`QNetwork`]: q_network::QNetwork
//! [`FrameComposer`]: composer::FrameComposer
pub mod cnn;
pub mod composer;
pub mod model;
pub mod opt;
pub mod q_network;
pub mod trainer;
pub mod util;
use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Copy, Default, Deserialize, Serialize, PartialEq)]
/// Device for using candle.
///
/// This enum is added because [`candle_core::Device`] does not support serialization.
pub enum Device {
    /// The main CPU device.
    #[default]
    Cpu,

    /// The main GPU device.
    Cuda(usize),
}

impl Device {
    /// Creates the candle device.
    ///
    /// Fails if the CUDA device is not available.
    pub fn build(self) -> Result<candle_core::Device> {
        Ok(match self {
            Self::Cpu => candle_core::Device::Cpu,
            Self::Cuda(n) => candle_core::Device::new_cuda(n)?,
        })
    }
}
