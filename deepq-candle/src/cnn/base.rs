use super::{config::CONV_LAYERS, CnnConfig};
use crate::model::SubModel1;
use anyhow::Result;
use candle_core::{Device, Tensor};
use candle_nn::{
    conv::Conv2dConfig,
    conv2d, linear,
    sequential::{seq, Sequential},
    Module, VarBuilder,
};

/// Convolutional action-value network.
///
/// Three convolutional layers are followed by three linear layers, all but the
/// last with ReLU activation. The input is a batch of `f32` images of shape
/// `(batch, in_channels, height, width)` and the output has shape
/// `(batch, out_dim)`.
pub struct Cnn {
    device: Device,
    seq: Sequential,
}

impl Cnn {
    fn stride(s: usize) -> Conv2dConfig {
        Conv2dConfig {
            stride: s,
            ..Default::default()
        }
    }

    fn create_net(vb: &VarBuilder, config: &CnnConfig) -> Result<Sequential> {
        let [(c1, k1, s1), (c2, k2, s2), (c3, k3, s3)] = CONV_LAYERS;
        let flat_dim = config.flat_dim()?;

        let seq = seq()
            .add(conv2d(config.in_channels, c1, k1, Self::stride(s1), vb.pp("c1"))?)
            .add_fn(|xs| xs.relu())
            .add(conv2d(c1, c2, k2, Self::stride(s2), vb.pp("c2"))?)
            .add_fn(|xs| xs.relu())
            .add(conv2d(c2, c3, k3, Self::stride(s3), vb.pp("c3"))?)
            .add_fn(|xs| xs.relu()?.flatten_from(1))
            .add(linear(flat_dim, 512, vb.pp("l1"))?)
            .add_fn(|xs| xs.relu())
            .add(linear(512, 256, vb.pp("l2"))?)
            .add_fn(|xs| xs.relu())
            .add(linear(256, config.out_dim, vb.pp("l3"))?);

        Ok(seq)
    }
}

impl SubModel1 for Cnn {
    type Config = CnnConfig;
    type Input = Tensor;
    type Output = Tensor;

    fn forward(&self, x: &Self::Input) -> Result<Tensor> {
        Ok(self.seq.forward(&x.to_device(&self.device)?)?)
    }

    fn build(vb: VarBuilder, config: Self::Config) -> Result<Self> {
        let device = vb.device().clone();
        let seq = Self::create_net(&vb, &config)?;

        Ok(Self { device, seq })
    }
}
