use crate::util::OutDim;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Kernel size and stride of the convolutional layers.
pub(super) const CONV_LAYERS: [(usize, usize, usize); 3] = [(32, 7, 3), (64, 4, 2), (64, 3, 1)];

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`Cnn`](super::Cnn).
pub struct CnnConfig {
    /// Number of input channels, the number of stacked frames times color channels.
    pub in_channels: usize,

    /// Height of input images.
    pub height: usize,

    /// Width of input images.
    pub width: usize,

    /// Number of actions.
    pub out_dim: usize,
}

impl Default for CnnConfig {
    fn default() -> Self {
        Self {
            in_channels: 12,
            height: 64,
            width: 64,
            out_dim: 4,
        }
    }
}

impl CnnConfig {
    /// Sets the number of input channels.
    pub fn in_channels(mut self, v: usize) -> Self {
        self.in_channels = v;
        self
    }

    /// Sets the size of input images.
    pub fn image_size(mut self, height: usize, width: usize) -> Self {
        self.height = height;
        self.width = width;
        self
    }

    /// Sets the number of actions.
    pub fn out_dim(mut self, v: usize) -> Self {
        self.out_dim = v;
        self
    }

    /// Returns the number of features after the last convolutional layer.
    pub fn flat_dim(&self) -> Result<usize> {
        let (mut h, mut w, mut c) = (self.height, self.width, self.in_channels);
        for (out_channels, kernel, stride) in CONV_LAYERS {
            if h < kernel || w < kernel {
                bail!(
                    "input image {}x{} is too small for the convolutional layers",
                    self.height,
                    self.width
                );
            }
            h = (h - kernel) / stride + 1;
            w = (w - kernel) / stride + 1;
            c = out_channels;
        }
        Ok(h * w * c)
    }
}

impl OutDim for CnnConfig {
    fn set_out_dim(&mut self, v: usize) {
        self.out_dim = v;
    }
}
