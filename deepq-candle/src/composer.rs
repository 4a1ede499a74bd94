//! Composition of stacked RGB frames into network input.
use anyhow::{ensure, Result};
use candle_core::{DType, Device, Tensor};
use deepq_core::ObsComposer;
use ndarray::Array3;

/// Turns `H x W x C` `u8` frames into one `f32` tensor of shape `(n * C, H, W)`.
///
/// Frames are concatenated along the channel axis, the oldest first, and pixel
/// values are scaled to `[0, 1]`.
#[derive(Debug, Clone)]
pub struct FrameComposer {
    device: Device,
}

impl Default for FrameComposer {
    fn default() -> Self {
        Self::new(Device::Cpu)
    }
}

impl FrameComposer {
    /// Constructs a composer placing observations on `device`.
    pub fn new(device: Device) -> Self {
        Self { device }
    }

    fn to_tensor(&self, frame: &Array3<u8>) -> Result<Tensor> {
        let (h, w, c) = frame.dim();
        let data = frame.iter().copied().collect::<Vec<_>>();
        Ok(Tensor::from_vec(data, (h, w, c), &self.device)?.permute((2, 0, 1))?)
    }
}

impl ObsComposer<Array3<u8>> for FrameComposer {
    type Obs = Tensor;

    fn compose(&self, frames: &[&Array3<u8>]) -> Result<Tensor> {
        ensure!(!frames.is_empty(), "no frame to compose");
        let dim = frames[0].dim();
        ensure!(
            frames.iter().all(|f| f.dim() == dim),
            "frames of different shapes"
        );

        let ts = frames
            .iter()
            .map(|f| self.to_tensor(f))
            .collect::<Result<Vec<_>>>()?;
        let obs = Tensor::cat(&ts, 0)?
            .to_dtype(DType::F32)?
            .affine(1.0 / 255.0, 0.0)?;

        Ok(obs)
    }
}
