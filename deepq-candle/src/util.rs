//! Utilities.
mod named_tensors;
pub use named_tensors::NamedTensors;

/// Model configurations whose output dimension can be overridden.
pub trait OutDim {
    /// Sets the output dimension.
    fn set_out_dim(&mut self, v: usize);
}
