//! Convolutional action-value network.
mod base;
mod config;
pub use base::Cnn;
pub use config::CnnConfig;
