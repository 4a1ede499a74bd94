//! Action-value network trained with [`Trainer`](crate::trainer::Trainer).
mod base;
mod config;
pub use base::QNetwork;
pub use config::QNetworkConfig;
