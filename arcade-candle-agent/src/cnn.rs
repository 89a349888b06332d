//! Convolutional encoder.
mod base;
mod config;
pub use base::Cnn;
pub use config::{CnnConfig, ConvFilter, Padding};
