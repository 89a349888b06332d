//! RL agents implemented with [candle](https://crates.io/crates/candle-core).
//!
//! [`ppo::Ppo`] is an on-policy agent for environments with image observations
//! ([`PixelObs`]) and discrete actions ([`DiscreteAct`]). Its model is a
//! convolutional encoder followed by policy and value heads ([`model::ActorCritic`]).
pub mod cnn;
pub mod error;
pub mod mlp;
pub mod model;
pub mod opt;
pub mod ppo;
mod space;
use serde::{Deserialize, Serialize};
pub use space::{DiscreteAct, PixelObs};

/// Activation function applied after hidden layers.
#[derive(Clone, Debug, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    /// Rectified linear unit.
    #[default]
    Relu,

    /// Hyperbolic tangent.
    Tanh,

    /// Identity.
    Linear,
}

impl Activation {
    /// Applies the activation function.
    pub fn forward(&self, xs: &candle_core::Tensor) -> candle_core::Result<candle_core::Tensor> {
        match self {
            Self::Relu => xs.relu(),
            Self::Tanh => xs.tanh(),
            Self::Linear => Ok(xs.clone()),
        }
    }
}

#[derive(Clone, Debug, Copy, Deserialize, Serialize, PartialEq, Default)]
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

impl TryFrom<Device> for candle_core::Device {
    type Error = candle_core::Error;

    fn try_from(device: Device) -> Result<Self, Self::Error> {
        match device {
            Device::Cpu => Ok(candle_core::Device::Cpu),
            Device::Cuda(n) => candle_core::Device::new_cuda(n),
        }
    }
}
