//! Configuration of PPO agent.
use crate::{model::ActorCriticConfig, opt::OptimizerConfig, Device};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Ppo`](super::Ppo) agent.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(default)]
pub struct PpoConfig {
    /// Model architecture.
    pub model: ActorCriticConfig,

    /// Observation shape `[height, width, channels]`.
    pub obs_shape: [usize; 3],

    /// The number of actions.
    pub n_actions: usize,

    /// Optimizer.
    pub optimizer: OptimizerConfig,

    /// Learning rate of the optimizer.
    pub lr: f64,

    /// Environment steps consumed by each optimization step.
    pub train_batch_size_per_learner: usize,

    /// Passes over a rollout in an optimization step.
    pub num_epochs: usize,

    /// Size of minibatches in each pass.
    pub minibatch_size: usize,

    /// Discount factor.
    pub gamma: f32,

    /// Parameter of generalized advantage estimation.
    pub lambda: f32,

    /// Use generalized advantage estimation. If `false`, advantages are
    /// Monte Carlo returns with bootstrapping minus values.
    pub use_gae: bool,

    /// Clipping range of the probability ratio.
    pub clip_param: f32,

    /// Clipping threshold of the squared value error.
    pub vf_clip_param: f32,

    /// Coefficient of the value loss.
    pub vf_loss_coeff: f32,

    /// Coefficient of the entropy bonus.
    pub entropy_coeff: f32,

    /// Add the KL divergence from the sampling policy to the loss.
    pub use_kl_loss: bool,

    /// Initial coefficient of the KL loss.
    pub kl_coeff: f32,

    /// Target value of the KL divergence.
    pub kl_target: f32,

    /// Device on which the model runs.
    pub device: Device,

    /// Seed of action sampling and minibatch shuffling.
    pub seed: u64,
}

impl Default for PpoConfig {
    fn default() -> Self {
        Self {
            model: ActorCriticConfig::default(),
            obs_shape: [210, 160, 3],
            n_actions: 5,
            optimizer: OptimizerConfig::default(),
            lr: 2e-4,
            train_batch_size_per_learner: 200,
            num_epochs: 10,
            minibatch_size: 128,
            gamma: 0.99,
            lambda: 0.95,
            use_gae: true,
            clip_param: 0.3,
            vf_clip_param: 10.0,
            vf_loss_coeff: 1.0,
            entropy_coeff: 0.0,
            use_kl_loss: true,
            kl_coeff: 0.2,
            kl_target: 0.01,
            device: Device::Cpu,
            seed: 42,
        }
    }
}

impl PpoConfig {
    /// Sets the model architecture.
    pub fn model(mut self, v: ActorCriticConfig) -> Self {
        self.model = v;
        self
    }

    /// Sets the observation shape and the number of actions.
    pub fn space(mut self, obs_shape: [usize; 3], n_actions: usize) -> Self {
        self.obs_shape = obs_shape;
        self.n_actions = n_actions;
        self
    }

    /// Sets the learning rate.
    pub fn lr(mut self, v: f64) -> Self {
        self.lr = v;
        self
    }

    /// Sets the number of environment steps per optimization step.
    pub fn train_batch_size_per_learner(mut self, v: usize) -> Self {
        self.train_batch_size_per_learner = v;
        self
    }

    /// Sets the number of epochs.
    pub fn num_epochs(mut self, v: usize) -> Self {
        self.num_epochs = v;
        self
    }

    /// Sets the minibatch size.
    pub fn minibatch_size(mut self, v: usize) -> Self {
        self.minibatch_size = v;
        self
    }

    /// Sets the entropy coefficient.
    pub fn entropy_coeff(mut self, v: f32) -> Self {
        self.entropy_coeff = v;
        self
    }

    /// Sets the device.
    pub fn device(mut self, v: Device) -> Self {
        self.device = v;
        self
    }

    /// Sets the seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Constructs [`PpoConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`PpoConfig`] to as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
