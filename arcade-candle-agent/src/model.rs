//! Actor-critic model with a convolutional encoder.
use crate::{
    cnn::{Cnn, CnnConfig, ConvFilter, Padding},
    mlp::{Mlp, MlpConfig},
    opt::{Optimizer, OptimizerConfig},
    Activation,
};
use anyhow::Result;
use candle_core::{DType, Device, Tensor};
use candle_nn::{Module, VarBuilder, VarMap};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_conv_filters() -> Vec<ConvFilter> {
    vec![
        ConvFilter(16, [8, 8], 4),
        ConvFilter(32, [4, 4], 2),
        ConvFilter(64, [3, 3], 1),
    ]
}

/// Configuration of [`ActorCritic`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(default)]
pub struct ActorCriticConfig {
    /// Convolution layers of the encoder.
    pub conv_filters: Vec<ConvFilter>,

    /// Activation after each convolution.
    pub conv_activation: Activation,

    /// Padding of the convolutions.
    pub conv_padding: Padding,

    /// Hidden layers of the policy and value heads.
    pub head_fcnet_hiddens: Vec<usize>,

    /// If `true`, the value head reads the policy encoder output.
    /// Otherwise the value function has its own encoder.
    pub vf_share_layers: bool,
}

impl Default for ActorCriticConfig {
    fn default() -> Self {
        Self {
            conv_filters: default_conv_filters(),
            conv_activation: Activation::Relu,
            conv_padding: Padding::Same,
            head_fcnet_hiddens: vec![256],
            vf_share_layers: false,
        }
    }
}

impl ActorCriticConfig {
    /// Sets the convolution layers.
    pub fn conv_filters(mut self, v: Vec<ConvFilter>) -> Self {
        self.conv_filters = v;
        self
    }

    /// Sets the hidden layers of the heads.
    pub fn head_fcnet_hiddens(mut self, v: Vec<usize>) -> Self {
        self.head_fcnet_hiddens = v;
        self
    }

    /// Sets if the value function shares the encoder.
    pub fn vf_share_layers(mut self, v: bool) -> Self {
        self.vf_share_layers = v;
        self
    }

    fn cnn_config(&self, in_shape: [usize; 3]) -> CnnConfig {
        CnnConfig::new(in_shape, self.conv_filters.clone())
            .activation(self.conv_activation)
            .padding(self.conv_padding)
    }
}

/// Policy logits and state values of a categorical actor-critic.
///
/// The model owns its [`VarMap`] and optimizer.
pub struct ActorCritic {
    device: Device,
    varmap: VarMap,
    in_shape: [usize; 3],
    n_actions: usize,
    pi_encoder: Cnn,
    vf_encoder: Option<Cnn>,
    pi_head: Mlp,
    vf_head: Mlp,
    opt: Optimizer,
}

impl ActorCritic {
    /// Constructs [`ActorCritic`] for observations of shape `[height, width, channels]`.
    pub fn build(
        config: &ActorCriticConfig,
        in_shape: [usize; 3],
        n_actions: usize,
        opt_config: &OptimizerConfig,
        lr: f64,
        device: Device,
    ) -> Result<Self> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let cnn_config = config.cnn_config(in_shape);

        let pi_encoder = Cnn::build(vb.pp("pi_encoder"), &cnn_config)?;
        let vf_encoder = match config.vf_share_layers {
            true => None,
            false => Some(Cnn::build(vb.pp("vf_encoder"), &cnn_config)?),
        };
        let enc_dim = pi_encoder.out_dim();
        let pi_head = Mlp::build(
            vb.pp("pi"),
            &MlpConfig::new(enc_dim, config.head_fcnet_hiddens.clone(), n_actions),
        )?;
        let vf_head = Mlp::build(
            vb.pp("vf"),
            &MlpConfig::new(enc_dim, config.head_fcnet_hiddens.clone(), 1),
        )?;
        let opt = opt_config.build(varmap.all_vars(), lr)?;

        Ok(Self {
            device,
            varmap,
            in_shape,
            n_actions,
            pi_encoder,
            vf_encoder,
            pi_head,
            vf_head,
            opt,
        })
    }

    /// Returns logits `[batch, n_actions]` and values `[batch]` of observations
    /// `[batch, height, width, channels]`.
    pub fn forward(&self, obs: &Tensor) -> Result<(Tensor, Tensor)> {
        let obs = obs.to_device(&self.device)?;
        let pi_features = self.pi_encoder.forward(&obs)?;
        let logits = self.pi_head.forward(&pi_features)?;
        let vf_features = match &self.vf_encoder {
            Some(encoder) => encoder.forward(&obs)?,
            None => pi_features,
        };
        let values = self.vf_head.forward(&vf_features)?.squeeze(1)?;
        Ok((logits, values))
    }

    /// Returns logits `[batch, n_actions]`.
    pub fn logits(&self, obs: &Tensor) -> Result<Tensor> {
        let obs = obs.to_device(&self.device)?;
        let features = self.pi_encoder.forward(&obs)?;
        Ok(self.pi_head.forward(&features)?)
    }

    /// Returns values `[batch]`.
    pub fn values(&self, obs: &Tensor) -> Result<Tensor> {
        let obs = obs.to_device(&self.device)?;
        let features = match &self.vf_encoder {
            Some(encoder) => encoder.forward(&obs)?,
            None => self.pi_encoder.forward(&obs)?,
        };
        Ok(self.vf_head.forward(&features)?.squeeze(1)?)
    }

    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        self.opt.backward_step(loss)
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Input shape `[height, width, channels]`.
    pub fn in_shape(&self) -> [usize; 3] {
        self.in_shape
    }

    pub fn n_actions(&self) -> usize {
        self.n_actions
    }

    pub fn get_varmap(&self) -> &VarMap {
        &self.varmap
    }

    /// Saves all variables in a safetensors file.
    pub fn save<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        self.varmap.save(&path)?;
        info!("Save actor-critic to {:?}", path.as_ref());
        Ok(())
    }

    /// Loads variables from a safetensors file.
    pub fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()> {
        self.varmap.load(&path)?;
        info!("Load actor-critic from {:?}", path.as_ref());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> ActorCriticConfig {
        ActorCriticConfig::default()
            .conv_filters(vec![ConvFilter(4, [3, 3], 2), ConvFilter(8, [2, 2], 1)])
            .head_fcnet_hiddens(vec![16])
    }

    #[test]
    fn separate_value_encoder_by_default() -> Result<()> {
        let model = ActorCritic::build(
            &small_config(),
            [8, 8, 3],
            4,
            &OptimizerConfig::default(),
            1e-3,
            Device::Cpu,
        )?;
        let obs = Tensor::zeros((5, 8, 8, 3), DType::F32, &Device::Cpu)?;
        let (logits, values) = model.forward(&obs)?;
        assert_eq!(logits.dims(), &[5, 4]);
        assert_eq!(values.dims(), &[5]);
        assert_eq!(model.values(&obs)?.dims(), &[5]);

        let vars = model.get_varmap().data().lock().unwrap();
        assert!(vars.keys().any(|k| k.starts_with("vf_encoder")));
        Ok(())
    }

    #[test]
    fn shared_encoder_has_no_value_encoder() -> Result<()> {
        let model = ActorCritic::build(
            &small_config().vf_share_layers(true),
            [8, 8, 3],
            4,
            &OptimizerConfig::default(),
            1e-3,
            Device::Cpu,
        )?;
        let vars = model.get_varmap().data().lock().unwrap();
        assert!(!vars.keys().any(|k| k.starts_with("vf_encoder")));
        Ok(())
    }
}
