//! Optimizer of the actor-critic.
use anyhow::Result;
use candle_core::{Tensor, Var};
use candle_nn::{AdamW, Optimizer as _, ParamsAdamW};
use candle_optimisers::adam::{Adam, ParamsAdam};
use serde::{Deserialize, Serialize};

/// Choice of the gradient step. The learning rate is given when building.
///
/// In YAML, `optimizer: adam` or `optimizer: {adam_w: {weight_decay: 0.01}}`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerConfig {
    /// Adam with the default moments.
    #[default]
    Adam,

    /// Adam with decoupled weight decay.
    AdamW { weight_decay: f64 },
}

impl OptimizerConfig {
    /// Builds the optimizer of `vars` stepping with learning rate `lr`.
    pub fn build(&self, vars: Vec<Var>, lr: f64) -> Result<Optimizer> {
        Ok(match *self {
            Self::Adam => {
                let params = ParamsAdam {
                    lr,
                    ..ParamsAdam::default()
                };
                Optimizer::Adam(Adam::new(vars, params)?)
            }
            Self::AdamW { weight_decay } => {
                let params = ParamsAdamW {
                    lr,
                    weight_decay,
                    ..ParamsAdamW::default()
                };
                Optimizer::AdamW(AdamW::new(vars, params)?)
            }
        })
    }
}

/// A built optimizer.
pub enum Optimizer {
    Adam(Adam),
    AdamW(AdamW),
}

impl Optimizer {
    /// Backpropagates `loss` and updates the variables.
    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        match self {
            Self::Adam(opt) => opt.backward_step(loss)?,
            Self::AdamW(opt) => opt.backward_step(loss)?,
        }
        Ok(())
    }

    /// Current learning rate.
    pub fn learning_rate(&self) -> f64 {
        match self {
            Self::Adam(opt) => opt.learning_rate(),
            Self::AdamW(opt) => opt.learning_rate(),
        }
    }
}
