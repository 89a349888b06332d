//! A deterministic environment and agent used in tests.
//!
//! [`DummyEnv`] counts steps: the observation is the number of steps taken
//! in the current episode, the reward is the index of the action, and the
//! episode ends after `episode_len` steps.
use crate::{
    record::{Record, RecordValue},
    rollout::Rollout,
    Act, Agent, Env, Obs, Policy, Step,
};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Observation of [`DummyEnv`].
#[derive(Clone, Debug, PartialEq)]
pub struct DummyObs(pub f32);

impl Obs for DummyObs {
    fn len(&self) -> usize {
        1
    }
}

/// Action of [`DummyEnv`].
#[derive(Clone, Debug, PartialEq)]
pub struct DummyAct(pub usize);

impl Act for DummyAct {}

/// Configuration of [`DummyEnv`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct DummyEnvConfig {
    /// The number of steps in an episode.
    pub episode_len: usize,

    /// If `true`, episodes are truncated instead of terminated.
    pub truncate: bool,
}

impl Default for DummyEnvConfig {
    fn default() -> Self {
        Self {
            episode_len: 5,
            truncate: false,
        }
    }
}

impl DummyEnvConfig {
    /// Sets the episode length.
    pub fn episode_len(mut self, v: usize) -> Self {
        self.episode_len = v;
        self
    }

    /// Sets if episodes are truncated.
    pub fn truncate(mut self, v: bool) -> Self {
        self.truncate = v;
        self
    }
}

/// An environment counting steps.
pub struct DummyEnv {
    config: DummyEnvConfig,
    seed: i64,
    t: usize,
}

impl DummyEnv {
    /// The seed the environment was built with.
    pub fn seed(&self) -> i64 {
        self.seed
    }
}

impl Env for DummyEnv {
    type Config = DummyEnvConfig;
    type Obs = DummyObs;
    type Act = DummyAct;
    type Info = ();

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            seed,
            t: 0,
        })
    }

    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)> {
        self.t += 1;
        let done = self.t >= self.config.episode_len;
        let step = Step::new(
            DummyObs(self.t as f32),
            a.clone(),
            a.0 as f32,
            done && !self.config.truncate,
            done && self.config.truncate,
            (),
        );
        Ok((step, Record::empty()))
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        self.t = 0;
        Ok(DummyObs(0.0))
    }

    fn reset_with_index(&mut self, _ix: usize) -> Result<Self::Obs> {
        self.reset()
    }
}

#[derive(Serialize, Deserialize)]
struct DummyParams {
    n_opts: usize,
}

/// An agent always taking action `1` and counting optimization steps.
///
/// The optimization record reports the rollout size as the losses.
#[derive(Default)]
pub struct DummyAgent {
    /// The number of optimization steps.
    pub n_opts: usize,

    /// The number of environment steps seen in optimization.
    pub n_samples: usize,

    /// The number of actions sampled in evaluation mode.
    pub n_eval_samples: usize,

    train: bool,
}

impl Policy<DummyEnv> for DummyAgent {
    fn sample(&mut self, _obs: &DummyObs) -> Result<DummyAct> {
        if !self.train {
            self.n_eval_samples += 1;
        }
        Ok(DummyAct(1))
    }
}

impl Agent<DummyEnv> for DummyAgent {
    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }

    fn opt_with_record(&mut self, rollout: &Rollout<DummyEnv>) -> Result<Record> {
        self.n_opts += 1;
        self.n_samples += rollout.len();
        let v = RecordValue::Scalar(rollout.len() as f32);
        Ok(Record::from_slice(&[
            ("learners/total_loss", v.clone()),
            ("learners/vf_loss", v.clone()),
            ("learners/policy_loss", v),
        ]))
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)?;
        let params = DummyParams {
            n_opts: self.n_opts,
        };
        fs::write(path.join("params.yaml"), serde_yaml::to_string(&params)?)?;
        Ok(())
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        let params: DummyParams =
            serde_yaml::from_str(&fs::read_to_string(path.join("params.yaml"))?)?;
        self.n_opts = params.n_opts;
        Ok(())
    }
}
