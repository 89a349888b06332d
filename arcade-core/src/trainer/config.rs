//! Configuration of [`Trainer`](super::Trainer).
use crate::error::ArcadeError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Trainer`](super::Trainer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(default)]
pub struct TrainerConfig {
    /// The number of training iterations.
    pub max_iters: usize,

    /// Environment steps collected in each iteration.
    pub train_batch_size: usize,

    /// The number of env runners sharing the sampling of an iteration.
    pub num_env_runners: usize,

    /// Interval of evaluation in iterations. `0` disables periodic evaluation;
    /// the evaluation after the final iteration is always done.
    pub eval_interval: usize,

    /// Interval of saving checkpoints in iterations. `0` disables periodic checkpoints;
    /// the checkpoint after the final iteration is always saved.
    pub save_interval: usize,

    /// Interval of flushing records in iterations.
    pub flush_record_interval: usize,

    /// The number of recent episodes over which env runner metrics are computed.
    pub episode_stats_window: usize,

    /// Seed of the env runners. Runner `i` is seeded with `seed + i`.
    pub seed: i64,

    /// Where checkpoints are saved.
    pub model_dir: Option<String>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            max_iters: 1,
            train_batch_size: 200,
            num_env_runners: 2,
            eval_interval: 1,
            save_interval: 0,
            flush_record_interval: 1,
            episode_stats_window: 100,
            seed: 0,
            model_dir: None,
        }
    }
}

impl TrainerConfig {
    /// Sets the number of iterations.
    pub fn max_iters(mut self, v: usize) -> Self {
        self.max_iters = v;
        self
    }

    /// Sets the number of environment steps per iteration.
    pub fn train_batch_size(mut self, v: usize) -> Self {
        self.train_batch_size = v;
        self
    }

    /// Sets the number of env runners.
    pub fn num_env_runners(mut self, v: usize) -> Self {
        self.num_env_runners = v;
        self
    }

    /// Sets the interval of evaluation in iterations.
    pub fn eval_interval(mut self, v: usize) -> Self {
        self.eval_interval = v;
        self
    }

    /// Sets the interval of saving in iterations.
    pub fn save_interval(mut self, v: usize) -> Self {
        self.save_interval = v;
        self
    }

    /// Sets the interval of flushing records in iterations.
    pub fn flush_record_interval(mut self, v: usize) -> Self {
        self.flush_record_interval = v;
        self
    }

    /// Sets the seed of env runners.
    pub fn seed(mut self, v: i64) -> Self {
        self.seed = v;
        self
    }

    /// Sets the directory where checkpoints are saved.
    pub fn model_dir(mut self, v: impl Into<String>) -> Self {
        self.model_dir = Some(v.into());
        self
    }

    /// Checks the values of the configuration.
    pub fn validate(&self) -> Result<(), ArcadeError> {
        if self.train_batch_size == 0 {
            return Err(ArcadeError::InvalidConfig(
                "train_batch_size must be positive".to_string(),
            ));
        }
        if self.num_env_runners == 0 {
            return Err(ArcadeError::InvalidConfig(
                "num_env_runners must be positive".to_string(),
            ));
        }
        if self.flush_record_interval == 0 {
            return Err(ArcadeError::InvalidConfig(
                "flush_record_interval must be positive".to_string(),
            ));
        }
        if self.model_dir.is_none() {
            return Err(ArcadeError::InvalidConfig(
                "model_dir is not set".to_string(),
            ));
        }
        Ok(())
    }

    /// Constructs [`TrainerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TrainerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_trainer_config() -> Result<()> {
        let config = TrainerConfig::default()
            .max_iters(100)
            .eval_interval(10)
            .model_dir("some/directory");

        let dir = TempDir::new("trainer_config")?;
        let path = dir.path().join("trainer.yaml");
        config.save(&path)?;
        let config_ = TrainerConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }

    #[test]
    fn validation_requires_model_dir_and_positive_sizes() {
        assert!(TrainerConfig::default().validate().is_err());
        assert!(TrainerConfig::default().model_dir("out").validate().is_ok());
        assert!(TrainerConfig::default()
            .model_dir("out")
            .num_env_runners(0)
            .validate()
            .is_err());
        assert!(TrainerConfig::default()
            .model_dir("out")
            .train_batch_size(0)
            .validate()
            .is_err());
    }
}
