//! Configuration of an experiment.
use anyhow::Result;
use arcade_atari_env::AtariEnvConfig;
use arcade_candle_agent::ppo::PpoConfig;
use arcade_core::TrainerConfig;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Environment, agent and trainer of a run.
///
/// Every section is optional in YAML; missing values take their defaults.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Environment used for sampling and evaluation.
    pub env: AtariEnvConfig,

    /// PPO agent.
    pub agent: PpoConfig,

    /// Training loop.
    pub trainer: TrainerConfig,

    /// Episodes run in each evaluation.
    pub evaluation_duration: usize,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            env: AtariEnvConfig::default(),
            agent: PpoConfig::default(),
            trainer: TrainerConfig::default(),
            evaluation_duration: 10,
        }
    }
}

impl ExperimentConfig {
    /// Sets the game.
    pub fn game(mut self, name: impl Into<String>) -> Self {
        self.env = self.env.name(name);
        self
    }

    /// Sets the number of training iterations.
    pub fn iters(mut self, v: usize) -> Self {
        self.trainer = self.trainer.max_iters(v);
        self
    }

    /// Seeds the env runners, the evaluator and the agent.
    pub fn seed(mut self, v: i64) -> Self {
        self.trainer = self.trainer.seed(v);
        self.agent = self.agent.seed(v.unsigned_abs());
        self
    }

    /// Seed of the evaluation environment.
    ///
    /// Env runner `i` uses `trainer.seed + i`, so the evaluator takes the next one.
    pub fn eval_seed(&self) -> i64 {
        self.trainer.seed + self.trainer.num_env_runners as i64
    }

    /// Constructs [`ExperimentConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`ExperimentConfig`] as a YAML file.
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
    fn defaults_train_pacman_for_one_iteration() {
        let config = ExperimentConfig::default();
        assert_eq!(config.env.name, "pacman");
        assert_eq!(config.trainer.max_iters, 1);
        assert_eq!(config.trainer.num_env_runners, 2);
        assert_eq!(config.agent.lr, 2e-4);
        assert_eq!(config.agent.train_batch_size_per_learner, 200);
        assert_eq!(config.agent.num_epochs, 10);
        assert_eq!(config.agent.model.head_fcnet_hiddens, vec![256]);
    }

    #[test]
    fn overrides_and_eval_seed() {
        let config = ExperimentConfig::default().game("pong").iters(3).seed(10);
        assert_eq!(config.env.name, "pong");
        assert_eq!(config.trainer.max_iters, 3);
        assert_eq!(config.agent.seed, 10);
        assert_eq!(config.eval_seed(), 12);
    }

    #[test]
    fn partial_yaml() -> Result<()> {
        let dir = TempDir::new("experiment_config")?;
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "env:\n  name: breakout\nevaluation_duration: 2\n")?;
        let config = ExperimentConfig::load(&path)?;
        assert_eq!(config.env.name, "breakout");
        assert_eq!(config.env.frame_skip, 4);
        assert_eq!(config.evaluation_duration, 2);
        assert_eq!(config.trainer, TrainerConfig::default());

        config.save(&path)?;
        assert_eq!(ExperimentConfig::load(&path)?, config);
        Ok(())
    }
}
