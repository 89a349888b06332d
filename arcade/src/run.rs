//! Training run.
use crate::{
    config::ExperimentConfig,
    metadata::{RunMetadata, METADATA_FILE},
};
use anyhow::Result;
use arcade_atari_env::{Emulator, FloatObsEnv};
use arcade_candle_agent::ppo::Ppo;
use arcade_core::{Configurable, DefaultEvaluator, Env, Trainer};
use arcade_tensorboard::TensorboardRecorder;
use chrono::Utc;
use log::info;
use std::path::Path;

/// Name of the resolved configuration in the output directory.
pub const CONFIG_FILE: &str = "config.yaml";

/// Directory of tensorboard event files in the output directory.
pub const TENSORBOARD_DIR: &str = "tensorboard";

/// Fills in what is known only after looking at the game and the output directory.
///
/// The observation shape and the number of actions come from the environment.
/// There is a single learner, so an iteration samples `train_batch_size_per_learner` steps.
pub fn resolve_config<M: Emulator>(
    config: &ExperimentConfig,
    save_dir: &Path,
) -> Result<ExperimentConfig> {
    let env = FloatObsEnv::<M>::build(&config.env, config.trainer.seed)?;
    let obs_shape = env.obs_space().shape;
    let n_actions = env.n_actions();
    info!(
        "Game {}: observation {:?}, {} actions",
        config.env.name, obs_shape, n_actions
    );

    let mut config = config.clone();
    config.agent = config.agent.space(obs_shape, n_actions);
    config.trainer = config
        .trainer
        .train_batch_size(config.agent.train_batch_size_per_learner)
        .model_dir(save_dir.to_string_lossy());
    Ok(config)
}

/// Trains an agent, evaluates it and writes the outputs in `save_dir`.
pub fn train<M: Emulator>(config: &ExperimentConfig, save_dir: &Path) -> Result<RunMetadata> {
    let config = resolve_config::<M>(config, save_dir)?;
    config.save(save_dir.join(CONFIG_FILE))?;

    let mut agent = Ppo::<FloatObsEnv<M>>::build(config.agent.clone())?;
    let mut recorder = TensorboardRecorder::new(save_dir.join(TENSORBOARD_DIR));
    let mut evaluator = DefaultEvaluator::<FloatObsEnv<M>>::new(
        &config.env,
        config.eval_seed(),
        config.evaluation_duration,
    )?;
    let mut trainer = Trainer::<FloatObsEnv<M>>::build(config.trainer.clone(), config.env.clone());

    let outcome = trainer.train(&mut agent, &mut recorder, &mut evaluator)?;
    info!("Checkpoint saved at: {}", outcome.checkpoint_path.display());

    let metadata = RunMetadata::new(&outcome.checkpoint_path, &outcome.eval_record, Utc::now());
    metadata.save(save_dir.join(METADATA_FILE))?;
    info!("Metadata saved at: {}", save_dir.join(METADATA_FILE).display());

    Ok(metadata)
}
