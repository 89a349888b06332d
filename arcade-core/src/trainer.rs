//! Train [`Agent`].
mod config;
mod sampler;
use crate::{
    error::ArcadeError,
    record::{Record, RecordValue, Recorder},
    Agent, Env, Evaluator,
};
use anyhow::Result;
pub use config::TrainerConfig;
use log::{error, info, warn};
pub use sampler::Sampler;
use std::{
    path::{Path, PathBuf},
    time::SystemTime,
};

/// Name of the directory holding the checkpoint saved after training.
pub const FINAL_CHECKPOINT_DIR: &str = "checkpoint";

/// Result of [`Trainer::train`].
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    /// Directory of the checkpoint saved after the last iteration.
    pub checkpoint_path: PathBuf,

    /// Record of the evaluation done after the last iteration.
    pub eval_record: Record,

    /// The number of iterations done.
    pub iterations: usize,
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Manages training loop and related objects.
///
/// # Training loop
///
/// Training loop looks like following:
///
/// 0. Given an agent implementing [`Agent`], a recorder implementing [`Recorder`]
///    and an evaluator implementing [`Evaluator`].
/// 1. Build a [`Sampler`] with `num_env_runners` env runners and set the agent to
///    training mode.
/// 2. For each iteration `i` in `0..max_iters`:
///     1. Sample `train_batch_size` environment steps with the agent and collect
///        them in a [`Rollout`].
///     2. Do an optimization step of the agent on the rollout.
///     3. If `(i + 1) % eval_interval == 0`, evaluate the agent in evaluation mode.
///     4. Log the header `=== Training iteration i ===`, the mean episode return
///        and length of the evaluation and the losses of the optimization step.
///     5. If `(i + 1) % save_interval == 0`, save the agent's parameters
///        in directory `(model_dir)/checkpoint_(i + 1)`.
///     6. Store the record of the iteration in the recorder and flush it every
///        `flush_record_interval` iterations.
/// 3. Evaluate the agent once more, record it at step `max_iters + 1` and save its
///    parameters in `(model_dir)/checkpoint`, together with the trainer configuration.
///
/// # Interaction of objects
///
/// ```mermaid
/// graph LR
///     A[Agent]-->|Env::Act|B[EnvRunner]
///     B -->|Env::Obs|A
///     B -->|Segment|C[Sampler]
///     C -->|Rollout|A
///     A -->|Record|D[Recorder]
///     E[Evaluator] -->|Record|D
/// ```
///
/// [`Rollout`]: crate::rollout::Rollout
pub struct Trainer<E: Env> {
    config: TrainerConfig,

    /// Configuration of the environments for training.
    env_config: E::Config,
}

impl<E: Env> Trainer<E> {
    /// Constructs a trainer.
    pub fn build(config: TrainerConfig, env_config: E::Config) -> Self {
        Self { config, env_config }
    }

    /// Configuration of the trainer.
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    fn model_dir(&self) -> Result<PathBuf> {
        match &self.config.model_dir {
            Some(dir) => Ok(PathBuf::from(dir)),
            None => Err(ArcadeError::InvalidConfig("model_dir is not set".to_string()).into()),
        }
    }

    fn save_checkpoint<A: Agent<E>>(&self, agent: &A, path: &Path) -> Result<()> {
        agent.save_params(path)?;
        self.config.save(path.join("trainer.yaml"))?;
        info!("Saved the model in {:?}", path);
        Ok(())
    }

    /// Train the agent.
    pub fn train<A, D>(
        &mut self,
        agent: &mut A,
        recorder: &mut dyn Recorder,
        evaluator: &mut D,
    ) -> Result<TrainingOutcome>
    where
        A: Agent<E>,
        D: Evaluator<E>,
    {
        self.config.validate()?;
        let model_dir = self.model_dir()?;
        let mut sampler = Sampler::<E>::build(
            &self.env_config,
            self.config.num_env_runners,
            self.config.seed,
            self.config.episode_stats_window,
        )?;
        agent.train();

        for i in 0..self.config.max_iters {
            let iter = i + 1;

            let timer = SystemTime::now();
            let (rollout, mut record) = sampler.sample(agent, self.config.train_batch_size)?;
            record.merge_inplace(agent.opt_with_record(&rollout)?);
            drop(rollout);

            if self.config.eval_interval > 0 && iter % self.config.eval_interval == 0 {
                agent.eval();
                let eval_record = evaluator.evaluate(agent);
                agent.train();
                record.merge_inplace(eval_record?);
            }

            if let Ok(elapsed) = timer.elapsed() {
                record.insert(
                    "time_this_iter_s",
                    RecordValue::Scalar(elapsed.as_secs_f32()),
                );
            }

            match iteration_report(i, &record) {
                Ok(lines) => lines.iter().for_each(|line| info!("{}", line)),
                Err(e) => error!("Failed to log the metrics of iteration {}: {}", i, e),
            }

            if self.config.save_interval > 0 && iter % self.config.save_interval == 0 {
                let path = model_dir.join(format!("checkpoint_{:06}", iter));
                if let Err(e) = self.save_checkpoint(agent, &path) {
                    warn!("Failed to save the model in {:?}: {}", path, e);
                }
            }

            recorder.store(record);
            if iter % self.config.flush_record_interval == 0 || iter == self.config.max_iters {
                recorder.flush(iter as _);
            }
        }

        info!("Starts final evaluation of the trained model");
        agent.eval();
        let eval_record = evaluator.evaluate(agent)?;
        let mut record = eval_record.clone();
        record.insert(
            "iteration",
            RecordValue::Scalar(final_eval_step(self.config.max_iters) as _),
        );
        recorder.write(record);

        let checkpoint_path = model_dir.join(FINAL_CHECKPOINT_DIR);
        self.save_checkpoint(agent, &checkpoint_path)?;

        Ok(TrainingOutcome {
            checkpoint_path,
            eval_record,
            iterations: self.config.max_iters,
        })
    }
}

/// Recorder step of the final evaluation, one past the last iteration.
fn final_eval_step(max_iters: usize) -> usize {
    max_iters + 1
}

/// Lines logged once iteration `i` is done: a header, the evaluation returns
/// and the learner losses.
fn iteration_report(i: usize, record: &Record) -> Result<Vec<String>, ArcadeError> {
    Ok(vec![
        format!("=== Training iteration {} ===", i),
        format!(
            "Mean Episode Return: {:.3}",
            record.get_scalar("evaluation/episode_return_mean")?
        ),
        format!(
            "Mean Episode Length: {:.3}",
            record.get_scalar("evaluation/episode_len_mean")?
        ),
        format!("Total Loss: {:.6}", record.get_scalar("learners/total_loss")?),
        format!("VF Loss: {:.6}", record.get_scalar("learners/vf_loss")?),
        format!("Policy Loss: {:.6}", record.get_scalar("learners/policy_loss")?),
    ])
}
