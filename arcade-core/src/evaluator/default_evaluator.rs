//! Default implementation of the [`Evaluator`] trait.
use super::Evaluator;
use crate::{
    error::ArcadeError,
    record::{Record, RecordValue},
    rollout::EpisodeStats,
    Env, Policy,
};
use anyhow::Result;
use log::debug;

/// Runs a fixed number of episodes on its own environment.
///
/// The returned record has `evaluation/episode_return_mean`,
/// `evaluation/episode_len_mean` and `evaluation/num_episodes`.
///
/// ```ignore
/// let mut evaluator = DefaultEvaluator::<Env>::new(&env_config, 42, 10)?;
/// let record = evaluator.evaluate(&mut agent)?;
/// println!("{}", record.get_scalar("evaluation/episode_return_mean")?);
/// ```
pub struct DefaultEvaluator<E: Env> {
    n_episodes: usize,
    env: E,
}

impl<E: Env> Evaluator<E> for DefaultEvaluator<E> {
    fn evaluate<P>(&mut self, policy: &mut P) -> Result<Record>
    where
        P: Policy<E> + ?Sized,
    {
        let mut episodes = Vec::with_capacity(self.n_episodes);

        for ix in 0..self.n_episodes {
            let mut prev_obs = self.env.reset_with_index(ix)?;
            let mut stats = EpisodeStats {
                episode_return: 0.0,
                episode_len: 0,
            };

            loop {
                let act = policy.sample(&prev_obs)?;
                let (step, _) = self.env.step(&act)?;
                stats.episode_return += step.reward;
                stats.episode_len += 1;
                if step.is_done() {
                    break;
                }
                prev_obs = step.obs;
            }

            debug!(
                "Evaluation episode {}: return = {}, len = {}",
                ix, stats.episode_return, stats.episode_len
            );
            episodes.push(stats);
        }

        let mut record = Record::empty();
        if let Some(v) = EpisodeStats::mean_return(&episodes) {
            record.insert("evaluation/episode_return_mean", RecordValue::Scalar(v));
        }
        if let Some(v) = EpisodeStats::mean_len(&episodes) {
            record.insert("evaluation/episode_len_mean", RecordValue::Scalar(v));
        }
        record.insert(
            "evaluation/num_episodes",
            RecordValue::Scalar(episodes.len() as _),
        );
        Ok(record)
    }
}

impl<E: Env> DefaultEvaluator<E> {
    /// Constructs a new [`DefaultEvaluator`].
    ///
    /// * `config` - Configuration for the environment
    /// * `seed` - Random seed for environment initialization
    /// * `n_episodes` - Number of episodes to run during evaluation
    pub fn new(config: &E::Config, seed: i64, n_episodes: usize) -> Result<Self> {
        if n_episodes == 0 {
            return Err(ArcadeError::InvalidConfig(
                "the number of evaluation episodes must be positive".to_string(),
            )
            .into());
        }

        Ok(Self {
            n_episodes,
            env: E::build(config, seed)?,
        })
    }

    /// The environment used for evaluation.
    pub fn env(&self) -> &E {
        &self.env
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dummy::{DummyAgent, DummyEnv, DummyEnvConfig};

    #[test]
    fn returns_mean_over_episodes() -> Result<()> {
        let config = DummyEnvConfig::default().episode_len(4);
        let mut evaluator = DefaultEvaluator::<DummyEnv>::new(&config, 0, 3)?;
        let mut agent = DummyAgent::default();
        let record = evaluator.evaluate(&mut agent)?;

        assert_eq!(record.get_scalar("evaluation/episode_return_mean")?, 4.0);
        assert_eq!(record.get_scalar("evaluation/episode_len_mean")?, 4.0);
        assert_eq!(record.get_scalar("evaluation/num_episodes")?, 3.0);
        assert_eq!(agent.n_eval_samples, 12);
        Ok(())
    }

    #[test]
    fn env_takes_the_given_seed() -> Result<()> {
        let config = DummyEnvConfig::default();
        let evaluator = DefaultEvaluator::<DummyEnv>::new(&config, 12, 1)?;
        assert_eq!(evaluator.env().seed(), 12);
        Ok(())
    }

    #[test]
    fn zero_episodes_is_rejected() {
        let config = DummyEnvConfig::default();
        assert!(DefaultEvaluator::<DummyEnv>::new(&config, 0, 0).is_err());
    }
}
