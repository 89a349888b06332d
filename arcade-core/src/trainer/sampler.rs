//! Experience sampling with a set of env runners.
//!
//! Each iteration, [`Sampler::sample`] splits the requested number of
//! environment steps across its runners, steps them one after another with the
//! same policy and merges the resulting segments into a [`Rollout`]. Metrics of
//! recently completed episodes are kept in a sliding window.
use crate::{
    error::ArcadeError,
    record::{Record, RecordValue},
    rollout::{EnvRunner, EpisodeStats, Rollout},
    Env, Policy,
};
use anyhow::Result;
use std::{collections::VecDeque, time::SystemTime};

/// Splits `total` steps into `n` shares. Earlier shares take the remainder.
pub(crate) fn split_steps(total: usize, n: usize) -> Vec<usize> {
    let base = total / n;
    let rem = total % n;
    (0..n).map(|i| base + usize::from(i < rem)).collect()
}

/// Samples experience for on-policy optimization.
pub struct Sampler<E: Env> {
    runners: Vec<EnvRunner<E>>,
    window: VecDeque<EpisodeStats>,
    window_size: usize,
    n_env_steps: usize,
}

impl<E: Env> Sampler<E> {
    /// Builds `n_runners` env runners. Runner `i` is seeded with `seed + i`.
    pub fn build(
        config: &E::Config,
        n_runners: usize,
        seed: i64,
        window_size: usize,
    ) -> Result<Self> {
        if n_runners == 0 {
            return Err(ArcadeError::InvalidConfig(
                "the number of env runners must be positive".to_string(),
            )
            .into());
        }

        let runners = (0..n_runners)
            .map(|i| EnvRunner::build(config, seed + i as i64))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            runners,
            window: VecDeque::with_capacity(window_size),
            window_size: window_size.max(1),
            n_env_steps: 0,
        })
    }

    /// The env runners in seed order.
    pub fn runners(&self) -> &[EnvRunner<E>] {
        &self.runners
    }

    /// The number of env runners.
    pub fn n_runners(&self) -> usize {
        self.runners.len()
    }

    /// The total number of environment steps sampled so far.
    pub fn n_env_steps(&self) -> usize {
        self.n_env_steps
    }

    /// Samples `n_steps` environment steps in total.
    ///
    /// The returned record contains the following values:
    ///
    /// * `env_runners/episode_return_mean` and `env_runners/episode_len_mean`,
    ///   computed over the episodes in the window. These are absent until an
    ///   episode completes.
    /// * `env_runners/num_episodes`, episodes completed in this call.
    /// * `env_runners/num_env_steps_sampled`, steps sampled in this call.
    /// * `fps`, environment steps per second in this call.
    pub fn sample<P>(&mut self, policy: &mut P, n_steps: usize) -> Result<(Rollout<E>, Record)>
    where
        P: Policy<E> + ?Sized,
    {
        let timer = SystemTime::now();
        let shares = split_steps(n_steps, self.runners.len());
        let mut segments = Vec::with_capacity(shares.len());
        let mut episodes = vec![];

        for (runner, &n) in self.runners.iter_mut().zip(shares.iter()) {
            if n == 0 {
                continue;
            }
            segments.push(runner.sample(policy, n)?);
            episodes.extend(runner.drain_episodes());
        }

        for e in episodes.iter() {
            if self.window.len() == self.window_size {
                self.window.pop_front();
            }
            self.window.push_back(*e);
        }

        let rollout = Rollout { segments, episodes };
        let n_sampled = rollout.len();
        self.n_env_steps += n_sampled;

        let mut record = Record::empty();
        if let Some(v) = EpisodeStats::mean_return(&self.window) {
            record.insert("env_runners/episode_return_mean", RecordValue::Scalar(v));
        }
        if let Some(v) = EpisodeStats::mean_len(&self.window) {
            record.insert("env_runners/episode_len_mean", RecordValue::Scalar(v));
        }
        record.insert(
            "env_runners/num_episodes",
            RecordValue::Scalar(rollout.episodes.len() as _),
        );
        record.insert(
            "env_runners/num_env_steps_sampled",
            RecordValue::Scalar(n_sampled as _),
        );
        if let Ok(elapsed) = timer.elapsed() {
            let secs = elapsed.as_secs_f32();
            if secs > 0.0 {
                record.insert("fps", RecordValue::Scalar(n_sampled as f32 / secs));
            }
        }

        Ok((rollout, record))
    }
}
