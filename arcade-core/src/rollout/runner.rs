use super::{EpisodeStats, Segment};
use crate::{Env, Policy, Step};
use anyhow::{ensure, Result};
use log::trace;

/// Steps an environment with a policy.
///
/// The runner keeps the pending observation between calls of
/// [`EnvRunner::sample`], so an episode can continue across segments.
pub struct EnvRunner<E: Env> {
    env: E,
    obs: Option<E::Obs>,
    episode_return: f32,
    episode_len: usize,
    completed: Vec<EpisodeStats>,
}

impl<E: Env> EnvRunner<E> {
    /// Builds an environment and a runner owning it.
    pub fn build(config: &E::Config, seed: i64) -> Result<Self> {
        Ok(Self::new(E::build(config, seed)?))
    }

    /// Creates a runner owning the given environment.
    pub fn new(env: E) -> Self {
        Self {
            env,
            obs: None,
            episode_return: 0.0,
            episode_len: 0,
            completed: vec![],
        }
    }

    /// The environment stepped by this runner.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Samples `n_steps` steps.
    ///
    /// The environment is reset on the first call and after every
    /// terminated or truncated episode.
    pub fn sample<P>(&mut self, policy: &mut P, n_steps: usize) -> Result<Segment<E>>
    where
        P: Policy<E> + ?Sized,
    {
        ensure!(n_steps > 0, "n_steps must be positive");

        let mut obs_prev = match self.obs.take() {
            Some(obs) => obs,
            None => self.env.reset()?,
        };
        let mut segment = Segment::new(n_steps, obs_prev.clone());

        for _ in 0..n_steps {
            let act = policy.sample(&obs_prev)?;
            let (step, _) = self.env.step(&act)?;
            let Step {
                obs,
                reward,
                is_terminated,
                is_truncated,
                ..
            } = step;

            self.episode_return += reward;
            self.episode_len += 1;

            segment.obs.push(obs_prev);
            segment.acts.push(act);
            segment.rewards.push(reward);
            segment.is_terminated.push(is_terminated);
            segment.is_truncated.push(is_truncated);

            if is_terminated || is_truncated {
                trace!(
                    "Episode finished: return = {}, len = {}",
                    self.episode_return,
                    self.episode_len
                );
                self.completed.push(EpisodeStats {
                    episode_return: self.episode_return,
                    episode_len: self.episode_len,
                });
                self.episode_return = 0.0;
                self.episode_len = 0;
                segment
                    .final_obs
                    .push((is_truncated && !is_terminated).then_some(obs));
                obs_prev = self.env.reset()?;
            } else {
                segment.final_obs.push(None);
                obs_prev = obs;
            }
        }

        segment.last_obs = obs_prev.clone();
        self.obs = Some(obs_prev);

        Ok(segment)
    }

    /// Takes the statistics of episodes completed since the last call.
    pub fn drain_episodes(&mut self) -> Vec<EpisodeStats> {
        std::mem::take(&mut self.completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dummy::{DummyAgent, DummyEnv, DummyEnvConfig};

    #[test]
    fn episodes_continue_across_segments() -> Result<()> {
        let config = DummyEnvConfig::default().episode_len(3);
        let mut runner = EnvRunner::<DummyEnv>::build(&config, 0)?;
        let mut policy = DummyAgent::default();

        let s1 = runner.sample(&mut policy, 2)?;
        assert_eq!(s1.len(), 2);
        assert!(runner.drain_episodes().is_empty());

        let s2 = runner.sample(&mut policy, 2)?;
        assert_eq!(s2.obs[0].0, 2.0);
        assert_eq!(s2.is_terminated, vec![true, false]);
        assert_eq!(s2.last_obs.0, 1.0);

        let episodes = runner.drain_episodes();
        assert_eq!(episodes.len(), 1);
        assert_eq!(episodes[0].episode_len, 3);
        assert_eq!(episodes[0].episode_return, 3.0);
        Ok(())
    }

    #[test]
    fn truncated_steps_keep_the_final_observation() -> Result<()> {
        let config = DummyEnvConfig::default().episode_len(2).truncate(true);
        let mut runner = EnvRunner::<DummyEnv>::build(&config, 0)?;
        let mut policy = DummyAgent::default();

        let s = runner.sample(&mut policy, 3)?;
        assert_eq!(s.is_truncated, vec![false, true, false]);
        assert!(s.final_obs[0].is_none());
        assert_eq!(s.final_obs[1].as_ref().map(|o| o.0), Some(2.0));
        assert_eq!(s.obs[2].0, 0.0);
        Ok(())
    }

    #[test]
    fn zero_steps_is_an_error() -> Result<()> {
        let mut runner = EnvRunner::<DummyEnv>::build(&DummyEnvConfig::default(), 0)?;
        assert!(runner.sample(&mut DummyAgent::default(), 0).is_err());
        Ok(())
    }
}
