use crate::{AtariAct, AtariEnvConfig, AtariObs, Emulator, ObsSpace};
use anyhow::Result;
use arcade_core::{record::Record, Env, Step};
use log::trace;

/// An Atari game with observations scaled into `[0, 1]`.
///
/// Rewards and episode ends are passed through from the emulator unchanged.
/// An episode is terminated when the game is over and truncated when it
/// reaches `max_num_frames_per_episode` frames first.
pub struct FloatObsEnv<M: Emulator> {
    emulator: M,
    obs_space: ObsSpace,
    max_num_frames_per_episode: usize,
    screen: Vec<u8>,
}

impl<M: Emulator> FloatObsEnv<M> {
    /// Wraps an opened emulator.
    pub fn new(emulator: M, config: &AtariEnvConfig) -> Self {
        let (h, w) = (emulator.height(), emulator.width());
        Self {
            obs_space: ObsSpace::new(h, w),
            max_num_frames_per_episode: config.max_num_frames_per_episode,
            screen: vec![0u8; h * w * 3],
            emulator,
        }
    }

    /// Bounds and shape of observations.
    pub fn obs_space(&self) -> &ObsSpace {
        &self.obs_space
    }

    /// The number of actions.
    pub fn n_actions(&self) -> usize {
        self.emulator.n_actions()
    }

    fn observe(&mut self) -> AtariObs {
        self.emulator.screen_rgb(&mut self.screen);
        let [h, w, _] = self.obs_space.shape;
        AtariObs::from_rgb(h, w, &self.screen)
    }
}

impl<M: Emulator> Env for FloatObsEnv<M> {
    type Config = AtariEnvConfig;
    type Obs = AtariObs;
    type Act = AtariAct;
    type Info = ();

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        let emulator = M::open(config, seed)?;
        Ok(Self::new(emulator, config))
    }

    fn step(&mut self, act: &Self::Act) -> Result<(Step<Self>, Record)> {
        let reward = self.emulator.act(act.act)?;
        let is_terminated = self.emulator.is_game_over();
        let is_truncated =
            !is_terminated && self.emulator.frame_number() >= self.max_num_frames_per_episode;
        if is_truncated {
            trace!("Episode truncated at frame {}", self.emulator.frame_number());
        }
        let obs = self.observe();
        let step = Step::new(obs, *act, reward, is_terminated, is_truncated, ());
        Ok((step, Record::empty()))
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        self.emulator.reset();
        Ok(self.observe())
    }

    fn reset_with_index(&mut self, _ix: usize) -> Result<Self::Obs> {
        self.reset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test::{DummyEmulator, DUMMY_EPISODE_ACTS, DUMMY_HEIGHT, DUMMY_WIDTH};
    use arcade_core::{Env as _, Obs as _};

    type Env = FloatObsEnv<DummyEmulator>;

    #[test]
    fn observations_are_normalized() -> Result<()> {
        let mut env = Env::build(&AtariEnvConfig::default(), 0)?;
        let obs = env.reset()?;
        assert_eq!(obs.len(), DUMMY_HEIGHT * DUMMY_WIDTH * 3);
        assert_eq!(obs.shape(), [DUMMY_HEIGHT, DUMMY_WIDTH, 3]);
        assert!(env.obs_space().contains(&obs));
        assert!(obs.as_slice().iter().any(|&v| v > 0.5));

        let (step, _) = env.step(&AtariAct::new(2))?;
        assert!(env.obs_space().contains(&step.obs));
        assert_eq!(step.reward, 2.0);
        Ok(())
    }

    #[test]
    fn game_over_terminates() -> Result<()> {
        let mut env = Env::build(&AtariEnvConfig::default(), 0)?;
        env.reset()?;
        for t in 1..=DUMMY_EPISODE_ACTS {
            let (step, _) = env.step(&AtariAct::new(0))?;
            assert_eq!(step.is_terminated, t == DUMMY_EPISODE_ACTS);
            assert!(!step.is_truncated);
        }
        Ok(())
    }

    #[test]
    fn frame_budget_truncates() -> Result<()> {
        // Four frames per action, so the budget is reached on the third action.
        let config = AtariEnvConfig::default().max_num_frames_per_episode(12);
        let mut env = Env::build(&config, 0)?;
        env.reset()?;
        let flags = (0..3)
            .map(|_| env.step(&AtariAct::new(1)).map(|(s, _)| s.is_truncated))
            .collect::<Result<Vec<_>>>()?;
        assert_eq!(flags, vec![false, false, true]);

        env.reset()?;
        let (step, _) = env.step(&AtariAct::new(1))?;
        assert!(!step.is_truncated);
        Ok(())
    }

    #[test]
    fn invalid_action_is_an_error() -> Result<()> {
        let mut env = Env::build(&AtariEnvConfig::default(), 0)?;
        env.reset()?;
        assert!(env.step(&AtariAct::new(env.n_actions())).is_err());
        Ok(())
    }
}
