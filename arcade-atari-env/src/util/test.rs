//! Utilities for test.
//!
//! [`DummyEmulator`] stands in for the Arcade Learning Environment so that
//! environments, agents and trainers can be tested without ROM files.
use crate::{AtariEnvConfig, Emulator, FloatObsEnv};
use anyhow::{bail, Result};

/// Screen height of [`DummyEmulator`].
pub const DUMMY_HEIGHT: usize = 8;

/// Screen width of [`DummyEmulator`].
pub const DUMMY_WIDTH: usize = 8;

/// The number of actions of [`DummyEmulator`].
pub const DUMMY_N_ACTIONS: usize = 4;

/// The game is over after this number of actions.
pub const DUMMY_EPISODE_ACTS: usize = 25;

/// Environment on [`DummyEmulator`].
pub type DummyAtariEnv = FloatObsEnv<DummyEmulator>;

/// A deterministic game.
///
/// The reward of an action is its index and the screen changes with the frame number.
pub struct DummyEmulator {
    frame_skip: usize,
    n_acts: usize,
    seed: i64,
}

impl Emulator for DummyEmulator {
    fn open(config: &AtariEnvConfig, seed: i64) -> Result<Self> {
        Ok(Self {
            frame_skip: config.frame_skip.max(1),
            n_acts: 0,
            seed,
        })
    }

    fn reset(&mut self) {
        self.n_acts = 0;
    }

    fn act(&mut self, ix: usize) -> Result<f32> {
        if ix >= DUMMY_N_ACTIONS {
            bail!("Action index {} out of range", ix);
        }
        self.n_acts += 1;
        Ok(ix as f32)
    }

    fn is_game_over(&self) -> bool {
        self.n_acts >= DUMMY_EPISODE_ACTS
    }

    fn screen_rgb(&self, buf: &mut [u8]) {
        let frame = self.frame_number() + self.seed.unsigned_abs() as usize;
        for (i, v) in buf.iter_mut().enumerate() {
            *v = ((i * 31 + frame * 7) % 256) as u8;
        }
    }

    fn height(&self) -> usize {
        DUMMY_HEIGHT
    }

    fn width(&self) -> usize {
        DUMMY_WIDTH
    }

    fn n_actions(&self) -> usize {
        DUMMY_N_ACTIONS
    }

    fn frame_number(&self) -> usize {
        self.n_acts * self.frame_skip
    }
}
