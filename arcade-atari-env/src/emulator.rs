use crate::AtariEnvConfig;
use anyhow::Result;

/// A raw pixel game.
///
/// Actions are indices into the action set the emulator was opened with.
pub trait Emulator: Sized {
    /// Opens the game named in `config`.
    fn open(config: &AtariEnvConfig, seed: i64) -> Result<Self>;

    /// Starts a new episode.
    fn reset(&mut self);

    /// Applies an action and returns the reward.
    fn act(&mut self, ix: usize) -> Result<f32>;

    /// Returns `true` if the game is over.
    fn is_game_over(&self) -> bool;

    /// Copies the screen into `buf` as `height * width * 3` RGB bytes.
    fn screen_rgb(&self, buf: &mut [u8]);

    /// Height of the screen in pixels.
    fn height(&self) -> usize;

    /// Width of the screen in pixels.
    fn width(&self) -> usize;

    /// The number of actions.
    fn n_actions(&self) -> usize;

    /// Frames elapsed in the current episode.
    fn frame_number(&self) -> usize;
}
