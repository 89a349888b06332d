//! Binding to the Arcade Learning Environment.
use crate::{AtariEnvConfig, Emulator};
use anyhow::{bail, Context, Result};
use c_str_macro::c_str;
use log::info;
use std::ffi::CString;
use std::path::Path;

/// Settings passed to the emulator when a ROM is loaded.
pub struct AleConfig {
    /// If 0, the emulator seeds itself from the clock.
    pub random_seed: i32,
    pub display_screen: bool,
    pub sound: bool,
    /// Averages the last two frames.
    pub color_averaging: bool,
    /// 1 is no skip.
    pub frame_skip: i32,
    pub repeat_action_probability: f32,
    pub difficulty_setting: i32,
}

impl Default for AleConfig {
    fn default() -> Self {
        Self {
            random_seed: 0,
            display_screen: false,
            sound: false,
            color_averaging: false,
            frame_skip: 1,
            repeat_action_probability: 0.25,
            difficulty_setting: 0,
        }
    }
}

/// Maps an env seed one-to-one into `1..i32::MAX`.
///
/// The emulator treats 0 as "seed from the clock".
fn ale_seed(seed: i64) -> i32 {
    (seed.rem_euclid(i32::MAX as i64 - 1) + 1) as i32
}

impl AleConfig {
    fn from_env_config(config: &AtariEnvConfig, seed: i64) -> Self {
        Self {
            random_seed: ale_seed(seed),
            frame_skip: config.frame_skip as i32,
            repeat_action_probability: config.repeat_action_probability,
            ..Self::default()
        }
    }
}

/// An emulator instance with a loaded ROM.
pub struct Ale {
    inner: *mut atari_env_sys::ALEInterface,
    actions: Vec<i32>,
}

// The emulator state is owned exclusively by this handle.
unsafe impl Send for Ale {}

impl Drop for Ale {
    fn drop(&mut self) {
        unsafe {
            atari_env_sys::ALE_del(self.inner);
        }
    }
}

impl Ale {
    /// Loads a ROM and resets the game.
    ///
    /// If `full_action_space` is `false`, actions index the minimal action set of the game.
    pub fn new(rom_path: &Path, config: AleConfig, full_action_space: bool) -> Result<Self> {
        if !rom_path.is_file() {
            bail!("ROM file not found: {:?}", rom_path);
        }
        let rom_path = rom_path
            .to_str()
            .and_then(|s| CString::new(s).ok())
            .with_context(|| format!("Invalid ROM path: {:?}", rom_path))?;

        let ale = unsafe { atari_env_sys::ALE_new() };
        unsafe {
            atari_env_sys::setInt(ale, c_str!("random_seed").as_ptr(), config.random_seed);
            atari_env_sys::setBool(
                ale,
                c_str!("display_screen").as_ptr(),
                config.display_screen,
            );
            atari_env_sys::setBool(ale, c_str!("sound").as_ptr(), config.sound);
            atari_env_sys::setBool(
                ale,
                c_str!("color_averaging").as_ptr(),
                config.color_averaging,
            );
            atari_env_sys::setInt(ale, c_str!("frame_skip").as_ptr(), config.frame_skip);
            atari_env_sys::setFloat(
                ale,
                c_str!("repeat_action_probability").as_ptr(),
                config.repeat_action_probability,
            );
            atari_env_sys::loadROM(ale, rom_path.as_ptr());
            atari_env_sys::setDifficulty(ale, config.difficulty_setting);
            atari_env_sys::reset_game(ale);
        }

        let mut ale = Self {
            inner: ale,
            actions: vec![],
        };
        ale.actions = match full_action_space {
            true => ale.available_actions(),
            false => ale.minimal_actions(),
        };

        Ok(ale)
    }

    pub fn available_actions(&self) -> Vec<i32> {
        let n = unsafe { atari_env_sys::getLegalActionSize(self.inner) } as usize;
        let mut buf = vec![0i32; n];
        unsafe {
            atari_env_sys::getLegalActionSet(self.inner, buf.as_mut_ptr());
        }
        buf
    }

    pub fn minimal_actions(&self) -> Vec<i32> {
        let n = unsafe { atari_env_sys::getMinimalActionSize(self.inner) } as usize;
        let mut buf = vec![0i32; n];
        unsafe {
            atari_env_sys::getMinimalActionSet(self.inner, buf.as_mut_ptr());
        }
        buf
    }

    /// frame number of the current episode
    pub fn episode_frame_number(&self) -> i32 {
        unsafe { atari_env_sys::getEpisodeFrameNumber(self.inner) }
    }
}

impl Emulator for Ale {
    fn open(config: &AtariEnvConfig, seed: i64) -> Result<Self> {
        let rom_path = config.rom_path();
        info!("Loading ROM {:?}", rom_path);
        Self::new(
            &rom_path,
            AleConfig::from_env_config(config, seed),
            config.full_action_space,
        )
    }

    fn reset(&mut self) {
        unsafe {
            atari_env_sys::reset_game(self.inner);
        }
    }

    fn act(&mut self, ix: usize) -> Result<f32> {
        let action = match self.actions.get(ix) {
            Some(a) => *a,
            None => bail!(
                "Action index {} out of range for {} actions",
                ix,
                self.actions.len()
            ),
        };
        let reward: ::std::os::raw::c_int = unsafe { atari_env_sys::act(self.inner, action) };
        Ok(reward as f32)
    }

    fn is_game_over(&self) -> bool {
        unsafe { atari_env_sys::game_over(self.inner) }
    }

    /// always rgb regardless of endianness
    fn screen_rgb(&self, buf: &mut [u8]) {
        unsafe {
            atari_env_sys::getScreenRGB2(self.inner, buf.as_mut_ptr());
        }
    }

    fn height(&self) -> usize {
        unsafe { atari_env_sys::getScreenHeight(self.inner) as usize }
    }

    fn width(&self) -> usize {
        unsafe { atari_env_sys::getScreenWidth(self.inner) as usize }
    }

    fn n_actions(&self) -> usize {
        self.actions.len()
    }

    fn frame_number(&self) -> usize {
        self.episode_frame_number().max(0) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consecutive_seeds_stay_distinct() {
        let seeds = (0..4).map(ale_seed).collect::<Vec<_>>();
        assert_eq!(seeds, vec![1, 2, 3, 4]);
        assert!(seeds.iter().all(|&s| s > 0));
    }

    #[test]
    fn seed_is_never_zero() {
        for seed in [-1, i64::MIN, i64::MAX, i32::MAX as i64 - 2, i32::MAX as i64 - 1] {
            let s = ale_seed(seed);
            assert!(s > 0 && s < i32::MAX, "{} -> {}", seed, s);
        }
        assert_ne!(ale_seed(-1), ale_seed(0));
    }

    #[test]
    fn env_config_seeds_the_emulator() {
        let config = AtariEnvConfig::default().frame_skip(4);
        let ale_config = AleConfig::from_env_config(&config, 1);
        assert_eq!(ale_config.random_seed, 2);
        assert_eq!(ale_config.frame_skip, 4);
    }
}
