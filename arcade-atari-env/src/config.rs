//! Configuration of [`FloatObsEnv`](crate::FloatObsEnv).
//!
//! If environment variable `ATARI_ROM_DIR` exists, it is used as the directory
//! from which ROM images of the Atari games are loaded. Otherwise
//! `$HOME/atari_rom` is used.
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    env,
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

/// Configurations of [`FloatObsEnv`](crate::FloatObsEnv).
///
/// The defaults follow the `v5` registration of the games: four frames per
/// action, sticky actions with probability 0.25, the minimal action set and
/// episodes truncated at 108,000 frames.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AtariEnvConfig {
    /// Directory containing `<name>.bin`.
    pub rom_dir: String,

    /// Name of the game, like `pacman` or `pong`.
    pub name: String,

    /// The number of frames an action is repeated for.
    pub frame_skip: usize,

    /// Probability of repeating the previous action instead of the given one.
    pub repeat_action_probability: f32,

    /// Use all 18 actions instead of the minimal action set of the game.
    pub full_action_space: bool,

    /// Episodes are truncated when this number of frames is reached.
    pub max_num_frames_per_episode: usize,
}

impl Default for AtariEnvConfig {
    fn default() -> Self {
        let rom_dir = match env::var("ATARI_ROM_DIR") {
            Ok(var) => var,
            Err(_) => dirs::home_dir()
                .map(|p| p.join("atari_rom").to_string_lossy().to_string())
                .unwrap_or_default(),
        };

        Self {
            rom_dir,
            name: "pacman".to_string(),
            frame_skip: 4,
            repeat_action_probability: 0.25,
            full_action_space: false,
            max_num_frames_per_episode: 108_000,
        }
    }
}

impl AtariEnvConfig {
    /// Sets the name of the game.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the directory of ROM files.
    pub fn rom_dir(mut self, rom_dir: impl Into<String>) -> Self {
        self.rom_dir = rom_dir.into();
        self
    }

    /// Sets the number of frames an action is repeated for.
    pub fn frame_skip(mut self, v: usize) -> Self {
        self.frame_skip = v;
        self
    }

    /// Sets the probability of sticky actions.
    pub fn repeat_action_probability(mut self, v: f32) -> Self {
        self.repeat_action_probability = v;
        self
    }

    /// Sets the frame budget of an episode.
    pub fn max_num_frames_per_episode(mut self, v: usize) -> Self {
        self.max_num_frames_per_episode = v;
        self
    }

    /// Path of the ROM file.
    pub fn rom_path(&self) -> PathBuf {
        Path::new(&self.rom_dir).join(format!("{}.bin", self.name))
    }

    /// Constructs [`AtariEnvConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`AtariEnvConfig`].
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
    fn rom_path_uses_game_name() {
        let config = AtariEnvConfig::default().rom_dir("/roms").name("pong");
        assert_eq!(config.rom_path(), PathBuf::from("/roms/pong.bin"));
    }

    #[test]
    fn test_serde_env_config() -> Result<()> {
        let config = AtariEnvConfig::default()
            .rom_dir("/roms")
            .max_num_frames_per_episode(400);
        let dir = TempDir::new("atari_env_config")?;
        let path = dir.path().join("env.yaml");
        config.save(&path)?;
        assert_eq!(AtariEnvConfig::load(&path)?, config);
        Ok(())
    }

    #[test]
    fn missing_fields_take_defaults() -> Result<()> {
        let config: AtariEnvConfig = serde_yaml::from_str("rom_dir: /roms\nname: breakout\n")?;
        assert_eq!(config.frame_skip, 4);
        assert_eq!(config.max_num_frames_per_episode, 108_000);
        assert!(!config.full_action_space);
        Ok(())
    }
}
