//! Command line of the `arcade` binary.
use crate::{config::ExperimentConfig, output::SaveDir};
use anyhow::Result;
use clap::Parser;
use log::warn;
use std::{ffi::OsString, path::PathBuf};

/// Environment variable naming the output directory.
pub const SAVE_DIR_VAR: &str = "SAVE_DIR";

/// Train a PPO agent on an Atari game
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// Experiment configuration in YAML
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Project directory; outputs are kept inside it
    #[arg(long, default_value = ".")]
    pub project_dir: PathBuf,

    /// Output directory, `$SAVE_DIR` or `<project-dir>/out` by default
    #[arg(long)]
    pub save_dir: Option<PathBuf>,

    /// Name of the game (e.g., pacman)
    #[arg(short, long)]
    pub game: Option<String>,

    /// The number of training iterations
    #[arg(long)]
    pub iters: Option<usize>,

    /// Random seed
    #[arg(long)]
    pub seed: Option<i64>,

    /// Show the configuration and exit
    #[arg(long, default_value_t = false)]
    pub show_config: bool,
}

impl Args {
    /// Loads the YAML configuration, or the default one, and applies the flags on top.
    pub fn experiment_config(&self) -> Result<ExperimentConfig> {
        let mut config = match &self.config {
            Some(path) => ExperimentConfig::load(path)?,
            None => ExperimentConfig::default(),
        };
        if let Some(game) = &self.game {
            config = config.game(game.as_str());
        }
        if let Some(iters) = self.iters {
            config = config.iters(iters);
        }
        if let Some(seed) = self.seed {
            config = config.seed(seed);
        }
        Ok(config)
    }

    /// The requested output directory. `--save-dir` wins over `env_value`.
    ///
    /// An empty `env_value` counts as unset.
    pub fn requested_save_dir(&self, env_value: Option<OsString>) -> Option<PathBuf> {
        self.save_dir
            .clone()
            .or_else(|| env_value.filter(|v| !v.is_empty()).map(PathBuf::from))
    }
}

/// Logs a warning when the requested output directory was replaced.
pub fn warn_if_rejected(save_dir: &SaveDir) {
    if let Some(rejected) = &save_dir.rejected {
        warn!(
            "SAVE_DIR {:?} was outside project tree. Forcing save_dir to {:?}",
            rejected, save_dir.path
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempdir::TempDir;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("arcade").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn empty_save_dir_var_is_unset() {
        let args = parse(&[]);
        assert_eq!(args.requested_save_dir(Some(OsString::new())), None);
        assert_eq!(args.requested_save_dir(None), None);
        assert_eq!(
            args.requested_save_dir(Some("runs/a".into())),
            Some(PathBuf::from("runs/a"))
        );
    }

    #[test]
    fn save_dir_flag_wins_over_var() {
        let args = parse(&["--save-dir", "runs/flag"]);
        assert_eq!(
            args.requested_save_dir(Some("runs/var".into())),
            Some(PathBuf::from("runs/flag"))
        );
        assert_eq!(
            args.requested_save_dir(Some(OsString::new())),
            Some(PathBuf::from("runs/flag"))
        );
    }

    #[test]
    fn flags_override_yaml() -> Result<()> {
        let dir = TempDir::new("cli")?;
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "env:\n  name: breakout\ntrainer:\n  max_iters: 7\n  seed: 5\n",
        )?;
        let path = path.to_string_lossy().to_string();

        let config = parse(&["-c", &path]).experiment_config()?;
        assert_eq!(config.env.name, "breakout");
        assert_eq!(config.trainer.max_iters, 7);
        assert_eq!(config.trainer.seed, 5);

        let config =
            parse(&["-c", &path, "-g", "pong", "--iters", "2", "--seed", "9"]).experiment_config()?;
        assert_eq!(config.env.name, "pong");
        assert_eq!(config.trainer.max_iters, 2);
        assert_eq!(config.trainer.seed, 9);
        assert_eq!(config.agent.seed, 9);
        assert_eq!(config.eval_seed(), 9 + config.trainer.num_env_runners as i64);
        Ok(())
    }

    #[test]
    fn flags_override_defaults() -> Result<()> {
        let config = parse(&["--game", "pong"]).experiment_config()?;
        assert_eq!(config.env.name, "pong");
        assert_eq!(config.trainer.max_iters, ExperimentConfig::default().trainer.max_iters);
        Ok(())
    }
}
