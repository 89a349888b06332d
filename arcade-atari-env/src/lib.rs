//! Atari games for [`arcade_core`] with observations scaled into `[0, 1]`.
//!
//! The binding in [`ale`] is adapted from the
//! [`atari-env`](https://crates.io/crates/atari-env) crate. [`FloatObsEnv`]
//! converts the raw RGB screen, `u8` values in `0..=255`, into `f32` values in
//! `[0, 1]` and leaves rewards and episode ends untouched.
//!
//! You need to place Atari ROM files under the directory specified by environment variable
//! `ATARI_ROM_DIR`. An easy way to do this is to use [AutoROM](https://pypi.org/project/AutoROM/)
//! Python package.
//!
//! ```bash
//! pip install autorom
//! mkdir $HOME/atari_rom
//! AutoROM --install-dir $HOME/atari_rom
//! export ATARI_ROM_DIR=$HOME/atari_rom
//! ```
//!
//! Here is an example of running Pacman with a policy taking the first action.
//!
//! ```no_run
//! # #[cfg(feature = "ale")]
//! # fn main() -> anyhow::Result<()> {
//! use arcade_atari_env::{AtariAct, AtariEnv, AtariEnvConfig, AtariObs};
//! use arcade_core::{DefaultEvaluator, Evaluator as _, Policy};
//!
//! struct FirstAction;
//!
//! impl Policy<AtariEnv> for FirstAction {
//!     fn sample(&mut self, _: &AtariObs) -> anyhow::Result<AtariAct> {
//!         Ok(AtariAct::new(0))
//!     }
//! }
//!
//! let env_config = AtariEnvConfig::default().name("pacman");
//! let record = DefaultEvaluator::<AtariEnv>::new(&env_config, 0, 1)?.evaluate(&mut FirstAction)?;
//! println!("{:?}", record);
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "ale"))]
//! # fn main() {}
//! ```
mod act;
#[cfg(feature = "ale")]
pub mod ale;
#[cfg(feature = "candle")]
mod candle;
mod config;
mod emulator;
mod env;
mod obs;
pub mod util;
pub use act::AtariAct;
pub use config::AtariEnvConfig;
pub use emulator::Emulator;
pub use env::FloatObsEnv;
pub use obs::{AtariObs, ObsSpace};

/// Atari game on the Arcade Learning Environment.
#[cfg(feature = "ale")]
pub type AtariEnv = FloatObsEnv<ale::Ale>;
