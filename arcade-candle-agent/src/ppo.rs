//! Proximal policy optimization.
mod base;
mod config;
mod gae;
pub use base::Ppo;
pub use config::PpoConfig;
pub use gae::{compute_gae, standardize};
