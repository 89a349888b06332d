#![warn(missing_docs)]
//! Core traits and the training loop for on-policy reinforcement learning.
//!
//! The crate defines the interface between an environment ([`Env`]), a policy
//! ([`Policy`]) and a trainable agent ([`Agent`]), and provides the objects that
//! drive them:
//!
//! * [`rollout`] collects experience with one or more [`EnvRunner`]s.
//! * [`Evaluator`] runs episodes with a policy in evaluation mode.
//! * [`Trainer`] runs the iterate → train → evaluate → checkpoint loop.
//! * [`record`] holds the values emitted by these objects and the recorders
//!   that write them out.
//!
//! [`EnvRunner`]: rollout::EnvRunner
pub mod dummy;
pub mod error;
pub mod record;
pub mod rollout;

mod base;
pub use base::{Act, Agent, Configurable, Env, Info, Obs, Policy, Step};

mod evaluator;
pub use evaluator::{DefaultEvaluator, Evaluator};

mod trainer;
pub use trainer::{Sampler, Trainer, TrainerConfig, TrainingOutcome, FINAL_CHECKPOINT_DIR};
