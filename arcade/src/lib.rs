//! Train a PPO agent on an Atari game and keep the outputs of the run in one directory.
//!
//! A run resolves its output directory ([`output`]), tees the log into
//! `train.log` there ([`logging`]), trains and evaluates the agent
//! ([`run::train`]) and finally writes `metadata.json` ([`metadata`]).
//!
//! The output directory contains:
//!
//! * `train.log`
//! * `config.yaml`, the resolved experiment configuration
//! * `tensorboard/`, event files of the training metrics
//! * `checkpoint/`, the agent parameters and the trainer configuration
//! * `metadata.json`
pub mod cli;
pub mod config;
pub mod logging;
pub mod metadata;
pub mod output;
pub mod run;
pub use config::ExperimentConfig;
pub use metadata::{EvalResultSummary, RunMetadata};
