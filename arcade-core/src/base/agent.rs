//! Agent.
use super::{Env, Policy};
use crate::{record::Record, rollout::Rollout};
use anyhow::Result;
use std::path::Path;

/// Represents a trainable policy on an environment.
///
/// Agents are trained on-policy: every optimization step consumes a
/// [`Rollout`] collected with the current parameters and discards it afterwards.
pub trait Agent<E: Env>: Policy<E> {
    /// Set the policy to training mode.
    fn train(&mut self);

    /// Set the policy to evaluation mode.
    fn eval(&mut self);

    /// Return if it is in training mode.
    fn is_train(&self) -> bool;

    /// Performs an optimization step.
    fn opt(&mut self, rollout: &Rollout<E>) -> Result<()> {
        let _ = self.opt_with_record(rollout)?;
        Ok(())
    }

    /// Performs an optimization step and returns some information.
    fn opt_with_record(&mut self, rollout: &Rollout<E>) -> Result<Record>;

    /// Save the parameters of the agent in the given directory.
    ///
    /// This method commonly creates a number of files consisting the agent
    /// in the directory.
    fn save_params(&self, path: &Path) -> Result<()>;

    /// Load the parameters of the agent from the given directory.
    fn load_params(&mut self, path: &Path) -> Result<()>;
}
