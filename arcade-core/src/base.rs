//! Core functionalities.
mod agent;
mod env;
mod policy;
mod step;
pub use agent::Agent;
pub use env::Env;
pub use policy::{Configurable, Policy};
use std::fmt::Debug;
pub use step::{Info, Step};

/// An observation of an environment.
///
/// Environments are not vectorized; a value of this type is a single
/// observation.
pub trait Obs: Clone + Debug {
    /// Returns the number of scalar elements in the observation.
    fn len(&self) -> usize;
}

/// An action of the environment.
pub trait Act: Clone + Debug {}
