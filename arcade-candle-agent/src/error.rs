//! Errors in the library.
use thiserror::Error;

/// Errors raised by agents and models.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The observation does not match the input shape of the model.
    #[error("Observation of shape {actual:?} does not match the model input {expected:?}")]
    ObsShapeMismatch {
        /// Shape the model was built for.
        expected: [usize; 3],
        /// Shape of the given observation.
        actual: [usize; 3],
    },

    /// The action index is not less than the number of actions.
    #[error("Action index {0} is out of range for {1} actions")]
    ActionOutOfRange(usize, usize),

    /// The configuration cannot be used to build a model.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
