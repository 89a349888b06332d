//! Action for [`FloatObsEnv`](crate::FloatObsEnv).
use arcade_core::Act;

/// Index into the action set of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtariAct {
    pub act: usize,
}

impl AtariAct {
    pub fn new(act: usize) -> Self {
        Self { act }
    }
}

impl Act for AtariAct {}

impl From<usize> for AtariAct {
    fn from(act: usize) -> Self {
        Self { act }
    }
}
