//! Experience collected with the current policy.
//!
//! An [`EnvRunner`] owns one environment and steps it with a policy. Each call
//! to [`EnvRunner::sample`] returns a [`Segment`], a contiguous piece of
//! experience that may span several episodes. A [`Rollout`] is the set of
//! segments consumed by one optimization step of an [`Agent`](crate::Agent).
mod runner;
mod segment;
pub use runner::EnvRunner;
pub use segment::{Rollout, Segment};

/// Statistics of a completed episode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeStats {
    /// Sum of the rewards in the episode.
    pub episode_return: f32,

    /// Number of environment steps in the episode.
    pub episode_len: usize,
}

impl EpisodeStats {
    /// Mean of episode returns, `None` for an empty slice.
    pub fn mean_return<'a>(episodes: impl IntoIterator<Item = &'a EpisodeStats>) -> Option<f32> {
        mean(episodes.into_iter().map(|e| e.episode_return))
    }

    /// Mean of episode lengths, `None` for an empty slice.
    pub fn mean_len<'a>(episodes: impl IntoIterator<Item = &'a EpisodeStats>) -> Option<f32> {
        mean(episodes.into_iter().map(|e| e.episode_len as f32))
    }
}

fn mean(vs: impl Iterator<Item = f32>) -> Option<f32> {
    let (n, sum) = vs.fold((0usize, 0f32), |(n, sum), v| (n + 1, sum + v));
    match n {
        0 => None,
        _ => Some(sum / n as f32),
    }
}
