use super::EpisodeStats;
use crate::Env;

/// Contiguous experience from a single environment.
///
/// All vectors have the same length, one entry per environment step.
/// `obs[t]` is the observation on which `acts[t]` was taken. When step `t`
/// ends an episode, `obs[t + 1]` is the first observation of the next episode;
/// if the episode was truncated rather than terminated, the observation that
/// followed step `t` is kept in `final_obs[t]` so that its value can be
/// bootstrapped.
pub struct Segment<E: Env> {
    /// Observations on which the actions were taken.
    pub obs: Vec<E::Obs>,

    /// Actions.
    pub acts: Vec<E::Act>,

    /// Rewards.
    pub rewards: Vec<f32>,

    /// Terminal flags.
    pub is_terminated: Vec<bool>,

    /// Truncation flags.
    pub is_truncated: Vec<bool>,

    /// Observation following a truncated step, `None` elsewhere.
    pub final_obs: Vec<Option<E::Obs>>,

    /// Observation following the last step of the segment.
    pub last_obs: E::Obs,
}

impl<E: Env> Segment<E> {
    /// Creates an empty segment starting at the given observation.
    pub fn new(capacity: usize, first_obs: E::Obs) -> Self {
        Self {
            obs: Vec::with_capacity(capacity),
            acts: Vec::with_capacity(capacity),
            rewards: Vec::with_capacity(capacity),
            is_terminated: Vec::with_capacity(capacity),
            is_truncated: Vec::with_capacity(capacity),
            final_obs: Vec::with_capacity(capacity),
            last_obs: first_obs,
        }
    }

    /// The number of steps in the segment.
    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    /// Returns `true` if the segment has no step.
    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    /// Returns `true` if step `t` ended an episode.
    pub fn is_done(&self, t: usize) -> bool {
        self.is_terminated[t] || self.is_truncated[t]
    }
}

/// Experience for one optimization step.
pub struct Rollout<E: Env> {
    /// Segments, one per env runner that took part in sampling.
    pub segments: Vec<Segment<E>>,

    /// Episodes completed while the rollout was collected.
    pub episodes: Vec<EpisodeStats>,
}

impl<E: Env> Rollout<E> {
    /// The total number of environment steps.
    pub fn len(&self) -> usize {
        self.segments.iter().map(Segment::len).sum()
    }

    /// Returns `true` if the rollout has no step.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
