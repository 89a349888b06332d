//! Observation for [`FloatObsEnv`](crate::FloatObsEnv).
use arcade_core::Obs;

/// Screen pixels scaled into `[0, 1]`, laid out as `[height, width, 3]`.
#[derive(Debug, Clone, PartialEq)]
pub struct AtariObs {
    shape: [usize; 3],
    data: Vec<f32>,
}

impl AtariObs {
    /// Converts RGB bytes of a `height * width` screen.
    pub fn from_rgb(height: usize, width: usize, rgb: &[u8]) -> Self {
        debug_assert_eq!(rgb.len(), height * width * 3);
        Self {
            shape: [height, width, 3],
            data: rgb.iter().map(|&v| v as f32 / 255.0).collect(),
        }
    }

    /// `[height, width, 3]`.
    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

impl Obs for AtariObs {
    fn len(&self) -> usize {
        self.data.len()
    }
}

/// Bounds and shape of [`AtariObs`].
///
/// The raw screen space `0..=255` scaled by `1/255`.
#[derive(Debug, Clone, PartialEq)]
pub struct ObsSpace {
    pub low: f32,
    pub high: f32,
    pub shape: [usize; 3],
}

impl ObsSpace {
    /// The space of normalized screens of the given size.
    pub fn new(height: usize, width: usize) -> Self {
        let (raw_low, raw_high) = (u8::MIN as f32, u8::MAX as f32);
        Self {
            low: raw_low / 255.0,
            high: raw_high / 255.0,
            shape: [height, width, 3],
        }
    }

    /// Returns `true` if `obs` has this shape and its values lie within the bounds.
    pub fn contains(&self, obs: &AtariObs) -> bool {
        obs.shape() == self.shape
            && obs
                .as_slice()
                .iter()
                .all(|&v| v >= self.low && v <= self.high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_are_scaled_into_unit_interval() {
        let obs = AtariObs::from_rgb(1, 2, &[0, 51, 255, 255, 0, 102]);
        assert_eq!(obs.shape(), [1, 2, 3]);
        assert_eq!(obs.as_slice(), &[0.0, 0.2, 1.0, 1.0, 0.0, 0.4]);
        assert!(ObsSpace::new(1, 2).contains(&obs));
        assert!(!ObsSpace::new(2, 1).contains(&obs));
    }
}
