//! Conversions between environment types and tensors.
use arcade_core::{Act, Obs};

/// An image observation laid out as `[height, width, channels]`.
pub trait PixelObs: Obs {
    /// `[height, width, channels]`.
    fn shape(&self) -> [usize; 3];

    /// Pixel values in row-major order.
    fn pixels(&self) -> &[f32];
}

/// An action from a finite set.
pub trait DiscreteAct: Act {
    /// The action of the given index.
    fn from_index(ix: usize) -> Self;

    /// Index of the action.
    fn index(&self) -> usize;
}
