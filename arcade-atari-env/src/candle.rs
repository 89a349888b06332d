//! Conversions for [`arcade_candle_agent`].
use crate::{AtariAct, AtariObs};
use arcade_candle_agent::{DiscreteAct, PixelObs};

impl PixelObs for AtariObs {
    fn shape(&self) -> [usize; 3] {
        AtariObs::shape(self)
    }

    fn pixels(&self) -> &[f32] {
        self.as_slice()
    }
}

impl DiscreteAct for AtariAct {
    fn from_index(ix: usize) -> Self {
        Self::new(ix)
    }

    fn index(&self) -> usize {
        self.act
    }
}
