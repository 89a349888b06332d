use crate::Activation;
use serde::{Deserialize, Serialize};

/// A convolution layer: `[out_channels, [kernel_h, kernel_w], stride]`.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
pub struct ConvFilter(pub usize, pub [usize; 2], pub usize);

impl ConvFilter {
    /// Number of output channels.
    pub fn out_channels(&self) -> usize {
        self.0
    }

    /// `[kernel_h, kernel_w]`.
    pub fn kernel(&self) -> [usize; 2] {
        self.1
    }

    pub fn stride(&self) -> usize {
        self.2
    }
}

/// Padding of convolution layers.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum Padding {
    /// Output size is `ceil(input / stride)`; the input is zero-padded, the
    /// extra row or column going to the bottom or right.
    #[default]
    Same,

    /// No padding.
    Valid,
}

impl Padding {
    /// Returns `(output size, padding before, padding after)` along one axis.
    pub fn apply(&self, input: usize, kernel: usize, stride: usize) -> (usize, usize, usize) {
        match self {
            Self::Same => {
                let out = input.div_ceil(stride);
                let total = ((out - 1) * stride + kernel).saturating_sub(input);
                (out, total / 2, total - total / 2)
            }
            Self::Valid => ((input.saturating_sub(kernel)) / stride + 1, 0, 0),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`Cnn`](super::Cnn).
pub struct CnnConfig {
    /// Input shape `[height, width, channels]`.
    pub in_shape: [usize; 3],

    /// Convolution layers.
    pub conv_filters: Vec<ConvFilter>,

    /// Activation after each convolution.
    pub activation: Activation,

    /// Padding of the convolutions.
    pub padding: Padding,
}

impl CnnConfig {
    /// Creates configuration of a CNN.
    pub fn new(in_shape: [usize; 3], conv_filters: Vec<ConvFilter>) -> Self {
        Self {
            in_shape,
            conv_filters,
            activation: Activation::Relu,
            padding: Padding::Same,
        }
    }

    /// Sets the activation function.
    pub fn activation(mut self, v: Activation) -> Self {
        self.activation = v;
        self
    }

    /// Sets the padding.
    pub fn padding(mut self, v: Padding) -> Self {
        self.padding = v;
        self
    }

    /// Returns the shape `[channels, height, width]` after each layer.
    pub fn layer_shapes(&self) -> Vec<[usize; 3]> {
        let [mut h, mut w, mut c] = self.in_shape;
        self.conv_filters
            .iter()
            .map(|f| {
                let [kh, kw] = f.kernel();
                h = self.padding.apply(h, kh, f.stride()).0;
                w = self.padding.apply(w, kw, f.stride()).0;
                c = f.out_channels();
                [c, h, w]
            })
            .collect()
    }

    /// Dimension of the flattened output.
    pub fn out_dim(&self) -> usize {
        match self.layer_shapes().last() {
            Some([c, h, w]) => c * h * w,
            None => self.in_shape.iter().product(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atari_filters() -> Vec<ConvFilter> {
        vec![
            ConvFilter(16, [8, 8], 4),
            ConvFilter(32, [4, 4], 2),
            ConvFilter(64, [3, 3], 1),
        ]
    }

    #[test]
    fn same_padding_on_atari_screen() {
        let config = CnnConfig::new([210, 160, 3], atari_filters());
        assert_eq!(
            config.layer_shapes(),
            vec![[16, 53, 40], [32, 27, 20], [64, 27, 20]]
        );
        assert_eq!(config.out_dim(), 64 * 27 * 20);
    }

    #[test]
    fn valid_padding_on_atari_screen() {
        let config = CnnConfig::new([84, 84, 4], atari_filters()).padding(Padding::Valid);
        assert_eq!(config.out_dim(), 64 * 7 * 7);
    }

    #[test]
    fn filters_from_yaml() -> anyhow::Result<()> {
        let filters: Vec<ConvFilter> =
            serde_yaml::from_str("[[16, [8, 8], 4], [32, [4, 4], 2], [64, [3, 3], 1]]")?;
        assert_eq!(filters, atari_filters());
        Ok(())
    }
}
