use super::{CnnConfig, Padding};
use crate::{error::AgentError, Activation};
use anyhow::Result;
use candle_core::Tensor;
use candle_nn::{init, Conv2d, Conv2dConfig, Init, Module, VarBuilder};

struct ConvLayer {
    conv: Conv2d,
    // (top, bottom, left, right)
    pad: Option<(usize, usize, usize, usize)>,
}

impl ConvLayer {
    fn forward(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        let xs = match self.pad {
            Some((t, b, l, r)) => xs.pad_with_zeros(2, t, b)?.pad_with_zeros(3, l, r)?,
            None => xs.clone(),
        };
        self.conv.forward(&xs)
    }
}

/// Convolutional encoder taking images of shape `[batch, height, width, channels]`.
///
/// The output is flattened to `[batch, out_dim]`.
pub struct Cnn {
    layers: Vec<ConvLayer>,
    activation: Activation,
    out_dim: usize,
}

impl Cnn {
    /// Builds the layers with variables under the prefix of `vb`.
    pub fn build(vb: VarBuilder, config: &CnnConfig) -> Result<Self> {
        let mut in_channels = config.in_shape[2];
        let (mut h, mut w) = (config.in_shape[0], config.in_shape[1]);
        let mut layers = Vec::with_capacity(config.conv_filters.len());

        for (i, f) in config.conv_filters.iter().enumerate() {
            let [kh, kw] = f.kernel();
            if f.stride() == 0 || kh == 0 || kw == 0 || f.out_channels() == 0 {
                return Err(AgentError::InvalidConfig(format!("conv filter {:?}", f)).into());
            }
            let (out_h, t, b) = config.padding.apply(h, kh, f.stride());
            let (out_w, l, r) = config.padding.apply(w, kw, f.stride());
            if config.padding == Padding::Valid && (h < kh || w < kw) {
                return Err(AgentError::InvalidConfig(format!(
                    "kernel {:?} is larger than input {}x{}",
                    f.kernel(),
                    h,
                    w
                ))
                .into());
            }

            let vb = vb.pp(format!("c{}", i));
            let weight = vb.get_with_hints(
                (f.out_channels(), in_channels, kh, kw),
                "weight",
                init::DEFAULT_KAIMING_NORMAL,
            )?;
            let bound = 1. / ((in_channels * kh * kw) as f64).sqrt();
            let bias = vb.get_with_hints(
                f.out_channels(),
                "bias",
                Init::Uniform {
                    lo: -bound,
                    up: bound,
                },
            )?;
            let conv = Conv2d::new(
                weight,
                Some(bias),
                Conv2dConfig {
                    stride: f.stride(),
                    ..Default::default()
                },
            );
            let pad = match (t, b, l, r) {
                (0, 0, 0, 0) => None,
                p => Some(p),
            };
            layers.push(ConvLayer { conv, pad });

            in_channels = f.out_channels();
            h = out_h;
            w = out_w;
        }

        Ok(Self {
            layers,
            activation: config.activation,
            out_dim: config.out_dim(),
        })
    }

    /// Dimension of the flattened output.
    pub fn out_dim(&self) -> usize {
        self.out_dim
    }
}

impl Module for Cnn {
    fn forward(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        // HWC to CHW
        let mut xs = xs.permute((0, 3, 1, 2))?.contiguous()?;
        for layer in self.layers.iter() {
            xs = self.activation.forward(&layer.forward(&xs)?)?;
        }
        xs.flatten_from(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cnn::ConvFilter;
    use candle_core::{DType, Device};
    use candle_nn::VarMap;

    #[test]
    fn output_matches_configured_dim() -> Result<()> {
        let config = CnnConfig::new(
            [10, 8, 3],
            vec![ConvFilter(4, [3, 3], 2), ConvFilter(6, [2, 3], 1)],
        );
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let cnn = Cnn::build(vb.pp("enc"), &config)?;

        let xs = Tensor::zeros((2, 10, 8, 3), DType::F32, &Device::Cpu)?;
        let ys = cnn.forward(&xs)?;
        assert_eq!(ys.dims(), &[2, cnn.out_dim()]);
        assert_eq!(cnn.out_dim(), 6 * 5 * 4);
        assert_eq!(varmap.all_vars().len(), 4);
        Ok(())
    }

    #[test]
    fn zero_stride_is_rejected() {
        let config = CnnConfig::new([10, 8, 3], vec![ConvFilter(4, [3, 3], 0)]);
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        assert!(Cnn::build(vb, &config).is_err());
    }
}
