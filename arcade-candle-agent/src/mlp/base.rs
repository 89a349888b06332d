use super::MlpConfig;
use anyhow::Result;
use candle_core::Tensor;
use candle_nn::{linear, Linear, Module, VarBuilder};

/// Multilayer perceptron with ReLU activation function.
///
/// No activation is applied after the last layer.
pub struct Mlp {
    layers: Vec<Linear>,
}

impl Mlp {
    /// Builds the layers with variables under the prefix of `vb`.
    pub fn build(vb: VarBuilder, config: &MlpConfig) -> Result<Self> {
        let layers = config
            .in_out_pairs()
            .iter()
            .enumerate()
            .map(|(i, &(in_dim, out_dim))| linear(in_dim, out_dim, vb.pp(format!("ln{}", i))))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { layers })
    }
}

impl Module for Mlp {
    fn forward(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        let n_layers = self.layers.len();
        let mut xs = xs.clone();

        for (i, layer) in self.layers.iter().enumerate() {
            xs = layer.forward(&xs)?;
            if i + 1 < n_layers {
                xs = xs.relu()?;
            }
        }

        Ok(xs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};
    use candle_nn::VarMap;

    #[test]
    fn hidden_layers_are_created() -> Result<()> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let mlp = Mlp::build(vb, &MlpConfig::new(5, vec![8, 8], 3))?;
        let ys = mlp.forward(&Tensor::ones((4, 5), DType::F32, &Device::Cpu)?)?;
        assert_eq!(ys.dims(), &[4, 3]);
        // Three layers with weight and bias.
        assert_eq!(varmap.all_vars().len(), 6);
        Ok(())
    }

    #[test]
    fn no_hidden_layer_is_linear() -> Result<()> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let mlp = Mlp::build(vb, &MlpConfig::new(5, vec![], 1))?;
        let ys = mlp.forward(&Tensor::ones((2, 5), DType::F32, &Device::Cpu)?)?;
        assert_eq!(ys.dims(), &[2, 1]);
        assert_eq!(varmap.all_vars().len(), 2);
        Ok(())
    }
}
