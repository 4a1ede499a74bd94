use anyhow::{anyhow, ensure, Result};
use candle_core::Tensor;
use candle_nn::VarMap;
use std::collections::HashMap;

/// A snapshot of the variables in a [`VarMap`].
///
/// Tensors are deep copies, later updates of the variables do not change them.
#[derive(Clone, Debug)]
pub struct NamedTensors {
    /// Copied tensors keyed by variable names.
    pub named_tensors: HashMap<String, Tensor>,
}

impl NamedTensors {
    /// Copies the variables of a [`VarMap`].
    pub fn copy_from(vm: &VarMap) -> Result<Self> {
        let data = vm
            .data()
            .lock()
            .map_err(|_| anyhow!("variable map lock is poisoned"))?;
        let named_tensors = data
            .iter()
            .map(|(name, var)| -> Result<(String, Tensor)> {
                Ok((name.clone(), var.as_tensor().copy()?))
            })
            .collect::<Result<HashMap<_, _>>>()?;

        Ok(Self { named_tensors })
    }

    /// Overwrites the variables of a [`VarMap`] with the same names.
    ///
    /// Fails if the sets of names or the shapes differ.
    pub fn copy_to(&self, vm: &VarMap) -> Result<()> {
        let data = vm
            .data()
            .lock()
            .map_err(|_| anyhow!("variable map lock is poisoned"))?;
        ensure!(
            data.len() == self.named_tensors.len(),
            "{} variables in the destination, {} in the source",
            data.len(),
            self.named_tensors.len()
        );

        for (name, var) in data.iter() {
            let src = self
                .named_tensors
                .get(name)
                .ok_or_else(|| anyhow!("variable {} is not in the source", name))?;
            var.set(&src.to_device(var.device())?)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::NamedTensors;
    use anyhow::Result;
    use candle_core::{DType, Device, Tensor};
    use candle_nn::{linear, Module, VarBuilder, VarMap};

    #[test]
    fn test_named_tensors() -> Result<()> {
        let device = Device::Cpu;
        let x = Tensor::from_slice(&[1f32, 2., 3.], (1, 3), &device)?;

        let vm1 = VarMap::new();
        let model1 = linear(3, 2, VarBuilder::from_varmap(&vm1, DType::F32, &device).pp("l"))?;
        let vm2 = VarMap::new();
        let model2 = linear(3, 2, VarBuilder::from_varmap(&vm2, DType::F32, &device).pp("l"))?;

        let y1: Vec<Vec<f32>> = model1.forward(&x)?.to_vec2()?;
        let y2: Vec<Vec<f32>> = model2.forward(&x)?.to_vec2()?;
        assert_ne!(y1, y2);

        let nt = NamedTensors::copy_from(&vm1)?;
        nt.copy_to(&vm2)?;
        let y3: Vec<Vec<f32>> = model2.forward(&x)?.to_vec2()?;
        assert_eq!(y1, y3);

        // The snapshot is not affected by later updates of the source
        for var in vm1.all_vars() {
            var.set(&var.as_tensor().zeros_like()?)?;
        }
        let w = nt.named_tensors["l.weight"].clone();
        assert!(w.abs()?.sum_all()?.to_scalar::<f32>()? > 0.0);
        Ok(())
    }

    #[test]
    fn test_mismatched_variables() -> Result<()> {
        let device = Device::Cpu;
        let vm1 = VarMap::new();
        linear(3, 2, VarBuilder::from_varmap(&vm1, DType::F32, &device).pp("a"))?;
        let vm2 = VarMap::new();
        linear(3, 2, VarBuilder::from_varmap(&vm2, DType::F32, &device).pp("b"))?;

        assert!(NamedTensors::copy_from(&vm1)?.copy_to(&vm2).is_err());
        Ok(())
    }
}
