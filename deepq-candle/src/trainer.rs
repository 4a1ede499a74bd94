//! Optimization step of the online network.
//!
//! The predicted values of the taken actions are regressed towards Bellman
//! targets with the Huber loss. Gradients are clipped by their global norm
//! before the optimizer updates the parameters.
use crate::opt::Optimizer;
use anyhow::Result;
use candle_core::{backprop::GradStore, DType, Tensor, Var, D};
use candle_nn::encoding::one_hot;
use log::trace;

/// Selects the value of the taken action in each row of `q`.
///
/// `q` has shape `(batch, num_actions)` and `act` holds `u32` action indices of
/// shape `(batch,)`. The values are picked with a one-hot mask so that
/// gradients flow only through the taken actions.
pub fn action_values(q: &Tensor, act: &Tensor) -> Result<Tensor> {
    let num_actions = q.dim(D::Minus1)?;
    let mask = one_hot(act.clone(), num_actions, 1f32, 0f32)?.to_dtype(q.dtype())?;
    Ok(q.mul(&mask)?.sum(D::Minus1)?)
}

/// Huber loss with `delta = 1`, averaged over elements.
pub fn huber_loss(pred: &Tensor, tgt: &Tensor) -> Result<Tensor> {
    let d = (pred - tgt)?.abs()?;
    let m1 = d.lt(1.0)?.to_dtype(pred.dtype())?;
    let m2 = m1.affine(-1.0, 1.0)?;
    let quadratic = m1.mul(&d.sqr()?)?.affine(0.5, 0.0)?;
    let linear = m2.mul(&d.affine(1.0, -0.5)?)?;
    Ok((quadratic + linear)?.mean_all()?)
}

/// Rescales gradients of `vars` so that their global norm does not exceed `max_norm`.
///
/// Returns the global norm before clipping.
pub fn clip_grad_norm(grads: &mut GradStore, vars: &[Var], max_norm: f64) -> Result<f64> {
    let mut sum_sq = 0f64;
    for var in vars {
        if let Some(g) = grads.get(var) {
            sum_sq += g.sqr()?.sum_all()?.to_dtype(DType::F64)?.to_scalar::<f64>()?;
        }
    }
    let norm = sum_sq.sqrt();

    if norm > max_norm {
        let scale = max_norm / norm;
        for var in vars {
            if let Some(g) = grads.remove(var) {
                let _ = grads.insert(var, g.affine(scale, 0.0)?);
            }
        }
    }

    Ok(norm)
}

/// Updates the online network, the only place its parameters change.
pub struct Trainer {
    opt: Optimizer,
    clip_grad_norm: Option<f64>,
}

impl Trainer {
    /// Constructs with an optimizer and the maximum global norm of gradients.
    pub fn new(opt: Optimizer, clip_grad_norm: Option<f64>) -> Self {
        Self {
            opt,
            clip_grad_norm,
        }
    }

    /// Performs one optimization step and returns the loss.
    ///
    /// `q` is the output of the online network with gradient tracking on the
    /// batch of observations, `act` the taken actions and `tgt` the targets.
    pub fn step(&mut self, q: &Tensor, act: &Tensor, tgt: &Tensor, vars: &[Var]) -> Result<f32> {
        let pred = action_values(q, act)?;
        let loss = huber_loss(&pred, &tgt.detach())?;
        let mut grads = loss.backward()?;

        if let Some(max_norm) = self.clip_grad_norm {
            let norm = clip_grad_norm(&mut grads, vars, max_norm)?;
            trace!("gradient norm {}", norm);
        }
        self.opt.step(&grads)?;

        Ok(loss.to_dtype(DType::F32)?.to_scalar::<f32>()?)
    }
}
