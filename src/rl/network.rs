//! Function approximator.
//!
//! Maps observations to a scalar action score and a scalar value estimate.
//! The agent only relies on the [`Approximator`] contract: a batched forward
//! pass over a `[batch, input_dim]` tensor plus the trainable variables the
//! optimizer updates. Gradients come from candle's autograd.
//!
//! The default implementation is a small two-hidden-layer MLP with a shared
//! trunk, kept small so the problem formulation, not model capacity,
//! drives behaviour.

use std::fmt::Debug;

use candle_core::{DType, Device, Tensor, Var};
use candle_nn::{Linear, Module};
use rand::Rng;

/// Single-observation outputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproxOutput {
    /// Action score (broadcast into logits by the agent).
    pub score: f64,
    /// State value estimate.
    pub value: f64,
}

/// A differentiable observation -> (score, value) function.
pub trait Approximator: Debug {
    /// Expected observation length.
    fn input_dim(&self) -> usize;

    /// Device the variables live on.
    fn device(&self) -> &Device;

    /// `[batch, input_dim]` -> (scores `[batch]`, values `[batch]`), tracked for autograd.
    fn forward_batch(&self, inputs: &Tensor) -> candle_core::Result<(Tensor, Tensor)>;

    /// Trainable variables, handed to the optimizer once.
    fn vars(&self) -> Vec<Var>;

    /// Evaluates one observation.
    fn forward(&self, input: &[f64]) -> candle_core::Result<ApproxOutput> {
        let x = Tensor::from_slice(input, (1, input.len()), self.device())?;
        let (score, value) = self.forward_batch(&x)?;
        Ok(ApproxOutput {
            score: score.squeeze(0)?.to_scalar::<f64>()?,
            value: value.squeeze(0)?.to_scalar::<f64>()?,
        })
    }
}

/// Shared-trunk MLP with a policy head and a value head.
///
/// `input -> [Linear -> ReLU] x hidden -> {policy head (1), value head (1)}`
///
/// Weights and biases start uniform in `±1/sqrt(fan_in)`, drawn from the
/// caller's RNG so runs are reproducible.
#[derive(Debug)]
pub struct PolicyValueNet {
    input_dim: usize,
    device: Device,
    hidden: Vec<Linear>,
    policy_head: Linear,
    value_head: Linear,
    vars: Vec<Var>,
}

impl PolicyValueNet {
    /// Builds a network with the given hidden widths on the CPU.
    pub fn new<R: Rng>(
        input_dim: usize,
        hidden_dims: &[usize],
        rng: &mut R,
    ) -> candle_core::Result<Self> {
        let device = Device::Cpu;
        let mut vars = Vec::with_capacity(2 * (hidden_dims.len() + 2));
        let mut hidden = Vec::with_capacity(hidden_dims.len());
        let mut last = input_dim;
        for &width in hidden_dims {
            hidden.push(seeded_linear(last, width, rng, &device, &mut vars)?);
            last = width;
        }
        let policy_head = seeded_linear(last, 1, rng, &device, &mut vars)?;
        let value_head = seeded_linear(last, 1, rng, &device, &mut vars)?;
        Ok(Self {
            input_dim,
            device,
            hidden,
            policy_head,
            value_head,
            vars,
        })
    }

    /// Total number of trainable scalars.
    pub fn num_parameters(&self) -> usize {
        self.vars.iter().map(|v| v.elem_count()).sum()
    }
}

fn seeded_linear<R: Rng>(
    in_dim: usize,
    out_dim: usize,
    rng: &mut R,
    device: &Device,
    vars: &mut Vec<Var>,
) -> candle_core::Result<Linear> {
    let bound = 1.0 / (in_dim.max(1) as f64).sqrt();
    let mut uniform = |n: usize| -> Vec<f64> {
        (0..n).map(|_| rng.random_range(-bound..bound)).collect()
    };
    let weight = Var::from_tensor(&Tensor::from_vec(
        uniform(in_dim * out_dim),
        (out_dim, in_dim),
        device,
    )?)?;
    let bias = Var::from_tensor(&Tensor::from_vec(uniform(out_dim), out_dim, device)?)?;
    let layer = Linear::new(weight.as_tensor().clone(), Some(bias.as_tensor().clone()));
    vars.push(weight);
    vars.push(bias);
    Ok(layer)
}

impl Approximator for PolicyValueNet {
    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn device(&self) -> &Device {
        &self.device
    }

    fn forward_batch(&self, inputs: &Tensor) -> candle_core::Result<(Tensor, Tensor)> {
        let mut x = inputs.to_dtype(DType::F64)?;
        for layer in &self.hidden {
            x = layer.forward(&x)?.relu()?;
        }
        let score = self.policy_head.forward(&x)?.squeeze(1)?;
        let value = self.value_head.forward(&x)?.squeeze(1)?;
        Ok((score, value))
    }

    fn vars(&self) -> Vec<Var> {
        self.vars.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn net(seed: u64) -> PolicyValueNet {
        let mut rng = StdRng::seed_from_u64(seed);
        PolicyValueNet::new(3, &[8, 8], &mut rng).unwrap()
    }

    #[test]
    fn test_output_shape_and_determinism() {
        let a = net(1);
        let b = net(1);
        let x = [2.0, 0.5, 1.0];
        let out = a.forward(&x).unwrap();
        assert!(out.score.is_finite());
        assert!(out.value.is_finite());
        assert_eq!(out, b.forward(&x).unwrap());
        assert_ne!(out, net(2).forward(&x).unwrap());
        assert_eq!(a.input_dim(), 3);
        assert_eq!(a.num_parameters(), (3 * 8 + 8) + (8 * 8 + 8) + (8 + 1) * 2);
        assert_eq!(a.vars().len(), 8);
    }

    #[test]
    fn test_batch_rows_match_single_forward() {
        let n = net(3);
        let rows = [[0.0, 0.0, 3.0], [4.0, 0.25, 0.0], [9.0, 1.0, 1.0]];
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        let x = Tensor::from_vec(flat, (3, 3), n.device()).unwrap();
        let (scores, values) = n.forward_batch(&x).unwrap();
        assert_eq!(scores.dims(), &[3]);
        assert_eq!(values.dims(), &[3]);

        let scores = scores.to_vec1::<f64>().unwrap();
        let values = values.to_vec1::<f64>().unwrap();
        for (i, row) in rows.iter().enumerate() {
            let single = n.forward(row).unwrap();
            assert!((scores[i] - single.score).abs() < 1e-12);
            assert!((values[i] - single.value).abs() < 1e-12);
        }
    }

    #[test]
    fn test_value_loss_reaches_value_head() {
        let n = net(4);
        let x = Tensor::from_vec(vec![2.0, 0.0, 1.0], (1, 3), n.device()).unwrap();
        let (_, value) = n.forward_batch(&x).unwrap();
        let grads = value.sum_all().unwrap().backward().unwrap();

        let vars = n.vars();
        // Order: hidden0 (w, b), hidden1 (w, b), policy head (w, b), value head (w, b).
        let value_bias = grads.get(vars[7].as_tensor()).unwrap();
        assert!((value_bias.to_vec1::<f64>().unwrap()[0] - 1.0).abs() < 1e-12);
        assert!(grads.get(vars[5].as_tensor()).is_none());
    }
}
