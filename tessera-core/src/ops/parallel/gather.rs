use std::sync::{Arc, RwLock};

use crate::autograd::{BackwardOp, NodeId};
use crate::error::TesseraError;
use crate::ops::parallel::{attach_grad_fn, ParallelContext};
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;

/// Gathers all ranks' shards along `dim` into the full tensor.
///
/// Exact inverse of [`super::scatter_to_parallel_region`]: the backward
/// pass splits the incoming full gradient along the recorded `dim` and
/// keeps only this rank's shard.
pub fn gather_from_parallel_region(
    ctx: &ParallelContext,
    input: &Tensor,
    dim: usize,
) -> Result<Tensor, TesseraError> {
    let group = ctx.group()?;
    let output = ctx.collectives().gather(input, dim, &group)?;

    if input.requires_grad() {
        let grad_fn = GatherBackward {
            ctx: ctx.clone(),
            dim,
            input_node: Arc::clone(&input.data),
        };
        attach_grad_fn(&output, Arc::new(grad_fn));
    }
    Ok(output)
}

#[derive(Debug)]
struct GatherBackward {
    ctx: ParallelContext,
    /// Gather dimension recorded by the forward pass.
    dim: usize,
    input_node: Arc<RwLock<TensorData>>,
}

impl BackwardOp for GatherBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, TesseraError> {
        let group = self.ctx.group()?;
        let grad_input = self.ctx.collectives().split(grad_output, self.dim, &group)?;
        Ok(vec![grad_input])
    }

    fn inputs(&self) -> Vec<NodeId> {
        vec![Arc::as_ptr(&self.input_node)]
    }
}
