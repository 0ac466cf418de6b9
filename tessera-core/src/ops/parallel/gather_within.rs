use std::sync::{Arc, RwLock};

use crate::autograd::{BackwardOp, NodeId};
use crate::error::TesseraError;
use crate::ops::parallel::{attach_grad_fn, ParallelContext};
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;

/// Gathers all ranks' shards along `dim`, for a result that stays logically
/// shared within the parallel region.
///
/// Forward is identical to [`super::gather_from_parallel_region`]; the
/// backward differs: because the gathered result is itself subsequently
/// reduced/shared, the incoming gradient is first all-reduce-summed across
/// the group and only then split along the recorded `dim`, undoing both the
/// implicit reduction and the gather.
pub fn gather_within_parallel_region(
    ctx: &ParallelContext,
    input: &Tensor,
    dim: usize,
) -> Result<Tensor, TesseraError> {
    let group = ctx.group()?;
    let output = ctx.collectives().gather(input, dim, &group)?;

    if input.requires_grad() {
        let grad_fn = GatherWithinBackward {
            ctx: ctx.clone(),
            dim,
            input_node: Arc::clone(&input.data),
        };
        attach_grad_fn(&output, Arc::new(grad_fn));
    }
    Ok(output)
}

#[derive(Debug)]
struct GatherWithinBackward {
    ctx: ParallelContext,
    /// Gather dimension recorded by the forward pass.
    dim: usize,
    input_node: Arc<RwLock<TensorData>>,
}

impl BackwardOp for GatherWithinBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, TesseraError> {
        let group = self.ctx.group()?;
        let collectives = self.ctx.collectives();
        let reduced = collectives.all_reduce_sum(grad_output, &group)?;
        let grad_input = collectives.split(&reduced, self.dim, &group)?;
        Ok(vec![grad_input])
    }

    fn inputs(&self) -> Vec<NodeId> {
        vec![Arc::as_ptr(&self.input_node)]
    }
}
