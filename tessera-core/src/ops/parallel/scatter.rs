use std::sync::{Arc, RwLock};

use crate::autograd::{BackwardOp, NodeId};
use crate::error::TesseraError;
use crate::ops::parallel::{attach_grad_fn, ParallelContext};
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;

/// Splits `input` along `dim` and keeps only this rank's shard.
///
/// The dimension is recorded in the call's backward context: the backward
/// pass gathers the per-shard gradients from all ranks along the same
/// `dim`, reassembling the full gradient that the forward discarded.
pub fn scatter_to_parallel_region(
    ctx: &ParallelContext,
    input: &Tensor,
    dim: usize,
) -> Result<Tensor, TesseraError> {
    let group = ctx.group()?;
    let output = ctx.collectives().split(input, dim, &group)?;

    if input.requires_grad() {
        let grad_fn = ScatterBackward {
            ctx: ctx.clone(),
            dim,
            input_node: Arc::clone(&input.data),
        };
        attach_grad_fn(&output, Arc::new(grad_fn));
    }
    Ok(output)
}

#[derive(Debug)]
struct ScatterBackward {
    ctx: ParallelContext,
    /// Split dimension recorded by the forward pass.
    dim: usize,
    input_node: Arc<RwLock<TensorData>>,
}

impl BackwardOp for ScatterBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, TesseraError> {
        let group = self.ctx.group()?;
        let grad_input = self.ctx.collectives().gather(grad_output, self.dim, &group)?;
        Ok(vec![grad_input])
    }

    fn inputs(&self) -> Vec<NodeId> {
        vec![Arc::as_ptr(&self.input_node)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::parallel::test_support::{context_for, single_rank_context};
    use crate::utils::testing::{check_tensor_near, create_test_tensor, create_test_tensor_with_grad};

    #[test]
    fn test_forward_returns_own_shard() {
        // Split is purely local, so both ranks can run on one thread.
        let ctxs = context_for(2);
        let x = create_test_tensor((1..=8).map(|v| v as f32).collect(), vec![4, 2]);
        let s0 = scatter_to_parallel_region(&ctxs[0], &x, 0).unwrap();
        let s1 = scatter_to_parallel_region(&ctxs[1], &x, 0).unwrap();
        check_tensor_near(&s0, &[2, 2], &[1.0, 2.0, 3.0, 4.0], 0.0);
        check_tensor_near(&s1, &[2, 2], &[5.0, 6.0, 7.0, 8.0], 0.0);
    }

    #[test]
    fn test_forward_along_dim1() {
        let ctxs = context_for(2);
        let x = create_test_tensor((1..=8).map(|v| v as f32).collect(), vec![2, 4]);
        let s1 = scatter_to_parallel_region(&ctxs[1], &x, 1).unwrap();
        check_tensor_near(&s1, &[2, 2], &[3.0, 4.0, 7.0, 8.0], 0.0);
    }

    #[test]
    fn test_uneven_split_propagates_error() {
        let ctxs = context_for(2);
        let x = create_test_tensor(vec![1.0, 2.0, 3.0], vec![3]);
        let err = scatter_to_parallel_region(&ctxs[0], &x, 0).unwrap_err();
        assert_eq!(err, TesseraError::UnevenSplit { dim_size: 3, parts: 2 });
    }

    #[test]
    fn test_single_rank_degenerates_to_identity() {
        let ctx = single_rank_context();
        let x = create_test_tensor_with_grad(vec![1.0, 2.0], vec![2]);
        let y = scatter_to_parallel_region(&ctx, &x, 0).unwrap();
        check_tensor_near(&y, &[2], &[1.0, 2.0], 0.0);
        let g = create_test_tensor(vec![7.0, 8.0], vec![2]);
        let grads = y.grad_fn().unwrap().backward(&g).unwrap();
        check_tensor_near(&grads[0], &[2], &[7.0, 8.0], 0.0);
    }

    #[test]
    fn test_grad_fn_links_to_input() {
        let ctxs = context_for(2);
        let x = create_test_tensor_with_grad(vec![1.0, 2.0, 3.0, 4.0], vec![4]);
        let y = scatter_to_parallel_region(&ctxs[0], &x, 0).unwrap();
        assert!(y.requires_grad());
        assert_eq!(y.grad_fn().unwrap().inputs(), vec![x.node_id()]);
    }
}
