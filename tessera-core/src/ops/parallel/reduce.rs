use std::sync::{Arc, RwLock};

use crate::autograd::{BackwardOp, NodeId};
use crate::error::TesseraError;
use crate::ops::parallel::{attach_grad_fn, ParallelContext};
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;

/// All-reduces `input` out of the parallel region.
///
/// Forward: all-reduce-sum across the group, so every rank ends up with the
/// combined result. Backward: identity — the output is replicated, so each
/// rank receives the summed gradient unchanged. Exact inverse of
/// [`super::copy_to_parallel_region`].
pub fn reduce_from_parallel_region(
    ctx: &ParallelContext,
    input: &Tensor,
) -> Result<Tensor, TesseraError> {
    let group = ctx.group()?;
    let output = ctx.collectives().all_reduce_sum(input, &group)?;

    if input.requires_grad() {
        let grad_fn = ReduceBackward {
            input_node: Arc::clone(&input.data),
        };
        attach_grad_fn(&output, Arc::new(grad_fn));
    }
    Ok(output)
}

#[derive(Debug)]
struct ReduceBackward {
    input_node: Arc<RwLock<TensorData>>,
}

impl BackwardOp for ReduceBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, TesseraError> {
        // Identity: each rank receives the incoming gradient unchanged.
        Ok(vec![grad_output.clone()])
    }

    fn inputs(&self) -> Vec<NodeId> {
        vec![Arc::as_ptr(&self.input_node)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::parallel::test_support::single_rank_context;
    use crate::utils::testing::{check_tensor_near, create_test_tensor, create_test_tensor_with_grad};

    #[test]
    fn test_forward_single_rank_is_identity() {
        let ctx = single_rank_context();
        let x = create_test_tensor(vec![3.0, -1.0], vec![2]);
        let y = reduce_from_parallel_region(&ctx, &x).unwrap();
        check_tensor_near(&y, &[2], &[3.0, -1.0], 0.0);
        // Output is a fresh node, even for the degenerate identity.
        assert_ne!(x.node_id(), y.node_id());
    }

    #[test]
    fn test_backward_is_identity() {
        let ctx = single_rank_context();
        let x = create_test_tensor_with_grad(vec![1.0, 2.0], vec![2]);
        let y = reduce_from_parallel_region(&ctx, &x).unwrap();
        assert!(y.requires_grad());
        let g = create_test_tensor(vec![4.0, 5.0], vec![2]);
        let grads = y.grad_fn().unwrap().backward(&g).unwrap();
        assert_eq!(grads.len(), 1);
        check_tensor_near(&grads[0], &[2], &[4.0, 5.0], 0.0);
    }

    #[test]
    fn test_grad_fn_links_to_input() {
        let ctx = single_rank_context();
        let x = create_test_tensor_with_grad(vec![1.0], vec![1]);
        let y = reduce_from_parallel_region(&ctx, &x).unwrap();
        assert_eq!(y.grad_fn().unwrap().inputs(), vec![x.node_id()]);
        assert!(x.grad_fn().is_none());
    }
}
