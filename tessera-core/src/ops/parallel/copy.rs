use std::sync::{Arc, RwLock};

use crate::autograd::{BackwardOp, NodeId};
use crate::error::TesseraError;
use crate::ops::parallel::{attach_grad_fn, ParallelContext};
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;

/// Passes `input` into the parallel region.
///
/// Forward: identity — the input is logically replicated across the group,
/// so every rank already holds the full tensor. Backward: all-reduce-sum of
/// the incoming gradient, folding every replica's contribution back into
/// the single logical source.
pub fn copy_to_parallel_region(
    ctx: &ParallelContext,
    input: &Tensor,
) -> Result<Tensor, TesseraError> {
    // Identity forward: alias the input buffer under fresh autograd
    // metadata so a grad_fn can be attached without touching the leaf.
    let guard = input.read_data();
    let view = TensorData::new_view(
        Arc::clone(&guard.buffer),
        guard.shape.clone(),
        guard.strides.clone(),
        guard.offset,
    );
    let requires_grad = guard.requires_grad;
    drop(guard);

    let output = Tensor {
        data: Arc::new(RwLock::new(view)),
    };

    if requires_grad {
        let grad_fn = CopyBackward {
            ctx: ctx.clone(),
            input_node: Arc::clone(&input.data),
        };
        attach_grad_fn(&output, Arc::new(grad_fn));
    }
    Ok(output)
}

#[derive(Debug)]
struct CopyBackward {
    ctx: ParallelContext,
    input_node: Arc<RwLock<TensorData>>,
}

impl BackwardOp for CopyBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, TesseraError> {
        let group = self.ctx.group()?;
        let grad_input = self.ctx.collectives().all_reduce_sum(grad_output, &group)?;
        Ok(vec![grad_input])
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
    fn test_forward_is_identity_sharing_storage() {
        let ctx = single_rank_context();
        let x = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]);
        let y = copy_to_parallel_region(&ctx, &x).unwrap();
        check_tensor_near(&y, &[2, 2], &[1.0, 2.0, 3.0, 4.0], 0.0);
        let x_guard = x.read_data();
        let y_guard = y.read_data();
        assert_eq!(Arc::as_ptr(&x_guard.buffer), Arc::as_ptr(&y_guard.buffer));
    }

    #[test]
    fn test_no_grad_fn_without_requires_grad() {
        let ctx = single_rank_context();
        let x = create_test_tensor(vec![1.0], vec![1]);
        let y = copy_to_parallel_region(&ctx, &x).unwrap();
        assert!(!y.requires_grad());
        assert!(y.grad_fn().is_none());
    }

    #[test]
    fn test_grad_fn_links_to_input() {
        let ctx = single_rank_context();
        let x = create_test_tensor_with_grad(vec![1.0, 2.0], vec![2]);
        let y = copy_to_parallel_region(&ctx, &x).unwrap();
        assert!(y.requires_grad());
        let grad_fn = y.grad_fn().unwrap();
        assert_eq!(grad_fn.inputs(), vec![x.node_id()]);
        // The input itself stays a leaf.
        assert!(x.grad_fn().is_none());
    }

    #[test]
    fn test_backward_single_rank_is_identity() {
        let ctx = single_rank_context();
        let x = create_test_tensor_with_grad(vec![1.0, 2.0], vec![2]);
        let y = copy_to_parallel_region(&ctx, &x).unwrap();
        let g = create_test_tensor(vec![0.5, -1.5], vec![2]);
        let grads = y.grad_fn().unwrap().backward(&g).unwrap();
        assert_eq!(grads.len(), 1);
        check_tensor_near(&grads[0], &[2], &[0.5, -1.5], 0.0);
    }
}
