//! Differentiable boundary operators for the tensor-parallel (matmul
//! parallel) region.
//!
//! Five forward/backward pairs, each the mathematical adjoint of its
//! partner:
//!
//! | Operation | Forward | Backward |
//! |---|---|---|
//! | [`copy_to_parallel_region`] | identity | all-reduce-sum |
//! | [`reduce_from_parallel_region`] | all-reduce-sum | identity |
//! | [`scatter_to_parallel_region`] | split along `dim` | gather along recorded `dim` |
//! | [`gather_from_parallel_region`] | gather along `dim` | split along recorded `dim` |
//! | [`gather_within_parallel_region`] | gather along `dim` | all-reduce-sum, then split along recorded `dim` |
//!
//! All ranks in the group must invoke these operators in the same relative
//! order: the underlying collectives are group-synchronizing. That ordering
//! is a caller obligation (the simulated backend detects divergence, a real
//! transport may not).

use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::comm::collectives::Collectives;
use crate::comm::group::{GroupRegistry, ParallelGroup, MODEL_PARALLEL_GROUP};
use crate::error::TesseraError;
use crate::tensor::Tensor;

mod copy;
mod gather;
mod gather_within;
mod reduce;
mod scatter;

pub use copy::copy_to_parallel_region;
pub use gather::gather_from_parallel_region;
pub use gather_within::gather_within_parallel_region;
pub use reduce::reduce_from_parallel_region;
pub use scatter::scatter_to_parallel_region;

/// The capabilities a boundary operator needs: the group registry and this
/// rank's collective backend, both injected explicitly.
///
/// Cloneable so the `Backward` structs can capture it; a clone shares the
/// underlying registry and backend.
#[derive(Debug, Clone)]
pub struct ParallelContext {
    registry: Arc<GroupRegistry>,
    collectives: Arc<dyn Collectives>,
    group_name: String,
}

impl ParallelContext {
    /// Creates a context over the conventional
    /// [`MODEL_PARALLEL_GROUP`] group.
    pub fn new(registry: Arc<GroupRegistry>, collectives: Arc<dyn Collectives>) -> Self {
        Self::with_group(registry, collectives, MODEL_PARALLEL_GROUP)
    }

    /// Creates a context over an arbitrary registered group.
    pub fn with_group(
        registry: Arc<GroupRegistry>,
        collectives: Arc<dyn Collectives>,
        group_name: &str,
    ) -> Self {
        ParallelContext {
            registry,
            collectives,
            group_name: group_name.to_string(),
        }
    }

    /// This rank's position within the group.
    pub fn rank(&self) -> usize {
        self.collectives.rank()
    }

    /// Resolves the context's group. Resolution failure
    /// ([`TesseraError::GroupNotFound`]) propagates to the operator caller.
    pub fn group(&self) -> Result<Arc<ParallelGroup>, TesseraError> {
        self.registry.lookup(&self.group_name)
    }

    /// The collective backend for this rank.
    pub fn collectives(&self) -> &dyn Collectives {
        self.collectives.as_ref()
    }
}

/// Marks `output` as requiring gradients and installs its grad_fn.
pub(crate) fn attach_grad_fn(output: &Tensor, grad_fn: Arc<dyn BackwardOp + Send + Sync>) {
    let mut guard = output.write_data();
    guard.grad_fn = Some(grad_fn);
    guard.requires_grad = true;
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::comm::local::LocalWorld;

    /// Builds a single-rank context backed by a fresh world and registry.
    pub(crate) fn single_rank_context() -> ParallelContext {
        context_for(1).pop().unwrap()
    }

    /// Builds one context per rank for a world of `world_size`, all sharing
    /// one registry with the model-parallel group registered.
    pub(crate) fn context_for(world_size: usize) -> Vec<ParallelContext> {
        let world = LocalWorld::new(world_size);
        let mut registry = GroupRegistry::new();
        registry
            .register(MODEL_PARALLEL_GROUP, (0..world_size).collect())
            .unwrap();
        let registry = Arc::new(registry);
        world
            .handles()
            .into_iter()
            .map(|comm| ParallelContext::new(Arc::clone(&registry), Arc::new(comm)))
            .collect()
    }
}
