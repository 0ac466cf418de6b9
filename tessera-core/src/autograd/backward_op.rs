use std::fmt::Debug;
use std::sync::RwLock;

use crate::error::TesseraError;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;

/// Stable identity of a tensor's data node within a computation graph.
///
/// Raw pointers to the shared `TensorData` survive `Tensor` handle clones
/// and drops, making them suitable as `HashMap` keys in an external
/// differentiation engine. Their validity relies on the corresponding
/// `Arc`s being kept alive for the duration of the backward pass, which the
/// `Backward` structs guarantee by holding strong references to their
/// inputs.
pub type NodeId = *const RwLock<TensorData>;

/// Interface for the backward pass of a differentiable operation.
///
/// Any operation that produces a non-leaf `Tensor` stores an implementation
/// of this trait in the output's `grad_fn` field. For the parallel boundary
/// operators, `backward` is the mathematical adjoint of the forward data
/// movement: the all-reduce dual of a copy, the gather dual of a split, and
/// so on. Per-call context (such as the dimension recorded by Scatter and
/// Gather) lives in the implementing struct, scoped to one
/// forward/backward pair.
///
/// `Debug + Send + Sync` bounds are required because the
/// `Arc<dyn BackwardOp>` may be shared across threads during the backward
/// pass.
pub trait BackwardOp: Debug + Send + Sync {
    /// Computes the gradients of the operation's inputs given the gradient
    /// of its output.
    ///
    /// Must be called exactly once per forward invocation per
    /// differentiation pass. The returned gradients are ordered to match
    /// [`BackwardOp::inputs`]. Failures from the collective layer propagate
    /// unmodified.
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, TesseraError>;

    /// Returns the identities of the input nodes that participated in the
    /// forward pass, in the same order as the gradients returned by
    /// [`BackwardOp::backward`].
    fn inputs(&self) -> Vec<NodeId>;
}
