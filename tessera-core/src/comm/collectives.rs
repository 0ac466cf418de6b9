use std::fmt::Debug;

use crate::comm::group::ParallelGroup;
use crate::error::TesseraError;
use crate::tensor::Tensor;

/// The collective primitives the boundary operators are built on.
///
/// One implementor handle exists per rank; `rank()` identifies the calling
/// rank within the group. `all_reduce_sum` and `gather` are blocking,
/// group-synchronizing calls: they return only once every member of
/// `group` has entered the same collective, so a slow or absent peer
/// stalls every other member. All ranks must issue collectives in the same
/// relative order; that obligation lies with the caller.
///
/// With a size-1 group every primitive degenerates to the identity and
/// performs no synchronization.
///
/// Returned tensors may share storage with the input but must never share
/// its autograd node: the boundary operators attach their own `grad_fn` to
/// collective outputs, and a leaf input must stay a leaf.
pub trait Collectives: Debug + Send + Sync {
    /// The calling rank's position within the group.
    fn rank(&self) -> usize;

    /// Sums `input` elementwise across all ranks in `group` and returns the
    /// summed tensor (same shape) to every rank.
    fn all_reduce_sum(
        &self,
        input: &Tensor,
        group: &ParallelGroup,
    ) -> Result<Tensor, TesseraError>;

    /// Partitions `input` along `dim` into `group.world_size()` equal
    /// shards and returns this rank's shard. Purely local; no
    /// communication.
    fn split(
        &self,
        input: &Tensor,
        dim: usize,
        group: &ParallelGroup,
    ) -> Result<Tensor, TesseraError>;

    /// Concatenates all ranks' `input` shards along `dim`, in rank order,
    /// and returns the full tensor to every rank.
    fn gather(
        &self,
        input: &Tensor,
        dim: usize,
        group: &ParallelGroup,
    ) -> Result<Tensor, TesseraError>;
}
