//! In-process simulated collective backend.
//!
//! [`LocalWorld`] models a fixed-size world of ranks driven from one thread
//! per rank; [`LocalCollectives`] is the per-rank handle implementing
//! [`Collectives`]. Communicating collectives rendezvous on a
//! [`std::sync::Barrier`], reproducing the blocking, group-synchronizing
//! semantics of a real transport: a rank that never enters a collective
//! stalls every other member of the group.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Barrier, Mutex};

use crate::comm::collectives::Collectives;
use crate::comm::group::ParallelGroup;
use crate::comm::helpers::{concat_along_dim, elementwise_sum, split_along_dim};
use crate::error::TesseraError;
use crate::tensor::Tensor;

/// The communicating collective operations, used to tag deposits so that
/// mismatched call sequences across ranks are detected instead of silently
/// combining unrelated tensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CollectiveKind {
    AllReduceSum,
    Gather,
}

impl fmt::Display for CollectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectiveKind::AllReduceSum => write!(f, "all_reduce_sum"),
            CollectiveKind::Gather => write!(f, "gather"),
        }
    }
}

#[derive(Debug, Clone)]
struct Deposit {
    seq: u64,
    kind: CollectiveKind,
    tensor: Tensor,
}

/// Shared state for a simulated world of `size` ranks.
///
/// Each communicating collective runs a two-phase rendezvous:
/// 1. every rank deposits its tensor in its slot, then waits on the
///    barrier (all inputs visible);
/// 2. every rank reads all slots, then waits on the barrier again (no rank
///    can overwrite its slot for the *next* collective before all ranks
///    have read the current one).
#[derive(Debug)]
pub struct LocalWorld {
    size: usize,
    slots: Mutex<Vec<Option<Deposit>>>,
    barrier: Barrier,
}

impl LocalWorld {
    /// Creates a world of `size` ranks.
    pub fn new(size: usize) -> Arc<Self> {
        Arc::new(LocalWorld {
            size,
            slots: Mutex::new(vec![None; size]),
            barrier: Barrier::new(size),
        })
    }

    /// The number of ranks in this world.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Creates one [`LocalCollectives`] handle per rank, in rank order.
    pub fn handles(self: &Arc<Self>) -> Vec<LocalCollectives> {
        (0..self.size)
            .map(|rank| LocalCollectives {
                rank,
                world: Arc::clone(self),
                calls: AtomicU64::new(0),
            })
            .collect()
    }
}

/// Per-rank handle into a [`LocalWorld`].
#[derive(Debug)]
pub struct LocalCollectives {
    rank: usize,
    world: Arc<LocalWorld>,
    /// Number of communicating collectives this rank has issued; deposited
    /// alongside each tensor to catch cross-rank call-order divergence.
    calls: AtomicU64,
}

impl LocalCollectives {
    /// Creates a handle for `rank` within `world`.
    pub fn new(rank: usize, world: Arc<LocalWorld>) -> Result<Self, TesseraError> {
        if rank >= world.size {
            return Err(TesseraError::RankOutOfRange {
                rank,
                world_size: world.size,
            });
        }
        Ok(LocalCollectives {
            rank,
            world,
            calls: AtomicU64::new(0),
        })
    }

    fn check_group(&self, group: &ParallelGroup) -> Result<(), TesseraError> {
        if group.world_size() != self.world.size {
            return Err(TesseraError::GroupMismatch {
                name: group.name().to_string(),
                group_size: group.world_size(),
                world_size: self.world.size,
            });
        }
        Ok(())
    }

    /// Runs the deposit/drain rendezvous and returns every rank's tensor in
    /// rank order.
    fn exchange(
        &self,
        input: &Tensor,
        kind: CollectiveKind,
    ) -> Result<Vec<Tensor>, TesseraError> {
        let seq = self.calls.fetch_add(1, Ordering::SeqCst);
        log::trace!(
            "rank {} entering {} #{} with shape {:?}",
            self.rank,
            kind,
            seq,
            input.shape()
        );

        {
            let mut slots = self
                .world
                .slots
                .lock()
                .map_err(|_| TesseraError::InternalError("slot mutex poisoned".to_string()))?;
            slots[self.rank] = Some(Deposit {
                seq,
                kind,
                tensor: input.detach(),
            });
        }
        self.world.barrier.wait();

        let deposits: Vec<Deposit> = {
            let slots = self
                .world
                .slots
                .lock()
                .map_err(|_| TesseraError::InternalError("slot mutex poisoned".to_string()))?;
            slots
                .iter()
                .map(|s| {
                    s.clone().ok_or_else(|| {
                        TesseraError::InternalError("missing deposit after barrier".to_string())
                    })
                })
                .collect::<Result<_, _>>()?
        };
        // All ranks must finish reading before any rank may start the next
        // collective and overwrite its slot.
        self.world.barrier.wait();

        for (peer, deposit) in deposits.iter().enumerate() {
            if deposit.seq != seq || deposit.kind != kind {
                return Err(TesseraError::CollectiveMismatch {
                    rank: self.rank,
                    peer,
                    local: format!("{} #{}", kind, seq),
                    remote: format!("{} #{}", deposit.kind, deposit.seq),
                });
            }
        }
        Ok(deposits.into_iter().map(|d| d.tensor).collect())
    }
}

impl Collectives for LocalCollectives {
    fn rank(&self) -> usize {
        self.rank
    }

    fn all_reduce_sum(
        &self,
        input: &Tensor,
        group: &ParallelGroup,
    ) -> Result<Tensor, TesseraError> {
        self.check_group(group)?;
        if group.world_size() == 1 {
            // Identity, but under a fresh autograd node: callers attach
            // their own grad_fn to collective outputs.
            return Ok(input.detach());
        }
        let contributions = self.exchange(input, CollectiveKind::AllReduceSum)?;
        elementwise_sum(&contributions)
    }

    fn split(
        &self,
        input: &Tensor,
        dim: usize,
        group: &ParallelGroup,
    ) -> Result<Tensor, TesseraError> {
        self.check_group(group)?;
        if group.world_size() == 1 {
            return Ok(input.detach());
        }
        let mut shards = split_along_dim(input, dim, group.world_size())?;
        Ok(shards.swap_remove(self.rank))
    }

    fn gather(
        &self,
        input: &Tensor,
        dim: usize,
        group: &ParallelGroup,
    ) -> Result<Tensor, TesseraError> {
        self.check_group(group)?;
        if group.world_size() == 1 {
            return Ok(input.detach());
        }
        let shards = self.exchange(input, CollectiveKind::Gather)?;
        concat_along_dim(&shards, dim)
    }
}
