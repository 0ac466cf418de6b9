//! Demonstrates the parallel boundary operators over a simulated 4-rank
//! world: a scatter -> gather round trip and a copy/reduce adjoint pair.
//!
//! Run with: cargo run --example parallel_region_demo

use std::sync::Arc;
use std::thread;

use tessera_core::comm::{Collectives, GroupRegistry, LocalWorld, MODEL_PARALLEL_GROUP};
use tessera_core::ops::parallel::{
    copy_to_parallel_region, gather_from_parallel_region, reduce_from_parallel_region,
    scatter_to_parallel_region, ParallelContext,
};
use tessera_core::{Tensor, TesseraError};

const WORLD_SIZE: usize = 4;

fn run_rank(rank: usize, ctx: ParallelContext) -> Result<(), TesseraError> {
    // Every rank starts from the same replicated input.
    let x = Tensor::new((0..16).map(|v| v as f32).collect(), vec![8, 2])?;
    x.requires_grad_(true)?;

    // Scatter: each rank keeps its own shard along dim 0.
    let shard = scatter_to_parallel_region(&ctx, &x, 0)?;
    println!(
        "rank {rank}: shard shape {:?} data {:?}",
        shard.shape(),
        shard.get_f32_data()?
    );

    // Gather: reassemble the full tensor on every rank.
    let whole = gather_from_parallel_region(&ctx, &shard, 0)?;
    assert_eq!(whole.get_f32_data()?, x.get_f32_data()?);
    println!("rank {rank}: gather reconstructed the original tensor");

    // Copy/Reduce adjoint pair: forward identity vs. forward all-reduce.
    let copied = copy_to_parallel_region(&ctx, &x)?;
    let reduced = reduce_from_parallel_region(&ctx, &copied)?;
    println!(
        "rank {rank}: reduce of replicated input = {:?} (= {WORLD_SIZE} * x)",
        &reduced.get_f32_data()?[..4]
    );

    // Drive the backward of the Copy boundary by hand: with a per-rank
    // gradient of `rank + 1`, every rank receives the group sum 1+2+3+4.
    let grad = Tensor::new(vec![(rank + 1) as f32; 16], vec![8, 2])?;
    let grad_fn = copied
        .grad_fn()
        .ok_or_else(|| TesseraError::InternalError("missing grad_fn".to_string()))?;
    let grads = grad_fn.backward(&grad)?;
    println!(
        "rank {rank}: copy backward all-reduced gradient = {:?}",
        &grads[0].get_f32_data()?[..2]
    );
    Ok(())
}

fn main() -> Result<(), TesseraError> {
    let world = LocalWorld::new(WORLD_SIZE);
    let mut registry = GroupRegistry::new();
    registry.register(MODEL_PARALLEL_GROUP, (0..WORLD_SIZE).collect())?;
    let registry = Arc::new(registry);

    let threads: Vec<_> = world
        .handles()
        .into_iter()
        .map(|comm| {
            let rank = comm.rank();
            let ctx = ParallelContext::new(Arc::clone(&registry), Arc::new(comm));
            thread::spawn(move || run_rank(rank, ctx))
        })
        .collect();

    for thread in threads {
        thread
            .join()
            .map_err(|_| TesseraError::InternalError("rank thread panicked".to_string()))??;
    }
    println!("all {WORLD_SIZE} ranks finished");
    Ok(())
}
