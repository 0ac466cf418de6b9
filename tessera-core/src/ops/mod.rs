//! Tensor operations. Currently the only family is [`parallel`], the
//! differentiable boundary operators for tensor-parallel computation.
//!
//! Each operation follows the same structure: a forward function performs
//! the data movement and, when the input requires gradients, attaches a
//! `Backward` struct implementing
//! [`BackwardOp`](crate::autograd::BackwardOp) to the output. The
//! `Backward` struct carries the per-call context (the parallel context
//! and, for dimension-indexed operations, the recorded `dim`) from the
//! forward invocation to the backward one.

pub mod parallel;
