//! The seam between this crate and an external differentiation engine.
//!
//! Every boundary operator's forward pass attaches a [`BackwardOp`] to its
//! output tensor; a graph-traversal engine (out of scope here) walks those
//! `grad_fn`s during backpropagation, calling [`BackwardOp::backward`] once
//! per forward invocation and using [`BackwardOp::inputs`] to link nodes.

pub mod backward_op;

pub use backward_op::{BackwardOp, NodeId};
