//! # Tessera Core
//!
//! Differentiable boundary operators for tensor-parallel (model-parallel)
//! computation. Each operator in [`ops::parallel`] marks a point where a
//! partitioned tensor computation crosses a parallel-group boundary and
//! pairs a forward data movement (copy, reduce, scatter, gather) with the
//! adjoint gradient movement required for the backward pass.
//!
//! The collective transport and the group topology are reached through the
//! seams in [`comm`]; an in-process simulated backend
//! ([`comm::local::LocalWorld`]) is provided for tests and examples.

pub mod autograd;
pub mod comm;
pub mod ops;
pub mod tensor;
pub mod tensor_data;
pub mod utils;

pub mod error;

// Re-export the core handle types at the crate root.
pub use error::TesseraError;
pub use tensor::Tensor;
