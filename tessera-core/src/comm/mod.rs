//! Communication layer: group registry, collective primitives, and the
//! in-process simulated backend.
//!
//! The boundary operators in [`crate::ops::parallel`] only ever talk to the
//! [`Collectives`] trait and the [`GroupRegistry`]; both are injected
//! explicitly (no ambient globals), so a production transport backend can
//! replace [`local::LocalCollectives`] without touching the operator layer.

pub mod collectives;
pub mod group;
pub mod helpers;
pub mod local;

pub use collectives::Collectives;
pub use group::{GroupRegistry, ParallelGroup, MODEL_PARALLEL_GROUP};
pub use local::{LocalCollectives, LocalWorld};
