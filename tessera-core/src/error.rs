use thiserror::Error;

/// Custom error type for the Tessera framework.
#[derive(Error, Debug, PartialEq, Clone)] // PartialEq for easier testing
pub enum TesseraError {
    #[error("Shape mismatch: expected {expected:?}, got {actual:?} during operation {operation}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
        operation: String,
    },

    #[error("Dimension {dim} is out of range for tensor of rank {rank}")]
    DimensionMismatch { dim: usize, rank: usize },

    #[error("Cannot split dimension of size {dim_size} evenly into {parts} parts")]
    UnevenSplit { dim_size: usize, parts: usize },

    #[error("Tensor creation error: data length {data_len} does not match shape {shape:?}")]
    TensorCreationError { data_len: usize, shape: Vec<usize> },

    #[error("Cannot gather an empty list of shards")]
    EmptyShardList,

    #[error("Parallel group '{name}' is not registered")]
    GroupNotFound { name: String },

    #[error("Parallel group '{name}' is already registered")]
    GroupAlreadyRegistered { name: String },

    #[error("Parallel group '{name}' must contain at least one rank")]
    EmptyGroup { name: String },

    #[error("Rank {rank} is out of range for a world of size {world_size}")]
    RankOutOfRange { rank: usize, world_size: usize },

    #[error(
        "Group '{name}' has size {group_size} but the communication backend \
         serves a world of size {world_size}"
    )]
    GroupMismatch {
        name: String,
        group_size: usize,
        world_size: usize,
    },

    #[error(
        "Collective call sequence diverged: rank {rank} issued {local}, \
         rank {peer} issued {remote}"
    )]
    CollectiveMismatch {
        rank: usize,
        peer: usize,
        local: String,
        remote: String,
    },

    #[error("Cannot set requires_grad on a non-leaf tensor")]
    RequiresGradOnNonLeaf,

    #[error("Internal error: {0}")]
    InternalError(String),
}
