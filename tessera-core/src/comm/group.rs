use std::collections::HashMap;
use std::sync::Arc;

use crate::error::TesseraError;

/// Conventional name of the group crossed by the matmul-parallel boundary
/// operators.
pub const MODEL_PARALLEL_GROUP: &str = "model_parallel";

/// An immutable, named set of ranks that jointly perform collective
/// operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParallelGroup {
    name: String,
    ranks: Vec<usize>,
}

impl ParallelGroup {
    /// The group's registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The participating ranks, in rank order.
    pub fn ranks(&self) -> &[usize] {
        &self.ranks
    }

    /// The number of participating ranks.
    pub fn world_size(&self) -> usize {
        self.ranks.len()
    }
}

/// Resolves group names to [`ParallelGroup`] handles.
///
/// Built once at distributed-runtime startup and read-only thereafter:
/// callers register every group, then share the registry as
/// `Arc<GroupRegistry>`. Nothing in the operator layer ever mutates it.
#[derive(Debug, Default)]
pub struct GroupRegistry {
    groups: HashMap<String, Arc<ParallelGroup>>,
}

impl GroupRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        GroupRegistry {
            groups: HashMap::new(),
        }
    }

    /// Registers a group under `name` with the given ranks.
    ///
    /// # Errors
    /// Returns [`TesseraError::GroupAlreadyRegistered`] if the name is
    /// taken, or [`TesseraError::EmptyGroup`] for an empty rank set.
    pub fn register(&mut self, name: &str, ranks: Vec<usize>) -> Result<(), TesseraError> {
        if ranks.is_empty() {
            return Err(TesseraError::EmptyGroup {
                name: name.to_string(),
            });
        }
        if self.groups.contains_key(name) {
            return Err(TesseraError::GroupAlreadyRegistered {
                name: name.to_string(),
            });
        }
        log::debug!("registering parallel group '{}' with ranks {:?}", name, ranks);
        let group = ParallelGroup {
            name: name.to_string(),
            ranks,
        };
        self.groups.insert(name.to_string(), Arc::new(group));
        Ok(())
    }

    /// Resolves a group name to its handle.
    ///
    /// # Errors
    /// Returns [`TesseraError::GroupNotFound`] for an unregistered name.
    pub fn lookup(&self, name: &str) -> Result<Arc<ParallelGroup>, TesseraError> {
        self.groups
            .get(name)
            .cloned()
            .ok_or_else(|| TesseraError::GroupNotFound {
                name: name.to_string(),
            })
    }
}
