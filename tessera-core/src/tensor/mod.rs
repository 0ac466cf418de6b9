use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::autograd::{BackwardOp, NodeId};
use crate::error::TesseraError;
use crate::tensor_data::TensorData;

pub mod create;
pub mod utils;

pub use create::{full, ones, rand_uniform, zeros};

/// A dense, row-major f32 tensor handle.
///
/// `Tensor` wraps `Arc<RwLock<TensorData>>` so that:
/// 1. **Cloning is cheap** — clones share the underlying data.
/// 2. **Autograd metadata is interiorly mutable** — `requires_grad` and
///    `grad_fn` can be set through a shared reference, guarded by the
///    `RwLock`.
///
/// The boundary operators in [`crate::ops::parallel`] never mutate a
/// tensor's storage; they only read it and attach autograd metadata to
/// freshly created outputs.
pub struct Tensor {
    pub(crate) data: Arc<RwLock<TensorData>>,
}

impl Tensor {
    /// Creates a new contiguous tensor from raw f32 data and a shape.
    pub fn new(data_vec: Vec<f32>, shape: Vec<usize>) -> Result<Self, TesseraError> {
        let tensor_data = TensorData::new(data_vec, shape)?;
        Ok(Tensor {
            data: Arc::new(RwLock::new(tensor_data)),
        })
    }

    /// Returns a clone of the tensor's shape.
    pub fn shape(&self) -> Vec<usize> {
        self.read_data().shape.clone()
    }

    /// Returns a clone of the tensor's strides.
    pub fn strides(&self) -> Vec<usize> {
        self.read_data().strides.clone()
    }

    /// Returns the number of dimensions.
    pub fn rank(&self) -> usize {
        self.read_data().shape.len()
    }

    /// Returns the number of elements.
    pub fn numel(&self) -> usize {
        self.read_data().numel()
    }

    /// Checks if the tensor is contiguous in memory.
    pub fn is_contiguous(&self) -> bool {
        self.read_data().is_contiguous()
    }

    /// Copies the tensor's logical contents out as a flat `Vec<f32>`.
    pub fn get_f32_data(&self) -> Result<Vec<f32>, TesseraError> {
        let guard = self.read_data();
        if !guard.is_contiguous() {
            return Err(TesseraError::InternalError(
                "get_f32_data requires a contiguous tensor".to_string(),
            ));
        }
        let start = guard.offset;
        let end = start + guard.numel();
        Ok(guard.buffer[start..end].to_vec())
    }

    /// Acquires a read lock on the tensor's data.
    ///
    /// Panics if the `RwLock` is poisoned.
    pub fn read_data(&self) -> RwLockReadGuard<'_, TensorData> {
        self.data.read().expect("RwLock poisoned")
    }

    /// Acquires a write lock on the tensor's data.
    ///
    /// Panics if the `RwLock` is poisoned.
    pub fn write_data(&self) -> RwLockWriteGuard<'_, TensorData> {
        self.data.write().expect("RwLock poisoned")
    }

    /// Checks if the tensor requires gradient computation.
    pub fn requires_grad(&self) -> bool {
        self.read_data().requires_grad
    }

    /// Sets the `requires_grad` flag **in-place**. Only allowed on leaf
    /// tensors; non-leaf tensors get their flag from the operation that
    /// produced them.
    pub fn requires_grad_(&self, requires_grad: bool) -> Result<(), TesseraError> {
        let mut guard = self.write_data();
        if guard.grad_fn.is_some() {
            return Err(TesseraError::RequiresGradOnNonLeaf);
        }
        guard.requires_grad = requires_grad;
        Ok(())
    }

    /// Returns the backward operation that produced this tensor, if any.
    pub fn grad_fn(&self) -> Option<Arc<dyn BackwardOp + Send + Sync>> {
        self.read_data().grad_fn.clone()
    }

    /// Returns a stable identifier for this tensor's data node, suitable as
    /// a key in an external differentiation engine's graph structures.
    pub fn node_id(&self) -> NodeId {
        Arc::as_ptr(&self.data)
    }

    /// Creates a tensor sharing this tensor's storage but detached from any
    /// autograd metadata.
    pub fn detach(&self) -> Tensor {
        let guard = self.read_data();
        let detached = TensorData::new_view(
            Arc::clone(&guard.buffer),
            guard.shape.clone(),
            guard.strides.clone(),
            guard.offset,
        );
        Tensor {
            data: Arc::new(RwLock::new(detached)),
        }
    }
}

// Cloning a Tensor clones the handle, not the data.
impl Clone for Tensor {
    fn clone(&self) -> Self {
        Tensor {
            data: Arc::clone(&self.data),
        }
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.read_data();
        f.debug_struct("Tensor")
            .field("shape", &guard.shape)
            .field("requires_grad", &guard.requires_grad)
            .field("has_grad_fn", &guard.grad_fn.is_some())
            .finish()
    }
}
