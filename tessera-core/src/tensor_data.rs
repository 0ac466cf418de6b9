use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::TesseraError;
use crate::tensor::utils::calculate_strides;

/// Internal storage and metadata for a [`crate::tensor::Tensor`].
///
/// Holds the data buffer, shape, strides and autograd-related information.
/// It is wrapped in `Arc<RwLock<TensorData>>` by the `Tensor` struct to
/// allow shared ownership and interior mutability.
#[derive(Debug)]
pub struct TensorData {
    /// The underlying row-major f32 buffer. Wrapped in `Arc` so views
    /// (e.g. the identity forward of the Copy operator) can share it
    /// without copying.
    pub(crate) buffer: Arc<Vec<f32>>,

    /// The shape (dimensions) of the tensor.
    pub(crate) shape: Vec<usize>,
    /// The strides for each dimension.
    pub(crate) strides: Vec<usize>,
    /// Offset into the buffer of the first element (used by views).
    pub(crate) offset: usize,

    /// Flag indicating whether the tensor participates in gradient
    /// computation.
    pub(crate) requires_grad: bool,
    /// The backward operation that produced this tensor, if any.
    /// Leaf tensors have `grad_fn = None`.
    pub(crate) grad_fn: Option<Arc<dyn BackwardOp + Send + Sync>>,
}

impl TensorData {
    /// Creates a new contiguous `TensorData` from raw f32 data and a shape.
    ///
    /// # Errors
    /// Returns [`TesseraError::TensorCreationError`] if the data length does
    /// not match the number of elements implied by `shape`.
    pub fn new(data_vec: Vec<f32>, shape: Vec<usize>) -> Result<Self, TesseraError> {
        let numel: usize = shape.iter().product();
        let data_len = data_vec.len();
        if data_len != numel {
            return Err(TesseraError::TensorCreationError { data_len, shape });
        }

        let strides = calculate_strides(&shape);
        Ok(TensorData {
            buffer: Arc::new(data_vec),
            shape,
            strides,
            offset: 0,
            requires_grad: false,
            grad_fn: None,
        })
    }

    /// Creates a `TensorData` that aliases an existing buffer.
    ///
    /// Used by operations whose forward pass is the identity (e.g. the Copy
    /// boundary operator): the output must share storage with the input but
    /// carry its own autograd metadata.
    pub(crate) fn new_view(
        buffer: Arc<Vec<f32>>,
        shape: Vec<usize>,
        strides: Vec<usize>,
        offset: usize,
    ) -> Self {
        TensorData {
            buffer,
            shape,
            strides,
            offset,
            requires_grad: false,
            grad_fn: None,
        }
    }

    /// Returns the number of elements in the tensor.
    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }

    /// Checks whether the layout is contiguous row-major.
    pub fn is_contiguous(&self) -> bool {
        self.strides == calculate_strides(&self.shape)
    }
}
