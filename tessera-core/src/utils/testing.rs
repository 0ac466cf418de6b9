use approx::abs_diff_eq;

use crate::tensor::Tensor;

/// Checks that a tensor matches an expected shape and data within a
/// tolerance. Panics with a descriptive message on mismatch.
pub fn check_tensor_near(
    actual: &Tensor,
    expected_shape: &[usize],
    expected_data: &[f32],
    tolerance: f32,
) {
    assert_eq!(actual.shape(), expected_shape, "Shape mismatch");

    let actual_data = actual
        .get_f32_data()
        .expect("Failed to get f32 data in check_tensor_near");
    assert_eq!(
        actual_data.len(),
        expected_data.len(),
        "Data length mismatch"
    );

    for (i, (a, e)) in actual_data.iter().zip(expected_data.iter()).enumerate() {
        if !abs_diff_eq!(*a, *e, epsilon = tolerance) {
            panic!(
                "Data mismatch at index {}: actual={:?}, expected={:?}, tolerance={:?}",
                i, a, e, tolerance
            );
        }
    }
}

/// Helper to create a simple f32 tensor for testing purposes.
pub fn create_test_tensor(data: Vec<f32>, shape: Vec<usize>) -> Tensor {
    Tensor::new(data, shape).expect("Failed to create test tensor")
}

/// Helper to create a simple f32 tensor that requires gradient for testing.
pub fn create_test_tensor_with_grad(data: Vec<f32>, shape: Vec<usize>) -> Tensor {
    let tensor = Tensor::new(data, shape).expect("Failed to create test tensor with grad");
    tensor
        .requires_grad_(true)
        .expect("Failed to set requires_grad on leaf tensor");
    tensor
}
