use rand::Rng;

use crate::error::TesseraError;
use crate::tensor::Tensor;

/// Creates a new tensor filled with zeros with the specified shape.
pub fn zeros(shape: &[usize]) -> Result<Tensor, TesseraError> {
    let numel = shape.iter().product();
    Tensor::new(vec![0.0; numel], shape.to_vec())
}

/// Creates a new tensor filled with ones with the specified shape.
pub fn ones(shape: &[usize]) -> Result<Tensor, TesseraError> {
    let numel = shape.iter().product();
    Tensor::new(vec![1.0; numel], shape.to_vec())
}

/// Creates a new tensor filled with a specific value with the specified shape.
pub fn full(shape: &[usize], value: f32) -> Result<Tensor, TesseraError> {
    let numel = shape.iter().product();
    Tensor::new(vec![value; numel], shape.to_vec())
}

/// Creates a new tensor with values sampled uniformly from `[low, high)`.
pub fn rand_uniform(shape: &[usize], low: f32, high: f32) -> Result<Tensor, TesseraError> {
    let numel: usize = shape.iter().product();
    let mut rng = rand::thread_rng();
    let data_vec: Vec<f32> = (0..numel).map(|_| rng.gen_range(low..high)).collect();
    Tensor::new(data_vec, shape.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros_and_ones() {
        let z = zeros(&[2, 2]).unwrap();
        assert_eq!(z.get_f32_data().unwrap(), vec![0.0; 4]);
        let o = ones(&[3]).unwrap();
        assert_eq!(o.get_f32_data().unwrap(), vec![1.0; 3]);
    }

    #[test]
    fn test_full() {
        let f = full(&[2, 3], -1.5).unwrap();
        assert_eq!(f.shape(), vec![2, 3]);
        assert_eq!(f.get_f32_data().unwrap(), vec![-1.5; 6]);
    }

    #[test]
    fn test_rand_uniform_range() {
        let r = rand_uniform(&[4, 4], -2.0, 2.0).unwrap();
        assert_eq!(r.numel(), 16);
        for v in r.get_f32_data().unwrap() {
            assert!((-2.0..2.0).contains(&v));
        }
    }
}
