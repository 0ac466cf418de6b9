//! Shape math shared by the collective backends: partitioning and
//! reassembling contiguous tensors along one dimension, and elementwise
//! summation for all-reduce.

use crate::error::TesseraError;
use crate::tensor::Tensor;

/// Splits `input` along `dim` into `parts` equal shards.
///
/// The shards are freshly allocated contiguous tensors in rank order.
///
/// # Errors
/// * [`TesseraError::DimensionMismatch`] if `dim` is out of range.
/// * [`TesseraError::UnevenSplit`] if `shape[dim]` is not divisible by
///   `parts`.
pub fn split_along_dim(
    input: &Tensor,
    dim: usize,
    parts: usize,
) -> Result<Vec<Tensor>, TesseraError> {
    let shape = input.shape();
    let rank = shape.len();
    if dim >= rank {
        return Err(TesseraError::DimensionMismatch { dim, rank });
    }
    let dim_size = shape[dim];
    if parts == 0 || dim_size % parts != 0 {
        return Err(TesseraError::UnevenSplit { dim_size, parts });
    }

    let chunk = dim_size / parts;
    // Row-major: every index left of `dim` selects an outer block of
    // `dim_size * inner` contiguous elements.
    let outer: usize = shape[..dim].iter().product();
    let inner: usize = shape[dim + 1..].iter().product();
    let data = input.get_f32_data()?;

    let mut shard_shape = shape.clone();
    shard_shape[dim] = chunk;
    let shard_numel = chunk * inner;

    let mut shards = Vec::with_capacity(parts);
    for p in 0..parts {
        let mut shard_data = Vec::with_capacity(outer * shard_numel);
        for o in 0..outer {
            let start = o * dim_size * inner + p * shard_numel;
            shard_data.extend_from_slice(&data[start..start + shard_numel]);
        }
        shards.push(Tensor::new(shard_data, shard_shape.clone())?);
    }
    Ok(shards)
}

/// Concatenates `shards` along `dim`, in the order given.
///
/// All shards must agree on every dimension except `dim`.
///
/// # Errors
/// * [`TesseraError::EmptyShardList`] for an empty input.
/// * [`TesseraError::DimensionMismatch`] if `dim` is out of range.
/// * [`TesseraError::ShapeMismatch`] if a shard disagrees on a non-`dim`
///   dimension.
pub fn concat_along_dim(shards: &[Tensor], dim: usize) -> Result<Tensor, TesseraError> {
    let first = shards.first().ok_or(TesseraError::EmptyShardList)?;
    let first_shape = first.shape();
    let rank = first_shape.len();
    if dim >= rank {
        return Err(TesseraError::DimensionMismatch { dim, rank });
    }

    let mut out_dim_size = 0;
    for shard in shards {
        let shape = shard.shape();
        let compatible = shape.len() == rank
            && shape
                .iter()
                .zip(&first_shape)
                .enumerate()
                .all(|(d, (a, b))| d == dim || a == b);
        if !compatible {
            return Err(TesseraError::ShapeMismatch {
                expected: first_shape.clone(),
                actual: shape,
                operation: "concat_along_dim".to_string(),
            });
        }
        out_dim_size += shape[dim];
    }

    let outer: usize = first_shape[..dim].iter().product();
    let inner: usize = first_shape[dim + 1..].iter().product();

    let mut out_shape = first_shape.clone();
    out_shape[dim] = out_dim_size;

    let datas: Vec<Vec<f32>> = shards
        .iter()
        .map(|s| s.get_f32_data())
        .collect::<Result<_, _>>()?;

    let mut out_data = Vec::with_capacity(outer * out_dim_size * inner);
    for o in 0..outer {
        for (shard, data) in shards.iter().zip(&datas) {
            let block = shard.shape()[dim] * inner;
            let start = o * block;
            out_data.extend_from_slice(&data[start..start + block]);
        }
    }
    Tensor::new(out_data, out_shape)
}

/// Sums `tensors` elementwise. All tensors must share one shape.
pub fn elementwise_sum(tensors: &[Tensor]) -> Result<Tensor, TesseraError> {
    let first = tensors.first().ok_or(TesseraError::EmptyShardList)?;
    let shape = first.shape();
    let mut acc = first.get_f32_data()?;
    for t in &tensors[1..] {
        let t_shape = t.shape();
        if t_shape != shape {
            return Err(TesseraError::ShapeMismatch {
                expected: shape,
                actual: t_shape,
                operation: "elementwise_sum".to_string(),
            });
        }
        for (a, b) in acc.iter_mut().zip(t.get_f32_data()?) {
            *a += b;
        }
    }
    Tensor::new(acc, shape)
}
