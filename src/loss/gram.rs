//! Gram matrices of feature maps

use crate::io::error::{Result, tensor_error};
use tch::Tensor;

/// Channel correlations of a `[1, C, H, W]` activation
///
/// Returns `[C, C]` where entry `(i, j)` is the inner product of channels `i`
/// and `j`, divided by `C * H * W` so layers of different sizes are comparable.
///
/// # Errors
///
/// Returns an error if `features` is not four dimensional
pub fn gram_matrix(features: &Tensor) -> Result<Tensor> {
    let (batch, channels, height, width) = features
        .size4()
        .map_err(|source| tensor_error("gram matrix", source))?;
    let flat = features.reshape([batch * channels, height * width]);
    let gram = flat.matmul(&flat.tr());
    Ok(gram / (batch * channels * height * width) as f64)
}
