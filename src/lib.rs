//! Neural style transfer over a frozen VGG19 backbone
//!
//! A content image is repainted in the style of each image in a directory by
//! optimising a trainable "dream" image against a weighted sum of a content
//! reconstruction loss and a Gram matrix style loss. Network evaluation,
//! automatic differentiation and the Adam optimizer come from `tch`.

#![forbid(unsafe_code)]

/// Input/output operations, configuration and error handling
pub mod io;
/// Content and style loss assembly
pub mod loss;
/// VGG19 backbone, layer taps and the trainable dream image
pub mod network;
/// Per-style orchestration and the batch driver
pub mod pipeline;
/// Optimisation loop for the dream image
pub mod training;

pub use io::error::{Result, TransferError};
