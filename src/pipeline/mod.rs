/// Iteration over the style directory
pub mod batch;
/// Shared content image and backbone
pub mod transfer;
