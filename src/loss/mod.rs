/// Gram matrices of feature maps
pub mod gram;
/// Weighted content + style objective
pub mod objective;
/// Reference activations of the content and style images
pub mod targets;
