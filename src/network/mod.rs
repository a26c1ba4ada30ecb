/// Frozen VGG19 feature extractor
pub mod backbone;
/// The trainable image
pub mod dream;
/// Content and style layer selection
pub mod taps;
