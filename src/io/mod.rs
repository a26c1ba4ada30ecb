/// Command-line arguments
pub mod cli;
/// Constants and runtime defaults
pub mod configuration;
/// Error type and helpers
pub mod error;
/// Image decoding, layout conversion and export
pub mod image;
/// Terminal progress bars
pub mod progress;
