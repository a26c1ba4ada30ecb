//! Style transfer constants and runtime configuration defaults

// Input locations
/// Content image used for every style
pub const DEFAULT_CONTENT_PATH: &str = "content.jpeg";
/// Directory whose files are all treated as style images
pub const DEFAULT_STYLE_DIR: &str = "Styles";
/// Pretrained VGG19 weights in libtorch `.ot` format
pub const DEFAULT_WEIGHTS_PATH: &str = "vgg19.ot";
/// Directory receiving the generated images
pub const DEFAULT_OUTPUT_DIR: &str = ".";

// Every image is resized to this before entering the network
/// Working image width in pixels
pub const IMAGE_WIDTH: u32 = 600;
/// Working image height in pixels
pub const IMAGE_HEIGHT: u32 = 600;
/// Colour channels per pixel (RGB)
pub const CHANNELS: usize = 3;

// Optimizer settings; large on purpose since the dream image lives in pixel units
/// Fixed number of optimizer steps per style image
pub const DEFAULT_ITERATIONS: usize = 500;
/// Adam learning rate
pub const DEFAULT_LEARNING_RATE: f64 = 10.0;
/// Adam first moment decay
pub const DEFAULT_MOMENTUM: f64 = 0.95;
/// Adam second moment decay
pub const DEFAULT_VARIANCE_DECAY: f64 = 0.999;
/// Loss is logged on every step that is a multiple of this (0-indexed)
pub const DEFAULT_LOG_EVERY: usize = 100;

// Loss weighting
/// Weight of the content reconstruction term
pub const DEFAULT_CONTENT_WEIGHT: f64 = 1.0;
/// Weight of the summed style term
pub const DEFAULT_STYLE_WEIGHT: f64 = 1e6;
/// Weight of each individual style layer
pub const DEFAULT_STYLE_LAYER_WEIGHT: f64 = 1.0;

/// Seed for noise initialisation of the dream image
pub const DEFAULT_SEED: u64 = 42;

// ImageNet statistics the pretrained VGG19 weights expect, RGB order
/// Per-channel mean of `[0, 1]` scaled input
pub const IMAGENET_MEAN: [f64; 3] = [0.485, 0.456, 0.406];
/// Per-channel standard deviation of `[0, 1]` scaled input
pub const IMAGENET_STD: [f64; 3] = [0.229, 0.224, 0.225];

// Output settings
/// `chrono` format string for output file stems
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";
/// Extension (and encoder) of generated images
pub const OUTPUT_EXTENSION: &str = "png";
