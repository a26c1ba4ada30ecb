//! Tests for style transfer constants

#[cfg(test)]
mod tests {
    use renaissance::io::configuration::{
        CHANNELS, DEFAULT_CONTENT_PATH, DEFAULT_ITERATIONS, DEFAULT_LEARNING_RATE,
        DEFAULT_LOG_EVERY, DEFAULT_MOMENTUM, DEFAULT_STYLE_DIR, IMAGE_HEIGHT, IMAGE_WIDTH,
        IMAGENET_MEAN, IMAGENET_STD, OUTPUT_EXTENSION, TIMESTAMP_FORMAT,
    };

    // Tests the working image size
    // Verified by changing constant values
    #[test]
    fn test_image_size() {
        assert_eq!(IMAGE_WIDTH, 600);
        assert_eq!(IMAGE_HEIGHT, 600);
        assert_eq!(CHANNELS, 3);
    }

    // Tests optimizer defaults
    // Verified by changing constant values
    #[test]
    fn test_optimizer_defaults() {
        assert_eq!(DEFAULT_ITERATIONS, 500);
        assert!((DEFAULT_LEARNING_RATE - 10.0).abs() < f64::EPSILON);
        assert!((DEFAULT_MOMENTUM - 0.95).abs() < f64::EPSILON);
        assert_eq!(DEFAULT_LOG_EVERY, 100);
    }

    // Tests default input locations
    // Verified by renaming the defaults
    #[test]
    fn test_input_locations() {
        assert_eq!(DEFAULT_CONTENT_PATH, "content.jpeg");
        assert_eq!(DEFAULT_STYLE_DIR, "Styles");
    }

    // Tests output naming settings
    // Verified by altering the format string
    #[test]
    fn test_output_naming() {
        assert_eq!(TIMESTAMP_FORMAT, "%Y%m%d%H%M%S");
        assert_eq!(OUTPUT_EXTENSION, "png");
    }

    // Tests normalisation statistics are sane
    // Verified by zeroing a standard deviation
    #[test]
    fn test_imagenet_statistics() {
        for (mean, std) in IMAGENET_MEAN.iter().zip(IMAGENET_STD.iter()) {
            assert!(*mean > 0.0 && *mean < 1.0);
            assert!(*std > 0.0 && *std < 1.0);
        }
    }
}
