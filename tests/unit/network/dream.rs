//! Tests for the trainable dream image

#[cfg(test)]
mod tests {
    use crate::unit::support::pattern_tensor;
    use renaissance::io::image::ImageTensor;
    use renaissance::network::dream::{DreamInit, DreamLayer, InitKind};
    use std::str::FromStr;
    use tch::Device;

    // Tests content initialisation copies the content pixels exactly
    // Verified by initialising from noise regardless of the setting
    #[test]
    fn test_content_init() {
        let content = pattern_tensor(12, 0);

        let dream = DreamLayer::new(&content, DreamInit::Content, Device::Cpu);

        assert_eq!(dream.image().size(), vec![1, 3, 12, 12]);
        assert_eq!(dream.to_image().unwrap(), content);
    }

    // Tests noise initialisation is reproducible and independent of the content
    // Verified by ignoring the seed
    #[test]
    fn test_noise_init() {
        let content = pattern_tensor(12, 0);
        let init = DreamInit::Noise { seed: 3 };

        let a = DreamLayer::new(&content, init, Device::Cpu);
        let b = DreamLayer::new(&content, init, Device::Cpu);

        let pixels = a.to_image().unwrap();
        assert_eq!(pixels, b.to_image().unwrap());
        assert_eq!(pixels, ImageTensor::from_noise(12, 12, 3));
        assert_ne!(pixels, content);
    }

    // Tests the dream store holds exactly one trainable variable
    // Verified by creating the variable with requires_grad disabled
    #[test]
    fn test_single_trainable_variable() {
        let dream = DreamLayer::new(&pattern_tensor(8, 1), DreamInit::default(), Device::Cpu);

        let trainable = dream.var_store().trainable_variables();
        assert_eq!(trainable.len(), 1);
        assert!(dream.image().requires_grad());
    }

    // Tests init names parse case-insensitively and take the seed
    // Verified by ignoring the seed for noise
    #[test]
    fn test_init_kind() {
        assert_eq!(InitKind::from_str("Content"), Ok(InitKind::Content));
        assert_eq!(InitKind::from_str("noise"), Ok(InitKind::Noise));
        assert!(InitKind::from_str("zeros").is_err());

        assert_eq!(InitKind::Content.with_seed(4), DreamInit::Content);
        assert_eq!(InitKind::Noise.with_seed(4), DreamInit::Noise { seed: 4 });
        assert_eq!(DreamInit::Noise { seed: 4 }.to_string(), "noise (seed 4)");
    }
}
