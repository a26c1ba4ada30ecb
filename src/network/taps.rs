//! Content and style extraction points in the VGG19 feature stack
//!
//! Indices address the `features` sequence where every convolution, ReLU and
//! max-pool counts as one layer, matching the torchvision numbering the
//! pretrained weights are stored under.

use crate::io::error::{Result, invalid_parameter};

/// Output channels of each VGG19 convolution, grouped by pooling block
pub const VGG19_BLOCKS: [&[i64]; 5] = [
    &[64, 64],
    &[128, 128],
    &[256, 256, 256, 256],
    &[512, 512, 512, 512],
    &[512, 512, 512, 512],
];

/// Number of layers in the VGG19 feature stack (16 conv + 16 ReLU + 5 pool)
pub const VGG19_FEATURE_LAYERS: usize = 37;

/// `relu4_2`
pub const VGG19_CONTENT_LAYER: usize = 22;

/// `relu1_1`, `relu2_1`, `relu3_1`, `relu4_1`, `relu5_1`
pub const VGG19_STYLE_LAYERS: [usize; 5] = [1, 6, 11, 20, 29];

/// Feature layers tapped for the loss
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerTaps {
    content: usize,
    style: Vec<usize>,
}

impl LayerTaps {
    /// Validate a custom set of taps
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No style layer is given
    /// - Any index lies outside the feature stack
    pub fn new(content: usize, style: Vec<usize>) -> Result<Self> {
        if style.is_empty() {
            return Err(invalid_parameter(
                "style_layers",
                &"[]",
                &"at least one style layer is required",
            ));
        }
        if content >= VGG19_FEATURE_LAYERS {
            return Err(invalid_parameter(
                "content_layer",
                &content,
                &format!("feature stack has {VGG19_FEATURE_LAYERS} layers"),
            ));
        }
        if let Some(bad) = style.iter().find(|&&i| i >= VGG19_FEATURE_LAYERS) {
            return Err(invalid_parameter(
                "style_layers",
                bad,
                &format!("feature stack has {VGG19_FEATURE_LAYERS} layers"),
            ));
        }
        Ok(Self { content, style })
    }

    /// Standard Gatys et al. taps
    pub fn vgg19() -> Self {
        Self {
            content: VGG19_CONTENT_LAYER,
            style: VGG19_STYLE_LAYERS.to_vec(),
        }
    }

    /// Content layer index
    pub const fn content(&self) -> usize {
        self.content
    }

    /// Style layer indices in loss order
    pub fn style(&self) -> &[usize] {
        &self.style
    }

    /// Number of leading layers that must be evaluated to reach every tap
    pub fn depth(&self) -> usize {
        self.style
            .iter()
            .copied()
            .chain(std::iter::once(self.content))
            .max()
            .unwrap_or(self.content)
            + 1
    }

    /// Smallest input side that keeps every tapped activation at least one pixel
    pub fn min_input_size(&self) -> u32 {
        let pools = (0..self.depth())
            .filter(|&index| layer_name(index).is_some_and(|name| name.starts_with("pool")))
            .count();
        1 << pools
    }
}

impl Default for LayerTaps {
    fn default() -> Self {
        Self::vgg19()
    }
}

/// Conventional name of a feature layer, e.g. `conv3_2`, `relu4_1` or `pool2`
pub fn layer_name(index: usize) -> Option<String> {
    let mut cursor = 0;
    for (block, convs) in VGG19_BLOCKS.iter().enumerate() {
        for conv in 0..convs.len() {
            if index == cursor {
                return Some(format!("conv{}_{}", block + 1, conv + 1));
            }
            if index == cursor + 1 {
                return Some(format!("relu{}_{}", block + 1, conv + 1));
            }
            cursor += 2;
        }
        if index == cursor {
            return Some(format!("pool{}", block + 1));
        }
        cursor += 1;
    }
    None
}

/// Output channel count of a feature layer
pub fn layer_channels(index: usize) -> Option<i64> {
    let mut cursor = 0;
    for convs in VGG19_BLOCKS {
        for &channels in convs {
            if index == cursor || index == cursor + 1 {
                return Some(channels);
            }
            cursor += 2;
        }
        if index == cursor {
            return convs.last().copied();
        }
        cursor += 1;
    }
    None
}
