//! Frozen VGG19 feature extractor

use crate::io::configuration::{IMAGENET_MEAN, IMAGENET_STD};
use crate::io::error::{Result, TransferError};
use crate::network::taps::{
    LayerTaps, VGG19_BLOCKS, VGG19_FEATURE_LAYERS, layer_channels, layer_name,
};
use std::fmt::Write as _;
use std::path::Path;
use tch::nn::{self, SequentialT};
use tch::{Device, Kind, Tensor};

/// VGG19 convolutional stack without the classifier head
///
/// Variables are named `features.<layer index>.{weight,bias}`, the layout of
/// torchvision checkpoints converted for libtorch. Extra classifier entries in
/// such a file are ignored on load.
pub fn vgg19_features(p: &nn::Path<'_>) -> SequentialT {
    let features = p / "features";
    let conv_config = || nn::ConvConfig {
        stride: 1,
        padding: 1,
        ..Default::default()
    };

    let mut seq = nn::seq_t();
    let mut c_in = 3;
    for convs in VGG19_BLOCKS {
        for &c_out in convs {
            let index = seq.len();
            seq = seq
                .add(nn::conv2d(&features / index, c_in, c_out, 3, conv_config()))
                .add_fn(Tensor::relu);
            c_in = c_out;
        }
        seq = seq.add_fn(|xs| xs.max_pool2d_default(2));
    }
    seq
}

/// Activations of the tapped layers for one input image
#[derive(Debug)]
pub struct TappedActivations {
    /// Content layer output, `[1, C, H, W]`
    pub content: Tensor,
    /// Style layer outputs in tap order
    pub style: Vec<Tensor>,
}

/// VGG19 feature stack with pretrained weights, never updated after construction
///
/// Inputs are `[1, 3, H, W]` pixel-unit RGB tensors; ImageNet normalisation
/// happens inside [`Backbone::forward_taps`] so gradients reach the pixels.
pub struct Backbone {
    var_store: nn::VarStore,
    net: SequentialT,
    mean: Tensor,
    std: Tensor,
}

impl std::fmt::Debug for Backbone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backbone")
            .field("device", &self.var_store.device())
            .field("parameters", &self.parameter_count())
            .finish_non_exhaustive()
    }
}

impl Backbone {
    /// Build VGG19 and load pretrained weights from `path`
    ///
    /// # Errors
    ///
    /// Returns an error if the weights file is missing or does not match the
    /// VGG19 variable layout
    pub fn from_weights(path: &Path, device: Device) -> Result<Self> {
        let mut var_store = nn::VarStore::new(device);
        let net = vgg19_features(&var_store.root());
        var_store.load(path).map_err(|source| TransferError::Weights {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), ?device, "loaded VGG19 weights");
        Ok(Self::frozen(var_store, net))
    }

    /// Same topology with seeded random weights
    ///
    /// Produces meaningless features but exercises the full pipeline without a
    /// weights file.
    pub fn untrained(device: Device, seed: u64) -> Self {
        tch::manual_seed(seed as i64);
        let var_store = nn::VarStore::new(device);
        let net = vgg19_features(&var_store.root());
        tracing::warn!(seed, "using untrained VGG19 weights");
        Self::frozen(var_store, net)
    }

    fn frozen(mut var_store: nn::VarStore, net: SequentialT) -> Self {
        var_store.freeze();
        let device = var_store.device();
        let mean = Tensor::from_slice(&IMAGENET_MEAN)
            .to_kind(Kind::Float)
            .view([1, 3, 1, 1])
            .to_device(device);
        let std = Tensor::from_slice(&IMAGENET_STD)
            .to_kind(Kind::Float)
            .view([1, 3, 1, 1])
            .to_device(device);
        Self {
            var_store,
            net,
            mean,
            std,
        }
    }

    /// Save the current weights, e.g. to pin an untrained backbone
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_weights(&self, path: &Path) -> Result<()> {
        self.var_store
            .save(path)
            .map_err(|source| TransferError::Weights {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Device holding the weights
    pub fn device(&self) -> Device {
        self.var_store.device()
    }

    /// Total number of scalar weights
    pub fn parameter_count(&self) -> usize {
        self.var_store.variables().values().map(Tensor::numel).sum()
    }

    /// Number of variables still receiving gradients; zero once frozen
    pub fn trainable_variable_count(&self) -> usize {
        self.var_store
            .trainable_variables()
            .iter()
            .filter(|variable| variable.requires_grad())
            .count()
    }

    /// Map pixel-unit RGB to the ImageNet normalised range
    pub fn normalize(&self, pixels: &Tensor) -> Tensor {
        (pixels / 255.0 - &self.mean) / &self.std
    }

    /// Evaluate `input` up to the deepest tap and collect the tapped outputs
    ///
    /// # Errors
    ///
    /// Returns an error if the network yields fewer layers than the taps need
    pub fn forward_taps(&self, input: &Tensor, taps: &LayerTaps) -> Result<TappedActivations> {
        let normalized = self.normalize(input);
        let layers = self
            .net
            .forward_all_t(&normalized, false, Some(taps.depth()));

        let pick = |index: usize| {
            layers
                .get(index)
                .map(Tensor::shallow_clone)
                .ok_or_else(|| TransferError::ShapeMismatch {
                    what: "tapped layer outputs",
                    expected: vec![taps.depth() as i64],
                    actual: vec![layers.len() as i64],
                })
        };

        let content = pick(taps.content())?;
        let style = taps
            .style()
            .iter()
            .map(|&index| pick(index))
            .collect::<Result<Vec<_>>>()?;

        Ok(TappedActivations { content, style })
    }

    /// Human readable listing of the tapped layers
    pub fn summary(&self, taps: &LayerTaps) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "VGG19 backbone: {} parameters ({} trainable variables), {} of {VGG19_FEATURE_LAYERS} feature layers evaluated",
            self.parameter_count(),
            self.trainable_variable_count(),
            taps.depth()
        );
        let mut describe = |role: &str, index: usize| {
            let name = layer_name(index).unwrap_or_else(|| "?".to_string());
            let channels = layer_channels(index).unwrap_or(0);
            let _ = writeln!(out, "  {role:<8}#{index:<3}{name:<9}{channels} channels");
        };
        describe("content", taps.content());
        for &index in taps.style() {
            describe("style", index);
        }
        out
    }
}
