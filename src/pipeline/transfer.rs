//! One style transfer session: a content image and a frozen backbone shared
//! by every style image processed afterwards

use crate::io::configuration::{
    DEFAULT_CONTENT_PATH, DEFAULT_OUTPUT_DIR, DEFAULT_WEIGHTS_PATH, IMAGE_HEIGHT, IMAGE_WIDTH,
};
use crate::io::error::{Result, invalid_parameter};
use crate::io::image::{ImageTensor, load_image, save_image};
use crate::loss::objective::{LossWeights, StyleObjective};
use crate::loss::targets::ReferenceActivations;
use crate::network::backbone::Backbone;
use crate::network::dream::{DreamInit, DreamLayer};
use crate::network::taps::LayerTaps;
use crate::training::trainer::{Trainer, TrainerConfig, TrainingObserver, TrainingReport};
use std::path::{Path, PathBuf};
use tch::Device;

/// Where the backbone weights come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeightsSource {
    /// Pretrained VGG19 weights file
    File(PathBuf),
    /// Seeded random weights, for tests and dry runs
    Untrained {
        /// Initialisation seed
        seed: u64,
    },
}

/// Everything a session needs, gathered from the command line or defaults
#[derive(Debug, Clone, PartialEq)]
pub struct TransferConfig {
    /// Content image shared by all styles
    pub content_path: PathBuf,
    /// Backbone weights
    pub weights: WeightsSource,
    /// Directory receiving the timestamped outputs
    pub output_dir: PathBuf,
    /// Working width in pixels
    pub width: u32,
    /// Working height in pixels
    pub height: u32,
    /// Tapped layers
    pub taps: LayerTaps,
    /// Loss weighting
    pub loss_weights: LossWeights,
    /// Optimizer settings
    pub trainer: TrainerConfig,
    /// Dream image starting point
    pub init: DreamInit,
    /// Compute device
    pub device: Device,
}

impl Default for TransferConfig {
    fn default() -> Self {
        let taps = LayerTaps::vgg19();
        Self {
            content_path: PathBuf::from(DEFAULT_CONTENT_PATH),
            weights: WeightsSource::File(PathBuf::from(DEFAULT_WEIGHTS_PATH)),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            width: IMAGE_WIDTH,
            height: IMAGE_HEIGHT,
            loss_weights: LossWeights::for_taps(&taps),
            taps,
            trainer: TrainerConfig::default(),
            init: DreamInit::default(),
            device: Device::Cpu,
        }
    }
}

impl TransferConfig {
    /// Check every part of the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the image is too small for the tapped layers, or the
    /// loss weights or trainer settings are invalid
    pub fn validate(&self) -> Result<()> {
        let min_size = self.taps.min_input_size();
        if self.width < min_size || self.height < min_size {
            return Err(invalid_parameter(
                "image_size",
                &format!("{}x{}", self.width, self.height),
                &format!("the tapped layers need at least {min_size}x{min_size} pixels"),
            ));
        }
        self.loss_weights.validate(&self.taps)?;
        self.trainer.validate()
    }
}

/// Result of stylising one image
#[derive(Debug, Clone, PartialEq)]
pub struct StyleOutcome {
    /// Style image that was used
    pub style: PathBuf,
    /// File the result was written to
    pub output: PathBuf,
    /// Training summary
    pub report: TrainingReport,
}

/// Content image and frozen backbone, built once and reused for every style
#[derive(Debug)]
pub struct StyleTransfer {
    config: TransferConfig,
    backbone: Backbone,
    content: ImageTensor,
}

impl StyleTransfer {
    /// Load the content image and build the backbone
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the content image
    /// cannot be loaded or the weights cannot be loaded
    pub fn new(config: TransferConfig) -> Result<Self> {
        config.validate()?;

        tracing::info!(path = %config.content_path.display(), "loading content image");
        let content = load_image(&config.content_path, config.width, config.height)?;

        tracing::info!("creating VGG19 style transfer model");
        let backbone = match &config.weights {
            WeightsSource::File(path) => Backbone::from_weights(path, config.device)?,
            WeightsSource::Untrained { seed } => Backbone::untrained(config.device, *seed),
        };
        tracing::info!("\n{}", backbone.summary(&config.taps));

        Ok(Self {
            config,
            backbone,
            content,
        })
    }

    /// Session configuration
    pub const fn config(&self) -> &TransferConfig {
        &self.config
    }

    /// Shared frozen backbone
    pub const fn backbone(&self) -> &Backbone {
        &self.backbone
    }

    /// Shared content image
    pub const fn content(&self) -> &ImageTensor {
        &self.content
    }

    /// Reference activations for a style image
    ///
    /// # Errors
    ///
    /// Returns an error if the style image cannot be loaded or evaluated
    pub fn targets_for(&self, style_path: &Path) -> Result<ReferenceActivations> {
        tracing::info!(path = %style_path.display(), "loading style image");
        let style = load_image(style_path, self.config.width, self.config.height)?;

        tracing::info!("calculating output labels");
        ReferenceActivations::compute(&self.backbone, &self.config.taps, &self.content, &style)
    }

    /// Optimise a dream image for `style_path` without writing it
    ///
    /// # Errors
    ///
    /// Returns an error if the style image cannot be loaded, or any network
    /// or training step fails
    pub fn render(
        &self,
        style_path: &Path,
        observer: &mut impl TrainingObserver,
    ) -> Result<(ImageTensor, TrainingReport)> {
        let targets = self.targets_for(style_path)?;
        let objective = StyleObjective::new(targets, self.config.loss_weights.clone())?;

        let dream = DreamLayer::new(&self.content, self.config.init, self.config.device);
        let mut trainer = Trainer::new(self.config.trainer, &dream)?;

        tracing::info!(
            iterations = self.config.trainer.iterations,
            learning_rate = self.config.trainer.learning_rate,
            "training the model"
        );
        let report = trainer.run(
            &self.backbone,
            &self.config.taps,
            &objective,
            &dream,
            observer,
        )?;

        tracing::info!("inferring transformed image");
        let image = dream.to_image()?;
        Ok((image, report))
    }

    /// Stylise the content image with `style_path` and write the result
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails or the output cannot be written
    pub fn stylize(
        &self,
        style_path: &Path,
        observer: &mut impl TrainingObserver,
    ) -> Result<StyleOutcome> {
        let (image, report) = self.render(style_path, observer)?;
        let output = save_image(&image, &self.config.output_dir)?;

        Ok(StyleOutcome {
            style: style_path.to_path_buf(),
            output,
            report,
        })
    }
}
