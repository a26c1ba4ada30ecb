//! Command-line interface; every option defaults to the fixed batch setup

use crate::io::configuration::{
    DEFAULT_CONTENT_PATH, DEFAULT_CONTENT_WEIGHT, DEFAULT_ITERATIONS, DEFAULT_LEARNING_RATE,
    DEFAULT_LOG_EVERY, DEFAULT_MOMENTUM, DEFAULT_OUTPUT_DIR, DEFAULT_SEED, DEFAULT_STYLE_DIR,
    DEFAULT_STYLE_WEIGHT, DEFAULT_VARIANCE_DECAY, DEFAULT_WEIGHTS_PATH, IMAGE_HEIGHT, IMAGE_WIDTH,
};
use crate::loss::objective::LossWeights;
use crate::network::dream::InitKind;
use crate::network::taps::LayerTaps;
use crate::pipeline::transfer::{TransferConfig, WeightsSource};
use crate::training::trainer::TrainerConfig;
use crate::io::error::WithPath;
use clap::Parser;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use tch::Device;

#[derive(Parser, Debug)]
#[command(name = "renaissance")]
#[command(
    author,
    version,
    about = "Repaint a content image in the style of every image in a directory"
)]
/// Command-line arguments for the style transfer batch
// Independent on/off switches read best as plain flags
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Content image shared by every style
    #[arg(short, long, default_value = DEFAULT_CONTENT_PATH)]
    pub content: PathBuf,

    /// Directory of style images; every file in it is used
    #[arg(short, long, default_value = DEFAULT_STYLE_DIR)]
    pub styles: PathBuf,

    /// Pretrained VGG19 weights (libtorch `.ot` or safetensors)
    #[arg(long, default_value = DEFAULT_WEIGHTS_PATH)]
    pub weights: PathBuf,

    /// Use randomly initialised weights instead of a weights file
    #[arg(long)]
    pub untrained: bool,

    /// Directory for the timestamped results
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output: PathBuf,

    /// Working width in pixels
    #[arg(short = 'W', long, default_value_t = IMAGE_WIDTH)]
    pub width: u32,

    /// Working height in pixels
    #[arg(short = 'H', long, default_value_t = IMAGE_HEIGHT)]
    pub height: u32,

    /// Optimizer steps per style image
    #[arg(short, long, default_value_t = DEFAULT_ITERATIONS)]
    pub iterations: usize,

    /// Adam learning rate in pixel units
    #[arg(short = 'l', long, default_value_t = DEFAULT_LEARNING_RATE)]
    pub learning_rate: f64,

    /// Adam first moment decay
    #[arg(short, long, default_value_t = DEFAULT_MOMENTUM)]
    pub momentum: f64,

    /// Log the loss every N steps
    #[arg(long, default_value_t = DEFAULT_LOG_EVERY)]
    pub log_every: usize,

    /// Weight of the content term
    #[arg(long, default_value_t = DEFAULT_CONTENT_WEIGHT)]
    pub content_weight: f64,

    /// Weight of the style term
    #[arg(long, default_value_t = DEFAULT_STYLE_WEIGHT)]
    pub style_weight: f64,

    /// Dream image initialisation: `content` or `noise`
    #[arg(long, default_value = "content")]
    pub init: InitKind,

    /// Seed for noise initialisation and untrained weights
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Run on the CPU even if CUDA is available
    #[arg(long)]
    pub cpu: bool,

    /// Suppress progress bars
    #[arg(short, long)]
    pub quiet: bool,

    /// Log debug output
    #[arg(short, long)]
    pub verbose: bool,

    /// Exit right away instead of waiting for Enter
    #[arg(long)]
    pub no_wait: bool,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Check if the program should wait for Enter before exiting
    pub const fn should_wait(&self) -> bool {
        !self.no_wait
    }

    /// Compute device implied by the flags
    pub fn device(&self) -> Device {
        if self.cpu {
            Device::Cpu
        } else {
            Device::cuda_if_available()
        }
    }

    /// Session configuration implied by the arguments
    pub fn transfer_config(&self) -> TransferConfig {
        let taps = LayerTaps::vgg19();
        let loss_weights = LossWeights {
            content: self.content_weight,
            style: self.style_weight,
            ..LossWeights::for_taps(&taps)
        };
        let weights = if self.untrained {
            WeightsSource::Untrained { seed: self.seed }
        } else {
            WeightsSource::File(self.weights.clone())
        };

        TransferConfig {
            content_path: self.content.clone(),
            weights,
            output_dir: self.output.clone(),
            width: self.width,
            height: self.height,
            taps,
            loss_weights,
            trainer: TrainerConfig {
                iterations: self.iterations,
                learning_rate: self.learning_rate,
                beta1: self.momentum,
                beta2: DEFAULT_VARIANCE_DECAY,
                log_every: self.log_every,
            },
            init: self.init.with_seed(self.seed),
            device: self.device(),
        }
    }
}

/// Block until a line (or end of input) arrives on `input`
///
/// # Errors
///
/// Returns an error if reading from `input` fails
pub fn wait_for_enter(input: &mut impl BufRead) -> crate::Result<()> {
    let mut line = String::new();
    input
        .read_line(&mut line)
        .with_path(Path::new("<stdin>"), "wait for Enter")?;
    Ok(())
}
