//! The trainable image being optimised

use crate::io::error::Result;
use crate::io::image::ImageTensor;
use std::fmt;
use std::str::FromStr;
use tch::{Device, Tensor, nn};

/// Starting point of the dream image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DreamInit {
    /// Copy of the content image; fully deterministic
    #[default]
    Content,
    /// Uniform pixel noise, deterministic for a given seed
    Noise {
        /// Noise generator seed
        seed: u64,
    },
}

impl fmt::Display for DreamInit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Content => write!(f, "content"),
            Self::Noise { seed } => write!(f, "noise (seed {seed})"),
        }
    }
}

/// Initialisation strategy name without parameters, as accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitKind {
    /// See [`DreamInit::Content`]
    #[default]
    Content,
    /// See [`DreamInit::Noise`]
    Noise,
}

impl InitKind {
    /// Attach the seed used by noise initialisation
    pub const fn with_seed(self, seed: u64) -> DreamInit {
        match self {
            Self::Content => DreamInit::Content,
            Self::Noise => DreamInit::Noise { seed },
        }
    }
}

impl FromStr for InitKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "content" => Ok(Self::Content),
            "noise" => Ok(Self::Noise),
            other => Err(format!("unknown init '{other}', expected 'content' or 'noise'")),
        }
    }
}

/// Single trainable `[1, 3, H, W]` pixel-unit image in a store of its own
///
/// Keeping the variable out of the backbone's store is what restricts the
/// optimizer to the image.
pub struct DreamLayer {
    var_store: nn::VarStore,
    image: Tensor,
}

impl fmt::Debug for DreamLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DreamLayer")
            .field("shape", &self.image.size())
            .field("device", &self.var_store.device())
            .finish()
    }
}

impl DreamLayer {
    /// Create the dream variable sized like `content`
    pub fn new(content: &ImageTensor, init: DreamInit, device: Device) -> Self {
        let start = match init {
            DreamInit::Content => content.to_network_input(device),
            DreamInit::Noise { seed } => {
                ImageTensor::from_noise(content.width(), content.height(), seed)
                    .to_network_input(device)
            }
        };

        let var_store = nn::VarStore::new(device);
        let image = var_store.root().var_copy("dream", &start);
        tracing::debug!(%init, shape = ?image.size(), "initialised dream image");

        Self { var_store, image }
    }

    /// Store holding only the dream variable
    pub const fn var_store(&self) -> &nn::VarStore {
        &self.var_store
    }

    /// The trainable image tensor
    pub const fn image(&self) -> &Tensor {
        &self.image
    }

    /// Snapshot of the current pixels
    ///
    /// # Errors
    ///
    /// Returns an error if the tensor cannot be copied to host memory
    pub fn to_image(&self) -> Result<ImageTensor> {
        ImageTensor::from_network_output(&self.image)
    }
}
