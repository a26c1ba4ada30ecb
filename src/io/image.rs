//! Image decoding, pixel/tensor layout conversion and timestamped export
//!
//! Layout contract for [`ImageTensor`]: row-major `(height, width, channel)`,
//! channels in RGB order, values in pixel units `[0, 255]`. Network tensors are
//! `[1, 3, height, width]` (NCHW) in the same units and channel order.

use crate::io::configuration::{CHANNELS, OUTPUT_EXTENSION, TIMESTAMP_FORMAT};
use crate::io::error::{Result, TransferError, WithPath, tensor_error};
use chrono::{DateTime, Local};
use image::imageops::FilterType;
use image::{ImageFormat, RgbImage};
use ndarray::{Array3, ArrayView3};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::path::{Path, PathBuf};
use tch::{Device, Kind, Tensor};

/// Fixed resize policy applied to every loaded image
pub const RESIZE_FILTER: FilterType = FilterType::Triangle;

/// Fixed-size RGB image in floating point pixel units
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    data: Array3<f32>,
}

impl ImageTensor {
    /// Wrap an `(height, width, 3)` array
    ///
    /// # Errors
    ///
    /// Returns an error if the last axis does not hold exactly three channels
    pub fn from_array(data: Array3<f32>) -> Result<Self> {
        let (height, width, channels) = data.dim();
        if channels != CHANNELS {
            return Err(TransferError::ShapeMismatch {
                what: "image tensor",
                expected: vec![height as i64, width as i64, CHANNELS as i64],
                actual: vec![height as i64, width as i64, channels as i64],
            });
        }
        Ok(Self { data })
    }

    /// Convert an interleaved RGB8 buffer
    pub fn from_rgb8(image: &RgbImage) -> Self {
        let (width, height) = image.dimensions();
        let mut data = Array3::zeros((height as usize, width as usize, CHANNELS));

        for (x, y, pixel) in image.enumerate_pixels() {
            for (c, &value) in pixel.0.iter().enumerate() {
                if let Some(slot) = data.get_mut((y as usize, x as usize, c)) {
                    *slot = f32::from(value);
                }
            }
        }

        Self { data }
    }

    /// Uniform pixel noise in `[0, 255)`, reproducible for a given seed
    pub fn from_noise(width: u32, height: u32, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let data = Array3::from_shape_simple_fn((height as usize, width as usize, CHANNELS), || {
            rng.random_range(0.0_f32..255.0)
        });
        Self { data }
    }

    /// Convert back to interleaved RGB8, rounding and clamping to `[0, 255]`
    pub fn to_rgb8(&self) -> RgbImage {
        let (height, width, _) = self.data.dim();
        RgbImage::from_fn(width as u32, height as u32, |x, y| {
            let mut pixel = [0_u8; CHANNELS];
            for (c, out) in pixel.iter_mut().enumerate() {
                let value = self
                    .data
                    .get((y as usize, x as usize, c))
                    .copied()
                    .unwrap_or(0.0);
                *out = to_byte(value);
            }
            image::Rgb(pixel)
        })
    }

    /// Build a `[1, 3, height, width]` network input on `device`
    pub fn to_network_input(&self, device: Device) -> Tensor {
        let (height, width, _) = self.data.dim();
        // Logical iteration order is row-major HWC whatever the memory layout
        let flat: Vec<f32> = self.data.iter().copied().collect();

        Tensor::from_slice(&flat)
            .view([height as i64, width as i64, CHANNELS as i64])
            .permute([2, 0, 1])
            .unsqueeze(0)
            .contiguous()
            .to_device(device)
    }

    /// Read a `[1, 3, height, width]` network tensor back into pixel layout
    ///
    /// # Errors
    ///
    /// Returns an error if the tensor is not a single three channel image or
    /// its contents cannot be copied to host memory
    pub fn from_network_output(tensor: &Tensor) -> Result<Self> {
        let size = tensor.size();
        let (height, width) = match size.as_slice() {
            [1, 3, h, w] => (*h, *w),
            _ => {
                return Err(TransferError::ShapeMismatch {
                    what: "network image",
                    expected: vec![1, CHANNELS as i64, -1, -1],
                    actual: size,
                });
            }
        };

        let hwc = tensor
            .detach()
            .to_device(Device::Cpu)
            .to_kind(Kind::Float)
            .squeeze_dim(0)
            .permute([1, 2, 0])
            .contiguous()
            .view([-1]);
        let flat = Vec::<f32>::try_from(&hwc)
            .map_err(|source| tensor_error("copy image to host", source))?;

        let data = Array3::from_shape_vec((height as usize, width as usize, CHANNELS), flat)
            .map_err(|_shape_error| TransferError::ShapeMismatch {
                what: "host image buffer",
                expected: vec![height, width, CHANNELS as i64],
                actual: vec![hwc.numel() as i64],
            })?;

        Ok(Self { data })
    }

    /// Image width in pixels
    pub fn width(&self) -> u32 {
        self.data.dim().1 as u32
    }

    /// Image height in pixels
    pub fn height(&self) -> u32 {
        self.data.dim().0 as u32
    }

    /// Shape as `(height, width, channels)`
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Read-only view of the pixel data
    pub fn view(&self) -> ArrayView3<'_, f32> {
        self.data.view()
    }
}

fn to_byte(value: f32) -> u8 {
    // NaN maps to 0 so a diverged run still produces a file
    if value.is_nan() {
        0
    } else {
        value.round().clamp(0.0, 255.0) as u8
    }
}

/// Decode an image and resize it to exactly `width` x `height`
///
/// # Errors
///
/// Returns an error if:
/// - The file at `path` cannot be opened
/// - The file is not a decodable image format
pub fn load_image(path: &Path, width: u32, height: u32) -> Result<ImageTensor> {
    let decoded = image::open(path).map_err(|source| TransferError::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;

    let resized = decoded.resize_exact(width, height, RESIZE_FILTER).to_rgb8();
    tracing::debug!(
        path = %path.display(),
        source_width = decoded.width(),
        source_height = decoded.height(),
        width,
        height,
        "loaded image"
    );

    Ok(ImageTensor::from_rgb8(&resized))
}

/// File name for an output written at `time`
pub fn timestamped_file_name(time: DateTime<Local>) -> String {
    format!("{}.{OUTPUT_EXTENSION}", time.format(TIMESTAMP_FORMAT))
}

/// Write `image` into `directory` under the current timestamp
///
/// Two writes within the same second target the same file; the later one wins.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the image cannot be
/// encoded and written
pub fn save_image(image: &ImageTensor, directory: &Path) -> Result<PathBuf> {
    let path = directory.join(timestamped_file_name(Local::now()));
    save_image_as(image, &path)?;
    Ok(path)
}

/// Write `image` as PNG to an explicit path
///
/// # Errors
///
/// Returns an error if:
/// - The parent directory cannot be created
/// - The image cannot be encoded or saved to the specified path
pub fn save_image_as(image: &ImageTensor, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_path(parent, "create directory")?;
    }

    image
        .to_rgb8()
        .save_with_format(path, ImageFormat::Png)
        .map_err(|source| TransferError::ImageExport {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::info!(path = %path.display(), "wrote image");
    Ok(())
}
