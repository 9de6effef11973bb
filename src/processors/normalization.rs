//! Frame normalization.
//!
//! Turns a decoded image or a raw 32-bit BGRA camera buffer into the flat
//! float buffer the classifier expects: resized to a fixed square, scaled,
//! mean/std normalized per channel, and laid out channel-major or
//! pixel-major.

use crate::core::{ClassifierError, ClassifierResult};
use crate::core::config::DEFAULT_INPUT_SHAPE;
use crate::processors::types::ChannelOrder;
use image::imageops::FilterType;
use image::{DynamicImage, Rgb, RgbImage};

const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Normalizes frames for classification.
///
/// Each output value is `pixel * alpha[c] + beta[c]`, where
/// `alpha = scale / std` and `beta = -mean / std`.
#[derive(Debug, Clone)]
pub struct FrameNormalizer {
    /// Target (width, height)
    input_size: (u32, u32),
    /// Scaling factors for each channel (alpha = scale / std)
    alpha: [f32; 3],
    /// Offset values for each channel (beta = -mean / std)
    beta: [f32; 3],
    /// Output channel ordering
    order: ChannelOrder,
    /// Resampling filter used when the frame is not already the target size
    filter: FilterType,
}

impl FrameNormalizer {
    /// Creates a new normalizer.
    ///
    /// # Arguments
    ///
    /// * `input_size` - Target (width, height)
    /// * `scale` - Optional scaling factor (defaults to 1.0/255.0)
    /// * `mean` - Optional mean values for each channel (defaults to ImageNet)
    /// * `std` - Optional standard deviation values for each channel (defaults to ImageNet)
    /// * `order` - Optional channel ordering (defaults to CHW)
    ///
    /// # Errors
    ///
    /// Returns an error if the size is zero, scale is not positive, mean or std
    /// do not have exactly 3 elements, or any std value is not positive.
    pub fn new(
        input_size: (u32, u32),
        scale: Option<f32>,
        mean: Option<Vec<f32>>,
        std: Option<Vec<f32>>,
        order: Option<ChannelOrder>,
    ) -> ClassifierResult<Self> {
        let scale = scale.unwrap_or(1.0 / 255.0);
        let mean = mean.unwrap_or_else(|| IMAGENET_MEAN.to_vec());
        let std = std.unwrap_or_else(|| IMAGENET_STD.to_vec());

        if input_size.0 == 0 || input_size.1 == 0 {
            return Err(ClassifierError::config_error(format!(
                "Input size must be positive, got {}x{}",
                input_size.0, input_size.1
            )));
        }

        if scale <= 0.0 || !scale.is_finite() {
            return Err(ClassifierError::config_error(
                "Scale must be a finite value greater than 0",
            ));
        }

        let mean: [f32; 3] = mean.try_into().map_err(|_| {
            ClassifierError::config_error("Mean must have exactly 3 elements for RGB")
        })?;
        let std: [f32; 3] = std.try_into().map_err(|_| {
            ClassifierError::config_error("Std must have exactly 3 elements for RGB")
        })?;

        for (i, &s) in std.iter().enumerate() {
            if s <= 0.0 {
                return Err(ClassifierError::config_error(format!(
                    "Standard deviation at index {i} must be greater than 0, got {s}"
                )));
            }
        }

        Ok(Self {
            input_size,
            alpha: std.map(|s| scale / s),
            beta: [
                -mean[0] / std[0],
                -mean[1] / std[1],
                -mean[2] / std[2],
            ],
            order: order.unwrap_or_default(),
            filter: FilterType::Triangle,
        })
    }

    /// ImageNet normalization at the given size, channel-major.
    pub fn imagenet(input_size: (u32, u32)) -> ClassifierResult<Self> {
        Self::new(input_size, None, None, None, None)
    }

    /// Sets the output channel order.
    pub fn with_order(mut self, order: ChannelOrder) -> Self {
        self.order = order;
        self
    }

    /// Sets the resampling filter.
    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    /// Returns the target (width, height).
    pub fn input_size(&self) -> (u32, u32) {
        self.input_size
    }

    /// Number of values in one normalized frame.
    pub fn output_len(&self) -> usize {
        3 * self.input_size.0 as usize * self.input_size.1 as usize
    }

    /// Resizes and normalizes a decoded image.
    pub fn normalize_image(&self, image: &DynamicImage) -> Vec<f32> {
        self.normalize_rgb(&image.to_rgb8())
    }

    /// Resizes (if needed) and normalizes an RGB image.
    pub fn normalize_rgb(&self, image: &RgbImage) -> Vec<f32> {
        let (width, height) = self.input_size;
        if image.dimensions() == self.input_size {
            return self.normalize_resized(image);
        }
        let resized = image::imageops::resize(image, width, height, self.filter);
        self.normalize_resized(&resized)
    }

    /// Normalizes a raw 32-bit BGRA buffer as delivered by camera pipelines.
    ///
    /// # Arguments
    ///
    /// * `width`, `height` - Frame dimensions in pixels
    /// * `bytes_per_row` - Row stride in bytes, at least `width * 4`
    /// * `data` - Pixel bytes in B, G, R, A order
    pub fn normalize_bgra(
        &self,
        width: u32,
        height: u32,
        bytes_per_row: usize,
        data: &[u8],
    ) -> ClassifierResult<Vec<f32>> {
        if width == 0 || height == 0 {
            return Err(ClassifierError::invalid_input(format!(
                "Frame dimensions must be positive, got {}x{}",
                width, height
            )));
        }

        let row_bytes = width as usize * 4;
        if bytes_per_row < row_bytes {
            return Err(ClassifierError::validation_error(
                "FrameNormalizer",
                "bytes_per_row",
                &format!("at least {}", row_bytes),
                &bytes_per_row.to_string(),
            ));
        }

        let expected = bytes_per_row * (height as usize - 1) + row_bytes;
        if data.len() < expected {
            return Err(ClassifierError::BufferTooSmall {
                expected,
                actual: data.len(),
            });
        }

        let rgb = RgbImage::from_fn(width, height, |x, y| {
            let i = y as usize * bytes_per_row + x as usize * 4;
            Rgb([data[i + 2], data[i + 1], data[i]])
        });
        Ok(self.normalize_rgb(&rgb))
    }

    fn normalize_resized(&self, image: &RgbImage) -> Vec<f32> {
        let (width, height) = image.dimensions();
        let plane = width as usize * height as usize;
        let mut out = vec![0.0f32; plane * 3];

        match self.order {
            ChannelOrder::CHW => {
                for (i, pixel) in image.pixels().enumerate() {
                    for c in 0..3 {
                        out[c * plane + i] = pixel[c] as f32 * self.alpha[c] + self.beta[c];
                    }
                }
            }
            ChannelOrder::HWC => {
                for (i, pixel) in image.pixels().enumerate() {
                    for c in 0..3 {
                        out[i * 3 + c] = pixel[c] as f32 * self.alpha[c] + self.beta[c];
                    }
                }
            }
        }

        out
    }
}

impl Default for FrameNormalizer {
    fn default() -> Self {
        Self {
            input_size: DEFAULT_INPUT_SHAPE,
            alpha: IMAGENET_STD.map(|s| (1.0 / 255.0) / s),
            beta: [
                -IMAGENET_MEAN[0] / IMAGENET_STD[0],
                -IMAGENET_MEAN[1] / IMAGENET_STD[1],
                -IMAGENET_MEAN[2] / IMAGENET_STD[2],
            ],
            order: ChannelOrder::CHW,
            filter: FilterType::Triangle,
        }
    }
}
