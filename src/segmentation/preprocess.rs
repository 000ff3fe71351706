use anyhow::{ensure, Context, Result};
use image::{imageops, DynamicImage, GenericImageView, GrayImage};
use ndarray::Array2;

/// Preprocessor for turning decoded frames into model-sized grayscale grids
pub struct Preprocessor {
    target_width: u32,
    target_height: u32,
}

impl Preprocessor {
    pub fn new(target_width: u32, target_height: u32) -> Self {
        Self {
            target_width,
            target_height,
        }
    }

    pub fn target_size(&self) -> (u32, u32) {
        (self.target_width, self.target_height)
    }

    /// Preprocess a decoded frame into a single-channel grid
    ///
    /// Steps:
    /// 1. Resize to target dimensions (bilinear)
    /// 2. Convert to 8-bit luma
    pub fn preprocess(&self, image: &DynamicImage) -> GrayImage {
        let _span = tracing::debug_span!("preprocess").entered();

        let resized = if image.dimensions() != (self.target_width, self.target_height) {
            image.resize_exact(
                self.target_width,
                self.target_height,
                imageops::FilterType::Triangle,
            )
        } else {
            image.clone()
        };

        resized.to_luma8()
    }

    /// Convert a (height, width) mask into a grayscale image
    pub fn mask_to_image(mask: &Array2<u8>) -> Result<GrayImage> {
        let (height, width) = mask.dim();
        let pixels: Vec<u8> = mask.iter().copied().collect();
        GrayImage::from_raw(width as u32, height as u32, pixels)
            .context("Mask does not fit an image buffer")
    }

    /// Place the frame on the left and its mask on the right
    ///
    /// Returns: image twice as wide as the frame
    pub fn side_by_side(frame: &GrayImage, mask: &GrayImage) -> Result<GrayImage> {
        let _span = tracing::debug_span!("composite").entered();

        ensure!(
            frame.dimensions() == mask.dimensions(),
            "Frame is {:?} but mask is {:?}",
            frame.dimensions(),
            mask.dimensions()
        );

        let (width, height) = frame.dimensions();
        let mut merged = GrayImage::new(width * 2, height);
        imageops::replace(&mut merged, frame, 0, 0);
        imageops::replace(&mut merged, mask, i64::from(width), 0);

        Ok(merged)
    }
}
