use anyhow::Result;
use image::GrayImage;
use ndarray::Array2;

use super::params::FOREGROUND;

/// Per-frame result: binary mask plus the number of foreground pixels
///
/// Mask values are exactly 0 (background) or 255 (foreground), shaped
/// (height, width) like the input frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segmentation {
    pub mask: Array2<u8>,
    pub foreground_count: usize,
}

impl Segmentation {
    /// All-background result, produced for the frame that seeds a model
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            mask: Array2::zeros((height, width)),
            foreground_count: 0,
        }
    }

    /// Fraction of the grid classified as foreground
    pub fn foreground_ratio(&self) -> f64 {
        if self.mask.is_empty() {
            return 0.0;
        }
        self.foreground_count as f64 / self.mask.len() as f64
    }

    pub fn is_foreground(&self, y: usize, x: usize) -> bool {
        self.mask.get((y, x)).is_some_and(|&v| v == FOREGROUND)
    }
}

/// Trait for background segmentation models
/// Allows swapping the sample-consensus model for other per-pixel backends
pub trait SegmentationModel {
    /// Process a grayscale frame and return its foreground mask
    ///
    /// The first frame of a stream seeds the model and yields an
    /// all-background mask.
    fn segment(&mut self, frame: &GrayImage) -> Result<Segmentation>;

    /// Forget everything learned so far
    ///
    /// Call this when:
    /// - Switching sources
    /// - Scene cuts detected
    /// - Starting a new video
    fn reset_state(&mut self) {}

    /// Get the model's working dimensions
    ///
    /// Returns (width, height)
    fn input_size(&self) -> (u32, u32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_has_no_foreground() {
        let seg = Segmentation::empty(5, 3);
        assert_eq!(seg.mask.dim(), (3, 5));
        assert_eq!(seg.foreground_count, 0);
        assert_eq!(seg.foreground_ratio(), 0.0);
        assert!(!seg.is_foreground(1, 1));
    }

    #[test]
    fn ratio_and_lookup() {
        let mut mask = Array2::zeros((2, 2));
        mask[[0, 1]] = FOREGROUND;
        let seg = Segmentation {
            mask,
            foreground_count: 1,
        };
        assert_eq!(seg.foreground_ratio(), 0.25);
        assert!(seg.is_foreground(0, 1));
        assert!(!seg.is_foreground(1, 1));
        assert!(!seg.is_foreground(5, 5));
    }
}
