mod image_sequence;

pub use image_sequence::ImageSequence;

use anyhow::Result;
use image::DynamicImage;

/// Trait for frame sources
pub trait CaptureSource {
    /// Read the next frame, or `None` once the stream is exhausted
    fn capture_frame(&mut self) -> Result<Option<DynamicImage>>;

    /// Get the resolution of source frames
    fn resolution(&self) -> (u32, u32);

    /// Total number of frames, if known up front
    fn frame_count(&self) -> Option<usize> {
        None
    }
}
