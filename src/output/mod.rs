mod counts;
mod image_writer;

pub use counts::ForegroundLog;
pub use image_writer::ImageSequenceWriter;

use anyhow::Result;
use image::GrayImage;

/// Trait for output destinations
pub trait OutputSink {
    /// Write a frame to the output
    fn write_frame(&mut self, frame: &GrayImage) -> Result<()>;

    /// Get the expected output resolution
    fn resolution(&self) -> (u32, u32);
}
