use super::OutputSink;
use anyhow::{ensure, Context, Result};
use image::{GrayImage, ImageFormat};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes each result frame as a numbered PNG in one directory
pub struct ImageSequenceWriter {
    dir: PathBuf,
    width: u32,
    height: u32,
    written: usize,
}

impl ImageSequenceWriter {
    /// Prepare `dir` for output
    ///
    /// A missing directory is created. An existing one is wiped first when
    /// `clean` is set, otherwise frames are written over whatever is there.
    pub fn new<P: AsRef<Path>>(dir: P, width: u32, height: u32, clean: bool) -> Result<Self> {
        let dir = dir.as_ref();
        tracing::info!(
            "Writing {}x{} frames to {}",
            width,
            height,
            dir.display()
        );

        if dir.exists() {
            if clean {
                tracing::info!("Removing existing output in {}", dir.display());
                fs::remove_dir_all(dir)
                    .with_context(|| format!("Failed to remove {}", dir.display()))?;
            } else {
                tracing::warn!("Output directory {} already exists, reusing it", dir.display());
            }
        }
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

        Ok(Self {
            dir: dir.to_path_buf(),
            width,
            height,
            written: 0,
        })
    }

    pub fn frames_written(&self) -> usize {
        self.written
    }

    fn frame_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("frame_{:06}.png", index))
    }
}

impl OutputSink for ImageSequenceWriter {
    fn write_frame(&mut self, frame: &GrayImage) -> Result<()> {
        let _span = tracing::debug_span!("write_frame").entered();

        ensure!(
            frame.dimensions() == (self.width, self.height),
            "Expected {}x{} output frame, got {:?}",
            self.width,
            self.height,
            frame.dimensions()
        );

        let path = self.frame_path(self.written);
        frame
            .save_with_format(&path, ImageFormat::Png)
            .with_context(|| format!("Failed to write frame to {}", path.display()))?;
        self.written += 1;

        Ok(())
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn writes_numbered_frames() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("out");
        let mut writer = ImageSequenceWriter::new(&dir, 3, 2, true).unwrap();
        assert!(dir.is_dir());
        assert_eq!(writer.resolution(), (3, 2));

        writer.write_frame(&GrayImage::from_pixel(3, 2, Luma([1]))).unwrap();
        writer.write_frame(&GrayImage::from_pixel(3, 2, Luma([2]))).unwrap();

        assert_eq!(writer.frames_written(), 2);
        let second = image::open(dir.join("frame_000001.png")).unwrap().to_luma8();
        assert_eq!(second.get_pixel(0, 0)[0], 2);
    }

    #[test]
    fn rejects_wrong_resolution() {
        let tmp = tempfile::tempdir().unwrap();
        let mut writer = ImageSequenceWriter::new(tmp.path().join("out"), 3, 2, true).unwrap();
        assert!(writer.write_frame(&GrayImage::new(2, 2)).is_err());
        assert_eq!(writer.frames_written(), 0);
    }

    #[test]
    fn clean_removes_stale_frames() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("out");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("stale.png"), b"old").unwrap();

        ImageSequenceWriter::new(&dir, 1, 1, false).unwrap();
        assert!(dir.join("stale.png").exists());

        ImageSequenceWriter::new(&dir, 1, 1, true).unwrap();
        assert!(!dir.join("stale.png").exists());
    }
}
