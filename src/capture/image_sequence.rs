use super::CaptureSource;
use anyhow::{bail, Context, Result};
use image::DynamicImage;
use std::fs;
use std::path::{Path, PathBuf};

const EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

/// Frames decoded one by one from a directory of still images
///
/// Files are ordered by path, so zero-padded names play back in sequence.
pub struct ImageSequence {
    files: Vec<PathBuf>,
    next: usize,
    width: u32,
    height: u32,
}

impl ImageSequence {
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        Self::open_with_prefix(dir, None)
    }

    /// Only files whose name starts with `prefix` are played
    pub fn open_with_prefix<P: AsRef<Path>>(dir: P, prefix: Option<&str>) -> Result<Self> {
        let dir = dir.as_ref();
        tracing::info!("Scanning {} for frames", dir.display());

        let mut files = Vec::new();
        collect_frames(dir, prefix, &mut files)?;
        files.sort();

        let Some(first) = files.first() else {
            bail!("No image frames found in {}", dir.display());
        };

        let (width, height) = image::image_dimensions(first)
            .with_context(|| format!("Failed to read dimensions of {}", first.display()))?;

        tracing::info!("Found {} frames at {}x{}", files.len(), width, height);

        Ok(Self {
            files,
            next: 0,
            width,
            height,
        })
    }
}

fn collect_frames(dir: &Path, prefix: Option<&str>, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to read directory {}", dir.display()))?;

    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to list {}", dir.display()))?
            .path();

        if path.is_dir() {
            collect_frames(&path, prefix, files)?;
        } else if is_frame(&path, prefix) {
            files.push(path);
        }
    }

    Ok(())
}

fn is_frame(path: &Path, prefix: Option<&str>) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if prefix.is_some_and(|p| !name.starts_with(p)) {
        return false;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext)))
}

impl CaptureSource for ImageSequence {
    fn capture_frame(&mut self) -> Result<Option<DynamicImage>> {
        let Some(path) = self.files.get(self.next) else {
            return Ok(None);
        };
        self.next += 1;

        let frame = image::open(path)
            .with_context(|| format!("Failed to decode frame {}", path.display()))?;

        Ok(Some(frame))
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn frame_count(&self) -> Option<usize> {
        Some(self.files.len())
    }
}
