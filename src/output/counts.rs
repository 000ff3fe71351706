use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// CSV of per-frame foreground pixel counts
pub struct ForegroundLog<W: Write = BufWriter<File>> {
    out: W,
}

impl ForegroundLog {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create count log {}", path.display()))?;
        Self::from_writer(BufWriter::new(file))
    }
}

impl<W: Write> ForegroundLog<W> {
    pub fn from_writer(mut out: W) -> Result<Self> {
        writeln!(out, "frame,foreground_pixels").context("Failed to write count log header")?;
        Ok(Self { out })
    }

    pub fn record(&mut self, frame: usize, foreground_pixels: usize) -> Result<()> {
        writeln!(self.out, "{},{}", frame, foreground_pixels)
            .context("Failed to append to count log")
    }

    /// Flush and hand back the underlying writer
    pub fn finish(mut self) -> Result<W> {
        self.out.flush().context("Failed to flush count log")?;
        Ok(self.out)
    }
}
