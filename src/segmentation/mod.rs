pub mod error;
pub mod neighborhood;
mod params;
mod preprocess;
pub mod types;
mod vibe;

pub use error::ViBeError;
pub use params::{ViBeParams, BACKGROUND, FOREGROUND, FREEZE_THRESHOLD};
pub use preprocess::Preprocessor;
pub use types::{Segmentation, SegmentationModel};
pub use vibe::ViBe;

use anyhow::{Context, Result};

/// Create a default segmentation model (ViBe)
///
/// A `seed` makes the model's random draws reproducible.
pub fn create_default_model(
    width: u32,
    height: u32,
    params: ViBeParams,
    seed: Option<u64>,
) -> Result<Box<dyn SegmentationModel>> {
    let width = usize::try_from(width).context("Frame width does not fit in memory")?;
    let height = usize::try_from(height).context("Frame height does not fit in memory")?;
    let model = match seed {
        Some(seed) => ViBe::with_seed(width, height, params, seed)?,
        None => ViBe::new(width, height, params)?,
    };
    Ok(Box::new(model))
}
