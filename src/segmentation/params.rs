use super::error::ViBeError;

/// Consecutive background frames after which a pixel stops updating its library
pub const FREEZE_THRESHOLD: u32 = 50;

/// Mask value written for foreground pixels
pub const FOREGROUND: u8 = 255;

/// Mask value written for background pixels
pub const BACKGROUND: u8 = 0;

/// Tuning parameters for the sample-consensus model
///
/// Immutable once a model has been built from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViBeParams {
    /// Depth of each pixel's sample library
    pub num_samples: usize,
    /// Matching samples needed for a pixel to count as background
    pub min_matches: usize,
    /// A sample matches when its absolute difference is strictly below this
    pub match_radius: u32,
    /// Update events fire with probability `1 / subsampling`
    pub subsampling: u32,
}

impl Default for ViBeParams {
    fn default() -> Self {
        Self {
            num_samples: 20,
            min_matches: 3,
            match_radius: 20,
            subsampling: 16,
        }
    }
}

impl ViBeParams {
    pub fn validate(&self) -> Result<(), ViBeError> {
        if self.num_samples == 0 {
            return Err(ViBeError::InvalidParameter(
                "num_samples must be at least 1".into(),
            ));
        }
        if self.min_matches == 0 || self.min_matches > self.num_samples {
            return Err(ViBeError::InvalidParameter(format!(
                "min_matches must be in [1, {}], got {}",
                self.num_samples, self.min_matches
            )));
        }
        if self.match_radius == 0 {
            return Err(ViBeError::InvalidParameter(
                "match_radius must be positive".into(),
            ));
        }
        if self.subsampling == 0 {
            return Err(ViBeError::InvalidParameter(
                "subsampling must be positive".into(),
            ));
        }
        Ok(())
    }
}
