use super::error::ViBeError;
use super::neighborhood::random_neighbor;
use super::params::{ViBeParams, BACKGROUND, FOREGROUND, FREEZE_THRESHOLD};
use super::types::{Segmentation, SegmentationModel};
use anyhow::{Context, Result};
use image::GrayImage;
use ndarray::{s, Array2, Array3, ArrayView1, ArrayView2, ArrayView3, Zip};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Sample-consensus background model
///
/// Every pixel keeps a small library of past intensities. A new value is
/// background when at least `min_matches` of those samples lie strictly
/// within `match_radius` of it. Background pixels occasionally refresh a
/// random slot of their own library and push their value into a neighbor's.
///
/// One instance owns the state of one stream. Frames must be fed in order:
/// the first to [`ViBe::initialize`], the rest to [`ViBe::classify_and_update`].
pub struct ViBe {
    params: ViBeParams,
    width: usize,
    height: usize,
    // Same grid as (width, height), as image dimensions
    frame_size: (u32, u32),

    // (num_samples, height, width)
    samples: Array3<u8>,
    mask: Array2<u8>,
    // Consecutive background frames per pixel
    bg_count: Array2<u32>,

    initialized: bool,
    rng: StdRng,
}

impl ViBe {
    /// Create a model for a `width` x `height` stream, seeded from the OS
    pub fn new(width: usize, height: usize, params: ViBeParams) -> Result<Self, ViBeError> {
        Self::with_rng(width, height, params, StdRng::from_os_rng())
    }

    /// Create a model whose random draws are reproducible for a given seed
    pub fn with_seed(
        width: usize,
        height: usize,
        params: ViBeParams,
        seed: u64,
    ) -> Result<Self, ViBeError> {
        Self::with_rng(width, height, params, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        width: usize,
        height: usize,
        params: ViBeParams,
        rng: StdRng,
    ) -> Result<Self, ViBeError> {
        params.validate()?;
        if width == 0 || height == 0 {
            return Err(ViBeError::InvalidParameter(format!(
                "grid must be non-empty, got {}x{}",
                width, height
            )));
        }
        let frame_size = match (u32::try_from(width), u32::try_from(height)) {
            (Ok(w), Ok(h)) => (w, h),
            _ => {
                return Err(ViBeError::InvalidParameter(format!(
                    "grid {}x{} exceeds image dimensions",
                    width, height
                )));
            }
        };

        tracing::info!(
            "Creating ViBe model {}x{} (samples={}, min_matches={}, radius={}, subsampling={})",
            width,
            height,
            params.num_samples,
            params.min_matches,
            params.match_radius,
            params.subsampling
        );

        Ok(Self {
            params,
            width,
            height,
            frame_size,
            samples: Array3::zeros((params.num_samples, height, width)),
            mask: Array2::zeros((height, width)),
            bg_count: Array2::zeros((height, width)),
            initialized: false,
            rng,
        })
    }

    /// Seed the sample library from the first frame of a stream
    ///
    /// Each slot of each pixel takes the frame value of a random pixel in
    /// its 3x3 neighborhood (borders clamp), drawn independently per slot.
    /// Mask and counter start from zero. Calling this again restarts the stream.
    pub fn initialize(&mut self, frame: ArrayView2<u8>) -> Result<(), ViBeError> {
        self.check_shape(&frame)?;
        let _span = tracing::debug_span!("vibe_initialize").entered();

        let dims = (self.height, self.width);
        for mut slot in self.samples.outer_iter_mut() {
            for ((y, x), sample) in slot.indexed_iter_mut() {
                let source = random_neighbor(&mut self.rng, (y, x), dims);
                *sample = frame[source];
            }
        }

        self.mask.fill(BACKGROUND);
        self.bg_count.fill(0);
        self.initialized = true;

        Ok(())
    }

    /// Classify a frame against the library, then update the library
    ///
    /// The whole grid is classified before any sample is rewritten. Pixels
    /// background for more than [`FREEZE_THRESHOLD`] consecutive frames are
    /// left out of both update passes, but keep their background label.
    pub fn classify_and_update(
        &mut self,
        frame: ArrayView2<u8>,
    ) -> Result<Segmentation, ViBeError> {
        self.check_shape(&frame)?;
        if !self.initialized {
            return Err(ViBeError::NotInitialized);
        }

        let eligible = self.classify(&frame);
        self.update_own_samples(&frame, &eligible);
        self.diffuse_to_neighbors(&frame, &eligible);

        let foreground_count = self.mask.iter().filter(|&&v| v == FOREGROUND).count();
        tracing::debug!("Foreground pixels: {}", foreground_count);

        Ok(Segmentation {
            mask: self.mask.clone(),
            foreground_count,
        })
    }

    /// Writes the mask and counters; returns which pixels may update this frame
    fn classify(&mut self, frame: &ArrayView2<u8>) -> Array2<bool> {
        let _span = tracing::debug_span!("vibe_classify").entered();

        let samples = &self.samples;
        let params = self.params;
        let mut eligible = Array2::from_elem((self.height, self.width), false);

        Zip::indexed(&mut self.mask)
            .and(&mut self.bg_count)
            .and(&mut eligible)
            .and(frame)
            .for_each(|(y, x), mask, count, eligible, &value| {
                let library = samples.slice(s![.., y, x]);
                let matches =
                    count_matches(library, value, params.match_radius, params.min_matches);

                if matches >= params.min_matches {
                    *mask = BACKGROUND;
                    *count = count.saturating_add(1);
                    *eligible = *count <= FREEZE_THRESHOLD;
                } else {
                    *mask = FOREGROUND;
                    *count = 0;
                    *eligible = false;
                }
            });

        eligible
    }

    /// Each eligible pixel overwrites one random slot of its own library
    /// with probability `1 / subsampling`
    fn update_own_samples(&mut self, frame: &ArrayView2<u8>, eligible: &Array2<bool>) {
        let _span = tracing::debug_span!("vibe_update_self").entered();

        for ((y, x), &ok) in eligible.indexed_iter() {
            if !ok || self.rng.random_range(0..self.params.subsampling) != 0 {
                continue;
            }
            let slot = self.rng.random_range(0..self.params.num_samples);
            self.samples[[slot, y, x]] = frame[[y, x]];
        }
    }

    /// Second, independent gate: selected pixels write their own value into
    /// a random slot of a random neighbor (possibly themselves at borders)
    fn diffuse_to_neighbors(&mut self, frame: &ArrayView2<u8>, eligible: &Array2<bool>) {
        let _span = tracing::debug_span!("vibe_update_neighbor").entered();

        let dims = (self.height, self.width);
        for ((y, x), &ok) in eligible.indexed_iter() {
            if !ok || self.rng.random_range(0..self.params.subsampling) != 0 {
                continue;
            }
            let (ny, nx) = random_neighbor(&mut self.rng, (y, x), dims);
            let slot = self.rng.random_range(0..self.params.num_samples);
            self.samples[[slot, ny, nx]] = frame[[y, x]];
        }
    }

    fn check_shape(&self, frame: &ArrayView2<u8>) -> Result<(), ViBeError> {
        let expected = (self.height, self.width);
        let actual = frame.dim();
        if actual != expected {
            return Err(ViBeError::ShapeMismatch { expected, actual });
        }
        Ok(())
    }

    /// Drop back to the uninitialized state
    pub fn reset(&mut self) {
        self.samples.fill(0);
        self.mask.fill(BACKGROUND);
        self.bg_count.fill(0);
        self.initialized = false;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn params(&self) -> &ViBeParams {
        &self.params
    }

    /// Returns (width, height)
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Sample library, shaped (num_samples, height, width)
    pub fn samples(&self) -> ArrayView3<'_, u8> {
        self.samples.view()
    }

    /// Mask from the last classified frame
    pub fn mask(&self) -> ArrayView2<'_, u8> {
        self.mask.view()
    }

    pub fn background_count(&self) -> ArrayView2<'_, u32> {
        self.bg_count.view()
    }
}

/// Count samples strictly within `radius` of `value`, stopping once `needed` is reached
fn count_matches(library: ArrayView1<u8>, value: u8, radius: u32, needed: usize) -> usize {
    let mut matches = 0;
    for &sample in library.iter() {
        if u32::from(sample.abs_diff(value)) < radius {
            matches += 1;
            if matches >= needed {
                break;
            }
        }
    }
    matches
}

impl SegmentationModel for ViBe {
    fn segment(&mut self, frame: &GrayImage) -> Result<Segmentation> {
        let _span = tracing::debug_span!("vibe_segment").entered();

        let (width, height) = frame.dimensions();
        let shape = (height as usize, width as usize);
        if shape != (self.height, self.width) {
            return Err(ViBeError::ShapeMismatch {
                expected: (self.height, self.width),
                actual: shape,
            }
            .into());
        }

        let pixels = frame
            .as_raw()
            .get(..shape.0 * shape.1)
            .context("Frame buffer shorter than its dimensions")?;
        let view = ArrayView2::from_shape(shape, pixels).context("Failed to view frame as grid")?;

        // First frame of a stream seeds the library
        if !self.initialized {
            self.initialize(view)?;
            return Ok(Segmentation::empty(self.width, self.height));
        }

        Ok(self.classify_and_update(view)?)
    }

    fn reset_state(&mut self) {
        tracing::info!("Resetting ViBe sample library");
        self.reset();
    }

    fn input_size(&self) -> (u32, u32) {
        self.frame_size
    }
}
