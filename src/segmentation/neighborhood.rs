use rand::Rng;

/// Offset along one axis, always in `{-1, 0, 1}`
pub type Jitter = isize;

/// Draw a fresh jitter for one axis.
pub fn random_jitter<R: Rng + ?Sized>(rng: &mut R) -> Jitter {
    rng.random_range(-1i32..=1) as Jitter
}

/// Shift `coord` by `jitter` and clamp the result to `[0, extent - 1]`.
///
/// Borders clamp; they never wrap or reflect. `extent` must be non-zero.
pub fn clamp_axis(coord: usize, jitter: Jitter, extent: usize) -> usize {
    let last = extent.saturating_sub(1);
    coord.saturating_add_signed(jitter).min(last)
}

/// Apply a per-axis jitter to a `(y, x)` coordinate inside a `(height, width)` grid.
pub fn jitter_clamp(
    (y, x): (usize, usize),
    (dy, dx): (Jitter, Jitter),
    (height, width): (usize, usize),
) -> (usize, usize) {
    (clamp_axis(y, dy, height), clamp_axis(x, dx, width))
}

/// Pick a random pixel from the 3x3 neighborhood of `(y, x)`, center included.
///
/// Initialization and the diffusion update both go through here so the two
/// always agree on border handling.
pub fn random_neighbor<R: Rng + ?Sized>(
    rng: &mut R,
    point: (usize, usize),
    dims: (usize, usize),
) -> (usize, usize) {
    let dy = random_jitter(rng);
    let dx = random_jitter(rng);
    jitter_clamp(point, (dy, dx), dims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn clamps_low_border() {
        assert_eq!(clamp_axis(0, -1, 5), 0);
        assert_eq!(clamp_axis(0, 0, 5), 0);
        assert_eq!(clamp_axis(0, 1, 5), 1);
    }

    #[test]
    fn clamps_high_border() {
        assert_eq!(clamp_axis(4, 1, 5), 4);
        assert_eq!(clamp_axis(4, -1, 5), 3);
    }

    #[test]
    fn interior_moves_freely() {
        assert_eq!(jitter_clamp((2, 2), (-1, 1), (5, 5)), (1, 3));
        assert_eq!(jitter_clamp((2, 2), (1, -1), (5, 5)), (3, 1));
    }

    #[test]
    fn axes_clamp_independently() {
        // height 3, width 10: y hits the bottom edge while x stays interior
        assert_eq!(jitter_clamp((2, 5), (1, 1), (3, 10)), (2, 6));
        assert_eq!(jitter_clamp((1, 9), (-1, 1), (3, 10)), (0, 9));
    }

    #[test]
    fn single_pixel_grid_maps_to_itself() {
        for dy in -1..=1 {
            for dx in -1..=1 {
                assert_eq!(jitter_clamp((0, 0), (dy, dx), (1, 1)), (0, 0));
            }
        }
    }

    #[test]
    fn random_neighbor_stays_within_chebyshev_one() {
        let mut rng = StdRng::seed_from_u64(7);
        let dims = (4, 6);
        for y in 0..dims.0 {
            for x in 0..dims.1 {
                for _ in 0..50 {
                    let (ny, nx) = random_neighbor(&mut rng, (y, x), dims);
                    assert!(ny < dims.0 && nx < dims.1);
                    assert!(ny.abs_diff(y) <= 1 && nx.abs_diff(x) <= 1);
                }
            }
        }
    }

    #[test]
    fn jitter_covers_all_offsets() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen = [false; 3];
        for _ in 0..200 {
            let j = random_jitter(&mut rng);
            assert!((-1..=1).contains(&j));
            seen[(j + 1) as usize] = true;
        }
        assert_eq!(seen, [true; 3]);
    }
}
