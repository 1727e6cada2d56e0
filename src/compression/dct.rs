//! Two dimensional DCT-II and its inverse, for blocks of any size.
//!
//! The transform is orthonormal:
//! `F(u,v) = C(u) C(v) 2/sqrt(NM) Σ h(x,y) cos(uπ(2x+1)/2N) cos(vπ(2y+1)/2M)`,
//! with `C(0) = 1/sqrt(2)` and `C(k) = 1` otherwise.
//! Computations use single precision floats and never round.

use smallvec::SmallVec;
use std::f32::consts::{FRAC_1_SQRT_2, PI};
use std::sync::OnceLock;
use super::{BLOCK_SIZE, BLOCK_SAMPLE_COUNT};


/// Precomputed cosine factors for blocks of one size.
/// Blocks are stored row by row, `width` samples per row.
/// Coefficients are stored the same way, with horizontal frequency increasing to the right.
#[derive(Debug, Clone)]
pub struct BlockTransform {
    width: usize,
    height: usize,

    /// `horizontal[u * width + x] = C(u) cos(uπ(2x+1)/2N)`
    horizontal: SmallVec<[f32; BLOCK_SAMPLE_COUNT]>,

    /// `vertical[v * height + y] = C(v) cos(vπ(2y+1)/2M)`
    vertical: SmallVec<[f32; BLOCK_SAMPLE_COUNT]>,

    /// `2 / sqrt(NM)`
    scale: f32,
}

/// Cached transform for the 8x8 blocks used by the codec.
pub fn block_transform_8x8() -> &'static BlockTransform {
    static DCT8: OnceLock<BlockTransform> = OnceLock::new();
    DCT8.get_or_init(|| BlockTransform::new(BLOCK_SIZE, BLOCK_SIZE))
}

impl BlockTransform {

    /// Precompute the cosine factors for blocks of `width` times `height` samples.
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "empty dct block");

        BlockTransform {
            width, height,
            horizontal: cosine_factors(width),
            vertical: cosine_factors(height),
            scale: 2.0 / ((width * height) as f32).sqrt(),
        }
    }

    /// Number of samples in one block.
    #[inline]
    pub fn sample_count(&self) -> usize { self.width * self.height }

    /// Transform samples into frequency coefficients.
    /// Both slices must contain exactly `width * height` values.
    pub fn forward(&self, samples: &[f32], coefficients: &mut [f32]) {
        assert_eq!(samples.len(), self.sample_count(), "dct input size bug");
        assert_eq!(coefficients.len(), self.sample_count(), "dct output size bug");

        let (width, height) = (self.width, self.height);

        // first pass: rows, resulting in one row of horizontal frequencies per y
        let mut rows: SmallVec<[f32; BLOCK_SAMPLE_COUNT]> = SmallVec::from_elem(0.0, self.sample_count());
        for y in 0 .. height {
            let row = &samples[y * width .. (y + 1) * width];

            for u in 0 .. width {
                let basis = &self.horizontal[u * width .. (u + 1) * width];
                rows[y * width + u] = row.iter().zip(basis).map(|(sample, factor)| sample * factor).sum();
            }
        }

        // second pass: columns
        for v in 0 .. height {
            let basis = &self.vertical[v * height .. (v + 1) * height];

            for u in 0 .. width {
                let sum: f32 = basis.iter().enumerate()
                    .map(|(y, factor)| rows[y * width + u] * factor)
                    .sum();

                coefficients[v * width + u] = sum * self.scale;
            }
        }
    }

    /// Transform frequency coefficients back into samples.
    /// Both slices must contain exactly `width * height` values.
    pub fn inverse(&self, coefficients: &[f32], samples: &mut [f32]) {
        assert_eq!(coefficients.len(), self.sample_count(), "idct input size bug");
        assert_eq!(samples.len(), self.sample_count(), "idct output size bug");

        let (width, height) = (self.width, self.height);

        // first pass: rows, resulting in one row of samples per vertical frequency
        let mut rows: SmallVec<[f32; BLOCK_SAMPLE_COUNT]> = SmallVec::from_elem(0.0, self.sample_count());
        for v in 0 .. height {
            let row = &coefficients[v * width .. (v + 1) * width];

            for x in 0 .. width {
                rows[v * width + x] = row.iter().enumerate()
                    .map(|(u, coefficient)| coefficient * self.horizontal[u * width + x])
                    .sum();
            }
        }

        // second pass: columns
        for y in 0 .. height {
            for x in 0 .. width {
                let sum: f32 = (0 .. height)
                    .map(|v| rows[v * width + x] * self.vertical[v * height + y])
                    .sum();

                samples[y * width + x] = sum * self.scale;
            }
        }
    }
}

fn cosine_factors(length: usize) -> SmallVec<[f32; BLOCK_SAMPLE_COUNT]> {
    let mut factors = SmallVec::with_capacity(length * length);

    for frequency in 0 .. length {
        let normalization = if frequency == 0 { FRAC_1_SQRT_2 } else { 1.0 };

        for position in 0 .. length {
            let angle = frequency as f32 * PI * (2 * position + 1) as f32 / (2 * length) as f32;
            factors.push(normalization * angle.cos());
        }
    }

    factors
}


#[cfg(test)]
mod test {
    use super::*;

    fn assert_close(a: &[f32], b: &[f32], tolerance: f32) {
        for (index, (a, b)) in a.iter().zip(b).enumerate() {
            assert!((a - b).abs() <= tolerance, "value {}: {} is not {}", index, a, b);
        }
    }

    #[test]
    fn constant_block_has_only_dc(){
        let samples = [-28.0_f32; 64];
        let mut coefficients = [0.0; 64];
        block_transform_8x8().forward(&samples, &mut coefficients);

        // C(0)² · 2/8 · 64 · h = 8h
        assert!((coefficients[0] - 8.0 * -28.0).abs() < 1e-3);
        assert_close(&coefficients[1..], &[0.0; 63], 1e-3);
    }

    #[test]
    fn inverse_restores_block(){
        let samples: Vec<f32> = (0 .. 64).map(|index| ((index * 37) % 255) as f32 - 128.0).collect();
        let mut coefficients = [0.0; 64];
        let mut restored = [0.0; 64];

        let transform = block_transform_8x8();
        transform.forward(&samples, &mut coefficients);
        transform.inverse(&coefficients, &mut restored);

        assert_close(&samples, &restored, 1e-2);
    }

    #[test]
    fn horizontal_frequency_is_stored_in_columns(){
        // a block that only changes from left to right
        let samples: Vec<f32> = (0 .. 64).map(|index| (index % 8) as f32).collect();
        let mut coefficients = [0.0; 64];
        block_transform_8x8().forward(&samples, &mut coefficients);

        assert!(coefficients[1].abs() > 1.0);
        assert!(coefficients[8].abs() < 1e-3);
    }

    #[test]
    fn rectangular_blocks(){
        let transform = BlockTransform::new(4, 2);
        let samples = [1.0, 5.0, -3.0, 2.0, 0.5, 0.0, 9.0, -7.0];
        let mut coefficients = [0.0; 8];
        let mut restored = [0.0; 8];

        transform.forward(&samples, &mut coefficients);
        transform.inverse(&coefficients, &mut restored);
        assert_close(&samples, &restored, 1e-4);

        // energy is preserved by an orthonormal transform
        let energy = |values: &[f32]| values.iter().map(|value| value * value).sum::<f32>();
        assert!((energy(&samples) - energy(&coefficients)).abs() < 1e-2);
    }
}
