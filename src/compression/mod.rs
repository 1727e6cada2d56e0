
//! The block pipeline shared by key frames and predicted frames:
//! transform 8x8 blocks, quantize the coefficients,
//! store them in zigzag order, and compress the resulting bytes.


pub mod rle;
pub mod dct;
pub mod quantize;
pub mod zigzag;


pub(crate) use crate::error::{Result, Error};
use self::quantize::QuantizationTable;
use crate::color::clamp_to_byte;
use crate::io::take_n;


/// A byte vector.
pub type ByteVec = Vec<u8>;

/// A byte slice.
pub type Bytes<'s> = &'s [u8];

/// Width and height of a transform block.
pub const BLOCK_SIZE: usize = 8;

/// Number of samples in a transform block.
pub const BLOCK_SAMPLE_COUNT: usize = BLOCK_SIZE * BLOCK_SIZE;

/// Quantized frequency coefficients of one 8x8 block, stored row by row.
pub type CoefficientBlock = [i8; BLOCK_SAMPLE_COUNT];

/// The offset that moves unsigned samples to be centered around zero.
const SAMPLE_BIAS: f32 = 128.0;


/// Center the samples on zero, transform and quantize them.
pub fn encode_sample_block(samples: &[u8; BLOCK_SAMPLE_COUNT], table: &QuantizationTable) -> CoefficientBlock {
    let centered = samples.map(|sample| sample as f32 - SAMPLE_BIAS);
    encode_residual_block(&centered, table)
}

/// Dequantize and inverse transform the coefficients,
/// then add the bias again, round and clamp to a byte.
pub fn decode_sample_block(coefficients: &CoefficientBlock, table: &QuantizationTable) -> [u8; BLOCK_SAMPLE_COUNT] {
    decode_residual_block(coefficients, table)
        .map(|sample| clamp_to_byte((sample + SAMPLE_BIAS).round()))
}

/// Transform and quantize signed differences. No bias is applied.
pub fn encode_residual_block(differences: &[f32; BLOCK_SAMPLE_COUNT], table: &QuantizationTable) -> CoefficientBlock {
    let mut coefficients = [0.0_f32; BLOCK_SAMPLE_COUNT];
    dct::block_transform_8x8().forward(differences, &mut coefficients);
    table.quantize(&coefficients)
}

/// Dequantize and inverse transform the coefficients into signed differences.
pub fn decode_residual_block(coefficients: &CoefficientBlock, table: &QuantizationTable) -> [f32; BLOCK_SAMPLE_COUNT] {
    let mut differences = [0.0_f32; BLOCK_SAMPLE_COUNT];
    dct::block_transform_8x8().inverse(&table.dequantize(coefficients), &mut differences);
    differences
}


/// Append the coefficients in zigzag order, each as one signed byte.
pub fn write_coefficient_block(coefficients: &CoefficientBlock, bytes: &mut ByteVec) {
    bytes.extend(zigzag::to_zigzag(coefficients).iter().map(|&coefficient| coefficient as u8));
}

/// Read 64 signed bytes in zigzag order and move the slice forward.
pub fn read_coefficient_block(bytes: &mut Bytes<'_>) -> Result<CoefficientBlock> {
    let sequence = take_n(bytes, BLOCK_SAMPLE_COUNT)
        .map_err(|_| Error::truncated("coefficient block"))?;

    let mut zigzag = [0_i8; BLOCK_SAMPLE_COUNT];
    for (coefficient, &byte) in zigzag.iter_mut().zip(sequence) {
        *coefficient = byte as i8;
    }

    Ok(zigzag::from_zigzag(&zigzag))
}


/// Compute one value per index, in parallel if requested and the `rayon` feature is enabled.
/// The results are always in index order, so both paths produce the same output.
pub(crate) fn map_indices<T, F>(count: usize, parallel: bool, compute: F) -> Vec<T>
    where T: Send, F: Fn(usize) -> T + Sync + Send
{
    #[cfg(feature = "rayon")] {
        if parallel {
            use rayon::prelude::*;
            return (0 .. count).into_par_iter().map(compute).collect();
        }
    }

    #[cfg(not(feature = "rayon"))]
    let _ = parallel;

    (0 .. count).map(compute).collect()
}
