//! Divide transform coefficients by a step size per frequency, and multiply them back.

use crate::error::{Error, Result};
use crate::plane::Channel;
use super::{BLOCK_SAMPLE_COUNT, CoefficientBlock};


/// Step sizes for all 64 frequencies of an 8x8 block, stored row by row,
/// with the horizontal frequency increasing to the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuantizationTable([u16; BLOCK_SAMPLE_COUNT]);

impl QuantizationTable {

    /// The luminance table from the JPEG standard, Annex K.
    pub const LUMINANCE: QuantizationTable = QuantizationTable([
        16, 11, 10, 16,  24,  40,  51,  61,
        12, 12, 14, 19,  26,  58,  60,  55,
        14, 13, 16, 24,  40,  57,  69,  56,
        14, 17, 22, 29,  51,  87,  80,  62,
        18, 22, 37, 56,  68, 109, 103,  77,
        24, 35, 55, 64,  81, 104, 113,  92,
        49, 64, 78, 87, 103, 121, 120, 101,
        72, 92, 95, 98, 112, 100, 103,  99,
    ]);

    /// The chrominance table from the JPEG standard, Annex K.
    pub const CHROMINANCE: QuantizationTable = QuantizationTable([
        17, 18, 24, 47, 99, 99, 99, 99,
        18, 21, 26, 66, 99, 99, 99, 99,
        24, 26, 56, 99, 99, 99, 99, 99,
        47, 66, 99, 99, 99, 99, 99, 99,
        99, 99, 99, 99, 99, 99, 99, 99,
        99, 99, 99, 99, 99, 99, 99, 99,
        99, 99, 99, 99, 99, 99, 99, 99,
        99, 99, 99, 99, 99, 99, 99, 99,
    ]);

    /// Every step is one. Only rounds the coefficients.
    pub const IDENTITY: QuantizationTable = QuantizationTable([1; BLOCK_SAMPLE_COUNT]);

    /// Create a custom table. Returns an error if any step is zero.
    pub fn new(steps: [u16; BLOCK_SAMPLE_COUNT]) -> Result<Self> {
        if steps.contains(&0) {
            return Err(Error::invalid("quantization step of zero"));
        }

        Ok(QuantizationTable(steps))
    }

    /// The step sizes, row by row.
    #[inline]
    pub fn steps(&self) -> &[u16; BLOCK_SAMPLE_COUNT] { &self.0 }

    /// Divide each coefficient by its step and round to the nearest integer, ties to even.
    /// Values that do not fit into a signed byte are saturated.
    pub fn quantize(&self, coefficients: &[f32; BLOCK_SAMPLE_COUNT]) -> CoefficientBlock {
        let mut quantized = [0_i8; BLOCK_SAMPLE_COUNT];

        for ((quantized, coefficient), &step) in quantized.iter_mut().zip(coefficients).zip(&self.0) {
            let rounded = (coefficient / step as f32).round_ties_even();
            *quantized = rounded.clamp(i8::MIN as f32, i8::MAX as f32) as i8;
        }

        quantized
    }

    /// Multiply each quantized coefficient by its step.
    pub fn dequantize(&self, quantized: &CoefficientBlock) -> [f32; BLOCK_SAMPLE_COUNT] {
        let mut coefficients = [0.0_f32; BLOCK_SAMPLE_COUNT];

        for ((coefficient, &quantized), &step) in coefficients.iter_mut().zip(quantized).zip(&self.0) {
            *coefficient = quantized as f32 * step as f32;
        }

        coefficients
    }
}


/// The tables used for brightness and for color blocks.
/// These are not stored in the stream, so the decoder must use the same tables as the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuantizationTables {

    /// Used for all luma blocks, including luma residuals.
    pub luminance: QuantizationTable,

    /// Used for all blue and red chroma blocks, including chroma residuals.
    pub chrominance: QuantizationTable,
}

impl Default for QuantizationTables {
    fn default() -> Self {
        QuantizationTables {
            luminance: QuantizationTable::LUMINANCE,
            chrominance: QuantizationTable::CHROMINANCE,
        }
    }
}

impl QuantizationTables {

    /// Use the same table for all channels.
    pub fn uniform(table: QuantizationTable) -> Self {
        QuantizationTables { luminance: table, chrominance: table }
    }

    /// The table for blocks of the specified channel.
    #[inline]
    pub fn for_channel(&self, channel: Channel) -> &QuantizationTable {
        if channel.is_chroma() { &self.chrominance } else { &self.luminance }
    }
}
