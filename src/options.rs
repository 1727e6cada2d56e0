//! Settings shared by the encoder and the decoder.
//! None of these are stored in the stream,
//! so a stream can only be decoded with the options it was encoded with.

use crate::color::ColorConversion;
use crate::compression::quantize::{QuantizationTable, QuantizationTables};
use crate::error::{Error, UnitResult};


/// The largest search radius. Motion vectors are stored as signed bytes.
pub const MAX_SEARCH_RADIUS: u8 = i8::MAX as u8;

/// The search radius used by `CodecOptions::default()`.
pub const DEFAULT_SEARCH_RADIUS: u8 = 8;


/// Controls quality, speed, and motion search of the codec.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CodecOptions {

    /// Motion vectors are searched in `[-radius, radius)` in both directions.
    /// Must not exceed `MAX_SEARCH_RADIUS`.
    pub search_radius: u8,

    /// Quantization step sizes for luma and chroma blocks.
    pub tables: QuantizationTables,

    /// Converts between pixels and luma and chroma samples.
    pub color: ColorConversion,

    /// Transform blocks and search motion vectors on multiple threads.
    /// Has no effect unless the `rayon` feature is enabled.
    /// The output is the same in either case.
    pub parallel: bool,
}

impl Default for CodecOptions {
    fn default() -> Self {
        CodecOptions {
            search_radius: DEFAULT_SEARCH_RADIUS,
            tables: QuantizationTables::default(),
            color: ColorConversion::default(),
            parallel: true,
        }
    }
}

impl CodecOptions {

    /// Default options, but all work happens on the current thread.
    pub fn sequential() -> Self {
        CodecOptions { parallel: false, .. Self::default() }
    }

    /// Default options, but every quantization step is one.
    /// Coefficients still have to fit into a signed byte, and larger ones saturate.
    /// The DC coefficient of an 8x8 block is eight times the mean of the centered samples,
    /// so a block is only restored up to rounding if its mean lies within `112 ..= 143`.
    /// A black block comes back as 112 and a white block as 144.
    pub fn lossless_tables() -> Self {
        Self::default().with_tables(QuantizationTables::uniform(QuantizationTable::IDENTITY))
    }

    /// Replace the search radius.
    pub fn with_search_radius(self, search_radius: u8) -> Self {
        CodecOptions { search_radius, .. self }
    }

    /// Replace the quantization tables.
    pub fn with_tables(self, tables: QuantizationTables) -> Self {
        CodecOptions { tables, .. self }
    }

    /// Returns an error if the search radius does not fit into a motion vector.
    pub fn validate(&self) -> UnitResult {
        if self.search_radius > MAX_SEARCH_RADIUS {
            return Err(Error::invalid(format!(
                "search radius {} exceeds the maximum of {}",
                self.search_radius, MAX_SEARCH_RADIUS
            )));
        }

        Ok(())
    }
}
