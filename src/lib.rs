
//! Encode RGBA bitmaps as block transformed still frames,
//! and sequences of bitmaps as motion compensated frame chains.
//!
//! ```
//! use blockcodec::prelude::*;
//!
//! let image = RgbaImage::from_fn(Vec2(32, 24), |Vec2(x, y)| Rgba::opaque(x as u8 * 8, y as u8 * 10, 128));
//! let options = CodecOptions::default();
//!
//! let bytes = encode_key_frame(&image, &options).unwrap();
//! let decoded = decode_key_frame(&bytes, &options).unwrap();
//! assert_eq!(decoded.to_rgba().size(), Vec2(32, 24));
//! ```

#![forbid(unsafe_code)]


pub mod io;
pub mod math;
pub mod error;
pub mod color;
pub mod plane;
pub mod compression;
pub mod frame;
pub mod chain;
pub mod options;


pub mod prelude {

    // main exports
    pub use crate::frame::key::{encode_key_frame, decode_key_frame};
    pub use crate::frame::predicted::{encode_predicted_frame, decode_predicted_frame};
    pub use crate::chain::{FrameChain, ChainEncoder, ChainDecoder};
    pub use crate::options::CodecOptions;

    // core data types
    pub use crate::color::{Rgba, RgbaImage, ColorConversion};
    pub use crate::frame::{DecodedFrame, Frame, FrameIndex, Channel};
    pub use crate::plane::{Plane, PlaneSet};
    pub use crate::compression::quantize::{QuantizationTable, QuantizationTables};
    pub use crate::math::Vec2;

    // secondary data types
    pub use crate::frame::motion::{MotionVector, VectorField};
    pub use crate::error::{self, Error, Result};
}
