//! Still frames, coded without any reference:
//! an 8 byte header with the dimensions,
//! followed by the run length compressed zigzag blocks of luma, blue chroma, and red chroma.

use super::*;
use crate::error::{usize_to_u32, u32_to_usize, UnitResult};
use crate::io::{Data, Read, Write};
use crate::options::CodecOptions;


/// The dimensions of a still frame, stored as two little endian `u32` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {

    /// Width and height in pixels.
    pub size: Vec2<usize>,
}

impl Header {

    /// The number of bytes of a serialized header.
    pub const BYTE_SIZE: usize = 2 * u32::BYTE_SIZE;

    /// Returns an error if the frame has no pixels.
    pub fn validate(&self) -> UnitResult {
        if self.size.area() == 0 {
            return Err(Error::malformed(format!(
                "frame dimensions {}x{} contain no pixels", self.size.width(), self.size.height()
            )));
        }

        Ok(())
    }

    /// Write width and height.
    pub fn write(&self, write: &mut impl Write) -> UnitResult {
        usize_to_u32(self.size.width(), "frame width")?.write(write)?;
        usize_to_u32(self.size.height(), "frame height")?.write(write)?;
        Ok(())
    }

    /// Read width and height and validate them.
    pub fn read(read: &mut impl Read) -> Result<Self> {
        let width = u32::read(read)?;
        let height = u32::read(read)?;

        let header = Header { size: Vec2(u32_to_usize(width), u32_to_usize(height)) };
        header.validate()?;
        Ok(header)
    }
}


/// A still frame that has been transformed and quantized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFrame {
    size: Vec2<usize>,
    coefficients: FrameCoefficients,
}

impl KeyFrame {

    /// Transform and quantize all blocks of all planes.
    pub fn transform(planes: &PlaneSet, options: &CodecOptions) -> Result<Self> {
        validate_plane_sizes(planes)?;

        let coefficients = FrameCoefficients::try_from_channels(|channel| Ok(ChannelBlocks::from_samples(
            channel, planes.plane(channel), &options.tables, options.parallel
        )))?;

        Ok(KeyFrame { size: planes.size(), coefficients })
    }

    /// Width and height in pixels.
    pub fn size(&self) -> Vec2<usize> { self.size }

    /// The quantized blocks of all channels.
    pub fn coefficients(&self) -> &FrameCoefficients { &self.coefficients }

    /// The header of this frame.
    pub fn header(&self) -> Header { Header { size: self.size } }

    /// Compress the blocks of all channels, without a header.
    /// This is how the first frame of a frame chain is stored.
    pub fn serialize(&self) -> ByteVec {
        let mut bytes = Vec::with_capacity(
            BlockGrid::new(self.size).coefficient_byte_count().unwrap_or_default()
        );

        self.coefficients.write(&mut bytes);
        rle::compress_bytes(&bytes)
    }

    /// The complete still frame stream, including the header.
    pub fn to_bytes(&self) -> Result<ByteVec> {
        let mut bytes = Vec::new();
        self.header().write(&mut bytes)?;
        bytes.extend_from_slice(&self.serialize());
        Ok(bytes)
    }

    /// Decompress the blocks of a frame with known dimensions, stored without a header.
    pub fn parse(size: Vec2<usize>, compressed: Bytes<'_>) -> Result<Self> {
        Header { size }.validate()?;

        let grid = BlockGrid::new(size);
        let bytes = decompress_frame(compressed, grid.coefficient_byte_count()?)?;
        let coefficients = FrameCoefficients::read(&grid, &mut bytes.as_slice())?;

        Ok(KeyFrame { size, coefficients })
    }

    /// Read the header and decompress the blocks of a complete still frame stream.
    pub fn from_bytes(mut bytes: Bytes<'_>) -> Result<Self> {
        let header = Header::read(&mut bytes)?;
        Self::parse(header.size, bytes)
    }

    /// Dequantize and inverse transform all blocks, and assemble the planes.
    pub fn reconstruct(&self, options: &CodecOptions) -> DecodedFrame {
        let grid = BlockGrid::new(self.size);
        let plane = |channel| self.coefficients.channel(channel)
            .to_samples(grid.plane_size(channel), &options.tables, options.parallel);

        DecodedFrame {
            planes: PlaneSet {
                y: plane(Channel::Luma),
                cb: plane(Channel::BlueChroma),
                cr: plane(Channel::RedChroma),
            }
        }
    }
}


/// Encode pixels as a complete still frame stream.
pub fn encode_key_frame(image: &RgbaImage, options: &CodecOptions) -> Result<ByteVec> {
    options.validate()?;

    let planes = PlaneSet::from_rgba(image, options.color);
    let frame = KeyFrame::transform(&planes, options)?;
    let bytes = frame.to_bytes()?;

    log::debug!(
        "encoded {}x{} key frame into {} bytes ({:.2} bits per pixel)",
        frame.size.width(), frame.size.height(), bytes.len(),
        bits_per_pixel(bytes.len(), frame.size)
    );

    Ok(bytes)
}

/// Decode a complete still frame stream.
pub fn decode_key_frame(bytes: Bytes<'_>, options: &CodecOptions) -> Result<DecodedFrame> {
    let frame = KeyFrame::from_bytes(bytes)?;
    log::debug!("decoding {}x{} key frame from {} bytes", frame.size.width(), frame.size.height(), bytes.len());
    Ok(frame.reconstruct(options))
}

pub(crate) fn bits_per_pixel(byte_count: usize, size: Vec2<usize>) -> f64 {
    (byte_count * 8) as f64 / size.area().max(1) as f64
}


#[cfg(test)]
mod test {
    use super::*;
    use crate::color::Rgba;

    fn gradient(size: Vec2<usize>) -> RgbaImage {
        RgbaImage::from_fn(size, |Vec2(x, y)| Rgba::opaque((x * 9) as u8, (y * 13) as u8, 128))
    }

    #[test]
    fn header_is_little_endian(){
        let mut bytes = Vec::new();
        Header { size: Vec2(258, 3) }.write(&mut bytes).unwrap();
        assert_eq!(bytes, [2, 1, 0, 0, 3, 0, 0, 0]);

        assert_eq!(Header::read(&mut bytes.as_slice()).unwrap().size, Vec2(258, 3));
        assert!(matches!(Header::read(&mut &bytes[.. 5]), Err(Error::TruncatedStream(_))));
        assert!(matches!(Header::read(&mut [0_u8, 0, 0, 0, 3, 0, 0, 0].as_slice()), Err(Error::MalformedHeader(_))));
    }

    #[test]
    fn stream_starts_with_uncompressed_header(){
        let image = gradient(Vec2(20, 12));
        let bytes = encode_key_frame(&image, &CodecOptions::default()).unwrap();
        assert_eq!(&bytes[.. 8], &[20, 0, 0, 0, 12, 0, 0, 0]);

        let decoded = decode_key_frame(&bytes, &CodecOptions::default()).unwrap();
        assert_eq!(decoded.size(), Vec2(20, 12));
        assert_eq!(decoded.plane(Channel::BlueChroma).size(), Vec2(10, 6));
    }

    #[test]
    fn chain_payload_has_no_header(){
        let planes = PlaneSet::from_rgba(&gradient(Vec2(9, 9)), ColorConversion::default());
        let frame = KeyFrame::transform(&planes, &CodecOptions::default()).unwrap();

        let payload = frame.serialize();
        assert_eq!(KeyFrame::parse(Vec2(9, 9), &payload).unwrap(), frame);
        assert_eq!(KeyFrame::from_bytes(&frame.to_bytes().unwrap()).unwrap(), frame);
    }

    #[test]
    fn wrong_dimensions_are_detected(){
        let planes = PlaneSet::from_rgba(&gradient(Vec2(16, 16)), ColorConversion::default());
        let payload = KeyFrame::transform(&planes, &CodecOptions::default()).unwrap().serialize();

        assert!(matches!(KeyFrame::parse(Vec2(24, 16), &payload), Err(Error::TruncatedStream(_))));
        assert!(matches!(KeyFrame::parse(Vec2(8, 8), &payload), Err(Error::MalformedHeader(_))));
        assert!(matches!(KeyFrame::parse(Vec2(0, 8), &payload), Err(Error::MalformedHeader(_))));
    }

    #[test]
    fn empty_images_are_rejected(){
        let image = RgbaImage::from_fn(Vec2(0, 5), |_| Rgba::default());
        assert!(matches!(encode_key_frame(&image, &CodecOptions::default()), Err(Error::Invalid(_))));
    }
}
