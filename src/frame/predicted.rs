//! Predicted frames, coded as the difference to a motion compensated prediction
//! from the decoded previous frame.
//!
//! The stream contains the quantized residual blocks of all channels,
//! followed by the motion vectors of all channels, all of it run length compressed.
//! Width and height are not stored, they are taken from the reference frame.

use super::*;
use super::motion::{self, MotionVectors};
use super::key::bits_per_pixel;
use crate::options::CodecOptions;


/// A predicted frame that has been transformed and quantized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictedFrame {
    size: Vec2<usize>,
    residuals: FrameCoefficients,
    vectors: MotionVectors,
}

impl PredictedFrame {

    /// Search motion vectors against the decoded reference,
    /// and transform the difference between the planes and the motion compensated reference.
    pub fn transform(planes: &PlaneSet, reference: &DecodedFrame, options: &CodecOptions) -> Result<Self> {
        options.validate()?;
        validate_plane_sizes(planes)?;

        if planes.size() != reference.size() {
            return Err(Error::invalid("reference frame size does not match frame size"));
        }

        let radius = options.search_radius;
        let field = |channel| motion::estimate(
            planes.plane(channel), reference.plane(channel), channel, radius, options.parallel
        );

        let vectors = MotionVectors {
            y: field(Channel::Luma),
            cb: field(Channel::BlueChroma),
            cr: field(Channel::RedChroma),
        };

        let residuals = FrameCoefficients::try_from_channels(|channel| {
            let predicted = motion::compensate(reference.plane(channel), vectors.field(channel), radius)?;
            let residual = ResidualPlane::difference(planes.plane(channel), &predicted);
            Ok(ChannelBlocks::from_residual(channel, &residual, &options.tables, options.parallel))
        })?;

        Ok(PredictedFrame { size: planes.size(), residuals, vectors })
    }

    /// Width and height in pixels.
    pub fn size(&self) -> Vec2<usize> { self.size }

    /// The quantized residual blocks of all channels.
    pub fn residuals(&self) -> &FrameCoefficients { &self.residuals }

    /// The motion vectors of all channels.
    pub fn motion_vectors(&self) -> &MotionVectors { &self.vectors }

    /// Compress the residual blocks and the motion vectors.
    pub fn serialize(&self) -> ByteVec {
        let grid = BlockGrid::new(self.size);
        let byte_count = grid.coefficient_byte_count().unwrap_or_default() + grid.vector_byte_count().unwrap_or_default();

        let mut bytes = Vec::with_capacity(byte_count);
        self.residuals.write(&mut bytes);
        self.vectors.write(&mut bytes);

        rle::compress_bytes(&bytes)
    }

    /// Decompress the residual blocks and the motion vectors of a frame with known dimensions.
    /// The vectors are only validated when the frame is reconstructed.
    pub fn parse(size: Vec2<usize>, compressed: Bytes<'_>) -> Result<Self> {
        if size.area() == 0 {
            return Err(Error::malformed("predicted frame without pixels"));
        }

        let grid = BlockGrid::new(size);
        let expected_byte_size = grid.coefficient_byte_count()?
            .checked_add(grid.vector_byte_count()?)
            .ok_or_else(|| Error::malformed("frame dimensions too large"))?;

        let bytes = decompress_frame(compressed, expected_byte_size)?;
        let mut remaining = bytes.as_slice();

        let residuals = FrameCoefficients::read(&grid, &mut remaining)?;
        let vectors = MotionVectors::read(|channel| grid.plane_size(channel), &mut remaining)?;
        debug_assert!(remaining.is_empty(), "predicted frame size bug");

        Ok(PredictedFrame { size, residuals, vectors })
    }

    /// Predict each plane from the reference using the motion vectors, and add the residual.
    /// Returns `Error::InvalidVector` if a vector exceeds the search radius of the options.
    pub fn reconstruct(&self, reference: &DecodedFrame, options: &CodecOptions) -> Result<DecodedFrame> {
        if reference.size() != self.size {
            return Err(Error::invalid("reference frame size does not match frame size"));
        }

        let grid = BlockGrid::new(self.size);
        let plane = |channel| -> Result<Plane> {
            let predicted = motion::compensate(reference.plane(channel), self.vectors.field(channel), options.search_radius)?;

            let residual = self.residuals.channel(channel)
                .to_residual(grid.plane_size(channel), &options.tables, options.parallel);

            Ok(residual.restore(&predicted))
        };

        Ok(DecodedFrame {
            planes: PlaneSet {
                y: plane(Channel::Luma)?,
                cb: plane(Channel::BlueChroma)?,
                cr: plane(Channel::RedChroma)?,
            }
        })
    }
}


/// Encode pixels relative to the decoded reference frame.
/// The reference must be what the decoder will see, not the original pixels of the previous frame.
pub fn encode_predicted_frame(image: &RgbaImage, reference: &DecodedFrame, options: &CodecOptions) -> Result<ByteVec> {
    let planes = PlaneSet::from_rgba(image, options.color);
    let frame = PredictedFrame::transform(&planes, reference, options)?;
    let bytes = frame.serialize();

    log::debug!(
        "encoded {}x{} predicted frame into {} bytes ({:.2} bits per pixel)",
        frame.size.width(), frame.size.height(), bytes.len(),
        bits_per_pixel(bytes.len(), frame.size)
    );

    Ok(bytes)
}

/// Decode a predicted frame using the decoded previous frame.
pub fn decode_predicted_frame(bytes: Bytes<'_>, reference: &DecodedFrame, options: &CodecOptions) -> Result<DecodedFrame> {
    let frame = PredictedFrame::parse(reference.size(), bytes)?;
    log::debug!("decoding {}x{} predicted frame from {} bytes", frame.size.width(), frame.size.height(), bytes.len());
    frame.reconstruct(reference, options)
}


#[cfg(test)]
mod test {
    use super::*;
    use super::motion::MotionVector;
    use crate::color::Rgba;
    use crate::frame::key::{decode_key_frame, encode_key_frame};

    fn moving_square(size: Vec2<usize>, offset: usize) -> RgbaImage {
        RgbaImage::from_fn(size, |Vec2(x, y)| {
            let inside = (x >= 8 + offset && x < 24 + offset) && (y >= 8 && y < 24);
            if inside { Rgba::opaque(230, 40, 40) } else { Rgba::opaque(30, 90, (x * 4) as u8) }
        })
    }

    fn moving_waves(size: Vec2<usize>, offset: usize) -> RgbaImage {
        RgbaImage::from_fn(size, |Vec2(x, y)| {
            let phase = (x as f32 - offset as f32) * 0.3;
            let wave = |amplitude: f32, shift: f32| (128.0 + amplitude * (phase + shift).sin() + 20.0 * (y as f32 * 0.2).cos()) as u8;
            Rgba::opaque(wave(60.0, 0.0), wave(40.0, 1.0), wave(50.0, 2.0))
        })
    }

    #[test]
    fn unchanged_frame_has_empty_residual(){
        let options = CodecOptions::default();
        let image = moving_square(Vec2(32, 32), 0);
        let reference = decode_key_frame(&encode_key_frame(&image, &options).unwrap(), &options).unwrap();

        let frame = PredictedFrame::transform(reference.planes(), &reference, &options).unwrap();
        assert!(frame.residuals().y.blocks().iter().all(|block| block.iter().all(|&coefficient| coefficient == 0)));
        assert!(frame.motion_vectors().y.vectors().iter().all(|&vector| vector == MotionVector::ZERO));

        let decoded = frame.reconstruct(&reference, &options).unwrap();
        assert_eq!(decoded, reference);
    }

    #[test]
    fn moving_content_round_trip(){
        let options = CodecOptions::sequential();
        let size = Vec2(48, 32);

        let first = moving_waves(size, 0);
        let reference = decode_key_frame(&encode_key_frame(&first, &options).unwrap(), &options).unwrap();

        let second = moving_waves(size, 4);
        let bytes = encode_predicted_frame(&second, &reference, &options).unwrap();
        let decoded = decode_predicted_frame(&bytes, &reference, &options).unwrap();

        let expected = PlaneSet::from_rgba(&second, options.color);
        assert!(decoded.planes().y.mean_squared_error(&expected.y).unwrap() < 30.0);
        assert!(decoded.planes().cr.mean_squared_error(&expected.cr).unwrap() < 30.0);

        // the content moved right by four pixels, so it is found four pixels to the left in the reference
        let field = PredictedFrame::parse(size, &bytes).unwrap().motion_vectors().y.clone();
        assert_eq!(field.get(Vec2(2, 1)), MotionVector::new(-4, 0));
    }

    #[test]
    fn decoder_checks_vectors_against_radius(){
        let options = CodecOptions::default();
        let image = moving_square(Vec2(32, 32), 0);
        let reference = decode_key_frame(&encode_key_frame(&image, &options).unwrap(), &options).unwrap();

        let bytes = encode_predicted_frame(&moving_square(Vec2(32, 32), 6), &reference, &options).unwrap();
        assert!(decode_predicted_frame(&bytes, &reference, &options).is_ok());

        // the last two bytes are the vector of the last red chroma macroblock
        let mut raw = rle::decompress_bytes(&bytes, 0).unwrap();
        let vector_start = raw.len() - 2;
        raw[vector_start] = 100;

        let corrupted = rle::compress_bytes(&raw);
        assert!(matches!(
            decode_predicted_frame(&corrupted, &reference, &options),
            Err(Error::InvalidVector { vector: (100, _), radius: 8 })
        ));

        // a larger radius allows the length, but the vector still points outside of the plane
        let wide = options.with_search_radius(127);
        assert!(matches!(
            decode_predicted_frame(&corrupted, &reference, &wide),
            Err(Error::InvalidVector { vector: (100, _), radius: 127 })
        ));
    }

    #[test]
    fn stream_size_is_checked(){
        let options = CodecOptions::default();
        let image = moving_square(Vec2(32, 32), 0);
        let reference = decode_key_frame(&encode_key_frame(&image, &options).unwrap(), &options).unwrap();
        let bytes = encode_predicted_frame(&moving_square(Vec2(32, 32), 2), &reference, &options).unwrap();

        assert!(matches!(PredictedFrame::parse(Vec2(40, 32), &bytes), Err(Error::TruncatedStream(_))));
        assert!(matches!(PredictedFrame::parse(Vec2(16, 16), &bytes), Err(Error::MalformedHeader(_))));

        let other_size = decode_key_frame(
            &encode_key_frame(&moving_square(Vec2(16, 16), 0), &options).unwrap(), &options
        ).unwrap();

        assert!(matches!(decode_predicted_frame(&bytes, &other_size, &options), Err(Error::MalformedHeader(_))));
    }
}
