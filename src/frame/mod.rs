
//! Frames in their three stages: raw planes, transformed blocks, and compressed bytes.
//! Key frames are coded on their own, predicted frames relative to a decoded reference.

pub mod key;
pub mod motion;
pub mod predicted;

pub use crate::plane::Channel;

use crate::color::{ColorConversion, RgbaImage};
use crate::compression::{self, rle, ByteVec, Bytes, CoefficientBlock, BLOCK_SAMPLE_COUNT};
use crate::compression::quantize::QuantizationTables;
use crate::error::{Error, Result};
use crate::math::Vec2;
use crate::plane::{self, chroma_size, Plane, PlaneSet, ResidualPlane};
use self::key::KeyFrame;
use self::motion::VectorField;
use self::predicted::PredictedFrame;


/// Position of a frame inside a frame chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameIndex(pub usize);

impl std::fmt::Display for FrameIndex {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "frame {}", self.0)
    }
}


/// A frame that has been transformed into quantized coefficients, but not yet serialized.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {

    /// Coded without any reference.
    Key(KeyFrame),

    /// Coded as the difference to a motion compensated prediction from its predecessor.
    Predicted {

        /// The transformed residual and the motion vectors.
        frame: PredictedFrame,

        /// The frame that must be decoded before this frame.
        predecessor: FrameIndex,
    },
}

impl Frame {

    /// The frame this frame is predicted from, if any.
    pub fn predecessor(&self) -> Option<FrameIndex> {
        match self {
            Frame::Key(_) => None,
            Frame::Predicted { predecessor, .. } => Some(*predecessor),
        }
    }

    /// Whether this frame can be decoded without any other frame.
    pub fn is_key(&self) -> bool {
        matches!(self, Frame::Key(_))
    }

    /// Width and height in pixels.
    pub fn size(&self) -> Vec2<usize> {
        match self {
            Frame::Key(frame) => frame.size(),
            Frame::Predicted { frame, .. } => frame.size(),
        }
    }

    /// The quantized blocks of all channels.
    /// For predicted frames, these are the blocks of the residual.
    pub fn coefficients(&self) -> &FrameCoefficients {
        match self {
            Frame::Key(frame) => frame.coefficients(),
            Frame::Predicted { frame, .. } => frame.residuals(),
        }
    }

    /// The motion vectors of a channel. Key frames have none.
    pub fn macroblocks(&self, channel: Channel) -> Option<&VectorField> {
        match self {
            Frame::Key(_) => None,
            Frame::Predicted { frame, .. } => Some(frame.motion_vectors().field(channel)),
        }
    }

    /// Compress the frame. Key frames are compressed without their header.
    pub fn serialize(&self) -> ByteVec {
        match self {
            Frame::Key(frame) => frame.serialize(),
            Frame::Predicted { frame, .. } => frame.serialize(),
        }
    }
}


/// The fully decoded planes of a frame, used as the reference for the next frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    planes: PlaneSet,
}

impl DecodedFrame {

    /// Wrap planes that have a consistent size.
    pub fn new(planes: PlaneSet) -> Result<Self> {
        validate_plane_sizes(&planes)?;
        Ok(DecodedFrame { planes })
    }

    /// Width and height in pixels.
    #[inline]
    pub fn size(&self) -> Vec2<usize> { self.planes.size() }

    /// The luma and chroma planes.
    #[inline]
    pub fn planes(&self) -> &PlaneSet { &self.planes }

    /// The plane of the specified channel.
    #[inline]
    pub fn plane(&self, channel: Channel) -> &Plane { self.planes.plane(channel) }

    /// Take ownership of the planes.
    pub fn into_planes(self) -> PlaneSet { self.planes }

    /// Convert to opaque pixels using the default color conversion.
    pub fn to_rgba(&self) -> RgbaImage {
        self.to_rgba_with(ColorConversion::default())
    }

    /// Convert to opaque pixels using a custom color conversion.
    pub fn to_rgba_with(&self, conversion: ColorConversion) -> RgbaImage {
        self.planes.to_rgba(conversion)
    }
}


/// The number of blocks and macroblocks for each channel of a frame with a specific size.
/// This is all that is required to split a decompressed frame into its parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockGrid {
    frame_size: Vec2<usize>,
}

impl BlockGrid {

    /// The grid for a frame of the specified pixel size.
    pub fn new(frame_size: Vec2<usize>) -> Self {
        BlockGrid { frame_size }
    }

    /// Width and height of the frame in pixels.
    pub fn frame_size(&self) -> Vec2<usize> { self.frame_size }

    /// Luma has the full size, chroma has half the size.
    pub fn plane_size(&self, channel: Channel) -> Vec2<usize> {
        if channel.is_chroma() { chroma_size(self.frame_size) } else { self.frame_size }
    }

    /// The number of transform blocks in each direction.
    pub fn blocks(&self, channel: Channel) -> Vec2<usize> {
        plane::block_count(self.plane_size(channel))
    }

    /// The number of motion compensated macroblocks in each direction.
    pub fn macroblocks(&self, channel: Channel) -> Vec2<usize> {
        motion::macroblock_count(self.plane_size(channel), channel)
    }

    /// Byte size of all quantized blocks of all channels.
    pub fn coefficient_byte_count(&self) -> Result<usize> {
        self.checked_sum(|grid, channel| checked_area(grid.blocks(channel))?.checked_mul(BLOCK_SAMPLE_COUNT))
    }

    /// Byte size of all motion vectors of all channels.
    pub fn vector_byte_count(&self) -> Result<usize> {
        self.checked_sum(|grid, channel| checked_area(grid.macroblocks(channel))?.checked_mul(motion::MotionVector::BYTE_SIZE))
    }

    fn checked_sum(&self, count: impl Fn(&Self, Channel) -> Option<usize>) -> Result<usize> {
        Channel::ALL.iter()
            .try_fold(0_usize, |sum, &channel| sum.checked_add(count(self, channel)?))
            .ok_or_else(|| Error::malformed("frame dimensions too large"))
    }
}

fn checked_area(size: Vec2<usize>) -> Option<usize> {
    size.width().checked_mul(size.height())
}


/// The quantized 8x8 blocks of one channel, in raster order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelBlocks {
    channel: Channel,
    count: Vec2<usize>,
    blocks: Vec<CoefficientBlock>,
}

impl ChannelBlocks {

    /// Transform the absolute samples of a plane.
    pub(crate) fn from_samples(channel: Channel, plane: &Plane, tables: &QuantizationTables, parallel: bool) -> Self {
        let table = tables.for_channel(channel);
        Self::transform(channel, plane.size(), parallel, |block_index| {
            compression::encode_sample_block(&plane.block(block_index), table)
        })
    }

    /// Transform the signed differences of a residual plane.
    pub(crate) fn from_residual(channel: Channel, residual: &ResidualPlane, tables: &QuantizationTables, parallel: bool) -> Self {
        let table = tables.for_channel(channel);
        Self::transform(channel, residual.size(), parallel, |block_index| {
            compression::encode_residual_block(&residual.block(block_index), table)
        })
    }

    fn transform(
        channel: Channel, plane_size: Vec2<usize>, parallel: bool,
        encode_block: impl Fn(Vec2<usize>) -> CoefficientBlock + Sync + Send
    ) -> Self
    {
        let count = plane::block_count(plane_size);
        let blocks = compression::map_indices(count.area(), parallel, |index| {
            encode_block(Vec2(index % count.width(), index / count.width()))
        });

        log::trace!("transformed {}x{} blocks of {:?}", count.width(), count.height(), channel);
        ChannelBlocks { channel, count, blocks }
    }

    /// Restore the absolute samples of a plane.
    pub(crate) fn to_samples(&self, plane_size: Vec2<usize>, tables: &QuantizationTables, parallel: bool) -> Plane {
        debug_assert_eq!(plane::block_count(plane_size), self.count, "block count bug");

        let table = tables.for_channel(self.channel);
        let blocks = compression::map_indices(self.blocks.len(), parallel, |index| {
            compression::decode_sample_block(&self.blocks[index], table)
        });

        Plane::from_blocks(plane_size, &blocks)
    }

    /// Restore the signed differences of a residual plane.
    pub(crate) fn to_residual(&self, plane_size: Vec2<usize>, tables: &QuantizationTables, parallel: bool) -> ResidualPlane {
        debug_assert_eq!(plane::block_count(plane_size), self.count, "block count bug");

        let table = tables.for_channel(self.channel);
        let blocks = compression::map_indices(self.blocks.len(), parallel, |index| {
            compression::decode_residual_block(&self.blocks[index], table)
        });

        ResidualPlane::from_blocks(plane_size, &blocks)
    }

    /// Append all blocks in zigzag order.
    pub(crate) fn write(&self, bytes: &mut ByteVec) {
        for block in &self.blocks {
            compression::write_coefficient_block(block, bytes);
        }
    }

    /// Read the blocks of a channel and advance the slice.
    pub(crate) fn read(channel: Channel, count: Vec2<usize>, bytes: &mut Bytes<'_>) -> Result<Self> {
        let blocks = (0 .. count.area())
            .map(|_| compression::read_coefficient_block(bytes))
            .collect::<Result<Vec<_>>>()?;

        Ok(ChannelBlocks { channel, count, blocks })
    }

    /// The channel these blocks belong to.
    pub fn channel(&self) -> Channel { self.channel }

    /// The number of blocks in each direction.
    pub fn count(&self) -> Vec2<usize> { self.count }

    /// All blocks, row by row.
    pub fn blocks(&self) -> &[CoefficientBlock] { &self.blocks }
}


/// The quantized blocks of all three channels of a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameCoefficients {

    /// Luma blocks.
    pub y: ChannelBlocks,

    /// Blue chroma blocks.
    pub cb: ChannelBlocks,

    /// Red chroma blocks.
    pub cr: ChannelBlocks,
}

impl FrameCoefficients {

    /// Build from one value per channel, in stream order.
    pub(crate) fn try_from_channels(mut channel: impl FnMut(Channel) -> Result<ChannelBlocks>) -> Result<Self> {
        Ok(FrameCoefficients {
            y: channel(Channel::Luma)?,
            cb: channel(Channel::BlueChroma)?,
            cr: channel(Channel::RedChroma)?,
        })
    }

    /// The blocks of the specified channel.
    pub fn channel(&self, channel: Channel) -> &ChannelBlocks {
        match channel {
            Channel::Luma => &self.y,
            Channel::BlueChroma => &self.cb,
            Channel::RedChroma => &self.cr,
        }
    }

    /// Append all blocks, luma first.
    pub(crate) fn write(&self, bytes: &mut ByteVec) {
        for channel in Channel::ALL {
            self.channel(channel).write(bytes);
        }
    }

    /// Read the blocks of all channels in stream order.
    pub(crate) fn read(grid: &BlockGrid, bytes: &mut Bytes<'_>) -> Result<Self> {
        Self::try_from_channels(|channel| ChannelBlocks::read(channel, grid.blocks(channel), bytes))
    }
}


/// Check that the chroma planes have half the size of the luma plane,
/// and that the frame contains at least one pixel.
pub(crate) fn validate_plane_sizes(planes: &PlaneSet) -> Result<()> {
    if planes.size().area() == 0 {
        return Err(Error::invalid("frame without pixels"));
    }

    let expected = chroma_size(planes.size());
    if planes.cb.size() != expected || planes.cr.size() != expected {
        return Err(Error::invalid("chroma planes must have half the size of the luma plane"));
    }

    Ok(())
}

/// Expand the compressed bytes of a frame, which must result in exactly `expected_byte_size` bytes.
pub(crate) fn decompress_frame(compressed: Bytes<'_>, expected_byte_size: usize) -> Result<ByteVec> {
    let decompressed = rle::decompress_bytes(compressed, expected_byte_size)?;

    if decompressed.len() < expected_byte_size {
        Err(Error::truncated(format!(
            "frame data contains {} bytes, but the dimensions require {} bytes",
            decompressed.len(), expected_byte_size
        )))
    }
    else if decompressed.len() > expected_byte_size {
        Err(Error::malformed(format!(
            "frame data contains {} bytes, but the dimensions only allow {} bytes",
            decompressed.len(), expected_byte_size
        )))
    }
    else {
        Ok(decompressed)
    }
}
