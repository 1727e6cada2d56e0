
//! Separate pixels into one luma and two subsampled chroma planes,
//! and extract or place the 8x8 blocks that are transformed by the codec.

use crate::color::{ColorConversion, RgbaImage, YCbCr, clamp_to_byte};
use crate::compression::{BLOCK_SIZE, BLOCK_SAMPLE_COUNT};
use crate::error::{Error, Result};
use crate::math::{RoundingMode, Vec2};


/// Identifies one of the three planes of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {

    /// The full resolution brightness plane.
    Luma,

    /// The half resolution blue difference plane.
    BlueChroma,

    /// The half resolution red difference plane.
    RedChroma,
}

impl Channel {

    /// All channels in the order they are stored in a stream.
    pub const ALL: [Channel; 3] = [ Channel::Luma, Channel::BlueChroma, Channel::RedChroma ];

    /// Whether this channel is stored at half resolution.
    #[inline]
    pub fn is_chroma(self) -> bool {
        self != Channel::Luma
    }
}


/// The number of 8x8 blocks that cover a plane of the specified size.
/// Partial blocks at the right and bottom edge are counted.
#[inline]
pub fn block_count(plane_size: Vec2<usize>) -> Vec2<usize> {
    RoundingMode::Up.divide_size(plane_size, BLOCK_SIZE)
}

/// The size of the chroma planes for a frame of the specified size.
/// Odd dimensions are rounded down.
#[inline]
pub fn chroma_size(luma_size: Vec2<usize>) -> Vec2<usize> {
    RoundingMode::Down.divide_size(luma_size, 2)
}


/// A grid of unsigned byte samples, stored row by row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plane {
    size: Vec2<usize>,
    samples: Vec<u8>,
}

impl Plane {

    /// Create a plane from samples in row-major order.
    pub fn new(size: impl Into<Vec2<usize>>, samples: Vec<u8>) -> Result<Self> {
        let size = size.into();

        if samples.len() != size.area() {
            return Err(Error::invalid("sample count does not match plane size"));
        }

        Ok(Plane { size, samples })
    }

    /// Create a plane where each sample has the same value.
    pub fn filled(size: impl Into<Vec2<usize>>, value: u8) -> Self {
        let size = size.into();
        Plane { size, samples: vec![value; size.area()] }
    }

    /// Create a plane by computing each sample from its position.
    pub fn from_fn(size: impl Into<Vec2<usize>>, mut sample: impl FnMut(Vec2<usize>) -> u8) -> Self {
        let size = size.into();

        let samples = (0 .. size.height())
            .flat_map(|y| (0 .. size.width()).map(move |x| Vec2(x, y)))
            .map(|position| sample(position))
            .collect();

        Plane { size, samples }
    }

    /// Width and height of this plane.
    #[inline]
    pub fn size(&self) -> Vec2<usize> { self.size }

    /// All samples, row by row.
    #[inline]
    pub fn samples(&self) -> &[u8] { &self.samples }

    /// Whether this plane contains no samples at all.
    #[inline]
    pub fn is_empty(&self) -> bool { self.samples.is_empty() }

    /// The sample at the specified position.
    /// Panics for positions outside of the plane.
    #[inline]
    pub fn get(&self, position: Vec2<usize>) -> u8 {
        debug_assert!(position.x() < self.size.width() && position.y() < self.size.height(), "sample position bug");
        self.samples[position.y() * self.size.width() + position.x()]
    }

    /// Point-sample every second sample in both directions, without filtering.
    /// The resulting plane has half the size, rounded down.
    pub fn subsample(&self) -> Plane {
        Plane::from_fn(chroma_size(self.size), |position| self.get(position.map(|component| component * 2)))
    }

    /// Look up the subsampled value for a position in the full resolution frame.
    /// Positions in the last row or column of an odd sized frame
    /// are clamped to the border of this plane.
    /// Returns `None` if this plane is empty.
    #[inline]
    pub fn expand(&self, full_resolution_position: Vec2<usize>) -> Option<u8> {
        if self.is_empty() { return None; }

        let Vec2(x, y) = full_resolution_position;
        let x = (x / 2).min(self.size.width() - 1);
        let y = (y / 2).min(self.size.height() - 1);
        Some(self.get(Vec2(x, y)))
    }

    /// Copy the 8x8 block at the specified block coordinate.
    /// Samples outside of this plane are zero.
    pub(crate) fn block(&self, block_index: Vec2<usize>) -> [u8; BLOCK_SAMPLE_COUNT] {
        let mut block = [0_u8; BLOCK_SAMPLE_COUNT];
        let origin = block_index.map(|component| component * BLOCK_SIZE);

        for block_y in 0 .. BLOCK_SIZE {
            let y = origin.y() + block_y;
            if y >= self.size.height() { break; }

            let visible_width = BLOCK_SIZE.min(self.size.width().saturating_sub(origin.x()));
            let row_start = y * self.size.width() + origin.x();
            block[block_y * BLOCK_SIZE .. block_y * BLOCK_SIZE + visible_width]
                .copy_from_slice(&self.samples[row_start .. row_start + visible_width]);
        }

        block
    }

    /// Assemble a plane from 8x8 blocks in raster order.
    /// Blocks at the right and bottom edge are cropped to the plane size.
    pub(crate) fn from_blocks(size: Vec2<usize>, blocks: &[[u8; BLOCK_SAMPLE_COUNT]]) -> Self {
        let block_count = block_count(size);
        debug_assert_eq!(blocks.len(), block_count.area(), "block count bug");

        Plane::from_fn(size, |Vec2(x, y)| {
            let block = &blocks[(y / BLOCK_SIZE) * block_count.width() + x / BLOCK_SIZE];
            block[(y % BLOCK_SIZE) * BLOCK_SIZE + x % BLOCK_SIZE]
        })
    }

    /// Average of the squared sample differences. Used to measure the loss of the codec.
    /// Returns an error if the planes differ in size.
    pub fn mean_squared_error(&self, other: &Plane) -> Result<f64> {
        if self.size != other.size {
            return Err(Error::invalid("planes of different sizes cannot be compared"));
        }

        if self.is_empty() { return Ok(0.0); }

        let sum: f64 = self.samples.iter().zip(&other.samples)
            .map(|(&a, &b)| (a as f64 - b as f64).powi(2))
            .sum();

        Ok(sum / self.samples.len() as f64)
    }
}


/// Signed sample differences between two planes of the same size.
#[derive(Debug, Clone, PartialEq)]
pub struct ResidualPlane {
    size: Vec2<usize>,
    samples: Vec<f32>,
}

impl ResidualPlane {

    /// Subtract the prediction from the actual plane, sample by sample.
    pub fn difference(actual: &Plane, predicted: &Plane) -> Self {
        debug_assert_eq!(actual.size(), predicted.size(), "residual size bug");

        let samples = actual.samples().iter().zip(predicted.samples())
            .map(|(&actual, &predicted)| actual as f32 - predicted as f32)
            .collect();

        ResidualPlane { size: actual.size(), samples }
    }

    /// Width and height of this plane.
    #[inline]
    pub fn size(&self) -> Vec2<usize> { self.size }

    /// All differences, row by row.
    #[inline]
    pub fn samples(&self) -> &[f32] { &self.samples }

    /// Copy the 8x8 block at the specified block coordinate.
    /// Differences outside of this plane are zero.
    pub(crate) fn block(&self, block_index: Vec2<usize>) -> [f32; BLOCK_SAMPLE_COUNT] {
        let mut block = [0.0_f32; BLOCK_SAMPLE_COUNT];
        let origin = block_index.map(|component| component * BLOCK_SIZE);
        let visible_width = BLOCK_SIZE.min(self.size.width().saturating_sub(origin.x()));

        for block_y in 0 .. BLOCK_SIZE {
            let y = origin.y() + block_y;
            if y >= self.size.height() { break; }

            let row_start = y * self.size.width() + origin.x();
            block[block_y * BLOCK_SIZE .. block_y * BLOCK_SIZE + visible_width]
                .copy_from_slice(&self.samples[row_start .. row_start + visible_width]);
        }

        block
    }

    /// Assemble the differences from 8x8 blocks in raster order,
    /// cropping the blocks at the right and bottom edge.
    pub(crate) fn from_blocks(size: Vec2<usize>, blocks: &[[f32; BLOCK_SAMPLE_COUNT]]) -> Self {
        let block_count = block_count(size);
        debug_assert_eq!(blocks.len(), block_count.area(), "block count bug");

        let samples = (0 .. size.height())
            .flat_map(|y| (0 .. size.width()).map(move |x| (x, y)))
            .map(|(x, y)| {
                let block = &blocks[(y / BLOCK_SIZE) * block_count.width() + x / BLOCK_SIZE];
                block[(y % BLOCK_SIZE) * BLOCK_SIZE + x % BLOCK_SIZE]
            })
            .collect();

        ResidualPlane { size, samples }
    }

    /// Add these differences to a prediction.
    /// Each sum is rounded to the nearest integer and clamped to the byte range.
    pub fn restore(&self, predicted: &Plane) -> Plane {
        debug_assert_eq!(self.size, predicted.size(), "residual size bug");

        let samples = predicted.samples().iter().zip(&self.samples)
            .map(|(&predicted, &difference)| clamp_to_byte((predicted as f32 + difference).round()))
            .collect();

        Plane { size: self.size, samples }
    }
}


/// The luma plane and the two half resolution chroma planes of a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaneSet {

    /// Full resolution brightness.
    pub y: Plane,

    /// Half resolution blue difference.
    pub cb: Plane,

    /// Half resolution red difference.
    pub cr: Plane,
}

impl PlaneSet {

    /// Convert each pixel to luma and chroma, then subsample both chroma planes.
    pub fn from_rgba(image: &RgbaImage, conversion: ColorConversion) -> Self {
        let converted: Vec<YCbCr> = image.pixels().iter()
            .map(|&pixel| conversion.rgba_to_ycbcr(pixel))
            .collect();

        let size = image.size();
        let full_plane = |channel: fn(&YCbCr) -> u8| Plane {
            size, samples: converted.iter().map(channel).collect()
        };

        PlaneSet {
            y: full_plane(|pixel| pixel.y),
            cb: full_plane(|pixel| pixel.cb).subsample(),
            cr: full_plane(|pixel| pixel.cr).subsample(),
        }
    }

    /// Combine three separate planes.
    /// Chroma planes can be passed at full resolution, in which case they are subsampled,
    /// or already subsampled to half of the luma size.
    pub fn from_planes(y: Plane, cb: Plane, cr: Plane) -> Result<Self> {
        let subsample_if_required = |chroma: Plane| {
            if chroma.size() == y.size() && chroma.size() != chroma_size(y.size()) { Ok(chroma.subsample()) }
            else if chroma.size() == chroma_size(y.size()) { Ok(chroma) }
            else { Err(Error::invalid("chroma plane size does not match luma plane size")) }
        };

        let cb = subsample_if_required(cb)?;
        let cr = subsample_if_required(cr)?;
        Ok(PlaneSet { y, cb, cr })
    }

    /// Width and height of the full resolution frame.
    #[inline]
    pub fn size(&self) -> Vec2<usize> { self.y.size() }

    /// The plane of the specified channel.
    #[inline]
    pub fn plane(&self, channel: Channel) -> &Plane {
        match channel {
            Channel::Luma => &self.y,
            Channel::BlueChroma => &self.cb,
            Channel::RedChroma => &self.cr,
        }
    }

    /// Expand the chroma planes to full resolution and convert back to opaque pixels.
    /// Empty chroma planes, which occur for frames that are one pixel wide or high,
    /// are treated as neutral chroma.
    pub fn to_rgba(&self, conversion: ColorConversion) -> RgbaImage {
        const NEUTRAL_CHROMA: u8 = 128;

        RgbaImage::from_fn(self.size(), |position| {
            conversion.ycbcr_to_rgba(YCbCr {
                y: self.y.get(position),
                cb: self.cb.expand(position).unwrap_or(NEUTRAL_CHROMA),
                cr: self.cr.expand(position).unwrap_or(NEUTRAL_CHROMA),
            })
        })
    }
}
