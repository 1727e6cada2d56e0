//! Block matching motion search, and prediction of a plane from motion vectors.
//!
//! Each plane is divided into macroblocks, 16x16 samples for luma and 8x8 samples for chroma,
//! so that both cover the same area of the frame. For each macroblock, the search finds the
//! displacement into the reference plane with the smallest sum of absolute differences.

use crate::compression::{map_indices, ByteVec, Bytes};
use crate::error::{Error, Result, UnitResult};
use crate::io::take_n;
use crate::math::{RoundingMode, Vec2};
use crate::plane::{Channel, Plane};


/// Width and height of the macroblocks of a channel.
#[inline]
pub fn macroblock_size(channel: Channel) -> usize {
    if channel.is_chroma() { 8 } else { 16 }
}

/// The number of macroblocks that cover a plane.
/// Partial macroblocks at the right and bottom edge are counted.
#[inline]
pub fn macroblock_count(plane_size: Vec2<usize>, channel: Channel) -> Vec2<usize> {
    RoundingMode::Up.divide_size(plane_size, macroblock_size(channel))
}


/// The displacement from a macroblock to the matching area in the reference plane.
/// The sample at `(x, y)` is predicted from the reference sample at `(x + dx, y + dy)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MotionVector {

    /// Horizontal displacement in samples.
    pub dx: i8,

    /// Vertical displacement in samples.
    pub dy: i8,
}

impl MotionVector {

    /// Two signed bytes.
    pub const BYTE_SIZE: usize = 2;

    /// No displacement.
    pub const ZERO: MotionVector = MotionVector { dx: 0, dy: 0 };

    /// Create a vector from its components.
    #[inline]
    pub fn new(dx: i8, dy: i8) -> Self { MotionVector { dx, dy } }

    fn exceeds(self, radius: u8) -> bool {
        self.dx.unsigned_abs() > radius || self.dy.unsigned_abs() > radius
    }
}


/// One motion vector per macroblock of a plane, in raster order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorField {
    channel: Channel,
    plane_size: Vec2<usize>,
    count: Vec2<usize>,
    vectors: Vec<MotionVector>,
}

impl VectorField {

    /// A field where no macroblock moves.
    pub fn zero(channel: Channel, plane_size: Vec2<usize>) -> Self {
        let count = macroblock_count(plane_size, channel);
        VectorField { channel, plane_size, count, vectors: vec![MotionVector::ZERO; count.area()] }
    }

    /// Create a field from vectors in raster order.
    pub fn new(channel: Channel, plane_size: Vec2<usize>, vectors: Vec<MotionVector>) -> Result<Self> {
        let count = macroblock_count(plane_size, channel);

        if vectors.len() != count.area() {
            return Err(Error::invalid("vector count does not match macroblock count"));
        }

        Ok(VectorField { channel, plane_size, count, vectors })
    }

    /// The channel of the plane these vectors belong to.
    pub fn channel(&self) -> Channel { self.channel }

    /// Width and height of the plane.
    pub fn plane_size(&self) -> Vec2<usize> { self.plane_size }

    /// Width and height of one macroblock.
    pub fn macroblock_size(&self) -> usize { macroblock_size(self.channel) }

    /// The number of macroblocks in each direction.
    pub fn count(&self) -> Vec2<usize> { self.count }

    /// All vectors, row by row.
    pub fn vectors(&self) -> &[MotionVector] { &self.vectors }

    /// The vector of the macroblock at the specified macroblock coordinate.
    pub fn get(&self, macroblock: Vec2<usize>) -> MotionVector {
        self.vectors[macroblock.y() * self.count.width() + macroblock.x()]
    }

    /// The position of the top left sample and the vector of each macroblock, in raster order.
    /// The positions are in samples of this plane, which for chroma is half the frame resolution.
    pub fn iter(&self) -> impl Iterator<Item = (Vec2<usize>, MotionVector)> + '_ {
        let size = self.macroblock_size();
        let width = self.count.width().max(1);

        self.vectors.iter().enumerate().map(move |(index, &vector)| {
            (Vec2(index % width * size, index / width * size), vector)
        })
    }

    /// Returns `Error::InvalidVector` if a vector exceeds the search radius
    /// or moves part of its macroblock outside of the plane.
    pub fn validate(&self, radius: u8) -> UnitResult {
        for (origin, vector) in self.iter() {
            let macroblock = Macroblock::new(origin, self.macroblock_size(), self.plane_size);

            if vector.exceeds(radius) || !macroblock.fits(vector, self.plane_size) {
                return Err(Error::InvalidVector { vector: (vector.dx, vector.dy), radius });
            }
        }

        Ok(())
    }

    /// Append each vector as two signed bytes, `dx` first.
    pub(crate) fn write(&self, bytes: &mut ByteVec) {
        for vector in &self.vectors {
            bytes.extend_from_slice(&[vector.dx as u8, vector.dy as u8]);
        }
    }

    /// Read the vectors for a plane and advance the slice.
    pub(crate) fn read(channel: Channel, plane_size: Vec2<usize>, bytes: &mut Bytes<'_>) -> Result<Self> {
        let count = macroblock_count(plane_size, channel);

        let vector_bytes = take_n(bytes, count.area() * MotionVector::BYTE_SIZE)
            .map_err(|_| Error::truncated("motion vectors"))?;

        let vectors = vector_bytes.chunks_exact(MotionVector::BYTE_SIZE)
            .map(|pair| MotionVector::new(pair[0] as i8, pair[1] as i8))
            .collect();

        Ok(VectorField { channel, plane_size, count, vectors })
    }
}


/// The vector fields of all three planes of a predicted frame.
/// Luma and chroma vectors are searched independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotionVectors {

    /// Luma vectors, one per 16x16 macroblock.
    pub y: VectorField,

    /// Blue chroma vectors, one per 8x8 macroblock.
    pub cb: VectorField,

    /// Red chroma vectors, one per 8x8 macroblock.
    pub cr: VectorField,
}

impl MotionVectors {

    /// The field of the specified channel.
    pub fn field(&self, channel: Channel) -> &VectorField {
        match channel {
            Channel::Luma => &self.y,
            Channel::BlueChroma => &self.cb,
            Channel::RedChroma => &self.cr,
        }
    }

    /// Append all fields, luma first.
    pub(crate) fn write(&self, bytes: &mut ByteVec) {
        for channel in Channel::ALL {
            self.field(channel).write(bytes);
        }
    }

    /// Read the fields of all planes in stream order.
    pub(crate) fn read(plane_size: impl Fn(Channel) -> Vec2<usize>, bytes: &mut Bytes<'_>) -> Result<Self> {
        Ok(MotionVectors {
            y: VectorField::read(Channel::Luma, plane_size(Channel::Luma), bytes)?,
            cb: VectorField::read(Channel::BlueChroma, plane_size(Channel::BlueChroma), bytes)?,
            cr: VectorField::read(Channel::RedChroma, plane_size(Channel::RedChroma), bytes)?,
        })
    }
}


/// The part of a macroblock that lies inside of its plane.
#[derive(Debug, Clone, Copy)]
struct Macroblock {
    origin: Vec2<usize>,
    size: Vec2<usize>,
}

impl Macroblock {
    fn new(origin: Vec2<usize>, macroblock_size: usize, plane_size: Vec2<usize>) -> Self {
        let size = Vec2(
            macroblock_size.min(plane_size.width() - origin.x()),
            macroblock_size.min(plane_size.height() - origin.y()),
        );

        Macroblock { origin, size }
    }

    /// Whether the displaced macroblock lies completely inside of the plane.
    fn fits(self, vector: MotionVector, plane_size: Vec2<usize>) -> bool {
        let fits_axis = |origin: usize, size: usize, displacement: i8, plane: usize| {
            let start = origin as isize + displacement as isize;
            start >= 0 && start as usize + size <= plane
        };

        fits_axis(self.origin.x(), self.size.width(), vector.dx, plane_size.width())
            && fits_axis(self.origin.y(), self.size.height(), vector.dy, plane_size.height())
    }

    /// The position of a sample of this macroblock, displaced by a vector that fits.
    #[inline]
    fn displaced(position: Vec2<usize>, vector: MotionVector) -> Vec2<usize> {
        Vec2(
            (position.x() as isize + vector.dx as isize) as usize,
            (position.y() as isize + vector.dy as isize) as usize,
        )
    }

    /// Sum of absolute differences between this macroblock and the displaced reference.
    fn sum_of_absolute_differences(self, current: &Plane, reference: &Plane, vector: MotionVector) -> u32 {
        let mut sum = 0;

        for y in self.origin.y() .. self.origin.y() + self.size.height() {
            for x in self.origin.x() .. self.origin.x() + self.size.width() {
                let position = Vec2(x, y);
                let predicted = reference.get(Self::displaced(position, vector));
                sum += current.get(position).abs_diff(predicted) as u32;
            }
        }

        sum
    }

    /// Exhaustive search over all displacements in `[-radius, radius)`, horizontal displacement in the outer loop.
    /// Only a strictly smaller difference replaces the current best match,
    /// which starts out as the undisplaced macroblock.
    fn search(self, current: &Plane, reference: &Plane, radius: u8) -> MotionVector {
        let mut best_vector = MotionVector::ZERO;
        let mut best_difference = self.sum_of_absolute_differences(current, reference, best_vector);

        if best_difference == 0 {
            return best_vector;
        }

        let radius = radius as i16;
        for dx in -radius .. radius {
            for dy in -radius .. radius {
                let vector = MotionVector::new(dx as i8, dy as i8);
                if !self.fits(vector, reference.size()) { continue; }

                let difference = self.sum_of_absolute_differences(current, reference, vector);
                if difference < best_difference {
                    best_difference = difference;
                    best_vector = vector;
                }
            }
        }

        best_vector
    }
}


/// Find the best matching area in the reference plane for each macroblock of the current plane.
/// Both planes must have the same size.
pub fn estimate(current: &Plane, reference: &Plane, channel: Channel, radius: u8, parallel: bool) -> VectorField {
    debug_assert_eq!(current.size(), reference.size(), "motion search size bug");
    debug_assert!(radius as i16 <= i8::MAX as i16 + 1, "search radius bug");

    let plane_size = current.size();
    let count = macroblock_count(plane_size, channel);
    let size = macroblock_size(channel);

    let vectors = map_indices(count.area(), parallel, |index| {
        let origin = Vec2(index % count.width() * size, index / count.width() * size);
        Macroblock::new(origin, size, plane_size).search(current, reference, radius)
    });

    log::trace!(
        "found {} motion vectors for {:?}, {} of them non-zero",
        vectors.len(), channel, vectors.iter().filter(|&&vector| vector != MotionVector::ZERO).count()
    );

    VectorField { channel, plane_size, count, vectors }
}

/// Build a prediction by copying the displaced area of the reference plane into each macroblock.
/// Returns `Error::InvalidVector` if a vector exceeds the radius or points outside of the reference plane.
pub fn compensate(reference: &Plane, field: &VectorField, radius: u8) -> Result<Plane> {
    if reference.size() != field.plane_size() {
        return Err(Error::invalid("reference plane size does not match motion vectors"));
    }

    field.validate(radius)?;

    let size = field.macroblock_size();
    Ok(Plane::from_fn(reference.size(), |position| {
        let vector = field.get(position.map(|component| component / size));
        reference.get(Macroblock::displaced(position, vector))
    }))
}
