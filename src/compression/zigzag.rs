//! Reorder an 8x8 block from low to high frequencies,
//! so that the zeros of the high frequencies end up next to each other.

use super::BLOCK_SAMPLE_COUNT;

/// Zigzag scan order for 8x8 blocks.
/// The value at index `i` is the row-major position of the `i`-th value in zigzag order.
pub const ZIGZAG: [usize; BLOCK_SAMPLE_COUNT] = [
     0,  1,  8, 16,  9,  2,  3, 10,
    17, 24, 32, 25, 18, 11,  4,  5,
    12, 19, 26, 33, 40, 48, 41, 34,
    27, 20, 13,  6,  7, 14, 21, 28,
    35, 42, 49, 56, 57, 50, 43, 36,
    29, 22, 15, 23, 30, 37, 44, 51,
    58, 59, 52, 45, 38, 31, 39, 46,
    53, 60, 61, 54, 47, 55, 62, 63,
];

/// Reorder a row-major block into zigzag order.
#[inline]
pub fn to_zigzag<T: Copy + Default>(block: &[T; BLOCK_SAMPLE_COUNT]) -> [T; BLOCK_SAMPLE_COUNT] {
    let mut sequence = [T::default(); BLOCK_SAMPLE_COUNT];

    for (value, &position) in sequence.iter_mut().zip(ZIGZAG.iter()) {
        *value = block[position];
    }

    sequence
}

/// Reorder a zigzag sequence into a row-major block.
#[inline]
pub fn from_zigzag<T: Copy + Default>(sequence: &[T; BLOCK_SAMPLE_COUNT]) -> [T; BLOCK_SAMPLE_COUNT] {
    let mut block = [T::default(); BLOCK_SAMPLE_COUNT];

    for (&value, &position) in sequence.iter().zip(ZIGZAG.iter()) {
        block[position] = value;
    }

    block
}
