
//! Specialized binary input and output.
//! Uses the error handling for this crate.

pub use ::std::io::{Read, Write};
use lebe::prelude::*;
use crate::error::{Error, Result, UnitResult};


/// Generic trait that defines common binary operations such as reading and writing for this type.
/// All values are stored in little endian byte order.
pub trait Data: Sized + Default + Clone {
    const BYTE_SIZE: usize = ::std::mem::size_of::<Self>();

    /// Read a value of type `Self`.
    fn read(read: &mut impl Read) -> Result<Self>;

    /// Read as many values of type `Self` as fit into the specified slice.
    /// If the slice cannot be filled completely, returns `Error::TruncatedStream`.
    fn read_slice(read: &mut impl Read, slice: &mut[Self]) -> UnitResult;

    /// Write this value to the writer.
    fn write(self, write: &mut impl Write) -> UnitResult;

    /// Write all values of that slice to the writer.
    fn write_slice(write: &mut impl Write, slice: &[Self]) -> UnitResult;

    /// Read as many values of type `Self` as specified with `data_size`.
    ///
    /// This method will not allocate more memory than `soft_max` at once,
    /// so that a corrupt count cannot trigger a huge allocation
    /// before the reader runs out of bytes.
    #[inline]
    fn read_vec(read: &mut impl Read, data_size: usize, soft_max: usize) -> Result<Vec<Self>> {
        let mut data = Vec::new();

        // do not allocate more than $chunks memory at once
        // (most of the time, this loop will run only once)
        while data.len() < data_size {
            let chunk_start = data.len();
            let chunk_end = (chunk_start + soft_max.max(1)).min(data_size);

            data.resize(chunk_end, Self::default());
            Self::read_slice(read, &mut data[chunk_start .. chunk_end])?;
        }

        Ok(data)
    }

    /// Read a value from the front of the slice and advance the slice.
    #[inline]
    fn read_from_slice(slice: &mut &[u8]) -> Result<Self> {
        Self::read(slice)
    }
}


macro_rules! implement_data_for_primitive {
    ($kind: ident) => {
        impl Data for $kind {
            #[inline]
            fn read(read: &mut impl Read) -> Result<Self> {
                Ok(read.read_from_little_endian()?)
            }

            #[inline]
            fn write(self, write: &mut impl Write) -> Result<()> {
                write.write_as_little_endian(&self)?;
                Ok(())
            }

            #[inline]
            fn read_slice(read: &mut impl Read, slice: &mut [Self]) -> Result<()> {
                read.read_from_little_endian_into(slice)?;
                Ok(())
            }

            #[inline]
            fn write_slice(write: &mut impl Write, slice: &[Self]) -> Result<()> {
                write.write_as_little_endian(slice)?;
                Ok(())
            }
        }
    };
}

implement_data_for_primitive!(u8);
implement_data_for_primitive!(i8);
implement_data_for_primitive!(u32);


/// Take the first byte of the slice and advance the slice.
#[inline]
pub fn take_1(slice: &mut &[u8]) -> Result<u8> {
    if let Some((&first, rest)) = slice.split_first() {
        *slice = rest;
        Ok(first)
    }
    else {
        Err(Error::truncated("compressed data"))
    }
}

/// Take the first `n` bytes of the slice and advance the slice.
#[inline]
pub fn take_n<'s>(slice: &mut &'s [u8], n: usize) -> Result<&'s [u8]> {
    if n <= slice.len() {
        let (front, back) = slice.split_at(n);
        *slice = back;
        Ok(front)
    }
    else {
        Err(Error::truncated("compressed data"))
    }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn little_endian_u32(){
        let mut bytes = Vec::new();
        0x0403_0201_u32.write(&mut bytes).unwrap();
        assert_eq!(bytes, [1, 2, 3, 4]);

        let mut slice = bytes.as_slice();
        assert_eq!(u32::read_from_slice(&mut slice).unwrap(), 0x0403_0201);
        assert!(slice.is_empty());
        assert!(matches!(u32::read_from_slice(&mut slice), Err(Error::TruncatedStream(_))));
    }

    #[test]
    fn signed_bytes(){
        let mut bytes = Vec::new();
        i8::write_slice(&mut bytes, &[-1, 5, -128]).unwrap();
        assert_eq!(bytes, [255, 5, 128]);

        let read = i8::read_vec(&mut bytes.as_slice(), 3, 2).unwrap();
        assert_eq!(read, [-1, 5, -128]);
    }

    #[test]
    fn take_bytes(){
        let mut slice: &[u8] = &[0, 1, 2, 3];
        assert_eq!(take_1(&mut slice).unwrap(), 0);
        assert_eq!(take_n(&mut slice, 2).unwrap(), &[1, 2]);
        assert!(take_n(&mut slice, 2).is_err());
        assert_eq!(take_1(&mut slice).unwrap(), 3);
        assert!(take_1(&mut slice).is_err());
    }
}
