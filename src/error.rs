
//! Error type definitions.

use std::borrow::Cow;
use std::io::ErrorKind;
use std::convert::TryFrom;
use std::fmt;

pub use std::io::Error as IoError;


/// A result that may contain a codec error.
pub type Result<T> = std::result::Result<T, Error>;

/// A result that, if ok, contains nothing, and otherwise contains a codec error.
pub type UnitResult = Result<()>;


/// An error that may happen while encoding or decoding frames.
/// Distinguishes between malformed streams, missing decoder state,
/// invalid caller input, and errors of the underlying reader or writer.
#[derive(Debug)]
pub enum Error {

    /// The dimensions or counts declared in a header
    /// do not agree with the amount of data that follows.
    MalformedHeader(Cow<'static, str>),

    /// The buffer ends before the header, the block region,
    /// the vector region, or a declared frame length is complete.
    TruncatedStream(Cow<'static, str>),

    /// A predicted frame was requested before
    /// the frame it is predicted from has been decoded.
    MissingReference {

        /// Index of the frame that could not be decoded.
        frame: usize,
    },

    /// A decoded motion vector exceeds the search radius
    /// or points outside of the reference plane.
    /// Indicates a corrupted stream or mismatching codec options.
    InvalidVector {

        /// Horizontal and vertical displacement as read from the stream.
        vector: (i8, i8),

        /// The search radius of the decoder.
        radius: u8,
    },

    /// The caller passed input that cannot be encoded,
    /// for example a pixel buffer that does not match its dimensions.
    Invalid(Cow<'static, str>),

    /// The underlying byte stream could not be read or written.
    Io(IoError),
}


impl Error {

    /// Create an error of the variant `MalformedHeader`.
    pub(crate) fn malformed(message: impl Into<Cow<'static, str>>) -> Self {
        Error::MalformedHeader(message.into())
    }

    /// Create an error of the variant `TruncatedStream`.
    pub(crate) fn truncated(message: impl Into<Cow<'static, str>>) -> Self {
        Error::TruncatedStream(message.into())
    }

    /// Create an error of the variant `Invalid`.
    pub(crate) fn invalid(message: impl Into<Cow<'static, str>>) -> Self {
        Error::Invalid(message.into())
    }
}


/// Enable using the `?` operator on `std::io::Result`.
impl From<IoError> for Error {
    fn from(error: IoError) -> Self {
        if error.kind() == ErrorKind::UnexpectedEof {
            Error::truncated("reference to missing bytes")
        }
        else {
            Error::Io(error)
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MalformedHeader(message) => write!(formatter, "malformed header: {}", message),
            Error::TruncatedStream(message) => write!(formatter, "truncated stream: {}", message),
            Error::MissingReference { frame } => write!(formatter, "frame {} requires its predecessor to be decoded first", frame),
            Error::InvalidVector { vector: (x, y), radius } => write!(formatter, "invalid motion vector ({}, {}) for search radius {}", x, y, radius),
            Error::Invalid(message) => write!(formatter, "invalid input: {}", message),
            Error::Io(error) => error.fmt(formatter),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(error) => Some(error),
            _ => None,
        }
    }
}


/// Convert a header integer to an index.
#[inline]
pub(crate) fn u32_to_usize(value: u32) -> usize {
    // a u32 always fits into a usize on the 32 and 64 bit targets this crate supports
    value as usize
}

/// Return error on invalid range.
#[inline]
pub(crate) fn usize_to_u32(value: usize, error_message: &'static str) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::invalid(error_message))
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unexpected_eof_is_truncation(){
        let io_error = IoError::new(ErrorKind::UnexpectedEof, "eof");
        assert!(matches!(Error::from(io_error), Error::TruncatedStream(_)));

        let io_error = IoError::new(ErrorKind::PermissionDenied, "denied");
        assert!(matches!(Error::from(io_error), Error::Io(_)));
    }

    #[test]
    fn oversized_values_do_not_fit_header(){
        assert_eq!(usize_to_u32(17, "width").unwrap(), 17);

        #[cfg(target_pointer_width = "64")]
        assert!(usize_to_u32(u32::MAX as usize + 1, "width").is_err());
    }
}
