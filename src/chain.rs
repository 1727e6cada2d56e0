
//! A sequence of frames in a single stream:
//! one key frame, followed by frames that are each predicted from their predecessor.
//!
//! Layout, all integers little endian `u32`:
//! frame count, the compressed byte size of each frame, width, height,
//! followed by the compressed frames.
//! The first frame is stored without its own header, its dimensions are those of the chain.

use crate::color::RgbaImage;
use crate::compression::{ByteVec, Bytes};
use crate::error::{usize_to_u32, u32_to_usize, Error, Result, UnitResult};
use crate::frame::{DecodedFrame, Frame, FrameIndex};
use crate::frame::key::KeyFrame;
use crate::frame::predicted::PredictedFrame;
use crate::io::{Data, Read, Write};
use crate::math::Vec2;
use crate::options::CodecOptions;
use crate::plane::PlaneSet;


/// Do not allocate more than this many values at once while reading,
/// so that corrupt counts cannot request huge amounts of memory.
const READ_CHUNK_SIZE: usize = 1024 * 1024;


/// An ordered sequence of transformed frames of the same size.
/// Owns all frames. Predicted frames refer to their predecessor by index.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameChain {
    size: Vec2<usize>,
    frames: Vec<Frame>,
}

impl FrameChain {

    /// A chain without frames.
    pub fn new(size: Vec2<usize>) -> Self {
        FrameChain { size, frames: Vec::new() }
    }

    /// Width and height of all frames in this chain.
    pub fn size(&self) -> Vec2<usize> { self.size }

    /// The number of frames.
    pub fn len(&self) -> usize { self.frames.len() }

    /// Whether this chain contains no frames.
    pub fn is_empty(&self) -> bool { self.frames.is_empty() }

    /// All frames, key frame first.
    pub fn frames(&self) -> &[Frame] { &self.frames }

    /// The frame at the specified index, if it exists.
    pub fn frame(&self, index: FrameIndex) -> Option<&Frame> { self.frames.get(index.0) }

    fn push(&mut self, frame: Frame) -> FrameIndex {
        debug_assert_eq!(frame.size(), self.size, "frame size bug");
        debug_assert_eq!(frame.is_key(), self.frames.is_empty(), "frame order bug");

        self.frames.push(frame);
        FrameIndex(self.frames.len() - 1)
    }

    /// Compress all frames and write the chain.
    pub fn write_to(&self, write: &mut impl Write) -> UnitResult {
        let payloads: Vec<ByteVec> = self.frames.iter().map(Frame::serialize).collect();

        usize_to_u32(payloads.len(), "frame count")?.write(write)?;
        for payload in &payloads {
            usize_to_u32(payload.len(), "compressed frame size")?.write(write)?;
        }

        usize_to_u32(self.size.width(), "frame width")?.write(write)?;
        usize_to_u32(self.size.height(), "frame height")?.write(write)?;

        for payload in &payloads {
            u8::write_slice(write, payload)?;
        }

        log::debug!(
            "wrote chain of {} frames, {} compressed bytes",
            payloads.len(), payloads.iter().map(Vec::len).sum::<usize>()
        );

        Ok(())
    }

    /// Compress all frames into a new byte vector.
    pub fn to_bytes(&self) -> Result<ByteVec> {
        let mut bytes = Vec::new();
        self.write_to(&mut bytes)?;
        Ok(bytes)
    }

    /// Read and decompress all frames.
    /// The frames are not decoded to pixels yet, use a `ChainDecoder` for that.
    pub fn read_from(read: &mut impl Read) -> Result<Self> {
        let count = u32_to_usize(u32::read(read)?);
        let lengths = u32::read_vec(read, count, READ_CHUNK_SIZE)?;

        let width = u32_to_usize(u32::read(read)?);
        let height = u32_to_usize(u32::read(read)?);
        let mut chain = FrameChain::new(Vec2(width, height));

        for (index, &length) in lengths.iter().enumerate() {
            let payload = u8::read_vec(read, u32_to_usize(length), READ_CHUNK_SIZE)?;
            log::trace!("reading frame {} of {} from {} bytes", index, count, payload.len());

            let frame = match index {
                0 => Frame::Key(KeyFrame::parse(chain.size, &payload)?),
                _ => Frame::Predicted {
                    frame: PredictedFrame::parse(chain.size, &payload)?,
                    predecessor: FrameIndex(index - 1),
                },
            };

            chain.push(frame);
        }

        log::debug!("read chain of {} frames with {}x{} pixels", count, width, height);
        Ok(chain)
    }

    /// Read and decompress all frames of a byte buffer.
    /// Returns `Error::MalformedHeader` if the buffer contains more bytes than the chain declares.
    pub fn from_bytes(mut bytes: Bytes<'_>) -> Result<Self> {
        let chain = Self::read_from(&mut bytes)?;

        if !bytes.is_empty() {
            return Err(Error::malformed(format!("{} bytes after the last frame", bytes.len())));
        }

        Ok(chain)
    }

    /// Decode frames to pixels one after another.
    pub fn decoder(&self, options: CodecOptions) -> ChainDecoder<'_> {
        ChainDecoder::new(self, options)
    }

    /// Decode all frames in order.
    pub fn decode_all(&self, options: CodecOptions) -> Result<Vec<DecodedFrame>> {
        let mut decoder = self.decoder(options);

        for index in 0 .. self.len() {
            decoder.decode(FrameIndex(index))?;
        }

        Ok(decoder.into_frames())
    }
}


/// Builds a frame chain from pixels.
/// Each frame is predicted from the decoded previous frame,
/// which is exactly what the decoder will use as reference.
#[derive(Debug, Clone)]
pub struct ChainEncoder {
    options: CodecOptions,
    chain: FrameChain,
    reference: Option<DecodedFrame>,
}

impl ChainEncoder {

    /// An encoder without frames. The first frame determines the size of the chain.
    pub fn new(options: CodecOptions) -> Self {
        ChainEncoder { options, chain: FrameChain::new(Vec2(0, 0)), reference: None }
    }

    /// Convert the pixels and append them as the next frame.
    pub fn push(&mut self, image: &RgbaImage) -> Result<FrameIndex> {
        self.push_planes(&PlaneSet::from_rgba(image, self.options.color))
    }

    /// Append the planes as the next frame.
    /// The first frame is a key frame, all others are predicted.
    pub fn push_planes(&mut self, planes: &PlaneSet) -> Result<FrameIndex> {
        self.options.validate()?;

        let (frame, decoded) = match &self.reference {
            None => {
                let frame = KeyFrame::transform(planes, &self.options)?;
                let decoded = frame.reconstruct(&self.options);
                self.chain.size = frame.size();
                (Frame::Key(frame), decoded)
            },

            Some(reference) => {
                if planes.size() != self.chain.size {
                    return Err(Error::invalid(format!(
                        "all frames must have {}x{} pixels",
                        self.chain.size.width(), self.chain.size.height()
                    )));
                }

                let frame = PredictedFrame::transform(planes, reference, &self.options)?;
                let decoded = frame.reconstruct(reference, &self.options)?;
                let predecessor = FrameIndex(self.chain.len() - 1);
                (Frame::Predicted { frame, predecessor }, decoded)
            },
        };

        let kind = if frame.is_key() { "key" } else { "predicted" };
        let index = self.chain.push(frame);
        log::debug!("appended {} as {} frame", index, kind);

        self.reference = Some(decoded);
        Ok(index)
    }

    /// The decoded version of the last frame, as the decoder will see it.
    pub fn reference(&self) -> Option<&DecodedFrame> { self.reference.as_ref() }

    /// The frames encoded so far.
    pub fn chain(&self) -> &FrameChain { &self.chain }

    /// Stop encoding and return the chain.
    pub fn finish(self) -> FrameChain { self.chain }
}


/// Decodes the frames of a chain in order.
/// Each decoded frame is kept, as it is the reference of the following frame.
#[derive(Debug, Clone)]
pub struct ChainDecoder<'c> {
    chain: &'c FrameChain,
    options: CodecOptions,
    decoded: Vec<DecodedFrame>,
}

impl<'c> ChainDecoder<'c> {

    /// A decoder that has not decoded any frame yet.
    pub fn new(chain: &'c FrameChain, options: CodecOptions) -> Self {
        ChainDecoder { chain, options, decoded: Vec::with_capacity(chain.len()) }
    }

    /// Decode the frame at the specified index, or return it if it has already been decoded.
    /// Returns `Error::MissingReference` if the previous frame has not been decoded yet.
    pub fn decode(&mut self, index: FrameIndex) -> Result<&DecodedFrame> {
        let chain = self.chain;
        let frame = chain.frame(index).ok_or_else(|| Error::invalid(format!(
            "{} does not exist in a chain of {} frames", index, chain.len()
        )))?;

        if index.0 > self.decoded.len() {
            return Err(Error::MissingReference { frame: index.0 });
        }

        if index.0 == self.decoded.len() {
            let decoded = match frame {
                Frame::Key(frame) => frame.reconstruct(&self.options),

                Frame::Predicted { frame, predecessor } => {
                    let reference = self.decoded.get(predecessor.0)
                        .ok_or(Error::MissingReference { frame: index.0 })?;

                    frame.reconstruct(reference, &self.options)?
                },
            };

            self.decoded.push(decoded);
        }

        Ok(&self.decoded[index.0])
    }

    /// Decode the frame after the last decoded frame.
    /// Returns `None` after the last frame.
    pub fn decode_next(&mut self) -> Option<Result<&DecodedFrame>> {
        if self.decoded.len() == self.chain.len() { None }
        else { Some(self.decode(FrameIndex(self.decoded.len()))) }
    }

    /// The number of frames decoded so far.
    pub fn decoded_count(&self) -> usize { self.decoded.len() }

    /// All frames decoded so far, in order.
    pub fn into_frames(self) -> Vec<DecodedFrame> { self.decoded }
}
