//! Frame serializer
//!
//! Converts between in-memory parameter frames and the three on-disk
//! bitstream layouts:
//!
//! - [`BitstreamFormat::Default`]: 16-bit little-endian words, a three word
//!   header (type tag, frame type, mode) followed by one word per bit
//! - [`BitstreamFormat::Itu`]: ITU-T G.192 style records, a sync word, the
//!   bit count, then one soft-bit word per bit
//! - [`BitstreamFormat::Mime`]: RFC 3267 storage format, a magic string
//!   followed by a table-of-contents byte and MSB-first packed payload per
//!   frame
//!
//! The format is fixed per stream. [`FrameEncoder`] owns the DTX frame type
//! scheduling of the encode direction, [`FrameDecoder`] carries the previous
//! speech mode across frames for the layouts that do not transmit it.
//!
//! # Example
//!
//! ```rust
//! use amrwb_codec_core::bitstream::{FrameDecoder, FrameEncoder};
//! use amrwb_codec_core::types::{BitstreamFormat, CodingMode, Mode, RxFrameType};
//!
//! let bits = vec![true; Mode::Mode0.bits_per_frame()];
//! let mut encoder = FrameEncoder::new(BitstreamFormat::Itu);
//! let record = encoder
//!     .encode_frame(&bits, CodingMode::Speech(Mode::Mode0), Mode::Mode0)
//!     .unwrap();
//!
//! let mut decoder = FrameDecoder::new(BitstreamFormat::Itu);
//! let frame = decoder.decode_frame(&mut &record[..]).unwrap().unwrap();
//! assert_eq!(frame.frame_type, RxFrameType::SpeechGood);
//! assert_eq!(frame.mode, Mode::Mode0);
//! assert_eq!(frame.bits, bits);
//! ```

pub mod default;
pub mod itu;
pub mod mime;
pub mod tx_state;

#[cfg(test)]
mod tests;

use std::borrow::Cow;
use std::io::Read;

use bytes::{Buf, Bytes, BytesMut};
use tracing::trace;

use crate::error::{CodecError, Result};
use crate::types::{BitstreamFormat, CodingMode, Mode, RxFrameType, TxFrameType};
use crate::utils::pcm::read_full;

pub use tx_state::TxState;

/// One received frame of parameter bits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Parameter bits; may be empty for lost and empty frames
    pub bits: Vec<bool>,
    /// Frame classification
    pub frame_type: RxFrameType,
    /// Speech mode the frame was coded in, or the carried-over mode for
    /// frames that do not transmit one
    pub mode: Mode,
}

impl Frame {
    /// Number of parameter bits in the frame
    pub fn bit_count(&self) -> usize {
        self.bits.len()
    }
}

/// Read `count` little-endian 16-bit words, `Ok(None)` on a short read
pub(crate) fn read_words<R: Read + ?Sized>(reader: &mut R, count: usize) -> Result<Option<Vec<u16>>> {
    let mut raw = vec![0u8; count * 2];
    if !read_full(reader, &mut raw)? {
        return Ok(None);
    }
    let mut buf = &raw[..];
    let mut words = Vec::with_capacity(count);
    while buf.has_remaining() {
        words.push(buf.get_u16_le());
    }
    Ok(Some(words))
}

/// Truncate or zero-pad `bits` to exactly `len` entries
pub(crate) fn fit_bits(bits: &[bool], len: usize) -> Cow<'_, [bool]> {
    if bits.len() == len {
        Cow::Borrowed(bits)
    } else {
        let mut fitted = bits[..bits.len().min(len)].to_vec();
        fitted.resize(len, false);
        Cow::Owned(fitted)
    }
}

/// Serializer for the encode direction of one stream
#[derive(Debug, Clone)]
pub struct FrameEncoder {
    format: BitstreamFormat,
    tx_state: TxState,
    header_written: bool,
}

impl FrameEncoder {
    /// Create a serializer for `format`
    pub fn new(format: BitstreamFormat) -> Self {
        Self {
            format,
            tx_state: TxState::new(),
            header_written: false,
        }
    }

    /// Stream format
    pub fn format(&self) -> BitstreamFormat {
        self.format
    }

    /// DTX scheduling state
    pub fn tx_state(&self) -> &TxState {
        &self.tx_state
    }

    /// Mutable DTX scheduling state
    pub fn tx_state_mut(&mut self) -> &mut TxState {
        &mut self.tx_state
    }

    /// Bytes that open the stream, returned once.
    ///
    /// Only the MIME format has a stream header (its magic string). Frames
    /// encoded before the header was taken carry it as a prefix, so callers
    /// only need this to produce a valid empty stream.
    pub fn stream_header(&mut self) -> Option<Bytes> {
        if self.format != BitstreamFormat::Mime || self.header_written {
            return None;
        }
        self.header_written = true;
        Some(Bytes::from_static(mime::MAGIC))
    }

    /// Serialize one frame from the speech encoder.
    ///
    /// `coding_mode` is the mode the encoder used (possibly DTX), `mode` the
    /// requested speech mode. The transmitted frame type is chosen by the DTX
    /// scheduler.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidFrameSize`] if `bits` does not hold the
    /// bit count of `coding_mode`.
    pub fn encode_frame(
        &mut self,
        bits: &[bool],
        coding_mode: CodingMode,
        mode: Mode,
    ) -> Result<Bytes> {
        check_bit_count(bits, coding_mode)?;
        let frame_type = self.tx_state.frame_type(coding_mode);
        self.encode_with_type(bits, frame_type, coding_mode, mode)
    }

    /// Serialize one frame with an explicit transmit frame type, bypassing
    /// the DTX scheduler.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidFrameSize`] for a wrong bit count and
    /// [`CodecError::InvalidFormat`] if `frame_type` and `coding_mode`
    /// disagree on whether this is a speech frame.
    pub fn encode_with_type(
        &mut self,
        bits: &[bool],
        frame_type: TxFrameType,
        coding_mode: CodingMode,
        mode: Mode,
    ) -> Result<Bytes> {
        check_bit_count(bits, coding_mode)?;
        let is_speech = matches!(coding_mode, CodingMode::Speech(_));
        if (frame_type == TxFrameType::Speech) != is_speech {
            return Err(CodecError::invalid_format(format!(
                "frame type {frame_type:?} cannot carry coding mode {}",
                coding_mode.index()
            )));
        }

        let mut buf = self.prefixed_buffer(bits.len());
        match self.format {
            BitstreamFormat::Default => default::write_tx(&mut buf, bits, frame_type, mode),
            BitstreamFormat::Itu => itu::write_tx(&mut buf, bits, frame_type),
            BitstreamFormat::Mime => mime::write_tx(&mut buf, bits, frame_type, coding_mode, mode),
        }
        trace!(
            format = %self.format,
            ?frame_type,
            coding_mode = coding_mode.index(),
            bytes = buf.len(),
            "Serialized frame"
        );
        Ok(buf.freeze())
    }

    /// Serialize a frame as seen by a decoder, e.g. when converting a
    /// stream between formats. Payloads are truncated or zero-padded to the
    /// size the target layout expects for the frame type.
    ///
    /// # Errors
    ///
    /// None of the formats reject a classified frame.
    pub fn encode_received(&mut self, frame: &Frame) -> Result<Bytes> {
        let mut buf = self.prefixed_buffer(frame.bits.len());
        match self.format {
            BitstreamFormat::Default => default::write_rx(&mut buf, frame),
            BitstreamFormat::Itu => itu::write_rx(&mut buf, frame),
            BitstreamFormat::Mime => mime::write_rx(&mut buf, frame),
        }
        Ok(buf.freeze())
    }

    fn prefixed_buffer(&mut self, bit_count: usize) -> BytesMut {
        let mut buf = BytesMut::with_capacity(2 * bit_count + 16);
        if let Some(header) = self.stream_header() {
            buf.extend_from_slice(&header);
        }
        buf
    }
}

fn check_bit_count(bits: &[bool], coding_mode: CodingMode) -> Result<()> {
    let expected = coding_mode.bits_per_frame();
    if bits.len() != expected {
        return Err(CodecError::InvalidFrameSize {
            expected,
            actual: bits.len(),
        });
    }
    Ok(())
}

/// Deserializer for the decode direction of one stream
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    format: BitstreamFormat,
    prev_mode: Mode,
    header_checked: bool,
}

impl FrameDecoder {
    /// Create a deserializer for `format`
    pub fn new(format: BitstreamFormat) -> Self {
        Self {
            format,
            prev_mode: Mode::Mode0,
            header_checked: false,
        }
    }

    /// Stream format
    pub fn format(&self) -> BitstreamFormat {
        self.format
    }

    /// Mode carried over to frames that do not transmit one
    pub fn prev_mode(&self) -> Mode {
        self.prev_mode
    }

    /// Verify the stream header, once per stream.
    ///
    /// A no-op except for the MIME format, where the magic string must be
    /// present even if no frame follows. [`decode_frame`](Self::decode_frame)
    /// calls this itself.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidMagic`] if the stream starts with
    /// anything else, including a stream shorter than the magic.
    pub fn read_stream_header<R: Read + ?Sized>(&mut self, reader: &mut R) -> Result<()> {
        if self.format != BitstreamFormat::Mime || self.header_checked {
            return Ok(());
        }
        let mut found = Vec::with_capacity(mime::MAGIC.len());
        (&mut *reader)
            .take(mime::MAGIC.len() as u64)
            .read_to_end(&mut found)?;
        if found != mime::MAGIC {
            return Err(CodecError::InvalidMagic { found });
        }
        self.header_checked = true;
        Ok(())
    }

    /// Read the next frame, `Ok(None)` at the end of the stream.
    ///
    /// A frame cut short by the end of input is treated as the end of the
    /// stream.
    ///
    /// # Errors
    ///
    /// Fatal framing errors: an undefined frame type or mode, an ITU record
    /// whose bit count matches no mode, or a bad MIME magic.
    pub fn decode_frame<R: Read + ?Sized>(&mut self, reader: &mut R) -> Result<Option<Frame>> {
        let frame = match self.format {
            BitstreamFormat::Default => default::read(reader)?,
            BitstreamFormat::Itu => match itu::read_record(reader)? {
                Some(record) => Some(itu::classify(&record, self.prev_mode)?),
                None => None,
            },
            BitstreamFormat::Mime => {
                self.read_stream_header(reader)?;
                mime::read(reader, self.prev_mode)?
            }
        };
        if let Some(frame) = &frame {
            if self.format != BitstreamFormat::Default {
                self.prev_mode = frame.mode;
            }
            trace!(
                format = %self.format,
                frame_type = %frame.frame_type,
                mode = frame.mode.index(),
                bits = frame.bit_count(),
                "Deserialized frame"
            );
        }
        Ok(frame)
    }
}
