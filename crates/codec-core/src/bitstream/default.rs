//! Default word-per-bit layout
//!
//! ```text
//! [type tag][frame type][mode][bit 0] ... [bit n-1]
//! ```
//!
//! All words are little-endian `u16`. The type tag tells whether the frame
//! type word holds a transmit ([`TX_FRAME_TYPE`]) or receive
//! ([`RX_FRAME_TYPE`]) classification. The payload holds the bit count of
//! the mode for speech frames and [`NBBITS_SID`] words for silence
//! descriptor and empty frames.

use std::io::Read;

use bytes::{BufMut, BytesMut};
use tracing::warn;

use super::{fit_bits, read_words, Frame};
use crate::error::Result;
use crate::types::{Mode, RxFrameType, TxFrameType, NBBITS_SID};

/// Tag of frames whose type word is a [`TxFrameType`]
pub const TX_FRAME_TYPE: u16 = 0x6B21;
/// Tag of frames whose type word is an [`RxFrameType`]
pub const RX_FRAME_TYPE: u16 = 0x6B20;
/// Word for a zero bit
pub const BIT_0: u16 = 0xFF81;
/// Word for a one bit
pub const BIT_1: u16 = 0x007F;

fn put_bits(buf: &mut BytesMut, bits: &[bool]) {
    buf.reserve(bits.len() * 2);
    for &bit in bits {
        buf.put_u16_le(if bit { BIT_1 } else { BIT_0 });
    }
}

/// Payload length the reader expects for a frame
fn payload_len(frame_type: RxFrameType, mode: Mode) -> usize {
    if frame_type.is_sid_or_no_data() {
        NBBITS_SID
    } else {
        mode.bits_per_frame()
    }
}

/// Append an encoder frame; `mode` is the requested speech mode
pub(super) fn write_tx(buf: &mut BytesMut, bits: &[bool], frame_type: TxFrameType, mode: Mode) {
    buf.put_u16_le(TX_FRAME_TYPE);
    buf.put_u16_le(frame_type.value());
    buf.put_u16_le(mode.index() as u16);
    put_bits(buf, bits);
}

/// Append a received frame with its payload fitted to the expected length
pub(super) fn write_rx(buf: &mut BytesMut, frame: &Frame) {
    buf.put_u16_le(RX_FRAME_TYPE);
    buf.put_u16_le(frame.frame_type.value());
    buf.put_u16_le(frame.mode.index() as u16);
    put_bits(buf, &fit_bits(&frame.bits, payload_len(frame.frame_type, frame.mode)));
}

/// Read one frame, `Ok(None)` if the stream ends inside it
pub(super) fn read<R: Read + ?Sized>(reader: &mut R) -> Result<Option<Frame>> {
    let Some(header) = read_words(reader, 3)? else {
        return Ok(None);
    };
    let (tag, type_value, mode_value) = (header[0], header[1], header[2]);

    let mode = Mode::try_from(i32::from(mode_value as i16))?;
    let frame_type = match tag {
        TX_FRAME_TYPE => RxFrameType::from(TxFrameType::from_value(type_value)?),
        RX_FRAME_TYPE => RxFrameType::from_value(type_value)?,
        other => {
            warn!(
                tag = %format!("{other:#06x}"),
                "Wrong type of frame type tag, reading as received frame"
            );
            RxFrameType::from_value(type_value)?
        }
    };

    let Some(words) = read_words(reader, payload_len(frame_type, mode))? else {
        return Ok(None);
    };
    let bits = words.iter().map(|&word| word == BIT_1).collect();
    Ok(Some(Frame {
        bits,
        frame_type,
        mode,
    }))
}
