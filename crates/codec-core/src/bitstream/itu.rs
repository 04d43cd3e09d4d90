//! ITU-T G.192 style soft-bit layout
//!
//! ```text
//! [sync][N][soft bit 0] ... [soft bit N-1]
//! ```
//!
//! The record is self-describing: `N` may be any value, the frame type and
//! mode are derived from `N` and the sync word by [`classify`].

use std::io::Read;

use bytes::{BufMut, BytesMut};

use super::{fit_bits, read_words, Frame};
use crate::error::{CodecError, Result};
use crate::types::{Mode, RxFrameType, TxFrameType, NBBITS_SID};

/// Sync word of a good frame
pub const SYNC_GOOD: u16 = 0x6B21;
/// Sync word of a bad (lost) frame
pub const SYNC_BAD: u16 = 0x6B20;
/// Soft bit for zero
pub const BIT_0: u16 = 0x007F;
/// Soft bit for one
pub const BIT_1: u16 = 0x0081;

/// One raw record as stored on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItuRecord {
    /// Sync word
    pub sync: u16,
    /// Bits decoded from the soft-bit words, `N` entries
    pub bits: Vec<bool>,
}

impl ItuRecord {
    /// Bit count `N` as stored in the record
    pub fn bit_count(&self) -> u16 {
        self.bits.len() as u16
    }
}

fn put_record(buf: &mut BytesMut, sync: u16, bits: &[bool]) {
    buf.reserve(4 + bits.len() * 2);
    buf.put_u16_le(sync);
    buf.put_u16_le(bits.len() as u16);
    for &bit in bits {
        buf.put_u16_le(if bit { BIT_1 } else { BIT_0 });
    }
}

/// Append an encoder frame. `SID_FIRST` and `NO_DATA` frames are written
/// without payload.
pub(super) fn write_tx(buf: &mut BytesMut, bits: &[bool], frame_type: TxFrameType) {
    match frame_type {
        TxFrameType::NoData | TxFrameType::SidFirst => put_record(buf, SYNC_GOOD, &[]),
        TxFrameType::Speech | TxFrameType::SidUpdate => put_record(buf, SYNC_GOOD, bits),
    }
}

/// Append a received frame. Good frames get the payload length their type
/// is recognized by; bad frames keep their bits as they are.
pub(super) fn write_rx(buf: &mut BytesMut, frame: &Frame) {
    match frame.frame_type {
        RxFrameType::SpeechGood | RxFrameType::SpeechProbablyDegraded => put_record(
            buf,
            SYNC_GOOD,
            &fit_bits(&frame.bits, frame.mode.bits_per_frame()),
        ),
        RxFrameType::SidUpdate => put_record(buf, SYNC_GOOD, &fit_bits(&frame.bits, NBBITS_SID)),
        RxFrameType::SidFirst | RxFrameType::NoData => put_record(buf, SYNC_GOOD, &[]),
        RxFrameType::SpeechLost | RxFrameType::SpeechBad | RxFrameType::SidBad => {
            put_record(buf, SYNC_BAD, &frame.bits)
        }
    }
}

/// Read one raw record, `Ok(None)` if the stream ends inside it
pub fn read_record<R: Read + ?Sized>(reader: &mut R) -> Result<Option<ItuRecord>> {
    let Some(header) = read_words(reader, 2)? else {
        return Ok(None);
    };
    let (sync, count) = (header[0], header[1]);
    let Some(words) = read_words(reader, usize::from(count))? else {
        return Ok(None);
    };
    let bits = words.iter().map(|&word| word != BIT_0).collect();
    Ok(Some(ItuRecord { sync, bits }))
}

/// Derive frame type and mode of a record.
///
/// Bad records are lost speech; good records are classified by their bit
/// count. `prev_mode` is used for frames that do not imply a mode.
///
/// # Errors
///
/// [`CodecError::InvalidFrameLength`] if a good record's bit count matches
/// no mode, [`CodecError::InvalidFormat`] for an unknown sync word.
pub fn classify(record: &ItuRecord, prev_mode: Mode) -> Result<Frame> {
    let (frame_type, mode) = match record.sync {
        SYNC_BAD => (RxFrameType::SpeechLost, prev_mode),
        SYNC_GOOD => match record.bits.len() {
            0 => (RxFrameType::NoData, prev_mode),
            NBBITS_SID => (RxFrameType::SidUpdate, prev_mode),
            count => match Mode::from_bit_count(count) {
                Some(mode) => (RxFrameType::SpeechGood, mode),
                None => {
                    return Err(CodecError::InvalidFrameLength {
                        bits: record.bit_count(),
                    })
                }
            },
        },
        other => {
            return Err(CodecError::invalid_format(format!(
                "unknown sync word {other:#06x}"
            )))
        }
    };
    Ok(Frame {
        bits: record.bits.clone(),
        frame_type,
        mode,
    })
}
