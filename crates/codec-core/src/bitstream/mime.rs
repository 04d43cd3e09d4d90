//! RFC 3267 MIME/storage layout
//!
//! The stream starts with [`MAGIC`]. Each frame is a table-of-contents byte
//! `(FT << 3) | (Q << 2)` followed by [`PACKED_SIZE`]`[FT]` payload bytes
//! holding the parameter bits MSB-first. Silence descriptor payloads are
//! followed by the STI bit (set for an update) and the 4-bit requested mode.

use std::io::Read;

use bytes::{BufMut, BytesMut};

use super::Frame;
use crate::error::Result;
use crate::types::{CodingMode, Mode, RxFrameType, TxFrameType, NBBITS_SID};
use crate::utils::pcm::read_full;

/// Magic string opening every stream
pub const MAGIC: &[u8; 9] = b"#!AMR-WB\n";

/// Frame type of silence descriptors
pub const FT_SID: usize = 9;
/// Frame type of lost speech
pub const FT_SPEECH_LOST: usize = 14;
/// Frame type of empty frames
pub const FT_NO_DATA: usize = 15;

/// Payload bytes per frame type
pub const PACKED_SIZE: [usize; 16] = [17, 23, 32, 36, 40, 46, 50, 58, 60, 5, 0, 0, 0, 0, 0, 0];

/// Parameter bits per frame type
pub const UNPACKED_SIZE: [usize; 16] = [
    132, 177, 253, 285, 317, 365, 397, 461, 477, 35, 0, 0, 0, 0, 0, 0,
];

/// Table-of-contents byte
pub fn toc_byte(frame_type: usize, quality: bool) -> u8 {
    (((frame_type & 0x0F) as u8) << 3) | if quality { 0x04 } else { 0x00 }
}

/// SID trailer: STI bit and requested mode
struct SidTail {
    update: bool,
    mode: Mode,
}

fn put_frame(
    buf: &mut BytesMut,
    frame_type: usize,
    quality: bool,
    bits: &[bool],
    sid_tail: Option<SidTail>,
) {
    let size = PACKED_SIZE[frame_type];
    let mut packed = vec![0u8; size];
    let mut payload: Vec<bool> = bits.iter().copied().take(UNPACKED_SIZE[frame_type]).collect();
    payload.resize(UNPACKED_SIZE[frame_type], false);
    if let Some(tail) = sid_tail {
        payload.push(tail.update);
        let index = tail.mode.index();
        payload.extend((0..4).rev().map(|shift| (index >> shift) & 1 == 1));
    }
    for (position, _) in payload.iter().enumerate().filter(|(_, bit)| **bit) {
        if let Some(byte) = packed.get_mut(position / 8) {
            *byte |= 0x80 >> (position % 8);
        }
    }

    buf.reserve(1 + size);
    buf.put_u8(toc_byte(frame_type, quality));
    buf.put_slice(&packed);
}

/// Append an encoder frame; `mode` is the requested speech mode
pub(super) fn write_tx(
    buf: &mut BytesMut,
    bits: &[bool],
    frame_type: TxFrameType,
    coding_mode: CodingMode,
    mode: Mode,
) {
    match coding_mode {
        CodingMode::Speech(coded) => put_frame(buf, coded.index(), true, bits, None),
        CodingMode::Dtx => match frame_type {
            TxFrameType::NoData => put_frame(buf, FT_NO_DATA, true, &[], None),
            TxFrameType::SidFirst => put_frame(
                buf,
                FT_SID,
                true,
                &[false; NBBITS_SID],
                Some(SidTail { update: false, mode }),
            ),
            TxFrameType::SidUpdate | TxFrameType::Speech => put_frame(
                buf,
                FT_SID,
                true,
                bits,
                Some(SidTail { update: true, mode }),
            ),
        },
    }
}

/// Append a received frame
pub(super) fn write_rx(buf: &mut BytesMut, frame: &Frame) {
    let speech = frame.mode.index();
    let sid = |update| {
        Some(SidTail {
            update,
            mode: frame.mode,
        })
    };
    match frame.frame_type {
        RxFrameType::SpeechGood | RxFrameType::SpeechProbablyDegraded => {
            put_frame(buf, speech, true, &frame.bits, None)
        }
        RxFrameType::SpeechBad => put_frame(buf, speech, false, &frame.bits, None),
        RxFrameType::SidFirst => put_frame(buf, FT_SID, true, &frame.bits, sid(false)),
        RxFrameType::SidUpdate => put_frame(buf, FT_SID, true, &frame.bits, sid(true)),
        RxFrameType::SidBad => put_frame(buf, FT_SID, false, &frame.bits, sid(false)),
        RxFrameType::SpeechLost => put_frame(buf, FT_SPEECH_LOST, true, &[], None),
        RxFrameType::NoData => put_frame(buf, FT_NO_DATA, true, &[], None),
    }
}

/// Read one frame, `Ok(None)` at the end of the stream or if the stream ends
/// inside the payload. The magic must already have been consumed.
///
/// Speech frames take their mode from the frame type and silence
/// descriptors from the requested mode in their trailer. Lost and empty
/// frames inherit `prev_mode`.
///
/// # Errors
///
/// [`CodecError::InvalidMode`](crate::error::CodecError::InvalidMode) when a
/// silence descriptor requests a mode above 8.
pub(super) fn read<R: Read + ?Sized>(reader: &mut R, prev_mode: Mode) -> Result<Option<Frame>> {
    let mut toc = [0u8; 1];
    if !read_full(reader, &mut toc)? {
        return Ok(None);
    }
    let quality = (toc[0] >> 2) & 0x01 == 1;
    let frame_type = usize::from((toc[0] >> 3) & 0x0F);

    let mut packed = vec![0u8; PACKED_SIZE[frame_type]];
    if !read_full(reader, &mut packed)? {
        return Ok(None);
    }
    let unpack = |count: usize| -> Vec<bool> {
        (0..count)
            .map(|position| packed[position / 8] & (0x80 >> (position % 8)) != 0)
            .collect()
    };
    let bits = unpack(UNPACKED_SIZE[frame_type]);

    let (frame_type, mode) = match frame_type {
        0..=8 => {
            let mode = Mode::ALL[frame_type];
            if quality {
                (RxFrameType::SpeechGood, mode)
            } else {
                (RxFrameType::SpeechBad, mode)
            }
        }
        FT_SID => {
            let tail = unpack(NBBITS_SID + 5);
            let sti = tail[NBBITS_SID];
            let requested = tail[NBBITS_SID + 1..]
                .iter()
                .fold(0i32, |value, &bit| (value << 1) | i32::from(bit));
            let frame_type = match (quality, sti) {
                (false, _) => RxFrameType::SidBad,
                (true, true) => RxFrameType::SidUpdate,
                (true, false) => RxFrameType::SidFirst,
            };
            (frame_type, Mode::try_from(requested)?)
        }
        FT_SPEECH_LOST => (RxFrameType::SpeechLost, prev_mode),
        // 10..=13 are reserved and read as empty frames
        _ => (RxFrameType::NoData, prev_mode),
    };

    Ok(Some(Frame {
        bits,
        frame_type,
        mode,
    }))
}
