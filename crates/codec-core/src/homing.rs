//! Homing frame detection
//!
//! A homing frame drives encoder or decoder back to its initial state so
//! conformance vectors can be replayed bit-exactly. On the encoder side the
//! homing frame is a fixed PCM pattern; on the decoder side it is the
//! parameter frame the encoder produces for that pattern from reset state,
//! supplied by the speech decoder through
//! [`SpeechDecoder::homing_frame`](crate::types::SpeechDecoder::homing_frame).

use crate::types::{Mode, L_FRAME16K};

/// Sample value of the encoder homing frame (and of the decoder output for a
/// homing frame received while already homed)
pub const EHF_MASK: i16 = 0x0008;

/// Parameter bits up to and including the first sub-frame, per mode
pub const FIRST_SUBFRAME_BITS: [usize; 9] = [63, 81, 100, 108, 116, 128, 136, 152, 156];

/// True if every sample of `frame` equals the encoder homing pattern
pub fn encoder_homing_frame_test(frame: &[i16]) -> bool {
    frame.len() == L_FRAME16K && frame.iter().all(|&sample| sample == EHF_MASK)
}

/// Compare the first `nparms` bits of `bits` with the homing frame
fn dhf_test(bits: &[bool], homing: &[bool], nparms: usize) -> bool {
    match (bits.get(..nparms), homing.get(..nparms)) {
        (Some(received), Some(expected)) => received == expected,
        _ => false,
    }
}

/// Full decoder homing test over the complete parameter frame
pub fn decoder_homing_frame_test(bits: &[bool], mode: Mode, homing: &[bool]) -> bool {
    dhf_test(bits, homing, mode.bits_per_frame())
}

/// Partial decoder homing test, first sub-frame only
pub fn decoder_homing_frame_test_first(bits: &[bool], mode: Mode, homing: &[bool]) -> bool {
    dhf_test(bits, homing, FIRST_SUBFRAME_BITS[mode.index()])
}
