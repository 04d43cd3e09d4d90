//! Control loop tests driven by deterministic stub engines

use super::*;
use crate::bitstream::{Frame, FrameDecoder};
use crate::config::{DecoderConfig, EncoderConfig, ModeSelection};
use crate::error::{CodecError, Result};
use crate::homing::EHF_MASK;
use crate::types::{
    BitstreamFormat, CodingMode, EncodedFrame, Mode, RxFrameType, SpeechDecoder, SpeechEncoder,
    L_FRAME16K, NBBITS_SID,
};

/// Persistent memory of the stub engines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct StubMemory {
    frames: u32,
    accumulator: i64,
}

#[derive(Debug, Default)]
struct StubEncoder {
    memory: StubMemory,
    calls: Vec<(Mode, i16, bool)>,
    resets: u32,
}

impl SpeechEncoder for StubEncoder {
    fn encode(
        &mut self,
        mode: Mode,
        frame: &[i16; L_FRAME16K],
        allow_dtx: bool,
    ) -> Result<EncodedFrame> {
        self.calls.push((mode, frame[0], allow_dtx));
        self.memory.frames += 1;
        self.memory.accumulator += frame.iter().map(|&s| i64::from(s)).sum::<i64>();

        let silent = frame.iter().all(|&s| s == 0);
        let coding_mode = if allow_dtx && silent {
            CodingMode::Dtx
        } else {
            CodingMode::Speech(mode)
        };
        let seed = self.memory.frames as usize;
        let bits = (0..coding_mode.bits_per_frame())
            .map(|i| (i + seed) % 3 == 0)
            .collect();
        Ok(EncodedFrame { bits, coding_mode })
    }

    fn reset(&mut self) {
        self.memory = StubMemory::default();
        self.resets += 1;
    }
}

#[derive(Debug)]
struct StubDecoder {
    memory: StubMemory,
    homing: Vec<Vec<bool>>,
    calls: Vec<(Mode, RxFrameType)>,
    resets: u32,
}

impl StubDecoder {
    fn new() -> Self {
        let homing = Mode::ALL
            .iter()
            .map(|mode| homing_bits(*mode))
            .collect();
        Self {
            memory: StubMemory::default(),
            homing,
            calls: Vec::new(),
            resets: 0,
        }
    }
}

fn homing_bits(mode: Mode) -> Vec<bool> {
    (0..mode.bits_per_frame()).map(|i| i % 4 == 1).collect()
}

fn other_bits(mode: Mode) -> Vec<bool> {
    (0..mode.bits_per_frame()).map(|i| i % 2 == 0).collect()
}

impl SpeechDecoder for StubDecoder {
    fn decode(
        &mut self,
        mode: Mode,
        bits: &[bool],
        frame_type: RxFrameType,
        output: &mut [i16; L_FRAME16K],
    ) -> Result<usize> {
        self.calls.push((mode, frame_type));
        self.memory.frames += 1;
        self.memory.accumulator += bits.iter().filter(|&&b| b).count() as i64;
        // low bits set so masking is observable
        output.fill(0x0103 + mode.index() as i16 * 0x10);
        Ok(L_FRAME16K)
    }

    fn reset(&mut self) {
        self.memory = StubMemory::default();
        self.resets += 1;
    }

    fn homing_frame(&self, mode: Mode) -> &[bool] {
        &self.homing[mode.index()]
    }
}

fn speech(bits: Vec<bool>, mode: Mode) -> Frame {
    Frame {
        bits,
        frame_type: RxFrameType::SpeechGood,
        mode,
    }
}

fn decoder_session() -> DecoderSession<StubDecoder> {
    DecoderSession::new(StubDecoder::new(), &DecoderConfig::default()).unwrap()
}

#[test]
fn test_mode_file_exhaustion_locks_last_mode() {
    let schedule = ModeSchedule::from_text("2 5\n7\n");
    let mut session =
        EncoderSession::with_schedule(StubEncoder::default(), BitstreamFormat::Default, schedule, false);

    let mut out = Vec::new();
    for i in 0..5 {
        let samples = [i as i16 * 100; L_FRAME16K];
        out.extend_from_slice(&session.encode_frame(&samples).unwrap());
    }

    let modes: Vec<_> = session.engine().calls.iter().map(|call| call.0).collect();
    assert_eq!(
        modes,
        vec![Mode::Mode2, Mode::Mode5, Mode::Mode7, Mode::Mode7, Mode::Mode7]
    );

    let mut decoder = FrameDecoder::new(BitstreamFormat::Default);
    let mut reader = &out[..];
    let mut wire_modes = Vec::new();
    while let Some(frame) = decoder.decode_frame(&mut reader).unwrap() {
        wire_modes.push(frame.mode);
    }
    assert_eq!(wire_modes, modes);
}

#[test]
fn test_empty_mode_file_uses_mode_zero() {
    let mut schedule = ModeSchedule::from_text("  \n");
    assert_eq!(schedule.next_mode().unwrap(), Mode::Mode0);
    assert!(schedule.is_exhausted());
    assert_eq!(schedule.next_mode().unwrap(), Mode::Mode0);
}

#[test]
fn test_mode_file_errors_are_fatal() {
    let mut schedule = ModeSchedule::from_text("1 9 2");
    assert_eq!(schedule.next_mode().unwrap(), Mode::Mode1);
    assert!(matches!(
        schedule.next_mode(),
        Err(CodecError::InvalidMode { mode: 9 })
    ));

    let mut schedule = ModeSchedule::from_text("x");
    assert!(matches!(
        schedule.next_mode(),
        Err(CodecError::InvalidConfig { .. })
    ));
}

#[test]
fn test_fixed_mode_from_config() {
    let config = EncoderConfig::new(ModeSelection::Fixed(4));
    let mut session = EncoderSession::new(StubEncoder::default(), &config).unwrap();
    session.encode_frame(&[100; L_FRAME16K]).unwrap();
    assert_eq!(session.engine().calls[0].0, Mode::Mode4);

    let config = EncoderConfig::new(ModeSelection::Fixed(12));
    assert!(EncoderSession::new(StubEncoder::default(), &config).is_err());
}

#[test]
fn test_encoder_masks_samples() {
    let mut session = EncoderSession::with_schedule(
        StubEncoder::default(),
        BitstreamFormat::Itu,
        ModeSchedule::fixed(Mode::Mode0),
        false,
    );
    session.encode_frame(&[0x0007; L_FRAME16K]).unwrap();
    assert_eq!(session.engine().calls[0].1, 0x0004);
}

#[test]
fn test_encoder_homing_frame_resets_after_encoding() {
    let mut session = EncoderSession::with_schedule(
        StubEncoder::default(),
        BitstreamFormat::Default,
        ModeSchedule::fixed(Mode::Mode1),
        false,
    );
    session.encode_frame(&[1000; L_FRAME16K]).unwrap();
    session.encode_frame(&[EHF_MASK; L_FRAME16K]).unwrap();

    let engine = session.engine();
    // the homing frame itself was encoded before the reset
    assert_eq!(engine.calls.len(), 2);
    assert_eq!(engine.calls[1].1, EHF_MASK);
    assert_eq!(engine.resets, 1);
    assert_eq!(engine.memory, StubMemory::default());
    assert_eq!(session.stats().homing_resets, 1);
}

#[test]
fn test_encoder_dtx_frames() {
    let mut session = EncoderSession::with_schedule(
        StubEncoder::default(),
        BitstreamFormat::Mime,
        ModeSchedule::fixed(Mode::Mode2),
        true,
    );
    let first = session.encode_frame(&[0; L_FRAME16K]).unwrap();
    let second = session.encode_frame(&[0; L_FRAME16K]).unwrap();
    assert_eq!(session.stats().dtx_frames, 2);
    // magic, then SID_FIRST
    assert_eq!(first.len(), 9 + 1 + 5);
    // NO_DATA
    assert_eq!(&second[..], &[0x7C]);
}

#[test]
fn test_encoder_run_writes_magic_for_empty_input() {
    let mut session = EncoderSession::with_schedule(
        StubEncoder::default(),
        BitstreamFormat::Mime,
        ModeSchedule::fixed(Mode::Mode0),
        false,
    );
    let mut out = Vec::new();
    // shorter than one frame
    let pcm = vec![0u8; 100];
    let stats = session.run(&mut &pcm[..], &mut out).unwrap();
    assert_eq!(stats.frames, 0);
    assert_eq!(out, b"#!AMR-WB\n");
}

#[test]
fn test_decoder_first_homing_frame_is_bypassed() {
    let mut session = decoder_session();
    let mut output = [0i16; L_FRAME16K];

    // the decoder starts homed, so a homing frame continues the sequence
    session
        .decode_frame(&speech(homing_bits(Mode::Mode2), Mode::Mode2), &mut output)
        .unwrap();
    assert!(output.iter().all(|&s| s == EHF_MASK));
    assert!(session.engine().calls.is_empty());
    assert_eq!(session.engine().resets, 1);
    assert!(session.is_homed());
}

#[test]
fn test_decoder_homing_propagation() {
    let mut session = decoder_session();
    let mut output = [0i16; L_FRAME16K];
    let mode = Mode::Mode5;

    session
        .decode_frame(&speech(other_bits(mode), mode), &mut output)
        .unwrap();
    assert!(!session.is_homed());
    assert_eq!(output[0], 0x0150);

    // first homing frame: decoded normally, full test triggers the reset
    session
        .decode_frame(&speech(homing_bits(mode), mode), &mut output)
        .unwrap();
    assert_eq!(session.engine().calls.len(), 2);
    assert_eq!(output[0], 0x0150);
    assert!(session.is_homed());
    assert_eq!(session.engine().resets, 1);
    assert_eq!(session.engine().memory, StubMemory::default());

    // second homing frame: homing pattern, engine bypassed, reset again
    session
        .decode_frame(&speech(homing_bits(mode), mode), &mut output)
        .unwrap();
    assert_eq!(session.engine().calls.len(), 2);
    assert!(output.iter().all(|&s| s == EHF_MASK));
    assert_eq!(session.engine().resets, 2);
    assert_eq!(session.engine().memory, StubMemory::default());

    // a normal frame ends the sequence
    session
        .decode_frame(&speech(other_bits(mode), mode), &mut output)
        .unwrap();
    assert_eq!(session.engine().calls.len(), 3);
    assert!(!session.is_homed());
    assert_eq!(session.stats().homing_resets, 2);
}

#[test]
fn test_partial_test_only_checks_first_subframe() {
    let mut session = decoder_session();
    let mut output = [0i16; L_FRAME16K];
    let mode = Mode::Mode0;

    // homing first sub-frame, different tail: still a homing frame while homed
    let mut bits = homing_bits(mode);
    let last = bits.len() - 1;
    bits[last] = !bits[last];
    session.decode_frame(&speech(bits, mode), &mut output).unwrap();
    assert!(output.iter().all(|&s| s == EHF_MASK));
    assert!(session.is_homed());
}

#[test]
fn test_empty_homing_table_disables_detection() {
    let mut engine = StubDecoder::new();
    engine.homing = vec![Vec::new(); Mode::ALL.len()];
    let mut session = DecoderSession::new(engine, &DecoderConfig::default()).unwrap();
    let mut output = [0i16; L_FRAME16K];
    let mode = Mode::Mode2;

    for _ in 0..3 {
        session
            .decode_frame(&speech(homing_bits(mode), mode), &mut output)
            .unwrap();
    }
    assert_eq!(session.engine().calls.len(), 3);
    assert_eq!(session.engine().resets, 0);
    assert!(!session.is_homed());
    assert_eq!(session.stats().homing_resets, 0);
}

#[test]
fn test_lost_frame_carries_mode_and_skips_homing() {
    let mut session = decoder_session();
    let mut output = [0i16; L_FRAME16K];

    session
        .decode_frame(&speech(other_bits(Mode::Mode3), Mode::Mode3), &mut output)
        .unwrap();

    // lost frame claiming another mode with homing bits
    let lost = Frame {
        bits: homing_bits(Mode::Mode0),
        frame_type: RxFrameType::SpeechLost,
        mode: Mode::Mode0,
    };
    session.decode_frame(&lost, &mut output).unwrap();
    let no_data = Frame {
        bits: Vec::new(),
        frame_type: RxFrameType::NoData,
        mode: Mode::Mode8,
    };
    session.decode_frame(&no_data, &mut output).unwrap();

    let calls = &session.engine().calls;
    assert_eq!(calls[1], (Mode::Mode3, RxFrameType::SpeechLost));
    assert_eq!(calls[2], (Mode::Mode3, RxFrameType::NoData));
    assert_eq!(session.mode_old(), Mode::Mode3);
    assert_eq!(session.engine().resets, 0);
    assert!(!session.is_homed());
    assert_eq!(session.stats().lost_frames, 2);
}

#[test]
fn test_lost_frame_while_homed_is_decoded() {
    let mut session = decoder_session();
    let mut output = [0i16; L_FRAME16K];
    let lost = Frame {
        bits: Vec::new(),
        frame_type: RxFrameType::SpeechLost,
        mode: Mode::Mode0,
    };
    session.decode_frame(&lost, &mut output).unwrap();
    assert_eq!(session.engine().calls.len(), 1);
    assert!(!session.is_homed());
}

#[test]
fn test_sid_frames_update_mode_old() {
    let mut session = decoder_session();
    let mut output = [0i16; L_FRAME16K];
    let sid = Frame {
        bits: vec![true; NBBITS_SID],
        frame_type: RxFrameType::SidUpdate,
        mode: Mode::Mode6,
    };
    session.decode_frame(&sid, &mut output).unwrap();
    assert_eq!(session.mode_old(), Mode::Mode6);
    assert_eq!(session.engine().calls[0], (Mode::Mode6, RxFrameType::SidUpdate));
}

#[test]
fn test_decoder_output_is_masked() {
    let mut session = decoder_session();
    let mut output = [0i16; L_FRAME16K];
    session
        .decode_frame(&speech(other_bits(Mode::Mode1), Mode::Mode1), &mut output)
        .unwrap();
    assert!(output.iter().all(|&s| s == 0x0110));
}

#[test]
fn test_encode_decode_sessions_chain() {
    let mut encoder = EncoderSession::with_schedule(
        StubEncoder::default(),
        BitstreamFormat::Itu,
        ModeSchedule::fixed(Mode::Mode8),
        false,
    );
    let mut pcm = Vec::new();
    for i in 0..4i16 {
        for _ in 0..L_FRAME16K {
            pcm.extend_from_slice(&(i * 40).to_le_bytes());
        }
    }
    let mut bitstream = Vec::new();
    encoder.run(&mut &pcm[..], &mut bitstream).unwrap();

    let mut decoder = DecoderSession::new(
        StubDecoder::new(),
        &DecoderConfig::new(BitstreamFormat::Itu),
    )
    .unwrap();
    let mut decoded = Vec::new();
    let stats = decoder.run(&mut &bitstream[..], &mut decoded).unwrap();
    assert_eq!(stats.frames, 4);
    assert_eq!(decoded.len(), pcm.len());
    assert!(decoder
        .engine()
        .calls
        .iter()
        .all(|call| *call == (Mode::Mode8, RxFrameType::SpeechGood)));
}
