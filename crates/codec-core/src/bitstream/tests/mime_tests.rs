use super::utils::*;
use crate::bitstream::mime::{toc_byte, FT_NO_DATA, FT_SID, FT_SPEECH_LOST, MAGIC, PACKED_SIZE};
use crate::bitstream::{Frame, FrameDecoder, FrameEncoder};
use crate::error::CodecError;
use crate::types::{BitstreamFormat, CodingMode, Mode, RxFrameType, NBBITS_SID};

fn stream(frames: &[&[u8]]) -> Vec<u8> {
    let mut bytes = MAGIC.to_vec();
    for frame in frames {
        bytes.extend_from_slice(frame);
    }
    bytes
}

#[test]
fn test_magic_written_once() {
    let mut encoder = FrameEncoder::new(BitstreamFormat::Mime);
    let bits = vec![true; 132];
    let first = encoder
        .encode_frame(&bits, CodingMode::Speech(Mode::Mode0), Mode::Mode0)
        .unwrap();
    let second = encoder
        .encode_frame(&bits, CodingMode::Speech(Mode::Mode0), Mode::Mode0)
        .unwrap();
    assert!(encoder.stream_header().is_none());

    assert_eq!(&first[..MAGIC.len()], MAGIC);
    assert_eq!(first.len(), MAGIC.len() + 1 + 17);
    assert_eq!(second.len(), 1 + 17);
    assert_eq!(second[0], 0x04);
    // 132 ones: 16 full bytes then 4 bits
    assert!(second[1..17].iter().all(|&byte| byte == 0xFF));
    assert_eq!(second[17], 0xF0);
}

#[test]
fn test_empty_stream_has_magic_only() {
    let mut encoder = FrameEncoder::new(BitstreamFormat::Mime);
    let header = encoder.stream_header().unwrap();
    assert_eq!(&header[..], MAGIC);
    assert!(decode_all(BitstreamFormat::Mime, &header).is_empty());
}

#[test]
fn test_bad_magic_is_fatal() {
    let mut decoder = FrameDecoder::new(BitstreamFormat::Mime);
    let err = decoder
        .decode_frame(&mut &b"#!AMR\n\x04"[..])
        .unwrap_err();
    assert!(matches!(err, CodecError::InvalidMagic { ref found } if found == b"#!AMR\n\x04"));

    let mut decoder = FrameDecoder::new(BitstreamFormat::Mime);
    let err = decoder.decode_frame(&mut &b""[..]).unwrap_err();
    assert!(matches!(err, CodecError::InvalidMagic { ref found } if found.is_empty()));

    // narrowband magic
    let mut decoder = FrameDecoder::new(BitstreamFormat::Mime);
    assert!(decoder.read_stream_header(&mut &b"#!AMR\n\x00\x00\x00"[..]).is_err());
}

#[test]
fn test_dtx_sequence() {
    let mut encoder = FrameEncoder::new(BitstreamFormat::Mime);
    let speech = pattern(253, 0);
    let sid = vec![true; NBBITS_SID];

    let mut bytes = encoder
        .encode_frame(&speech, CodingMode::Speech(Mode::Mode2), Mode::Mode2)
        .unwrap()
        .to_vec();
    let mut dtx_frames = Vec::new();
    for _ in 0..4 {
        let frame = encoder
            .encode_frame(&sid, CodingMode::Dtx, Mode::Mode2)
            .unwrap();
        bytes.extend_from_slice(&frame);
        dtx_frames.push(frame);
    }

    // SID_FIRST: zeroed payload, STI clear, mode 2
    assert_eq!(&dtx_frames[0][..], &[0x4C, 0, 0, 0, 0, 0b0000_0010]);
    assert_eq!(&dtx_frames[1][..], &[toc_byte(FT_NO_DATA, true)]);
    assert_eq!(&dtx_frames[2][..], &[toc_byte(FT_NO_DATA, true)]);
    // SID_UPDATE: payload kept, STI set
    assert_eq!(&dtx_frames[3][..], &[0x4C, 0xFF, 0xFF, 0xFF, 0xFF, 0b1111_0010]);

    let frames = decode_all(BitstreamFormat::Mime, &bytes);
    let summary: Vec<_> = frames
        .iter()
        .map(|frame| (frame.frame_type, frame.mode, frame.bit_count()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (RxFrameType::SpeechGood, Mode::Mode2, 253),
            (RxFrameType::SidFirst, Mode::Mode2, NBBITS_SID),
            (RxFrameType::NoData, Mode::Mode2, 0),
            (RxFrameType::NoData, Mode::Mode2, 0),
            (RxFrameType::SidUpdate, Mode::Mode2, NBBITS_SID),
        ]
    );
    assert_eq!(frames[0].bits, speech);
    assert_eq!(frames[4].bits, sid);
}

#[test]
fn test_quality_bit_and_special_frame_types() {
    let speech_bad = [&[toc_byte(4, false)][..], &[0u8; 40][..]].concat();
    // STI set, requested mode 4
    let sid_bad = [toc_byte(FT_SID, false), 0, 0, 0, 0, 0x14];
    let lost = [toc_byte(FT_SPEECH_LOST, false)];
    let reserved = [toc_byte(12, true)];

    let bytes = stream(&[&speech_bad[..], &sid_bad[..], &lost[..], &reserved[..]]);
    let frames = decode_all(BitstreamFormat::Mime, &bytes);
    let summary: Vec<_> = frames
        .iter()
        .map(|frame| (frame.frame_type, frame.mode))
        .collect();
    assert_eq!(
        summary,
        vec![
            (RxFrameType::SpeechBad, Mode::Mode4),
            (RxFrameType::SidBad, Mode::Mode4),
            (RxFrameType::SpeechLost, Mode::Mode4),
            (RxFrameType::NoData, Mode::Mode4),
        ]
    );
}

#[test]
fn test_truncated_payload_ends_stream() {
    let mut payload = vec![toc_byte(8, true)];
    payload.extend(vec![0u8; PACKED_SIZE[8] - 1]);
    let bytes = stream(&[&payload[..]]);
    assert!(decode_all(BitstreamFormat::Mime, &bytes).is_empty());
}

#[test]
fn test_received_lost_frame() {
    let frame = Frame {
        bits: pattern(132, 0),
        frame_type: RxFrameType::SpeechLost,
        mode: Mode::Mode0,
    };
    let mut encoder = FrameEncoder::new(BitstreamFormat::Mime);
    let bytes = encoder.encode_received(&frame).unwrap();
    assert_eq!(&bytes[MAGIC.len()..], &[toc_byte(FT_SPEECH_LOST, true)]);
}

#[test]
fn test_sid_mode_survives_without_prior_speech() {
    let mut encoder = FrameEncoder::new(BitstreamFormat::Mime);
    let bytes = encoder
        .encode_frame(&[true; NBBITS_SID], CodingMode::Dtx, Mode::Mode6)
        .unwrap();
    assert_eq!(bytes[bytes.len() - 1], 0b0000_0110);

    let mut decoder = FrameDecoder::new(BitstreamFormat::Mime);
    let frame = decoder.decode_frame(&mut &bytes[..]).unwrap().unwrap();
    assert_eq!(frame.frame_type, RxFrameType::SidFirst);
    assert_eq!(frame.mode, Mode::Mode6);
    assert_eq!(decoder.prev_mode(), Mode::Mode6);

    let mut reencoded = FrameEncoder::new(BitstreamFormat::Mime);
    assert_eq!(reencoded.encode_received(&frame).unwrap(), bytes);
}

#[test]
fn test_sid_mode_carries_to_lost_frames() {
    let sid = [toc_byte(FT_SID, true), 0, 0, 0, 0, 0b0001_0111];
    let lost = [toc_byte(FT_SPEECH_LOST, true)];
    let bytes = stream(&[&sid[..], &lost[..]]);
    let frames = decode_all(BitstreamFormat::Mime, &bytes);
    assert_eq!(frames[0].mode, Mode::Mode7);
    assert_eq!(frames[1].mode, Mode::Mode7);
}
