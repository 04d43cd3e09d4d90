//! Shared helpers for the serializer tests

use crate::bitstream::{Frame, FrameDecoder};
use crate::types::BitstreamFormat;

/// Little-endian words as bytes
pub fn words_to_bytes(words: &[u16]) -> Vec<u8> {
    words.iter().flat_map(|word| word.to_le_bytes()).collect()
}

/// Bytes as little-endian words (trailing odd byte dropped)
pub fn bytes_to_words(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Deterministic bit pattern of the given length
pub fn pattern(len: usize, seed: usize) -> Vec<bool> {
    (0..len).map(|i| (i * 7 + seed) % 5 < 2).collect()
}

/// Decode every frame of `bytes`
pub fn decode_all(format: BitstreamFormat, bytes: &[u8]) -> Vec<Frame> {
    let mut decoder = FrameDecoder::new(format);
    let mut reader = bytes;
    let mut frames = Vec::new();
    while let Some(frame) = decoder.decode_frame(&mut reader).unwrap() {
        frames.push(frame);
    }
    frames
}
