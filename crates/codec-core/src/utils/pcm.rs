//! Raw 16-bit PCM frame I/O
//!
//! Speech files are headerless little-endian 16-bit samples. A read that
//! cannot fill a whole frame is the normal end of input.

use std::io::{self, Read, Write};

use crate::types::L_FRAME16K;

/// Mask that drops the two least significant bits (14-bit effective samples)
pub const SAMPLE_MASK: i16 = !0x0003;

/// Fill `buf` completely, returning `Ok(false)` if the source ends first.
///
/// Partial data read before the end is discarded by the caller.
pub(crate) fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => return Ok(false),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(true)
}

/// Read one frame of samples, `Ok(false)` on a short read.
pub fn read_frame<R: Read + ?Sized>(
    reader: &mut R,
    frame: &mut [i16; L_FRAME16K],
) -> io::Result<bool> {
    let mut raw = [0u8; L_FRAME16K * 2];
    if !read_full(reader, &mut raw)? {
        return Ok(false);
    }
    for (sample, chunk) in frame.iter_mut().zip(raw.chunks_exact(2)) {
        *sample = i16::from_le_bytes([chunk[0], chunk[1]]);
    }
    Ok(true)
}

/// Write one frame of samples.
pub fn write_frame<W: Write + ?Sized>(writer: &mut W, frame: &[i16]) -> io::Result<()> {
    let mut raw = Vec::with_capacity(frame.len() * 2);
    for sample in frame {
        raw.extend_from_slice(&sample.to_le_bytes());
    }
    writer.write_all(&raw)
}

/// Clear the two least significant bits of every sample.
pub fn mask_lsbs(frame: &mut [i16]) {
    for sample in frame.iter_mut() {
        *sample &= SAMPLE_MASK;
    }
}
