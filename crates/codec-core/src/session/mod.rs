//! Frame control loops
//!
//! [`EncoderSession`] and [`DecoderSession`] drive an external speech engine
//! one 20 ms frame at a time. They own everything that persists between
//! frames apart from the engine memories: the serializer state, the mode
//! source and the homing flags. Sessions are independent of each other, so
//! several can run in one process.

pub mod decoder;
pub mod encoder;

#[cfg(test)]
mod tests;

use std::fmt;

pub use decoder::{decode_file, DecoderSession};
pub use encoder::{encode_file, EncoderSession, ModeSchedule};

/// Frame counters collected by a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Frames processed
    pub frames: u64,
    /// Engine resets triggered by homing frames
    pub homing_resets: u64,
    /// Decoder frames that were lost or carried no data
    pub lost_frames: u64,
    /// Encoder frames the engine coded in DTX
    pub dtx_frames: u64,
}

impl fmt::Display for SessionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} frames, {} homing resets, {} lost/no-data, {} DTX",
            self.frames, self.homing_resets, self.lost_frames, self.dtx_frames
        )
    }
}
