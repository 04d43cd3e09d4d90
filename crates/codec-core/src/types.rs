//! Core types and traits for the codec library
//!
//! Coding modes, frame classifications, bitstream formats and the capability
//! traits through which the control loops reach the speech engine.

use crate::error::{CodecError, Result};
use std::fmt;
use std::str::FromStr;

/// Samples per 20 ms frame at 16 kHz
pub const L_FRAME16K: usize = 320;

/// Largest parameter frame (mode 8, 23.85 kbit/s)
pub const NB_BITS_MAX: usize = 477;

/// Parameter bits of a silence descriptor frame
pub const NBBITS_SID: usize = 35;

/// Parameter bits per frame indexed by coding mode, SID last
pub const NB_OF_BITS: [usize; 10] = [132, 177, 253, 285, 317, 365, 397, 461, 477, NBBITS_SID];

/// Speech coding mode (one of the nine AMR-WB bit rates)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Mode {
    /// 6.60 kbit/s
    #[default]
    Mode0 = 0,
    /// 8.85 kbit/s
    Mode1 = 1,
    /// 12.65 kbit/s
    Mode2 = 2,
    /// 14.25 kbit/s
    Mode3 = 3,
    /// 15.85 kbit/s
    Mode4 = 4,
    /// 18.25 kbit/s
    Mode5 = 5,
    /// 19.85 kbit/s
    Mode6 = 6,
    /// 23.05 kbit/s
    Mode7 = 7,
    /// 23.85 kbit/s
    Mode8 = 8,
}

impl Mode {
    /// All modes in index order
    pub const ALL: [Mode; 9] = [
        Self::Mode0,
        Self::Mode1,
        Self::Mode2,
        Self::Mode3,
        Self::Mode4,
        Self::Mode5,
        Self::Mode6,
        Self::Mode7,
        Self::Mode8,
    ];

    /// Mode index 0..=8
    pub fn index(self) -> usize {
        self as usize
    }

    /// Parameter bits per frame for this mode
    pub fn bits_per_frame(self) -> usize {
        NB_OF_BITS[self.index()]
    }

    /// Bit rate in bits per second
    pub fn bitrate(self) -> u32 {
        match self {
            Self::Mode0 => 6600,
            Self::Mode1 => 8850,
            Self::Mode2 => 12650,
            Self::Mode3 => 14250,
            Self::Mode4 => 15850,
            Self::Mode5 => 18250,
            Self::Mode6 => 19850,
            Self::Mode7 => 23050,
            Self::Mode8 => 23850,
        }
    }

    /// True for the two lowest bit-rate classes (6.60 and 8.85 kbit/s)
    pub fn is_low_rate(self) -> bool {
        matches!(self, Self::Mode0 | Self::Mode1)
    }

    /// Find the speech mode whose frame carries exactly `bits` parameter bits
    pub fn from_bit_count(bits: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.bits_per_frame() == bits)
    }
}

impl TryFrom<i32> for Mode {
    type Error = CodecError;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            0..=8 => Ok(Self::ALL[value as usize]),
            mode => Err(CodecError::InvalidMode { mode }),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}.{:02} kbit/s)", self.index(), self.bitrate() / 1000, self.bitrate() % 1000 / 10)
    }
}

/// Mode the speech encoder actually used for a frame
///
/// Under DTX the encoder may replace the requested speech mode by a silence
/// descriptor frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodingMode {
    /// Regular speech frame
    Speech(Mode),
    /// Silence descriptor / discontinuous transmission
    Dtx,
}

impl CodingMode {
    /// Index used on the wire: 0..=8 for speech, 9 for DTX
    pub fn index(self) -> usize {
        match self {
            Self::Speech(mode) => mode.index(),
            Self::Dtx => 9,
        }
    }

    /// Parameter bits carried by a frame of this coding mode
    pub fn bits_per_frame(self) -> usize {
        NB_OF_BITS[self.index()]
    }
}

impl From<Mode> for CodingMode {
    fn from(mode: Mode) -> Self {
        Self::Speech(mode)
    }
}

/// Frame classification on the encoder side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxFrameType {
    /// Speech frame
    Speech = 0,
    /// First silence descriptor after speech
    SidFirst = 1,
    /// Silence descriptor update
    SidUpdate = 2,
    /// Nothing transmitted
    NoData = 3,
}

impl TxFrameType {
    /// Wire value
    pub fn value(self) -> u16 {
        self as u16
    }

    /// Parse a wire value
    pub fn from_value(value: u16) -> Result<Self> {
        match value {
            0 => Ok(Self::Speech),
            1 => Ok(Self::SidFirst),
            2 => Ok(Self::SidUpdate),
            3 => Ok(Self::NoData),
            value => Err(CodecError::InvalidFrameType { value }),
        }
    }
}

/// Frame classification as observed by the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RxFrameType {
    /// Speech received intact
    SpeechGood = 0,
    /// Speech with possible bit errors
    SpeechProbablyDegraded = 1,
    /// Speech frame lost in transport
    SpeechLost = 2,
    /// Speech frame received with errors
    SpeechBad = 3,
    /// First silence descriptor
    SidFirst = 4,
    /// Silence descriptor update
    SidUpdate = 5,
    /// Silence descriptor received with errors
    SidBad = 6,
    /// Nothing received
    NoData = 7,
}

impl RxFrameType {
    /// Wire value
    pub fn value(self) -> u16 {
        self as u16
    }

    /// Parse a wire value
    pub fn from_value(value: u16) -> Result<Self> {
        match value {
            0 => Ok(Self::SpeechGood),
            1 => Ok(Self::SpeechProbablyDegraded),
            2 => Ok(Self::SpeechLost),
            3 => Ok(Self::SpeechBad),
            4 => Ok(Self::SidFirst),
            5 => Ok(Self::SidUpdate),
            6 => Ok(Self::SidBad),
            7 => Ok(Self::NoData),
            value => Err(CodecError::InvalidFrameType { value }),
        }
    }

    /// Lost or empty frames: the decoder carries the previous mode forward and
    /// never treats them as homing frames.
    pub fn is_lost_or_no_data(self) -> bool {
        matches!(self, Self::SpeechLost | Self::NoData)
    }

    /// Frame types whose payload is a silence descriptor (or nothing)
    pub fn is_sid_or_no_data(self) -> bool {
        matches!(
            self,
            Self::SidFirst | Self::SidUpdate | Self::SidBad | Self::NoData
        )
    }

    /// Frame types that signal transmission errors
    pub fn is_bad(self) -> bool {
        matches!(self, Self::SpeechLost | Self::SpeechBad | Self::SidBad)
    }
}

impl From<TxFrameType> for RxFrameType {
    fn from(frame_type: TxFrameType) -> Self {
        match frame_type {
            TxFrameType::Speech => Self::SpeechGood,
            TxFrameType::SidFirst => Self::SidFirst,
            TxFrameType::SidUpdate => Self::SidUpdate,
            TxFrameType::NoData => Self::NoData,
        }
    }
}

impl fmt::Display for RxFrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SpeechGood => "SPEECH_GOOD",
            Self::SpeechProbablyDegraded => "SPEECH_PROBABLY_DEGRADED",
            Self::SpeechLost => "SPEECH_LOST",
            Self::SpeechBad => "SPEECH_BAD",
            Self::SidFirst => "SID_FIRST",
            Self::SidUpdate => "SID_UPDATE",
            Self::SidBad => "SID_BAD",
            Self::NoData => "NO_DATA",
        };
        f.write_str(name)
    }
}

/// On-disk bitstream layout, fixed for a whole session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BitstreamFormat {
    /// Three header words then one word per bit (`0xFF81` / `0x007F`)
    #[default]
    Default,
    /// ITU-T G.192 soft bits: sync word, bit count, soft bits
    Itu,
    /// RFC 3267 MIME/storage format
    Mime,
}

impl BitstreamFormat {
    /// Format name as accepted by [`FromStr`]
    pub fn name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Itu => "itu",
            Self::Mime => "mime",
        }
    }
}

impl FromStr for BitstreamFormat {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "itu" => Ok(Self::Itu),
            "mime" => Ok(Self::Mime),
            other => Err(CodecError::invalid_config(format!(
                "Unknown bitstream format '{other}' (expected default, itu or mime)"
            ))),
        }
    }
}

impl fmt::Display for BitstreamFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One frame of parameter bits as produced by the speech encoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFrame {
    /// Parameter bits, one entry per bit
    pub bits: Vec<bool>,
    /// Mode actually used (may be DTX when DTX is allowed)
    pub coding_mode: CodingMode,
}

impl EncodedFrame {
    /// Number of parameter bits in the frame
    pub fn bit_count(&self) -> usize {
        self.bits.len()
    }
}

/// Capability interface of the speech encoder
///
/// Implementations own their persistent state (LPC, pitch and quantizer
/// memories, gain-pitch clipping memory).
pub trait SpeechEncoder {
    /// Encode one frame of masked 16-bit PCM in `mode`
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot encode the frame
    fn encode(
        &mut self,
        mode: Mode,
        frame: &[i16; L_FRAME16K],
        allow_dtx: bool,
    ) -> Result<EncodedFrame>;

    /// Return every persistent memory to its initial value
    fn reset(&mut self);
}

/// Capability interface of the speech decoder
pub trait SpeechDecoder {
    /// Decode one frame of parameter bits into `output`, returning the
    /// number of samples produced
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot decode the frame
    fn decode(
        &mut self,
        mode: Mode,
        bits: &[bool],
        frame_type: RxFrameType,
        output: &mut [i16; L_FRAME16K],
    ) -> Result<usize>;

    /// Return every persistent memory to its initial value
    fn reset(&mut self);

    /// Parameter bits of the decoder homing frame for `mode`
    ///
    /// The table is part of the engine contract: it is the frame the
    /// matching encoder produces for the encoder homing pattern from reset
    /// state, and this crate carries no copy of its own. The session
    /// compares received frames against it. Returning an empty slice turns
    /// decoder homing detection off.
    fn homing_frame(&self, mode: Mode) -> &[bool];
}
