//! Session configuration
//!
//! Both directions pick one [`BitstreamFormat`] for the whole session. The
//! encoder additionally needs a mode source and the DTX switch.

use std::fmt;
use std::path::PathBuf;

use crate::error::{CodecError, Result};
use crate::types::{BitstreamFormat, Mode};

/// Where the encoder takes the requested mode of each frame from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeSelection {
    /// Same mode for every frame, checked to be within 0..=8
    Fixed(i32),
    /// Text file with one whitespace-separated mode per frame
    File(PathBuf),
}

impl Default for ModeSelection {
    fn default() -> Self {
        Self::Fixed(0)
    }
}

impl fmt::Display for ModeSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(mode) => write!(f, "fixed mode {mode}"),
            Self::File(path) => write!(f, "mode file {}", path.display()),
        }
    }
}

/// Encoder session configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Output bitstream format
    pub format: BitstreamFormat,
    /// Mode source
    pub mode: ModeSelection,
    /// Let the speech encoder switch to DTX during silence
    pub allow_dtx: bool,
}

impl EncoderConfig {
    /// Configuration with a fixed mode, Default format and DTX off
    pub fn new(mode: ModeSelection) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Set the output format
    pub fn with_format(mut self, format: BitstreamFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the mode source
    pub fn with_mode(mut self, mode: ModeSelection) -> Self {
        self.mode = mode;
        self
    }

    /// Enable or disable DTX
    pub fn with_dtx(mut self, allow_dtx: bool) -> Self {
        self.allow_dtx = allow_dtx;
        self
    }

    /// Check the configuration before any frame is processed
    ///
    /// # Errors
    ///
    /// [`CodecError::InvalidMode`] for a fixed mode outside 0..=8,
    /// [`CodecError::InvalidConfig`] for an empty mode file path.
    pub fn validate(&self) -> Result<()> {
        match &self.mode {
            ModeSelection::Fixed(mode) => Mode::try_from(*mode).map(|_| ()),
            ModeSelection::File(path) if path.as_os_str().is_empty() => {
                Err(CodecError::invalid_config("mode file path is empty"))
            }
            ModeSelection::File(_) => Ok(()),
        }
    }
}

/// Decoder session configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Input bitstream format
    pub format: BitstreamFormat,
}

impl DecoderConfig {
    /// Configuration for `format`
    pub fn new(format: BitstreamFormat) -> Self {
        Self { format }
    }

    /// Set the input format
    pub fn with_format(mut self, format: BitstreamFormat) -> Self {
        self.format = format;
        self
    }

    /// Check the configuration; every decoder configuration is valid today
    ///
    /// # Errors
    ///
    /// Every format is accepted.
    pub fn validate(&self) -> Result<()> {
        Ok(())
    }
}
