//! # AMR-WB Codec Core: transport and control layer
//!
//! This library frames AMR-WB speech parameters for storage and drives a
//! speech engine one 20 ms frame at a time. The speech analysis and
//! synthesis themselves are supplied by the caller through the
//! [`SpeechEncoder`] and [`SpeechDecoder`] traits.
//!
//! ## Features
//!
//! - **Frame serializer**: Default (word per bit), ITU-T G.192 soft-bit and
//!   RFC 3267 MIME/storage bitstreams, with DTX frame type scheduling
//! - **Control loops**: encoder and decoder sessions with homing frame
//!   handling, LSB masking and mode control files
//! - **Gain-pitch clipping**: the long-term prediction gain guard shared by
//!   encoder engines
//! - **Basic operators**: saturating 16/32-bit fixed-point arithmetic
//!
//! ## Usage
//!
//! ```rust
//! use amrwb_codec_core::bitstream::FrameDecoder;
//! use amrwb_codec_core::{BitstreamFormat, RxFrameType};
//!
//! // One ITU record: good sync, 0 bits
//! let record = [0x21u8, 0x6B, 0x00, 0x00];
//! let mut decoder = FrameDecoder::new(BitstreamFormat::Itu);
//! let frame = decoder.decode_frame(&mut &record[..])?.unwrap();
//! assert_eq!(frame.frame_type, RxFrameType::NoData);
//! # Ok::<(), amrwb_codec_core::CodecError>(())
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod config;
pub mod error;
pub mod gp_clip;
pub mod homing;
pub mod session;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use bitstream::{Frame, FrameDecoder, FrameEncoder};
pub use config::{DecoderConfig, EncoderConfig, ModeSelection};
pub use error::{CodecError, ErrorCategory, Result};
pub use gp_clip::GpClipMemory;
pub use session::{DecoderSession, EncoderSession, SessionStats};
pub use types::{
    BitstreamFormat, CodingMode, EncodedFrame, Mode, RxFrameType, SpeechDecoder, SpeechEncoder,
    TxFrameType, L_FRAME16K,
};

/// Version information for the codec library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Supported bitstream formats
pub const SUPPORTED_FORMATS: &[BitstreamFormat] = &[
    BitstreamFormat::Default,
    BitstreamFormat::Itu,
    BitstreamFormat::Mime,
];

/// Initialize the codec library
///
/// Installs a default `tracing` subscriber unless the application already
/// set one. Safe to call multiple times.
///
/// # Errors
///
/// Currently never fails.
pub fn init() -> Result<()> {
    let _ = tracing_subscriber::fmt::try_init();

    tracing::info!("AMR-WB codec core v{} initialized", VERSION);
    tracing::info!("Supported formats: {:?}", SUPPORTED_FORMATS);

    Ok(())
}

/// Get library information
pub fn info() -> LibraryInfo {
    LibraryInfo {
        version: VERSION,
        supported_formats: SUPPORTED_FORMATS.to_vec(),
        modes: Mode::ALL.to_vec(),
    }
}

/// Library information structure
#[derive(Debug, Clone)]
pub struct LibraryInfo {
    /// Library version
    pub version: &'static str,
    /// Bitstream formats the serializer reads and writes
    pub supported_formats: Vec<BitstreamFormat>,
    /// Speech modes
    pub modes: Vec<Mode>,
}
