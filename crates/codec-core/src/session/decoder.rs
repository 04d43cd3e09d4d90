//! Decoder control loop
//!
//! Per frame: mode carry-over for lost and empty frames, homing detection
//! (partial while already homed, full otherwise), speech decoding or the
//! homing output pattern, LSB masking, and an engine reset after a homing
//! frame.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::{debug, info, trace};

use super::SessionStats;
use crate::bitstream::{Frame, FrameDecoder};
use crate::config::DecoderConfig;
use crate::error::{CodecError, Result};
use crate::homing::{decoder_homing_frame_test, decoder_homing_frame_test_first, EHF_MASK};
use crate::types::{Mode, SpeechDecoder, L_FRAME16K};
use crate::utils::pcm::{mask_lsbs, write_frame};

/// Decoder control loop around a speech engine
#[derive(Debug)]
pub struct DecoderSession<D> {
    engine: D,
    deserializer: FrameDecoder,
    reset_flag_old: bool,
    mode_old: Mode,
    stats: SessionStats,
}

impl<D: SpeechDecoder> DecoderSession<D> {
    /// Create a session
    ///
    /// # Errors
    ///
    /// Configuration errors.
    pub fn new(engine: D, config: &DecoderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            engine,
            deserializer: FrameDecoder::new(config.format),
            // the decoder starts out homed
            reset_flag_old: true,
            mode_old: Mode::Mode0,
            stats: SessionStats::default(),
        })
    }

    /// The speech engine
    pub fn engine(&self) -> &D {
        &self.engine
    }

    /// Consume the session, returning the engine
    pub fn into_engine(self) -> D {
        self.engine
    }

    /// Counters so far
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Whether the previous frame was a homing frame
    pub fn is_homed(&self) -> bool {
        self.reset_flag_old
    }

    /// Mode of the last frame that was neither lost nor empty
    pub fn mode_old(&self) -> Mode {
        self.mode_old
    }

    /// Decode one frame into `output`
    ///
    /// # Errors
    ///
    /// Engine failures.
    pub fn decode_frame(&mut self, frame: &Frame, output: &mut [i16; L_FRAME16K]) -> Result<()> {
        let frame_type = frame.frame_type;
        let lost_or_empty = frame_type.is_lost_or_no_data();
        let mut reset_flag = false;

        let mode = if lost_or_empty {
            self.stats.lost_frames += 1;
            self.mode_old
        } else {
            self.mode_old = frame.mode;
            if self.reset_flag_old {
                reset_flag = decoder_homing_frame_test_first(
                    &frame.bits,
                    frame.mode,
                    self.engine.homing_frame(frame.mode),
                );
            }
            frame.mode
        };

        if reset_flag && self.reset_flag_old {
            output.fill(EHF_MASK);
        } else {
            let samples = self.engine.decode(mode, &frame.bits, frame_type, output)?;
            trace!(samples, "Speech decoder output");
        }
        mask_lsbs(output);

        if !self.reset_flag_old && !lost_or_empty {
            reset_flag =
                decoder_homing_frame_test(&frame.bits, mode, self.engine.homing_frame(mode));
        }

        self.stats.frames += 1;
        trace!(
            frame = self.stats.frames,
            frame_type = %frame_type,
            mode = mode.index(),
            "Decoded frame"
        );

        if reset_flag {
            debug!(frame = self.stats.frames, "Decoder homing frame, resetting decoder");
            self.engine.reset();
            self.stats.homing_resets += 1;
        }
        self.reset_flag_old = reset_flag;
        Ok(())
    }

    /// Decode the bitstream `input` until it ends, writing PCM to `pcm`
    ///
    /// # Errors
    ///
    /// Fatal framing errors (bad MIME magic, undefined frame types and
    /// modes), I/O and engine errors.
    pub fn run<R: Read + ?Sized, W: Write + ?Sized>(
        &mut self,
        input: &mut R,
        pcm: &mut W,
    ) -> Result<SessionStats> {
        info!(format = %self.deserializer.format(), "Decoding started");
        self.deserializer.read_stream_header(input)?;

        let mut output = [0i16; L_FRAME16K];
        while let Some(frame) = self.deserializer.decode_frame(input)? {
            self.decode_frame(&frame, &mut output)?;
            write_frame(pcm, &output)?;
        }
        pcm.flush()?;

        info!(stats = %self.stats, "Decoding finished");
        Ok(self.stats)
    }
}

/// Decode the bitstream file `input` into the PCM file `output`
///
/// # Errors
///
/// [`CodecError::ResourceUnavailable`] naming the path if a file cannot be
/// opened, otherwise the errors of [`DecoderSession::run`].
pub fn decode_file<D: SpeechDecoder>(
    engine: D,
    config: &DecoderConfig,
    input: &Path,
    output: &Path,
) -> Result<SessionStats> {
    let mut session = DecoderSession::new(engine, config)?;

    let bitstream = File::open(input).map_err(|e| CodecError::resource_unavailable(input, e))?;
    let pcm = File::create(output).map_err(|e| CodecError::resource_unavailable(output, e))?;
    info!(input = %input.display(), output = %output.display(), "Decoding file");

    session.run(&mut BufReader::new(bitstream), &mut BufWriter::new(pcm))
}
