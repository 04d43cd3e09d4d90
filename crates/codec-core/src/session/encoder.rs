//! Encoder control loop
//!
//! Per frame: homing test on the raw samples, LSB masking, mode selection,
//! speech encoding, serialization, and an engine reset after a homing frame.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use bytes::Bytes;
use tracing::{debug, info, trace, warn};

use super::SessionStats;
use crate::bitstream::FrameEncoder;
use crate::config::{EncoderConfig, ModeSelection};
use crate::error::{CodecError, Result};
use crate::homing::encoder_homing_frame_test;
use crate::types::{BitstreamFormat, CodingMode, Mode, SpeechEncoder, L_FRAME16K};
use crate::utils::pcm::{mask_lsbs, read_frame};

/// Source of the requested mode for each frame
#[derive(Debug, Clone)]
pub struct ModeSchedule {
    tokens: Option<std::vec::IntoIter<String>>,
    current: Mode,
    exhausted: bool,
}

impl ModeSchedule {
    /// Same mode for every frame
    pub fn fixed(mode: Mode) -> Self {
        Self {
            tokens: None,
            current: mode,
            exhausted: false,
        }
    }

    /// Modes from whitespace-separated text, one per frame
    pub fn from_text(text: &str) -> Self {
        let tokens: Vec<String> = text.split_whitespace().map(str::to_owned).collect();
        Self {
            tokens: Some(tokens.into_iter()),
            current: Mode::Mode0,
            exhausted: false,
        }
    }

    /// Load a mode file
    ///
    /// # Errors
    ///
    /// [`CodecError::ResourceUnavailable`] if the file cannot be read.
    pub fn open(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| CodecError::resource_unavailable(path, e))?;
        Ok(Self::from_text(&text))
    }

    /// Build the schedule a configuration asks for
    ///
    /// # Errors
    ///
    /// [`CodecError::InvalidMode`] for an out-of-range fixed mode, or the
    /// errors of [`ModeSchedule::open`].
    pub fn from_selection(selection: &ModeSelection) -> Result<Self> {
        match selection {
            ModeSelection::Fixed(mode) => Ok(Self::fixed(Mode::try_from(*mode)?)),
            ModeSelection::File(path) => Self::open(path),
        }
    }

    /// True once a mode file ran out of values
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Mode for the next frame.
    ///
    /// When a mode file runs out, the last mode read from it is used for the
    /// rest of the session.
    ///
    /// # Errors
    ///
    /// [`CodecError::InvalidMode`] for a value outside 0..=8 and
    /// [`CodecError::InvalidConfig`] for a token that is not an integer.
    pub fn next_mode(&mut self) -> Result<Mode> {
        let Some(tokens) = self.tokens.as_mut() else {
            return Ok(self.current);
        };
        match tokens.next() {
            Some(token) => {
                let value: i32 = token.parse()?;
                self.current = Mode::try_from(value)?;
            }
            None if !self.exhausted => {
                warn!(
                    mode = self.current.index(),
                    "End of mode control file reached, using last mode for the remaining frames"
                );
                self.exhausted = true;
            }
            None => {}
        }
        Ok(self.current)
    }
}

/// Encoder control loop around a speech engine
#[derive(Debug)]
pub struct EncoderSession<E> {
    engine: E,
    serializer: FrameEncoder,
    schedule: ModeSchedule,
    allow_dtx: bool,
    stats: SessionStats,
}

impl<E: SpeechEncoder> EncoderSession<E> {
    /// Create a session from a configuration; a mode file is read here
    ///
    /// # Errors
    ///
    /// Configuration errors and an unreadable mode file.
    pub fn new(engine: E, config: &EncoderConfig) -> Result<Self> {
        config.validate()?;
        let schedule = ModeSchedule::from_selection(&config.mode)?;
        Ok(Self::with_schedule(engine, config.format, schedule, config.allow_dtx))
    }

    /// Create a session with an explicit mode schedule
    pub fn with_schedule(
        engine: E,
        format: BitstreamFormat,
        schedule: ModeSchedule,
        allow_dtx: bool,
    ) -> Self {
        Self {
            engine,
            serializer: FrameEncoder::new(format),
            schedule,
            allow_dtx,
            stats: SessionStats::default(),
        }
    }

    /// The speech engine
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Consume the session, returning the engine
    pub fn into_engine(self) -> E {
        self.engine
    }

    /// Counters so far
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Encode one frame of raw samples and return its wire bytes
    ///
    /// # Errors
    ///
    /// Invalid modes from the schedule, engine failures and engine output
    /// with a wrong bit count.
    pub fn encode_frame(&mut self, samples: &[i16; L_FRAME16K]) -> Result<Bytes> {
        let homing = encoder_homing_frame_test(samples);

        let mut frame = *samples;
        mask_lsbs(&mut frame);

        let mode = self.schedule.next_mode()?;
        let encoded = self.engine.encode(mode, &frame, self.allow_dtx)?;
        let bytes = self
            .serializer
            .encode_frame(&encoded.bits, encoded.coding_mode, mode)?;

        self.stats.frames += 1;
        if encoded.coding_mode == CodingMode::Dtx {
            self.stats.dtx_frames += 1;
        }
        trace!(
            frame = self.stats.frames,
            mode = mode.index(),
            coding_mode = encoded.coding_mode.index(),
            "Encoded frame"
        );

        if homing {
            debug!(frame = self.stats.frames, "Encoder homing frame, resetting encoder");
            self.engine.reset();
            self.stats.homing_resets += 1;
        }
        Ok(bytes)
    }

    /// Encode PCM from `pcm` until a short read, writing the bitstream to
    /// `out`. A MIME stream gets its magic even if no frame follows.
    ///
    /// # Errors
    ///
    /// I/O errors and the errors of [`encode_frame`](Self::encode_frame).
    pub fn run<R: Read + ?Sized, W: Write + ?Sized>(
        &mut self,
        pcm: &mut R,
        out: &mut W,
    ) -> Result<SessionStats> {
        info!(
            format = %self.serializer.format(),
            dtx = self.allow_dtx,
            "Encoding started"
        );
        if let Some(header) = self.serializer.stream_header() {
            out.write_all(&header)?;
        }

        let mut samples = [0i16; L_FRAME16K];
        while read_frame(pcm, &mut samples)? {
            let bytes = self.encode_frame(&samples)?;
            out.write_all(&bytes)?;
        }
        out.flush()?;

        info!(stats = %self.stats, "Encoding finished");
        Ok(self.stats)
    }
}

/// Encode the PCM file `input` into the bitstream file `output`
///
/// # Errors
///
/// [`CodecError::ResourceUnavailable`] naming the path if a file cannot be
/// opened, otherwise the errors of [`EncoderSession::run`].
pub fn encode_file<E: SpeechEncoder>(
    engine: E,
    config: &EncoderConfig,
    input: &Path,
    output: &Path,
) -> Result<SessionStats> {
    let mut session = EncoderSession::new(engine, config)?;

    let pcm = File::open(input).map_err(|e| CodecError::resource_unavailable(input, e))?;
    let out = File::create(output).map_err(|e| CodecError::resource_unavailable(output, e))?;
    info!(input = %input.display(), output = %output.display(), mode = %config.mode, "Encoding file");

    session.run(&mut BufReader::new(pcm), &mut BufWriter::new(out))
}
