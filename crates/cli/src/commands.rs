//! Subcommand implementations over generic readers and writers

use std::io::{Read, Write};

use amrwb_codec_core::{BitstreamFormat, FrameDecoder, FrameEncoder, RxFrameType};
use anyhow::Result;
use tracing::{debug, info};

const FRAME_TYPES: [RxFrameType; 8] = [
    RxFrameType::SpeechGood,
    RxFrameType::SpeechProbablyDegraded,
    RxFrameType::SpeechLost,
    RxFrameType::SpeechBad,
    RxFrameType::SidFirst,
    RxFrameType::SidUpdate,
    RxFrameType::SidBad,
    RxFrameType::NoData,
];

/// Frame counts per received frame type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameSummary {
    /// Frames read
    pub frames: u64,
    counts: [u64; 8],
}

impl FrameSummary {
    fn record(&mut self, frame_type: RxFrameType) {
        self.frames += 1;
        self.counts[usize::from(frame_type.value())] += 1;
    }

    /// Frames of one type
    pub fn count(&self, frame_type: RxFrameType) -> u64 {
        self.counts[usize::from(frame_type.value())]
    }
}

/// List the frames of a bitstream, at most `limit` of them
pub fn inspect<R: Read, W: Write>(
    input: &mut R,
    format: BitstreamFormat,
    limit: Option<usize>,
    out: &mut W,
) -> Result<FrameSummary> {
    let mut decoder = FrameDecoder::new(format);
    let mut summary = FrameSummary::default();

    writeln!(out, "{:>6}  {:<24}  {:>4}  {:>4}", "frame", "type", "mode", "bits")?;
    while limit.is_none_or(|limit| summary.frames < limit as u64) {
        let Some(frame) = decoder.decode_frame(input)? else {
            break;
        };
        writeln!(
            out,
            "{:>6}  {:<24}  {:>4}  {:>4}",
            summary.frames,
            frame.frame_type.to_string(),
            frame.mode.index(),
            frame.bit_count()
        )?;
        summary.record(frame.frame_type);
    }

    writeln!(out, "{} frames", summary.frames)?;
    for frame_type in FRAME_TYPES {
        let count = summary.count(frame_type);
        if count > 0 {
            writeln!(out, "  {:<24} {count}", frame_type.to_string())?;
        }
    }
    Ok(summary)
}

/// Re-serialize every frame of `input` from one format into another
pub fn convert<R: Read, W: Write>(
    input: &mut R,
    from: BitstreamFormat,
    output: &mut W,
    to: BitstreamFormat,
) -> Result<u64> {
    info!(%from, %to, "Converting bitstream");
    let mut decoder = FrameDecoder::new(from);
    let mut encoder = FrameEncoder::new(to);

    decoder.read_stream_header(input)?;
    if let Some(header) = encoder.stream_header() {
        output.write_all(&header)?;
    }

    let mut frames = 0u64;
    while let Some(frame) = decoder.decode_frame(input)? {
        output.write_all(&encoder.encode_received(&frame)?)?;
        frames += 1;
        debug!(frame = frames, frame_type = %frame.frame_type, "Converted frame");
    }
    output.flush()?;
    Ok(frames)
}
