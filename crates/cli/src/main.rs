//! `amrwb-tool`: inspect and convert AMR-WB bitstream files

mod commands;
mod logging;

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::PathBuf;

use amrwb_codec_core::BitstreamFormat;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::Level;

use crate::logging::{parse_log_level, setup_logging, LoggingConfig};

/// Inspect and convert AMR-WB bitstream files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (RUST_LOG takes precedence)
    #[arg(long, global = true, default_value = "warn", env = "AMRWB_LOG_LEVEL")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print frame type, mode and bit count of every frame
    Inspect {
        /// Bitstream file
        file: PathBuf,

        /// Bitstream format (default, itu or mime)
        #[arg(short, long, default_value = "default")]
        format: BitstreamFormat,

        /// Stop after this many frames
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Rewrite a bitstream file in another format
    Convert {
        /// Input bitstream file
        input: PathBuf,

        /// Output bitstream file
        output: PathBuf,

        /// Input format
        #[arg(long)]
        from: BitstreamFormat,

        /// Output format
        #[arg(long)]
        to: BitstreamFormat,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = parse_log_level(&cli.log_level)?;
    let mut logging = LoggingConfig::new(level);
    if level == Level::TRACE {
        logging = logging.with_file_info().with_spans();
    }
    setup_logging(&logging)?;

    match cli.command {
        Command::Inspect {
            file,
            format,
            limit,
        } => {
            let input = File::open(&file)
                .with_context(|| format!("Cannot open bitstream file {}", file.display()))?;
            let stdout = io::stdout();
            commands::inspect(
                &mut BufReader::new(input),
                format,
                limit,
                &mut stdout.lock(),
            )
            .with_context(|| format!("Failed to inspect {}", file.display()))?;
        }
        Command::Convert {
            input,
            output,
            from,
            to,
        } => {
            let reader = File::open(&input)
                .with_context(|| format!("Cannot open bitstream file {}", input.display()))?;
            let writer = File::create(&output)
                .with_context(|| format!("Cannot create output file {}", output.display()))?;
            let frames = commands::convert(
                &mut BufReader::new(reader),
                from,
                &mut BufWriter::new(writer),
                to,
            )
            .with_context(|| format!("Failed to convert {}", input.display()))?;
            println!(
                "Converted {frames} frames from {from} to {to}: {}",
                output.display()
            );
        }
    }
    Ok(())
}
