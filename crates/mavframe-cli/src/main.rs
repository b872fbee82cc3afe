//! mavframe-dump
//!
//! Scans a MAVLink capture (or stdin) and prints one line per frame: stream
//! offset, header fields, optional signature status and payload hex.

mod dump;

use std::{
    fs::File,
    io::{self, Read},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dump::{DumpOptions, dump, parse_key};

/// List MAVLink frames in a byte stream
#[derive(Parser, Debug)]
#[command(name = "mavframe-dump")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Capture file to read (stdin if omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Stop after this many frames
    #[arg(short, long)]
    limit: Option<u64>,

    /// Debug-level logging (overrides RUST_LOG)
    #[arg(short, long)]
    verbose: bool,

    /// 32-byte signing key as hex; signed frames are checked against it
    #[arg(short, long, value_name = "HEX")]
    key: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();

    let options = DumpOptions { limit: args.limit, key: args.key.as_deref().map(parse_key).transpose()? };

    let input: Box<dyn Read> = match &args.input {
        Some(path) => {
            Box::new(File::open(path).with_context(|| format!("opening {}", path.display()))?)
        },
        None => Box::new(io::stdin().lock()),
    };

    let summary = dump(input, &mut io::stdout().lock(), &options)?;
    info!(frames = summary.frames, skipped_bytes = summary.skipped_bytes, "done");

    Ok(())
}
