use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use clap::Parser;
use log::error;

use crate::copy_engine;
use crate::open::{self, OutputFlags};
use crate::progress::{Progress, StatusLevel};
use crate::units::UnitSize;

#[derive(clap::Parser)]
#[command(
    name = "blockpipe",
    version,
    about = "Copies a byte stream between files or pipes, reading and writing in independently-sized units.",
    after_help = "All options may also be given dd-style as key=value, e.g.:\n    blockpipe if=disk.img of=/dev/sdb bs=1M count=64 status=progress"
)]
pub struct CliArgs {
    /// The input file to read from. Reads from stdin when not given.
    #[arg(long = "if", value_name = "FILE")]
    pub input: Option<PathBuf>,
    /// The output file to write to. Writes to stdout when not given.
    #[arg(long = "of", value_name = "FILE")]
    pub output: Option<PathBuf>,
    /// Input unit size - the number of bytes per read call.
    /// Accepts size suffixes: c, w, b, K, M, G, T, kB, MB, GB, TB.
    #[arg(long, default_value = "512")]
    pub ibs: UnitSize,
    /// Output unit size - the number of bytes per write call. Accepts size suffixes.
    #[arg(long, default_value = "512")]
    pub obs: UnitSize,
    /// Sets both the input and output unit sizes, overriding ibs and obs.
    #[arg(long)]
    pub bs: Option<UnitSize>,
    /// Number of ibs-sized units to skip over on the input before copying.
    #[arg(long, default_value_t = 0)]
    pub skip: u64,
    /// Number of obs-sized units to seek into the output before writing.
    #[arg(long, default_value_t = 0)]
    pub seek: u64,
    /// Copy at most this many ibs-sized units.
    #[arg(long)]
    pub count: Option<u64>,
    /// Comma separated list of conversions (none|notrunc).
    #[arg(long, default_value = "none")]
    pub conv: String,
    /// Comma separated list of output open flags (none|sync|dsync).
    #[arg(long, default_value = "none")]
    pub oflag: String,
    /// When to print transfer statistics to stderr.
    #[arg(long, value_enum, default_value_t = StatusLevel::Xfer)]
    pub status: StatusLevel,
}

/// Rewrites dd-style `key=value` arguments into the long-flag form clap understands
/// ("if=disk.img" becomes "--if=disk.img"). Everything in dd syntax follows key=value,
/// so any argument that looks like one is rewritten rather than recreating all of
/// clap's parsing for the `=` form; arguments already in flag form are left alone.
pub fn convert_dd_args<I: IntoIterator<Item = String>>(args: I) -> Vec<String> {
    args.into_iter()
        .map(|a| match a.split_once('=') {
            Some((key, _)) if !key.is_empty() && key.chars().all(|c| c.is_ascii_alphabetic()) => {
                format!("--{}", a)
            }
            _ => a,
        })
        .collect()
}

/// Translates the `conv=` and `oflag=` lists into the output's open-mode bits.
pub fn parse_output_flags(conv: &str, oflag: &str) -> Result<OutputFlags, String> {
    let mut flags = OutputFlags::default();
    if conv != "none" {
        for c in conv.split(',') {
            match c {
                "notrunc" => flags.truncate = false,
                _ => return Err(format!("Unknown conversion '{}' (supported: none, notrunc)", c)),
            }
        }
    }
    if oflag != "none" {
        for f in oflag.split(',') {
            match f {
                "sync" => flags.sync = true,
                "dsync" => flags.dsync = true,
                _ => return Err(format!("Unknown output flag '{}' (supported: none, sync, dsync)", f)),
            }
        }
    }
    Ok(flags)
}

pub fn frontend_main() -> ExitCode {
    let args = CliArgs::parse_from(convert_dd_args(std::env::args()));

    // bs, when given, sets both unit sizes (IEEE Std 1003.1-2013)
    let (ibs, obs) = match args.bs {
        Some(bs) => (bs, bs),
        None => (args.ibs, args.obs),
    };
    if ibs.bytes == 0 || obs.bytes == 0 {
        error!("Unit sizes must not be zero");
        return ExitCode::from(2);
    }
    let (input_unit, output_unit) = match (usize::try_from(ibs.bytes), usize::try_from(obs.bytes)) {
        (Ok(i), Ok(o)) => (i, o),
        _ => {
            error!("Unit size is too large for this platform");
            return ExitCode::from(2);
        }
    };

    let flags = match parse_output_flags(&args.conv, &args.oflag) {
        Ok(f) => f,
        Err(e) => {
            error!("{e}");
            return ExitCode::from(2);
        }
    };

    let mut source = match open::open_source(args.input.as_deref(), ibs.bytes, args.skip, args.count) {
        Ok(s) => s,
        Err(e) => {
            error!("{e}");
            return ExitCode::from(10);
        }
    };
    let mut sink = match open::open_sink(args.output.as_deref(), obs.bytes, args.seek, flags) {
        Ok(s) => s,
        Err(e) => {
            error!("{e}");
            return ExitCode::from(11);
        }
    };

    // The progress reporter watches the same counter the copy engine advances.
    let bytes_written = Arc::new(AtomicU64::new(0));
    let progress = Progress::begin(args.status, bytes_written.clone());
    let result = copy_engine::copy(&mut source, &mut sink, input_unit, output_unit, &bytes_written);
    progress.end();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Error copying: {e}");
            ExitCode::from(12)
        }
    }
}
