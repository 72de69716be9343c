use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::section_reader::StreamSectionReader;

/// Open-mode bits for the output, translated from `conv=`/`oflag=` by the frontend.
/// The copy engine never interprets these - they are applied once, here, at open time.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OutputFlags {
    /// Truncate an existing output file. On by default; cleared by `conv=notrunc`.
    pub truncate: bool,
    /// Open with O_SYNC (`oflag=sync`).
    pub sync: bool,
    /// Open with O_DSYNC (`oflag=dsync`).
    pub dsync: bool,
}

impl Default for OutputFlags {
    fn default() -> Self {
        OutputFlags { truncate: true, sync: false, dsync: false }
    }
}

/// Opens the input and applies `skip=`/`count=`, returning a reader that yields
/// exactly the wanted section of it.
///
/// A real file gets a real seek and a `take` limit. Stdin can't seek, so it gets the
/// emulating wrapper that discards its way to the start offset instead.
pub fn open_source(
    name: Option<&Path>,
    input_unit: u64,
    skip_units: u64,
    count_units: Option<u64>,
) -> Result<Box<dyn Read + Send>, String> {
    let skip_bytes = skip_units
        .checked_mul(input_unit)
        .ok_or_else(|| format!("skip of {} units of {} bytes is too large", skip_units, input_unit))?;
    let max_bytes = match count_units {
        Some(c) => c
            .checked_mul(input_unit)
            .ok_or_else(|| format!("count of {} units of {} bytes is too large", c, input_unit))?,
        None => u64::MAX,
    };

    match name {
        Some(path) => {
            let mut file = File::open(path)
                .map_err(|e| format!("Error opening input file '{}': {}", path.display(), e))?;
            if skip_bytes > 0 {
                file.seek(SeekFrom::Start(skip_bytes))
                    .map_err(|e| format!("Error seeking input file '{}': {}", path.display(), e))?;
            }
            Ok(Box::new(file.take(max_bytes)))
        }
        None => Ok(Box::new(StreamSectionReader::new(io::stdin(), skip_bytes, max_bytes))),
    }
}

/// Opens the output with the given flags and applies `seek=`.
///
/// Seeking past the end of a file leaves a zero-filled (or sparse) gap, which is the
/// expected `seek=` behaviour. Stdout can't seek at all, so a non-zero seek on it is
/// rejected up front rather than left to fail mid-copy.
pub fn open_sink(
    name: Option<&Path>,
    output_unit: u64,
    seek_units: u64,
    flags: OutputFlags,
) -> Result<Box<dyn Write>, String> {
    let seek_bytes = seek_units
        .checked_mul(output_unit)
        .ok_or_else(|| format!("seek of {} units of {} bytes is too large", seek_units, output_unit))?;

    match name {
        Some(path) => {
            let mut options = OpenOptions::new();
            options.write(true).create(true).truncate(flags.truncate);
            apply_sync_flags(&mut options, flags);
            let mut file = options
                .open(path)
                .map_err(|e| format!("Error opening output file '{}': {}", path.display(), e))?;
            if seek_bytes > 0 {
                file.seek(SeekFrom::Start(seek_bytes))
                    .map_err(|e| format!("Error seeking output file '{}': {}", path.display(), e))?;
            }
            Ok(Box::new(file))
        }
        None => {
            if seek_bytes > 0 {
                return Err("Cannot seek on standard output".to_string());
            }
            Ok(Box::new(io::stdout().lock()))
        }
    }
}

#[cfg(unix)]
fn apply_sync_flags(options: &mut OpenOptions, flags: OutputFlags) {
    use std::os::unix::fs::OpenOptionsExt;
    let mut custom = 0;
    if flags.sync {
        custom |= libc::O_SYNC;
    }
    if flags.dsync {
        custom |= libc::O_DSYNC;
    }
    if custom != 0 {
        options.custom_flags(custom);
    }
}

#[cfg(not(unix))]
fn apply_sync_flags(_options: &mut OpenOptions, flags: OutputFlags) {
    if flags.sync || flags.dsync {
        log::warn!("oflag sync/dsync is not supported on this platform and will be ignored");
    }
}
