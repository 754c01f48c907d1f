//! Input sources for access logs.
//!
//! Rotated 389 DS logs are often kept compressed (`access.20250610-211806.gz`),
//! so the decoder is picked from the file extension:
//!
//! - `.gz` - gzip
//! - `.zst` - Zstandard
//! - `-` - standard input, read as plain text
//! - anything else - plain text
//!
//! ```no_run
//! use ds_access_tools::utils::reader::open_file;
//! use std::io::{BufRead, BufReader};
//!
//! let reader = BufReader::new(open_file("access.gz").unwrap());
//! for line in reader.lines() {
//!     println!("{}", line.unwrap());
//! }
//! ```

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Path that selects standard input
pub const STDIN_PATH: &str = "-";

/// Returns true when `path` refers to standard input
pub fn is_stdin(path: impl AsRef<Path>) -> bool {
    path.as_ref().as_os_str() == STDIN_PATH
}

/// Open an access log, decompressing by extension.
pub fn open_file(path: impl AsRef<Path>) -> Result<Box<dyn Read + Send>> {
    let path = path.as_ref();
    if is_stdin(path) {
        return Ok(Box::new(std::io::stdin()));
    }

    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;

    match path.extension().and_then(|e| e.to_str()).unwrap_or("") {
        // logrotate may append several gzip members to one file
        "gz" => Ok(Box::new(MultiGzDecoder::new(file))),
        "zst" => {
            let decoder = zstd::Decoder::new(file).with_context(|| {
                format!("Failed to create zstd decoder for: {}", path.display())
            })?;
            Ok(Box::new(decoder))
        }
        _ => Ok(Box::new(file)),
    }
}

/// On-disk size of `path`, for progress tracking. `None` for stdin or
/// unreadable metadata.
pub fn file_size(path: impl AsRef<Path>) -> Option<u64> {
    let path = path.as_ref();
    if is_stdin(path) {
        return None;
    }
    std::fs::metadata(path).ok().map(|m| m.len())
}
