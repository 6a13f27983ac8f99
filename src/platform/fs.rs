// LogcatView - platform/fs.rs
//
// Reading log files from disk.
//
// Small files are read whole with retries on transient errors; files above
// the configured threshold are memory-mapped. Either way the bytes are
// decoded lossily, since device logs regularly carry stray non-UTF-8 bytes.

use crate::util::constants::{MAX_READ_RETRIES, READ_RETRY_DELAYS_MS};
use std::io;
use std::path::Path;
use std::time::Duration;

/// Read a text file into lines, choosing the read strategy by size.
pub fn read_log_lines(path: &Path, large_file_threshold: u64) -> io::Result<Vec<String>> {
    let size = std::fs::metadata(path)?.len();
    let content = if size > large_file_threshold {
        tracing::debug!(file = %path.display(), size, "Memory-mapping large file");
        read_large_file(path)?
    } else {
        read_file_lossy(path)?
    };

    Ok(content.lines().map(str::to_string).collect())
}

/// Read the full content of a file as a string, retrying transient errors.
///
/// For files with invalid UTF-8, uses lossy conversion.
pub fn read_file_lossy(path: &Path) -> io::Result<String> {
    let bytes = read_with_retry(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn read_large_file(path: &Path) -> io::Result<String> {
    let file = std::fs::File::open(path)?;
    // SAFETY: the map is only read, and only for the duration of this call.
    // A log file truncated by another process while mapped could fault; the
    // viewer works on captured dumps that are no longer being written.
    let mmap = unsafe { memmap2::Mmap::map(&file)? };
    Ok(String::from_utf8_lossy(&mmap).into_owned())
}

fn read_with_retry(path: &Path) -> io::Result<Vec<u8>> {
    let mut last_err: Option<io::Error> = None;

    for attempt in 0..MAX_READ_RETRIES {
        match std::fs::read(path) {
            Ok(bytes) => return Ok(bytes),
            Err(e) if is_transient_error(&e) => {
                tracing::debug!(
                    file = %path.display(),
                    attempt = attempt + 1,
                    error = %e,
                    "Transient I/O error, retrying"
                );
                std::thread::sleep(Duration::from_millis(READ_RETRY_DELAYS_MS[attempt as usize]));
                last_err = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_err.unwrap_or_else(|| io::Error::other("Unknown read error")))
}

/// Returns true for transient I/O errors that are worth retrying.
pub fn is_transient_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted | io::ErrorKind::TimedOut
    )
}
