//! Resource Reader
//!
//! Selects up to `limit` filtered lines from either end of a file.
//!
//! Head reads stream forward one line at a time and stop at the limit-th
//! matching line. Tail reads walk the file backward in fixed-size chunks,
//! carrying the not-yet-terminated line at the front of what has been read so
//! far, so a line spanning two chunks is reassembled before it is filtered.
//! The backward walk stops as soon as `limit` matching lines are known or the
//! start of the file is reached, so memory stays at roughly one chunk plus the
//! selected lines regardless of file size.
//!
//! The reader keeps no state between calls. Each call opens its own handle,
//! which is dropped on every return path.

use crate::error::{Result, VisionError};
use crate::filter::LineFilter;
use crate::models::{ReadDirection, ReadRequest, ReadResult};
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::debug;

/// Default size of each backward read in tail mode (64KB)
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Largest accepted chunk size (16MB)
pub const MAX_CHUNK_SIZE: usize = 16 * 1024 * 1024;

const LINE_TERMINATOR: u8 = b'\n';

/// Reads filtered lines from the head or tail of a file
#[derive(Debug, Clone)]
pub struct ResourceReader {
    chunk_size: usize,
}

impl Default for ResourceReader {
    fn default() -> Self {
        ResourceReader::new(DEFAULT_CHUNK_SIZE)
    }
}

impl ResourceReader {
    /// Create a reader using `chunk_size` bytes per read
    ///
    /// The value is clamped to `1..=MAX_CHUNK_SIZE`. It only changes how much
    /// I/O a read performs, never which lines it returns.
    pub fn new(chunk_size: usize) -> Self {
        ResourceReader {
            chunk_size: chunk_size.clamp(1, MAX_CHUNK_SIZE),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Run a read to completion
    pub fn read(&self, request: &ReadRequest) -> Result<ReadResult> {
        let never = AtomicBool::new(false);
        self.read_with_cancel(request, &never)
    }

    /// Run a read that stops with `VisionError::Cancelled` once `cancel` is set
    ///
    /// The flag is checked before every line (head) or chunk (tail), so a
    /// caller-side timeout can abandon a long scan without waiting for it.
    ///
    /// # Errors
    /// * `InvalidLimit` - `limit` is negative
    /// * `InvalidFilter` - either pattern fails to compile
    /// * `ResourceNotFound` / `PermissionDenied` - the file cannot be opened
    /// * `IoError` - any failure while reading
    /// * `Cancelled` - the flag was set mid-read
    pub fn read_with_cancel(&self, request: &ReadRequest, cancel: &AtomicBool) -> Result<ReadResult> {
        let limit = validate_limit(request.limit)?;
        let filter = LineFilter::new(request.include.as_deref(), request.exclude.as_deref())?;
        let path = request.path.as_path();

        let (file, len) = open_resource(path)?;

        if limit == 0 {
            debug!("limit=0 for {}, skipping read", path.display());
            return Ok(ReadResult::default());
        }

        let started = Instant::now();
        let result = match request.direction {
            ReadDirection::Head => self.read_head(file, path, limit, &filter, cancel)?,
            ReadDirection::Tail => self.read_tail(file, len, path, limit, &filter, cancel)?,
        };

        debug!(
            "{} read of {} (filtered={}): {} lines, {} of {} bytes scanned in {:?}",
            request.direction,
            path.display(),
            !filter.is_pass_all(),
            result.len(),
            result.bytes_scanned,
            len,
            started.elapsed()
        );

        Ok(result)
    }

    fn read_head(
        &self,
        file: File,
        path: &Path,
        limit: usize,
        filter: &LineFilter,
        cancel: &AtomicBool,
    ) -> Result<ReadResult> {
        let mut reader = BufReader::with_capacity(self.chunk_size, file);
        let mut raw = Vec::new();
        let mut result = ReadResult::default();

        while result.lines.len() < limit {
            check_cancel(cancel, path)?;

            raw.clear();
            let n = reader
                .read_until(LINE_TERMINATOR, &mut raw)
                .map_err(|e| VisionError::from_io(path, e))?;
            if n == 0 {
                break;
            }
            result.bytes_scanned += n as u64;

            let line = decode_line(&raw);
            if filter.matches(&line) {
                result.lines.push(line.into_owned());
            }
        }

        Ok(result)
    }

    fn read_tail(
        &self,
        mut file: File,
        len: u64,
        path: &Path,
        limit: usize,
        filter: &LineFilter,
        cancel: &AtomicBool,
    ) -> Result<ReadResult> {
        // Newest first; reversed once the walk is done.
        let mut matched: Vec<String> = Vec::new();
        // Pieces of the line whose start has not been read yet, latest bytes
        // first. None of them holds a terminator, so they are never rescanned.
        let mut carry: Vec<Vec<u8>> = Vec::new();
        let mut chunk = vec![0u8; (self.chunk_size as u64).min(len) as usize];
        let mut pos = len;
        let mut chunks = 0usize;

        while pos > 0 && matched.len() < limit {
            check_cancel(cancel, path)?;

            let read_len = (self.chunk_size as u64).min(pos) as usize;
            pos -= read_len as u64;
            file.seek(SeekFrom::Start(pos))
                .map_err(|e| VisionError::from_io(path, e))?;
            file.read_exact(&mut chunk[..read_len])
                .map_err(|e| VisionError::from_io(path, e))?;

            let mut end = read_len;
            // A terminator as the very last byte ends the final line, it
            // does not start an empty one.
            if chunks == 0 && chunk[end - 1] == LINE_TERMINATOR {
                end -= 1;
            }
            chunks += 1;

            while matched.len() < limit {
                let Some(nl) = chunk[..end].iter().rposition(|&b| b == LINE_TERMINATOR) else {
                    break;
                };
                if carry.is_empty() {
                    keep_line(&chunk[nl + 1..end], filter, &mut matched);
                } else {
                    let line = join_carry(&chunk[nl + 1..end], &mut carry);
                    keep_line(&line, filter, &mut matched);
                }
                end = nl;
            }

            if matched.len() < limit && end > 0 {
                carry.push(chunk[..end].to_vec());
            }
        }

        // Start of file reached: what is left in the carry is the first line.
        if pos == 0 && chunks > 0 && matched.len() < limit {
            let line = join_carry(&[], &mut carry);
            keep_line(&line, filter, &mut matched);
        }

        debug!(
            "tail walk of {} finished after {} chunks at offset {}",
            path.display(),
            chunks,
            pos
        );

        matched.reverse();
        Ok(ReadResult {
            lines: matched,
            bytes_scanned: len - pos,
        })
    }
}

fn validate_limit(limit: i64) -> Result<usize> {
    usize::try_from(limit).map_err(|_| {
        VisionError::InvalidLimit(format!(
            "limit must be a non-negative integer, got {}",
            limit
        ))
    })
}

/// Open `path` for reading and return the handle with the file length
fn open_resource(path: &Path) -> Result<(File, u64)> {
    let file = File::open(path).map_err(|e| VisionError::from_io(path, e))?;
    let metadata = file.metadata().map_err(|e| VisionError::from_io(path, e))?;

    if !metadata.is_file() {
        return Err(VisionError::ResourceNotFound(format!(
            "{}: not a regular file",
            path.display()
        )));
    }

    Ok((file, metadata.len()))
}

/// Prepend `front` to the carried pieces, leaving the carry empty
fn join_carry(front: &[u8], carry: &mut Vec<Vec<u8>>) -> Vec<u8> {
    let total = front.len() + carry.iter().map(Vec::len).sum::<usize>();
    let mut line = Vec::with_capacity(total);
    line.extend_from_slice(front);
    for piece in carry.drain(..).rev() {
        line.extend_from_slice(&piece);
    }
    line
}

fn keep_line(raw: &[u8], filter: &LineFilter, matched: &mut Vec<String>) {
    let line = decode_line(raw);
    if filter.matches(&line) {
        matched.push(line.into_owned());
    }
}

fn check_cancel(cancel: &AtomicBool, path: &Path) -> Result<()> {
    if cancel.load(Ordering::Relaxed) {
        return Err(VisionError::Cancelled(path.display().to_string()));
    }
    Ok(())
}

/// Strip one trailing `\n` and then one `\r`, decoding lossily
fn decode_line(raw: &[u8]) -> Cow<'_, str> {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw)
}
