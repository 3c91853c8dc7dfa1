//! JSONL reading operations.
//!
//! This module provides async functionality for reading JSONL files line-by-line
//! with efficient buffering and line number tracking for error reporting.

use crate::error::{Error, Result};
use crate::warning::Warning;
use futures::stream::StreamExt;
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Async reader for JSONL (JSON Lines) data.
///
/// `JsonlReader` wraps an async reader and provides buffered reading of JSONL
/// formatted data. It tracks line numbers to provide useful context in error
/// messages when parsing fails.
///
/// Blank and whitespace-only lines are skipped but still counted, so the
/// reported line numbers always match the file.
///
/// # Examples
///
/// ```no_run
/// use orgtree_jsonl::JsonlReader;
/// use tokio::fs::File;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let file = File::open("managers.jsonl").await?;
/// let mut reader = JsonlReader::new(file);
/// while let Some(record) = reader.read_line::<serde_json::Value>().await? {
///     println!("{record}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct JsonlReader<R> {
    /// Buffered reader wrapping the underlying async reader.
    reader: BufReader<R>,
    /// Current line number (1-based counting, 0 before any lines are read) for error reporting.
    line_number: usize,
}

impl<R: AsyncRead + Unpin> JsonlReader<R> {
    /// Creates a new `JsonlReader` wrapping the given async reader.
    ///
    /// Line numbering uses 1-based indexing: the counter starts at 0 and increments
    /// after each line is read, so the first line read is numbered 1.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line_number: 0,
        }
    }

    /// Creates a new `JsonlReader` with a custom buffer capacity.
    #[must_use]
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        Self {
            reader: BufReader::with_capacity(capacity, reader),
            line_number: 0,
        }
    }

    /// Returns the current line number.
    ///
    /// Returns 0 before any lines have been read. After reading, returns the
    /// 1-based line number of the last line read.
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Reads the next raw line, including blank ones, as bytes.
    ///
    /// Bytes are not checked for UTF-8 here; decoding does that per line,
    /// so one bad byte sequence never stops the read.
    ///
    /// Returns `Ok(None)` at end of input.
    pub(crate) async fn next_raw_line(&mut self) -> Result<Option<Vec<u8>>> {
        let mut buf = Vec::new();
        let read = self.reader.read_until(b'\n', &mut buf).await?;
        if read == 0 {
            return Ok(None);
        }
        self.line_number += 1;
        Ok(Some(buf))
    }

    /// Reads and deserializes the next non-blank line.
    ///
    /// Returns `Ok(None)` at end of input.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] carrying the line number if the line is not
    /// valid UTF-8 JSON for `T`, or [`Error::Io`] if the underlying read fails.
    pub async fn read_line<T: DeserializeOwned>(&mut self) -> Result<Option<T>> {
        while let Some(line) = self.next_raw_line().await? {
            let trimmed = line.trim_ascii();
            if trimmed.is_empty() {
                continue;
            }
            return serde_json::from_slice(trimmed)
                .map(Some)
                .map_err(|source| Error::Parse {
                    line: self.line_number,
                    source,
                });
        }
        Ok(None)
    }

    /// Consumes the reader, returning the underlying buffered reader.
    #[must_use]
    pub fn into_inner(self) -> BufReader<R> {
        self.reader
    }
}

/// Reads every record of a JSONL file, failing on the first malformed line.
///
/// Use this when dropping a record would be worse than failing, e.g. before
/// rewriting the file.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read, or if any
/// non-blank line fails to parse as `T`.
pub async fn read_jsonl<T, P>(path: P) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref()).await?;
    let mut reader = JsonlReader::new(file);
    let mut records = Vec::new();
    while let Some(record) = reader.read_line().await? {
        records.push(record);
    }
    Ok(records)
}

/// Reads every parseable record of a JSONL file, collecting warnings for the rest.
///
/// Malformed lines are skipped and reported as [`Warning`]s.
///
/// # Errors
///
/// Returns an error only if the file cannot be opened.
pub async fn read_jsonl_resilient<T, P>(path: P) -> Result<(Vec<T>, Vec<Warning>)>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref()).await?;
    let (stream, warnings) = JsonlReader::new(file).stream_resilient::<T>();
    let records: Vec<T> = stream.collect().await;
    let warnings = warnings.into_warnings();
    if !warnings.is_empty() {
        tracing::debug!(
            path = %path.as_ref().display(),
            count = warnings.len(),
            "Skipped malformed JSONL lines"
        );
    }
    Ok((records, warnings))
}
