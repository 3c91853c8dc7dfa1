//! Streaming operations for JSONL data.
//!
//! Streams read one line at a time so large collections never need to be
//! buffered as text.

use crate::error::Result;
use crate::reader::JsonlReader;
use crate::warning::{Warning, WarningCollector};
use futures::stream::{self, Stream};
use serde::de::DeserializeOwned;
use tokio::io::AsyncRead;

impl<R: AsyncRead + Unpin> JsonlReader<R> {
    /// Converts the reader into a stream of parsed records.
    ///
    /// The stream ends after yielding the first error.
    pub fn stream<T: DeserializeOwned>(self) -> impl Stream<Item = Result<T>> {
        stream::unfold(Some(self), |state| async move {
            let mut reader = state?;
            match reader.read_line::<T>().await {
                Ok(Some(record)) => Some((Ok(record), Some(reader))),
                Ok(None) => None,
                Err(e) => Some((Err(e), None)),
            }
        })
    }

    /// Converts the reader into a stream that skips malformed lines.
    ///
    /// Returns the stream together with a [`WarningCollector`] that receives a
    /// [`Warning`] for every skipped line. A read failure ends the stream and
    /// is recorded as [`WarningKind::ReadFailed`](crate::WarningKind::ReadFailed).
    pub fn stream_resilient<T: DeserializeOwned>(
        self,
    ) -> (impl Stream<Item = T>, WarningCollector) {
        let warnings = WarningCollector::new();
        let collector = warnings.clone();

        let stream = stream::unfold(Some(self), move |state| {
            let collector = collector.clone();
            async move {
                let mut reader = state?;
                loop {
                    match reader.next_raw_line().await {
                        Ok(Some(line)) => {
                            let trimmed = line.trim_ascii();
                            if trimmed.is_empty() {
                                continue;
                            }
                            match serde_json::from_slice::<T>(trimmed) {
                                Ok(record) => return Some((record, Some(reader))),
                                Err(e) => {
                                    tracing::warn!(
                                        line_number = reader.line_number(),
                                        error = %e,
                                        "Skipping malformed JSONL line"
                                    );
                                    collector.add(Warning::malformed(reader.line_number(), e));
                                }
                            }
                        }
                        Ok(None) => return None,
                        Err(e) => {
                            collector.add(Warning::read_failed(reader.line_number() + 1, e));
                            return None;
                        }
                    }
                }
            }
        });

        (stream, warnings)
    }
}
