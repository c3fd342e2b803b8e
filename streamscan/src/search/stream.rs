use std::io::{ErrorKind, Read};
use std::num::NonZeroUsize;
use std::time::Instant;
use tracing::{debug, trace};

use super::comparator::candidate_count;
use super::dispatcher::ScanDispatcher;
use super::ensure_capacity;
use super::reporter::MatchReporter;
use crate::errors::{ScanError, ScanResult};
use crate::keyword::Keyword;
use crate::metrics::ScanMetrics;
use crate::results::{ScanSummary, WindowSummary};

/// Lifecycle of a [`ChunkStreamController`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// More input may follow
    Streaming,
    /// The stream is exhausted; no further reads happen
    Done,
}

/// Reads a stream in bounded windows and scans each one for the keyword.
///
/// The last `keyword.len() - 1` bytes of every window are carried to the front of
/// the next one, so a match split across two reads still lands wholly inside a
/// single window. The controller owns the cursor and the rolling buffers; one
/// window is in flight at a time.
pub struct ChunkStreamController<'d, R> {
    reader: R,
    dispatcher: &'d ScanDispatcher,
    keyword: Keyword,
    chunk_size: usize,
    /// Rolling window: carried tail followed by newly read bytes
    window: Vec<u8>,
    /// Per-offset results of the most recent scan
    results: Vec<bool>,
    /// Carried bytes currently at the front of `window`
    carried: usize,
    /// Global offset of `window[0]`
    cursor: u64,
    windows: u64,
    state: StreamState,
    metrics: ScanMetrics,
}

impl<'d, R: Read> ChunkStreamController<'d, R> {
    pub fn new(
        reader: R,
        dispatcher: &'d ScanDispatcher,
        keyword: Keyword,
        chunk_size: NonZeroUsize,
    ) -> Self {
        Self::with_metrics(reader, dispatcher, keyword, chunk_size, ScanMetrics::new())
    }

    pub fn with_metrics(
        reader: R,
        dispatcher: &'d ScanDispatcher,
        keyword: Keyword,
        chunk_size: NonZeroUsize,
        metrics: ScanMetrics,
    ) -> Self {
        // Nothing has been carried before the first read
        Self {
            reader,
            dispatcher,
            keyword,
            chunk_size: chunk_size.get(),
            window: Vec::new(),
            results: Vec::new(),
            carried: 0,
            cursor: 0,
            windows: 0,
            state: StreamState::Streaming,
            metrics,
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Global offset of the first byte of the next window
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn metrics(&self) -> &ScanMetrics {
        &self.metrics
    }

    /// Reads, scans and reports one window.
    ///
    /// Returns `None` once the stream is exhausted. Matches are handed to
    /// `reporter` in ascending global order before this returns.
    pub fn next_window<M>(&mut self, reporter: &mut M) -> ScanResult<Option<WindowSummary>>
    where
        M: MatchReporter + ?Sized,
    {
        if self.state == StreamState::Done {
            return Ok(None);
        }

        let capacity = self
            .keyword
            .overlap()
            .checked_add(self.chunk_size)
            .ok_or_else(|| ScanError::allocation_failure(usize::MAX))?;

        let window_capacity = self.window.capacity();
        let bytes_read = self.fill()?;
        if bytes_read == 0 {
            debug!(
                "End of stream after {} windows at offset {}",
                self.windows,
                self.cursor + self.carried as u64
            );
            self.state = StreamState::Done;
            return Ok(None);
        }

        // A full chunk means more may follow; size both buffers for a whole
        // window so later iterations reuse them. Otherwise size to the data.
        let target = if bytes_read == self.chunk_size {
            capacity
        } else {
            self.window.len()
        };
        ensure_capacity(&mut self.window, target)?;
        let grew_window = self.window.capacity() > window_capacity;
        let grew_results = ensure_capacity(&mut self.results, target)?;
        self.metrics.record_buffer(grew_window, target as u64);
        self.metrics.record_buffer(grew_results, target as u64);

        let window_len = self.carried + bytes_read;
        trace!(
            "Read {} bytes into window {} ({} carried)",
            bytes_read,
            self.windows,
            self.carried
        );

        let window = &self.window[..window_len];
        self.dispatcher
            .scan_into(window, &self.keyword, &mut self.results)?;

        let mut matches = 0u64;
        for (offset, _) in self.results.iter().enumerate().filter(|(_, hit)| **hit) {
            reporter.report(self.cursor + offset as u64)?;
            matches += 1;
        }

        let summary = WindowSummary {
            index: self.windows,
            global_start: self.cursor,
            bytes_read,
            window_len,
            matches,
        };
        self.metrics.record_window(
            window_len as u64,
            bytes_read as u64,
            candidate_count(window_len, self.keyword.len()) as u64,
            matches,
        );

        // Carry the tail so the next window starts with it
        let next_carry = self.keyword.overlap().min(window_len);
        self.window
            .copy_within(window_len - next_carry..window_len, 0);
        self.cursor += (window_len - next_carry) as u64;
        self.carried = next_carry;
        self.windows += 1;

        Ok(Some(summary))
    }

    /// Processes windows until the stream is exhausted
    pub fn run<M>(&mut self, reporter: &mut M) -> ScanResult<ScanSummary>
    where
        M: MatchReporter + ?Sized,
    {
        let started = Instant::now();
        let mut summary = ScanSummary::new();

        while let Some(window) = self.next_window(reporter)? {
            debug!(
                "Window {} at offset {}: {} bytes, {} matches",
                window.index, window.global_start, window.window_len, window.matches
            );
            summary.add_window(&window);
        }

        summary.elapsed = started.elapsed();
        Ok(summary)
    }

    /// Appends up to `chunk_size` new bytes after the carried tail. The window
    /// only grows by what is actually read.
    fn fill(&mut self) -> ScanResult<usize> {
        let chunk_size = self.chunk_size;
        self.window.truncate(self.carried);
        (&mut self.reader)
            .take(chunk_size as u64)
            .read_to_end(&mut self.window)
            .map_err(|e| match e.kind() {
                ErrorKind::OutOfMemory => ScanError::allocation_failure(chunk_size),
                _ => ScanError::Io(e),
            })
    }
}
