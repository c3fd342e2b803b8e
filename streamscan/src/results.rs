/// This module implements the summary types produced by a scan.
///
/// Individual matches are never stored here: they are handed to a
/// [`MatchReporter`](crate::search::MatchReporter) the moment their window has been
/// scanned. What remains afterwards is bookkeeping about the windows themselves.
use std::fmt;
use std::time::Duration;

/// Describes one processed window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSummary {
    /// Zero-based position of the window in the stream
    pub index: u64,
    /// Global offset of the window's first byte
    pub global_start: u64,
    /// Bytes newly read from the stream for this window
    pub bytes_read: usize,
    /// Total window length, carried tail included
    pub window_len: usize,
    /// Matches reported from this window
    pub matches: u64,
}

impl WindowSummary {
    /// Length of the carried tail at the front of the window
    pub fn carried(&self) -> usize {
        self.window_len - self.bytes_read
    }
}

/// Totals for a complete scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Windows processed
    pub windows: u64,
    /// Distinct stream bytes read (carried bytes are not counted twice)
    pub bytes_scanned: u64,
    /// Total number of matches reported
    pub total_matches: u64,
    /// Wall time spent scanning
    pub elapsed: Duration,
}

impl ScanSummary {
    /// Creates a new empty summary
    pub fn new() -> Self {
        Default::default()
    }

    /// Folds a processed window into the totals
    pub fn add_window(&mut self, window: &WindowSummary) {
        self.windows += 1;
        self.bytes_scanned += window.bytes_read as u64;
        self.total_matches += window.matches;
    }
}

impl fmt::Display for ScanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Found {} matches in {} bytes ({} windows, {:.3}s)",
            self.total_matches,
            self.bytes_scanned,
            self.windows,
            self.elapsed.as_secs_f64()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(index: u64, bytes_read: usize, window_len: usize, matches: u64) -> WindowSummary {
        WindowSummary {
            index,
            global_start: 0,
            bytes_read,
            window_len,
            matches,
        }
    }

    #[test]
    fn test_summary_new() {
        let summary = ScanSummary::new();
        assert_eq!(summary.windows, 0);
        assert_eq!(summary.bytes_scanned, 0);
        assert_eq!(summary.total_matches, 0);
    }

    #[test]
    fn test_summary_add_window() {
        let mut summary = ScanSummary::new();
        summary.add_window(&window(0, 100, 100, 2));
        summary.add_window(&window(1, 40, 43, 1));

        assert_eq!(summary.windows, 2);
        assert_eq!(summary.bytes_scanned, 140); // Carried bytes not double counted
        assert_eq!(summary.total_matches, 3);
    }

    #[test]
    fn test_window_carried() {
        assert_eq!(window(0, 100, 100, 0).carried(), 0);
        assert_eq!(window(1, 40, 43, 0).carried(), 3);
    }

    #[test]
    fn test_summary_display() {
        let mut summary = ScanSummary::new();
        summary.add_window(&window(0, 11, 11, 2));
        assert!(summary
            .to_string()
            .starts_with("Found 2 matches in 11 bytes (1 windows"));
    }
}
