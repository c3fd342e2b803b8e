use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Tracks working-memory usage and throughput of a scan
#[derive(Debug, Clone)]
pub struct ScanMetrics {
    // Buffer metrics
    buffer_allocations: Arc<AtomicU64>,
    buffer_reuses: Arc<AtomicU64>,
    peak_window_bytes: Arc<AtomicU64>,

    // Throughput metrics
    windows_scanned: Arc<AtomicU64>,
    bytes_read: Arc<AtomicU64>,
    offsets_compared: Arc<AtomicU64>,
    matches_found: Arc<AtomicU64>,
}

impl ScanMetrics {
    /// Creates a new ScanMetrics instance
    pub fn new() -> Self {
        Self {
            buffer_allocations: Arc::new(AtomicU64::new(0)),
            buffer_reuses: Arc::new(AtomicU64::new(0)),
            peak_window_bytes: Arc::new(AtomicU64::new(0)),
            windows_scanned: Arc::new(AtomicU64::new(0)),
            bytes_read: Arc::new(AtomicU64::new(0)),
            offsets_compared: Arc::new(AtomicU64::new(0)),
            matches_found: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Records whether a working buffer had to grow or was reused as-is
    pub fn record_buffer(&self, grew: bool, bytes: u64) {
        if grew {
            self.buffer_allocations.fetch_add(1, Ordering::Relaxed);
            debug!("Working buffer grown to {} bytes", bytes);
        } else {
            self.buffer_reuses.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Records a scanned window
    pub fn record_window(&self, window_len: u64, bytes_read: u64, compared: u64, matches: u64) {
        self.windows_scanned.fetch_add(1, Ordering::Relaxed);
        self.bytes_read.fetch_add(bytes_read, Ordering::Relaxed);
        self.offsets_compared.fetch_add(compared, Ordering::Relaxed);
        self.matches_found.fetch_add(matches, Ordering::Relaxed);
        self.peak_window_bytes
            .fetch_max(window_len, Ordering::Relaxed);
    }

    /// Gets current statistics
    pub fn get_stats(&self) -> ScanStats {
        ScanStats {
            buffer_allocations: self.buffer_allocations.load(Ordering::Relaxed),
            buffer_reuses: self.buffer_reuses.load(Ordering::Relaxed),
            peak_window_bytes: self.peak_window_bytes.load(Ordering::Relaxed),
            windows_scanned: self.windows_scanned.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            offsets_compared: self.offsets_compared.load(Ordering::Relaxed),
            matches_found: self.matches_found.load(Ordering::Relaxed),
        }
    }

    /// Logs current statistics
    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Scan stats:\n\
             Windows scanned: {}\n\
             Bytes read: {}\n\
             Offsets compared: {}\n\
             Matches found: {}\n\
             Peak window: {} bytes\n\
             Buffer allocations/reuses: {}/{}",
            stats.windows_scanned,
            stats.bytes_read,
            stats.offsets_compared,
            stats.matches_found,
            stats.peak_window_bytes,
            stats.buffer_allocations,
            stats.buffer_reuses
        );
    }
}

impl Default for ScanMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of scan statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanStats {
    pub buffer_allocations: u64,
    pub buffer_reuses: u64,
    pub peak_window_bytes: u64,
    pub windows_scanned: u64,
    pub bytes_read: u64,
    pub offsets_compared: u64,
    pub matches_found: u64,
}
