use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, trace};

use super::comparator::{candidate_count, compare};
use super::ensure_capacity;
use crate::config::DEFAULT_BATCH_SIZE;
use crate::errors::{ScanError, ScanResult};
use crate::keyword::Keyword;

/// Lane geometry for the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneConfig {
    /// Number of lanes running concurrently
    pub lanes: NonZeroUsize,
    /// Candidate offsets evaluated by one lane before it takes more work
    pub batch_size: NonZeroUsize,
}

impl Default for LaneConfig {
    fn default() -> Self {
        Self {
            lanes: NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN),
            batch_size: NonZeroUsize::new(DEFAULT_BATCH_SIZE).unwrap_or(NonZeroUsize::MIN),
        }
    }
}

/// Fans keyword comparisons for every candidate offset of a window out across a
/// dedicated pool of lanes.
///
/// Each lane reads the shared window and keyword and writes only its own batch of
/// result slots, so no locking is needed. The pool join is the barrier: a scan
/// returns only after every lane has finished.
pub struct ScanDispatcher {
    pool: ThreadPool,
    batch_size: usize,
}

impl std::fmt::Debug for ScanDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanDispatcher")
            .field("lanes", &self.lanes())
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl ScanDispatcher {
    /// Creates a dispatcher with its own lane pool
    pub fn new(config: LaneConfig) -> ScanResult<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.lanes.get())
            .thread_name(|i| format!("streamscan-lane-{}", i))
            .build()
            .map_err(|e| ScanError::accelerator_failure(e.to_string()))?;

        Ok(Self {
            pool,
            batch_size: config.batch_size.get(),
        })
    }

    /// Number of lanes in the pool
    pub fn lanes(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Scans a window, returning one flag per window offset.
    ///
    /// Entry `i` is true iff the keyword starts at offset `i`. Offsets where the
    /// keyword does not fit are never compared and are always false.
    pub fn scan(&self, window: &[u8], keyword: &Keyword) -> ScanResult<Vec<bool>> {
        let mut results = Vec::new();
        self.scan_into(window, keyword, &mut results)?;
        Ok(results)
    }

    /// Same as [`scan`](Self::scan), but fills a caller-owned buffer so repeated
    /// scans reuse one allocation. Returns whether the buffer had to grow.
    pub fn scan_into(
        &self,
        window: &[u8],
        keyword: &Keyword,
        results: &mut Vec<bool>,
    ) -> ScanResult<bool> {
        results.clear();
        let grew = ensure_capacity(results, window.len())?;
        results.resize(window.len(), false);

        let candidates = candidate_count(window.len(), keyword.len());
        if candidates == 0 {
            trace!(
                "Window of {} bytes is shorter than the {}-byte keyword",
                window.len(),
                keyword.len()
            );
            return Ok(grew);
        }

        let batch = self.batch_size;
        debug!(
            "Launching {} batches of {} offsets across {} lanes",
            candidates.div_ceil(batch),
            batch,
            self.lanes()
        );

        let needle = keyword.as_bytes();
        let slots = &mut results[..candidates];
        self.run_lanes(move || {
            slots
                .par_chunks_mut(batch)
                .enumerate()
                .for_each(|(batch_index, batch_slots)| {
                    let base = batch_index * batch;
                    for (i, slot) in batch_slots.iter_mut().enumerate() {
                        *slot = compare(window, base + i, needle);
                    }
                });
        })?;

        Ok(grew)
    }

    /// Scans a window and returns only the matching offsets, ascending.
    ///
    /// Each batch collects its hits locally; the batches are concatenated in
    /// offset order after all lanes join.
    pub fn find_offsets(&self, window: &[u8], keyword: &Keyword) -> ScanResult<Vec<usize>> {
        let candidates = candidate_count(window.len(), keyword.len());
        if candidates == 0 {
            return Ok(Vec::new());
        }

        let batch = self.batch_size;
        let needle = keyword.as_bytes();
        self.run_lanes(|| {
            (0..candidates.div_ceil(batch))
                .into_par_iter()
                .flat_map_iter(|batch_index| {
                    let start = batch_index * batch;
                    let end = (start + batch).min(candidates);
                    (start..end).filter(move |&offset| compare(window, offset, needle))
                })
                .collect()
        })
    }

    /// Runs `op` inside the lane pool, turning a lane panic into an error
    fn run_lanes<T, F>(&self, op: F) -> ScanResult<T>
    where
        F: FnOnce() -> T + Send,
        T: Send,
    {
        panic::catch_unwind(AssertUnwindSafe(|| self.pool.install(op))).map_err(|payload| {
            let msg = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "lane panicked".to_string());
            ScanError::accelerator_failure(msg)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatcher(lanes: usize, batch_size: usize) -> ScanDispatcher {
        ScanDispatcher::new(LaneConfig {
            lanes: NonZeroUsize::new(lanes).unwrap(),
            batch_size: NonZeroUsize::new(batch_size).unwrap(),
        })
        .unwrap()
    }

    fn keyword(bytes: &[u8]) -> Keyword {
        Keyword::new(bytes, 255).unwrap()
    }

    fn naive(window: &[u8], needle: &[u8]) -> Vec<bool> {
        (0..window.len())
            .map(|i| i + needle.len() <= window.len() && &window[i..i + needle.len()] == needle)
            .collect()
    }

    #[test]
    fn test_scan_matches_naive_reference() {
        let window = b"ababcababab";
        let kw = keyword(b"abab");
        let d = dispatcher(4, 2);

        let results = d.scan(window, &kw).unwrap();
        assert_eq!(results.len(), window.len());
        assert_eq!(results, naive(window, b"abab"));
    }

    #[test]
    fn test_scan_geometry_does_not_change_results() {
        let window: Vec<u8> = (0..5000u32).map(|i| b"abcab"[(i * 7 % 5) as usize]).collect();
        let kw = keyword(b"cab");
        let expected = naive(&window, b"cab");

        for (lanes, batch) in [(1, 1), (1, 256), (3, 7), (8, 64), (2, 10_000)] {
            let results = dispatcher(lanes, batch).scan(&window, &kw).unwrap();
            assert_eq!(results, expected, "lanes={} batch={}", lanes, batch);
        }
    }

    #[test]
    fn test_keyword_longer_than_window() {
        let d = dispatcher(2, 4);
        let results = d.scan(b"abc", &keyword(b"abcd")).unwrap();
        assert_eq!(results, vec![false; 3]);
        assert!(d.find_offsets(b"abc", &keyword(b"abcd")).unwrap().is_empty());
    }

    #[test]
    fn test_empty_window() {
        let d = dispatcher(2, 4);
        assert!(d.scan(b"", &keyword(b"a")).unwrap().is_empty());
    }

    #[test]
    fn test_tail_offsets_are_never_true() {
        let d = dispatcher(2, 3);
        let results = d.scan(b"aaaaa", &keyword(b"aaa")).unwrap();
        assert_eq!(results, vec![true, true, true, false, false]);
    }

    #[test]
    fn test_scan_into_reuses_buffer() {
        let d = dispatcher(2, 16);
        let kw = keyword(b"xy");
        let mut buf = Vec::new();

        assert!(d.scan_into(b"xyxyxy", &kw, &mut buf).unwrap());
        assert_eq!(buf, vec![true, false, true, false, true, false]);

        // Smaller window fits in the existing allocation
        assert!(!d.scan_into(b"axy", &kw, &mut buf).unwrap());
        assert_eq!(buf, vec![false, true, false]);
    }

    #[test]
    fn test_find_offsets_agrees_with_dense_scan() {
        let window: Vec<u8> = b"the cat sat on the mat with the hat".repeat(40);
        let kw = keyword(b"the");
        let d = dispatcher(4, 5);

        let dense = d.scan(&window, &kw).unwrap();
        let expected: Vec<usize> = dense
            .iter()
            .enumerate()
            .filter_map(|(i, &hit)| hit.then_some(i))
            .collect();
        assert_eq!(d.find_offsets(&window, &kw).unwrap(), expected);
    }

    #[test]
    fn test_lane_panic_is_reported() {
        let d = dispatcher(2, 4);
        let result: ScanResult<()> = d.run_lanes(|| panic!("lane exploded"));
        match result {
            Err(ScanError::AcceleratorFailure(msg)) => assert!(msg.contains("lane exploded")),
            other => panic!("expected accelerator failure, got {:?}", other),
        }
    }

    #[test]
    fn test_lane_count() {
        assert_eq!(dispatcher(3, 4).lanes(), 3);
    }
}
