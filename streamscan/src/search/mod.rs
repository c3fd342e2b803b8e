/// This module implements chunked, data-parallel keyword search over a byte stream.
///
/// # Pipeline
///
/// ```text
/// ChunkStreamController ──window──▶ ScanDispatcher ──fan-out──▶ compare() × N lanes
///          ▲                              │
///          │                         join/gather
///          └──── global offsets ◀────────┘──────────▶ MatchReporter
/// ```
///
/// 1. **Chunk Stream Controller** reads the input in bounded windows and keeps a
///    running cursor holding the global offset of each window's first byte.
/// 2. **Scan Dispatcher** hands every candidate offset of the window to a pool of
///    lanes in fixed-size batches and waits for all of them before returning.
/// 3. **Comparator** decides match/no-match for a single offset.
/// 4. **Reporter** receives global offsets in ascending order as they are found.
///
/// # Boundary Handling
///
/// A match may start in the last `keyword.len() - 1` bytes of one read and end in the
/// next. Those bytes are carried to the front of the next window, so every match lies
/// wholly inside exactly one window:
///
/// ```text
/// stream:   ... x x a b | a b y y ...        keyword = "abab"
/// window 1: [ ....... x x a b ]              "ab" can't complete here
/// window 2:           [ x a b a b y y ... ]  carried "xab" + new bytes
/// ```
///
/// A carried tail is shorter than the keyword, so a match can never fit inside it.
/// This is why nothing is ever reported twice.
///
/// # Concurrency
///
/// Windows are processed strictly one after another by a single controller. Inside
/// a window, lanes share only immutable data (window and keyword) and each writes its
/// own disjoint result slots, so the whole fan-out is lock-free.
pub mod comparator;
pub mod dispatcher;
pub mod engine;
pub mod reporter;
pub mod stream;

pub use comparator::compare;
pub use dispatcher::{LaneConfig, ScanDispatcher};
pub use engine::{find_all, search, search_reader};
pub use reporter::{FnReporter, MatchReporter, OrderedCollector, OutputFormat, WriterReporter};
pub use stream::{ChunkStreamController, StreamState};

use crate::errors::{ScanError, ScanResult};

/// Makes sure `buf` can hold `total` elements without reallocating during use.
/// Returns true when the buffer had to grow.
pub(crate) fn ensure_capacity<T>(buf: &mut Vec<T>, total: usize) -> ScanResult<bool> {
    if buf.capacity() >= total {
        return Ok(false);
    }
    buf.try_reserve_exact(total - buf.len()).map_err(|_| {
        ScanError::allocation_failure(total.saturating_mul(std::mem::size_of::<T>()))
    })?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_capacity_grows_once() {
        let mut buf: Vec<u8> = Vec::new();
        assert!(ensure_capacity(&mut buf, 128).unwrap());
        assert!(buf.capacity() >= 128);
        assert!(!ensure_capacity(&mut buf, 64).unwrap());
        assert!(!ensure_capacity(&mut buf, 128).unwrap());
    }

    #[test]
    fn test_ensure_capacity_reports_allocation_failure() {
        let mut buf: Vec<u64> = Vec::new();
        let err = ensure_capacity(&mut buf, usize::MAX / 2).unwrap_err();
        assert!(matches!(err, ScanError::AllocationFailure { .. }));
    }
}
