/// Returns true if `keyword` occurs in `window` starting exactly at `offset`.
///
/// The caller guarantees `offset + keyword.len() <= window.len()`. The function
/// touches no shared state, so any number of lanes may call it concurrently.
#[inline]
pub fn compare(window: &[u8], offset: usize, keyword: &[u8]) -> bool {
    debug_assert!(offset + keyword.len() <= window.len());
    window[offset..offset + keyword.len()] == *keyword
}

/// Number of offsets in a window of `window_len` bytes where a keyword of
/// `keyword_len` bytes fits completely
#[inline]
pub fn candidate_count(window_len: usize, keyword_len: usize) -> usize {
    (window_len + 1).saturating_sub(keyword_len)
}
