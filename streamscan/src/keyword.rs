use crate::errors::{ScanError, ScanResult};

/// Largest number of usable keyword bytes
pub const MAX_KEYWORD_LENGTH: usize = 255;

/// The byte sequence being searched for.
///
/// A keyword is never empty and never longer than the limit it was built with.
/// It stays fixed for a whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    bytes: Vec<u8>,
}

impl Keyword {
    /// Creates a keyword, rejecting empty input and input longer than `max_len`
    pub fn new(bytes: impl Into<Vec<u8>>, max_len: usize) -> ScanResult<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(ScanError::invalid_config("keyword must not be empty"));
        }
        if bytes.len() > max_len {
            return Err(ScanError::invalid_config(format!(
                "keyword is {} bytes, maximum is {}",
                bytes.len(),
                max_len
            )));
        }
        Ok(Self { bytes })
    }

    /// Creates a keyword from a line of terminal input, dropping one trailing
    /// `\n` or `\r\n` first
    pub fn from_input_line(line: &str, max_len: usize) -> ScanResult<Self> {
        Self::new(trim_line_terminator(line).as_bytes(), max_len)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Number of trailing window bytes carried into the next window
    pub fn overlap(&self) -> usize {
        self.bytes.len() - 1
    }
}

/// Strips a single trailing line terminator
pub fn trim_line_terminator(line: &str) -> &str {
    line.strip_suffix("\r\n")
        .or_else(|| line.strip_suffix('\n'))
        .unwrap_or(line)
}
