use std::io::Write;

use crate::errors::ScanResult;

/// Receives the global offset of every match as soon as it is found.
///
/// Offsets arrive in ascending order, once each. The controller guarantees this,
/// so implementations don't need to sort or deduplicate.
pub trait MatchReporter {
    fn report(&mut self, offset: u64) -> ScanResult<()>;
}

impl MatchReporter for Vec<u64> {
    fn report(&mut self, offset: u64) -> ScanResult<()> {
        self.push(offset);
        Ok(())
    }
}

impl<R: MatchReporter + ?Sized> MatchReporter for &mut R {
    fn report(&mut self, offset: u64) -> ScanResult<()> {
        (**self).report(offset)
    }
}

/// Adapts a closure into a reporter
pub struct FnReporter<F>(pub F);

impl<F: FnMut(u64)> MatchReporter for FnReporter<F> {
    fn report(&mut self, offset: u64) -> ScanResult<()> {
        (self.0)(offset);
        Ok(())
    }
}

/// Collects offsets and records whether they ever failed to strictly increase
#[derive(Debug, Default, Clone)]
pub struct OrderedCollector {
    offsets: Vec<u64>,
    violations: usize,
}

impl OrderedCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }

    /// Number of offsets that were not greater than their predecessor
    pub fn violations(&self) -> usize {
        self.violations
    }

    pub fn is_strictly_increasing(&self) -> bool {
        self.violations == 0
    }
}

impl MatchReporter for OrderedCollector {
    fn report(&mut self, offset: u64) -> ScanResult<()> {
        if self.offsets.last().is_some_and(|&last| offset <= last) {
            self.violations += 1;
        }
        self.offsets.push(offset);
        Ok(())
    }
}

/// How a [`WriterReporter`] renders each offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `Keyword found at position: N`
    #[default]
    Sentence,
    /// Bare offset, one per line
    OffsetsOnly,
}

/// Streams offsets to a writer, one line per match
#[derive(Debug)]
pub struct WriterReporter<W: Write> {
    writer: W,
    format: OutputFormat,
    count: u64,
}

impl<W: Write> WriterReporter<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self {
            writer,
            format,
            count: 0,
        }
    }

    /// Matches written so far
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> MatchReporter for WriterReporter<W> {
    fn report(&mut self, offset: u64) -> ScanResult<()> {
        match self.format {
            OutputFormat::Sentence => writeln!(self.writer, "Keyword found at position: {}", offset)?,
            OutputFormat::OffsetsOnly => writeln!(self.writer, "{}", offset)?,
        }
        self.count += 1;
        Ok(())
    }
}
