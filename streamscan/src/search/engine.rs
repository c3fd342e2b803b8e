use std::fs::File;
use std::io::{Cursor, Read};
use std::num::NonZeroUsize;
use tracing::{debug, info};

use super::dispatcher::{LaneConfig, ScanDispatcher};
use super::reporter::MatchReporter;
use super::stream::ChunkStreamController;
use crate::config::{ScanConfig, CHUNK_SIZE};
use crate::errors::{ScanError, ScanResult};
use crate::keyword::{Keyword, MAX_KEYWORD_LENGTH};
use crate::metrics::ScanMetrics;
use crate::results::ScanSummary;

/// Scans the configured source file, reporting every match as it is found.
///
/// The keyword is validated before the source is opened.
pub fn search<M>(config: &ScanConfig, reporter: &mut M) -> ScanResult<ScanSummary>
where
    M: MatchReporter + ?Sized,
{
    let keyword = config.keyword()?;

    info!(
        "Opening {} to search for {} byte keyword",
        config.source.display(),
        keyword.len()
    );
    let file = File::open(&config.source)
        .map_err(|e| ScanError::stream_open_failure(&config.source, e))?;

    scan_stream(file, keyword, config, reporter)
}

/// Scans an arbitrary reader using the tuning from `config`; `config.source` is
/// ignored
pub fn search_reader<R, M>(
    reader: R,
    config: &ScanConfig,
    reporter: &mut M,
) -> ScanResult<ScanSummary>
where
    R: Read,
    M: MatchReporter + ?Sized,
{
    let keyword = config.keyword()?;
    scan_stream(reader, keyword, config, reporter)
}

/// Returns every offset of `keyword` in an in-memory buffer
pub fn find_all(haystack: &[u8], keyword: &[u8]) -> ScanResult<Vec<u64>> {
    let keyword = Keyword::new(keyword, MAX_KEYWORD_LENGTH)?;
    let dispatcher = ScanDispatcher::new(LaneConfig::default())?;
    let chunk_size = NonZeroUsize::new(CHUNK_SIZE).unwrap_or(NonZeroUsize::MIN);

    let mut offsets: Vec<u64> = Vec::new();
    ChunkStreamController::new(Cursor::new(haystack), &dispatcher, keyword, chunk_size)
        .run(&mut offsets)?;
    Ok(offsets)
}

fn scan_stream<R, M>(
    reader: R,
    keyword: Keyword,
    config: &ScanConfig,
    reporter: &mut M,
) -> ScanResult<ScanSummary>
where
    R: Read,
    M: MatchReporter + ?Sized,
{
    let dispatcher = ScanDispatcher::new(config.lane_config())?;
    debug!(
        "Scanning with {} lanes, batch size {}, chunk size {}",
        dispatcher.lanes(),
        dispatcher.batch_size(),
        config.chunk_size
    );

    let metrics = ScanMetrics::new();
    let mut controller = ChunkStreamController::with_metrics(
        reader,
        &dispatcher,
        keyword,
        config.chunk_size,
        metrics.clone(),
    );
    let summary = controller.run(reporter)?;

    metrics.log_stats();
    info!(
        "Search complete. Found {} matches in {} bytes",
        summary.total_matches, summary.bytes_scanned
    );

    Ok(summary)
}
