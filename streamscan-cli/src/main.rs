use clap::Parser;
use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use streamscan::{
    keyword::trim_line_terminator,
    search::{OutputFormat, WriterReporter},
    search, search_reader, ScanConfig, ScanError, ScanOverrides, ScanSummary,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

type Result<T> = std::result::Result<T, ScanError>;

/// Source name that selects standard input
const STDIN_SOURCE: &str = "-";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Keyword to search for (prompted for when omitted)
    #[arg(short = 'k', long)]
    keyword: Option<String>,

    /// File to scan, or `-` for standard input (prompted for when omitted)
    source: Option<PathBuf>,

    /// Bytes of new input per window
    #[arg(long)]
    chunk_size: Option<NonZeroUsize>,

    /// Number of parallel lanes
    #[arg(short = 'j', long)]
    lanes: Option<NonZeroUsize>,

    /// Candidate offsets per lane batch
    #[arg(long)]
    batch_size: Option<NonZeroUsize>,

    /// Longest accepted keyword in bytes
    #[arg(long)]
    max_keyword_length: Option<usize>,

    /// Print bare offsets, one per line
    #[arg(short = 'o', long)]
    offsets_only: bool,

    /// Print a summary after the scan
    #[arg(short, long)]
    stats: bool,

    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // An explicit empty keyword is an error, not a request to be prompted
    if cli.keyword.as_deref() == Some("") {
        return Err(ScanError::invalid_config("keyword must not be empty"));
    }

    let overrides = ScanOverrides {
        keyword: cli.keyword,
        source: cli.source,
        chunk_size: cli.chunk_size,
        lanes: cli.lanes,
        batch_size: cli.batch_size,
        max_keyword_length: cli.max_keyword_length,
        log_level: cli.log_level,
    };
    let mut config = ScanConfig::load_from(cli.config.as_deref())?.merge_with_cli(overrides);

    init_logging(&config.log_level);
    debug!("Loaded configuration: {:?}", config);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    if config.keyword.is_empty() {
        config.keyword = prompt(&mut input, "Enter the keyword to search: ")?;
    }
    // Reject a bad keyword before asking for or touching the source
    config.keyword()?;
    if config.source.as_os_str().is_empty() {
        config.source = PathBuf::from(prompt(&mut input, "Enter the filename to search in: ")?);
    }
    if config.source.as_os_str().is_empty() {
        return Err(ScanError::invalid_config("no source given"));
    }
    info!(
        "Scanning {} with {} lanes, {} byte chunks, batches of {}",
        config.source.display(),
        config.lanes,
        config.chunk_size,
        config.batch_size
    );

    let format = if cli.offsets_only {
        OutputFormat::OffsetsOnly
    } else {
        OutputFormat::Sentence
    };
    let stdout = io::stdout();
    let mut reporter = WriterReporter::new(stdout.lock(), format);

    let summary = if config.source == Path::new(STDIN_SOURCE) {
        search_reader(&mut input, &config, &mut reporter)?
    } else {
        search(&config, &mut reporter)?
    };

    let mut out = reporter.into_inner();
    out.flush()?;
    if cli.stats {
        print_summary(&mut out, &summary)?;
    }
    Ok(())
}

/// Asks for a line on stderr and reads it from `input`, without its line terminator
fn prompt(input: &mut impl BufRead, message: &str) -> Result<String> {
    eprint!("{}", message);
    io::stderr().flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(trim_line_terminator(&line).to_string())
}

fn print_summary(out: &mut impl Write, summary: &ScanSummary) -> Result<()> {
    writeln!(out, "\n{} {}", "Search complete.".green(), summary)?;
    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}
