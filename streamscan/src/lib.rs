pub mod config;
pub mod errors;
pub mod keyword;
pub mod metrics;
pub mod results;
pub mod search;

pub use config::{ScanConfig, ScanOverrides};
pub use errors::{ScanError, ScanResult};
pub use keyword::Keyword;
pub use results::{ScanSummary, WindowSummary};
pub use search::{find_all, search, search_reader};
