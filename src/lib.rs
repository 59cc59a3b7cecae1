// Python documentation scraper
//
// Fetches pages from the Python docs and the PEP index through an on-disk
// response cache, extracts fields with CSS selectors and reports the results
// as plain lines, a formatted table or a CSV file.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod modes;
pub mod outputs;
pub mod session;
pub mod table;
pub mod utils;

// Re-export main types for convenience
pub use cache::ResponseCache;
pub use cli::Args;
pub use config::ParserConfig;
pub use error::{ParserError, Result};
pub use modes::{Mode, ModeOutcome};
pub use outputs::OutputFormat;
pub use session::{FetchPolicy, Session};
pub use table::ResultTable;
