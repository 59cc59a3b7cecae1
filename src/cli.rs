use clap::Parser;
use std::path::PathBuf;

use crate::modes::Mode;
use crate::outputs::OutputFormat;

/// Python documentation parser
#[derive(Debug, Parser)]
#[command(name = "docs-parser", version, about)]
pub struct Args {
    /// Parser mode
    #[arg(value_enum)]
    pub mode: Mode,

    /// Clear the HTTP response cache before running
    #[arg(short = 'c', long)]
    pub clear_cache: bool,

    /// Output format; results are printed line by line when omitted
    #[arg(short = 'o', long, value_enum)]
    pub output: Option<OutputFormat>,

    /// TOML file overriding the built-in settings
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}
