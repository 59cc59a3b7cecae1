use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;

use docs_parser::logging::configure_logging;
use docs_parser::outputs::dispatch;
use docs_parser::{Args, ModeOutcome, ParserConfig, Session};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match args.config.as_deref() {
        Some(path) => match ParserConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                return ExitCode::FAILURE;
            }
        },
        None => ParserConfig::default(),
    };

    configure_logging(&config);
    log::info!("Parser started");
    log::info!("Command line arguments: {:?}", args);

    let status = match run(&args, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Parser failed: {:?}", e);
            ExitCode::FAILURE
        }
    };

    log::info!("Parser finished");
    status
}

async fn run(args: &Args, config: ParserConfig) -> Result<()> {
    let session = Session::new(config).context("Failed to create HTTP session")?;

    if args.clear_cache {
        session.clear_cache().context("Failed to clear response cache")?;
    }

    let outcome = args
        .mode
        .run(&session)
        .await
        .with_context(|| format!("Mode '{}' failed", args.mode))?;

    if let ModeOutcome::Table(table) = outcome {
        dispatch(&table, args.output, args.mode, session.config())
            .context("Failed to write results")?;
    }

    Ok(())
}
