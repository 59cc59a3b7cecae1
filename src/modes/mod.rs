pub mod download;
pub mod latest_versions;
pub mod pep;
pub mod whats_new;

use clap::ValueEnum;
use std::path::PathBuf;

use crate::error::Result;
use crate::session::Session;
use crate::table::ResultTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    WhatsNew,
    LatestVersions,
    Download,
    Pep,
}

/// What a mode leaves behind: a report to render, or a file it wrote.
#[derive(Debug)]
pub enum ModeOutcome {
    Table(ResultTable),
    Saved(PathBuf),
}

impl Mode {
    /// Name as typed on the command line; also used in result file names.
    pub fn name(self) -> &'static str {
        match self {
            Mode::WhatsNew => "whats-new",
            Mode::LatestVersions => "latest-versions",
            Mode::Download => "download",
            Mode::Pep => "pep",
        }
    }

    pub async fn run(self, session: &Session) -> Result<ModeOutcome> {
        log::info!("Running mode: {}", self.name());
        match self {
            Mode::WhatsNew => whats_new::whats_new(session).await.map(ModeOutcome::Table),
            Mode::LatestVersions => latest_versions::latest_versions(session)
                .await
                .map(ModeOutcome::Table),
            Mode::Download => download::download(session).await.map(ModeOutcome::Saved),
            Mode::Pep => pep::pep(session).await.map(ModeOutcome::Table),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
