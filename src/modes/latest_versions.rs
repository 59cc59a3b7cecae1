use regex::Regex;
use scraper::Html;
use std::sync::LazyLock;

use crate::error::{ParserError, Result};
use crate::session::Session;
use crate::table::ResultTable;
use crate::utils::{attr, find_all, text_of};

pub const HEADER: [&str; 3] = ["Documentation link", "Version", "Status"];

const VERSIONS_MARKER: &str = "All versions";

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Python (?P<version>\d\.\d+) \((?P<status>.*)\)")
        .expect("Failed to compile version regex")
});

pub async fn latest_versions(session: &Session) -> Result<ResultTable> {
    let document = session.get_document(&session.config().main_doc_url).await?;
    versions_table(&document)
}

/// Builds the table from the sidebar list that contains "All versions".
pub fn versions_table(document: &Html) -> Result<ResultTable> {
    let sidebar_lists = find_all(document.root_element(), "div.sphinxsidebarwrapper ul")?;
    let versions_list = sidebar_lists
        .into_iter()
        .find(|ul| text_of(*ul).contains(VERSIONS_MARKER))
        .ok_or(ParserError::VersionsListNotFound)?;

    let mut results = ResultTable::new(HEADER);
    for anchor in find_all(versions_list, "a")? {
        let href = attr(anchor, "href")?;
        let (version, status) = split_version(&text_of(anchor));
        results.push_row([href, version, status])?;
    }
    Ok(results)
}

/// `"Python 3.9 (stable)"` gives `("3.9", "stable")`; anything else is kept whole.
pub fn split_version(text: &str) -> (String, String) {
    match VERSION_RE.captures(text) {
        Some(caps) => (caps["version"].to_string(), caps["status"].to_string()),
        None => (text.to_string(), String::new()),
    }
}
