use scraper::Html;
use std::fs;
use std::path::PathBuf;
use url::Url;

use crate::error::{ParserError, Result};
use crate::session::{Session, join_url};
use crate::utils::{attr, find_in_document};

const ARCHIVE_SELECTOR: &str = r#"table.docutils td > a[href$="pdf-a4.zip"]"#;

/// Downloads the PDF (A4) documentation archive into the downloads directory.
pub async fn download(session: &Session) -> Result<PathBuf> {
    let downloads_url = join_url(&session.config().main_doc_url, "download.html")?;
    let href = archive_href(&session.get_document(&downloads_url).await?)?;
    let archive_url = join_url(&downloads_url, &href)?;

    let downloads_dir = session.config().downloads_dir();
    fs::create_dir_all(&downloads_dir).map_err(|e| ParserError::io(&downloads_dir, e))?;

    let archive_path = downloads_dir.join(archive_file_name(&archive_url));
    let content = session.fetch_bytes(&archive_url).await?;
    fs::write(&archive_path, content).map_err(|e| ParserError::io(&archive_path, e))?;

    log::info!("Archive downloaded and saved: {}", archive_path.display());
    Ok(archive_path)
}

pub fn archive_href(document: &Html) -> Result<String> {
    attr(find_in_document(document, ARCHIVE_SELECTOR)?, "href")
}

/// Trailing path segment of the archive URL.
pub fn archive_file_name(archive_url: &str) -> String {
    Url::parse(archive_url)
        .ok()
        .and_then(|url| {
            url.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "docs-pdf-a4.zip".to_string())
}
