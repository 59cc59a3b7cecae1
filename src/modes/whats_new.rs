use scraper::Html;

use crate::error::{ParserError, Result};
use crate::session::{FetchPolicy, Session, join_url};
use crate::table::ResultTable;
use crate::utils::{
    attr, find_all, find_in_document, find_tag, progress_bar, text_of, warn_over,
};

/// A missing article page is skipped, never fatal.
pub const ITEM_POLICY: FetchPolicy = FetchPolicy::SkipOnFailure;

pub const HEADER: [&str; 3] = ["Article link", "Title", "Editor, author"];

/// Collects every "What's New" article with its title and credits.
pub async fn whats_new(session: &Session) -> Result<ResultTable> {
    let whats_new_url = join_url(&session.config().main_doc_url, "whatsnew/")?;
    let links = article_links(&session.get_document(&whats_new_url).await?, &whats_new_url)?;

    let mut results = ResultTable::new(HEADER);
    let bar = progress_bar(links.len(), "whats-new");

    for link in links {
        bar.inc(1);
        let skipped = |e: &ParserError| warn_over(&bar, format!("Skipping page: {}", e));
        let Some(document) = session.get_document_with(&link, ITEM_POLICY, skipped).await? else {
            continue;
        };

        match article_details(&document) {
            Ok((title, credits)) => results.push_row([link, title, credits])?,
            Err(e) => warn_over(&bar, format!("Skipping {}: {}", link, e)),
        }
    }

    bar.finish_and_clear();
    Ok(results)
}

/// Absolute links of the index's table-of-contents entries.
pub fn article_links(index: &Html, index_url: &str) -> Result<Vec<String>> {
    let toc = find_in_document(index, "#what-s-new-in-python div.toctree-wrapper")?;

    let mut links = Vec::new();
    for section in find_all(toc, "li.toctree-l1")? {
        let anchor = find_tag(section, "a")?;
        links.push(join_url(index_url, &attr(anchor, "href")?)?);
    }
    Ok(links)
}

/// Heading and the first definition list (credits) of an article page.
pub fn article_details(document: &Html) -> Result<(String, String)> {
    let h1 = find_in_document(document, "h1")?;
    let dl = find_in_document(document, "dl")?;

    let title = text_of(h1).trim().trim_end_matches('¶').trim().to_string();
    let credits = text_of(dl).replace('\n', " ");
    Ok((title, credits))
}
