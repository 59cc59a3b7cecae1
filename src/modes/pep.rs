//! PEP index reconciliation
//!
//! Every row of the numerical index carries a short type/status code; the PEP
//! page itself carries the authoritative status. The mode tallies page
//! statuses and reports pages whose status disagrees with the index code.

use scraper::{ElementRef, Html};
use std::collections::BTreeMap;

use crate::config::expected_statuses;
use crate::error::{ParserError, Result};
use crate::session::{FetchPolicy, Session, join_url};
use crate::table::ResultTable;
use crate::utils::{
    attr, find_all, find_in_document, find_tag, next_sibling_tag, progress_bar, text_of, warn_over,
};

/// An unreachable PEP page skips its row.
pub const ITEM_POLICY: FetchPolicy = FetchPolicy::SkipOnFailure;

pub const HEADER: [&str; 2] = ["Status", "Count"];

/// One row of the numerical index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRow {
    /// Status code with the leading type letter removed.
    pub code: String,
    pub url: String,
}

/// A PEP page whose status is not among the ones expected for its index code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discrepancy {
    pub url: String,
    pub page_status: String,
    pub expected: Vec<String>,
}

impl std::fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Mismatched statuses: {} status on page: {} expected statuses: {:?}",
            self.url, self.page_status, self.expected
        )
    }
}

/// Count of PEP pages per status string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusTally {
    counts: BTreeMap<String, usize>,
}

impl StatusTally {
    pub fn add(&mut self, status: &str) {
        *self.counts.entry(status.to_string()).or_insert(0) += 1;
    }

    pub fn get(&self, status: &str) -> usize {
        self.counts.get(status).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &usize)> {
        self.counts.iter()
    }

    /// One row per status followed by the `Total` row.
    pub fn to_table(&self) -> Result<ResultTable> {
        let mut table = ResultTable::new(HEADER);
        for (status, count) in self.iter() {
            table.push_row([status.clone(), count.to_string()])?;
        }
        table.push_row(["Total".to_string(), self.total().to_string()])?;
        Ok(table)
    }
}

/// Outcome of checking one page status against its index code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    Match,
    Mismatch(Discrepancy),
}

/// Reconciliation state accumulated over the whole index.
#[derive(Debug, Default)]
pub struct PepReport {
    pub tally: StatusTally,
    pub discrepancies: Vec<Discrepancy>,
    pub rows_processed: usize,
    pub rows_skipped: usize,
}

impl PepReport {
    /// Reconciles one page and tallies its status unless the code is unusable.
    pub fn record(&mut self, row: &IndexRow, page_status: &str) -> Result<()> {
        self.rows_processed += 1;
        match reconcile(&row.url, &row.code, page_status) {
            Ok(outcome) => {
                if let Reconciliation::Mismatch(discrepancy) = outcome {
                    self.discrepancies.push(discrepancy);
                }
                self.tally.add(page_status);
                Ok(())
            }
            Err(e) => {
                self.rows_skipped += 1;
                Err(e)
            }
        }
    }

    pub fn skip(&mut self) {
        self.rows_processed += 1;
        self.rows_skipped += 1;
    }
}

pub async fn pep(session: &Session) -> Result<ResultTable> {
    let pep_url = session.config().pep_url.clone();
    let rows = index_rows(&session.get_document(&pep_url).await?, &pep_url)?;

    let mut report = PepReport::default();
    let bar = progress_bar(rows.len(), "pep");

    for row in &rows {
        bar.inc(1);
        let skipped = |e: &ParserError| warn_over(&bar, format!("Skipping page: {}", e));
        let Some(document) = session.get_document_with(&row.url, ITEM_POLICY, skipped).await? else {
            report.skip();
            continue;
        };

        let page_status = match page_status(&document) {
            Ok(status) => status,
            Err(e) => {
                warn_over(&bar, format!("Skipping {}: {}", row.url, e));
                report.skip();
                continue;
            }
        };

        if let Err(e) = report.record(row, &page_status) {
            warn_over(&bar, format!("Skipping row: {}", e));
        }
    }
    bar.finish_and_clear();

    for discrepancy in &report.discrepancies {
        log::info!("{}", discrepancy);
    }
    log::info!(
        "PEP rows processed: {}, skipped: {}, tallied: {}",
        report.rows_processed,
        report.rows_skipped,
        report.tally.total()
    );

    report.tally.to_table()
}

/// Reads the code and absolute page URL of every numerical index row.
///
/// A row without a code cell, link cell or link is logged and left out.
pub fn index_rows(index: &Html, pep_url: &str) -> Result<Vec<IndexRow>> {
    let section = find_in_document(index, "section#numerical-index")?;
    let tbody = find_tag(section, "tbody")?;

    let mut rows = Vec::new();
    for (position, tr) in find_all(tbody, "tr")?.into_iter().enumerate() {
        match index_row(tr, pep_url) {
            Ok(row) => rows.push(row),
            Err(e @ (ParserError::TagNotFound { .. } | ParserError::MissingAttribute { .. })) => {
                log::warn!("Skipping index row {}: {}", position + 1, e);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(rows)
}

fn index_row(tr: ElementRef<'_>, pep_url: &str) -> Result<IndexRow> {
    let code_cell = find_tag(tr, "td")?;
    let link_cell = next_sibling_tag(code_cell, "td").ok_or_else(|| ParserError::TagNotFound {
        selector: "tr > td + td".to_string(),
    })?;
    let link = find_tag(link_cell, "a")?;

    Ok(IndexRow {
        code: text_of(code_cell).trim().chars().skip(1).collect(),
        url: join_url(pep_url, &attr(link, "href")?)?,
    })
}

/// Value of the `Status` field in a PEP page's header block.
pub fn page_status(document: &Html) -> Result<String> {
    let dl = find_in_document(document, "dl.rfc2822.field-list.simple")?;
    let status_dt = find_all(dl, "dt")?
        .into_iter()
        .find(|dt| text_of(*dt).trim().trim_end_matches(':') == "Status")
        .ok_or_else(|| ParserError::TagNotFound {
            selector: "dt:Status".to_string(),
        })?;
    let dd = next_sibling_tag(status_dt, "dd").ok_or_else(|| ParserError::TagNotFound {
        selector: "dt:Status + dd".to_string(),
    })?;
    Ok(text_of(dd).trim().to_string())
}

/// Checks `page_status` against the statuses expected for `code`.
///
/// An unmapped or malformed code (longer than two characters) is an
/// `UnexpectedStatus` error; the caller decides whether to skip the row.
pub fn reconcile(url: &str, code: &str, page_status: &str) -> Result<Reconciliation> {
    let expected = match expected_statuses(code) {
        Some(expected) if code.chars().count() <= 2 => expected,
        _ => {
            return Err(ParserError::UnexpectedStatus {
                url: url.to_string(),
                code: code.to_string(),
                status: page_status.to_string(),
            });
        }
    };

    if expected.contains(&page_status) {
        return Ok(Reconciliation::Match);
    }

    Ok(Reconciliation::Mismatch(Discrepancy {
        url: url.to_string(),
        page_status: page_status.to_string(),
        expected: expected.iter().map(|s| s.to_string()).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX: &str = r#"
        <html><body>
        <section id="numerical-index">
            <table class="pep-zero-table docutils align-default">
            <thead><tr><th>Status</th><th>PEP</th><th>Title</th></tr></thead>
            <tbody>
                <tr><td><abbr title="Process, Active">PA</abbr></td>
                    <td><a class="pep reference internal" href="pep-0001/">1</a></td>
                    <td>PEP Purpose and Guidelines</td></tr>
                <tr><td><abbr title="Informational">I</abbr></td>
                    <td><a class="pep reference internal" href="pep-0002/">2</a></td>
                    <td>Procedure for Adding New Modules</td></tr>
            </tbody>
            </table>
        </section>
        </body></html>
    "#;

    const PAGE: &str = r#"
        <html><body>
        <dl class="rfc2822 field-list simple">
            <dt class="field-odd">Author<span class="colon">:</span></dt>
            <dd class="field-odd">Barry Warsaw</dd>
            <dt class="field-even">Status<span class="colon">:</span></dt>
            <dd class="field-even"><abbr title="Currently valid informational guidance">Active</abbr></dd>
            <dt class="field-odd">Type<span class="colon">:</span></dt>
            <dd class="field-odd">Process</dd>
        </dl>
        </body></html>
    "#;

    #[test]
    fn test_index_rows() {
        let rows = index_rows(&Html::parse_document(INDEX), "https://peps.python.org/").unwrap();
        assert_eq!(
            rows,
            vec![
                IndexRow {
                    code: "A".to_string(),
                    url: "https://peps.python.org/pep-0001/".to_string(),
                },
                IndexRow {
                    code: String::new(),
                    url: "https://peps.python.org/pep-0002/".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_index_rows_skips_broken_rows() {
        let index = r#"
            <html><body><section id="numerical-index"><table><tbody>
                <tr><td>SF</td></tr>
                <tr><td>SA</td><td>no link here</td></tr>
                <tr><td>SD</td><td><a>7</a></td></tr>
                <tr><td>SF</td><td><a href="pep-0008/">8</a></td></tr>
            </tbody></table></section></body></html>
        "#;
        let rows = index_rows(&Html::parse_document(index), "https://peps.python.org/").unwrap();
        assert_eq!(
            rows,
            vec![IndexRow {
                code: "F".to_string(),
                url: "https://peps.python.org/pep-0008/".to_string(),
            }]
        );
    }

    #[test]
    fn test_index_rows_without_table_body_fails() {
        let index = r#"<html><body><section id="numerical-index"></section></body></html>"#;
        assert!(matches!(
            index_rows(&Html::parse_document(index), "https://peps.python.org/"),
            Err(ParserError::TagNotFound { .. })
        ));
    }

    #[test]
    fn test_page_status_reads_field_after_label() {
        assert_eq!(page_status(&Html::parse_document(PAGE)).unwrap(), "Active");
    }

    #[test]
    fn test_page_status_missing_block() {
        let document = Html::parse_document("<html><body><dl><dt>Status</dt></dl></body></html>");
        assert!(matches!(
            page_status(&document),
            Err(ParserError::TagNotFound { .. })
        ));
    }

    #[test]
    fn test_matching_status_tallies_without_discrepancy() {
        let mut report = PepReport::default();
        let row = IndexRow {
            code: "A".to_string(),
            url: "https://peps.python.org/pep-0001/".to_string(),
        };

        report.record(&row, "Active").unwrap();

        assert!(report.discrepancies.is_empty());
        assert_eq!(report.tally.get("Active"), 1);
    }

    #[test]
    fn test_mismatched_status_records_discrepancy_and_still_tallies() {
        let mut report = PepReport::default();
        let row = IndexRow {
            code: "A".to_string(),
            url: "https://peps.python.org/pep-0042/".to_string(),
        };

        report.record(&row, "Rejected").unwrap();

        assert_eq!(report.discrepancies.len(), 1);
        assert_eq!(report.discrepancies[0].url, "https://peps.python.org/pep-0042/");
        assert_eq!(report.discrepancies[0].page_status, "Rejected");
        assert_eq!(report.discrepancies[0].expected, vec!["Active", "Accepted"]);
        assert_eq!(report.tally.get("Rejected"), 1);
    }

    #[test]
    fn test_unmapped_code_is_unexpected_and_not_tallied() {
        let mut report = PepReport::default();
        let row = IndexRow {
            code: "X".to_string(),
            url: "https://peps.python.org/pep-9999/".to_string(),
        };

        let err = report.record(&row, "Final").unwrap_err();

        assert!(matches!(err, ParserError::UnexpectedStatus { .. }));
        assert_eq!(report.tally.total(), 0);
        assert_eq!(report.rows_processed, 1);
        assert_eq!(report.rows_skipped, 1);
    }

    #[test]
    fn test_malformed_code_is_unexpected() {
        assert!(matches!(
            reconcile("https://peps.python.org/pep-0003/", "ABC", "Final"),
            Err(ParserError::UnexpectedStatus { .. })
        ));
    }

    #[test]
    fn test_empty_code_accepts_draft() {
        assert_eq!(
            reconcile("https://peps.python.org/pep-0004/", "", "Draft").unwrap(),
            Reconciliation::Match
        );
    }

    #[test]
    fn test_tally_table_ends_with_total() {
        let mut tally = StatusTally::default();
        tally.add("Final");
        tally.add("Active");
        tally.add("Final");

        let table = tally.to_table().unwrap();
        assert_eq!(
            table.rows(),
            &[
                vec!["Active".to_string(), "1".to_string()],
                vec!["Final".to_string(), "2".to_string()],
                vec!["Total".to_string(), "3".to_string()],
            ]
        );
    }
}
