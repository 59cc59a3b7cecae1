use indicatif::{ProgressBar, ProgressStyle};
use scraper::{ElementRef, Html, Selector};

use crate::error::{ParserError, Result};

pub fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|_| ParserError::InvalidSelector {
        selector: selector.to_string(),
    })
}

/// First descendant of `scope` matching `selector`, or `TagNotFound`.
pub fn find_tag<'a>(scope: ElementRef<'a>, selector: &str) -> Result<ElementRef<'a>> {
    let parsed = parse_selector(selector)?;
    scope
        .select(&parsed)
        .next()
        .ok_or_else(|| ParserError::TagNotFound {
            selector: selector.to_string(),
        })
}

/// Same as [`find_tag`], searching the whole document.
pub fn find_in_document<'a>(document: &'a Html, selector: &str) -> Result<ElementRef<'a>> {
    find_tag(document.root_element(), selector)
}

/// Every descendant of `scope` matching `selector`.
pub fn find_all<'a>(scope: ElementRef<'a>, selector: &str) -> Result<Vec<ElementRef<'a>>> {
    let parsed = parse_selector(selector)?;
    Ok(scope.select(&parsed).collect())
}

pub fn attr(element: ElementRef<'_>, name: &str) -> Result<String> {
    element
        .value()
        .attr(name)
        .map(str::to_string)
        .ok_or_else(|| ParserError::MissingAttribute {
            selector: element.value().name().to_string(),
            attr: name.to_string(),
        })
}

/// Concatenated text of an element and its descendants.
pub fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Next element sibling with the given tag name.
pub fn next_sibling_tag<'a>(element: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    element
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| sibling.value().name() == tag)
}

/// Progress bar over `len` items; draws nothing when stderr is not a terminal.
pub fn progress_bar(len: usize, label: &str) -> ProgressBar {
    let bar = ProgressBar::new(len as u64);
    let style = ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len} ({elapsed})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    bar.set_style(style);
    bar.set_message(label.to_string());
    bar
}

/// Logs a warning without tearing an active progress bar.
pub fn warn_over(bar: &ProgressBar, message: impl std::fmt::Display) {
    bar.suspend(|| log::warn!("{}", message));
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
            <section id="numerical-index">
                <table><tbody>
                    <tr><td>SA</td><td><a href="pep-0001/">1</a></td></tr>
                </tbody></table>
            </section>
        </body></html>
    "#;

    #[test]
    fn test_find_tag_present() {
        let document = Html::parse_document(PAGE);
        let section = find_in_document(&document, "section#numerical-index").unwrap();
        let td = find_tag(section, "td").unwrap();
        assert_eq!(text_of(td), "SA");
    }

    #[test]
    fn test_find_tag_missing_reports_selector() {
        let document = Html::parse_document(PAGE);
        let err = find_in_document(&document, "dl.rfc2822").unwrap_err();
        match err {
            ParserError::TagNotFound { selector } => assert_eq!(selector, "dl.rfc2822"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_selector() {
        let document = Html::parse_document(PAGE);
        assert!(matches!(
            find_in_document(&document, "td >> >"),
            Err(ParserError::InvalidSelector { .. })
        ));
    }

    #[test]
    fn test_warn_over_keeps_bar_position() {
        let bar = ProgressBar::hidden();
        bar.set_length(3);
        bar.inc(2);
        warn_over(&bar, "Skipping https://peps.python.org/pep-0004/");
        assert_eq!(bar.position(), 2);
        assert!(!bar.is_finished());
    }

    #[test]
    fn test_next_sibling_and_attr() {
        let document = Html::parse_document(PAGE);
        let td = find_in_document(&document, "td").unwrap();
        let link_cell = next_sibling_tag(td, "td").unwrap();
        let link = find_tag(link_cell, "a").unwrap();
        assert_eq!(attr(link, "href").unwrap(), "pep-0001/");
        assert!(matches!(attr(link, "title"), Err(ParserError::MissingAttribute { .. })));
    }
}
