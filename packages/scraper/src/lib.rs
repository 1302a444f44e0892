#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Generic HTML helpers for scraping result tables.
//!
//! Provides selector parsing, element text extraction and the generic
//! header-row/data-rows table extractor in [`html_table`]. This crate knows
//! nothing about any particular portal: it turns already-parsed markup into
//! [`etrack_models::RawRow`]s keyed by whatever the header cells say.

pub mod html_table;

use scraper::{ElementRef, Selector};

/// Errors that can occur while preparing a scrape.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// A CSS selector failed to parse.
    #[error("invalid CSS selector '{selector}': {message}")]
    Selector {
        /// The selector text as given.
        selector: String,
        /// Parser diagnostic.
        message: String,
    },
}

/// Parses a CSS selector string, returning a [`ScrapeError`] on failure.
///
/// # Errors
///
/// Returns [`ScrapeError::Selector`] if `selector` is not valid CSS.
pub fn parse_selector(selector: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector).map_err(|e| ScrapeError::Selector {
        selector: selector.to_owned(),
        message: e.to_string(),
    })
}

/// Concatenated text content of an element with surrounding whitespace
/// removed.
#[must_use]
pub fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_owned()
}

/// Whether an element carries `class` in its class list.
#[must_use]
pub fn has_class(element: &ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

/// Whether `row` belongs to `table` itself rather than to a table nested
/// inside one of its cells (ASP.NET pagers render their own inner table).
#[must_use]
pub fn is_own_row(table: &ElementRef<'_>, row: &ElementRef<'_>) -> bool {
    row.ancestors()
        .find(|node| node.value().as_element().is_some_and(|e| e.name() == "table"))
        .is_some_and(|node| node.id() == table.id())
}

#[cfg(test)]
mod tests {
    use scraper::Html;

    use super::*;

    #[test]
    fn rejects_invalid_selector() {
        let err = parse_selector("table[").unwrap_err();
        assert!(err.to_string().contains("table["));
    }

    #[test]
    fn element_text_joins_and_trims() {
        let html = Html::parse_fragment("<p class=\"a b\">  Hello <b>world</b>\n </p>");
        let sel = parse_selector("p").unwrap();
        let p = html.select(&sel).next().unwrap();
        assert_eq!(element_text(&p), "Hello world");
        assert!(has_class(&p, "b"));
        assert!(!has_class(&p, "c"));
    }

    #[test]
    fn nested_rows_belong_to_inner_table() {
        let html = Html::parse_fragment(
            "<table id=\"outer\"><tr><td><table><tr><td>inner</td></tr></table></td></tr></table>",
        );
        let outer = html.select(&parse_selector("#outer").unwrap()).next().unwrap();
        let rows: Vec<ElementRef<'_>> = outer.select(&parse_selector("tr").unwrap()).collect();

        assert_eq!(rows.len(), 2);
        assert!(is_own_row(&outer, &rows[0]));
        assert!(!is_own_row(&outer, &rows[1]));
    }
}
