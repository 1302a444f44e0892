//! Result table extraction.
//!
//! eTrack renders search results in one of two shapes, both using
//! `table.grid`:
//!
//! * a single conventional grid with a header row and one data row per
//!   application, or
//! * one small two-column key/value grid per application.
//!
//! [`extract`] detects which shape a page uses and yields one [`RawRow`] per
//! application either way.

use etrack_models::RawRow;
use etrack_scraper::{element_text, is_own_row};
use etrack_scraper::html_table::{HtmlTableExtractor, TableRows};
use scraper::{ElementRef, Selector};

use crate::{Document, EtrackError, builtin_selector};

/// Selector for the grid tables results are rendered into.
pub const GRID_TABLE_SELECTOR: &str = "table.grid";

/// Lazy sequence of raw rows extracted from one page.
#[derive(Debug)]
pub enum RawRows<'a> {
    /// One key/value table per application.
    KeyValue(KeyValueRows<'a>),
    /// A single header/data-rows table.
    Tabular(TableRows<'a>),
}

impl Iterator for RawRows<'_> {
    type Item = RawRow;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::KeyValue(rows) => rows.next(),
            Self::Tabular(rows) => rows.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Self::KeyValue(rows) => rows.size_hint(),
            Self::Tabular(rows) => rows.size_hint(),
        }
    }
}

/// Yields one [`RawRow`] per key/value table. Each `<tr>` contributes its
/// first cell as the header and its second cell as the value.
#[derive(Debug)]
pub struct KeyValueRows<'a> {
    tables: std::vec::IntoIter<ElementRef<'a>>,
    row_selector: Selector,
    cell_selector: Selector,
}

impl Iterator for KeyValueRows<'_> {
    type Item = RawRow;

    fn next(&mut self) -> Option<Self::Item> {
        let table = self.tables.next()?;
        let mut record = RawRow::new();

        for tr in table
            .select(&self.row_selector)
            .filter(|tr| is_own_row(&table, tr))
        {
            let mut cells = tr.select(&self.cell_selector);
            let (Some(key), Some(value)) = (cells.next(), cells.next()) else {
                log::debug!("Skipping key/value row with fewer than two cells");
                continue;
            };
            record.insert(element_text(&key), element_text(&value));
        }

        Some(record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.tables.size_hint()
    }
}

/// Extracts the raw rows of every application listed on `doc`.
///
/// # Errors
///
/// Returns [`EtrackError::TableNotFound`] if the page has no grid table,
/// i.e. it is not a results listing.
pub fn extract(doc: &Document) -> Result<RawRows<'_>, EtrackError> {
    let grid = builtin_selector(GRID_TABLE_SELECTOR);
    let tables: Vec<ElementRef<'_>> = doc.html().select(&grid).collect();

    match tables.len() {
        0 => Err(EtrackError::TableNotFound),
        1 => {
            log::debug!("Found a single results grid");
            Ok(RawRows::Tabular(HtmlTableExtractor::new().rows(tables[0])))
        }
        n => {
            log::debug!("Found {n} key/value grids");
            Ok(RawRows::KeyValue(KeyValueRows {
                tables: tables.into_iter(),
                row_selector: builtin_selector("tr"),
                cell_selector: builtin_selector("td"),
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://eservices.example.gov.au/ePathway/eTrack/eTrackApplicationSearchResults.aspx";

    #[test]
    fn single_grid_uses_header_row() {
        let doc = Document::parse(
            r#"<html><body><table class="grid">
                <tr class="headerRow"><th>Application Number</th><th>Address</th><th>Description</th><th>Date Received</th></tr>
                <tr class="normalRow"><td>DA-123</td><td>1 Main St</td><td>Demolish shed</td><td>01/02/2023</td></tr>
            </table></body></html>"#,
            BASE,
        )
        .unwrap();

        let rows: Vec<RawRow> = extract(&doc).unwrap().collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("Application Number"), Some("DA-123"));
        assert_eq!(rows[0].get("Date Received"), Some("01/02/2023"));
    }

    #[test]
    fn multiple_grids_yield_one_row_per_table() {
        let doc = Document::parse(
            r#"<html><body>
                <table class="grid">
                    <tr><td>Application ID</td><td> DA-1 </td></tr>
                    <tr><td>Lodged</td><td>03/04/2022</td></tr>
                </table>
                <table class="grid">
                    <tr><td>Lodged</td><td>05/06/2022</td></tr>
                    <tr><td>Application ID</td><td>DA-2</td></tr>
                    <tr><td colspan="2">spacer</td></tr>
                </table>
            </body></html>"#,
            BASE,
        )
        .unwrap();

        let rows: Vec<RawRow> = extract(&doc).unwrap().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Application ID"), Some("DA-1"));
        assert_eq!(rows[0].get("Lodged"), Some("03/04/2022"));
        assert_eq!(rows[1].get("Application ID"), Some("DA-2"));
        assert_eq!(rows[1].get("Lodged"), Some("05/06/2022"));
        assert_eq!(rows[1].len(), 2);
    }

    #[test]
    fn missing_grid_is_an_error() {
        let doc = Document::parse("<html><body><table></table></body></html>", BASE).unwrap();
        assert!(matches!(extract(&doc), Err(EtrackError::TableNotFound)));
    }

    #[test]
    fn extraction_is_repeatable() {
        let doc = Document::parse(
            r#"<table class="grid">
                <tr class="headerRow"><th>ID</th><th>Lodged</th></tr>
                <tr><td>A</td><td>01/01/2020</td></tr>
                <tr><td>B</td><td>02/01/2020</td></tr>
            </table>"#,
            BASE,
        )
        .unwrap();

        let first: Vec<RawRow> = extract(&doc).unwrap().collect();
        let second: Vec<RawRow> = extract(&doc).unwrap().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }
}
