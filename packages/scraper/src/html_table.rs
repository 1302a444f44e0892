//! Generic HTML table extraction.
//!
//! Reads a conventional `<table>` with one header row followed by data rows
//! and yields one [`RawRow`] per data row, keyed by the header cell texts.
//! The default selectors match ASP.NET `GridView` markup (`tr.headerRow`,
//! `tr.pagerRow`) and fall back to "first row is the header" for plain
//! tables.

use etrack_models::RawRow;
use scraper::{ElementRef, Selector};

use crate::{element_text, has_class, is_own_row, parse_selector};

/// Extracts records from a header-row/data-rows HTML table.
#[derive(Debug, Clone)]
pub struct HtmlTableExtractor {
    /// CSS selector for the header row inside the table.
    header_row_selector: Selector,
    /// CSS selector for header cells within the header row.
    header_cell_selector: Selector,
    /// CSS selector for every row inside the table.
    row_selector: Selector,
    /// CSS selector for cells within a data row.
    cell_selector: Selector,
    /// Rows carrying this class are never treated as data.
    skip_row_class: &'static str,
}

impl Default for HtmlTableExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlTableExtractor {
    /// Creates an extractor with the default `GridView` selectors.
    #[must_use]
    pub fn new() -> Self {
        Self {
            header_row_selector: builtin("tr.headerRow"),
            header_cell_selector: builtin("th, td"),
            row_selector: builtin("tr"),
            cell_selector: builtin("td"),
            skip_row_class: "pagerRow",
        }
    }

    /// Reads the header texts of `table`.
    ///
    /// Uses the row matching the header selector, or the first row of the
    /// table when there is none. Returns the header row alongside its texts.
    fn headers<'a>(&self, table: ElementRef<'a>) -> Option<(ElementRef<'a>, Vec<String>)> {
        let header_row = table
            .select(&self.header_row_selector)
            .find(|row| is_own_row(&table, row))
            .or_else(|| {
                table
                    .select(&self.row_selector)
                    .find(|row| is_own_row(&table, row))
            })?;

        let headers = header_row
            .select(&self.header_cell_selector)
            .map(|cell| element_text(&cell))
            .collect();

        Some((header_row, headers))
    }

    /// Returns a lazy iterator over the data rows of `table`.
    ///
    /// A table with no rows at all yields nothing.
    #[must_use]
    pub fn rows<'a>(&self, table: ElementRef<'a>) -> TableRows<'a> {
        let Some((header_row, headers)) = self.headers(table) else {
            log::debug!("Table has no rows");
            return TableRows::empty(self.cell_selector.clone());
        };

        let rows: Vec<ElementRef<'a>> = table
            .select(&self.row_selector)
            .filter(|row| is_own_row(&table, row) && row.id() != header_row.id())
            .filter(|row| !has_class(row, self.skip_row_class))
            .collect();

        log::debug!(
            "Table has {} header(s) and {} data row(s)",
            headers.len(),
            rows.len()
        );

        TableRows {
            headers,
            rows: rows.into_iter(),
            cell_selector: self.cell_selector.clone(),
        }
    }
}

/// Lazy iterator over the data rows of a table, one [`RawRow`] per `<tr>`.
#[derive(Debug)]
pub struct TableRows<'a> {
    headers: Vec<String>,
    rows: std::vec::IntoIter<ElementRef<'a>>,
    cell_selector: Selector,
}

impl TableRows<'_> {
    fn empty(cell_selector: Selector) -> Self {
        Self {
            headers: Vec::new(),
            rows: Vec::new().into_iter(),
            cell_selector,
        }
    }

    /// Header texts, in column order.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

impl Iterator for TableRows<'_> {
    type Item = RawRow;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.rows.next()?;
        let cells: Vec<String> = row
            .select(&self.cell_selector)
            .map(|cell| element_text(&cell))
            .collect();

        Some(
            self.headers
                .iter()
                .enumerate()
                .map(|(i, header)| (header.clone(), cells.get(i).cloned().unwrap_or_default()))
                .collect(),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

/// Parses a selector that is part of this crate's source.
fn builtin(selector: &str) -> Selector {
    parse_selector(selector).unwrap_or_else(|e| unreachable!("{e}"))
}
