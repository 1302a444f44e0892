#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Planning-application extraction for `TechnologyOne` eTrack portals.
//!
//! Works on result pages the caller has already fetched:
//!
//! 1. [`table::extract`] finds the results grid and yields raw rows keyed by
//!    the portal's own column headers.
//! 2. [`record::build`] normalizes each row ([`fields`]) into a canonical
//!    [`Record`].
//! 3. [`pager::advance`] reads the pager row and describes how to fetch the
//!    next page, or returns `None` on the last one.
//!
//! No requests are made here. Each call reads only the [`Document`] it is
//! given, so traversing a listing is a loop of fetch, [`scrape`], advance.

pub mod config;
pub mod document;
pub mod fields;
pub mod pager;
pub mod postback;
pub mod record;
pub mod table;

pub use config::PortalConfig;
pub use document::Document;
pub use etrack_models::{CanonicalField, RawRow, Record};
pub use postback::{NavigationAction, PostbackRequest};

use scraper::Selector;

/// Errors that can occur while reading a result page.
#[derive(Debug, thiserror::Error)]
pub enum EtrackError {
    /// The page has no results grid.
    #[error("Couldn't find a results table")]
    TableNotFound,

    /// A column header is not in the known vocabulary.
    #[error("Unknown column '{header}' with value '{value}'")]
    UnknownField {
        /// The header text as rendered.
        header: String,
        /// The cell value under that header.
        value: String,
    },

    /// A received date is not `DD/MM/YYYY`.
    #[error("Invalid date '{value}', expected DD/MM/YYYY")]
    InvalidDate {
        /// The offending cell text.
        value: String,
    },

    /// The page has no pager row or current-page indicator.
    #[error("Couldn't find the pager row")]
    PagerNotFound,

    /// The current-page indicator is not a number.
    #[error("Invalid current page number '{text}'")]
    InvalidPageNumber {
        /// The indicator's text.
        text: String,
    },

    /// A required field is absent from a row.
    #[error("Missing required field {0}")]
    MissingField(CanonicalField),

    /// A URL could not be parsed or resolved.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Portal configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(String),
}

/// Parses a selector that is part of this crate's source.
pub(crate) fn builtin_selector(selector: &str) -> Selector {
    Selector::parse(selector).unwrap_or_else(|_| unreachable!("invalid builtin selector"))
}

/// Builds the records of every application on `doc`, lazily.
///
/// # Errors
///
/// Returns [`EtrackError::TableNotFound`] up front if the page has no
/// results grid. Per-record failures are yielded by the iterator.
pub fn records<'a>(
    doc: &'a Document,
    config: &'a PortalConfig,
) -> Result<impl Iterator<Item = Result<Record, EtrackError>> + 'a, EtrackError> {
    let rows = table::extract(doc)?;
    Ok(rows.map(move |row| record::build(&row, doc.base_url(), config)))
}

/// Hands every record on `doc` to `on_record`, stopping at the first error.
///
/// Returns the number of records delivered.
///
/// # Errors
///
/// Returns the first [`EtrackError`] from extraction or record building.
pub fn scrape(
    doc: &Document,
    config: &PortalConfig,
    mut on_record: impl FnMut(Record),
) -> Result<usize, EtrackError> {
    let mut count = 0;

    for record in records(doc, config)? {
        on_record(record?);
        count += 1;
    }

    log::info!("Scraped {count} record(s) from {}", doc.base_url());
    Ok(count)
}
