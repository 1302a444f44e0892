#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Canonical record types for `TechnologyOne` eTrack result pages.
//!
//! Every portal variant renders the same underlying data with different
//! column headers. Extraction produces [`RawRow`]s keyed by whatever the
//! portal called its columns; normalization maps those headers onto
//! [`CanonicalField`] and reshapes each row into a [`Record`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// A canonical column identifier shared by every portal variant.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CanonicalField {
    /// The council's application reference (e.g. `DA-123/2023`).
    CouncilReference,
    /// When the application was lodged.
    DateReceived,
    /// Free-text description of the proposal.
    Description,
    /// Street address of the subject site.
    Address,
    GroupDescription,
    CategoryDescription,
    ApplicantNames,
    /// Current stage or decision.
    Status,
    ApplicationType,
    ProjectType,
    /// Opaque column that some portals use for both address and description,
    /// in no consistent order. Kept unparsed.
    Details,
    WorkCommenced,
    DeterminedDate,
    Ward,
    DevelopmentCost,
    Priority,
    NumberOfObjections,
    PropertyId,
}

/// One application record as rendered on a result page, keyed by the
/// portal's own column headers.
///
/// Insertion order is preserved. Headers are unique within a row: inserting
/// an existing header replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow(Vec<(String, String)>);

impl RawRow {
    /// Creates an empty row.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Inserts a header/value pair, replacing the value of an existing
    /// header with the same text.
    pub fn insert(&mut self, header: impl Into<String>, value: impl Into<String>) {
        let header = header.into();
        let value = value.into();

        if let Some(slot) = self.0.iter_mut().find(|(h, _)| *h == header) {
            slot.1 = value;
        } else {
            self.0.push((header, value));
        }
    }

    /// Returns the value stored under `header`, if any.
    #[must_use]
    pub fn get(&self, header: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates over `(header, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(h, v)| (h.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<H: Into<String>, V: Into<String>> FromIterator<(H, V)> for RawRow {
    fn from_iter<T: IntoIterator<Item = (H, V)>>(iter: T) -> Self {
        let mut row = Self::new();
        for (header, value) in iter {
            row.insert(header, value);
        }
        row
    }
}

/// A planning application normalized to the canonical schema.
///
/// Built once per [`RawRow`] and handed straight to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Council application reference, with escape artifacts repaired.
    pub council_reference: String,
    /// Site address as rendered by the portal.
    pub address: Option<String>,
    /// Proposal description with whitespace runs collapsed.
    pub description: Option<String>,
    /// Absolute URL of the application detail page.
    pub info_url: String,
    /// Lodgement date.
    pub date_received: NaiveDate,
}

/// What a pager entry displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PagerLabel {
    /// A literal page number.
    Number(u32),
    /// The `...` marker standing in for a collapsed range of pages.
    Ellipsis,
    /// Anything else (e.g. `Next`). Never matches a page number.
    Text(String),
}

impl PagerLabel {
    /// Literal text the portal renders for a collapsed range.
    pub const ELLIPSIS: &'static str = "...";

    /// Classifies the display text of a pager entry.
    ///
    /// Matching is exact: only the canonical rendering of a number (no
    /// padding, sign or leading zeros) is a [`Self::Number`]. Anything else,
    /// `"05"` included, is kept as [`Self::Text`].
    #[must_use]
    pub fn parse(text: &str) -> Self {
        if text == Self::ELLIPSIS {
            return Self::Ellipsis;
        }
        match text.parse::<u32>() {
            Ok(n) if n.to_string() == text => Self::Number(n),
            _ => Self::Text(text.to_owned()),
        }
    }

    /// Returns the page number if this is a numbered entry.
    #[must_use]
    pub const fn number(&self) -> Option<u32> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Ellipsis | Self::Text(_) => None,
        }
    }

    #[must_use]
    pub const fn is_ellipsis(&self) -> bool {
        matches!(self, Self::Ellipsis)
    }
}

/// How a pager entry can be activated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PagerControl {
    /// A clickable link. `href` is usually a `javascript:__doPostBack(..)`
    /// call on ASP.NET portals.
    Link {
        /// Raw `href` attribute, if present.
        href: Option<String>,
    },
    /// Inert text, i.e. the page currently displayed.
    Current,
}

/// A single visible control in a pager row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagerEntry {
    pub label: PagerLabel,
    pub control: PagerControl,
}

impl PagerEntry {
    /// Convenience constructor for a link entry.
    #[must_use]
    pub fn link(label: PagerLabel, href: impl Into<String>) -> Self {
        Self {
            label,
            control: PagerControl::Link {
                href: Some(href.into()),
            },
        }
    }

    /// Convenience constructor for the inert current-page entry.
    #[must_use]
    pub const fn current(page: u32) -> Self {
        Self {
            label: PagerLabel::Number(page),
            control: PagerControl::Current,
        }
    }
}
