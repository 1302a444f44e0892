//! Parsed result page.

use scraper::Html;
use url::Url;

use crate::EtrackError;

/// An already-parsed eTrack page together with the URL it was served from.
///
/// Relative links on the page (detail pages, form actions) are resolved
/// against [`Document::base_url`]. The tree is only ever read.
#[derive(Debug, Clone)]
pub struct Document {
    html: Html,
    base_url: Url,
}

impl Document {
    /// Parses `body` as an HTML document served from `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`EtrackError::InvalidUrl`] if `base_url` is not an absolute
    /// URL.
    pub fn parse(body: &str, base_url: &str) -> Result<Self, EtrackError> {
        let base_url = Url::parse(base_url)?;
        Ok(Self::from_parts(Html::parse_document(body), base_url))
    }

    /// Wraps an HTML tree that the caller has already parsed.
    #[must_use]
    pub const fn from_parts(html: Html, base_url: Url) -> Self {
        Self { html, base_url }
    }

    #[must_use]
    pub const fn html(&self) -> &Html {
        &self.html
    }

    /// URL the page was served from.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }
}
