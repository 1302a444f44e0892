//! Per-portal configuration.
//!
//! Detail-page links on eTrack portals need a guest session marker and a
//! view identifier in the query string to be viewable without logging in.
//! Both differ between deployments, so they are supplied by the caller
//! (directly or from a TOML file) rather than baked into the builder.

use serde::Deserialize;

use crate::EtrackError;

/// Guest session marker used by most deployments.
pub const DEFAULT_WEBGUEST: &str = "P1.WEBGUEST";

/// View identifier of the application detail page.
pub const DEFAULT_VIEW: &str = "$P1.ETR.APPDET.VIW";

/// Detail page path, relative to the results page.
pub const DEFAULT_DETAIL_PATH: &str = "eTrackApplicationDetails.aspx";

/// Settings that vary between portal deployments.
///
/// ```toml
/// webguest = "COUNCIL.P1.WEBGUEST"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PortalConfig {
    /// Value of the `r` query parameter (guest session marker).
    pub webguest: String,
    /// Value of the `f` query parameter (detail view identifier).
    pub view: String,
    /// Path of the detail page, resolved against the results page URL.
    pub detail_path: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            webguest: DEFAULT_WEBGUEST.to_owned(),
            view: DEFAULT_VIEW.to_owned(),
            detail_path: DEFAULT_DETAIL_PATH.to_owned(),
        }
    }
}

impl PortalConfig {
    /// Parses a portal configuration from TOML. Missing keys take their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns [`EtrackError::Config`] if the TOML is malformed or contains
    /// unknown keys.
    pub fn from_toml(toml_str: &str) -> Result<Self, EtrackError> {
        toml::de::from_str(toml_str).map_err(|e| EtrackError::Config(e.to_string()))
    }

    /// Sets the guest session marker.
    #[must_use]
    pub fn with_webguest(mut self, webguest: &str) -> Self {
        webguest.clone_into(&mut self.webguest);
        self
    }

    /// Sets the detail view identifier.
    #[must_use]
    pub fn with_view(mut self, view: &str) -> Self {
        view.clone_into(&mut self.view);
        self
    }

    /// Sets the detail page path.
    #[must_use]
    pub fn with_detail_path(mut self, path: &str) -> Self {
        path.clone_into(&mut self.detail_path);
        self
    }
}
