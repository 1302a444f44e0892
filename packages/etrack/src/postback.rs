//! Navigation actions.
//!
//! Pager links on eTrack are ASP.NET postbacks: activating one submits the
//! page's form with `__EVENTTARGET`/`__EVENTARGUMENT` set from the link's
//! `javascript:__doPostBack(..)` call. This module describes that request as
//! plain data. Sending it (and keeping the session cookies) is left to the
//! caller's HTTP client.

use std::sync::LazyLock;

use etrack_models::{PagerControl, PagerEntry};
use regex::Regex;
use scraper::ElementRef;
use serde::Serialize;
use url::Url;
use url::form_urlencoded;

use crate::{Document, EtrackError, builtin_selector};

/// Form field carrying the postback target control.
pub const EVENT_TARGET: &str = "__EVENTTARGET";

/// Form field carrying the postback argument (e.g. `Page$5`).
pub const EVENT_ARGUMENT: &str = "__EVENTARGUMENT";

static DO_POSTBACK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*javascript:\s*__doPostBack\(\s*'([^']*)'\s*,\s*'([^']*)'\s*\)")
        .unwrap_or_else(|_| unreachable!("invalid postback regex"))
});

/// How to obtain the next page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NavigationAction {
    /// Submit the page's form as an ASP.NET postback.
    Postback(PostbackRequest),
    /// Plain link: fetch this URL.
    Follow {
        /// Absolute URL of the next page.
        url: Url,
    },
}

impl NavigationAction {
    /// Builds the action that activates `entry` on `doc`.
    ///
    /// Returns `Ok(None)` for inert entries (the current page) and links
    /// without an `href`.
    ///
    /// # Errors
    ///
    /// Returns [`EtrackError::InvalidUrl`] if a plain link or the form action
    /// cannot be resolved against the document's base URL.
    pub fn from_entry(doc: &Document, entry: &PagerEntry) -> Result<Option<Self>, EtrackError> {
        let PagerControl::Link { href: Some(href) } = &entry.control else {
            return Ok(None);
        };

        if let Some((target, argument)) = parse_do_postback(href) {
            return Ok(Some(Self::Postback(PostbackRequest::new(
                doc, target, argument,
            )?)));
        }

        Ok(Some(Self::Follow {
            url: doc.base_url().join(href)?,
        }))
    }
}

/// Extracts `(target, argument)` from a `javascript:__doPostBack(..)` href.
#[must_use]
pub fn parse_do_postback(href: &str) -> Option<(&str, &str)> {
    let caps = DO_POSTBACK_RE.captures(href)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

/// A form submission that simulates clicking a postback link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostbackRequest {
    /// URL the form posts to.
    pub action: Url,
    /// Control that raised the postback.
    pub event_target: String,
    /// Argument passed with the postback.
    pub event_argument: String,
    /// Every successful form control, in document order, with the event
    /// fields already filled in.
    pub fields: Vec<(String, String)>,
}

impl PostbackRequest {
    /// Prepares the postback of the first form on `doc`.
    ///
    /// A page without a form still yields a request carrying just the event
    /// fields, posted back to the page itself.
    ///
    /// # Errors
    ///
    /// Returns [`EtrackError::InvalidUrl`] if the form's `action` cannot be
    /// resolved.
    pub fn new(doc: &Document, event_target: &str, event_argument: &str) -> Result<Self, EtrackError> {
        let form = doc.html().select(&builtin_selector("form")).next();

        let action = match form.and_then(|f| f.value().attr("action")) {
            Some(action) if !action.trim().is_empty() => doc.base_url().join(action.trim())?,
            _ => doc.base_url().clone(),
        };

        let mut fields = form.map(form_fields).unwrap_or_default();
        set_field(&mut fields, EVENT_TARGET, event_target);
        set_field(&mut fields, EVENT_ARGUMENT, event_argument);

        Ok(Self {
            action,
            event_target: event_target.to_owned(),
            event_argument: event_argument.to_owned(),
            fields,
        })
    }

    /// `application/x-www-form-urlencoded` body for the request.
    #[must_use]
    pub fn encoded_body(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.fields.iter())
            .finish()
    }
}

fn set_field(fields: &mut Vec<(String, String)>, name: &str, value: &str) {
    if let Some(slot) = fields.iter_mut().find(|(n, _)| n == name) {
        value.clone_into(&mut slot.1);
    } else {
        fields.push((name.to_owned(), value.to_owned()));
    }
}

/// Collects the successful controls of `form` the way a browser would on
/// submit, minus buttons and file uploads.
fn form_fields(form: ElementRef<'_>) -> Vec<(String, String)> {
    let controls = builtin_selector("input, select, textarea");
    let options = builtin_selector("option");
    let mut fields = Vec::new();

    for control in form.select(&controls) {
        let element = control.value();
        let Some(name) = element.attr("name") else {
            continue;
        };
        if element.attr("disabled").is_some() {
            continue;
        }

        match element.name() {
            "input" => {
                let kind = element.attr("type").unwrap_or("text").to_ascii_lowercase();
                match kind.as_str() {
                    "submit" | "button" | "image" | "reset" | "file" => {}
                    "checkbox" | "radio" => {
                        if element.attr("checked").is_some() {
                            let value = element.attr("value").unwrap_or("on");
                            fields.push((name.to_owned(), value.to_owned()));
                        }
                    }
                    _ => {
                        let value = element.attr("value").unwrap_or_default();
                        fields.push((name.to_owned(), value.to_owned()));
                    }
                }
            }
            "select" => {
                let all: Vec<ElementRef<'_>> = control.select(&options).collect();
                let mut selected: Vec<&ElementRef<'_>> = all
                    .iter()
                    .filter(|o| o.value().attr("selected").is_some())
                    .collect();
                if selected.is_empty() && element.attr("multiple").is_none() {
                    selected.extend(all.first());
                }
                for option in selected {
                    let value = option
                        .value()
                        .attr("value")
                        .map_or_else(|| option.text().collect::<String>(), str::to_owned);
                    fields.push((name.to_owned(), value));
                }
            }
            "textarea" => {
                fields.push((name.to_owned(), control.text().collect()));
            }
            _ => {}
        }
    }

    fields
}
