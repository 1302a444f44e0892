//! Record building.
//!
//! Turns a [`RawRow`] into a canonical [`Record`]: normalizes headers,
//! repairs the portal's escaping quirks, parses the lodgement date and
//! derives the detail page URL.

use std::sync::LazyLock;

use chrono::NaiveDate;
use etrack_models::{CanonicalField, RawRow, Record};
use regex::Regex;
use url::Url;
use url::form_urlencoded;

use crate::EtrackError;
use crate::config::PortalConfig;
use crate::fields::normalize_row;

/// Strict `DD/MM/YYYY`. `chrono` alone would also accept single digits.
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{2}/\d{2}/\d{4}$").unwrap_or_else(|_| unreachable!("invalid date regex"))
});

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").unwrap_or_else(|_| unreachable!("invalid whitespace regex")));

/// Builds the canonical record for one raw row.
///
/// # Errors
///
/// * [`EtrackError::UnknownField`] if any header does not normalize.
/// * [`EtrackError::MissingField`] if the row has no council reference or
///   no received date.
/// * [`EtrackError::InvalidDate`] if the received date is not `DD/MM/YYYY`.
/// * [`EtrackError::InvalidUrl`] if the detail URL cannot be resolved.
pub fn build(row: &RawRow, base_url: &Url, config: &PortalConfig) -> Result<Record, EtrackError> {
    let mut fields = normalize_row(row)?;

    let council_reference = fields
        .remove(&CanonicalField::CouncilReference)
        .map(|reference| unescape_reference(&reference))
        .ok_or(EtrackError::MissingField(CanonicalField::CouncilReference))?;

    let date_received = fields
        .remove(&CanonicalField::DateReceived)
        .ok_or(EtrackError::MissingField(CanonicalField::DateReceived))
        .and_then(|date| parse_date(&date))?;

    let info_url = info_url(base_url, config, &council_reference)?;

    Ok(Record {
        address: fields.remove(&CanonicalField::Address),
        description: fields
            .remove(&CanonicalField::Description)
            .map(|description| squeeze_whitespace(&description)),
        council_reference,
        info_url: info_url.into(),
        date_received,
    })
}

/// Collapses the doubled backslashes some portals emit in references.
#[must_use]
pub fn unescape_reference(reference: &str) -> String {
    reference.replace("\\\\", "\\")
}

/// Collapses internal whitespace runs to a single space.
#[must_use]
pub fn squeeze_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").into_owned()
}

/// Parses a strict `DD/MM/YYYY` date.
///
/// # Errors
///
/// Returns [`EtrackError::InvalidDate`] if `value` does not match the
/// pattern or is not a real calendar date.
pub fn parse_date(value: &str) -> Result<NaiveDate, EtrackError> {
    if !DATE_RE.is_match(value) {
        return Err(EtrackError::InvalidDate {
            value: value.to_owned(),
        });
    }

    NaiveDate::parse_from_str(value, "%d/%m/%Y").map_err(|_| EtrackError::InvalidDate {
        value: value.to_owned(),
    })
}

/// Derives the absolute detail page URL for an application.
///
/// The query carries the guest session marker (`r`), the detail view (`f`)
/// and the application reference, serialized in sorted key order.
///
/// # Errors
///
/// Returns [`EtrackError::InvalidUrl`] if the configured detail path cannot
/// be joined onto `base_url`.
pub fn info_url(
    base_url: &Url,
    config: &PortalConfig,
    council_reference: &str,
) -> Result<Url, EtrackError> {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("ApplicationId", council_reference)
        .append_pair("f", &config.view)
        .append_pair("r", &config.webguest)
        .finish();

    Ok(base_url.join(&format!("{}?{query}", config.detail_path))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://eservices.example.gov.au/ePathway/eTrack/eTrackApplicationSearchResults.aspx?r=P1.WEBGUEST").unwrap()
    }

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs.iter().copied().collect()
    }

    #[test]
    fn builds_record_from_conventional_row() {
        let record = build(
            &row(&[
                ("Application Number", "DA-123"),
                ("Address", "1 Main St"),
                ("Description", "Demolish shed"),
                ("Date Received", "01/02/2023"),
            ]),
            &base(),
            &PortalConfig::default(),
        )
        .unwrap();

        assert_eq!(record.council_reference, "DA-123");
        assert_eq!(record.address.as_deref(), Some("1 Main St"));
        assert_eq!(record.description.as_deref(), Some("Demolish shed"));
        assert_eq!(record.date_received.to_string(), "2023-02-01");
        assert_eq!(
            record.info_url,
            "https://eservices.example.gov.au/ePathway/eTrack/eTrackApplicationDetails.aspx?ApplicationId=DA-123&f=%24P1.ETR.APPDET.VIW&r=P1.WEBGUEST"
        );
    }

    #[test]
    fn optional_fields_may_be_absent() {
        let record = build(
            &row(&[("ID", "B/1"), ("Lodged", "31/12/2021"), ("Ward", "North")]),
            &base(),
            &PortalConfig::default(),
        )
        .unwrap();

        assert!(record.address.is_none());
        assert!(record.description.is_none());
        assert!(record.info_url.contains("ApplicationId=B%2F1"));
    }

    #[test]
    fn repairs_doubled_backslash() {
        assert_eq!(unescape_reference("DA\\\\123"), "DA\\123");
        assert_eq!(unescape_reference("DA\\123"), "DA\\123");

        let record = build(
            &row(&[("ID", "DA\\\\123"), ("Lodged", "01/01/2020")]),
            &base(),
            &PortalConfig::default(),
        )
        .unwrap();
        assert_eq!(record.council_reference, "DA\\123");
        assert!(record.info_url.contains("ApplicationId=DA%5C123&"));
    }

    #[test]
    fn squeezes_description_whitespace() {
        assert_eq!(squeeze_whitespace("Demolish   old   shed"), "Demolish old shed");
        assert_eq!(squeeze_whitespace("Two\n\tlines"), "Two lines");
    }

    #[test]
    fn date_parsing_is_strict() {
        assert_eq!(
            parse_date("09/10/2024").unwrap(),
            NaiveDate::from_ymd_opt(2024, 10, 9).unwrap()
        );
        for bad in ["9/10/2024", "09/10/24", "2024-10-09", "31/02/2024", "", "09/10/2024 "] {
            assert!(
                matches!(parse_date(bad), Err(EtrackError::InvalidDate { .. })),
                "'{bad}' should be rejected"
            );
        }
    }

    #[test]
    fn missing_required_fields_are_errors() {
        let err = build(
            &row(&[("Lodged", "01/01/2020")]),
            &base(),
            &PortalConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            EtrackError::MissingField(CanonicalField::CouncilReference)
        ));

        let err = build(&row(&[("ID", "A")]), &base(), &PortalConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            EtrackError::MissingField(CanonicalField::DateReceived)
        ));
    }

    #[test]
    fn unknown_header_fails_the_record() {
        let err = build(
            &row(&[("ID", "A"), ("Lodged", "01/01/2020"), ("Mystery", "?")]),
            &base(),
            &PortalConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, EtrackError::UnknownField { .. }));
    }

    #[test]
    fn uses_configured_webguest() {
        let config = PortalConfig::default().with_webguest("COUNCIL.P1.WEBGUEST");
        let url = info_url(&base(), &config, "DA 1").unwrap();
        assert_eq!(
            url.query(),
            Some("ApplicationId=DA+1&f=%24P1.ETR.APPDET.VIW&r=COUNCIL.P1.WEBGUEST")
        );
    }
}
