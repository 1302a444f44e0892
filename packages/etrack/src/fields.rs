//! Column header normalization.
//!
//! Maps the column headers seen across eTrack deployments onto
//! [`CanonicalField`]. Matching is exact and case-sensitive. An unrecognised
//! header is a hard error: dropping it would lose data without anyone
//! noticing, so the vocabulary below has to be extended instead.

use std::collections::BTreeMap;

use etrack_models::{CanonicalField, RawRow};

use crate::EtrackError;

/// A row keyed by canonical field. Later headers win on collision.
pub type NormalizedRow = BTreeMap<CanonicalField, String>;

/// Every header text known to map onto a canonical field.
const KNOWN_HEADERS: &[(&str, CanonicalField)] = &[
    // ── Identity ─────────────────────────────────────────────────────
    ("Application Link", CanonicalField::CouncilReference),
    ("ID", CanonicalField::CouncilReference),
    ("Application Number", CanonicalField::CouncilReference),
    ("Application ID", CanonicalField::CouncilReference),
    ("Application", CanonicalField::CouncilReference),
    ("Permit No.", CanonicalField::CouncilReference),
    // ── Dates ────────────────────────────────────────────────────────
    ("Lodgement Date", CanonicalField::DateReceived),
    ("Lodged", CanonicalField::DateReceived),
    ("Submitted Date", CanonicalField::DateReceived),
    ("Date Received", CanonicalField::DateReceived),
    ("Application Received", CanonicalField::DateReceived),
    ("Determined Date", CanonicalField::DeterminedDate),
    ("Date Determined", CanonicalField::DeterminedDate),
    ("Determination Date", CanonicalField::DeterminedDate),
    ("Work Commenced", CanonicalField::WorkCommenced),
    // ── Proposal ─────────────────────────────────────────────────────
    ("Description", CanonicalField::Description),
    ("Proposal", CanonicalField::Description),
    ("Details", CanonicalField::Details),
    ("Project Type", CanonicalField::ProjectType),
    ("Application Type", CanonicalField::ApplicationType),
    ("Application Group", CanonicalField::ApplicationType),
    ("Group Description", CanonicalField::GroupDescription),
    ("Group", CanonicalField::GroupDescription),
    ("Category Description", CanonicalField::CategoryDescription),
    ("Category", CanonicalField::CategoryDescription),
    ("Classification", CanonicalField::CategoryDescription),
    ("Development Cost", CanonicalField::DevelopmentCost),
    ("Estimated Cost", CanonicalField::DevelopmentCost),
    // ── Location ─────────────────────────────────────────────────────
    ("Formatted Address", CanonicalField::Address),
    ("Property Address", CanonicalField::Address),
    ("Address", CanonicalField::Address),
    ("Site Address", CanonicalField::Address),
    ("Ward", CanonicalField::Ward),
    ("Property ID", CanonicalField::PropertyId),
    // ── People & progress ────────────────────────────────────────────
    ("Applicant Names", CanonicalField::ApplicantNames),
    ("Applicant", CanonicalField::ApplicantNames),
    ("Applicant Name(s)", CanonicalField::ApplicantNames),
    ("Applicant Details", CanonicalField::ApplicantNames),
    ("Status", CanonicalField::Status),
    ("Stage/Decision", CanonicalField::Status),
    ("Decision", CanonicalField::Status),
    ("Current Stage or Decision", CanonicalField::Status),
    ("Stage", CanonicalField::Status),
    ("Priority", CanonicalField::Priority),
    ("Objections Received", CanonicalField::NumberOfObjections),
];

/// Returns every known `(header, field)` pair.
#[must_use]
pub const fn known_headers() -> &'static [(&'static str, CanonicalField)] {
    KNOWN_HEADERS
}

/// Maps a raw column header onto its canonical field.
///
/// `value` is only carried into the error so the offending cell can be
/// identified.
///
/// # Errors
///
/// Returns [`EtrackError::UnknownField`] if `header` is not in the known
/// vocabulary.
pub fn normalize(header: &str, value: &str) -> Result<CanonicalField, EtrackError> {
    KNOWN_HEADERS
        .iter()
        .find(|(known, _)| *known == header)
        .map(|(_, field)| *field)
        .ok_or_else(|| EtrackError::UnknownField {
            header: header.to_owned(),
            value: value.to_owned(),
        })
}

/// Re-keys a raw row by canonical field.
///
/// # Errors
///
/// Returns [`EtrackError::UnknownField`] for the first header that does not
/// normalize.
pub fn normalize_row(row: &RawRow) -> Result<NormalizedRow, EtrackError> {
    let mut normalized = NormalizedRow::new();

    for (header, value) in row.iter() {
        let field = normalize(header, value)?;
        if let Some(previous) = normalized.insert(field, value.to_owned()) {
            log::debug!("Header '{header}' overwrote {field} (was '{previous}')");
        }
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use strum::IntoEnumIterator;

    use super::*;

    fn assert_maps(field: CanonicalField, headers: &[&str]) {
        for header in headers {
            assert_eq!(
                normalize(header, "x").unwrap(),
                field,
                "header '{header}' should map to {field}"
            );
        }
    }

    #[test]
    fn maps_every_documented_variant() {
        use CanonicalField as F;

        assert_maps(
            F::CouncilReference,
            &[
                "Application Link",
                "ID",
                "Application Number",
                "Application ID",
                "Application",
                "Permit No.",
            ],
        );
        assert_maps(
            F::DateReceived,
            &[
                "Lodgement Date",
                "Lodged",
                "Submitted Date",
                "Date Received",
                "Application Received",
            ],
        );
        assert_maps(F::Description, &["Description", "Proposal"]);
        assert_maps(
            F::Address,
            &["Formatted Address", "Property Address", "Address", "Site Address"],
        );
        assert_maps(F::GroupDescription, &["Group Description", "Group"]);
        assert_maps(
            F::CategoryDescription,
            &["Category Description", "Category", "Classification"],
        );
        assert_maps(
            F::ApplicantNames,
            &[
                "Applicant Names",
                "Applicant",
                "Applicant Name(s)",
                "Applicant Details",
            ],
        );
        assert_maps(
            F::Status,
            &[
                "Status",
                "Stage/Decision",
                "Decision",
                "Current Stage or Decision",
                "Stage",
            ],
        );
        assert_maps(F::ApplicationType, &["Application Type", "Application Group"]);
        assert_maps(F::ProjectType, &["Project Type"]);
        assert_maps(F::Details, &["Details"]);
        assert_maps(F::WorkCommenced, &["Work Commenced"]);
        assert_maps(
            F::DeterminedDate,
            &["Determined Date", "Date Determined", "Determination Date"],
        );
        assert_maps(F::Ward, &["Ward"]);
        assert_maps(F::DevelopmentCost, &["Development Cost", "Estimated Cost"]);
        assert_maps(F::Priority, &["Priority"]);
        assert_maps(F::NumberOfObjections, &["Objections Received"]);
        assert_maps(F::PropertyId, &["Property ID"]);
    }

    #[test]
    fn unknown_header_is_an_error() {
        let err = normalize("Totally Unknown Header", "x").unwrap_err();
        match err {
            EtrackError::UnknownField { header, value } => {
                assert_eq!(header, "Totally Unknown Header");
                assert_eq!(value, "x");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert!(normalize("description", "x").is_err());
        assert!(normalize("ADDRESS", "x").is_err());
    }

    #[test]
    fn every_field_has_a_header_and_headers_are_unique() {
        let covered: BTreeSet<CanonicalField> = KNOWN_HEADERS.iter().map(|(_, f)| *f).collect();
        for field in CanonicalField::iter() {
            assert!(covered.contains(&field), "{field} has no header");
        }

        let mut headers: Vec<&str> = KNOWN_HEADERS.iter().map(|(h, _)| *h).collect();
        headers.sort_unstable();
        headers.dedup();
        assert_eq!(headers.len(), KNOWN_HEADERS.len());
    }

    #[test]
    fn normalize_row_last_write_wins() {
        let row: RawRow = [
            ("Application Number", "DA-1"),
            ("Proposal", "first"),
            ("Description", "second"),
        ]
        .into_iter()
        .collect();

        let normalized = normalize_row(&row).unwrap();
        assert_eq!(normalized[&CanonicalField::CouncilReference], "DA-1");
        assert_eq!(normalized[&CanonicalField::Description], "second");
    }

    #[test]
    fn normalize_row_fails_on_unknown_header() {
        let row: RawRow = [("ID", "DA-1"), ("Colour", "blue")].into_iter().collect();
        assert!(matches!(
            normalize_row(&row),
            Err(EtrackError::UnknownField { header, .. }) if header == "Colour"
        ));
    }
}
