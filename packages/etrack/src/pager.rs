//! Pagination.
//!
//! Result listings carry a `tr.pagerRow` with one `<span>` for the current
//! page and `<a>` links for the other visible pages. Long result sets only
//! show a window of page numbers, with `...` links at either end that jump
//! to the page just outside the window. Ranges are never collapsed in the
//! middle.
//!
//! Nothing here is cached: every call re-reads the pager from the document
//! it is given.

use etrack_models::{PagerControl, PagerEntry, PagerLabel};

use crate::postback::NavigationAction;
use crate::{Document, EtrackError, builtin_selector};

/// Selector for the entries of the pager row, in document order.
pub const PAGER_ENTRY_SELECTOR: &str = "tr.pagerRow td a, tr.pagerRow td span";

/// Selector for the current-page indicator.
pub const CURRENT_PAGE_SELECTOR: &str = "tr.pagerRow td span";

/// Reads the number of the page currently displayed.
///
/// # Errors
///
/// * [`EtrackError::PagerNotFound`] if the page has no pager row or the row
///   has no current-page indicator.
/// * [`EtrackError::InvalidPageNumber`] if the indicator is not a number.
pub fn current_page_number(doc: &Document) -> Result<u32, EtrackError> {
    let selector = builtin_selector(CURRENT_PAGE_SELECTOR);
    let spans: Vec<_> = doc.html().select(&selector).collect();

    if spans.is_empty() {
        return Err(EtrackError::PagerNotFound);
    }

    let text: String = spans
        .iter()
        .flat_map(|span| span.text())
        .collect::<String>()
        .trim()
        .to_owned();

    text.parse()
        .map_err(|_| EtrackError::InvalidPageNumber { text })
}

/// Collects the visible pager entries of `doc`, in display order.
#[must_use]
pub fn pager_entries(doc: &Document) -> Vec<PagerEntry> {
    let selector = builtin_selector(PAGER_ENTRY_SELECTOR);

    doc.html()
        .select(&selector)
        .map(|element| {
            let label = PagerLabel::parse(&element.text().collect::<String>());
            let control = if element.value().name() == "a" {
                PagerControl::Link {
                    href: element.value().attr("href").map(str::to_owned),
                }
            } else {
                PagerControl::Current
            };
            PagerEntry { label, control }
        })
        .collect()
}

/// Picks the entry that leads to page `target`, returning its index.
///
/// With `min`/`max` the smallest/largest numbered entries (0 if there are
/// none):
///
/// 1. `target == min - 1` and the first entry is `...` → the first entry.
/// 2. `min <= target <= max` → the entry numbered `target`, if shown.
/// 3. `target == max + 1` and the last entry is `...` → the last entry.
/// 4. Otherwise nothing.
#[must_use]
pub fn resolve(entries: &[PagerEntry], target: u32) -> Option<usize> {
    let numbers = entries.iter().filter_map(|entry| entry.label.number());
    let min_page = numbers.clone().min().unwrap_or(0);
    let max_page = numbers.max().unwrap_or(0);

    let first_is_ellipsis = entries.first().is_some_and(|e| e.label.is_ellipsis());
    let last_is_ellipsis = entries.last().is_some_and(|e| e.label.is_ellipsis());

    if min_page.checked_sub(1) == Some(target) && first_is_ellipsis {
        Some(0)
    } else if (min_page..=max_page).contains(&target) {
        entries
            .iter()
            .position(|entry| entry.label == PagerLabel::Number(target))
    } else if max_page.checked_add(1) == Some(target) && last_is_ellipsis {
        Some(entries.len() - 1)
    } else {
        None
    }
}

/// Finds the pager control that leads to page `target`, if one is visible.
#[must_use]
pub fn find_control_for_page(doc: &Document, target: u32) -> Option<PagerEntry> {
    let mut entries = pager_entries(doc);
    let index = resolve(&entries, target)?;
    log::debug!("Page {target} is reached through pager entry {index}");
    Some(entries.swap_remove(index))
}

/// Works out how to get to the page after the current one.
///
/// Returns `Ok(None)` once the last page has been reached.
///
/// # Errors
///
/// Returns the errors of [`current_page_number`], and
/// [`EtrackError::InvalidUrl`] if the next page link cannot be resolved.
pub fn advance(doc: &Document) -> Result<Option<NavigationAction>, EtrackError> {
    let current = current_page_number(doc)?;
    let Some(target) = current.checked_add(1) else {
        return Ok(None);
    };

    let Some(entry) = find_control_for_page(doc, target) else {
        log::info!("Page {current} is the last page");
        return Ok(None);
    };

    let action = NavigationAction::from_entry(doc, &entry)?;
    if action.is_none() {
        log::warn!("Pager entry for page {target} cannot be activated: {entry:?}");
    }
    Ok(action)
}
