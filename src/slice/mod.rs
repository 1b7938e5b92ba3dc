// src/slice/mod.rs
//
// Picks the row subset representing "the" date slice of a sheet. Two
// deployments of the dashboard disagreed on what a requested date means, so
// both behaviors live here behind one switch.

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use crate::shape::rows_by_date;
use crate::workbook::Sheet;

/// How a requested date maps onto the dates actually present on a sheet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlicePolicy {
    /// Primary behavior: an exact hit is used as-is; a miss resolves to the
    /// nearest date at or before the requested one, falling back to the
    /// latest date on the sheet when everything present is later.
    #[default]
    NearestPrior,
    /// Legacy behavior: a requested date must match exactly (a miss yields an
    /// empty slice), and without a request the latest date is used.
    ExactOnly,
}

/// Select the display slice for one sheet.
///
/// Returns row indices (original order) and the resolved slice date. Sheets
/// without a date column keep all their rows and resolve no date; rows whose
/// every cell is null are dropped later, at display time, regardless of
/// slice. Deterministic for identical inputs.
pub fn select(
    sheet: &Sheet,
    date_col: Option<usize>,
    requested: Option<NaiveDate>,
    policy: SlicePolicy,
) -> (Vec<usize>, Option<NaiveDate>) {
    let all_rows = || (0..sheet.rows.len()).collect::<Vec<_>>();

    let Some(col) = date_col else {
        return (all_rows(), None);
    };

    let by_date = rows_by_date(sheet, col);
    let Some(latest) = by_date.keys().next_back().copied() else {
        return (all_rows(), None);
    };

    let resolved = match (policy, requested) {
        (_, None) => Some(latest),
        (SlicePolicy::NearestPrior, Some(wanted)) => {
            if by_date.contains_key(&wanted) {
                Some(wanted)
            } else {
                // Nearest date at or before the request, else latest overall.
                let prior = by_date.range(..=wanted).next_back().map(|(d, _)| *d);
                Some(prior.unwrap_or(latest))
            }
        }
        (SlicePolicy::ExactOnly, Some(wanted)) => by_date.contains_key(&wanted).then_some(wanted),
    };

    debug!(sheet = %sheet.name, ?requested, ?resolved, "slice resolved");

    let rows = resolved
        .and_then(|date| by_date.get(&date).cloned())
        .unwrap_or_default();
    (rows, resolved)
}
