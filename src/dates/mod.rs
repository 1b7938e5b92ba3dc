// src/dates/mod.rs
//
// Universal date reader for workbook cells. Reports arrive with dates typed
// as real datetimes on some sheets and as free-text on others, in several
// shapes at once: "2025-12-08", "08.12.2025", "8.12.2025", "08.12.25",
// "08-12-2025", "08/12/2025", "08.12.2025 г." and so on.

use chrono::{Datelike, NaiveDate};

use crate::workbook::Cell;

#[derive(Clone, Copy, Debug)]
enum FieldOrder {
    YearFirst,
    DayFirst,
}

/// One recognized layout: separator, field order, and the exact number of
/// digits the year field must have. Two-digit years are widened afterwards.
#[derive(Clone, Copy, Debug)]
struct DateFormat {
    sep: char,
    order: FieldOrder,
    year_digits: usize,
}

/// Ordered chain of layouts tried against each candidate string:
/// YYYY-MM-DD, YYYY/MM/DD, DD.MM.YYYY, DD.MM.YY, DD-MM-YYYY, DD-MM-YY,
/// DD/MM/YYYY, DD/MM/YY. The year width is strict, so "08/12/25" never
/// satisfies the year-first layouts and falls through to DD/MM/YY.
const FORMATS: &[DateFormat] = &[
    DateFormat { sep: '-', order: FieldOrder::YearFirst, year_digits: 4 },
    DateFormat { sep: '/', order: FieldOrder::YearFirst, year_digits: 4 },
    DateFormat { sep: '.', order: FieldOrder::DayFirst, year_digits: 4 },
    DateFormat { sep: '.', order: FieldOrder::DayFirst, year_digits: 2 },
    DateFormat { sep: '-', order: FieldOrder::DayFirst, year_digits: 4 },
    DateFormat { sep: '-', order: FieldOrder::DayFirst, year_digits: 2 },
    DateFormat { sep: '/', order: FieldOrder::DayFirst, year_digits: 4 },
    DateFormat { sep: '/', order: FieldOrder::DayFirst, year_digits: 2 },
];

/// Map a two-digit year onto 2000..2099, unconditionally: `25` becomes 2025 and
/// `99` becomes 2099. No windowing. Kept as its own function so the range can be
/// adjusted in one place if that ever turns out wrong.
pub fn widen_two_digit_year(date: NaiveDate) -> NaiveDate {
    let year = date.year();
    if (0..100).contains(&year) {
        date.with_year(2000 + year).unwrap_or(date)
    } else {
        date
    }
}

/// Interpret one cell as a calendar date, or decide it is not one.
///
/// Native datetimes pass through with the time of day discarded. Text goes
/// through [`normalize_text`]. Numbers are never treated as date serials;
/// bools and blanks are never dates.
pub fn normalize_cell(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::DateTime(dt) => Some(dt.date()),
        Cell::Text(s) => normalize_text(s),
        _ => None,
    }
}

/// Interpret free text as a calendar date.
///
/// Russian era suffixes ("года", "год", "г.", bare "г") are stripped, then
/// every character that is not a digit, `.`, `-`, `/`, `:` or space. If the
/// remainder carries a time part ("08.12.2025 14:30"), the full string is
/// tried against every layout before the date-only prefix is tried at all;
/// ties break on layout order, not candidate order.
pub fn normalize_text(text: &str) -> Option<NaiveDate> {
    let stripped = text
        .trim()
        .replace("года", "")
        .replace("год", "")
        .replace("г.", " ")
        .replace('г', " ");

    let cleaned: String = stripped
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '/' | ':' | ' '))
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }

    let mut candidates: Vec<&str> = vec![cleaned];
    if let Some(prefix) = cleaned.split(' ').next() {
        if prefix != cleaned {
            candidates.push(prefix);
        }
    }

    for candidate in candidates {
        for format in FORMATS {
            if let Some(date) = try_format(candidate, format) {
                return Some(widen_two_digit_year(date));
            }
        }
    }
    None
}

/// Attempt one layout: exactly three all-digit fields around the separator,
/// the year field at its exact width, day and month at one or two digits.
/// Calendar validity (month range, leap days) comes from `from_ymd_opt`.
fn try_format(candidate: &str, format: &DateFormat) -> Option<NaiveDate> {
    let mut fields = candidate.split(format.sep);
    let first = fields.next()?;
    let middle = fields.next()?;
    let last = fields.next()?;
    if fields.next().is_some() {
        return None;
    }

    let (year, month, day) = match format.order {
        FieldOrder::YearFirst => (first, middle, last),
        FieldOrder::DayFirst => (last, middle, first),
    };
    if year.len() != format.year_digits || !is_digits(year) {
        return None;
    }
    if !(1..=2).contains(&month.len()) || !is_digits(month) {
        return None;
    }
    if !(1..=2).contains(&day.len()) || !is_digits(day) {
        return None;
    }

    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
