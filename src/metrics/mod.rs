// src/metrics/mod.rs
//
// Header summary for the dashboard: the latest USD rate and Brent price off
// the dedicated rates sheet. Best effort only: anything malformed or absent
// degrades to `None`, never to an error.

use serde::Serialize;
use tracing::debug;

use crate::dates::normalize_cell;
use crate::workbook::{Cell, Sheet};

/// Columns matching these claim the USD / Brent metric, first match wins.
const USD_MARKERS: &[&str] = &["usd", "доллар"];
const BRENT_MARKERS: &[&str] = &["brent", "брент"];
/// The date column, by contrast, is the LAST header matching these.
const DATE_MARKERS: &[&str] = &["дата", "date"];

/// The two formatted display strings shown outside any block.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HeaderMetrics {
    pub usd_rate: Option<String>,
    pub brent_price: Option<String>,
}

/// Pull both metrics from the rates sheet, or come back empty-handed.
pub fn header_metrics(sheets: &[Sheet], rates_sheet_name: &str) -> HeaderMetrics {
    let Some(sheet) = sheets.iter().find(|s| s.name == rates_sheet_name) else {
        debug!(rates_sheet_name, "rates sheet missing");
        return HeaderMetrics::default();
    };
    if sheet.rows.is_empty() {
        return HeaderMetrics::default();
    }

    let mut usd_idx = None;
    let mut brent_idx = None;
    let mut date_idx = None;
    for (idx, name) in sheet.columns.iter().enumerate() {
        let name = name.trim().to_lowercase();
        if usd_idx.is_none() && USD_MARKERS.iter().any(|m| name.contains(m)) {
            usd_idx = Some(idx);
        }
        if brent_idx.is_none() && BRENT_MARKERS.iter().any(|m| name.contains(m)) {
            brent_idx = Some(idx);
        }
        if DATE_MARKERS.iter().any(|m| name.contains(m)) {
            date_idx = Some(idx);
        }
    }

    let Some(target) = target_row(sheet, date_idx) else {
        return HeaderMetrics::default();
    };

    HeaderMetrics {
        usd_rate: usd_idx.and_then(|idx| format_metric(&target[idx])),
        brent_price: brent_idx.and_then(|idx| format_metric(&target[idx])),
    }
}

/// Row with the maximum parseable date (strict `>`, so the first occurrence
/// of a tied date wins); otherwise, and also without a date column, the last row
/// with any non-null cell.
fn target_row<'a>(sheet: &'a Sheet, date_idx: Option<usize>) -> Option<&'a Vec<Cell>> {
    if let Some(col) = date_idx {
        let mut latest = None;
        let mut target = None;
        for row in &sheet.rows {
            if let Some(date) = normalize_cell(&row[col]) {
                if latest.map_or(true, |seen| date > seen) {
                    latest = Some(date);
                    target = Some(row);
                }
            }
        }
        if target.is_some() {
            return target;
        }
    }
    sheet
        .rows
        .iter()
        .rev()
        .find(|row| row.iter().any(|cell| !cell.is_empty()))
}

/// Display form of one metric cell: numbers get two decimals, a space as the
/// thousands separator and a comma as the decimal separator ("1 234,56");
/// text passes through; blanks yield nothing.
fn format_metric(cell: &Cell) -> Option<String> {
    if cell.is_empty() {
        return None;
    }
    match cell.as_number() {
        Some(num) => Some(format_grouped(num)),
        None => Some(cell.display_text()),
    }
}

fn format_grouped(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(*ch);
    }

    let sign = if value.is_sign_negative() && value != 0.0 {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped},{frac_part}")
}
