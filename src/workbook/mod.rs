// src/workbook/mod.rs

use calamine::{open_workbook, Data, Reader, Xlsx};
use chrono::NaiveDateTime;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

use crate::error::Result;

/// One untyped scalar as it sits in the workbook. No normalization at rest;
/// date and number interpretation happen on read, in the modules that need it.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Native numeric value, if any. Bools do not count.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Int(i) => Some(*i as f64),
            Cell::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// The string a human would see in the grid. Used for header labels and
    /// for metric values that are not numbers.
    pub fn display_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Int(i) => i.to_string(),
            Cell::Float(f) => f.to_string(),
            Cell::Text(s) => s.clone(),
            Cell::Bool(b) => b.to_string(),
            Cell::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// Raw JSON scalar for the wire. Date replacement is the block builder's
    /// job, not this function's.
    pub fn to_json(&self) -> Value {
        match self {
            Cell::Empty => Value::Null,
            Cell::Int(i) => Value::from(*i),
            Cell::Float(f) => Value::from(*f),
            Cell::Text(s) => Value::from(s.clone()),
            Cell::Bool(b) => Value::from(*b),
            Cell::DateTime(dt) => Value::from(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::Int(i) => Cell::Int(*i),
            Data::Float(f) => Cell::Float(*f),
            Data::String(s) => Cell::Text(s.clone()),
            Data::Bool(b) => Cell::Bool(*b),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(naive) => Cell::DateTime(naive),
                None => Cell::Empty,
            },
            // ISO datetimes arrive as "2025-12-08T14:30:00"; swap the "T"
            // for a space so the date normalizer can split off the time part.
            Data::DateTimeIso(s) => Cell::Text(s.replace('T', " ")),
            Data::DurationIso(s) => Cell::Text(s.clone()),
            // Formula errors (#DIV/0! and friends) render as blanks.
            Data::Error(_) => Cell::Empty,
        }
    }
}

/// One named grid of rows. Row 0 of the source is the header; `rows` holds
/// only data rows, every one exactly `columns.len()` cells wide.
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    /// Build a sheet from a raw grid, aligning every data row to the header
    /// width: shorter rows are padded with `Empty`, longer rows truncated.
    pub fn from_grid(name: impl Into<String>, mut grid: Vec<Vec<Cell>>) -> Self {
        let name = name.into();
        if grid.is_empty() {
            return Sheet {
                name,
                columns: Vec::new(),
                rows: Vec::new(),
            };
        }
        let header = grid.remove(0);
        let columns: Vec<String> = header.iter().map(Cell::display_text).collect();
        let width = columns.len();

        let rows = grid
            .into_iter()
            .map(|mut row| {
                row.truncate(width);
                row.resize(width, Cell::Empty);
                row
            })
            .collect();

        Sheet {
            name,
            columns,
            rows,
        }
    }

    /// True when the sheet has no rows at all, header included.
    pub fn is_blank(&self) -> bool {
        self.columns.is_empty() && self.rows.is_empty()
    }
}

/// Open `path` and load every worksheet into the in-memory model, in workbook
/// order. The file handle is released before returning; nothing is cached.
pub fn load_sheets(path: &Path) -> Result<Vec<Sheet>> {
    let mut wb: Xlsx<_> = open_workbook(path)?;

    let mut sheets = Vec::new();
    for (name, range) in wb.worksheets() {
        let grid: Vec<Vec<Cell>> = range
            .rows()
            .map(|row| row.iter().map(Cell::from).collect())
            .collect();
        debug!(sheet = %name, rows = grid.len(), "loaded sheet");
        sheets.push(Sheet::from_grid(name, grid));
    }
    Ok(sheets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn ragged_rows_are_padded_and_truncated_to_header_width() {
        let sheet = Sheet::from_grid(
            "Отчёт",
            vec![
                vec![t("Дата"), t("Продукт"), t("Цена")],
                vec![t("08.12.2025"), t("A")],
                vec![t("08.12.2025"), t("B"), Cell::Int(5), Cell::Int(99)],
            ],
        );
        assert_eq!(sheet.columns, vec!["Дата", "Продукт", "Цена"]);
        assert_eq!(sheet.rows[0], vec![t("08.12.2025"), t("A"), Cell::Empty]);
        assert_eq!(sheet.rows[1], vec![t("08.12.2025"), t("B"), Cell::Int(5)]);
    }

    #[test]
    fn blank_header_cells_become_empty_column_names() {
        let sheet = Sheet::from_grid(
            "S",
            vec![vec![t("A"), Cell::Empty, Cell::Int(3)], vec![t("x")]],
        );
        assert_eq!(sheet.columns, vec!["A", "", "3"]);
    }

    #[test]
    fn empty_grid_yields_blank_sheet() {
        let sheet = Sheet::from_grid("S", Vec::new());
        assert!(sheet.is_blank());
    }

    #[test]
    fn iso_datetime_cells_still_read_as_dates() {
        let cell = Cell::from(&Data::DateTimeIso("2025-12-08T14:30:00".to_string()));
        assert_eq!(cell, t("2025-12-08 14:30:00"));
        assert_eq!(
            crate::dates::normalize_cell(&cell),
            chrono::NaiveDate::from_ymd_opt(2025, 12, 8)
        );
    }

    #[test]
    fn bools_are_not_numbers() {
        assert_eq!(Cell::Bool(true).as_number(), None);
        assert_eq!(Cell::Int(7).as_number(), Some(7.0));
        assert_eq!(Cell::Float(7.5).as_number(), Some(7.5));
    }
}
