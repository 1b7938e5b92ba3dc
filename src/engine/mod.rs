// src/engine/mod.rs
//
// Configured facade over the extraction pipeline. Every call reopens and
// fully re-parses the backing workbook. There is deliberately no cache, so
// a changed file is visible on the next call. Callers that need speed can
// cache the returned blocks themselves.

use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::blocks::{build_blocks, Block};
use crate::dates::normalize_text;
use crate::error::{ExtractError, Result};
use crate::metrics::{self, HeaderMetrics};
use crate::shape::{find_date_column, rows_by_date};
use crate::slice::SlicePolicy;
use crate::workbook::{load_sheets, Sheet};

/// Engine settings. Everything has a sensible default for the standard
/// deployment; override per instance or deserialize from a config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Path to the backing `.xlsx` workbook.
    pub source: PathBuf,
    /// Sheet that gets previous-period values attached to its block.
    pub delta_sheet: String,
    /// Sheet feeding the header metrics.
    pub rates_sheet: String,
    /// How requested dates resolve against the dates present on a sheet.
    pub policy: SlicePolicy,
    /// Lowercased substrings identifying the row-identifier column on the
    /// delta sheet.
    pub identifier_markers: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            source: PathBuf::from("data/dashboard_data.xlsx"),
            delta_sheet: "Конкуренты".to_string(),
            rates_sheet: "Курсы".to_string(),
            policy: SlicePolicy::default(),
            identifier_markers: vec!["продукт".to_string(), "номенклат".to_string()],
        }
    }
}

/// Stateless, synchronous extraction engine. Holds configuration only, so
/// clones are cheap and concurrent use needs no locking.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Engine { config }
    }

    /// Engine over `source` with every other setting at its default.
    pub fn with_source(source: impl Into<PathBuf>) -> Self {
        Engine::new(EngineConfig {
            source: source.into(),
            ..EngineConfig::default()
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn load(&self) -> Result<Vec<Sheet>> {
        if !self.config.source.exists() {
            return Err(ExtractError::MissingSource {
                path: self.config.source.clone(),
            });
        }
        load_sheets(&self.config.source)
    }

    /// Every date present in any sheet's date column, unique, descending.
    #[tracing::instrument(level = "info", skip(self))]
    pub fn list_all_dates(&self) -> Result<Vec<NaiveDate>> {
        let sheets = self.load()?;

        let mut dates = BTreeSet::new();
        for sheet in &sheets {
            if sheet.rows.is_empty() {
                continue;
            }
            if let Some(col) = find_date_column(sheet) {
                dates.extend(rows_by_date(sheet, col).into_keys());
            }
        }
        info!(count = dates.len(), "collected archive dates");
        Ok(dates.into_iter().rev().collect())
    }

    /// One block per sheet. `requested = None` means "latest per sheet".
    #[tracing::instrument(level = "info", skip(self))]
    pub fn build_blocks(&self, requested: Option<NaiveDate>) -> Result<Vec<Block>> {
        let sheets = self.load()?;
        Ok(build_blocks(
            &sheets,
            requested,
            self.config.policy,
            &self.config.delta_sheet,
            &self.config.identifier_markers,
        ))
    }

    /// Header summary off the rates sheet. Never fails: a missing file, a
    /// missing sheet or malformed rows all degrade to both fields absent.
    #[tracing::instrument(level = "info", skip(self))]
    pub fn header_metrics(&self) -> HeaderMetrics {
        match self.load() {
            Ok(sheets) => metrics::header_metrics(&sheets, &self.config.rates_sheet),
            Err(err) => {
                warn!(%err, "header metrics degraded to empty");
                HeaderMetrics::default()
            }
        }
    }

    /// Parse a caller-supplied date string through the same normalizer the
    /// cells go through. Malformed input is a client error, distinct from a
    /// missing workbook.
    pub fn parse_request_date(&self, raw: &str) -> Result<NaiveDate> {
        normalize_text(raw).ok_or_else(|| ExtractError::MalformedDate(raw.to_string()))
    }
}
