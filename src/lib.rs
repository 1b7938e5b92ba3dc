//! Spreadsheet-to-block extraction engine for a reporting dashboard.
//!
//! Reads a multi-sheet `.xlsx` workbook of heterogeneous tabular reports and
//! exposes it as normalized JSON "blocks": one block per sheet, filtered to a
//! single date slice, with day-over-day values attached for one designated
//! sheet. Everything is derived fresh from the workbook on each call; this
//! crate never caches and never writes to the source file.

pub mod blocks;
pub mod dates;
pub mod delta;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod shape;
pub mod slice;
pub mod workbook;

pub use blocks::{Block, DeltaSection};
pub use engine::{Engine, EngineConfig};
pub use error::{ExtractError, Result};
pub use metrics::HeaderMetrics;
pub use slice::SlicePolicy;
pub use workbook::{Cell, Sheet};
