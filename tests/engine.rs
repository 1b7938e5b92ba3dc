//! End-to-end checks over a real workbook on disk: write a fixture with
//! rust_xlsxwriter, then drive every engine entry point against it.

use anyhow::Result;
use chrono::NaiveDate;
use rust_xlsxwriter::Workbook;
use sheetblocks::{Engine, EngineConfig, ExtractError, SlicePolicy};
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn init_tracing() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Four sheets covering the interesting shapes: a rates sheet, the delta
/// sheet, an undated reference sheet and a completely empty one. Dates are
/// written as the text variants the reports actually contain.
fn write_fixture(path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();

    let rates = workbook.add_worksheet();
    rates.set_name("Курсы")?;
    for (col, name) in ["Дата", "Курс USD", "Brent"].iter().enumerate() {
        rates.write_string(0, col as u16, *name)?;
    }
    rates.write_string(1, 0, "05.12.2025")?;
    rates.write_number(1, 1, 80.0)?;
    rates.write_number(1, 2, 70.0)?;
    rates.write_string(2, 0, "08.12.2025 г.")?;
    rates.write_number(2, 1, 1278.5)?;
    rates.write_number(2, 2, 72.1)?;

    let competitors = workbook.add_worksheet();
    competitors.set_name("Конкуренты")?;
    for (col, name) in ["Дата", "Продукт", "Price"].iter().enumerate() {
        competitors.write_string(0, col as u16, *name)?;
    }
    competitors.write_string(1, 0, "05.12.2025")?;
    competitors.write_string(1, 1, "Widget A")?;
    competitors.write_number(1, 2, 10.0)?;
    competitors.write_string(2, 0, "08.12.2025")?;
    competitors.write_string(2, 1, "Widget A")?;
    competitors.write_number(2, 2, 12.0)?;

    let stock = workbook.add_worksheet();
    stock.set_name("Остатки")?;
    stock.write_string(0, 0, "Товар")?;
    stock.write_string(0, 1, "Кол-во")?;
    stock.write_string(1, 0, "Болт")?;
    stock.write_number(1, 1, 120.0)?;

    let empty = workbook.add_worksheet();
    empty.set_name("Пусто")?;

    workbook.save(path)?;
    Ok(())
}

fn fixture_engine(dir: &Path) -> Result<(Engine, PathBuf)> {
    let path = dir.join("board.xlsx");
    write_fixture(&path)?;
    Ok((Engine::with_source(&path), path))
}

#[test]
fn archive_dates_are_unique_and_descending() -> Result<()> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let (engine, _) = fixture_engine(dir.path())?;

    // Both dates occur on two sheets; they must come back once each.
    let dates = engine.list_all_dates()?;
    assert_eq!(dates, vec![d(2025, 12, 8), d(2025, 12, 5)]);
    Ok(())
}

#[test]
fn latest_blocks_cover_every_sheet_shape() -> Result<()> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let (engine, _) = fixture_engine(dir.path())?;

    let blocks = engine.build_blocks(None)?;
    assert_eq!(blocks.len(), 4);

    let rates = &blocks[0];
    assert_eq!(rates.sheet_name, "Курсы");
    assert_eq!(rates.columns, vec!["Дата", "Курс USD", "Brent"]);
    assert_eq!(rates.rows.len(), 1);
    assert_eq!(rates.rows[0][0], serde_json::json!("2025-12-08"));
    assert_eq!(rates.numeric_columns, vec![1, 2]);

    let competitors = &blocks[1];
    let delta = competitors.delta.as_ref().expect("delta section");
    assert_eq!(delta.prev_date.as_deref(), Some("2025-12-05"));
    assert_eq!(delta.prev_values["Widget A"]["Price"], 10.0);

    let stock = &blocks[2];
    assert!(stock.delta.is_none());
    assert_eq!(stock.rows.len(), 1);
    assert_eq!(stock.numeric_columns, vec![1]);

    let empty = &blocks[3];
    assert!(empty.columns.is_empty());
    assert!(empty.rows.is_empty());
    assert!(empty.numeric_columns.is_empty());
    Ok(())
}

#[test]
fn requested_date_resolves_nearest_prior() -> Result<()> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let (engine, _) = fixture_engine(dir.path())?;

    let blocks = engine.build_blocks(Some(d(2025, 12, 6)))?;
    assert_eq!(blocks[0].rows[0][0], serde_json::json!("2025-12-05"));

    // Earlier than everything on file: falls back to the latest slice.
    let blocks = engine.build_blocks(Some(d(2025, 11, 1)))?;
    assert_eq!(blocks[0].rows[0][0], serde_json::json!("2025-12-08"));
    Ok(())
}

#[test]
fn legacy_policy_requires_an_exact_hit() -> Result<()> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("board.xlsx");
    write_fixture(&path)?;
    let engine = Engine::new(EngineConfig {
        source: path,
        policy: SlicePolicy::ExactOnly,
        ..EngineConfig::default()
    });

    let blocks = engine.build_blocks(Some(d(2025, 12, 6)))?;
    assert!(blocks[0].rows.is_empty());
    assert!(blocks[1].rows.is_empty());
    // Undated sheets are untouched by the policy.
    assert_eq!(blocks[2].rows.len(), 1);
    Ok(())
}

#[test]
fn header_metrics_format_with_space_grouping() -> Result<()> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let (engine, _) = fixture_engine(dir.path())?;

    let metrics = engine.header_metrics();
    assert_eq!(metrics.usd_rate.as_deref(), Some("1 278,50"));
    assert_eq!(metrics.brent_price.as_deref(), Some("72,10"));
    Ok(())
}

#[test]
fn missing_file_and_malformed_date_are_distinct_failures() -> Result<()> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let gone = Engine::with_source(dir.path().join("nope.xlsx"));

    assert!(matches!(
        gone.build_blocks(None),
        Err(ExtractError::MissingSource { .. })
    ));
    assert!(matches!(
        gone.parse_request_date("08.13.2025"),
        Err(ExtractError::MalformedDate(_))
    ));
    // Metrics swallow the missing file entirely.
    let metrics = gone.header_metrics();
    assert_eq!(metrics.usd_rate, None);
    assert_eq!(metrics.brent_price, None);
    Ok(())
}
