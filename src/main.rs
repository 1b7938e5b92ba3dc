use anyhow::{bail, Context, Result};
use sheetblocks::{Engine, EngineConfig};
use std::env;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Diagnostic CLI over the extraction engine: prints the same JSON the
/// dashboard's HTTP layer would serve.
///
///   sheetblocks <workbook.xlsx> dates
///   sheetblocks <workbook.xlsx> blocks [YYYY-MM-DD]
///   sheetblocks <workbook.xlsx> metrics
fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    // ─── 2) parse args ───────────────────────────────────────────────
    let args: Vec<String> = env::args().skip(1).collect();
    let (source, command, date_arg) = match args.as_slice() {
        [source, command] => (source, command.as_str(), None),
        [source, command, date] => (source, command.as_str(), Some(date.as_str())),
        _ => bail!("usage: sheetblocks <workbook.xlsx> <dates|blocks|metrics> [YYYY-MM-DD]"),
    };

    let engine = Engine::new(EngineConfig {
        source: source.into(),
        ..EngineConfig::default()
    });
    info!(%source, command, "starting");

    // ─── 3) run the requested operation ──────────────────────────────
    let output = match command {
        "dates" => {
            let dates: Vec<String> = engine
                .list_all_dates()?
                .iter()
                .map(|d| d.format("%Y-%m-%d").to_string())
                .collect();
            serde_json::to_string_pretty(&serde_json::json!({ "dates": dates }))?
        }
        "blocks" => {
            let requested = date_arg
                .map(|raw| engine.parse_request_date(raw))
                .transpose()
                .context("bad date argument")?;
            let blocks = engine.build_blocks(requested)?;
            serde_json::to_string_pretty(&serde_json::json!({ "blocks": blocks }))?
        }
        "metrics" => serde_json::to_string_pretty(&engine.header_metrics())?,
        other => bail!("unknown command {other:?}; expected dates, blocks or metrics"),
    };

    println!("{output}");
    Ok(())
}
