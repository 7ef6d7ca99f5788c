//! CLI for redacting a single document
//!
//! Writes `<base>.redacted.txt` and `<base>.pii.report.json`, then prints the
//! output paths and per-kind counts. Environment configuration (see
//! `redact_engine::Config`) is applied first; flags override it.

use anyhow::{Context, Result};
use clap::Parser;
use redact_engine::{parse_mode_overrides, Config, Engine, RedactError};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "redact")]
#[command(about = "Detect and redact PII in a text or PDF document")]
struct Cli {
    /// Document to redact (.pdf or UTF-8 text)
    input: PathBuf,

    /// Output base path (default: input without its extension)
    #[arg(long)]
    out_base: Option<PathBuf>,

    /// Mode override, e.g. `--mode email=mask` (repeatable)
    #[arg(long = "mode", value_name = "KIND=MODE")]
    modes: Vec<String>,

    /// Skip layout-based name detection
    #[arg(long)]
    no_layout: bool,

    /// Number of spans to preview in the report
    #[arg(long, value_name = "N")]
    preview: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,redact_engine=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    let mut options = Config::from_env()
        .context("Failed to load configuration from environment")?
        .options;

    for value in &cli.modes {
        let overrides =
            parse_mode_overrides(value).with_context(|| format!("Invalid --mode value: {value}"))?;
        options.mode_overrides.extend(overrides);
    }
    if let Some(base) = cli.out_base {
        options.output_base = Some(base);
    }
    if cli.no_layout {
        options.layout_names = false;
    }
    if let Some(limit) = cli.preview {
        options.preview_limit = limit;
    }

    let engine = Engine::new(options);
    let result = match engine.redact_file(&cli.input).await {
        Ok(result) => result,
        Err(RedactError::Persist { path, source, .. }) => {
            anyhow::bail!(
                "Redaction finished but {} could not be written: {}",
                path.display(),
                source
            );
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to redact {}", cli.input.display()));
        }
    };

    if let Some(path) = &result.redacted_path {
        println!("redacted: {}", path.display());
    }
    if let Some(path) = &result.report_path {
        println!("report:   {}", path.display());
    }
    println!("fingerprint: {}", result.fingerprint);
    if result.counts.is_empty() {
        println!("no PII found");
    }
    for (kind, count) in &result.counts {
        println!("  {kind}: {count}");
    }

    Ok(())
}
