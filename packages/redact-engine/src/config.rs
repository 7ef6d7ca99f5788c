//! Invocation options and environment-driven configuration.

use dotenvy::dotenv;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{RedactError, Result};
use crate::types::kind::{parse_mode_overrides, ModeTable, PiiKind, RedactionMode};

pub const DEFAULT_PREVIEW_LIMIT: usize = 12;
pub const DEFAULT_FLAGGER_TIMEOUT: Duration = Duration::from_secs(10);

/// Options for a single engine invocation.
#[derive(Debug, Clone)]
pub struct RedactOptions {
    /// Base for output file names. Default: input path without extension.
    pub output_base: Option<PathBuf>,

    /// Per-kind mode overrides laid over the defaults.
    pub mode_overrides: HashMap<PiiKind, RedactionMode>,

    /// Run the layout name detector on PDF input.
    ///
    /// Default: true.
    pub layout_names: bool,

    /// How many of the earliest spans the report previews.
    ///
    /// Default: 12.
    pub preview_limit: usize,

    /// Upper bound on a flagger call before it is abandoned.
    ///
    /// Default: 10 seconds.
    pub flagger_timeout: Duration,

    /// Write `<base>.redacted.txt` and `<base>.pii.report.json`.
    ///
    /// Default: true.
    pub write_outputs: bool,
}

impl Default for RedactOptions {
    fn default() -> Self {
        Self {
            output_base: None,
            mode_overrides: HashMap::new(),
            layout_names: true,
            preview_limit: DEFAULT_PREVIEW_LIMIT,
            flagger_timeout: DEFAULT_FLAGGER_TIMEOUT,
            write_outputs: true,
        }
    }
}

impl RedactOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output base path.
    pub fn with_output_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.output_base = Some(base.into());
        self
    }

    /// Override the mode for one kind.
    pub fn with_mode(mut self, kind: PiiKind, mode: RedactionMode) -> Self {
        self.mode_overrides.insert(kind, mode);
        self
    }

    /// Enable or disable layout-based name detection.
    pub fn with_layout_names(mut self, enabled: bool) -> Self {
        self.layout_names = enabled;
        self
    }

    /// Set the report preview length.
    pub fn with_preview_limit(mut self, limit: usize) -> Self {
        self.preview_limit = limit;
        self
    }

    /// Set the flagger timeout.
    pub fn with_flagger_timeout(mut self, timeout: Duration) -> Self {
        self.flagger_timeout = timeout;
        self
    }

    /// Keep results in memory only.
    pub fn without_outputs(mut self) -> Self {
        self.write_outputs = false;
        self
    }

    /// Effective mode table for this invocation.
    pub fn modes(&self) -> ModeTable {
        ModeTable::with_overrides(&self.mode_overrides)
    }
}

/// Engine configuration loaded from environment variables.
///
/// | Variable                    | Example              |
/// |-----------------------------|----------------------|
/// | `REDACT_MODES`              | `email=mask,id=hash` |
/// | `REDACT_PREVIEW_LIMIT`      | `12`                 |
/// | `REDACT_LAYOUT_NAMES`       | `true`               |
/// | `REDACT_FLAGGER_TIMEOUT_MS` | `10000`              |
#[derive(Debug, Clone)]
pub struct Config {
    pub options: RedactOptions,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` uses the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut options = RedactOptions::default();

        if let Some(modes) = lookup("REDACT_MODES") {
            options.mode_overrides = parse_mode_overrides(&modes)?;
        }
        if let Some(limit) = lookup("REDACT_PREVIEW_LIMIT") {
            options.preview_limit = limit.trim().parse().map_err(|_| {
                RedactError::Config(format!("REDACT_PREVIEW_LIMIT must be a number, got {limit}"))
            })?;
        }
        if let Some(enabled) = lookup("REDACT_LAYOUT_NAMES") {
            options.layout_names = parse_bool(&enabled).ok_or_else(|| {
                RedactError::Config(format!(
                    "REDACT_LAYOUT_NAMES must be true/false, got {enabled}"
                ))
            })?;
        }
        if let Some(ms) = lookup("REDACT_FLAGGER_TIMEOUT_MS") {
            let ms: u64 = ms.trim().parse().map_err(|_| {
                RedactError::Config(format!("REDACT_FLAGGER_TIMEOUT_MS must be a number, got {ms}"))
            })?;
            options.flagger_timeout = Duration::from_millis(ms);
        }

        Ok(Self { options })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
