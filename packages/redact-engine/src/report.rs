//! Audit report and output persistence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::types::kind::{ModeTable, PiiKind};
use crate::types::layout::LayoutCandidate;
use crate::types::span::{Span, SpanSource};

pub const REDACTED_SUFFIX: &str = ".redacted.txt";
pub const REPORT_SUFFIX: &str = ".pii.report.json";

/// SHA-256 of the original document content, as lowercase hex.
pub fn fingerprint(raw: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw);
    format!("{:x}", hasher.finalize())
}

/// Number of resolved spans per kind. Kinds with no spans are absent.
pub fn count_by_kind(spans: &[Span]) -> BTreeMap<PiiKind, usize> {
    let mut counts = BTreeMap::new();
    for span in spans {
        *counts.entry(span.kind).or_insert(0) += 1;
    }
    counts
}

/// One of the earliest resolved spans, as shown in the report.
///
/// `start` and `end` are char offsets into the normalized text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewEntry {
    pub kind: PiiKind,
    pub source: SpanSource,
    pub start: usize,
    pub end: usize,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl From<&Span> for PreviewEntry {
    fn from(span: &Span) -> Self {
        Self {
            kind: span.kind,
            source: span.source,
            start: span.start,
            end: span.end,
            value: span.value.clone(),
            score: span.score,
        }
    }
}

/// JSON report written next to the redacted text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub source: Option<String>,
    pub fingerprint: String,
    pub generated_at: DateTime<Utc>,
    pub counts: BTreeMap<PiiKind, usize>,
    pub modes: ModeTable,
    pub total_spans: usize,
    pub layout_candidate: Option<LayoutCandidate>,
    pub preview: Vec<PreviewEntry>,
}

impl Report {
    pub fn build(
        source: Option<&Path>,
        fingerprint: &str,
        spans: &[Span],
        modes: &ModeTable,
        layout_candidate: Option<&LayoutCandidate>,
        preview_limit: usize,
    ) -> Self {
        Self {
            source: source.map(|p| p.display().to_string()),
            fingerprint: fingerprint.to_string(),
            generated_at: Utc::now(),
            counts: count_by_kind(spans),
            modes: modes.clone(),
            total_spans: spans.len(),
            layout_candidate: layout_candidate.cloned(),
            preview: spans.iter().take(preview_limit).map(PreviewEntry::from).collect(),
        }
    }
}

/// Output base for `input`: the path with its extension stripped.
pub fn default_output_base(input: &Path) -> PathBuf {
    input.with_extension("")
}

/// `<base>.redacted.txt` and `<base>.pii.report.json`.
pub fn output_paths(base: &Path) -> (PathBuf, PathBuf) {
    let with_suffix = |suffix: &str| {
        let mut name = base.as_os_str().to_owned();
        name.push(suffix);
        PathBuf::from(name)
    };
    (with_suffix(REDACTED_SUFFIX), with_suffix(REPORT_SUFFIX))
}

/// Write several files so that none of them is ever observed half-written.
///
/// Every file is staged as a temp file in its target directory; renames
/// happen only once all of them are complete. If any step fails, staged temp
/// files are deleted, files already renamed into place are removed again,
/// and the path that failed is returned with the error. Temp files are also
/// deleted if the work is abandoned midway.
pub async fn write_atomically(
    files: Vec<(PathBuf, Vec<u8>)>,
) -> std::result::Result<(), (PathBuf, std::io::Error)> {
    let fallback = files.first().map(|(path, _)| path.clone()).unwrap_or_default();

    tokio::task::spawn_blocking(move || write_all_or_nothing(&files))
        .await
        .map_err(|e| (fallback, std::io::Error::new(std::io::ErrorKind::Other, e)))?
}

fn write_all_or_nothing(
    files: &[(PathBuf, Vec<u8>)],
) -> std::result::Result<(), (PathBuf, std::io::Error)> {
    let mut staged = Vec::with_capacity(files.len());
    for (path, contents) in files {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = NamedTempFile::new_in(dir).map_err(|e| (path.clone(), e))?;
        temp.write_all(contents)
            .and_then(|()| temp.as_file().sync_all())
            .map_err(|e| (path.clone(), e))?;
        staged.push((path, temp));
    }

    let mut committed: Vec<&PathBuf> = Vec::with_capacity(staged.len());
    for (path, temp) in staged {
        if let Err(e) = temp.persist(path) {
            for done in committed {
                let _ = std::fs::remove_file(done);
            }
            return Err((path.clone(), e.error));
        }
        debug!(path = %path.display(), "wrote output");
        committed.push(path);
    }

    Ok(())
}
