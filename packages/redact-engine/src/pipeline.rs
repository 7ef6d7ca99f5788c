//! Redaction pipeline.
//!
//! The engine orchestrates:
//! - Extraction (plain text or PDF, with first-page layout)
//! - Normalization
//! - Detection (patterns, layout name, optional flagger)
//! - Resolution of overlapping spans
//! - Redaction and report persistence

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::RedactOptions;
use crate::detect::{detect_layout_name, detect_patterns, run_flagger};
use crate::error::{RedactError, Result};
use crate::extract::extract;
use crate::normalize::normalize;
use crate::redact::apply_redactions;
use crate::report::{
    count_by_kind, default_output_base, fingerprint, output_paths, write_atomically, Report,
};
use crate::resolve::resolve_spans;
use crate::traits::flagger::Flagger;
use crate::types::kind::{ModeTable, PiiKind};
use crate::types::layout::{LayoutCandidate, LayoutLine};
use crate::types::span::Span;

/// Outcome of one redaction run.
#[derive(Debug, Clone, Serialize)]
pub struct RedactionResult {
    /// Normalized text with every resolved span replaced
    pub redacted: String,
    /// SHA-256 of the original document content
    pub fingerprint: String,
    /// Resolved spans, ascending and non-overlapping, over the normalized text
    pub spans: Vec<Span>,
    pub counts: BTreeMap<PiiKind, usize>,
    pub layout_candidate: Option<LayoutCandidate>,
    pub modes: ModeTable,
    /// Set once `<base>.redacted.txt` has been written
    pub redacted_path: Option<PathBuf>,
    /// Set once `<base>.pii.report.json` has been written
    pub report_path: Option<PathBuf>,
}

impl RedactionResult {
    /// Audit report for this result.
    pub fn report(&self, source: Option<&Path>, preview_limit: usize) -> Report {
        Report::build(
            source,
            &self.fingerprint,
            &self.spans,
            &self.modes,
            self.layout_candidate.as_ref(),
            preview_limit,
        )
    }
}

/// The redaction engine.
///
/// Holds only invocation options and an optional flagger; every call is
/// independent of the ones before it.
#[derive(Clone, Default)]
pub struct Engine {
    options: RedactOptions,
    flagger: Option<Arc<dyn Flagger>>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("options", &self.options)
            .field("flagger", &self.flagger.as_ref().map(|fl| fl.name()))
            .finish()
    }
}

impl Engine {
    pub fn new(options: RedactOptions) -> Self {
        Self {
            options,
            flagger: None,
        }
    }

    /// Attach an external flagger.
    pub fn with_flagger(mut self, flagger: Arc<dyn Flagger>) -> Self {
        self.flagger = Some(flagger);
        self
    }

    /// Redact a document on disk and, unless disabled, persist the outputs.
    ///
    /// Unreadable or corrupt input fails before anything is written. If the
    /// outputs cannot be written, [`RedactError::Persist`] carries the
    /// finished result.
    pub async fn redact_file(&self, path: &Path) -> Result<RedactionResult> {
        let document = extract(path).await?;
        debug!(
            path = %path.display(),
            bytes = document.raw.len(),
            pdf = document.is_pdf,
            layout_lines = document.layout_lines.len(),
            "extracted document"
        );

        let layout_lines = if document.is_pdf && self.options.layout_names {
            Some(document.layout_lines.as_slice())
        } else {
            None
        };
        let mut result = self.run(&document.raw, &document.text, layout_lines).await;

        if !self.options.write_outputs {
            return Ok(result);
        }

        let base = self
            .options
            .output_base
            .clone()
            .unwrap_or_else(|| default_output_base(path));
        let (redacted_path, report_path) = output_paths(&base);

        let report = result.report(Some(path), self.options.preview_limit);
        let json = serde_json::to_vec_pretty(&report)?;

        let written = write_atomically(vec![
            (redacted_path.clone(), result.redacted.clone().into_bytes()),
            (report_path.clone(), json),
        ])
        .await;

        match written {
            Ok(()) => {
                info!(
                    path = %path.display(),
                    spans = result.spans.len(),
                    redacted = %redacted_path.display(),
                    report = %report_path.display(),
                    "redacted document"
                );
                result.redacted_path = Some(redacted_path);
                result.report_path = Some(report_path);
                Ok(result)
            }
            Err((path, source)) => Err(RedactError::Persist {
                path,
                source,
                result: Box::new(result),
            }),
        }
    }

    /// Redact text held in memory. No layout detection, nothing written.
    pub async fn redact_text(&self, raw: &str) -> RedactionResult {
        self.run(raw.as_bytes(), raw, None).await
    }

    async fn run(
        &self,
        raw: &[u8],
        text: &str,
        layout_lines: Option<&[LayoutLine]>,
    ) -> RedactionResult {
        let normalized = normalize(text);

        let mut candidates = detect_patterns(&normalized);
        let pattern_count = candidates.len();

        let layout_candidate = match layout_lines {
            Some(lines) => match guard_layout(|| detect_layout_name(&normalized, lines)) {
                Some((span, candidate)) => {
                    candidates.push(span);
                    Some(candidate)
                }
                None => None,
            },
            None => None,
        };

        if let Some(flagger) = &self.flagger {
            let flagged =
                run_flagger(flagger.as_ref(), &normalized, self.options.flagger_timeout).await;
            candidates.extend(flagged);
        }

        let candidate_count = candidates.len();
        let spans = resolve_spans(candidates);
        debug!(
            patterns = pattern_count,
            layout = layout_candidate.is_some(),
            candidates = candidate_count,
            resolved = spans.len(),
            "resolved spans"
        );

        let modes = self.options.modes();
        let redacted = apply_redactions(&normalized, &spans, &modes);

        RedactionResult {
            redacted,
            fingerprint: fingerprint(raw),
            counts: count_by_kind(&spans),
            spans,
            layout_candidate,
            modes,
            redacted_path: None,
            report_path: None,
        }
    }
}

/// Run the layout heuristic, degrading to "no candidate" if it panics.
fn guard_layout<F>(detect: F) -> Option<(Span, LayoutCandidate)>
where
    F: FnOnce() -> Option<(Span, LayoutCandidate)>,
{
    match catch_unwind(AssertUnwindSafe(detect)) {
        Ok(found) => found,
        Err(_) => {
            warn!("layout name detection panicked, continuing without it");
            None
        }
    }
}
