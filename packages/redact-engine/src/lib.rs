//! Local PII Detection and Redaction Engine
//!
//! Takes a plain-text or PDF document, finds personally identifiable
//! information with several independent detectors, merges their findings into
//! one non-overlapping span set and writes a redacted copy plus a JSON audit
//! report.
//!
//! # Pipeline
//!
//! 1. Extract text (and, for PDFs, first-page layout lines)
//! 2. Normalize (NFKC, `(at)`/`[dot]` rewriting, whitespace collapsing)
//! 3. Detect with fixed patterns, the layout name heuristic and an optional
//!    external [`Flagger`]
//! 4. Resolve overlapping spans
//! 5. Redact each span as a hash tag, a mask or nothing at all
//! 6. Report counts, fingerprint and a preview of hits
//!
//! Detection is heuristic. It finds common PII; it does not certify that none
//! remains.
//!
//! # Usage
//!
//! ```rust,ignore
//! use redact_engine::{Engine, PiiKind, RedactOptions, RedactionMode};
//!
//! let options = RedactOptions::default().with_mode(PiiKind::Email, RedactionMode::Mask);
//! let engine = Engine::new(options);
//!
//! // Writes resume.redacted.txt and resume.pii.report.json next to the input
//! let result = engine.redact_file(Path::new("resume.pdf")).await?;
//! println!("{} spans, fingerprint {}", result.spans.len(), result.fingerprint);
//! ```
//!
//! # Modules
//!
//! - [`extract`] - Plain text and PDF decoding, layout lines
//! - [`normalize`] - Text canonicalization
//! - [`detect`] - Pattern, layout name and flagger detectors
//! - [`resolve`] - Overlap resolution
//! - [`redact`] - Mode application and hash tags
//! - [`report`] - Fingerprint, counts, report and atomic writes
//! - [`pipeline`] - The [`Engine`] tying it together
//! - [`testing`] - Mock flaggers for testing

pub mod config;
pub mod detect;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod pipeline;
pub mod redact;
pub mod report;
pub mod resolve;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use config::{Config, RedactOptions};
pub use error::{FlaggerError, RedactError, Result};
pub use traits::flagger::{FlagProposal, Flagger};
pub use types::{
    kind::{parse_mode_overrides, ModeTable, PiiKind, RedactionMode},
    layout::{LayoutCandidate, LayoutLine},
    span::{Span, SpanSource},
};

// Re-export the engine
pub use pipeline::{Engine, RedactionResult};

// Re-export pipeline stages
pub use detect::{detect_layout_name, detect_patterns, proposals_to_spans, run_flagger};
pub use extract::{extract, ExtractedDocument};
pub use normalize::normalize;
pub use redact::{apply_redactions, hash_tag, MASK_CHAR};
pub use report::{fingerprint, output_paths, Report, REDACTED_SUFFIX, REPORT_SUFFIX};
pub use resolve::resolve_spans;
