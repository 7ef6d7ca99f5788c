use sha2::{Digest, Sha256};

use crate::types::kind::{ModeTable, PiiKind, RedactionMode};
use crate::types::span::Span;

/// Character used by [`RedactionMode::Mask`].
pub const MASK_CHAR: char = '█';

/// Number of hex digits of the value digest kept in a hash tag.
const TAG_HEX_LEN: usize = 8;

/// Deterministic tag for a matched value: `[[KIND:xxxxxxxx]]`.
///
/// The suffix is the first 8 hex digits of SHA-256 over the value itself, so
/// repeated occurrences correlate across documents without exposing it.
pub fn hash_tag(kind: PiiKind, value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    format!("[[{}:{}]]", kind.tag(), &digest[..TAG_HEX_LEN])
}

/// Replacement text for one span under `mode`.
pub fn replacement(span: &Span, mode: RedactionMode) -> String {
    match mode {
        RedactionMode::Hash => hash_tag(span.kind, &span.value),
        RedactionMode::Mask => std::iter::repeat(MASK_CHAR)
            .take(span.value.chars().count())
            .collect(),
        RedactionMode::Drop => String::new(),
    }
}

/// Rewrite `text`, replacing each resolved span according to its kind's mode.
///
/// `spans` must be ascending and non-overlapping, as produced by
/// [`crate::resolve::resolve_spans`]. Text between spans is copied unchanged.
pub fn apply_redactions(text: &str, spans: &[Span], modes: &ModeTable) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;

    for span in spans {
        let range = &span.byte_range;
        // Out-of-order or overlapping input would slice backwards; skip it.
        if range.start < cursor || !text.get(range.clone()).is_some_and(|v| v == span.value) {
            continue;
        }
        out.push_str(&text[cursor..range.start]);
        out.push_str(&replacement(span, modes.mode_for(span.kind)));
        cursor = range.end;
    }
    out.push_str(&text[cursor..]);

    out
}
