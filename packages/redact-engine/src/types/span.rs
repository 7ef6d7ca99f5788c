use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

use super::kind::PiiKind;

/// Detector that produced a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanSource {
    Regex,
    Flagger,
    Layout,
    Ner,
    Unknown,
}

impl SpanSource {
    /// Trust rank used when two candidates overlap. Higher wins.
    pub fn priority(&self) -> u8 {
        match self {
            SpanSource::Regex => 3,
            SpanSource::Flagger | SpanSource::Layout => 2,
            SpanSource::Ner => 1,
            SpanSource::Unknown => 0,
        }
    }
}

impl fmt::Display for SpanSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SpanSource::Regex => "regex",
            SpanSource::Flagger => "flagger",
            SpanSource::Layout => "layout",
            SpanSource::Ner => "ner",
            SpanSource::Unknown => "unknown",
        })
    }
}

/// A detected piece of PII within the normalized text.
///
/// `start` and `end` count chars, as external consumers see them.
/// `byte_range` locates the same text for slicing, so
/// `value == &text[byte_range]` always holds for the text the span came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(skip)]
    pub byte_range: Range<usize>,
    pub value: String,
    pub kind: PiiKind,
    pub source: SpanSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Span {
    /// Build a span over the bytes `text[start..end]`.
    ///
    /// Returns `None` for empty, out-of-range, or non-char-boundary ranges.
    pub fn from_text(
        text: &str,
        start: usize,
        end: usize,
        kind: PiiKind,
        source: SpanSource,
    ) -> Option<Self> {
        if start >= end || end > text.len() {
            return None;
        }
        let value = text.get(start..end)?;
        let char_start = text[..start].chars().count();
        Some(Self {
            start: char_start,
            end: char_start + value.chars().count(),
            byte_range: start..end,
            value: value.to_string(),
            kind,
            source,
            score: None,
        })
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    /// Length in chars.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}
