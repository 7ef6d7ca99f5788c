use serde::{Deserialize, Serialize};

/// One visually grouped line of text from the first page of a PDF.
///
/// Built fresh on every extraction and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutLine {
    pub text: String,
    /// Rounded baseline; larger values sit higher on the page
    pub y: f64,
    /// Leftmost item start
    pub x: f64,
    /// Rightmost item end (start plus estimated advance)
    pub x_end: f64,
    /// Rightmost item start minus leftmost item start
    pub width: f64,
    pub max_font_size: f64,
    pub avg_font_size: f64,
    pub centered: bool,
    pub bold: bool,
    pub token_count: usize,
    pub has_digits: bool,
    pub has_contact: bool,
    pub score: Option<f64>,
}

/// Diagnostic snapshot of the line picked as the document owner's name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutCandidate {
    pub text: String,
    pub score: f64,
    pub y: f64,
    pub font_size: f64,
    pub centered: bool,
    pub bold: bool,
}

impl LayoutCandidate {
    pub fn from_line(line: &LayoutLine, score: f64) -> Self {
        Self {
            text: line.text.clone(),
            score,
            y: line.y,
            font_size: line.max_font_size,
            centered: line.centered,
            bold: line.bold,
        }
    }
}
