//! Guess the document owner's name from first-page typography.
//!
//! Résumés and similar documents put the owner's name near the top in the
//! largest type on the page, often centered and bold. Each short, digit-free
//! line gets a score from those signals and the best one is searched for in
//! the normalized text.

use regex::RegexBuilder;
use tracing::{debug, warn};

use crate::normalize::normalize;
use crate::types::kind::PiiKind;
use crate::types::layout::{LayoutCandidate, LayoutLine};
use crate::types::span::{Span, SpanSource};

// Scoring weights. Changing any of these changes which line is picked.
const FONT_Z_WEIGHT: f64 = 2.5;
const CENTERED_BONUS: f64 = 1.2;
const BOLD_BONUS: f64 = 0.6;
const VERTICAL_PENALTY: f64 = 1.0;
const NAME_LENGTH_BONUS: f64 = 0.4;
const ALL_CAPS_PENALTY: f64 = 0.2;

const MAX_CANDIDATE_TOKENS: usize = 5;

/// Headings that are never a name, compared case-insensitively.
pub const SECTION_HEADINGS: [&str; 10] = [
    "summary",
    "experience",
    "education",
    "skills",
    "contact",
    "profile",
    "objective",
    "resume",
    "curriculum vitae",
    "cv",
];

/// Whether a line is a section heading or begins with one.
fn is_heading(text: &str) -> bool {
    let lower = text.trim().to_lowercase();
    SECTION_HEADINGS.iter().any(|heading| {
        lower
            .strip_prefix(heading)
            .is_some_and(|rest| !rest.starts_with(|c: char| c.is_alphanumeric()))
    })
}

fn is_candidate(line: &LayoutLine) -> bool {
    (1..=MAX_CANDIDATE_TOKENS).contains(&line.token_count)
        && !line.has_digits
        && !line.has_contact
        && !is_heading(&line.text)
}

fn is_all_caps(text: &str) -> bool {
    text.chars().any(char::is_alphabetic) && !text.chars().any(char::is_lowercase)
}

/// Population mean and standard deviation.
fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// Score every candidate line. Non-candidates come back with `score: None`.
///
/// Font statistics and the vertical range are taken over all lines.
pub fn score_lines(lines: &[LayoutLine]) -> Vec<LayoutLine> {
    let sizes: Vec<f64> = lines.iter().map(|l| l.max_font_size).collect();
    let (mean, std) = mean_std(&sizes);

    let top = lines.iter().map(|l| l.y).fold(f64::NEG_INFINITY, f64::max);
    let bottom = lines.iter().map(|l| l.y).fold(f64::INFINITY, f64::min);
    let range = top - bottom;

    lines
        .iter()
        .map(|line| {
            let mut line = line.clone();
            if !is_candidate(&line) {
                line.score = None;
                return line;
            }

            let z = if std > 0.0 {
                (line.max_font_size - mean) / std
            } else {
                0.0
            };
            let top_fraction = if range > 0.0 {
                (top - line.y) / range
            } else {
                0.0
            };

            let mut score = FONT_Z_WEIGHT * z
                + CENTERED_BONUS * f64::from(u8::from(line.centered))
                + BOLD_BONUS * f64::from(u8::from(line.bold))
                - VERTICAL_PENALTY * top_fraction;
            if (2..=4).contains(&line.token_count) {
                score += NAME_LENGTH_BONUS;
            }
            if is_all_caps(&line.text) {
                score -= ALL_CAPS_PENALTY;
            }

            line.score = Some(score);
            line
        })
        .collect()
}

/// Highest-scoring candidate; the earliest line wins a tie.
pub fn best_candidate(scored: &[LayoutLine]) -> Option<(&LayoutLine, f64)> {
    let mut best: Option<(&LayoutLine, f64)> = None;
    for line in scored {
        let Some(score) = line.score else { continue };
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((line, score));
        }
    }
    best
}

/// Find `candidate` in `text`, tolerating whitespace differences and case.
///
/// Returns the byte range of the first occurrence.
pub fn locate(text: &str, candidate: &str) -> Option<(usize, usize)> {
    let normalized = normalize(candidate);
    let tokens: Vec<String> = normalized.split_whitespace().map(regex::escape).collect();
    if tokens.is_empty() {
        return None;
    }

    let pattern = tokens.join(r"\s+");
    let regex = match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(regex) => regex,
        Err(e) => {
            warn!(error = %e, "could not build layout name pattern");
            return None;
        }
    };

    regex.find(text).map(|m| (m.start(), m.end()))
}

/// Run the whole layout heuristic against normalized text.
///
/// Returns the name span and its diagnostics, or `None` when there are no
/// lines, no candidate survives filtering, or the text does not contain it.
pub fn detect_layout_name(text: &str, lines: &[LayoutLine]) -> Option<(Span, LayoutCandidate)> {
    if lines.is_empty() {
        return None;
    }

    let scored = score_lines(lines);
    let Some((line, score)) = best_candidate(&scored) else {
        debug!(lines = lines.len(), "no layout name candidate survived filtering");
        return None;
    };

    let Some((start, end)) = locate(text, &line.text) else {
        debug!(score, "layout name candidate not found in normalized text");
        return None;
    };

    let span =
        Span::from_text(text, start, end, PiiKind::Name, SpanSource::Layout)?.with_score(score);
    Some((span, LayoutCandidate::from_line(line, score)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str, y: f64, size: f64, centered: bool, bold: bool) -> LayoutLine {
        LayoutLine {
            text: text.to_string(),
            y,
            x: 72.0,
            x_end: 300.0,
            width: 100.0,
            max_font_size: size,
            avg_font_size: size,
            centered,
            bold,
            token_count: text.split_whitespace().count(),
            has_digits: text.chars().any(|c| c.is_ascii_digit()),
            has_contact: text.contains('@'),
            score: None,
        }
    }

    fn resume_lines() -> Vec<LayoutLine> {
        vec![
            line("Jane Q Doe", 760.0, 24.0, true, true),
            line("jane@example.com | 555-123-4567", 740.0, 10.0, true, false),
            line("EXPERIENCE", 700.0, 14.0, false, true),
            line("Senior Engineer", 680.0, 11.0, false, true),
            line("Built things at scale", 660.0, 10.0, false, false),
            line("Education", 600.0, 14.0, false, true),
        ]
    }

    #[test]
    fn test_filters_headings_digits_and_contacts() {
        let scored = score_lines(&resume_lines());
        assert!(scored[0].score.is_some());
        assert!(scored[1].score.is_none());
        assert!(scored[2].score.is_none());
        assert!(scored[5].score.is_none());
    }

    #[test]
    fn test_heading_prefix_requires_word_boundary() {
        assert!(is_heading("Skills & Tools"));
        assert!(is_heading("CURRICULUM VITAE"));
        assert!(is_heading("Summary:"));
        assert!(!is_heading("Cvetan Petrov"));
        assert!(!is_heading("Jane Doe"));
    }

    #[test]
    fn test_largest_centered_bold_line_wins() {
        let scored = score_lines(&resume_lines());
        let (best, score) = best_candidate(&scored).unwrap();
        assert_eq!(best.text, "Jane Q Doe");
        assert!(score > 0.0);
    }

    #[test]
    fn test_score_formula() {
        // Two lines, same size: z = 0 for both; the top line gets
        // 1.2 (centered) + 0.6 (bold) + 0.4 (two tokens) - 0.0 (top)
        let lines = vec![
            line("Jane Doe", 700.0, 12.0, true, true),
            line("JANE DOE", 600.0, 12.0, false, false),
        ];
        let scored = score_lines(&lines);
        let top = scored[0].score.unwrap();
        let bottom = scored[1].score.unwrap();
        assert!((top - 2.2).abs() < 1e-9);
        // 0.4 (two tokens) - 1.0 (bottom) - 0.2 (all caps)
        assert!((bottom - (-0.8)).abs() < 1e-9);
    }

    #[test]
    fn test_tie_goes_to_first_line() {
        let lines = vec![
            line("Jane Doe", 700.0, 12.0, false, false),
            line("John Roe", 700.0, 12.0, false, false),
        ];
        let scored = score_lines(&lines);
        let (best, _) = best_candidate(&scored).unwrap();
        assert_eq!(best.text, "Jane Doe");
    }

    #[test]
    fn test_locate_tolerates_whitespace_and_case() {
        let text = "Resume of JANE\n  Q.   Doe, engineer";
        let (start, end) = locate(text, "Jane Q. Doe").unwrap();
        assert_eq!(&text[start..end], "JANE\n  Q.   Doe");
    }

    #[test]
    fn test_detect_layout_name_emits_name_span() {
        let text = "Jane Q Doe\njane@example.com | 555-123-4567\nEXPERIENCE\n";
        let (span, candidate) = detect_layout_name(text, &resume_lines()).unwrap();
        assert_eq!(span.value, "Jane Q Doe");
        assert_eq!(span.kind, PiiKind::Name);
        assert_eq!(span.source, SpanSource::Layout);
        assert_eq!(span.score, Some(candidate.score));
        assert_eq!(candidate.font_size, 24.0);
        assert!(candidate.centered && candidate.bold);
    }

    #[test]
    fn test_no_lines_or_missing_text_yields_nothing() {
        assert!(detect_layout_name("Jane Q Doe", &[]).is_none());
        assert!(detect_layout_name("nobody here", &resume_lines()).is_none());
    }

    #[test]
    fn test_no_candidates_yields_nothing() {
        let lines = vec![line("Experience", 700.0, 20.0, true, true)];
        assert!(detect_layout_name("Experience", &lines).is_none());
    }
}
