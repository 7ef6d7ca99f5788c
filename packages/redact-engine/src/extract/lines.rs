//! Group first-page text items into layout lines.

use std::collections::BTreeMap;

use super::pdf::TextItem;
use crate::detect::patterns::looks_like_contact;
use crate::types::layout::LayoutLine;

/// A line is centered when its midpoint is within this share of the page
/// width from the page midpoint.
const CENTER_TOLERANCE: f64 = 0.15;

const BOLD_MARKERS: [&str; 4] = ["bold", "semibold", "demi", "black"];

/// Bucket items by rounded baseline and summarize each bucket.
///
/// Lines come back top to bottom (descending baseline).
pub fn build_layout_lines(items: &[TextItem], page_width: f64) -> Vec<LayoutLine> {
    let mut buckets: BTreeMap<i64, Vec<&TextItem>> = BTreeMap::new();
    for item in items {
        buckets.entry(item.y.round() as i64).or_default().push(item);
    }

    buckets
        .into_iter()
        .rev()
        .filter_map(|(y, mut row)| {
            row.sort_by(|a, b| a.x.total_cmp(&b.x));
            summarize(y as f64, &row, page_width)
        })
        .collect()
}

fn summarize(y: f64, row: &[&TextItem], page_width: f64) -> Option<LayoutLine> {
    let text = row
        .iter()
        .map(|item| item.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let text = text.trim().to_string();
    if text.is_empty() {
        return None;
    }

    let x = row.iter().map(|i| i.x).fold(f64::INFINITY, f64::min);
    let last_start = row.iter().map(|i| i.x).fold(f64::NEG_INFINITY, f64::max);
    let x_end = row
        .iter()
        .map(|i| i.x + i.width)
        .fold(f64::NEG_INFINITY, f64::max);

    let max_font_size = row.iter().map(|i| i.font_size).fold(0.0, f64::max);
    let avg_font_size = row.iter().map(|i| i.font_size).sum::<f64>() / row.len() as f64;

    let midpoint = (x + x_end) / 2.0;
    let centered =
        page_width > 0.0 && (midpoint - page_width / 2.0).abs() <= CENTER_TOLERANCE * page_width;

    let bold = row.iter().any(|i| {
        let font = i.font_name.to_lowercase();
        BOLD_MARKERS.iter().any(|marker| font.contains(marker))
    });

    Some(LayoutLine {
        token_count: text.split_whitespace().count(),
        has_digits: text.chars().any(|c| c.is_ascii_digit()),
        has_contact: looks_like_contact(&text),
        text,
        y,
        x,
        x_end,
        width: last_start - x,
        max_font_size,
        avg_font_size,
        centered,
        bold,
        score: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(text: &str, x: f64, y: f64, size: f64, font: &str) -> TextItem {
        TextItem {
            text: text.to_string(),
            x,
            y,
            width: 0.5 * size * text.chars().count() as f64,
            font_size: size,
            font_name: font.to_string(),
        }
    }

    #[test]
    fn test_items_sharing_rounded_baseline_form_one_line() {
        let items = vec![
            item("Doe", 300.0, 700.2, 24.0, "Helvetica-Bold"),
            item("Jane", 240.0, 699.8, 24.0, "Helvetica-Bold"),
            item("Engineer", 72.0, 650.0, 11.0, "Helvetica"),
        ];

        let lines = build_layout_lines(&items, 612.0);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "Jane Doe");
        assert_eq!(lines[0].y, 700.0);
        assert_eq!(lines[0].token_count, 2);
        assert!(lines[0].bold);
        assert_eq!(lines[0].width, 60.0);
        assert_eq!(lines[1].text, "Engineer");
        assert!(!lines[1].bold);
    }

    #[test]
    fn test_centering_uses_page_midpoint() {
        let centered = build_layout_lines(&[item("Jane Doe", 258.0, 700.0, 12.0, "F")], 612.0);
        let left = build_layout_lines(&[item("Jane Doe", 20.0, 700.0, 12.0, "F")], 612.0);

        assert!(centered[0].centered);
        assert!(!left[0].centered);
    }

    #[test]
    fn test_font_stats_and_flags() {
        let items = vec![
            item("Call", 72.0, 500.0, 10.0, "Times-Roman"),
            item("555-123-4567", 100.0, 500.0, 14.0, "Times-Roman"),
        ];

        let line = &build_layout_lines(&items, 612.0)[0];

        assert_eq!(line.max_font_size, 14.0);
        assert_eq!(line.avg_font_size, 12.0);
        assert!(line.has_digits);
        assert!(line.has_contact);
    }

    #[test]
    fn test_semibold_and_black_count_as_bold() {
        let semi = build_layout_lines(&[item("A", 0.0, 1.0, 9.0, "ABCDEF+Inter-SemiBold")], 612.0);
        let black = build_layout_lines(&[item("A", 0.0, 1.0, 9.0, "Roboto-Black")], 612.0);
        assert!(semi[0].bold);
        assert!(black[0].bold);
    }
}
