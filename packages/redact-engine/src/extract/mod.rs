//! Source document extraction.
//!
//! Plain text is decoded as UTF-8. PDFs are decoded page by page: each page's
//! text items are joined by single spaces and terminated by a newline, and the
//! first page is additionally broken into [`LayoutLine`]s.

pub mod lines;
pub mod pdf;

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{RedactError, Result};
use crate::types::layout::LayoutLine;

pub use lines::build_layout_lines;
pub use pdf::{read_pdf, PdfText, TextItem};

/// Everything the pipeline needs from a source document.
#[derive(Debug, Clone, Default)]
pub struct ExtractedDocument {
    /// Original bytes, used for the fingerprint
    pub raw: Vec<u8>,
    /// Full extracted text, before normalization
    pub text: String,
    /// First-page lines, top to bottom; empty for non-PDF input
    pub layout_lines: Vec<LayoutLine>,
    pub is_pdf: bool,
}

/// Whether a path names a PDF (extension match, case-insensitive).
pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Read and decode a document from disk.
pub async fn extract(path: &Path) -> Result<ExtractedDocument> {
    let raw = tokio::fs::read(path).await.map_err(|source| RedactError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let pdf = is_pdf(path);
    let owned_path = path.to_path_buf();
    tokio::task::spawn_blocking(move || extract_bytes(raw, pdf, &owned_path))
        .await
        .map_err(|e| RedactError::Pdf(format!("extraction task failed: {e}")))?
}

/// Decode already-loaded bytes. `path` is only used in error messages.
pub fn extract_bytes(raw: Vec<u8>, pdf: bool, path: &Path) -> Result<ExtractedDocument> {
    if !pdf {
        let text = std::str::from_utf8(&raw)
            .map_err(|_| RedactError::InvalidUtf8 {
                path: PathBuf::from(path),
            })?
            .to_owned();
        return Ok(ExtractedDocument {
            raw,
            text,
            ..Default::default()
        });
    }

    let decoded = read_pdf(&raw)?;

    let mut text = String::new();
    for page in &decoded.pages {
        let joined = page
            .iter()
            .map(|item| item.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        text.push_str(&joined);
        text.push('\n');
    }

    let layout_lines = decoded
        .pages
        .first()
        .map(|items| build_layout_lines(items, decoded.first_page_width))
        .unwrap_or_default();

    debug!(
        pages = decoded.pages.len(),
        layout_lines = layout_lines.len(),
        page_width = decoded.first_page_width,
        "decoded PDF"
    );

    Ok(ExtractedDocument {
        raw,
        text,
        layout_lines,
        is_pdf: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{pdf_from_pages, text_line};

    #[test]
    fn test_is_pdf_is_case_insensitive() {
        assert!(is_pdf(Path::new("resume.pdf")));
        assert!(is_pdf(Path::new("/tmp/Resume.PDF")));
        assert!(!is_pdf(Path::new("notes.txt")));
        assert!(!is_pdf(Path::new("pdf")));
    }

    #[test]
    fn test_plain_text_passes_through() {
        let doc = extract_bytes(b"hello\r\nworld".to_vec(), false, Path::new("a.txt")).unwrap();
        assert_eq!(doc.text, "hello\r\nworld");
        assert!(doc.layout_lines.is_empty());
        assert!(!doc.is_pdf);
    }

    #[test]
    fn test_invalid_utf8_is_an_input_error() {
        let err = extract_bytes(vec![0xff, 0xfe, 0x00], false, Path::new("bad.txt")).unwrap_err();
        assert!(matches!(err, RedactError::InvalidUtf8 { .. }));
    }

    #[test]
    fn test_corrupt_pdf_is_an_input_error() {
        let err =
            extract_bytes(b"%PDF-1.4 garbage".to_vec(), true, Path::new("x.pdf")).unwrap_err();
        assert!(matches!(err, RedactError::Pdf(_)));
    }

    #[test]
    fn test_pages_are_joined_and_layout_uses_first_page() {
        let mut first = text_line("F2", 24, 72, 740, "Jane Doe");
        first.extend(text_line("F1", 11, 72, 720, "second line"));
        let second = text_line("F1", 11, 72, 740, "page two");
        let bytes = pdf_from_pages(vec![first, second]).unwrap();

        let doc = extract_bytes(bytes.clone(), true, Path::new("cv.pdf")).unwrap();

        assert!(doc.is_pdf);
        assert_eq!(doc.raw, bytes);
        assert_eq!(doc.text, "Jane Doe second line\npage two\n");
        let lines: Vec<&str> = doc.layout_lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(lines, vec!["Jane Doe", "second line"]);
        assert!(doc.layout_lines[0].bold);
        assert_eq!(doc.layout_lines[0].max_font_size, 24.0);
    }

    #[tokio::test]
    async fn test_missing_file_is_an_io_error() {
        let err = extract(Path::new("/nonexistent/redact-engine/input.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, RedactError::Io { .. }));
    }
}
