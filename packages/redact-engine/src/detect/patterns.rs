//! Fixed regular-expression rules, one per structured PII kind.

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::kind::PiiKind;
use crate::types::span::{Span, SpanSource};

lazy_static! {
    // Email pattern - RFC 5322 simplified
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"(?i)\b[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}\b"
    ).unwrap();

    // Phone numbers - optional country code, 3-3-4 grouping with common separators
    static ref PHONE_REGEX: Regex = Regex::new(
        r"(?:\+\d{1,3}[-.\s]?)?(?:\(\d{3}\)|\b\d{3})[-.\s]?\d{3}[-.\s]?\d{4}\b"
    ).unwrap();

    // http(s) and www URLs, trailing sentence punctuation excluded
    static ref URL_REGEX: Regex = Regex::new(
        r#"(?i)\b(?:https?://|www\.)[^\s<>"']*[^\s<>"'.,;:!?)\]]"#
    ).unwrap();

    // LinkedIn profile paths, scheme optional
    static ref LINKEDIN_REGEX: Regex = Regex::new(
        r"(?i)\b(?:https?://)?(?:[a-z]{2,3}\.)?linkedin\.com/(?:in|pub|company)/[a-z0-9_%-]+/?"
    ).unwrap();

    // GitHub user or repository paths, scheme optional
    static ref GITHUB_REGEX: Regex = Regex::new(
        concat!(
            r"(?i)\b(?:https?://)?(?:www\.)?github\.com/",
            r"[a-z0-9](?:[a-z0-9-]{0,38})(?:/[a-z0-9_.-]*[a-z0-9_-])?/?"
        )
    ).unwrap();

    // Street addresses: number, 1-4 capitalized words, street suffix, optional unit
    static ref ADDRESS_REGEX: Regex = Regex::new(
        concat!(
            r"\b\d{1,5}\s+(?:[A-Z][A-Za-z0-9'-]*\.?\s+){1,4}",
            r"(?i:street|st|avenue|ave|road|rd|boulevard|blvd|lane|ln|drive|dr|court|ct|way",
            r"|place|pl|terrace|ter|parkway|pkwy|circle|cir|highway|hwy)\b\.?",
            r"(?:,?\s+(?i:apt|suite|ste|unit)\.?\s*#?\s*[A-Za-z0-9-]+|,?\s+#\s*[A-Za-z0-9-]+)?"
        )
    ).unwrap();

    // Government-style identifiers: SSN (XXX-XX-XXXX) and passport-like codes
    static ref ID_REGEX: Regex = Regex::new(
        r"\b\d{3}-\d{2}-\d{4}\b|\b[A-Z]{1,2}\d{7,9}\b"
    ).unwrap();

    // Loose contact check used on layout lines
    static ref CONTACT_HINT_REGEX: Regex = Regex::new(
        r"@|\+?\(?\d{2,4}\)?[-.\s]\d{2,4}[-.\s]?\d{2,4}"
    ).unwrap();
}

/// Rules in emission order.
///
/// Profile kinds run before the generic URL rule; identical ranges are broken
/// by kind order in the resolver anyway.
fn rules() -> [(PiiKind, &'static Regex); 7] {
    [
        (PiiKind::Email, &*EMAIL_REGEX),
        (PiiKind::Phone, &*PHONE_REGEX),
        (PiiKind::Linkedin, &*LINKEDIN_REGEX),
        (PiiKind::Github, &*GITHUB_REGEX),
        (PiiKind::Url, &*URL_REGEX),
        (PiiKind::Address, &*ADDRESS_REGEX),
        (PiiKind::Id, &*ID_REGEX),
    ]
}

/// Scan normalized text with every rule.
///
/// Emits one span per match. Matches of different kinds may overlap; the
/// resolver sorts that out.
pub fn detect_patterns(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    for (kind, regex) in rules() {
        for mat in regex.find_iter(text) {
            spans.extend(Span::from_text(
                text,
                mat.start(),
                mat.end(),
                kind,
                SpanSource::Regex,
            ));
        }
    }
    spans
}

/// Whether a line carries an email- or phone-like substring.
pub fn looks_like_contact(text: &str) -> bool {
    EMAIL_REGEX.is_match(text) || PHONE_REGEX.is_match(text) || CONTACT_HINT_REGEX.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use proptest::prelude::*;

    fn of_kind(spans: &[Span], kind: PiiKind) -> Vec<&str> {
        spans
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| s.value.as_str())
            .collect()
    }

    #[test]
    fn test_detect_emails() {
        let spans = detect_patterns("Contact me at john.doe@example.com or JANE@TEST.ORG");
        assert_eq!(
            of_kind(&spans, PiiKind::Email),
            vec!["john.doe@example.com", "JANE@TEST.ORG"]
        );
    }

    #[test]
    fn test_detect_phones() {
        let spans = detect_patterns("Call (555) 123-4567 or 555-987-6543 or +1 555 111 2222");
        let phones = of_kind(&spans, PiiKind::Phone);
        assert_eq!(phones.len(), 3);
        assert_eq!(phones[0], "(555) 123-4567");
        assert_eq!(phones[2], "+1 555 111 2222");
    }

    #[test]
    fn test_detect_urls_without_trailing_punctuation() {
        let spans = detect_patterns("See https://example.com/about, or www.example.org.");
        assert_eq!(
            of_kind(&spans, PiiKind::Url),
            vec!["https://example.com/about", "www.example.org"]
        );
    }

    #[test]
    fn test_detect_profiles() {
        let spans =
            detect_patterns("linkedin.com/in/jane-doe and https://github.com/janedoe/dotfiles");
        assert_eq!(of_kind(&spans, PiiKind::Linkedin), vec!["linkedin.com/in/jane-doe"]);
        assert_eq!(
            of_kind(&spans, PiiKind::Github),
            vec!["https://github.com/janedoe/dotfiles"]
        );
        // the scheme-qualified profile is also a generic URL candidate
        assert_eq!(
            of_kind(&spans, PiiKind::Url),
            vec!["https://github.com/janedoe/dotfiles"]
        );
    }

    #[test]
    fn test_detect_address() {
        let spans = detect_patterns("Lives at 1234 North Maple Street, Apt 5B in town");
        assert_eq!(
            of_kind(&spans, PiiKind::Address),
            vec!["1234 North Maple Street, Apt 5B"]
        );
    }

    #[test]
    fn test_detect_ids() {
        let spans = detect_patterns("SSN 123-45-6789, passport X12345678.");
        assert_eq!(of_kind(&spans, PiiKind::Id), vec!["123-45-6789", "X12345678"]);
    }

    #[test]
    fn test_spans_match_text() {
        let text = "Jane — jane@example.com — (555) 123-4567";
        for span in detect_patterns(text) {
            assert!(span.start < span.end && span.end <= text.chars().count());
            assert_eq!(&text[span.byte_range.clone()], span.value);
            assert_eq!(span.source, SpanSource::Regex);
        }
    }

    #[test]
    fn test_no_pii() {
        assert!(detect_patterns("Shipped version 2 of the parser in 2021.").is_empty());
    }

    #[test]
    fn test_looks_like_contact() {
        assert!(looks_like_contact("jane@example.com"));
        assert!(looks_like_contact("Tel 612 555 0100"));
        assert!(!looks_like_contact("Jane Doe"));
    }

    proptest! {
        #[test]
        fn pattern_spans_slice_normalized_text(
            s in "[a-zA-Z0-9@.()\\[\\]+/:_ éñ\n-]{0,80}"
        ) {
            let text = normalize(&s);
            let chars = text.chars().count();
            for span in detect_patterns(&text) {
                prop_assert_eq!(&text[span.byte_range.clone()], span.value.as_str());
                prop_assert!(span.start < span.end && span.end <= chars);
                prop_assert_eq!(span.len(), span.value.chars().count());
            }
        }
    }
}
