//! Text canonicalization applied before any detector runs.

use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    // "(at)", "[at]", " ( AT ) " ... → "@"
    static ref OBFUSCATED_AT: Regex = Regex::new(r"(?i)[ \t]*[\(\[]\s*at\s*[\)\]][ \t]*").unwrap();

    // "(dot)", "[dot]" ... → "."
    static ref OBFUSCATED_DOT: Regex =
        Regex::new(r"(?i)[ \t]*[\(\[]\s*dot\s*[\)\]][ \t]*").unwrap();

    // Horizontal whitespace runs (newlines are kept)
    static ref HORIZONTAL_WS: Regex = Regex::new(r"[^\S\n]+").unwrap();
}

/// Canonicalize text for detection.
///
/// NFKC, de-obfuscation of `@`/`.`, carriage-return removal and horizontal
/// whitespace collapsing. Idempotent.
pub fn normalize(text: &str) -> String {
    // CR goes first so it cannot block composition of its neighbours.
    let composed: String = text.replace('\r', "").nfkc().collect();
    let at = OBFUSCATED_AT.replace_all(&composed, "@");
    let dot = OBFUSCATED_DOT.replace_all(&at, ".");
    HORIZONTAL_WS.replace_all(&dot, " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_obfuscated_email() {
        assert_eq!(normalize("jane (at) example (dot) com"), "jane@example.com");
        assert_eq!(normalize("jane[AT]example[Dot]org"), "jane@example.org");
        assert_eq!(normalize("jane ( at ) example ( dot ) com"), "jane@example.com");
    }

    #[test]
    fn test_collapses_horizontal_whitespace_only() {
        assert_eq!(normalize("a  \t b\r\n\nc"), "a b\n\nc");
    }

    #[test]
    fn test_compatibility_forms_fold() {
        // full-width letters and the "ﬁ" ligature
        assert_eq!(normalize("ＪＡＮＥ ﬁle"), "JANE file");
        // no-break space becomes a plain space
        assert_eq!(normalize("Jane\u{a0}\u{a0}Doe"), "Jane Doe");
    }

    #[test]
    fn test_plain_words_untouched() {
        let text = "Data (attached) and [dotted] lines";
        assert_eq!(normalize(text), text);
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(s in "\\PC{0,64}") {
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn normalize_is_idempotent_on_obfuscations(
            parts in proptest::collection::vec(
                prop_oneof![
                    Just("(at)"), Just(" [dot] "), Just("( AT )"), Just("\t"),
                    Just("  "), Just("\r\n"), Just("x"), Just("("), Just(")"),
                    Just("a"), Just("t"), Just("\u{a0}"),
                ],
                0..24,
            )
        ) {
            let s = parts.concat();
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once);
        }
    }
}
