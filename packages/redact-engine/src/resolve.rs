//! Overlap resolution across all detectors.

use std::cmp::Ordering;

use crate::types::span::Span;

/// Canonical candidate order: start ascending, longer first, then more
/// trusted source, then kind, source and score so any input order sorts
/// identically.
fn candidate_order(a: &Span, b: &Span) -> Ordering {
    a.start
        .cmp(&b.start)
        .then_with(|| b.end.cmp(&a.end))
        .then_with(|| b.source.priority().cmp(&a.source.priority()))
        .then_with(|| a.kind.cmp(&b.kind))
        .then_with(|| a.source.cmp(&b.source))
        .then_with(|| {
            let sa = a.score.unwrap_or(f64::NEG_INFINITY);
            let sb = b.score.unwrap_or(f64::NEG_INFINITY);
            sb.total_cmp(&sa)
        })
}

/// Merge candidate spans into an ordered, non-overlapping list.
///
/// Single pass over the sorted candidates. A candidate that overlaps the last
/// accepted span replaces it when it is strictly shorter or comes from a
/// strictly higher-priority source; otherwise it is dropped. Offsets are
/// never altered.
pub fn resolve_spans(mut candidates: Vec<Span>) -> Vec<Span> {
    candidates.sort_by(candidate_order);

    let mut resolved: Vec<Span> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let Some(last) = resolved.last_mut() else {
            resolved.push(candidate);
            continue;
        };

        if !candidate.overlaps(last) {
            resolved.push(candidate);
        } else if candidate.len() < last.len()
            || candidate.source.priority() > last.source.priority()
        {
            *last = candidate;
        }
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::kind::PiiKind;
    use crate::types::span::SpanSource;
    use proptest::prelude::*;

    const TEXT: &str = "abcdefghijklmnopqrstuvwxyz0123456789";

    fn span(start: usize, end: usize, kind: PiiKind, source: SpanSource) -> Span {
        Span::from_text(TEXT, start, end, kind, source).unwrap()
    }

    #[test]
    fn test_disjoint_spans_all_kept_in_order() {
        let resolved = resolve_spans(vec![
            span(10, 12, PiiKind::Phone, SpanSource::Regex),
            span(0, 3, PiiKind::Email, SpanSource::Regex),
            span(3, 5, PiiKind::Name, SpanSource::Layout),
        ]);
        let ranges: Vec<_> = resolved.iter().map(|s| (s.start, s.end)).collect();
        assert_eq!(ranges, vec![(0, 3), (3, 5), (10, 12)]);
    }

    #[test]
    fn test_shorter_layout_span_beats_longer_regex_span() {
        let resolved = resolve_spans(vec![
            span(0, 5, PiiKind::Url, SpanSource::Regex),
            span(0, 3, PiiKind::Name, SpanSource::Layout),
        ]);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].source, SpanSource::Layout);
        assert_eq!((resolved[0].start, resolved[0].end), (0, 3));
    }

    #[test]
    fn test_higher_priority_wins_at_equal_length() {
        let resolved = resolve_spans(vec![
            span(2, 6, PiiKind::Name, SpanSource::Flagger),
            span(2, 6, PiiKind::Email, SpanSource::Regex),
        ]);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].source, SpanSource::Regex);
    }

    #[test]
    fn test_longer_lower_priority_overlap_is_dropped() {
        let resolved = resolve_spans(vec![
            span(0, 4, PiiKind::Email, SpanSource::Regex),
            span(2, 9, PiiKind::Org, SpanSource::Flagger),
        ]);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].kind, PiiKind::Email);
    }

    #[test]
    fn test_profile_kind_beats_url_on_identical_range() {
        let resolved = resolve_spans(vec![
            span(0, 20, PiiKind::Url, SpanSource::Regex),
            span(0, 20, PiiKind::Linkedin, SpanSource::Regex),
        ]);
        assert_eq!(resolved[0].kind, PiiKind::Linkedin);
    }

    #[test]
    fn test_touching_spans_do_not_overlap() {
        let resolved = resolve_spans(vec![
            span(0, 5, PiiKind::Email, SpanSource::Regex),
            span(5, 9, PiiKind::Phone, SpanSource::Regex),
        ]);
        assert_eq!(resolved.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(resolve_spans(Vec::new()).is_empty());
    }

    fn arb_span() -> impl Strategy<Value = Span> {
        (0usize..30, 1usize..8, 0usize..4, 0usize..3).prop_map(|(start, len, source, kind)| {
            let source = [
                SpanSource::Regex,
                SpanSource::Flagger,
                SpanSource::Layout,
                SpanSource::Ner,
            ][source];
            let kind = [PiiKind::Email, PiiKind::Name, PiiKind::Org][kind];
            span(start, (start + len).min(TEXT.len()), kind, source)
        })
    }

    proptest! {
        #[test]
        fn resolved_spans_never_overlap(spans in proptest::collection::vec(arb_span(), 0..20)) {
            let resolved = resolve_spans(spans);
            for pair in resolved.windows(2) {
                prop_assert!(pair[0].end <= pair[1].start);
            }
        }

        #[test]
        fn resolution_ignores_input_order(spans in proptest::collection::vec(arb_span(), 0..20)) {
            let mut reversed = spans.clone();
            reversed.reverse();
            prop_assert_eq!(resolve_spans(spans), resolve_spans(reversed));
        }
    }
}
