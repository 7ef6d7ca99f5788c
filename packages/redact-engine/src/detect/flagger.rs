//! Fail-open wrapper around an external [`Flagger`].

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::FlaggerError;
use crate::traits::flagger::{FlagProposal, Flagger};
use crate::types::kind::PiiKind;
use crate::types::span::{Span, SpanSource};

/// Turn raw proposals into spans over `text`.
///
/// Proposal offsets count chars. They are clamped to the text and dropped
/// when nothing is left. Unknown labels are dropped.
pub fn proposals_to_spans(text: &str, proposals: &[FlagProposal]) -> Vec<Span> {
    // Byte offset of every char boundary, indexed by char position.
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_len = boundaries.len() - 1;

    proposals
        .iter()
        .filter_map(|proposal| {
            let Some(kind) = PiiKind::from_label(&proposal.label) else {
                debug!(label = %proposal.label, "dropping flagger proposal with unknown label");
                return None;
            };

            let start = boundaries[proposal.start.min(char_len)];
            let end = boundaries[proposal.end.min(char_len)];

            let span = Span::from_text(text, start, end, kind, SpanSource::Flagger)?;
            Some(match proposal.score.filter(|s| s.is_finite()) {
                Some(score) => span.with_score(score),
                None => span,
            })
        })
        .collect()
}

/// Ask the flagger for proposals, bounded by `timeout`.
///
/// Errors, panics and timeouts are logged and yield an empty result.
pub async fn run_flagger(flagger: &dyn Flagger, text: &str, timeout: Duration) -> Vec<Span> {
    let call = AssertUnwindSafe(flagger.flag(text)).catch_unwind();

    let outcome = match tokio::time::timeout(timeout, call).await {
        Err(_) => Err(FlaggerError::Timeout(timeout)),
        Ok(Err(_)) => Err(FlaggerError::Panicked),
        Ok(Ok(result)) => result,
    };

    match outcome {
        Ok(proposals) => {
            let spans = proposals_to_spans(text, &proposals);
            debug!(
                flagger = flagger.name(),
                proposed = proposals.len(),
                accepted = spans.len(),
                "flagger finished"
            );
            spans
        }
        Err(e) => {
            warn!(
                flagger = flagger.name(),
                error = %e,
                "flagger failed, continuing without it"
            );
            Vec::new()
        }
    }
}
