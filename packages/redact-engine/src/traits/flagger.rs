//! Flagger trait for pluggable, external PII detection.
//!
//! A flagger inspects the normalized text and proposes extra spans, typically
//! from an NER model or a remote service. The engine treats every flagger as
//! untrusted: offsets are clamped, unknown labels are dropped, and any error,
//! panic or timeout simply means the flagger contributed nothing.
//!
//! # Usage
//!
//! ```rust,ignore
//! use redact_engine::{Engine, Flagger, FlagProposal, FlaggerError, RedactOptions};
//!
//! struct Ner;
//!
//! #[async_trait::async_trait]
//! impl Flagger for Ner {
//!     fn name(&self) -> &str { "ner" }
//!
//!     async fn flag(&self, text: &str) -> Result<Vec<FlagProposal>, FlaggerError> {
//!         Ok(vec![FlagProposal::new(0, 4, "person")])
//!     }
//! }
//!
//! let engine = Engine::new(RedactOptions::default()).with_flagger(Arc::new(Ner));
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::FlaggerError;

/// A span proposed by a flagger, in char offsets of the text it was given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagProposal {
    pub start: usize,
    pub end: usize,
    /// Kind name or NER label ("person", "org", "gpe", ...)
    pub label: String,
    #[serde(default)]
    pub score: Option<f64>,
}

impl FlagProposal {
    pub fn new(start: usize, end: usize, label: impl Into<String>) -> Self {
        Self {
            start,
            end,
            label: label.into(),
            score: None,
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    /// Decode a JSON flagger response.
    ///
    /// Accepts a bare array of proposals or an object wrapping them under
    /// `"proposals"`. Anything else is [`FlaggerError::Malformed`].
    pub fn parse_response(body: &str) -> Result<Vec<FlagProposal>, FlaggerError> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Response {
            Bare(Vec<FlagProposal>),
            Wrapped { proposals: Vec<FlagProposal> },
        }

        match serde_json::from_str::<Response>(body) {
            Ok(Response::Bare(proposals)) | Ok(Response::Wrapped { proposals }) => Ok(proposals),
            Err(e) => Err(FlaggerError::Malformed(e.to_string())),
        }
    }
}

/// External detector consulted once per document.
#[async_trait]
pub trait Flagger: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Propose spans over normalized text.
    async fn flag(&self, text: &str) -> Result<Vec<FlagProposal>, FlaggerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_and_wrapped_responses() {
        let bare = FlagProposal::parse_response(
            r#"[{"start": 0, "end": 4, "label": "PERSON", "score": 0.9}]"#,
        )
        .unwrap();
        assert_eq!(bare, vec![FlagProposal::new(0, 4, "PERSON").with_score(0.9)]);

        let body = r#"{"proposals": [{"start": 5, "end": 9, "label": "org"}]}"#;
        let wrapped = FlagProposal::parse_response(body).unwrap();
        assert_eq!(wrapped, vec![FlagProposal::new(5, 9, "org")]);
    }

    #[test]
    fn test_parse_rejects_malformed_output() {
        for body in ["", "not json", r#"{"entities": []}"#, r#"[{"start": -1, "end": 2}]"#] {
            let err = FlagProposal::parse_response(body).unwrap_err();
            assert!(matches!(err, FlaggerError::Malformed(_)), "{body}");
        }
    }
}
