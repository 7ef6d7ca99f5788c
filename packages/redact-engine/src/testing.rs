//! Testing utilities including mock flaggers and an in-memory PDF builder.
//!
//! These are useful for exercising the engine's flagger handling without a
//! real NER model or remote service, and its PDF walker without fixture files.

use async_trait::async_trait;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{FlaggerError, RedactError};
use crate::traits::flagger::{FlagProposal, Flagger};

/// A flagger that always returns the same proposals.
///
/// Counts calls so tests can assert it was consulted.
#[derive(Debug, Default, Clone)]
pub struct StaticFlagger {
    proposals: Vec<FlagProposal>,
    calls: Arc<AtomicUsize>,
}

impl StaticFlagger {
    pub fn new(proposals: Vec<FlagProposal>) -> Self {
        Self {
            proposals,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of times `flag` has been called.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Flagger for StaticFlagger {
    fn name(&self) -> &str {
        "static"
    }

    async fn flag(&self, _text: &str) -> Result<Vec<FlagProposal>, FlaggerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.proposals.clone())
    }
}

/// A flagger that always returns an error.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingFlagger;

#[async_trait]
impl Flagger for FailingFlagger {
    fn name(&self) -> &str {
        "failing"
    }

    async fn flag(&self, _text: &str) -> Result<Vec<FlagProposal>, FlaggerError> {
        Err(FlaggerError::Failed("mock flagger failure".into()))
    }
}

/// A flagger that panics when called.
#[derive(Debug, Default, Clone, Copy)]
pub struct PanickingFlagger;

#[async_trait]
impl Flagger for PanickingFlagger {
    fn name(&self) -> &str {
        "panicking"
    }

    async fn flag(&self, _text: &str) -> Result<Vec<FlagProposal>, FlaggerError> {
        panic!("mock flagger panic")
    }
}

/// A flagger that never answers within any reasonable timeout.
#[derive(Debug, Default, Clone, Copy)]
pub struct HangingFlagger;

#[async_trait]
impl Flagger for HangingFlagger {
    fn name(&self) -> &str {
        "hanging"
    }

    async fn flag(&self, _text: &str) -> Result<Vec<FlagProposal>, FlaggerError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(Vec::new())
    }
}

/// Operations that show one line of text at `(x, y)` with font resource `font`.
pub fn text_line(font: &str, size: i64, x: i64, y: i64, text: &str) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![font.into(), size.into()]),
        Operation::new(
            "Tm",
            vec![1.into(), 0.into(), 0.into(), 1.into(), x.into(), y.into()],
        ),
        Operation::new("Tj", vec![Object::string_literal(text)]),
        Operation::new("ET", vec![]),
    ]
}

/// Build a US Letter PDF with one page per operation list.
///
/// Every page inherits `F1` (Helvetica) and `F2` (Helvetica-Bold) from the
/// page tree.
pub fn pdf_from_pages(pages: Vec<Vec<Operation>>) -> crate::error::Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
        },
    });

    let mut kids = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations }.encode()?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::from(page_id));
    }

    let count = kids.len() as i64;
    let tree = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(tree));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| RedactError::Pdf(format!("failed to serialize PDF: {e}")))?;
    Ok(bytes)
}
