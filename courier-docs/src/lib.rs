//! courier-docs: best-effort document normalization.
//!
//! Attachments declared as PDF are not trusted. [`normalize_pdf`] checks the
//! signature, re-serializes parseable documents through a clean writer and
//! wraps everything else into a minimal one-page PDF. None of the public
//! entry points fail: the worst case is the original bytes, unchanged.
//!
//! ```rust
//! use courier_docs::{normalize_pdf, Outcome};
//!
//! let normalized = normalize_pdf(b"definitely not a pdf");
//! assert_eq!(normalized.outcome, Outcome::Placeholder);
//! assert!(normalized.bytes.starts_with(b"%PDF"));
//! ```

mod detect;
mod error;
mod fallback;
mod import;
mod nesting;
mod repair;

pub use detect::{looks_like_pdf, PDF_SIGNATURE};
pub use error::DocumentError;
pub use fallback::{try_wrap_as_pdf, wrap_as_pdf, PLACEHOLDER_PAGE_SIZE, PLACEHOLDER_TEXT};
pub use repair::{repair_pdf, try_repair_pdf};

use lopdf::{dictionary, Document, Object, ObjectId};

/// Header version of every document this crate writes.
pub(crate) const PDF_VERSION: &str = "1.7";

/// How a payload ended up in its final shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Parsed and re-serialized with all pages.
    Repaired { pages: usize },
    /// Decoded as a raster image and placed on a page of the same size.
    WrappedImage { width: u32, height: u32 },
    /// Undecodable; replaced by a page with an explanatory line of text.
    Placeholder,
    /// Could not build a document at all; original bytes kept.
    Unchanged,
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Repaired { .. } => "repaired",
            Outcome::WrappedImage { .. } => "wrapped-image",
            Outcome::Placeholder => "placeholder",
            Outcome::Unchanged => "unchanged",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDocument {
    pub bytes: Vec<u8>,
    pub outcome: Outcome,
}

/// Normalize a buffer that was declared to be a PDF.
///
/// Signature present: repair (falling back to wrapping on any failure).
/// Signature absent: wrap without attempting to parse.
pub fn normalize_pdf(buf: &[u8]) -> NormalizedDocument {
    if looks_like_pdf(buf) {
        repair_pdf(buf)
    } else {
        tracing::warn!(bytes = buf.len(), "not a real PDF, wrapping it manually");
        wrap_as_pdf(buf)
    }
}

/// Install the `Pages` node and the catalog for `kids`, in order.
pub(crate) fn finish_page_tree(doc: &mut Document, pages_id: ObjectId, kids: Vec<ObjectId>) {
    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids.into_iter().map(Object::Reference).collect::<Vec<_>>(),
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
}

pub(crate) fn serialize(doc: &mut Document) -> Result<Vec<u8>, DocumentError> {
    doc.compress();
    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| DocumentError::Serialize(e.to_string()))?;
    Ok(out)
}
