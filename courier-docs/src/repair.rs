use lopdf::Document;
use tracing::{debug, info, warn};

use crate::import::PageImporter;
use crate::nesting::{check_nesting, MAX_NESTING};
use crate::{finish_page_tree, serialize, wrap_as_pdf, DocumentError, NormalizedDocument, Outcome, PDF_VERSION};

/// Parse `buf` and copy every page, in order, into a freshly written
/// document.
///
/// A document without pages is treated as a failure, and so is one that
/// nests arrays or dictionaries too deeply to parse safely.
pub fn try_repair_pdf(buf: &[u8]) -> Result<NormalizedDocument, DocumentError> {
    check_nesting(buf, MAX_NESTING)?;
    let source = Document::load_mem(buf).map_err(|e| DocumentError::Parse(e.to_string()))?;

    let pages: Vec<_> = source.get_pages().into_values().collect();
    if pages.is_empty() {
        return Err(DocumentError::Copy("document has no pages".to_string()));
    }
    debug!(pages = pages.len(), version = %source.version, "parsed PDF");

    let mut target = Document::with_version(PDF_VERSION);
    let pages_id = target.new_object_id();
    let kids = PageImporter::new(&source, &mut target).import_pages(&pages, pages_id)?;

    let count = kids.len();
    finish_page_tree(&mut target, pages_id, kids);
    let bytes = serialize(&mut target)?;

    Ok(NormalizedDocument {
        bytes,
        outcome: Outcome::Repaired { pages: count },
    })
}

/// Repair a PDF, or wrap it when repair fails.
pub fn repair_pdf(buf: &[u8]) -> NormalizedDocument {
    match try_repair_pdf(buf) {
        Ok(doc) => {
            info!(outcome = doc.outcome.label(), bytes = doc.bytes.len(), "cleaned PDF");
            doc
        }
        Err(err) => {
            warn!(error = %err, "PDF repair failed, falling back to wrapping");
            wrap_as_pdf(buf)
        }
    }
}
