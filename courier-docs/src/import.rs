use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::nesting::MAX_NESTING;
use crate::DocumentError;

/// Keys a page may inherit from its ancestors in the page tree.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Guard against cyclic `Parent` chains in broken files.
const MAX_TREE_DEPTH: usize = 64;

/// Deep-copies pages from one document into another.
///
/// Every object reachable from an imported page is copied once, no matter
/// how many pages share it. References that point nowhere become `null`.
/// Indirect objects are copied from a worklist, so long reference chains
/// cost heap rather than stack.
pub(crate) struct PageImporter<'a> {
    source: &'a Document,
    target: &'a mut Document,
    remap: BTreeMap<ObjectId, ObjectId>,
    /// Reserved in `target` but not yet copied.
    pending: Vec<(ObjectId, ObjectId)>,
}

impl<'a> PageImporter<'a> {
    pub fn new(source: &'a Document, target: &'a mut Document) -> Self {
        Self {
            source,
            target,
            remap: BTreeMap::new(),
            pending: Vec::new(),
        }
    }

    /// Import the pages in order, hanging each one under `parent`.
    pub fn import_pages(
        &mut self,
        pages: &[ObjectId],
        parent: ObjectId,
    ) -> Result<Vec<ObjectId>, DocumentError> {
        // Pages get their ids up front so that cross-page references
        // (annotations, outlines) resolve to the new page objects.
        for page_id in pages {
            let new_id = self.target.new_object_id();
            self.remap.insert(*page_id, new_id);
        }

        let kids = pages
            .iter()
            .map(|page_id| self.import_page(*page_id, parent))
            .collect::<Result<Vec<_>, _>>()?;

        self.drain()?;
        Ok(kids)
    }

    fn import_page(&mut self, page_id: ObjectId, parent: ObjectId) -> Result<ObjectId, DocumentError> {
        let source = self.source;
        let page = source
            .get_dictionary(page_id)
            .map_err(|e| DocumentError::Copy(format!("page {page_id:?}: {e}")))?;

        let mut copied = Dictionary::new();
        for (key, value) in page.iter() {
            if key.as_slice() == b"Parent" {
                continue;
            }
            copied.set(key.clone(), self.import_object(value, 0)?);
        }

        for key in INHERITABLE_KEYS {
            if copied.has(key) {
                continue;
            }
            if let Some(inherited) = self.inherited(page, key) {
                let value = self.import_object(&inherited, 0)?;
                copied.set(key.to_vec(), value);
            }
        }

        copied.set("Type", "Page");
        copied.set("Parent", parent);

        let new_id = self.remap[&page_id];
        self.target.objects.insert(new_id, Object::Dictionary(copied));
        Ok(new_id)
    }

    /// Walks up the `Parent` chain looking for `key`.
    fn inherited(&self, page: &Dictionary, key: &[u8]) -> Option<Object> {
        let mut node = page;
        for _ in 0..MAX_TREE_DEPTH {
            let parent_id = node.get(b"Parent").and_then(Object::as_reference).ok()?;
            node = self.source.get_dictionary(parent_id).ok()?;
            if let Ok(value) = node.get(key) {
                return Some(value.clone());
            }
        }
        None
    }

    /// Copy every object reserved so far, and whatever those reach.
    fn drain(&mut self) -> Result<(), DocumentError> {
        let source = self.source;
        while let Some((id, new_id)) = self.pending.pop() {
            let copied = match source.get_object(id) {
                Ok(object) => self.import_object(object, 0)?,
                Err(_) => Object::Null,
            };
            self.target.objects.insert(new_id, copied);
        }
        Ok(())
    }

    /// Copies direct structure and rewrites references. Referenced objects
    /// are only reserved here; [`Self::drain`] copies them.
    fn import_object(&mut self, object: &Object, depth: usize) -> Result<Object, DocumentError> {
        if depth > MAX_NESTING {
            return Err(DocumentError::Copy(format!(
                "objects nested deeper than {MAX_NESTING} levels"
            )));
        }

        Ok(match object {
            Object::Reference(id) => Object::Reference(self.reserve(*id)),
            Object::Array(items) => Object::Array(
                items
                    .iter()
                    .map(|item| self.import_object(item, depth + 1))
                    .collect::<Result<_, _>>()?,
            ),
            Object::Dictionary(dict) => Object::Dictionary(self.import_dictionary(dict, depth + 1)?),
            Object::Stream(stream) => {
                let mut copied = stream.clone();
                copied.dict = self.import_dictionary(&stream.dict, depth + 1)?;
                Object::Stream(copied)
            }
            other => other.clone(),
        })
    }

    fn import_dictionary(&mut self, dict: &Dictionary, depth: usize) -> Result<Dictionary, DocumentError> {
        let mut copied = Dictionary::new();
        for (key, value) in dict.iter() {
            copied.set(key.clone(), self.import_object(value, depth)?);
        }
        Ok(copied)
    }

    fn reserve(&mut self, id: ObjectId) -> ObjectId {
        if let Some(new_id) = self.remap.get(&id) {
            return *new_id;
        }

        let new_id = self.target.new_object_id();
        // Registered before copying so that cycles terminate.
        self.remap.insert(id, new_id);
        self.pending.push((id, new_id));
        new_id
    }
}
