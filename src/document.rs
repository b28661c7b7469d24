//! Opened PDF documents.
//!
//! A [`DocumentHandle`] owns a fully parsed `lopdf::Document`. Parsing
//! happens once in [`DocumentHandle::open`]; afterwards the backend is only
//! ever read through shared references, which is what lets page extraction
//! workers share one handle without a lock.

use crate::error::{OpenError, PageExtractionError};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::fmt;
use std::path::{Path, PathBuf};

/// Maximum number of `/Parent` hops followed when looking up inherited page
/// attributes.
const MAX_INHERITANCE_DEPTH: usize = 32;

/// Maximum chain of indirect references followed by [`resolve`].
const MAX_REFERENCE_CHAIN: usize = 16;

/// US Letter, used when no MediaBox is found.
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

// Page workers read the backend concurrently through `&Document`.
const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Document>();
};

/// An opened document.
///
/// The handle is released by [`DocumentHandle::close`] or when dropped.
/// Page access on a closed handle fails with
/// [`PageExtractionError::BackendFailure`].
///
/// # Examples
///
/// ```no_run
/// use pdf_harvest::document::DocumentHandle;
///
/// let mut handle = DocumentHandle::open("report.pdf")?;
/// println!("{} pages", handle.page_count());
/// handle.close();
/// assert!(!handle.is_open());
/// # Ok::<(), pdf_harvest::error::OpenError>(())
/// ```
pub struct DocumentHandle {
    path: PathBuf,
    backend: Option<Document>,
    page_ids: Vec<ObjectId>,
}

impl fmt::Debug for DocumentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentHandle")
            .field("path", &self.path)
            .field("page_count", &self.page_ids.len())
            .field("open", &self.is_open())
            .finish()
    }
}

impl DocumentHandle {
    /// Open and parse the document at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, OpenError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => OpenError::NotFound {
                path: path.to_path_buf(),
            },
            _ => OpenError::Unreadable {
                path: path.to_path_buf(),
                source,
            },
        })?;
        Self::from_bytes(path, &bytes)
    }

    /// Parse an in-memory document. `path` identifies it in errors and logs.
    pub fn from_bytes(path: impl Into<PathBuf>, bytes: &[u8]) -> Result<Self, OpenError> {
        let path = path.into();
        let backend = Document::load_mem(bytes).map_err(|e| OpenError::CorruptFormat {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        if backend.trailer.get(b"Root").is_err() {
            return Err(OpenError::CorruptFormat {
                path,
                reason: "trailer has no /Root".to_string(),
            });
        }

        // get_pages is keyed by 1-based page number, so values come out in page order.
        let page_ids: Vec<ObjectId> = backend.get_pages().into_values().collect();
        log::debug!("Opened {} ({} pages)", path.display(), page_ids.len());

        Ok(Self {
            path,
            backend: Some(backend),
            page_ids,
        })
    }

    /// Source path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Total number of pages.
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Whether the backend is still held.
    pub fn is_open(&self) -> bool {
        self.backend.is_some()
    }

    /// Release the parsed document. Calling it again is a no-op.
    pub fn close(&mut self) {
        if self.backend.take().is_some() {
            log::trace!("Closed {}", self.path.display());
        }
    }

    /// Load the page at `page_index` (0-based): its decoded content stream,
    /// inherited resources and geometry.
    pub fn page(&self, page_index: usize) -> Result<Page<'_>, PageExtractionError> {
        let doc = self.backend.as_ref().ok_or_else(|| {
            PageExtractionError::backend(&self.path, page_index, "document handle is closed")
        })?;
        let page_id = *self.page_ids.get(page_index).ok_or_else(|| {
            PageExtractionError::backend(
                &self.path,
                page_index,
                format!("page index out of range (document has {} pages)", self.page_ids.len()),
            )
        })?;
        let corrupt = |reason: String| PageExtractionError::corrupt(&self.path, page_index, reason);

        let dict = doc
            .get_object(page_id)
            .and_then(Object::as_dict)
            .map_err(|e| corrupt(format!("page object {:?}: {}", page_id, e)))?;

        let content = match dict.get(b"Contents") {
            Ok(contents) => content_bytes(doc, contents, 0).map_err(corrupt)?,
            Err(_) => Vec::new(),
        };
        let operations = Content::decode(&content)
            .map_err(|e| corrupt(format!("cannot decode content stream: {}", e)))?
            .operations;

        let resources = match inherited(doc, dict, b"Resources") {
            Some(obj) => match resolve(doc, obj) {
                Ok(Object::Dictionary(d)) => Some(d),
                Ok(_) => None,
                Err(e) => return Err(corrupt(format!("dangling /Resources: {}", e))),
            },
            None => None,
        };

        let media_box = inherited(doc, dict, b"MediaBox")
            .and_then(|obj| rectangle(doc, obj))
            .unwrap_or(DEFAULT_MEDIA_BOX);

        Ok(Page {
            doc,
            index: page_index,
            top: media_box[3],
            resources,
            operations,
        })
    }
}

impl Drop for DocumentHandle {
    fn drop(&mut self) {
        self.close();
    }
}

/// A loaded page, borrowed from its [`DocumentHandle`].
pub struct Page<'a> {
    doc: &'a Document,
    index: usize,
    top: f32,
    resources: Option<&'a Dictionary>,
    operations: Vec<Operation>,
}

impl<'a> Page<'a> {
    /// 0-based page index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Top edge of the MediaBox in PDF user space. Page-space y values are
    /// flipped against this so that y grows downward.
    pub fn top(&self) -> f32 {
        self.top
    }

    /// Decoded content stream operations.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// The page's (possibly inherited) resource dictionary.
    pub fn resources(&self) -> Option<&'a Dictionary> {
        self.resources
    }

    /// The backend document, for resolving references held in resources.
    pub fn document(&self) -> &'a Document {
        self.doc
    }
}

/// Follow indirect references until a direct object is reached.
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> lopdf::Result<&'a Object> {
    let mut current = obj;
    for _ in 0..MAX_REFERENCE_CHAIN {
        match current {
            Object::Reference(id) => current = doc.get_object(*id)?,
            direct => return Ok(direct),
        }
    }
    Err(lopdf::Error::ReferenceLimit)
}

/// Stream payload, decompressed when the stream declares a filter.
pub(crate) fn stream_bytes(stream: &Stream) -> lopdf::Result<Vec<u8>> {
    if stream.dict.has(b"Filter") {
        stream.decompressed_content()
    } else {
        Ok(stream.content.clone())
    }
}

/// Look up `name` in the `category` sub-dictionary (`/Font`, `/XObject`) of
/// a resource dictionary.
pub(crate) fn resource_entry<'a>(
    doc: &'a Document,
    resources: &'a Dictionary,
    category: &[u8],
    name: &str,
) -> Option<&'a Object> {
    let category = match resolve(doc, resources.get(category).ok()?).ok()? {
        Object::Dictionary(d) => d,
        _ => return None,
    };
    resolve(doc, category.get(name.as_bytes()).ok()?).ok()
}

/// Concatenate a page's `/Contents`, which is either one stream or an array
/// of streams. Missing objects are an error: a page whose content cannot be
/// found is corrupt, not empty.
fn content_bytes(doc: &Document, contents: &Object, depth: usize) -> Result<Vec<u8>, String> {
    if depth > 1 {
        return Err("nested /Contents arrays".to_string());
    }
    match contents {
        Object::Reference(id) => {
            let obj = doc
                .get_object(*id)
                .map_err(|e| format!("content object {:?}: {}", id, e))?;
            content_bytes(doc, obj, depth)
        },
        Object::Stream(stream) => {
            stream_bytes(stream).map_err(|e| format!("cannot decompress content stream: {}", e))
        },
        Object::Array(parts) => {
            let mut data = Vec::new();
            for part in parts {
                data.extend(content_bytes(doc, part, depth + 1)?);
                data.push(b'\n');
            }
            Ok(data)
        },
        Object::Null => Ok(Vec::new()),
        other => Err(format!("/Contents is a {}, expected a stream", kind_name(other))),
    }
}

/// Short name of an object's variant, for diagnostics.
pub(crate) fn kind_name(obj: &Object) -> &'static str {
    match obj {
        Object::Null => "null",
        Object::Boolean(_) => "boolean",
        Object::Integer(_) => "integer",
        Object::Real(_) => "real",
        Object::Name(_) => "name",
        Object::String(..) => "string",
        Object::Array(_) => "array",
        Object::Dictionary(_) => "dictionary",
        Object::Stream(_) => "stream",
        Object::Reference(_) => "reference",
    }
}

/// Inheritable page attribute, walking up the page tree.
fn inherited<'a>(doc: &'a Document, page: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    let mut node = page;
    for _ in 0..MAX_INHERITANCE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        node = match resolve(doc, node.get(b"Parent").ok()?).ok()? {
            Object::Dictionary(parent) => parent,
            _ => return None,
        };
    }
    log::warn!("Page tree deeper than {} levels", MAX_INHERITANCE_DEPTH);
    None
}

fn rectangle(doc: &Document, obj: &Object) -> Option<[f32; 4]> {
    let items = match resolve(doc, obj).ok()? {
        Object::Array(items) if items.len() == 4 => items,
        _ => return None,
    };
    let mut values = [0.0f32; 4];
    for (slot, item) in values.iter_mut().zip(items) {
        *slot = crate::content::operators::number(resolve(doc, item).ok()?)?;
    }
    let [x0, y0, x1, y1] = values;
    Some([x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    /// One page, content stream `content`, parent holding the MediaBox.
    fn single_page(content: &[u8]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "MediaBox" => vec![0.into(), 0.into(), 300.into(), 400.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_open_missing_file() {
        let err = DocumentHandle::open("/definitely/not/here.pdf").unwrap_err();
        assert!(matches!(err, OpenError::NotFound { .. }));
        assert_eq!(err.path(), Path::new("/definitely/not/here.pdf"));
    }

    #[test]
    fn test_from_bytes_garbage() {
        let err = DocumentHandle::from_bytes("junk.pdf", b"this is not a pdf").unwrap_err();
        assert!(matches!(err, OpenError::CorruptFormat { .. }));
    }

    #[test]
    fn test_page_inherits_media_box() {
        let bytes = single_page(b"BT /F1 12 Tf 10 20 Td (Hi) Tj ET");
        let handle = DocumentHandle::from_bytes("one.pdf", &bytes).unwrap();
        assert_eq!(handle.page_count(), 1);

        let page = handle.page(0).unwrap();
        assert_eq!(page.top(), 400.0);
        assert!(page.operations().iter().any(|op| op.operator == "Tj"));
        assert!(page.resources().is_none());
    }

    #[test]
    fn test_page_out_of_range() {
        let bytes = single_page(b"");
        let handle = DocumentHandle::from_bytes("one.pdf", &bytes).unwrap();
        let err = handle.page(3).err().unwrap();
        assert!(matches!(err, PageExtractionError::BackendFailure { page_index: 3, .. }));
    }

    #[test]
    fn test_close_is_idempotent() {
        let bytes = single_page(b"");
        let mut handle = DocumentHandle::from_bytes("one.pdf", &bytes).unwrap();
        assert!(handle.is_open());
        handle.close();
        handle.close();
        assert!(!handle.is_open());
        assert!(handle.page(0).is_err());
    }
}
