//! Table extraction.
//!
//! No detector exists yet. The call surface is kept separate from text
//! extraction so that one can be added without changing callers, and the
//! result says whether "no tables" means none were found or none were
//! looked for.

use crate::document::DocumentHandle;
use serde::{Deserialize, Serialize};

/// A table found on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// 1-based page number
    pub page_num: u32,
    /// Bounding box as `[x0, y0, x1, y1]` in top-left page space
    pub bbox: [f32; 4],
    /// Cell text, row by row
    pub rows: Vec<Vec<String>>,
}

/// How far table extraction went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableSupport {
    /// Detection is not implemented; an empty result says nothing about
    /// the document.
    Unsupported,
    /// Every page was searched.
    Complete,
}

/// Result of [`extract_tables`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableExtraction {
    /// Tables in page order
    pub tables: Vec<Table>,
    /// Whether `tables` is authoritative
    pub status: TableSupport,
}

impl TableExtraction {
    /// Whether the document was actually searched for tables.
    pub fn is_supported(&self) -> bool {
        self.status == TableSupport::Complete
    }
}

/// Extract tables from the document. Currently always returns an empty,
/// [`TableSupport::Unsupported`] result.
///
/// # Examples
///
/// ```no_run
/// use pdf_harvest::document::DocumentHandle;
/// use pdf_harvest::extractors::{extract_tables, TableSupport};
///
/// let handle = DocumentHandle::open("invoice.pdf")?;
/// let result = extract_tables(&handle);
/// assert!(result.tables.is_empty());
/// assert_eq!(result.status, TableSupport::Unsupported);
/// # Ok::<(), pdf_harvest::error::OpenError>(())
/// ```
pub fn extract_tables(handle: &DocumentHandle) -> TableExtraction {
    log::warn!(
        "Table extraction is not implemented; returning no tables for {}",
        handle.path().display()
    );
    TableExtraction {
        tables: Vec::new(),
        status: TableSupport::Unsupported,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::handle;

    #[test]
    fn test_stub_is_empty_and_unsupported() {
        let handle = handle(&[b"BT /F1 12 Tf 72 720 Td (a | b) Tj ET"]);
        let result = extract_tables(&handle);
        assert!(result.tables.is_empty());
        assert!(!result.is_supported());
        assert_eq!(serde_json::to_value(result.status).unwrap(), "unsupported");
    }
}
