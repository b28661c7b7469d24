//! Page extractors.
//!
//! Two interchangeable backends implement [`PageExtractor`]:
//! [`FastScanner`] reports one block per text-showing operator, while
//! [`PrecisionScanner`] rebuilds lines and boxes from individual glyphs.
//! The coordinator picks one with [`select_extractor`] and never branches on
//! the variant afterwards.

pub mod fast;
pub mod precision;
pub mod tables;

pub use fast::FastScanner;
pub use precision::PrecisionScanner;
pub use tables::{extract_tables, Table, TableExtraction, TableSupport};

use crate::config::ExtractionConfig;
use crate::document::DocumentHandle;
use crate::error::PageExtractionError;
use crate::layout::TextBlock;

/// Extraction of a single page, in plain-text or block form.
///
/// Implementations are stateless and shared across page workers.
pub trait PageExtractor: Send + Sync {
    /// Backend name, for logs.
    fn name(&self) -> &'static str;

    /// Plain text of the page at `page_index` (0-based).
    fn extract_page(
        &self,
        handle: &DocumentHandle,
        page_index: usize,
    ) -> Result<String, PageExtractionError>;

    /// Positioned blocks of the page at `page_index` (0-based), in reading
    /// order.
    fn extract_page_blocks(
        &self,
        handle: &DocumentHandle,
        page_index: usize,
    ) -> Result<Vec<TextBlock>, PageExtractionError>;
}

/// Which page extractor a configuration selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScannerKind {
    /// [`FastScanner`]
    Fast,
    /// [`PrecisionScanner`]
    Precision,
}

impl ScannerKind {
    /// `detailed` selects the precision backend.
    pub fn for_config(config: &ExtractionConfig) -> Self {
        if config.detailed {
            ScannerKind::Precision
        } else {
            ScannerKind::Fast
        }
    }
}

/// Build the page extractor selected by `config`.
///
/// # Examples
///
/// ```
/// use pdf_harvest::config::ExtractionConfig;
/// use pdf_harvest::extractors::select_extractor;
///
/// let extractor = select_extractor(&ExtractionConfig::new().with_detailed(true));
/// assert_eq!(extractor.name(), "precision");
/// ```
pub fn select_extractor(config: &ExtractionConfig) -> Box<dyn PageExtractor> {
    match ScannerKind::for_config(config) {
        ScannerKind::Fast => Box::new(FastScanner::new()),
        ScannerKind::Precision => Box::new(PrecisionScanner::new()),
    }
}
