//! Span-level extraction.
//!
//! Every `Tj`/`TJ` becomes one block whose box covers the whole span. No
//! regrouping happens, so output follows content stream order.

use crate::content::{interpret_page, GlyphRun};
use crate::document::DocumentHandle;
use crate::error::PageExtractionError;
use crate::extractors::PageExtractor;
use crate::layout::TextBlock;

/// Baseline shift, as a fraction of the font size, that starts a new line.
const NEWLINE_SHIFT: f32 = 0.5;

/// Horizontal gap between spans, as a fraction of the font size, that gets
/// a space.
const SPACE_GAP: f32 = 0.25;

/// The fast backend: one block per text-showing operator.
#[derive(Debug, Clone, Copy, Default)]
pub struct FastScanner;

impl FastScanner {
    /// Create a scanner.
    pub fn new() -> Self {
        Self
    }

    fn runs(
        &self,
        handle: &DocumentHandle,
        page_index: usize,
    ) -> Result<Vec<GlyphRun>, PageExtractionError> {
        let page = handle.page(page_index)?;
        Ok(interpret_page(&page))
    }
}

impl PageExtractor for FastScanner {
    fn name(&self) -> &'static str {
        "fast"
    }

    fn extract_page(
        &self,
        handle: &DocumentHandle,
        page_index: usize,
    ) -> Result<String, PageExtractionError> {
        Ok(join_runs(&self.runs(handle, page_index)?))
    }

    fn extract_page_blocks(
        &self,
        handle: &DocumentHandle,
        page_index: usize,
    ) -> Result<Vec<TextBlock>, PageExtractionError> {
        let page_num = page_index as u32 + 1;
        Ok(self
            .runs(handle, page_index)?
            .into_iter()
            .filter(|run| !run.text.trim().is_empty())
            .map(|run| {
                TextBlock::new(run.text, page_num, run.bbox).with_font(run.font, run.font_size)
            })
            .collect())
    }
}

/// Concatenate span texts, breaking lines on baseline changes and spacing
/// spans that are visibly apart.
fn join_runs(runs: &[GlyphRun]) -> String {
    let mut text = String::new();
    let mut previous: Option<&GlyphRun> = None;

    for run in runs {
        if let Some(prev) = previous {
            let size = prev.font_size.max(run.font_size);
            if (run.baseline - prev.baseline).abs() > NEWLINE_SHIFT * size {
                text.push('\n');
            } else if prev.bbox.gap_to_right(&run.bbox) > SPACE_GAP * size
                && !text.ends_with(char::is_whitespace)
                && !run.text.starts_with(char::is_whitespace)
            {
                text.push(' ');
            }
        }
        text.push_str(&run.text);
        previous = Some(run);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{handle, pdf_bytes_with_missing_contents};

    #[test]
    fn test_single_span_page() {
        let handle = handle(&[b"BT /F1 12 Tf 72 720 Td (Page 1) Tj ET"]);
        assert_eq!(FastScanner::new().extract_page(&handle, 0).unwrap(), "Page 1");
    }

    #[test]
    fn test_lines_and_spaces_between_spans() {
        let content = b"BT /F1 10 Tf 72 720 Td (Hello) Tj 40 0 Td (there) Tj \
                        0 -14 Td (next line) Tj ET";
        let handle = handle(&[content]);
        let text = FastScanner::new().extract_page(&handle, 0).unwrap();
        assert_eq!(text, "Hello there\nnext line");
    }

    #[test]
    fn test_blocks_are_span_level() {
        let content = b"BT /F1 10 Tf 72 720 Td (A) Tj 0 -20 Td [(B) -100 (C)] TJ ( ) Tj ET";
        let handle = handle(&[content]);
        let blocks = FastScanner::new().extract_page_blocks(&handle, 0).unwrap();
        let texts: Vec<&str> = blocks.iter().map(|b| b.text()).collect();
        assert_eq!(texts, vec!["A", "BC"]);
        for block in &blocks {
            assert_eq!(block.page_num(), 1);
            assert_eq!(block.font(), Some("Helvetica"));
            assert_eq!(block.font_size(), Some(10.0));
            assert!(block.x0() <= block.x1() && block.y0() <= block.y1());
        }
        assert!(blocks[0].y1() < blocks[1].y1());
    }

    #[test]
    fn test_corrupt_page_reports_index() {
        let bytes = pdf_bytes_with_missing_contents(&[b"BT (ok) Tj ET", b"BT (gone) Tj ET"], 1);
        let handle = DocumentHandle::from_bytes("broken.pdf", &bytes).unwrap();
        let scanner = FastScanner::new();
        assert_eq!(scanner.extract_page(&handle, 0).unwrap(), "ok");

        let err = scanner.extract_page(&handle, 1).unwrap_err();
        assert!(matches!(err, PageExtractionError::CorruptPage { .. }));
        assert_eq!(err.page_index(), 1);
    }
}
