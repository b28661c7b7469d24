//! Glyph-level extraction with line and box reconstruction.
//!
//! The page is decoded into individual glyphs, which are regrouped
//! geometrically regardless of the order the content stream drew them in.
//! One block is emitted per line, box by box; lines set well above the
//! page's body size are tagged as headings.

use crate::content::interpret_page;
use crate::document::DocumentHandle;
use crate::error::PageExtractionError;
use crate::extractors::PageExtractor;
use crate::layout::{classify_by_size, group_into_boxes, group_into_lines, TextBlock, TextBox};

/// The precision backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrecisionScanner;

impl PrecisionScanner {
    /// Create a scanner.
    pub fn new() -> Self {
        Self
    }

    fn boxes(
        &self,
        handle: &DocumentHandle,
        page_index: usize,
    ) -> Result<Vec<TextBox>, PageExtractionError> {
        let page = handle.page(page_index)?;
        let glyphs = interpret_page(&page)
            .into_iter()
            .flat_map(|run| run.glyphs)
            .collect();
        Ok(group_into_boxes(group_into_lines(glyphs)))
    }
}

impl PageExtractor for PrecisionScanner {
    fn name(&self) -> &'static str {
        "precision"
    }

    fn extract_page(
        &self,
        handle: &DocumentHandle,
        page_index: usize,
    ) -> Result<String, PageExtractionError> {
        let paragraphs: Vec<String> = self
            .boxes(handle, page_index)?
            .iter()
            .map(|text_box| {
                text_box
                    .lines
                    .iter()
                    .map(|line| line.text.trim())
                    .filter(|text| !text.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .filter(|paragraph| !paragraph.is_empty())
            .collect();
        Ok(paragraphs.join("\n\n"))
    }

    fn extract_page_blocks(
        &self,
        handle: &DocumentHandle,
        page_index: usize,
    ) -> Result<Vec<TextBlock>, PageExtractionError> {
        let page_num = page_index as u32 + 1;
        let lines: Vec<_> = self
            .boxes(handle, page_index)?
            .into_iter()
            .flat_map(|text_box| text_box.lines)
            .filter(|line| !line.text.trim().is_empty())
            .collect();

        let sizes: Vec<f32> = lines.iter().map(|line| line.avg_font_size()).collect();
        let kinds = classify_by_size(&sizes);

        Ok(lines
            .iter()
            .zip(kinds)
            .zip(sizes)
            .map(|((line, kind), size)| {
                let block = TextBlock::new(line.text.trim(), page_num, line.bbox);
                let block = match line.dominant_font() {
                    Some(font) => block.with_font(font, size),
                    None => block,
                };
                block.with_block_type(kind)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::BlockType;
    use crate::test_support::handle;

    const TWO_PARAGRAPHS: &[u8] = b"BT /F1 20 Tf 72 740 Td (Report Title) Tj ET \
        BT /F1 10 Tf 72 700 Td (First line of text) Tj 0 -12 Td (second line) Tj ET \
        BT /F1 10 Tf 72 600 Td (Another paragraph) Tj ET";

    #[test]
    fn test_plain_text_separates_boxes() {
        let handle = handle(&[TWO_PARAGRAPHS]);
        let text = PrecisionScanner::new().extract_page(&handle, 0).unwrap();
        assert_eq!(
            text,
            "Report Title\n\nFirst line of text\nsecond line\n\nAnother paragraph"
        );
    }

    #[test]
    fn test_blocks_are_lines_with_headings() {
        let handle = handle(&[TWO_PARAGRAPHS]);
        let blocks = PrecisionScanner::new().extract_page_blocks(&handle, 0).unwrap();
        let texts: Vec<&str> = blocks.iter().map(|b| b.text()).collect();
        assert_eq!(
            texts,
            vec!["Report Title", "First line of text", "second line", "Another paragraph"]
        );
        assert_eq!(blocks[0].block_type(), BlockType::Heading);
        assert!(blocks[1..].iter().all(|b| b.block_type() == BlockType::Text));
        assert_eq!(blocks[0].font(), Some("Helvetica"));
        assert_eq!(blocks[0].font_size(), Some(20.0));
    }

    #[test]
    fn test_stream_order_does_not_matter() {
        let content = b"BT /F1 10 Tf 120 700 Td (world) Tj -50 0 Td (hello) Tj ET";
        let handle = handle(&[content]);
        let text = PrecisionScanner::new().extract_page(&handle, 0).unwrap();
        assert_eq!(text, "hello world");
    }

    #[test]
    fn test_single_span_page_matches_fast_output() {
        let handle = handle(&[b"BT /F1 12 Tf 72 720 Td (Page 2) Tj ET"]);
        assert_eq!(PrecisionScanner::new().extract_page(&handle, 0).unwrap(), "Page 2");
    }
}
