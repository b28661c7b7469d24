//! Geometric grouping of glyphs into lines and lines into boxes.
//!
//! Glyphs are first bucketed by baseline, sorted left to right and split
//! wherever a horizontal gap is too wide to belong to the same line. Lines
//! are then stacked into boxes while they stay vertically close and share
//! horizontal extent.

use crate::content::Glyph;
use crate::geometry::Rect;

/// Baseline distance, as a fraction of the font size, within which two
/// glyphs share a line.
const BASELINE_TOLERANCE: f32 = 0.5;

/// Horizontal gap, as a fraction of the font size, that splits a line.
const LINE_SPLIT_GAP: f32 = 3.0;

/// Horizontal gap, as a fraction of the font size, that reads as a space.
const WORD_GAP: f32 = 0.15;

/// Vertical gap, as a fraction of the line height, below which a line joins
/// the box above it.
const BOX_LINE_GAP: f32 = 0.5;

/// A horizontal line of glyphs.
#[derive(Debug, Clone)]
pub struct TextLine {
    /// Glyphs sorted left to right
    pub glyphs: Vec<Glyph>,
    /// Line text with spaces inserted at word gaps
    pub text: String,
    /// Union of the glyph boxes
    pub bbox: Rect,
    /// Baseline y of the first glyph
    pub baseline: f32,
}

impl TextLine {
    fn from_glyphs(glyphs: Vec<Glyph>) -> Option<Self> {
        let first = glyphs.first()?;
        let baseline = first.baseline;
        let mut bbox = first.bbox;
        let mut text = String::new();
        let mut previous: Option<&Glyph> = None;

        for glyph in &glyphs {
            bbox = bbox.union(&glyph.bbox);
            if let Some(prev) = previous {
                let gap = prev.bbox.gap_to_right(&glyph.bbox);
                let size = prev.font_size.max(glyph.font_size);
                if gap > WORD_GAP * size
                    && !prev.text.ends_with(char::is_whitespace)
                    && !glyph.text.starts_with(char::is_whitespace)
                {
                    text.push(' ');
                }
            }
            text.push_str(&glyph.text);
            previous = Some(glyph);
        }

        Some(Self {
            glyphs,
            text,
            bbox,
            baseline,
        })
    }

    /// Mean effective font size of the line's glyphs.
    pub fn avg_font_size(&self) -> f32 {
        if self.glyphs.is_empty() {
            return 0.0;
        }
        self.glyphs.iter().map(|g| g.font_size).sum::<f32>() / self.glyphs.len() as f32
    }

    /// Font covering the most glyphs; ties go to the leftmost.
    pub fn dominant_font(&self) -> Option<&str> {
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for glyph in &self.glyphs {
            match counts.iter_mut().find(|(name, _)| *name == &*glyph.font) {
                Some((_, n)) => *n += 1,
                None => counts.push((&glyph.font, 1)),
            }
        }
        counts
            .iter()
            .fold(None, |best: Option<(&str, usize)>, &(name, n)| match best {
                Some((_, m)) if m >= n => best,
                _ => Some((name, n)),
            })
            .map(|(name, _)| name)
    }
}

/// Lines that belong together, top to bottom.
#[derive(Debug, Clone)]
pub struct TextBox {
    /// Lines in vertical order
    pub lines: Vec<TextLine>,
    /// Union of the line boxes
    pub bbox: Rect,
}

/// Group glyphs into lines.
///
/// Every input glyph lands in exactly one line. Lines come out ordered by
/// baseline, then left edge.
pub fn group_into_lines(glyphs: Vec<Glyph>) -> Vec<TextLine> {
    // Rows of glyphs sharing a baseline, keyed by the baseline of the first
    // glyph that opened the row.
    let mut rows: Vec<(f32, f32, Vec<Glyph>)> = Vec::new();
    for glyph in glyphs {
        let row = rows.iter_mut().find(|(baseline, size, _)| {
            let tolerance = BASELINE_TOLERANCE * size.max(glyph.font_size);
            (glyph.baseline - *baseline).abs() <= tolerance
        });
        match row {
            Some((_, _, members)) => members.push(glyph),
            None => rows.push((glyph.baseline, glyph.font_size, vec![glyph])),
        }
    }

    let mut lines = Vec::new();
    for (_, _, mut members) in rows {
        members.sort_by(|a, b| a.bbox.left().total_cmp(&b.bbox.left()));

        let mut current: Vec<Glyph> = Vec::new();
        for glyph in members {
            if let Some(prev) = current.last() {
                let size = prev.font_size.max(glyph.font_size);
                if prev.bbox.gap_to_right(&glyph.bbox) > LINE_SPLIT_GAP * size {
                    lines.extend(TextLine::from_glyphs(std::mem::take(&mut current)));
                }
            }
            current.push(glyph);
        }
        lines.extend(TextLine::from_glyphs(current));
    }

    lines.sort_by(|a, b| {
        a.baseline
            .total_cmp(&b.baseline)
            .then(a.bbox.left().total_cmp(&b.bbox.left()))
    });
    lines
}

/// Group lines into boxes.
///
/// A line joins the most recent box whose last line sits less than half a
/// line height above it and overlaps it horizontally. Boxes come out
/// ordered by top edge, then left edge.
pub fn group_into_boxes(mut lines: Vec<TextLine>) -> Vec<TextBox> {
    lines.sort_by(|a, b| {
        a.bbox
            .top()
            .total_cmp(&b.bbox.top())
            .then(a.bbox.left().total_cmp(&b.bbox.left()))
    });

    let mut boxes: Vec<TextBox> = Vec::new();
    for line in lines {
        let target = boxes.iter_mut().rev().find(|candidate| {
            candidate.lines.last().is_some_and(|last| {
                let gap = line.bbox.top() - last.bbox.bottom();
                let height = line.bbox.height.max(last.bbox.height);
                gap < BOX_LINE_GAP * height
                    && gap > -height
                    && last.bbox.horizontal_overlap(&line.bbox) > 0.0
            })
        });
        match target {
            Some(existing) => {
                existing.bbox = existing.bbox.union(&line.bbox);
                existing.lines.push(line);
            },
            None => boxes.push(TextBox {
                bbox: line.bbox,
                lines: vec![line],
            }),
        }
    }

    boxes.sort_by(|a, b| {
        a.bbox
            .top()
            .total_cmp(&b.bbox.top())
            .then(a.bbox.left().total_cmp(&b.bbox.left()))
    });
    boxes
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn glyph(text: &str, x: f32, baseline: f32, size: f32) -> Glyph {
        let width = size * 0.5 * text.chars().count() as f32;
        Glyph {
            text: text.to_string(),
            bbox: Rect::new(x, baseline - 0.8 * size, width, size),
            font: Arc::from("Helvetica"),
            font_size: size,
            baseline,
        }
    }

    fn word(text: &str, x: f32, baseline: f32, size: f32) -> Vec<Glyph> {
        text.chars()
            .enumerate()
            .map(|(i, c)| glyph(&c.to_string(), x + i as f32 * size * 0.5, baseline, size))
            .collect()
    }

    #[test]
    fn test_words_on_one_baseline_form_a_line() {
        let mut glyphs = word("Hello", 10.0, 100.0, 10.0);
        glyphs.extend(word("world", 40.0, 100.5, 10.0));
        let lines = group_into_lines(glyphs);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "Hello world");
        assert_eq!(lines[0].glyphs.len(), 10);
    }

    #[test]
    fn test_out_of_order_glyphs_are_sorted() {
        let mut glyphs = word("cd", 20.0, 50.0, 10.0);
        glyphs.extend(word("ab", 10.0, 50.0, 10.0));
        let lines = group_into_lines(glyphs);
        assert_eq!(lines[0].text, "abcd");
    }

    #[test]
    fn test_wide_gap_splits_line() {
        let mut glyphs = word("Left", 10.0, 100.0, 10.0);
        glyphs.extend(word("Right", 300.0, 100.0, 10.0));
        let lines = group_into_lines(glyphs);
        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["Left", "Right"]);
    }

    #[test]
    fn test_lines_ordered_top_down() {
        let mut glyphs = word("second", 10.0, 120.0, 10.0);
        glyphs.extend(word("first", 10.0, 100.0, 10.0));
        let lines = group_into_lines(glyphs);
        assert_eq!(lines[0].text, "first");
        assert_eq!(lines[1].text, "second");
    }

    #[test]
    fn test_close_lines_form_a_box_and_distant_ones_do_not() {
        let mut glyphs = word("one", 10.0, 100.0, 10.0);
        glyphs.extend(word("two", 10.0, 112.0, 10.0));
        glyphs.extend(word("far", 10.0, 200.0, 10.0));
        let boxes = group_into_boxes(group_into_lines(glyphs));
        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0].lines.len(), 2);
        assert_eq!(boxes[1].lines[0].text, "far");
    }

    #[test]
    fn test_columns_are_separate_boxes() {
        let mut glyphs = word("left", 10.0, 100.0, 10.0);
        glyphs.extend(word("right", 300.0, 100.0, 10.0));
        glyphs.extend(word("left2", 10.0, 112.0, 10.0));
        let boxes = group_into_boxes(group_into_lines(glyphs));
        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0].lines.len(), 2);
        assert_eq!(boxes[1].lines[0].text, "right");
    }

    #[test]
    fn test_dominant_font_and_size() {
        let mut glyphs = word("ab", 0.0, 10.0, 10.0);
        let mut bold = glyph("c", 10.0, 10.0, 14.0);
        bold.font = Arc::from("Helvetica-Bold");
        glyphs.push(bold);
        let lines = group_into_lines(glyphs);
        assert_eq!(lines[0].dominant_font(), Some("Helvetica"));
        assert!((lines[0].avg_font_size() - 34.0 / 3.0).abs() < 1e-4);
    }

    fn arb_glyph() -> impl Strategy<Value = Glyph> {
        (0.0f32..500.0, 0.0f32..700.0, 4.0f32..30.0)
            .prop_map(|(x, baseline, size)| glyph("x", x, baseline, size))
    }

    proptest! {
        #[test]
        fn prop_every_glyph_lands_in_one_line(glyphs in prop::collection::vec(arb_glyph(), 0..80)) {
            let count = glyphs.len();
            let lines = group_into_lines(glyphs);
            prop_assert_eq!(lines.iter().map(|l| l.glyphs.len()).sum::<usize>(), count);
            for line in &lines {
                for g in &line.glyphs {
                    prop_assert!(line.bbox.left() <= g.bbox.left() + 1e-3);
                    prop_assert!(line.bbox.right() >= g.bbox.right() - 1e-3);
                    prop_assert!(line.bbox.top() <= g.bbox.top() + 1e-3);
                    prop_assert!(line.bbox.bottom() >= g.bbox.bottom() - 1e-3);
                }
                for pair in line.glyphs.windows(2) {
                    prop_assert!(pair[0].bbox.left() <= pair[1].bbox.left());
                }
            }
        }

        #[test]
        fn prop_boxes_keep_every_line(glyphs in prop::collection::vec(arb_glyph(), 0..80)) {
            let lines = group_into_lines(glyphs);
            let line_count = lines.len();
            let boxes = group_into_boxes(lines);
            prop_assert_eq!(boxes.iter().map(|b| b.lines.len()).sum::<usize>(), line_count);
            for pair in boxes.windows(2) {
                prop_assert!(pair[0].bbox.top() <= pair[1].bbox.top());
            }
            for b in &boxes {
                prop_assert!(b.bbox.width >= 0.0 && b.bbox.height >= 0.0);
            }
        }
    }
}
