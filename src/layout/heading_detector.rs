//! Heading detection by font size.
//!
//! A page's body size is the median size of its lines. Lines set clearly
//! larger than the body are headings. A page that uses a single size has no
//! headings.

use crate::layout::text_block::BlockType;

/// Minimum ratio to the body size for a line to count as a heading.
pub const HEADING_SIZE_RATIO: f32 = 1.2;

/// Sizes closer than this (in points) are considered equal.
const SIZE_EPSILON: f32 = 0.5;

/// Classify each line of a page from its average font size.
///
/// # Examples
///
/// ```
/// use pdf_harvest::layout::heading_detector::classify_by_size;
/// use pdf_harvest::layout::BlockType;
///
/// let kinds = classify_by_size(&[24.0, 11.0, 11.0, 11.5]);
/// assert_eq!(kinds[0], BlockType::Heading);
/// assert_eq!(kinds[1], BlockType::Text);
/// ```
pub fn classify_by_size(sizes: &[f32]) -> Vec<BlockType> {
    let Some(body) = body_size(sizes) else {
        return vec![BlockType::Text; sizes.len()];
    };

    let (min, max) = sizes
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &s| (lo.min(s), hi.max(s)));
    if max - min < SIZE_EPSILON {
        return vec![BlockType::Text; sizes.len()];
    }

    sizes
        .iter()
        .map(|&size| {
            if size >= HEADING_SIZE_RATIO * body {
                BlockType::Heading
            } else {
                BlockType::Text
            }
        })
        .collect()
}

/// Median of the positive sizes; `None` when there are none.
fn body_size(sizes: &[f32]) -> Option<f32> {
    let mut sorted: Vec<f32> = sizes.iter().copied().filter(|s| *s > 0.0).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f32::total_cmp);
    Some(sorted[(sorted.len() - 1) / 2])
}
