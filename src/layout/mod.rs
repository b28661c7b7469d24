//! Layout analysis: the text block model and the grouping of positioned
//! glyphs into lines, boxes and headings.

pub mod clustering;
pub mod heading_detector;
pub mod text_block;

pub use clustering::{group_into_boxes, group_into_lines, TextBox, TextLine};
pub use heading_detector::classify_by_size;
pub use text_block::{BlockType, TextBlock};
