//! Positioned text blocks, the unit of metadata extraction.

use crate::geometry::Rect;
use serde::{Deserialize, Serialize};

/// Role of a block within the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    /// Body text
    #[default]
    Text,
    /// Text set clearly larger than the page's body text
    Heading,
    /// Tabular content (reserved for table detection)
    Table,
}

/// A run of text with its page, bounding box and font.
///
/// Coordinates are in points with the origin at the top-left of the page,
/// so `y0` is the top edge and `y1` the bottom edge. Blocks are immutable:
/// the constructor normalises the box so that `x0 <= x1` and `y0 <= y1`
/// always hold.
///
/// # Examples
///
/// ```
/// use pdf_harvest::geometry::Rect;
/// use pdf_harvest::layout::{BlockType, TextBlock};
///
/// let block = TextBlock::new("Introduction", 1, Rect::new(72.0, 90.0, 120.0, 18.0))
///     .with_font("Helvetica-Bold", 18.0)
///     .with_block_type(BlockType::Heading);
///
/// assert_eq!(block.page_num(), 1);
/// assert_eq!(block.x1(), 192.0);
/// assert_eq!(block.font(), Some("Helvetica-Bold"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawTextBlock")]
pub struct TextBlock {
    text: String,
    page_num: u32,
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
    font: Option<String>,
    font_size: Option<f32>,
    block_type: BlockType,
}

impl TextBlock {
    /// Create a body-text block on the 1-based page `page_num`.
    pub fn new(text: impl Into<String>, page_num: u32, bbox: Rect) -> Self {
        Self::from_corners(
            text.into(),
            page_num,
            [bbox.left(), bbox.top(), bbox.right(), bbox.bottom()],
        )
    }

    fn from_corners(text: String, page_num: u32, [ax, ay, bx, by]: [f32; 4]) -> Self {
        Self {
            text,
            page_num,
            x0: ax.min(bx),
            y0: ay.min(by),
            x1: ax.max(bx),
            y1: ay.max(by),
            font: None,
            font_size: None,
            block_type: BlockType::Text,
        }
    }

    /// Attach the font name and size.
    pub fn with_font(mut self, font: impl Into<String>, font_size: f32) -> Self {
        self.font = Some(font.into());
        self.font_size = Some(font_size);
        self
    }

    /// Set the block type.
    pub fn with_block_type(mut self, block_type: BlockType) -> Self {
        self.block_type = block_type;
        self
    }

    /// Block text. May be empty.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// 1-based page number.
    pub fn page_num(&self) -> u32 {
        self.page_num
    }

    /// Left edge.
    pub fn x0(&self) -> f32 {
        self.x0
    }

    /// Top edge.
    pub fn y0(&self) -> f32 {
        self.y0
    }

    /// Right edge.
    pub fn x1(&self) -> f32 {
        self.x1
    }

    /// Bottom edge.
    pub fn y1(&self) -> f32 {
        self.y1
    }

    /// Bounding box as a [`Rect`].
    pub fn bbox(&self) -> Rect {
        Rect::from_points(self.x0, self.y0, self.x1, self.y1)
    }

    /// Font name, when known.
    pub fn font(&self) -> Option<&str> {
        self.font.as_deref()
    }

    /// Font size in points, when known.
    pub fn font_size(&self) -> Option<f32> {
        self.font_size
    }

    /// Block type.
    pub fn block_type(&self) -> BlockType {
        self.block_type
    }
}

#[derive(Deserialize)]
struct RawTextBlock {
    text: String,
    page_num: u32,
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
    #[serde(default)]
    font: Option<String>,
    #[serde(default)]
    font_size: Option<f32>,
    #[serde(default)]
    block_type: BlockType,
}

impl From<RawTextBlock> for TextBlock {
    fn from(raw: RawTextBlock) -> Self {
        let mut block = TextBlock::from_corners(raw.text, raw.page_num, [raw.x0, raw.y0, raw.x1, raw.y1]);
        block.font = raw.font;
        block.font_size = raw.font_size;
        block.block_type = raw.block_type;
        block
    }
}
