//! Graphics and text state tracked while interpreting a content stream.
//!
//! Only the parameters that influence where glyphs land and how large they
//! are: colors, line styles and transparency are irrelevant to extraction.

use crate::geometry::Point;

/// A 2D transformation matrix.
///
/// PDF uses matrices of the form:
/// ```text
/// [ a  b  0 ]
/// [ c  d  0 ]
/// [ e  f  1 ]
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    /// Horizontal scaling component
    pub a: f32,
    /// Rotation/skew component
    pub b: f32,
    /// Rotation/skew component
    pub c: f32,
    /// Vertical scaling component
    pub d: f32,
    /// Horizontal translation
    pub e: f32,
    /// Vertical translation
    pub f: f32,
}

impl Matrix {
    /// The identity matrix.
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    /// Build a matrix from its six components.
    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// A pure translation.
    pub fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// `self × other`: first apply `self`, then `other`.
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Transform a point using this matrix.
    pub fn transform_point(&self, x: f32, y: f32) -> Point {
        Point {
            x: self.a * x + self.c * y + self.e,
            y: self.b * x + self.d * y + self.f,
        }
    }

    /// Length of the transformed unit y-vector, i.e. how much a glyph's
    /// height is scaled.
    pub fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

/// Graphics state parameters relevant to text placement.
#[derive(Debug, Clone)]
pub struct GraphicsState {
    /// Current transformation matrix (user space to page space)
    pub ctm: Matrix,
    /// Text matrix (text space to user space)
    pub text_matrix: Matrix,
    /// Text line matrix (start of the current line)
    pub text_line_matrix: Matrix,
    /// Character spacing (Tc)
    pub char_space: f32,
    /// Word spacing (Tw)
    pub word_space: f32,
    /// Horizontal scaling percentage (Tz)
    pub horizontal_scaling: f32,
    /// Text leading (TL)
    pub leading: f32,
    /// Current font resource name
    pub font_name: Option<String>,
    /// Current font size (Tf)
    pub font_size: f32,
    /// Text rise (Ts)
    pub text_rise: f32,
}

impl GraphicsState {
    /// Create a new graphics state with PDF defaults.
    pub fn new() -> Self {
        Self {
            ctm: Matrix::identity(),
            text_matrix: Matrix::identity(),
            text_line_matrix: Matrix::identity(),
            char_space: 0.0,
            word_space: 0.0,
            horizontal_scaling: 100.0,
            leading: 0.0,
            font_name: None,
            font_size: 12.0,
            text_rise: 0.0,
        }
    }

    /// Move the line matrix by `(tx, ty)` in text space and reset the text
    /// matrix to it (Td semantics).
    pub fn move_line(&mut self, tx: f32, ty: f32) {
        self.text_line_matrix = Matrix::translation(tx, ty).multiply(&self.text_line_matrix);
        self.text_matrix = self.text_line_matrix;
    }

    /// Advance the text matrix horizontally by `tx` text-space units.
    pub fn advance(&mut self, tx: f32) {
        self.text_matrix = Matrix::translation(tx, 0.0).multiply(&self.text_matrix);
    }

    /// Text rendering matrix without the per-glyph font scaling:
    /// `Tm × CTM`.
    pub fn text_to_page(&self) -> Matrix {
        self.text_matrix.multiply(&self.ctm)
    }
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self::new()
    }
}

/// Stack of graphics states for `q`/`Q`.
#[derive(Debug, Clone)]
pub struct GraphicsStateStack {
    stack: Vec<GraphicsState>,
}

impl GraphicsStateStack {
    /// Stack holding one default state.
    pub fn new() -> Self {
        Self {
            stack: vec![GraphicsState::new()],
        }
    }

    /// The active state.
    pub fn current(&self) -> &GraphicsState {
        // The bottom state is never popped.
        &self.stack[self.stack.len() - 1]
    }

    /// The active state, mutably.
    pub fn current_mut(&mut self) -> &mut GraphicsState {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    /// `q`: push a copy of the active state.
    pub fn save(&mut self) {
        let copy = self.current().clone();
        self.stack.push(copy);
    }

    /// `Q`: pop the active state. Unbalanced restores are ignored.
    pub fn restore(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        } else {
            log::debug!("Ignoring unbalanced Q operator");
        }
    }

    /// Current nesting depth (1 when nothing was saved).
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl Default for GraphicsStateStack {
    fn default() -> Self {
        Self::new()
    }
}
