//! Content stream interpretation.
//!
//! Content streams are tokenized by `lopdf`, lifted into typed
//! [`Operator`]s and executed against a [`GraphicsStateStack`] to place
//! every shown glyph on the page.

pub mod graphics_state;
pub mod interpreter;
pub mod operators;

pub use graphics_state::{GraphicsState, GraphicsStateStack, Matrix};
pub use interpreter::{interpret_page, Glyph, GlyphRun};
pub use operators::{Operator, TextElement};
