//! Executes a page's content stream and records every shown glyph.
//!
//! Each text-showing operator (`Tj`, `TJ`, `'`, `"`) produces one
//! [`GlyphRun`]. Glyph boxes are computed from font metrics and the full
//! text rendering matrix, then flipped into top-left page space.

use crate::content::graphics_state::{GraphicsStateStack, Matrix};
use crate::content::operators::{Operator, TextElement};
use crate::document::{resolve, resource_entry, stream_bytes, Page};
use crate::fonts::FontInfo;
use crate::geometry::{Point, Rect};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

/// Maximum nesting of form XObjects.
const MAX_FORM_DEPTH: usize = 8;

/// Glyph extent below the baseline, as a fraction of the font size.
const DESCENT: f32 = 0.2;

/// Glyph extent above the baseline, as a fraction of the font size.
const ASCENT: f32 = 0.8;

/// A `TJ` adjustment wider than this fraction of an em reads as a word
/// break.
const TJ_SPACE_THRESHOLD: f32 = 0.2;

/// One shown character code.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    /// Decoded text (several characters for ligatures)
    pub text: String,
    /// Glyph box in page space
    pub bbox: Rect,
    /// BaseFont of the font in use
    pub font: Arc<str>,
    /// Effective font size after the text and transformation matrices
    pub font_size: f32,
    /// Baseline y in page space
    pub baseline: f32,
}

/// Glyphs shown by a single text-showing operator.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphRun {
    /// Concatenated glyph text, with a space where a `TJ` offset opens a
    /// word gap
    pub text: String,
    /// Union of the glyph boxes
    pub bbox: Rect,
    /// BaseFont of the font in use
    pub font: String,
    /// Effective font size of the first glyph
    pub font_size: f32,
    /// Baseline y of the first glyph
    pub baseline: f32,
    /// Individual glyphs, in show order
    pub glyphs: Vec<Glyph>,
}

/// Interpret the page's content stream, returning glyph runs in stream
/// order. Runs that decode to no text are dropped.
pub fn interpret_page(page: &Page<'_>) -> Vec<GlyphRun> {
    let mut interpreter = Interpreter {
        doc: page.document(),
        top: page.top(),
        stack: GraphicsStateStack::new(),
        font_cache: HashMap::new(),
        runs: Vec::new(),
    };
    interpreter.execute(page.operations(), page.resources(), 0);
    log::trace!("Page {}: {} glyph runs", page.index(), interpreter.runs.len());
    interpreter.runs
}

struct Interpreter<'a> {
    doc: &'a Document,
    top: f32,
    stack: GraphicsStateStack,
    font_cache: HashMap<lopdf::ObjectId, Rc<FontInfo>>,
    runs: Vec<GlyphRun>,
}

impl<'a> Interpreter<'a> {
    fn execute(&mut self, operations: &[Operation], resources: Option<&'a Dictionary>, depth: usize) {
        for operation in operations {
            match Operator::from_operation(operation) {
                Ok(Some(op)) => self.apply(op, resources, depth),
                Ok(None) => {},
                Err(reason) => log::warn!("Skipping malformed operator: {}", reason),
            }
        }
    }

    fn apply(&mut self, op: Operator, resources: Option<&'a Dictionary>, depth: usize) {
        match op {
            Operator::BeginText => {
                let state = self.stack.current_mut();
                state.text_matrix = Matrix::identity();
                state.text_line_matrix = Matrix::identity();
            },
            Operator::EndText => {},
            Operator::Td { tx, ty } => self.stack.current_mut().move_line(tx, ty),
            Operator::TD { tx, ty } => {
                let state = self.stack.current_mut();
                state.leading = -ty;
                state.move_line(tx, ty);
            },
            Operator::Tm([a, b, c, d, e, f]) => {
                let state = self.stack.current_mut();
                state.text_matrix = Matrix::new(a, b, c, d, e, f);
                state.text_line_matrix = state.text_matrix;
            },
            Operator::TStar => self.next_line(),
            Operator::Tj(bytes) => {
                self.show(&[TextElement::String(bytes)], resources);
            },
            Operator::TJ(elements) => self.show(&elements, resources),
            Operator::Quote(bytes) => {
                self.next_line();
                self.show(&[TextElement::String(bytes)], resources);
            },
            Operator::DoubleQuote {
                word_space,
                char_space,
                text,
            } => {
                let state = self.stack.current_mut();
                state.word_space = word_space;
                state.char_space = char_space;
                self.next_line();
                self.show(&[TextElement::String(text)], resources);
            },
            Operator::Tc(v) => self.stack.current_mut().char_space = v,
            Operator::Tw(v) => self.stack.current_mut().word_space = v,
            Operator::Tz(v) => self.stack.current_mut().horizontal_scaling = v,
            Operator::TL(v) => self.stack.current_mut().leading = v,
            Operator::Ts(v) => self.stack.current_mut().text_rise = v,
            Operator::Tf { font, size } => {
                let state = self.stack.current_mut();
                state.font_name = Some(font);
                state.font_size = size;
            },
            Operator::SaveState => self.stack.save(),
            Operator::RestoreState => self.stack.restore(),
            Operator::Cm([a, b, c, d, e, f]) => {
                let state = self.stack.current_mut();
                state.ctm = Matrix::new(a, b, c, d, e, f).multiply(&state.ctm);
            },
            Operator::Do(name) => self.run_form(&name, resources, depth),
        }
    }

    fn next_line(&mut self) {
        let state = self.stack.current_mut();
        let leading = state.leading;
        state.move_line(0.0, -leading);
    }

    fn font(&mut self, resources: Option<&'a Dictionary>) -> Rc<FontInfo> {
        let name = self.stack.current().font_name.clone().unwrap_or_default();
        let entry = resources.and_then(|res| {
            let fonts = match resolve(self.doc, res.get(b"Font").ok()?).ok()? {
                Object::Dictionary(d) => d,
                _ => return None,
            };
            fonts.get(name.as_bytes()).ok()
        });

        match entry {
            Some(Object::Reference(id)) => {
                if let Some(font) = self.font_cache.get(id) {
                    return Rc::clone(font);
                }
                let font = match self.doc.get_object(*id).and_then(Object::as_dict) {
                    Ok(dict) => FontInfo::from_dictionary(self.doc, &name, dict),
                    Err(e) => {
                        log::warn!("Font /{} ({:?}) unreadable: {}", name, id, e);
                        FontInfo::fallback(&name)
                    },
                };
                let font = Rc::new(font);
                self.font_cache.insert(*id, Rc::clone(&font));
                font
            },
            Some(Object::Dictionary(dict)) => {
                Rc::new(FontInfo::from_dictionary(self.doc, &name, dict))
            },
            _ => {
                log::debug!("Font /{} not found in resources, using fallback", name);
                Rc::new(FontInfo::fallback(&name))
            },
        }
    }

    fn show(&mut self, elements: &[TextElement], resources: Option<&'a Dictionary>) {
        let font = self.font(resources);
        let font_name: Arc<str> = Arc::from(font.base_font.as_str());
        let mut text = String::new();
        let mut glyphs = Vec::new();

        for element in elements {
            match element {
                TextElement::String(bytes) => {
                    for decoded in font.decode(bytes) {
                        let glyph = self.place_glyph(&font, &font_name, decoded.code, decoded.text);
                        if let Some(glyph) = glyph {
                            text.push_str(&glyph.text);
                            glyphs.push(glyph);
                        }
                    }
                },
                TextElement::Offset(adjust) => {
                    let state = self.stack.current_mut();
                    let th = state.horizontal_scaling / 100.0;
                    let shift = -adjust / 1000.0;
                    state.advance(shift * state.font_size * th);
                    if shift > TJ_SPACE_THRESHOLD
                        && !text.is_empty()
                        && !text.ends_with(char::is_whitespace)
                    {
                        text.push(' ');
                    }
                },
            }
        }

        let Some(first) = glyphs.first() else {
            return;
        };
        let bbox = glyphs.iter().skip(1).fold(first.bbox, |acc, g| acc.union(&g.bbox));
        self.runs.push(GlyphRun {
            text: text.trim_end().to_string(),
            bbox,
            font: font.base_font.clone(),
            font_size: first.font_size,
            baseline: first.baseline,
            glyphs,
        });
    }

    /// Compute the glyph's page-space box, then advance the text matrix.
    /// Returns `None` for codes that decode to nothing.
    fn place_glyph(
        &mut self,
        font: &FontInfo,
        font_name: &Arc<str>,
        code: u32,
        text: String,
    ) -> Option<Glyph> {
        let state = self.stack.current_mut();
        let th = state.horizontal_scaling / 100.0;
        let fs = state.font_size;
        let w0 = font.glyph_width(code) / 1000.0;

        let text_to_page = state.text_to_page();
        let rendering =
            Matrix::new(fs * th, 0.0, 0.0, fs, 0.0, state.text_rise).multiply(&text_to_page);
        let top = self.top;
        let flip = |p: Point| Point::new(p.x, top - p.y);

        let corners = [(0.0, -DESCENT), (w0, -DESCENT), (0.0, ASCENT), (w0, ASCENT)]
            .map(|(x, y)| flip(rendering.transform_point(x, y)));
        let baseline = flip(rendering.transform_point(0.0, 0.0)).y;
        let font_size = fs * text_to_page.vertical_scale();

        let word_space = if !font.is_two_byte() && code == 32 {
            state.word_space
        } else {
            0.0
        };
        state.advance((w0 * fs + state.char_space + word_space) * th);

        if text.is_empty() {
            return None;
        }
        let Some(bbox) =
            Rect::bounding(corners).filter(|_| font_size.is_finite() && baseline.is_finite())
        else {
            log::debug!("Dropping glyph {:?}: position is not finite", text);
            return None;
        };
        Some(Glyph {
            text,
            bbox,
            font: Arc::clone(font_name),
            font_size,
            baseline,
        })
    }

    fn run_form(&mut self, name: &str, resources: Option<&'a Dictionary>, depth: usize) {
        if depth >= MAX_FORM_DEPTH {
            log::warn!("Form XObject /{} nested deeper than {}, skipped", name, MAX_FORM_DEPTH);
            return;
        }
        let Some(Object::Stream(stream)) =
            resources.and_then(|res| resource_entry(self.doc, res, b"XObject", name))
        else {
            log::debug!("XObject /{} is missing or not a stream", name);
            return;
        };
        match stream.dict.get(b"Subtype") {
            Ok(Object::Name(subtype)) if subtype.as_slice() == b"Form" => {},
            _ => return,
        }

        let operations = match stream_bytes(stream)
            .map_err(|e| e.to_string())
            .and_then(|bytes| Content::decode(&bytes).map_err(|e| e.to_string()))
        {
            Ok(content) => content.operations,
            Err(e) => {
                log::warn!("Cannot decode form XObject /{}: {}", name, e);
                return;
            },
        };
        let form_resources = match stream.dict.get(b"Resources").map(|o| resolve(self.doc, o)) {
            Ok(Ok(Object::Dictionary(d))) => Some(d),
            _ => resources,
        };

        self.stack.save();
        if let Ok(Object::Array(m)) = stream.dict.get(b"Matrix") {
            let values: Vec<f32> = m.iter().filter_map(crate::content::operators::number).collect();
            if let [a, b, c, d, e, f] = values[..] {
                let state = self.stack.current_mut();
                state.ctm = Matrix::new(a, b, c, d, e, f).multiply(&state.ctm);
            }
        }
        self.execute(&operations, form_resources, depth + 1);
        self.stack.restore();
    }
}
