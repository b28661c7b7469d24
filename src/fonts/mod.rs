//! Font handling for text extraction: code-to-Unicode decoding and glyph
//! widths.
//!
//! Font problems never fail a page. A font whose dictionary cannot be read
//! degrades to [`FontInfo::fallback`], which decodes bytes as WinAnsi and
//! assumes half-em glyph widths.

pub mod cmap;
pub mod encoding;

pub use cmap::{parse_tounicode_cmap, CMap};
pub use encoding::BaseEncoding;

use crate::document::{kind_name, resolve, stream_bytes};
use lopdf::{Dictionary, Document, Object};
use std::collections::HashMap;

/// Width assumed for glyphs with no metrics, in thousandths of an em.
pub const DEFAULT_GLYPH_WIDTH: f32 = 500.0;

/// Largest character code a font can produce (codes are one or two bytes).
const MAX_CODE: u32 = 0xFFFF;

/// `base + offset`, or `None` past [`MAX_CODE`].
fn code_at(base: u32, offset: usize) -> Option<u32> {
    let offset = u32::try_from(offset).ok()?;
    base.checked_add(offset).filter(|code| *code <= MAX_CODE)
}

/// A decoded character code.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedGlyph {
    /// Raw character code
    pub code: u32,
    /// Unicode text for the code; may hold several characters (ligatures)
    /// or none (unmappable codes)
    pub text: String,
}

/// Everything needed to turn the bytes of a text-showing operator into
/// positioned characters.
#[derive(Debug, Clone)]
pub struct FontInfo {
    /// /BaseFont, without a subset prefix
    pub base_font: String,
    /// /Subtype (Type1, TrueType, Type0, ...)
    pub subtype: String,
    encoding: BaseEncoding,
    two_byte: bool,
    widths: HashMap<u32, f32>,
    default_width: f32,
    to_unicode: Option<CMap>,
}

impl FontInfo {
    /// Font used when the content stream selects a font the page does not
    /// define.
    pub fn fallback(resource_name: &str) -> Self {
        Self {
            base_font: resource_name.to_string(),
            subtype: "Unknown".to_string(),
            encoding: BaseEncoding::WinAnsi,
            two_byte: false,
            widths: HashMap::new(),
            default_width: DEFAULT_GLYPH_WIDTH,
            to_unicode: None,
        }
    }

    /// Build from a font dictionary.
    pub fn from_dictionary(doc: &Document, resource_name: &str, dict: &Dictionary) -> Self {
        let mut font = Self::fallback(resource_name);

        if let Some(base) = name_of(doc, dict, b"BaseFont") {
            font.base_font = strip_subset_prefix(&base).to_string();
        }
        if let Some(subtype) = name_of(doc, dict, b"Subtype") {
            font.subtype = subtype;
        }

        match dict.get(b"Encoding").ok().and_then(|o| resolve(doc, o).ok()) {
            Some(Object::Name(name)) => {
                font.two_byte = name.starts_with(b"Identity");
                font.encoding = BaseEncoding::from_name(name);
            },
            Some(Object::Dictionary(enc)) => {
                if let Ok(Object::Name(name)) = enc.get(b"BaseEncoding") {
                    font.encoding = BaseEncoding::from_name(name);
                }
            },
            _ => {},
        }

        if font.subtype == "Type0" {
            font.two_byte = true;
            font.default_width = 1000.0;
            if let Some(descendant) = first_descendant(doc, dict) {
                if let Ok(dw) = descendant.get(b"DW").and_then(|o| resolve(doc, o)) {
                    if let Some(dw) = crate::content::operators::number(dw) {
                        font.default_width = dw;
                    }
                }
                font.widths = cid_widths(doc, descendant);
            }
        } else {
            font.widths = simple_widths(doc, dict);
        }

        if let Ok(obj) = dict.get(b"ToUnicode") {
            match resolve(doc, obj) {
                Ok(Object::Stream(stream)) => match stream_bytes(stream) {
                    Ok(bytes) => font.to_unicode = Some(parse_tounicode_cmap(&bytes)),
                    Err(e) => log::warn!(
                        "Font {}: cannot decode ToUnicode stream: {}",
                        font.base_font,
                        e
                    ),
                },
                Ok(Object::Name(_)) => {},
                Ok(other) => log::warn!(
                    "Font {}: ToUnicode is a {}, expected a stream",
                    font.base_font,
                    kind_name(other)
                ),
                Err(e) => log::warn!("Font {}: dangling ToUnicode: {}", font.base_font, e),
            }
        }

        font
    }

    /// Whether character codes are two bytes wide.
    pub fn is_two_byte(&self) -> bool {
        self.two_byte
    }

    /// Split `bytes` into character codes and map each to Unicode.
    pub fn decode(&self, bytes: &[u8]) -> Vec<DecodedGlyph> {
        let codes: Vec<u32> = if self.two_byte {
            bytes
                .chunks(2)
                .map(|pair| match pair {
                    [hi, lo] => ((*hi as u32) << 8) | *lo as u32,
                    [single] => *single as u32,
                    _ => 0,
                })
                .collect()
        } else {
            bytes.iter().map(|b| *b as u32).collect()
        };

        codes
            .into_iter()
            .map(|code| DecodedGlyph {
                code,
                text: self.code_to_unicode(code),
            })
            .collect()
    }

    fn code_to_unicode(&self, code: u32) -> String {
        if let Some(mapped) = self.to_unicode.as_ref().and_then(|m| m.get(&code)) {
            return mapped.clone();
        }
        if self.two_byte {
            return char::from_u32(code)
                .filter(|c| !c.is_control())
                .map(String::from)
                .unwrap_or_default();
        }
        u8::try_from(code)
            .ok()
            .and_then(|b| self.encoding.decode(b))
            .map(String::from)
            .unwrap_or_default()
    }

    /// Advance width of `code` in thousandths of an em.
    pub fn glyph_width(&self, code: u32) -> f32 {
        self.widths.get(&code).copied().unwrap_or(self.default_width)
    }
}

fn name_of(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok().and_then(|o| resolve(doc, o).ok()) {
        Some(Object::Name(name)) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    }
}

/// `ABCDEF+Helvetica` → `Helvetica`.
fn strip_subset_prefix(name: &str) -> &str {
    match name.split_once('+') {
        Some((prefix, rest))
            if prefix.len() == 6 && prefix.chars().all(|c| c.is_ascii_uppercase()) =>
        {
            rest
        },
        _ => name,
    }
}

fn first_descendant<'a>(doc: &'a Document, dict: &'a Dictionary) -> Option<&'a Dictionary> {
    let array = match resolve(doc, dict.get(b"DescendantFonts").ok()?).ok()? {
        Object::Array(items) => items,
        _ => return None,
    };
    match resolve(doc, array.first()?).ok()? {
        Object::Dictionary(d) => Some(d),
        _ => None,
    }
}

fn simple_widths(doc: &Document, dict: &Dictionary) -> HashMap<u32, f32> {
    let mut widths = HashMap::new();
    let first_char = dict
        .get(b"FirstChar")
        .ok()
        .and_then(|o| resolve(doc, o).ok())
        .and_then(crate::content::operators::number)
        .unwrap_or(0.0) as u32;
    if let Some(Object::Array(items)) = dict.get(b"Widths").ok().and_then(|o| resolve(doc, o).ok())
    {
        for (i, item) in items.iter().enumerate() {
            let Some(code) = code_at(first_char, i) else {
                log::warn!(
                    "Font /Widths runs past code 0x{:X} (FirstChar {}); ignoring the rest",
                    MAX_CODE,
                    first_char
                );
                break;
            };
            if let Some(w) = resolve(doc, item).ok().and_then(crate::content::operators::number) {
                widths.insert(code, w);
            }
        }
    }
    widths
}

/// Parse a CIDFont /W array: `c [w1 w2 ...]` and `c_first c_last w` forms.
fn cid_widths(doc: &Document, descendant: &Dictionary) -> HashMap<u32, f32> {
    use crate::content::operators::number;

    let mut widths = HashMap::new();
    let items = match descendant.get(b"W").ok().and_then(|o| resolve(doc, o).ok()) {
        Some(Object::Array(items)) => items,
        _ => return widths,
    };

    let mut i = 0;
    while i < items.len() {
        let Some(first) = number(&items[i]) else {
            break;
        };
        match items.get(i + 1).map(|o| resolve(doc, o)) {
            Some(Ok(Object::Array(run))) => {
                for (offset, w) in run.iter().filter_map(number).enumerate() {
                    let Some(code) = code_at(first as u32, offset) else {
                        log::warn!("CIDFont /W run at {} exceeds code 0x{:X}", first, MAX_CODE);
                        break;
                    };
                    widths.insert(code, w);
                }
                i += 2;
            },
            Some(Ok(last)) => {
                let (Some(last), Some(w)) = (number(last), items.get(i + 2).and_then(number))
                else {
                    break;
                };
                let (first, last) = (first as u32, last as u32);
                if last > MAX_CODE {
                    log::warn!(
                        "CIDFont /W range {}..={} exceeds code 0x{:X}; clamping",
                        first,
                        last,
                        MAX_CODE
                    );
                }
                for code in first..=last.min(MAX_CODE) {
                    widths.insert(code, w);
                }
                i += 3;
            },
            _ => break,
        }
    }
    widths
}
