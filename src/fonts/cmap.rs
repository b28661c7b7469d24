//! ToUnicode CMap parser.
//!
//! Fonts with custom or CID encodings carry a ToUnicode stream mapping
//! character codes to Unicode. Only the `bfchar` and `bfrange` sections are
//! needed for text extraction.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

/// Character code to Unicode string.
pub type CMap = HashMap<u32, String>;

lazy_static! {
    static ref BFCHAR: Regex = Regex::new(r"<([0-9A-Fa-f]+)>\s*<([0-9A-Fa-f]+)>").unwrap();
    static ref BFRANGE_SEQ: Regex =
        Regex::new(r"<([0-9A-Fa-f]+)>\s*<([0-9A-Fa-f]+)>\s*<([0-9A-Fa-f]+)>").unwrap();
    static ref BFRANGE_ARRAY: Regex =
        Regex::new(r"<([0-9A-Fa-f]+)>\s*<([0-9A-Fa-f]+)>\s*\[((?:\s*<[0-9A-Fa-f]+>\s*)*)\]")
            .unwrap();
    static ref HEX: Regex = Regex::new(r"<([0-9A-Fa-f]+)>").unwrap();
}

/// Largest range expanded from a single `bfrange` entry.
const MAX_RANGE: u32 = 0xFFFF;

/// Parse a (decompressed) ToUnicode CMap stream.
///
/// Unparseable entries are skipped; an input without any mapping section
/// yields an empty map.
///
/// # Examples
///
/// ```
/// use pdf_harvest::fonts::parse_tounicode_cmap;
///
/// let cmap = parse_tounicode_cmap(b"beginbfchar\n<0041> <0042>\nendbfchar");
/// assert_eq!(cmap.get(&0x41).map(String::as_str), Some("B"));
/// ```
pub fn parse_tounicode_cmap(data: &[u8]) -> CMap {
    let mut cmap = CMap::new();
    let content = String::from_utf8_lossy(data);

    for section in sections(&content, "beginbfchar", "endbfchar") {
        for caps in BFCHAR.captures_iter(section) {
            let Ok(src) = u32::from_str_radix(&caps[1], 16) else {
                continue;
            };
            if let Some(dst) = decode_utf16_hex(&caps[2]) {
                log::trace!("ToUnicode bfchar: 0x{:02X} -> {:?}", src, dst);
                cmap.insert(src, dst);
            }
        }
    }

    for section in sections(&content, "beginbfrange", "endbfrange") {
        for line in section.lines() {
            parse_bfrange_line(line, &mut cmap);
        }
    }

    cmap
}

fn sections<'a>(content: &'a str, begin: &str, end: &str) -> Vec<&'a str> {
    let mut found = Vec::new();
    let mut remaining = content;
    while let Some(begin_pos) = remaining.find(begin) {
        let after_begin = &remaining[begin_pos + begin.len()..];
        match after_begin.find(end) {
            Some(end_pos) => {
                found.push(&after_begin[..end_pos]);
                remaining = &after_begin[end_pos + end.len()..];
            },
            None => break,
        }
    }
    found
}

fn parse_bfrange_line(line: &str, cmap: &mut CMap) {
    if let Some(caps) = BFRANGE_ARRAY.captures(line) {
        let (Ok(start), Ok(end)) = (
            u32::from_str_radix(&caps[1], 16),
            u32::from_str_radix(&caps[2], 16),
        ) else {
            return;
        };
        let targets: Vec<&str> = HEX
            .captures_iter(&caps[3])
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .collect();
        let expected = end.saturating_sub(start) as usize + 1;
        if targets.len() != expected {
            log::warn!(
                "ToUnicode bfrange array for 0x{:X}-0x{:X} has {} entries, expected {}",
                start,
                end,
                targets.len(),
                expected
            );
        }
        for (offset, hex) in targets.iter().take(expected).enumerate() {
            if let Some(dst) = decode_utf16_hex(hex) {
                cmap.insert(start + offset as u32, dst);
            }
        }
        return;
    }

    if let Some(caps) = BFRANGE_SEQ.captures(line) {
        let (Ok(start), Ok(end)) = (
            u32::from_str_radix(&caps[1], 16),
            u32::from_str_radix(&caps[2], 16),
        ) else {
            return;
        };
        let Some(base) = decode_utf16_units(&caps[3]) else {
            return;
        };
        // The last UTF-16 unit of the destination is incremented across the range.
        let Some((&last, prefix)) = base.split_last() else {
            return;
        };
        for i in 0..=end.saturating_sub(start).min(MAX_RANGE) {
            let mut units = prefix.to_vec();
            units.push(last.wrapping_add(i as u16));
            if let Ok(dst) = String::from_utf16(&units) {
                cmap.insert(start + i, dst);
            }
        }
    }
}

/// Split a hex string into big-endian UTF-16 code units. Odd trailing
/// digits (one- or three-digit codes) are treated as a final short unit.
fn decode_utf16_units(hex: &str) -> Option<Vec<u16>> {
    let mut units = Vec::with_capacity(hex.len() / 4 + 1);
    let mut i = 0;
    while i < hex.len() {
        let end = (i + 4).min(hex.len());
        units.push(u16::from_str_radix(&hex[i..end], 16).ok()?);
        i = end;
    }
    Some(units)
}

/// Decode a destination hex string: UTF-16BE, surrogate pairs included.
fn decode_utf16_hex(hex: &str) -> Option<String> {
    let units = decode_utf16_units(hex)?;
    let decoded = String::from_utf16(&units).ok()?;
    if decoded.is_empty() {
        None
    } else {
        Some(decoded)
    }
}
