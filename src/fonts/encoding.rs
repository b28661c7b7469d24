//! Single-byte encodings for simple fonts without a ToUnicode map.
//!
//! WinAnsiEncoding agrees with Latin-1 except in 0x80..=0x9F; those code
//! points are mapped explicitly. Other base encodings fall back to the same
//! table, which is right for the ASCII range every standard encoding shares.

/// Base encoding declared by a simple font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BaseEncoding {
    /// /WinAnsiEncoding, and the default when nothing is declared
    #[default]
    WinAnsi,
    /// /MacRomanEncoding
    MacRoman,
    /// /StandardEncoding
    Standard,
}

impl BaseEncoding {
    /// Parse an /Encoding name.
    pub fn from_name(name: &[u8]) -> Self {
        match name {
            b"MacRomanEncoding" => BaseEncoding::MacRoman,
            b"StandardEncoding" => BaseEncoding::Standard,
            _ => BaseEncoding::WinAnsi,
        }
    }

    /// Decode one byte. Control codes other than tab/newline yield `None`.
    pub fn decode(&self, code: u8) -> Option<char> {
        let ch = match (self, code) {
            (BaseEncoding::WinAnsi, 0x80..=0x9F) => WIN_ANSI_HIGH[(code - 0x80) as usize]?,
            (BaseEncoding::Standard, 0x27) => '\u{2019}',
            (BaseEncoding::Standard, 0x60) => '\u{2018}',
            _ => code as char,
        };
        if ch.is_control() && ch != '\t' && ch != '\n' {
            None
        } else {
            Some(ch)
        }
    }
}

const WIN_ANSI_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passthrough() {
        let enc = BaseEncoding::WinAnsi;
        assert_eq!(enc.decode(b'A'), Some('A'));
        assert_eq!(enc.decode(b' '), Some(' '));
    }

    #[test]
    fn test_win_ansi_high_range() {
        let enc = BaseEncoding::WinAnsi;
        assert_eq!(enc.decode(0x80), Some('€'));
        assert_eq!(enc.decode(0x93), Some('\u{201C}'));
        assert_eq!(enc.decode(0x81), None);
        assert_eq!(enc.decode(0xE9), Some('é'));
    }

    #[test]
    fn test_control_codes_dropped() {
        assert_eq!(BaseEncoding::WinAnsi.decode(0x00), None);
        assert_eq!(BaseEncoding::WinAnsi.decode(b'\n'), Some('\n'));
    }

    #[test]
    fn test_from_name() {
        assert_eq!(BaseEncoding::from_name(b"MacRomanEncoding"), BaseEncoding::MacRoman);
        assert_eq!(BaseEncoding::from_name(b"Custom"), BaseEncoding::WinAnsi);
    }
}
