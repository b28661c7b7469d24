//! Typed view of the content stream operators that affect text placement.
//!
//! Content streams are tokenized by `lopdf`; this module lifts the raw
//! `(operator, operands)` pairs into an enum so the interpreter can match on
//! well-typed values. Operators irrelevant to text extraction (paths, colors,
//! images, marked content) are dropped.

use lopdf::content::Operation;
use lopdf::Object;

/// Element of a `TJ` array.
#[derive(Debug, Clone, PartialEq)]
pub enum TextElement {
    /// Bytes to show
    String(Vec<u8>),
    /// Position adjustment in thousandths of text space units
    Offset(f32),
}

/// A content stream operator.
#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    /// BT
    BeginText,
    /// ET
    EndText,
    /// Td
    Td {
        /// Horizontal offset
        tx: f32,
        /// Vertical offset
        ty: f32,
    },
    /// TD: Td that also sets leading to `-ty`
    TD {
        /// Horizontal offset
        tx: f32,
        /// Vertical offset
        ty: f32,
    },
    /// Tm
    Tm([f32; 6]),
    /// T*
    TStar,
    /// Tj
    Tj(Vec<u8>),
    /// TJ
    TJ(Vec<TextElement>),
    /// `'`: T* then Tj
    Quote(Vec<u8>),
    /// `"`: set Tw and Tc, then `'`
    DoubleQuote {
        /// Word spacing
        word_space: f32,
        /// Character spacing
        char_space: f32,
        /// Text to show
        text: Vec<u8>,
    },
    /// Tc
    Tc(f32),
    /// Tw
    Tw(f32),
    /// Tz
    Tz(f32),
    /// TL
    TL(f32),
    /// Tf
    Tf {
        /// Font resource name
        font: String,
        /// Font size
        size: f32,
    },
    /// Ts
    Ts(f32),
    /// q
    SaveState,
    /// Q
    RestoreState,
    /// cm
    Cm([f32; 6]),
    /// Do
    Do(String),
}

/// Numeric operand as f32 (PDF allows both integers and reals).
pub fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

fn name(obj: &Object) -> Option<String> {
    match obj {
        Object::Name(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        _ => None,
    }
}

fn string(obj: &Object) -> Option<Vec<u8>> {
    match obj {
        Object::String(bytes, _) => Some(bytes.clone()),
        _ => None,
    }
}

fn numbers<const N: usize>(operands: &[Object]) -> Option<[f32; N]> {
    if operands.len() < N {
        return None;
    }
    let mut out = [0.0f32; N];
    for (slot, obj) in out.iter_mut().zip(operands) {
        *slot = number(obj)?;
    }
    Some(out)
}

impl Operator {
    /// Convert a tokenized operation. Returns `Ok(None)` for operators that
    /// do not affect text, and `Err` when a text operator has unusable
    /// operands.
    pub fn from_operation(op: &Operation) -> Result<Option<Operator>, String> {
        let operands = op.operands.as_slice();
        let malformed = || format!("malformed operands for '{}': {:?}", op.operator, operands);

        let parsed = match op.operator.as_str() {
            "BT" => Operator::BeginText,
            "ET" => Operator::EndText,
            "Td" => {
                let [tx, ty] = numbers::<2>(operands).ok_or_else(malformed)?;
                Operator::Td { tx, ty }
            },
            "TD" => {
                let [tx, ty] = numbers::<2>(operands).ok_or_else(malformed)?;
                Operator::TD { tx, ty }
            },
            "Tm" => Operator::Tm(numbers::<6>(operands).ok_or_else(malformed)?),
            "T*" => Operator::TStar,
            "Tj" => Operator::Tj(operands.first().and_then(string).ok_or_else(malformed)?),
            "'" => Operator::Quote(operands.first().and_then(string).ok_or_else(malformed)?),
            "\"" => {
                let [word_space, char_space] = numbers::<2>(operands).ok_or_else(malformed)?;
                let text = operands.get(2).and_then(string).ok_or_else(malformed)?;
                Operator::DoubleQuote {
                    word_space,
                    char_space,
                    text,
                }
            },
            "TJ" => {
                let items = match operands.first() {
                    Some(Object::Array(items)) => items,
                    _ => return Err(malformed()),
                };
                let elements = items
                    .iter()
                    .filter_map(|item| match item {
                        Object::String(bytes, _) => Some(TextElement::String(bytes.clone())),
                        other => number(other).map(TextElement::Offset),
                    })
                    .collect();
                Operator::TJ(elements)
            },
            "Tc" => Operator::Tc(operands.first().and_then(number).ok_or_else(malformed)?),
            "Tw" => Operator::Tw(operands.first().and_then(number).ok_or_else(malformed)?),
            "Tz" => Operator::Tz(operands.first().and_then(number).ok_or_else(malformed)?),
            "TL" => Operator::TL(operands.first().and_then(number).ok_or_else(malformed)?),
            "Ts" => Operator::Ts(operands.first().and_then(number).ok_or_else(malformed)?),
            "Tf" => {
                let font = operands.first().and_then(name).ok_or_else(malformed)?;
                let size = operands.get(1).and_then(number).ok_or_else(malformed)?;
                Operator::Tf { font, size }
            },
            "q" => Operator::SaveState,
            "Q" => Operator::RestoreState,
            "cm" => Operator::Cm(numbers::<6>(operands).ok_or_else(malformed)?),
            "Do" => Operator::Do(operands.first().and_then(name).ok_or_else(malformed)?),
            _ => return Ok(None),
        };
        Ok(Some(parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::StringFormat;

    fn op(operator: &str, operands: Vec<Object>) -> Operation {
        Operation::new(operator, operands)
    }

    #[test]
    fn test_text_positioning() {
        let parsed = Operator::from_operation(&op("Td", vec![100.into(), Object::Real(7.5)]));
        assert_eq!(parsed, Ok(Some(Operator::Td { tx: 100.0, ty: 7.5 })));

        let tm = op("Tm", vec![1.into(), 0.into(), 0.into(), 1.into(), 72.into(), 720.into()]);
        assert_eq!(
            Operator::from_operation(&tm),
            Ok(Some(Operator::Tm([1.0, 0.0, 0.0, 1.0, 72.0, 720.0])))
        );
    }

    #[test]
    fn test_font_and_text() {
        let tf = op("Tf", vec![Object::Name(b"F1".to_vec()), 12.into()]);
        assert_eq!(
            Operator::from_operation(&tf),
            Ok(Some(Operator::Tf {
                font: "F1".to_string(),
                size: 12.0
            }))
        );

        let tj = op("Tj", vec![Object::String(b"Hi".to_vec(), StringFormat::Literal)]);
        assert_eq!(Operator::from_operation(&tj), Ok(Some(Operator::Tj(b"Hi".to_vec()))));
    }

    #[test]
    fn test_tj_array() {
        let array = Object::Array(vec![
            Object::String(b"A".to_vec(), StringFormat::Literal),
            Object::Integer(-250),
            Object::String(b"B".to_vec(), StringFormat::Hexadecimal),
        ]);
        let parsed = Operator::from_operation(&op("TJ", vec![array])).unwrap().unwrap();
        assert_eq!(
            parsed,
            Operator::TJ(vec![
                TextElement::String(b"A".to_vec()),
                TextElement::Offset(-250.0),
                TextElement::String(b"B".to_vec()),
            ])
        );
    }

    #[test]
    fn test_irrelevant_operators_are_skipped() {
        let re = op("re", vec![0.into(), 0.into(), 10.into(), 10.into()]);
        assert_eq!(Operator::from_operation(&re), Ok(None));
        assert_eq!(Operator::from_operation(&op("f", vec![])), Ok(None));
    }

    #[test]
    fn test_malformed_operands() {
        assert!(Operator::from_operation(&op("Td", vec![1.into()])).is_err());
        assert!(Operator::from_operation(&op("Tj", vec![5.into()])).is_err());
        assert!(Operator::from_operation(&op("TJ", vec![5.into()])).is_err());
    }
}
