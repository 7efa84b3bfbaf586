//! Property value codec: typed values to and from text literals.
//!
//! Encoding and decoding are inverses over the whole `PropertyValue`
//! surface, so a value written by the serializer reads back as the same
//! variant, float/int distinction included.

use super::parser::{parse_value_literal, ParseResult};
use crate::graph::PropertyValue;

/// Render a value as a literal.
pub fn encode_value(value: &PropertyValue) -> String {
    match value {
        PropertyValue::Null => "null".to_string(),
        PropertyValue::Bool(b) => b.to_string(),
        PropertyValue::Int(i) => i.to_string(),
        PropertyValue::Float(f) => encode_float(*f),
        PropertyValue::String(s) => encode_string(s),
        PropertyValue::List(items) => {
            let encoded: Vec<String> = items.iter().map(encode_value).collect();
            format!("[{}]", encoded.join(", "))
        }
    }
}

/// Floats always carry a decimal point, otherwise a round-valued float
/// would read back as an integer.
fn encode_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 {
        format!("{:.1}", f)
    } else {
        f.to_string()
    }
}

fn encode_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

/// Quote an identifier unless it is plain `[A-Za-z0-9_]`; internal
/// backticks are doubled.
pub fn encode_identifier(name: &str) -> String {
    let plain =
        !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        name.to_string()
    } else {
        format!("`{}`", name.replace('`', "``"))
    }
}

/// Parse a literal back into a typed value.
pub fn decode_value(text: &str) -> ParseResult<PropertyValue> {
    parse_value_literal(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(value: PropertyValue) {
        let encoded = encode_value(&value);
        assert_eq!(decode_value(&encoded).unwrap(), value, "literal was: {}", encoded);
    }

    #[test]
    fn test_scalar_roundtrips() {
        roundtrip(PropertyValue::Null);
        roundtrip(PropertyValue::Bool(true));
        roundtrip(PropertyValue::Bool(false));
        roundtrip(PropertyValue::Int(0));
        roundtrip(PropertyValue::Int(-12345));
        roundtrip(PropertyValue::Float(2.5));
        roundtrip(PropertyValue::Float(-0.125));
    }

    #[test]
    fn test_round_valued_float_stays_float() {
        assert_eq!(encode_value(&PropertyValue::Float(2.0)), "2.0");
        roundtrip(PropertyValue::Float(2.0));
        // and an int stays an int
        assert_eq!(encode_value(&PropertyValue::Int(2)), "2");
        roundtrip(PropertyValue::Int(2));
    }

    #[test]
    fn test_string_escaping_roundtrip() {
        let tricky = "he said \"hi\"\\ on\nmultiple\r\tlines".to_string();
        let encoded = encode_value(&PropertyValue::String(tricky.clone()));
        assert!(!encoded.contains('\n'));
        assert_eq!(decode_value(&encoded).unwrap(), PropertyValue::String(tricky));
    }

    #[test]
    fn test_list_roundtrip() {
        roundtrip(PropertyValue::List(vec![
            PropertyValue::Int(1),
            PropertyValue::String("a, b".to_string()),
            PropertyValue::List(vec![PropertyValue::Null, PropertyValue::Bool(false)]),
        ]));
        roundtrip(PropertyValue::List(vec![]));
    }

    #[test]
    fn test_identifier_quoting() {
        assert_eq!(encode_identifier("name"), "name");
        assert_eq!(encode_identifier("__id"), "__id");
        assert_eq!(encode_identifier("weird key!"), "`weird key!`");
        assert_eq!(encode_identifier("tick`tock"), "`tick``tock`");
        assert_eq!(encode_identifier(""), "``");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_value("").is_err());
        assert!(decode_value("[1, 2").is_err());
        assert!(decode_value("1 2").is_err());
    }
}
