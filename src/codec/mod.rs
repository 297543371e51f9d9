//! Query-string value codecs.
//!
//! A codec is a pure `parse`/`serialize` pair between a state value and the raw
//! string stored under its query key. Every codec must satisfy the round-trip law
//! `parse(serialize(x)) == x` for the values the application produces, and must
//! serialize "nothing selected" to the empty string so the key can be elided.

mod memo;

pub use memo::ParseMemo;

use std::fmt::Display;
use std::marker::PhantomData;
use std::str::FromStr;

use crate::model::CodecError;

/// Delimiter for list-valued codecs.
pub const LIST_DELIMITER: char = ',';

/// Parse/serialize pair for one state value type.
pub trait Codec {
    /// The decoded value type.
    type Value: Clone + PartialEq;

    /// Decode a non-empty raw query value.
    fn parse(&self, raw: &str) -> Result<Self::Value, CodecError>;

    /// Encode a value. Empty output means "remove the key".
    fn serialize(&self, value: &Self::Value) -> String;
}

// ===== Text =====

/// Identity codec for free-text values (`category`, `blog`).
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCodec;

impl Codec for TextCodec {
    type Value = String;

    fn parse(&self, raw: &str) -> Result<String, CodecError> {
        Ok(raw.to_string())
    }

    fn serialize(&self, value: &String) -> String {
        value.clone()
    }
}

// ===== Numbers =====

/// Codec for any `FromStr + Display` scalar, e.g. page numbers.
#[derive(Debug, Clone, Copy)]
pub struct NumberCodec<T>(PhantomData<T>);

impl<T> NumberCodec<T> {
    /// Create a codec for `T`.
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for NumberCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Codec for NumberCodec<T>
where
    T: FromStr + Display + Clone + PartialEq,
{
    type Value = T;

    fn parse(&self, raw: &str) -> Result<T, CodecError> {
        raw.trim().parse().map_err(|_| CodecError::Invalid {
            raw: raw.to_string(),
            expected: std::any::type_name::<T>(),
        })
    }

    fn serialize(&self, value: &T) -> String {
        value.to_string()
    }
}

// ===== Lists =====

/// Comma-joined list of tokens (`tags=ai,cloud`).
///
/// The empty list serializes to `""`, and `""` parses to the empty list, never `[""]`.
/// Empty tokens from hand-edited URLs (`ai,,cloud`, trailing commas) are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListCodec;

impl Codec for ListCodec {
    type Value = Vec<String>;

    fn parse(&self, raw: &str) -> Result<Vec<String>, CodecError> {
        Ok(raw
            .split(LIST_DELIMITER)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn serialize(&self, value: &Vec<String>) -> String {
        let mut out = String::new();
        for (i, token) in value.iter().enumerate() {
            if i > 0 {
                out.push(LIST_DELIMITER);
            }
            out.push_str(token);
        }
        out
    }
}

// ===== Tri-state booleans =====

/// Interpret a raw flag: `"true"`, `"false"`, or unspecified.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Codec for filters where absence is distinct from `false` (`summarized`, `embedded`).
#[derive(Debug, Clone, Copy, Default)]
pub struct TriStateCodec;

impl Codec for TriStateCodec {
    type Value = Option<bool>;

    fn parse(&self, raw: &str) -> Result<Option<bool>, CodecError> {
        parse_bool(raw).map(Some).ok_or_else(|| CodecError::Invalid {
            raw: raw.to_string(),
            expected: "\"true\" or \"false\"",
        })
    }

    fn serialize(&self, value: &Option<bool>) -> String {
        match value {
            Some(true) => "true".to_string(),
            Some(false) => "false".to_string(),
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_serializes_with_commas() {
        let tags = vec!["ai".to_string(), "cloud".to_string()];
        assert_eq!(ListCodec.serialize(&tags), "ai,cloud");
    }

    #[test]
    fn list_parses_commas() {
        assert_eq!(ListCodec.parse("ai,cloud").unwrap(), vec!["ai", "cloud"]);
    }

    #[test]
    fn empty_list_and_empty_string_correspond() {
        assert_eq!(ListCodec.serialize(&Vec::new()), "");
        assert_eq!(ListCodec.parse("").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn list_drops_empty_tokens() {
        assert_eq!(ListCodec.parse("ai,,cloud,").unwrap(), vec!["ai", "cloud"]);
    }

    #[test]
    fn number_parses_and_rejects() {
        let codec = NumberCodec::<u32>::new();
        assert_eq!(codec.parse("5"), Ok(5));
        assert!(matches!(
            codec.parse("five"),
            Err(CodecError::Invalid { .. })
        ));
        assert_eq!(codec.serialize(&12), "12");
    }

    #[test]
    fn tri_state_distinguishes_false_from_absent() {
        assert_eq!(TriStateCodec.parse("false"), Ok(Some(false)));
        assert_eq!(TriStateCodec.serialize(&Some(false)), "false");
        assert_eq!(TriStateCodec.serialize(&None), "");
        assert!(TriStateCodec.parse("yes").is_err());
    }

    #[test]
    fn parse_bool_only_accepts_literals() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool("false"), Some(false));
        assert_eq!(parse_bool("TRUE"), None);
        assert_eq!(parse_bool(""), None);
    }

    #[test]
    fn text_is_identity() {
        assert_eq!(TextCodec.parse("Backend").unwrap(), "Backend");
        assert_eq!(TextCodec.serialize(&"Backend".to_string()), "Backend");
    }
}
