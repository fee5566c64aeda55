//! # JSON Token
//!
//! Defines the flat token record produced by tokenizing a JSON document,
//! along with the enums describing its type and parse state.
use serde::Serialize;
use std::fmt::Display;
use std::ops::Range;

/// Type of a token, implied by the first byte of its span.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize)]
pub enum TokenType {
    /// `{`, spans until and including the matching `}`
    Object,
    /// `[`, spans until and including the matching `]`
    Array,
    /// `n`
    Null,
    /// `t` or `f`
    Bool,
    /// `-` or a digit
    Number,
    /// `"`, spans until and including the closing quote. Object keys are
    /// strings too, with the key value as their only child.
    String,
}

impl TokenType {
    /// Classifies a token by its first byte, returning `None` for bytes that
    /// can't start a JSON value.
    pub(crate) const fn from_first_byte(byte: u8) -> Option<Self> {
        match byte {
            b'{' => Some(Self::Object),
            b'[' => Some(Self::Array),
            b'n' => Some(Self::Null),
            b't' | b'f' => Some(Self::Bool),
            b'-' | b'0'..=b'9' => Some(Self::Number),
            b'"' => Some(Self::String),
            _ => None,
        }
    }

    /// Whether tokens of this type can contain child tokens as values.
    #[must_use]
    pub const fn is_container(self) -> bool {
        matches!(self, Self::Object | Self::Array)
    }
}

impl Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Object => "Object",
            Self::Array => "Array",
            Self::Null => "Null",
            Self::Bool => "Bool",
            Self::Number => "Number",
            Self::String => "String",
        };
        write!(f, "{name}")
    }
}

/// What a token value was parsed as, if anything.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize)]
pub enum ParsedKind {
    /// Not parsed yet.
    None,
    /// 64-bit floating-point number.
    Double,
    /// 32-bit floating-point number. Precision that doesn't fit is dropped.
    Float,
    /// Unsigned 32-bit integer.
    U32,
    /// Signed 32-bit integer.
    I32,
    /// Unsigned integer of at most 52 bits.
    U64,
    /// Signed integer with a magnitude of at most 53 bits.
    I64,
    /// An object, array, null, bool or string.
    Other,
}

impl ParsedKind {
    /// Kind used for `usize` values, matching the target's pointer width.
    #[cfg(target_pointer_width = "64")]
    pub const SIZE: Self = Self::U64;
    /// Kind used for `usize` values, matching the target's pointer width.
    #[cfg(not(target_pointer_width = "64"))]
    pub const SIZE: Self = Self::U32;
}

impl Display for ParsedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::None => "None",
            Self::Double => "Double",
            Self::Float => "Float",
            Self::U32 => "U32",
            Self::I32 => "I32",
            Self::U64 => "U64",
            Self::I64 => "I64",
            Self::Other => "Other",
        };
        write!(f, "{name}")
    }
}

/// Storage shared between the descendant count and a parsed value. A token
/// either has nested tokens or holds a parsed terminal value, never both.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Payload {
    /// Number of nested tokens. Kept for containers, unparsed values,
    /// parsed nulls and parsed strings without escapes.
    Descendants(usize),
    Bool(bool),
    Double(f64),
    Float(f32),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    /// Escape-decoded string contents.
    String(Box<str>),
}

/// A single token of a tokenized document.
///
/// The record itself only knows its own span, type and parse state. Moving
/// around the token tree goes through [`TokenRef`](crate::TokenRef), which
/// pairs a token with the document owning it.
#[derive(Debug, PartialEq)]
pub struct Token {
    /// Byte offset of the first byte of the token in the source text
    start: usize,
    /// Length of the token span in bytes, including nested tokens
    len: usize,
    token_type: TokenType,
    parsed: ParsedKind,
    /// Set for strings that are object keys
    key: bool,
    /// Set for parsed strings whose view points into borrowed caller text
    global: bool,
    payload: Payload,
}

impl Token {
    /// Creates a token with an empty span and no descendants. Containers
    /// are implicitly parsed, everything else starts unparsed.
    pub(crate) const fn new(token_type: TokenType, start: usize) -> Self {
        Self {
            start,
            len: 0,
            token_type,
            parsed: if token_type.is_container() {
                ParsedKind::Other
            } else {
                ParsedKind::None
            },
            key: false,
            global: false,
            payload: Payload::Descendants(0),
        }
    }

    /// Token type.
    #[must_use]
    pub const fn token_type(&self) -> TokenType {
        self.token_type
    }

    /// Parsed kind, [`ParsedKind::None`] if not parsed yet.
    #[must_use]
    pub const fn parsed_kind(&self) -> ParsedKind {
        self.parsed
    }

    /// Whether the value can be read with the `as_*` accessors. Always set
    /// for objects and arrays.
    #[must_use]
    pub fn is_parsed(&self) -> bool {
        self.parsed != ParsedKind::None
    }

    /// Byte range of the token in the source text. For objects and arrays
    /// it covers all nested tokens, for object keys only the key string.
    #[must_use]
    pub const fn span(&self) -> Range<usize> {
        self.start..self.start + self.len
    }

    /// Whether the token is a string used as an object key.
    #[must_use]
    pub const fn is_key(&self) -> bool {
        self.key
    }

    /// Whether the token is a parsed string pointing into borrowed text
    /// that outlives the document.
    #[must_use]
    pub const fn is_global(&self) -> bool {
        self.global
    }

    /// Whether the token is a string that had escape sequences decoded into
    /// a separate buffer.
    #[must_use]
    pub const fn is_escaped(&self) -> bool {
        matches!(self.payload, Payload::String(_))
    }

    pub(crate) const fn payload(&self) -> &Payload {
        &self.payload
    }

    /// The stored descendant count, `None` once a parsed value took its place.
    pub(crate) const fn stored_descendants(&self) -> Option<usize> {
        match self.payload {
            Payload::Descendants(count) => Some(count),
            _ => None,
        }
    }

    pub(crate) const fn set_len(&mut self, len: usize) {
        self.len = len;
    }

    pub(crate) const fn mark_key(&mut self) {
        self.key = true;
    }

    /// Backpatches the descendant count once a container or key is closed.
    pub(crate) fn set_descendants(&mut self, count: usize) {
        debug_assert!(matches!(self.payload, Payload::Descendants(_)));
        self.payload = Payload::Descendants(count);
    }

    /// Marks a null or an escape-free string as parsed, keeping the
    /// descendant count in place.
    pub(crate) fn mark_parsed(&mut self, global: bool) {
        debug_assert!(matches!(self.payload, Payload::Descendants(_)));
        self.parsed = ParsedKind::Other;
        self.global = global;
    }

    /// Replaces the descendant count (or a previously parsed value) with a
    /// freshly parsed value.
    pub(crate) fn set_parsed(&mut self, kind: ParsedKind, payload: Payload) {
        debug_assert!(!self.token_type.is_container());
        self.parsed = kind;
        self.global = false;
        self.payload = payload;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_byte_classification() {
        let cases = [
            (b'{', Some(TokenType::Object)),
            (b'[', Some(TokenType::Array)),
            (b'n', Some(TokenType::Null)),
            (b't', Some(TokenType::Bool)),
            (b'f', Some(TokenType::Bool)),
            (b'-', Some(TokenType::Number)),
            (b'7', Some(TokenType::Number)),
            (b'"', Some(TokenType::String)),
            (b'}', None),
            (b'+', None),
            (b'x', None),
        ];
        for (byte, expected) in cases {
            assert_eq!(TokenType::from_first_byte(byte), expected);
        }
    }

    #[test]
    fn containers_start_parsed() {
        assert!(Token::new(TokenType::Object, 0).is_parsed());
        assert!(Token::new(TokenType::Array, 0).is_parsed());
        assert!(!Token::new(TokenType::Number, 0).is_parsed());
        assert!(!Token::new(TokenType::String, 0).is_parsed());
    }

    #[test]
    fn parsed_value_replaces_descendants() {
        let mut token = Token::new(TokenType::Number, 3);
        token.set_len(2);
        assert_eq!(token.span(), 3..5);
        assert_eq!(token.stored_descendants(), Some(0));

        token.set_parsed(ParsedKind::U32, Payload::U32(42));
        assert_eq!(token.parsed_kind(), ParsedKind::U32);
        assert_eq!(token.stored_descendants(), None);
        assert_eq!(token.payload(), &Payload::U32(42));
    }

    #[test]
    fn display_names() {
        assert_eq!(TokenType::Bool.to_string(), "Bool");
        assert_eq!(ParsedKind::Double.to_string(), "Double");
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn size_aliases_u64() {
        assert_eq!(ParsedKind::SIZE, ParsedKind::U64);
    }
}
