//! # Token Navigation
//!
//! [`TokenRef`] pairs a token with its [`Document`], which is what moving
//! around the flat token array needs: the first child sits right after its
//! parent and the next sibling right after the parent's descendants, so
//! both are O(1). Object and array contents are walked sibling by sibling
//! through [`ObjectIter`] and [`ArrayIter`].
//!
//! Typed getters (`as_*`) expect the value to be parsed already and panic
//! otherwise. The `parse_*` counterparts work on unparsed tokens too and
//! report invalid values as errors, without caching the result.
use std::borrow::Cow;
use std::fmt;
use std::iter::FusedIterator;

use crate::document::Document;
use crate::error::JsonError;
use crate::scalar;
use crate::tokenizer::{ParsedKind, Payload, Token, TokenType};

/// A token together with the document owning it.
#[derive(Clone, Copy)]
pub struct TokenRef<'d> {
    document: &'d Document<'d>,
    index: usize,
}

impl<'d> TokenRef<'d> {
    pub(crate) const fn new(document: &'d Document<'d>, index: usize) -> Self {
        Self { document, index }
    }

    const fn at(self, index: usize) -> Self {
        Self::new(self.document, index)
    }

    /// Position of the token in [`Document::tokens`].
    #[must_use]
    pub const fn index(self) -> usize {
        self.index
    }

    /// The underlying token record.
    #[must_use]
    pub fn token(self) -> &'d Token {
        &self.document.tokens()[self.index]
    }

    /// Token type.
    #[must_use]
    pub fn token_type(self) -> TokenType {
        self.token().token_type()
    }

    /// Parsed kind, [`ParsedKind::None`] if not parsed yet.
    #[must_use]
    pub fn parsed_kind(self) -> ParsedKind {
        self.token().parsed_kind()
    }

    /// Whether the value is parsed.
    #[must_use]
    pub fn is_parsed(self) -> bool {
        self.token().is_parsed()
    }

    /// Whether the token is an object key.
    #[must_use]
    pub fn is_key(self) -> bool {
        self.token().is_key()
    }

    /// Raw token text. Includes all nested tokens for objects and arrays,
    /// and the quotes and escape sequences for strings.
    #[must_use]
    pub fn data(self) -> &'d str {
        &self.document.text()[self.token().span()]
    }

    /// Number of all nested tokens, not just immediate children. Always `0`
    /// for null, bool, number and string values, `1` plus the value's count
    /// for object keys.
    #[must_use]
    pub fn child_count(self) -> usize {
        self.document.descendant_count(self.index)
    }

    /// All nested tokens in depth-first order.
    #[must_use]
    pub fn children(self) -> &'d [Token] {
        let start = self.index + 1;
        &self.document.tokens()[start..start + self.child_count()]
    }

    /// Handles to the token itself followed by all nested tokens.
    pub fn subtree(self) -> impl Iterator<Item = TokenRef<'d>> + Clone {
        (self.index..=self.index + self.child_count())
            .map(move |index| self.at(index))
    }

    /// First nested token, if any. For a non-empty object that's the first
    /// key, for a key it's its value.
    #[must_use]
    pub fn first_child(self) -> Option<Self> {
        (self.child_count() > 0).then(|| self.at(self.index + 1))
    }

    /// Token following this one's subtree, at the same or a higher level,
    /// or `None` at the end of the document.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn next(self) -> Option<Self> {
        self.document.get(self.index + self.child_count() + 1)
    }

    /// Parent token, `None` for the root. The value of an object key has
    /// the key as its parent, the key has the object.
    ///
    /// There's no parent index, the token array is searched backwards for
    /// the nearest token enclosing this one, which is O(n). Remember parents
    /// while traversing instead where possible.
    #[must_use]
    pub fn parent(self) -> Option<Self> {
        (0..self.index)
            .rev()
            .find(|&index| {
                index + self.document.descendant_count(index) >= self.index
            })
            .map(|index| self.at(index))
    }

    /// Iterates over key/value pairs of an object.
    ///
    /// # Panics
    ///
    /// Panics if the token is not an object.
    #[must_use]
    pub fn as_object(self) -> ObjectIter<'d> {
        self.expect_type(TokenType::Object, "as_object");
        ObjectIter {
            inner: Siblings::of(self),
        }
    }

    /// Iterates over values of an array.
    ///
    /// # Panics
    ///
    /// Panics if the token is not an array.
    #[must_use]
    pub fn as_array(self) -> ArrayIter<'d> {
        self.expect_type(TokenType::Array, "as_array");
        ArrayIter {
            inner: Siblings::of(self),
            index: 0,
        }
    }

    /// Finds the value of `key` in an object. With duplicate keys the first
    /// one wins. This is a linear scan, prefer [`Self::as_object`] when
    /// looking up many keys.
    ///
    /// # Panics
    ///
    /// Panics if the token is not an object or if a key compared on the way
    /// isn't parsed.
    #[must_use]
    pub fn find(self, key: &str) -> Option<Self> {
        self.as_object()
            .find(|item| item.key() == key)
            .map(|item| item.value())
    }

    /// Finds the value at `index` in an array. This is a linear scan,
    /// prefer [`Self::as_array`] when accessing many items.
    ///
    /// # Panics
    ///
    /// Panics if the token is not an array.
    #[must_use]
    pub fn find_index(self, index: usize) -> Option<Self> {
        self.as_array().nth(index).map(|item| item.value())
    }

    /// Like [`Self::find`], but expects the key to exist.
    ///
    /// # Panics
    ///
    /// Panics if the token is not an object or the key doesn't exist.
    #[must_use]
    pub fn expect_key(self, key: &str) -> Self {
        self.find(key).unwrap_or_else(|| {
            panic!("TokenRef::expect_key(): key {key:?} not found")
        })
    }

    /// Like [`Self::find_index`], but expects the index to exist.
    ///
    /// # Panics
    ///
    /// Panics if the token is not an array or the index is out of range.
    #[must_use]
    pub fn expect_index(self, index: usize) -> Self {
        self.find_index(index).unwrap_or_else(|| {
            panic!("TokenRef::expect_index(): index {index} not found")
        })
    }

    fn expect_type(self, expected: TokenType, getter: &str) {
        assert!(
            self.token_type() == expected,
            "TokenRef::{getter}(): token is {} {}",
            if self.is_parsed() { "a parsed" } else { "an unparsed" },
            self.token_type()
        );
    }

    fn wrong_kind(self, getter: &str) -> ! {
        panic!(
            "TokenRef::{getter}(): token is a {} parsed as {}",
            self.token_type(),
            self.parsed_kind()
        )
    }

    /// Checks a parsed null.
    ///
    /// # Panics
    ///
    /// Panics if the token is not a parsed null.
    pub fn as_null(self) {
        if self.token_type() != TokenType::Null || !self.is_parsed() {
            self.wrong_kind("as_null");
        }
    }

    /// Parsed boolean value.
    ///
    /// # Panics
    ///
    /// Panics if the token is not a parsed bool.
    #[must_use]
    pub fn as_bool(self) -> bool {
        match self.token().payload() {
            Payload::Bool(value) => *value,
            _ => self.wrong_kind("as_bool"),
        }
    }

    /// Parsed 64-bit floating-point value.
    ///
    /// # Panics
    ///
    /// Panics if the token is not parsed as [`ParsedKind::Double`].
    #[must_use]
    pub fn as_double(self) -> f64 {
        match self.token().payload() {
            Payload::Double(value) => *value,
            _ => self.wrong_kind("as_double"),
        }
    }

    /// Parsed 32-bit floating-point value.
    ///
    /// # Panics
    ///
    /// Panics if the token is not parsed as [`ParsedKind::Float`].
    #[must_use]
    pub fn as_float(self) -> f32 {
        match self.token().payload() {
            Payload::Float(value) => *value,
            _ => self.wrong_kind("as_float"),
        }
    }

    /// Parsed unsigned 32-bit integer value.
    ///
    /// # Panics
    ///
    /// Panics if the token is not parsed as [`ParsedKind::U32`].
    #[must_use]
    pub fn as_u32(self) -> u32 {
        match self.token().payload() {
            Payload::U32(value) => *value,
            _ => self.wrong_kind("as_u32"),
        }
    }

    /// Parsed signed 32-bit integer value.
    ///
    /// # Panics
    ///
    /// Panics if the token is not parsed as [`ParsedKind::I32`].
    #[must_use]
    pub fn as_i32(self) -> i32 {
        match self.token().payload() {
            Payload::I32(value) => *value,
            _ => self.wrong_kind("as_i32"),
        }
    }

    /// Parsed unsigned 52-bit integer value.
    ///
    /// # Panics
    ///
    /// Panics if the token is not parsed as [`ParsedKind::U64`].
    #[must_use]
    pub fn as_u64(self) -> u64 {
        match self.token().payload() {
            Payload::U64(value) => *value,
            _ => self.wrong_kind("as_u64"),
        }
    }

    /// Parsed signed 53-bit integer value.
    ///
    /// # Panics
    ///
    /// Panics if the token is not parsed as [`ParsedKind::I64`].
    #[must_use]
    pub fn as_i64(self) -> i64 {
        match self.token().payload() {
            Payload::I64(value) => *value,
            _ => self.wrong_kind("as_i64"),
        }
    }

    /// Parsed size value.
    ///
    /// # Panics
    ///
    /// Panics if the token is not parsed as [`ParsedKind::SIZE`].
    #[must_use]
    pub fn as_size(self) -> usize {
        size_of_payload(self.token().payload())
            .unwrap_or_else(|| self.wrong_kind("as_size"))
    }

    /// Parsed string value. Points into the source text unless the string
    /// contained escape sequences.
    ///
    /// # Panics
    ///
    /// Panics if the token is not a parsed string.
    #[must_use]
    pub fn as_str(self) -> &'d str {
        if self.token_type() != TokenType::String || !self.is_parsed() {
            self.wrong_kind("as_str");
        }
        match self.token().payload() {
            Payload::String(decoded) => &**decoded,
            _ => scalar::string_contents(self.data()),
        }
    }

    /// Whether [`Self::as_str`] points into borrowed text that outlives
    /// the document.
    #[must_use]
    pub fn is_global(self) -> bool {
        self.token().is_global()
    }

    fn expect_value(self, expected: TokenType) -> Result<(), JsonError> {
        if self.token_type() == expected {
            Ok(())
        } else {
            Err(JsonError::UnexpectedType {
                expected,
                found: self.token_type(),
                location: self.document.location(self.index),
            })
        }
    }

    fn invalid_value(self, message: String) -> JsonError {
        JsonError::InvalidValue {
            message,
            location: self.document.location(self.index),
        }
    }

    /// Parses a number on the fly with `convert`, unless `cached` already
    /// extracted the value.
    fn parse_number<T>(
        self,
        cached: impl Fn(&Payload) -> Option<T>,
        convert: fn(&str) -> Result<T, String>,
    ) -> Result<T, JsonError> {
        if let Some(value) = cached(self.token().payload()) {
            return Ok(value);
        }
        self.expect_value(TokenType::Number)?;
        convert(self.data()).map_err(|message| self.invalid_value(message))
    }

    /// Checks a null without requiring it to be parsed.
    ///
    /// # Errors
    ///
    /// Returns [`JsonError::UnexpectedType`] for other token types and
    /// [`JsonError::InvalidValue`] for an invalid literal.
    pub fn parse_null(self) -> Result<(), JsonError> {
        self.expect_value(TokenType::Null)?;
        if self.is_parsed() {
            return Ok(());
        }
        scalar::parse_null(self.data())
            .map_err(|message| self.invalid_value(message))
    }

    /// Parses a bool, returning the cached value if already parsed.
    ///
    /// # Errors
    ///
    /// Returns [`JsonError::UnexpectedType`] for other token types and
    /// [`JsonError::InvalidValue`] for an invalid literal.
    pub fn parse_bool(self) -> Result<bool, JsonError> {
        if let Payload::Bool(value) = self.token().payload() {
            return Ok(*value);
        }
        self.expect_value(TokenType::Bool)?;
        scalar::parse_bool(self.data())
            .map_err(|message| self.invalid_value(message))
    }

    /// Parses a 64-bit float, returning the cached value if already parsed
    /// as [`ParsedKind::Double`].
    ///
    /// # Errors
    ///
    /// Returns [`JsonError::UnexpectedType`] for other token types and
    /// [`JsonError::InvalidValue`] for an invalid number.
    pub fn parse_double(self) -> Result<f64, JsonError> {
        self.parse_number(
            |payload| match payload {
                Payload::Double(value) => Some(*value),
                _ => None,
            },
            scalar::parse_double,
        )
    }

    /// Parses a 32-bit float, returning the cached value if already parsed
    /// as [`ParsedKind::Float`].
    ///
    /// # Errors
    ///
    /// Returns [`JsonError::UnexpectedType`] for other token types and
    /// [`JsonError::InvalidValue`] for an invalid number.
    pub fn parse_float(self) -> Result<f32, JsonError> {
        self.parse_number(
            |payload| match payload {
                Payload::Float(value) => Some(*value),
                _ => None,
            },
            scalar::parse_float,
        )
    }

    /// Parses an unsigned 32-bit integer, returning the cached value if
    /// already parsed as [`ParsedKind::U32`].
    ///
    /// # Errors
    ///
    /// Returns [`JsonError::UnexpectedType`] for other token types and
    /// [`JsonError::InvalidValue`] for an invalid, fractional, negative or
    /// out of range number.
    pub fn parse_u32(self) -> Result<u32, JsonError> {
        self.parse_number(
            |payload| match payload {
                Payload::U32(value) => Some(*value),
                _ => None,
            },
            scalar::parse_u32,
        )
    }

    /// Parses a signed 32-bit integer, returning the cached value if
    /// already parsed as [`ParsedKind::I32`].
    ///
    /// # Errors
    ///
    /// Returns [`JsonError::UnexpectedType`] for other token types and
    /// [`JsonError::InvalidValue`] for an invalid, fractional or out of
    /// range number.
    pub fn parse_i32(self) -> Result<i32, JsonError> {
        self.parse_number(
            |payload| match payload {
                Payload::I32(value) => Some(*value),
                _ => None,
            },
            scalar::parse_i32,
        )
    }

    /// Parses an unsigned 52-bit integer, returning the cached value if
    /// already parsed as [`ParsedKind::U64`].
    ///
    /// # Errors
    ///
    /// Returns [`JsonError::UnexpectedType`] for other token types and
    /// [`JsonError::InvalidValue`] for an invalid, fractional, negative or
    /// out of range number.
    pub fn parse_u64(self) -> Result<u64, JsonError> {
        self.parse_number(
            |payload| match payload {
                Payload::U64(value) => Some(*value),
                _ => None,
            },
            scalar::parse_u64,
        )
    }

    /// Parses a signed 53-bit integer, returning the cached value if
    /// already parsed as [`ParsedKind::I64`].
    ///
    /// # Errors
    ///
    /// Returns [`JsonError::UnexpectedType`] for other token types and
    /// [`JsonError::InvalidValue`] for an invalid, fractional or out of
    /// range number.
    pub fn parse_i64(self) -> Result<i64, JsonError> {
        self.parse_number(
            |payload| match payload {
                Payload::I64(value) => Some(*value),
                _ => None,
            },
            scalar::parse_i64,
        )
    }

    /// Parses a size, returning the cached value if already parsed as
    /// [`ParsedKind::SIZE`].
    ///
    /// # Errors
    ///
    /// Returns [`JsonError::UnexpectedType`] for other token types and
    /// [`JsonError::InvalidValue`] for an invalid, fractional, negative or
    /// out of range number.
    pub fn parse_size(self) -> Result<usize, JsonError> {
        self.parse_number(size_of_payload, scalar::parse_size)
    }

    /// Parses a string, decoding escape sequences. Borrows from the
    /// document when the string is already parsed or has no escapes.
    ///
    /// # Errors
    ///
    /// Returns [`JsonError::UnexpectedType`] for other token types and
    /// [`JsonError::InvalidValue`] for an invalid escape sequence.
    pub fn parse_string(self) -> Result<Cow<'d, str>, JsonError> {
        self.expect_value(TokenType::String)?;
        if self.is_parsed() {
            return Ok(Cow::Borrowed(self.as_str()));
        }
        scalar::unescape(scalar::string_contents(self.data()))
            .map_err(|message| self.invalid_value(message))
    }

    /// Collects array items with `extract`, or `None` if this is not an
    /// array or any item is rejected.
    fn homogeneous<T>(
        self,
        extract: impl Fn(TokenRef<'d>) -> Option<T>,
    ) -> Option<Vec<T>> {
        if self.token_type() != TokenType::Array {
            return None;
        }
        self.as_array().map(|item| extract(item.value())).collect()
    }

    /// Values of an array of parsed bools, `None` if the token is not an
    /// array or any item is not a parsed bool.
    #[must_use]
    pub fn as_bool_array(self) -> Option<Vec<bool>> {
        self.homogeneous(|item| match item.token().payload() {
            Payload::Bool(value) => Some(*value),
            _ => None,
        })
    }

    /// Values of an array parsed as [`ParsedKind::Double`], `None` if the
    /// token is not an array or any item is parsed differently or not at all.
    #[must_use]
    pub fn as_double_array(self) -> Option<Vec<f64>> {
        self.homogeneous(|item| match item.token().payload() {
            Payload::Double(value) => Some(*value),
            _ => None,
        })
    }

    /// Values of an array parsed as [`ParsedKind::Float`], `None` if the
    /// token is not an array or any item is parsed differently or not at all.
    #[must_use]
    pub fn as_float_array(self) -> Option<Vec<f32>> {
        self.homogeneous(|item| match item.token().payload() {
            Payload::Float(value) => Some(*value),
            _ => None,
        })
    }

    /// Values of an array parsed as [`ParsedKind::U32`], `None` if the
    /// token is not an array or any item is parsed differently or not at all.
    #[must_use]
    pub fn as_u32_array(self) -> Option<Vec<u32>> {
        self.homogeneous(|item| match item.token().payload() {
            Payload::U32(value) => Some(*value),
            _ => None,
        })
    }

    /// Values of an array parsed as [`ParsedKind::I32`], `None` if the
    /// token is not an array or any item is parsed differently or not at all.
    #[must_use]
    pub fn as_i32_array(self) -> Option<Vec<i32>> {
        self.homogeneous(|item| match item.token().payload() {
            Payload::I32(value) => Some(*value),
            _ => None,
        })
    }

    /// Values of an array parsed as [`ParsedKind::U64`], `None` if the
    /// token is not an array or any item is parsed differently or not at all.
    #[must_use]
    pub fn as_u64_array(self) -> Option<Vec<u64>> {
        self.homogeneous(|item| match item.token().payload() {
            Payload::U64(value) => Some(*value),
            _ => None,
        })
    }

    /// Values of an array parsed as [`ParsedKind::I64`], `None` if the
    /// token is not an array or any item is parsed differently or not at all.
    #[must_use]
    pub fn as_i64_array(self) -> Option<Vec<i64>> {
        self.homogeneous(|item| match item.token().payload() {
            Payload::I64(value) => Some(*value),
            _ => None,
        })
    }

    /// Values of an array parsed as [`ParsedKind::SIZE`], `None` if the
    /// token is not an array or any item is parsed differently or not at all.
    #[must_use]
    pub fn as_size_array(self) -> Option<Vec<usize>> {
        self.homogeneous(|item| size_of_payload(item.token().payload()))
    }
}

/// Extracts a size from a payload of the size kind of the target.
fn size_of_payload(payload: &Payload) -> Option<usize> {
    match payload {
        #[cfg(target_pointer_width = "64")]
        Payload::U64(value) => usize::try_from(*value).ok(),
        #[cfg(not(target_pointer_width = "64"))]
        Payload::U32(value) => usize::try_from(*value).ok(),
        _ => None,
    }
}

/// Two handles are equal when they point to the same token of the same
/// document.
impl PartialEq for TokenRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.document, other.document) && self.index == other.index
    }
}

impl Eq for TokenRef<'_> {}

impl fmt::Debug for TokenRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRef")
            .field("index", &self.index)
            .field("type", &self.token_type())
            .field("parsed", &self.parsed_kind())
            .field("span", &self.token().span())
            .finish()
    }
}

/// Walks immediate children of a container by skipping over their
/// descendants.
#[derive(Clone)]
struct Siblings<'d> {
    document: &'d Document<'d>,
    current: usize,
    end: usize,
}

impl<'d> Siblings<'d> {
    fn of(container: TokenRef<'d>) -> Self {
        Self {
            document: container.document,
            current: container.index + 1,
            end: container.index + container.child_count() + 1,
        }
    }
}

impl<'d> Iterator for Siblings<'d> {
    type Item = TokenRef<'d>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.end {
            return None;
        }
        let token = TokenRef::new(self.document, self.current);
        self.current += token.child_count() + 1;
        Some(token)
    }
}

/// A key/value pair of an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectItem<'d> {
    key: TokenRef<'d>,
}

impl<'d> ObjectItem<'d> {
    /// Parsed key string.
    ///
    /// # Panics
    ///
    /// Panics if the key is not parsed.
    #[must_use]
    pub fn key(self) -> &'d str {
        self.key.as_str()
    }

    /// The key token itself.
    #[must_use]
    pub const fn key_token(self) -> TokenRef<'d> {
        self.key
    }

    /// Value token of the key.
    #[must_use]
    pub const fn value(self) -> TokenRef<'d> {
        self.key.at(self.key.index + 1)
    }
}

/// Iterator over key/value pairs of an object, see [`TokenRef::as_object`].
#[derive(Clone)]
pub struct ObjectIter<'d> {
    inner: Siblings<'d>,
}

impl<'d> Iterator for ObjectIter<'d> {
    type Item = ObjectItem<'d>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|key| ObjectItem { key })
    }
}

impl FusedIterator for ObjectIter<'_> {}

/// An item of an array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayItem<'d> {
    index: usize,
    value: TokenRef<'d>,
}

impl<'d> ArrayItem<'d> {
    /// Position of the item in the array.
    #[must_use]
    pub const fn index(self) -> usize {
        self.index
    }

    /// Value token.
    #[must_use]
    pub const fn value(self) -> TokenRef<'d> {
        self.value
    }
}

/// Iterator over values of an array, see [`TokenRef::as_array`].
#[derive(Clone)]
pub struct ArrayIter<'d> {
    inner: Siblings<'d>,
    index: usize,
}

impl<'d> Iterator for ArrayIter<'d> {
    type Item = ArrayItem<'d>;

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.inner.next()?;
        let item = ArrayItem {
            index: self.index,
            value,
        };
        self.index += 1;
        Some(item)
    }
}

impl FusedIterator for ArrayIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;

    fn document(text: &str, options: Options) -> Document<'static> {
        Document::parse_with_label(text, "<in>", options).expect("valid JSON")
    }

    #[test]
    fn next_and_first_child() {
        let doc = document(r#"[{"a": [1, 2]}, 3]"#, Options::empty());
        let root = doc.root();
        let object = root.first_child().unwrap();
        assert_eq!(object.token_type(), TokenType::Object);
        assert_eq!(object.child_count(), 4);

        let three = object.next().unwrap();
        assert_eq!(three.data(), "3");
        assert_eq!(three.first_child(), None);
        assert_eq!(three.next(), None);
        assert_eq!(root.next(), None);

        let key = object.first_child().unwrap();
        assert!(key.is_key());
        assert_eq!(key.child_count(), 3);
        assert_eq!(key.first_child().unwrap().data(), "[1, 2]");
        assert_eq!(key.children().len(), 3);
    }

    #[test]
    fn parent_lookup() {
        let doc = document(r#"{"a": [1, {"b": 2}], "c": 3}"#, Options::empty());
        // { "a" [ 1 { "b" 2 } ] "c" 3 }
        let parents: Vec<Option<usize>> = (0..doc.token_count())
            .map(|index| doc.token(index).parent().map(TokenRef::index))
            .collect();
        assert_eq!(
            parents,
            vec![
                None,
                Some(0),
                Some(1),
                Some(2),
                Some(2),
                Some(4),
                Some(5),
                Some(0),
                Some(7)
            ]
        );
    }

    #[test]
    fn object_iteration_restarts() {
        let doc = document(
            r#"{"a": {"x": 1}, "b": [2], "a": null}"#,
            Options::PARSE_STRING_KEYS,
        );
        let items = doc.root().as_object();
        let keys: Vec<&str> = items.clone().map(ObjectItem::key).collect();
        assert_eq!(keys, vec!["a", "b", "a"]);
        let values: Vec<&str> =
            items.map(|item| item.value().data()).collect();
        assert_eq!(values, vec![r#"{"x": 1}"#, "[2]", "null"]);
    }

    #[test]
    fn array_iteration_indices() {
        let doc = document("[[1], {}, 3]", Options::empty());
        let items: Vec<(usize, &str)> = doc
            .root()
            .as_array()
            .map(|item| (item.index(), item.value().data()))
            .collect();
        assert_eq!(items, vec![(0, "[1]"), (1, "{}"), (2, "3")]);
    }

    #[test]
    fn find_by_key_and_index() {
        let doc =
            document(r#"{"a": 1, "b": [5, 6]}"#, Options::PARSE_STRING_KEYS);
        let root = doc.root();
        let b = root.find("b").unwrap();
        assert_eq!(b.find_index(1).unwrap().data(), "6");
        assert_eq!(b.find_index(2), None);
        assert_eq!(root.find("c"), None);
        assert_eq!(root.expect_key("a").data(), "1");
        assert_eq!(b.expect_index(0).data(), "5");
    }

    #[test]
    #[should_panic(expected = "key \"z\" not found")]
    fn expect_missing_key() {
        let doc = document(r#"{"a": 1}"#, Options::PARSE_STRING_KEYS);
        let _ = doc.root().expect_key("z");
    }

    #[test]
    #[should_panic(expected = "as_array(): token is a parsed Object")]
    fn array_view_of_object() {
        let doc = document("{}", Options::empty());
        let _ = doc.root().as_array();
    }

    #[test]
    #[should_panic(expected = "as_str(): token is a String parsed as None")]
    fn find_with_unparsed_keys() {
        let doc = document(r#"{"a": 1}"#, Options::empty());
        let _ = doc.root().find("a");
    }

    #[test]
    fn typed_getters() {
        let doc = document(
            r#"[null, true, 2.5, "a\tb"]"#,
            Options::PARSE_LITERALS
                | Options::PARSE_DOUBLES
                | Options::PARSE_STRINGS,
        );
        let root = doc.root();
        root.expect_index(0).as_null();
        assert!(root.expect_index(1).as_bool());
        assert!((root.expect_index(2).as_double() - 2.5).abs() < f64::EPSILON);
        assert_eq!(root.expect_index(3).as_str(), "a\tb");
        assert!(!root.expect_index(3).is_global());
    }

    #[test]
    #[should_panic(expected = "as_u32(): token is a Number parsed as Double")]
    fn getter_of_other_kind() {
        let doc = document("7", Options::PARSE_DOUBLES);
        let _ = doc.root().as_u32();
    }

    #[test]
    #[should_panic(expected = "as_bool(): token is a Bool parsed as None")]
    fn getter_of_unparsed_token() {
        let doc = document("true", Options::empty());
        let _ = doc.root().as_bool();
    }

    #[test]
    fn on_the_fly_parsing() {
        let doc = document(r#"[42, "x\ny", true, null, -3]"#, Options::empty());
        let root = doc.root();
        assert_eq!(root.expect_index(0).parse_u32().unwrap(), 42);
        assert_eq!(root.expect_index(0).parse_size().unwrap(), 42);
        assert_eq!(root.expect_index(0).parse_float().unwrap(), 42.0);
        assert_eq!(root.expect_index(1).parse_string().unwrap(), "x\ny");
        assert!(root.expect_index(2).parse_bool().unwrap());
        assert!(root.expect_index(3).parse_null().is_ok());
        assert_eq!(root.expect_index(4).parse_i32().unwrap(), -3);
        assert_eq!(root.expect_index(4).parse_i64().unwrap(), -3);
        // nothing was cached
        assert!(!root.expect_index(0).is_parsed());

        assert!(matches!(
            root.expect_index(4).parse_u64(),
            Err(JsonError::InvalidValue { .. })
        ));
        assert!(matches!(
            root.expect_index(1).parse_double(),
            Err(JsonError::UnexpectedType {
                expected: TokenType::Number,
                found: TokenType::String,
                ..
            })
        ));
    }

    #[test]
    fn on_the_fly_returns_cached_value() {
        let mut doc = document("[1.5, 2]", Options::empty());
        doc.parse_floats(0).unwrap();
        let root = doc.root();
        assert_eq!(root.expect_index(0).parse_float().unwrap(), 1.5);
        // a different kind is converted from the text again
        assert_eq!(root.expect_index(1).parse_u32().unwrap(), 2);
        assert!(root.expect_index(0).parse_u32().is_err());
    }

    #[test]
    fn homogeneous_arrays() {
        let mut doc = document(
            "[[1, 2, 3], [true, false], [1, true], []]",
            Options::empty(),
        );
        assert_eq!(doc.root().expect_index(0).as_u32_array(), None);

        doc.parse_u32s(1).unwrap();
        doc.parse_literals(0).unwrap();
        let root = doc.root();
        assert_eq!(root.expect_index(0).as_u32_array(), Some(vec![1, 2, 3]));
        assert_eq!(root.expect_index(0).as_i32_array(), None);
        assert_eq!(
            root.expect_index(1).as_bool_array(),
            Some(vec![true, false])
        );
        assert_eq!(root.expect_index(2).as_bool_array(), None);
        assert_eq!(root.expect_index(3).as_double_array(), Some(vec![]));
        assert_eq!(root.as_u32_array(), None);
        assert_eq!(root.expect_index(1).expect_index(0).as_bool_array(), None);
    }
}
