//! # Tokenized Document
//!
//! A [`Document`] owns the token array of one JSON text, together with the
//! text itself unless the caller lends it for the document's lifetime.
//!
//! Token values are parsed on demand with the bulk `parse_*` operations,
//! which take exclusive access to the document and upgrade every matching
//! token in a subtree in place. Repeating a call is a cheap no-op, calling
//! it with a different numeric kind revalidates and overwrites the values.
use log::debug;
use std::borrow::Cow;
use std::fs;
use std::path::Path;

use crate::error::{JsonError, Location};
use crate::navigate::TokenRef;
use crate::options::Options;
use crate::scalar;
use crate::tokenizer::{self, ParsedKind, Payload, Token, TokenType};

/// Label used in error messages for text that doesn't come from a file.
pub const DEFAULT_LABEL: &str = "<in>";

/// Text a document was tokenized from.
#[derive(Debug)]
enum Source<'a> {
    /// Caller-owned text guaranteed to outlive the document
    Borrowed(&'a str),
    /// Private copy of the text
    Owned(Box<str>),
}

impl Source<'_> {
    fn as_str(&self) -> &str {
        match self {
            Self::Borrowed(text) => text,
            Self::Owned(text) => text,
        }
    }
}

/// A tokenized JSON document.
///
/// Tokens are stored in a single contiguous array in depth-first order,
/// with the root at index `0`. Moving the document keeps the token array
/// and all decoded strings at their addresses.
#[derive(Debug)]
pub struct Document<'a> {
    source: Source<'a>,
    label: String,
    tokens: Vec<Token>,
}

impl Document<'static> {
    /// Tokenizes a copy of `text`. See [`crate::parse`].
    ///
    /// # Errors
    ///
    /// Returns a [`JsonError`] if the text is not valid JSON or if a value
    /// selected by `options` fails to parse.
    pub fn parse_with_label(
        text: &str,
        label: &str,
        options: Options,
    ) -> Result<Self, JsonError> {
        Self::tokenize(Source::Owned(text.into()), label, options)
    }

    /// Reads and tokenizes a whole file. See [`crate::parse_file`].
    ///
    /// # Errors
    ///
    /// Returns a [`JsonError`] if the file can't be read, is not UTF-8, is
    /// not valid JSON or if a value selected by `options` fails to parse.
    pub fn parse_file(
        path: &Path,
        options: Options,
    ) -> Result<Self, JsonError> {
        let bytes = fs::read(path).map_err(|source| JsonError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let text =
            String::from_utf8(bytes).map_err(|e| JsonError::InvalidUtf8 {
                path: path.to_path_buf(),
                offset: e.utf8_error().valid_up_to(),
            })?;
        Self::tokenize(
            Source::Owned(text.into_boxed_str()),
            &path.display().to_string(),
            options,
        )
    }
}

impl<'a> Document<'a> {
    fn tokenize(
        source: Source<'a>,
        label: &str,
        options: Options,
    ) -> Result<Self, JsonError> {
        let tokens =
            tokenizer::tokenize(source.as_str(), label, options.max_depth())?;
        let mut document = Self {
            source,
            label: label.to_string(),
            tokens,
        };
        document.apply_options(options)?;
        Ok(document)
    }

    /// Tokenizes `text` without copying it. See [`crate::parse_borrowed`].
    ///
    /// # Errors
    ///
    /// Returns a [`JsonError`] if the text is not valid JSON or if a value
    /// selected by `options` fails to parse.
    pub fn parse_borrowed(
        text: &'a str,
        options: Options,
    ) -> Result<Self, JsonError> {
        Self::tokenize(Source::Borrowed(text), DEFAULT_LABEL, options)
    }

    fn apply_options(&mut self, options: Options) -> Result<(), JsonError> {
        if options.contains(Options::PARSE_LITERALS) {
            self.parse_literals(0)?;
        }
        if options.contains(Options::PARSE_DOUBLES) {
            self.parse_doubles(0)?;
        } else if options.contains(Options::PARSE_FLOATS) {
            self.parse_floats(0)?;
        }
        if options.contains(Options::PARSE_STRINGS) {
            self.parse_strings(0)?;
        } else if options.contains(Options::PARSE_STRING_KEYS) {
            self.parse_string_keys(0)?;
        }
        Ok(())
    }

    /// Source text the tokens point into.
    #[must_use]
    pub fn text(&self) -> &str {
        self.source.as_str()
    }

    /// Label used in error messages, the file path for files.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether the source text is borrowed from the caller rather than
    /// copied.
    #[must_use]
    pub const fn is_borrowed(&self) -> bool {
        matches!(self.source, Source::Borrowed(_))
    }

    /// All tokens in depth-first order. The root is always present.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Number of tokens, equal to the root's child count plus one.
    #[must_use]
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// The root token, spanning the whole document.
    #[must_use]
    pub fn root(&self) -> TokenRef<'_> {
        TokenRef::new(self, 0)
    }

    /// Token at `index`, or `None` past the end.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<TokenRef<'_>> {
        (index < self.tokens.len()).then(|| TokenRef::new(self, index))
    }

    /// Token at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn token(&self, index: usize) -> TokenRef<'_> {
        self.get(index).unwrap_or_else(|| {
            panic!(
                "Document::token(): index {index} out of range for {} tokens",
                self.tokens.len()
            )
        })
    }

    /// Number of tokens nested under the token at `index`. An escaped key
    /// whose count gave way to the decoded string gets it from its value,
    /// which is stored right after it.
    pub(crate) fn descendant_count(&self, index: usize) -> usize {
        let token = &self.tokens[index];
        match token.stored_descendants() {
            Some(count) => count,
            None if token.is_key() => 1 + self.descendant_count(index + 1),
            None => 0,
        }
    }

    /// Index one past the subtree rooted at `root`.
    fn subtree_end(&self, root: usize) -> usize {
        assert!(
            root < self.tokens.len(),
            "Document: token index {root} out of range for {} tokens",
            self.tokens.len()
        );
        root + self.descendant_count(root) + 1
    }

    /// Location of the token at `index`, for error reporting.
    pub(crate) fn location(&self, index: usize) -> Location {
        Location::new(
            &self.label,
            self.text(),
            self.tokens[index].span().start,
        )
    }

    /// Parses `null`, `true` and `false` literals in the subtree rooted at
    /// the token at `root`, including the root itself.
    ///
    /// # Errors
    ///
    /// Returns [`JsonError::InvalidValue`] at the first invalid literal.
    /// Literals parsed before it stay parsed.
    ///
    /// # Panics
    ///
    /// Panics if `root` is out of bounds.
    pub fn parse_literals(&mut self, root: usize) -> Result<(), JsonError> {
        let end = self.subtree_end(root);
        let mut parsed = 0usize;
        for index in root..end {
            let token = &self.tokens[index];
            if token.is_parsed() {
                continue;
            }
            let text = &self.text()[token.span()];
            match token.token_type() {
                TokenType::Null => {
                    scalar::parse_null(text)
                        .map_err(|message| self.invalid_value(index, message))?;
                    self.tokens[index].mark_parsed(false);
                }
                TokenType::Bool => {
                    let value = scalar::parse_bool(text)
                        .map_err(|message| self.invalid_value(index, message))?;
                    self.tokens[index]
                        .set_parsed(ParsedKind::Other, Payload::Bool(value));
                }
                _ => continue,
            }
            parsed += 1;
        }
        debug!("parsed {parsed} literals under token {root}");
        Ok(())
    }

    /// Parses numbers in the subtree at `root` with `convert`, skipping those
    /// already parsed as `kind`.
    fn parse_numbers(
        &mut self,
        root: usize,
        kind: ParsedKind,
        convert: fn(&str) -> Result<Payload, String>,
    ) -> Result<(), JsonError> {
        let end = self.subtree_end(root);
        let mut parsed = 0usize;
        for index in root..end {
            let token = &self.tokens[index];
            if token.token_type() != TokenType::Number
                || token.parsed_kind() == kind
            {
                continue;
            }
            let payload = convert(&self.text()[token.span()])
                .map_err(|message| self.invalid_value(index, message))?;
            self.tokens[index].set_parsed(kind, payload);
            parsed += 1;
        }
        debug!("parsed {parsed} numbers as {kind} under token {root}");
        Ok(())
    }

    /// Parses numbers in the subtree at `root` as 64-bit floats.
    ///
    /// # Errors
    ///
    /// Returns [`JsonError::InvalidValue`] at the first invalid number.
    /// Numbers parsed before it keep their new value.
    ///
    /// # Panics
    ///
    /// Panics if `root` is out of bounds.
    pub fn parse_doubles(&mut self, root: usize) -> Result<(), JsonError> {
        self.parse_numbers(root, ParsedKind::Double, |text| {
            scalar::parse_double(text).map(Payload::Double)
        })
    }

    /// Parses numbers in the subtree at `root` as 32-bit floats, dropping
    /// precision that doesn't fit.
    ///
    /// # Errors
    ///
    /// Returns [`JsonError::InvalidValue`] at the first invalid number.
    /// Numbers parsed before it keep their new value.
    ///
    /// # Panics
    ///
    /// Panics if `root` is out of bounds.
    pub fn parse_floats(&mut self, root: usize) -> Result<(), JsonError> {
        self.parse_numbers(root, ParsedKind::Float, |text| {
            scalar::parse_float(text).map(Payload::Float)
        })
    }

    /// Parses numbers in the subtree at `root` as unsigned 32-bit integers.
    /// Fractional parts, exponents and negative values are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`JsonError::InvalidValue`] at the first invalid or out of
    /// range number. Numbers parsed before it keep their new value.
    ///
    /// # Panics
    ///
    /// Panics if `root` is out of bounds.
    pub fn parse_u32s(&mut self, root: usize) -> Result<(), JsonError> {
        self.parse_numbers(root, ParsedKind::U32, |text| {
            scalar::parse_u32(text).map(Payload::U32)
        })
    }

    /// Parses numbers in the subtree at `root` as signed 32-bit integers.
    /// Fractional parts and exponents are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`JsonError::InvalidValue`] at the first invalid or out of
    /// range number. Numbers parsed before it keep their new value.
    ///
    /// # Panics
    ///
    /// Panics if `root` is out of bounds.
    pub fn parse_i32s(&mut self, root: usize) -> Result<(), JsonError> {
        self.parse_numbers(root, ParsedKind::I32, |text| {
            scalar::parse_i32(text).map(Payload::I32)
        })
    }

    /// Parses numbers in the subtree at `root` as unsigned integers of at
    /// most 52 bits, the range a double represents exactly.
    ///
    /// # Errors
    ///
    /// Returns [`JsonError::InvalidValue`] at the first invalid or out of
    /// range number. Numbers parsed before it keep their new value.
    ///
    /// # Panics
    ///
    /// Panics if `root` is out of bounds.
    pub fn parse_u64s(&mut self, root: usize) -> Result<(), JsonError> {
        self.parse_numbers(root, ParsedKind::U64, |text| {
            scalar::parse_u64(text).map(Payload::U64)
        })
    }

    /// Parses numbers in the subtree at `root` as signed integers with a
    /// magnitude of at most 53 bits.
    ///
    /// # Errors
    ///
    /// Returns [`JsonError::InvalidValue`] at the first invalid or out of
    /// range number. Numbers parsed before it keep their new value.
    ///
    /// # Panics
    ///
    /// Panics if `root` is out of bounds.
    pub fn parse_i64s(&mut self, root: usize) -> Result<(), JsonError> {
        self.parse_numbers(root, ParsedKind::I64, |text| {
            scalar::parse_i64(text).map(Payload::I64)
        })
    }

    /// Parses numbers in the subtree at `root` as sizes, which is
    /// [`Self::parse_u64s`] on 64-bit targets and [`Self::parse_u32s`]
    /// elsewhere.
    ///
    /// # Errors
    ///
    /// Returns [`JsonError::InvalidValue`] at the first invalid or out of
    /// range number. Numbers parsed before it keep their new value.
    ///
    /// # Panics
    ///
    /// Panics if `root` is out of bounds.
    pub fn parse_sizes(&mut self, root: usize) -> Result<(), JsonError> {
        if cfg!(target_pointer_width = "64") {
            self.parse_u64s(root)
        } else {
            self.parse_u32s(root)
        }
    }

    /// Parses object keys in the subtree at `root`, which makes key lookup
    /// and object iteration possible. String values are left alone.
    ///
    /// # Errors
    ///
    /// Returns [`JsonError::InvalidValue`] at the first key with an invalid
    /// escape sequence. Keys parsed before it stay parsed.
    ///
    /// # Panics
    ///
    /// Panics if `root` is out of bounds.
    pub fn parse_string_keys(&mut self, root: usize) -> Result<(), JsonError> {
        self.parse_string_tokens(root, true)
    }

    /// Parses all strings, both keys and values, in the subtree at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`JsonError::InvalidValue`] at the first string with an
    /// invalid escape sequence. Strings parsed before it stay parsed.
    ///
    /// # Panics
    ///
    /// Panics if `root` is out of bounds.
    pub fn parse_strings(&mut self, root: usize) -> Result<(), JsonError> {
        self.parse_string_tokens(root, false)
    }

    /// Strings without escapes are only marked as parsed and keep pointing
    /// into the source text, the rest get decoded into their own buffer.
    fn parse_string_tokens(
        &mut self,
        root: usize,
        keys_only: bool,
    ) -> Result<(), JsonError> {
        let end = self.subtree_end(root);
        let global = self.is_borrowed();
        let mut in_place = 0usize;
        let mut decoded = 0usize;

        for index in root..end {
            let token = &self.tokens[index];
            if token.token_type() != TokenType::String
                || token.is_parsed()
                || (keys_only && !token.is_key())
            {
                continue;
            }
            let raw = &self.text()[token.span()];
            let contents = scalar::string_contents(raw);
            let decoded_value = match scalar::unescape(contents) {
                Ok(Cow::Borrowed(_)) => None,
                Ok(Cow::Owned(value)) => Some(value.into_boxed_str()),
                Err(message) => return Err(self.invalid_value(index, message)),
            };
            let token = &mut self.tokens[index];
            if let Some(value) = decoded_value {
                token.set_parsed(ParsedKind::Other, Payload::String(value));
                decoded += 1;
            } else {
                token.mark_parsed(global);
                in_place += 1;
            }
        }

        debug!(
            "parsed strings under token {root}: {in_place} in place, \
             {decoded} decoded"
        );
        Ok(())
    }

    fn invalid_value(&self, index: usize, message: String) -> JsonError {
        JsonError::InvalidValue {
            message,
            location: self.location(index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(text: &str) -> Document<'static> {
        Document::parse_with_label(text, DEFAULT_LABEL, Options::empty())
            .expect("valid JSON")
    }

    #[test]
    fn owned_and_borrowed_sources() {
        let text = String::from(r#"{"a": 1}"#);
        let borrowed =
            Document::parse_borrowed(&text, Options::empty()).unwrap();
        assert!(borrowed.is_borrowed());
        assert_eq!(borrowed.text().as_ptr(), text.as_ptr());

        let owned = document(&text);
        assert!(!owned.is_borrowed());
        assert_ne!(owned.text().as_ptr(), text.as_ptr());
        assert_eq!(owned.text(), text);
        assert_eq!(owned.label(), DEFAULT_LABEL);
    }

    #[test]
    fn literals_are_validated() {
        let mut doc = document("[null, true, false]");
        doc.parse_literals(0).unwrap();
        assert!(doc.tokens().iter().all(Token::is_parsed));
        assert_eq!(doc.tokens()[2].payload(), &Payload::Bool(true));

        let mut doc = document("[true, nul, false]");
        let error = doc.parse_literals(0).unwrap_err();
        assert_eq!(error.to_string(), "<in>:1:8: invalid null literal nul");
        // non-transactional
        assert!(doc.tokens()[1].is_parsed());
        assert!(!doc.tokens()[3].is_parsed());
    }

    #[test]
    fn parse_only_visits_the_subtree() {
        let mut doc = document("[[1, 2], 3]");
        doc.parse_u32s(1).unwrap();
        let kinds: Vec<ParsedKind> =
            doc.tokens().iter().map(Token::parsed_kind).collect();
        assert_eq!(
            kinds,
            vec![
                ParsedKind::Other,
                ParsedKind::Other,
                ParsedKind::U32,
                ParsedKind::U32,
                ParsedKind::None
            ]
        );
    }

    #[test]
    fn last_numeric_kind_wins() {
        let mut doc = document("[1, 2]");
        doc.parse_doubles(0).unwrap();
        assert_eq!(doc.tokens()[1].payload(), &Payload::Double(1.0));
        doc.parse_u32s(0).unwrap();
        assert_eq!(doc.tokens()[1].payload(), &Payload::U32(1));
        doc.parse_i64s(0).unwrap();
        assert_eq!(doc.tokens()[2].payload(), &Payload::I64(2));
        doc.parse_doubles(0).unwrap();
        assert_eq!(doc.tokens()[2].parsed_kind(), ParsedKind::Double);
    }

    #[test]
    fn sizes_share_the_wide_kind() {
        let mut doc = document("[4503599627370496]");
        doc.parse_sizes(0).unwrap();
        assert_eq!(doc.tokens()[1].parsed_kind(), ParsedKind::SIZE);
    }

    #[test]
    fn escaped_key_keeps_its_child_count() {
        let mut doc = document(r#"{"k\u0065y": [1, 2, 3], "next": 4}"#);
        assert_eq!(doc.descendant_count(1), 4);
        doc.parse_string_keys(0).unwrap();
        assert!(doc.tokens()[1].is_escaped());
        assert_eq!(doc.tokens()[1].stored_descendants(), None);
        assert_eq!(doc.descendant_count(1), 4);
        assert_eq!(doc.descendant_count(0), 7);
        assert!(!doc.tokens()[6].is_escaped());
    }

    #[test]
    fn keys_only_leaves_values() {
        let mut doc = document(r#"{"a": "b"}"#);
        doc.parse_string_keys(0).unwrap();
        assert!(doc.tokens()[1].is_parsed());
        assert!(!doc.tokens()[2].is_parsed());
        doc.parse_strings(0).unwrap();
        assert!(doc.tokens()[2].is_parsed());
    }

    #[test]
    fn options_applied_after_tokenizing() {
        let options = Options::PARSE_LITERALS
            | Options::PARSE_DOUBLES
            | Options::PARSE_FLOATS
            | Options::PARSE_STRINGS;
        let doc = Document::parse_with_label(
            r#"{"a": [true, 1.5, "x"]}"#,
            DEFAULT_LABEL,
            options,
        )
        .unwrap();
        assert!(doc.tokens().iter().all(Token::is_parsed));
        assert_eq!(doc.tokens()[4].parsed_kind(), ParsedKind::Double);

        let error = Document::parse_with_label(
            "[1, x]",
            DEFAULT_LABEL,
            Options::PARSE_DOUBLES,
        );
        assert!(matches!(error, Err(JsonError::Syntax { .. })));
        let error = Document::parse_with_label(
            "[1, 01]",
            DEFAULT_LABEL,
            Options::PARSE_DOUBLES,
        );
        assert!(matches!(error, Err(JsonError::InvalidValue { .. })));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn parse_out_of_bounds_root() {
        let mut doc = document("[]");
        let _ = doc.parse_doubles(3);
    }
}
