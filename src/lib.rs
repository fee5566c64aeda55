/*!
# `jsonsel` Library

Tokenizes JSON into a flat, depth-first array of tokens and parses token
values only when asked to. Tokenizing validates structure but converts
nothing, so documents where only a small part is ever read cost little more
than a single scan.

```
use jsonsel::{Options, TokenType};

let mut document = jsonsel::parse(
    r#"{"name": "cube", "size": [4, 4, 2]}"#,
    Options::PARSE_STRING_KEYS,
)?;
let size = document.root().expect_key("size");
assert_eq!(size.token_type(), TokenType::Array);
assert_eq!(size.as_u32_array(), None);

let index = size.index();
document.parse_u32s(index)?;
let size = document.token(index);
assert_eq!(size.as_u32_array(), Some(vec![4, 4, 2]));
assert_eq!(document.root().expect_key("name").parse_string()?, "cube");
# Ok::<(), jsonsel::JsonError>(())
```
*/
use std::path::Path;

pub mod commands;
pub mod document;
pub mod error;
pub mod navigate;
pub mod options;
pub(crate) mod scalar;
pub mod tokenizer;
pub mod utils;

// Re-exports
pub use document::{DEFAULT_LABEL, Document};
pub use error::{JsonError, Location};
pub use navigate::{ArrayItem, ArrayIter, ObjectItem, ObjectIter, TokenRef};
pub use options::{DEFAULT_MAX_DEPTH, Options};
pub use tokenizer::{ParsedKind, Token, TokenType};

/// Tokenizes a copy of `text` and applies `options` to the whole document.
///
/// # Errors
///
/// Returns a [`JsonError`] if the text is not valid JSON or if a value
/// selected by `options` fails to parse.
pub fn parse(
    text: &str,
    options: Options,
) -> Result<Document<'static>, JsonError> {
    Document::parse_with_label(text, DEFAULT_LABEL, options)
}

/// Tokenizes `text` without copying it. Strings parsed without decoding
/// point into `text` and report [`TokenRef::is_global`].
///
/// # Errors
///
/// Returns a [`JsonError`] if the text is not valid JSON or if a value
/// selected by `options` fails to parse.
pub fn parse_borrowed(
    text: &str,
    options: Options,
) -> Result<Document<'_>, JsonError> {
    Document::parse_borrowed(text, options)
}

/// Reads and tokenizes a whole file, labeling errors with its path.
///
/// # Errors
///
/// Returns a [`JsonError`] if the file can't be read, is not UTF-8, is not
/// valid JSON or if a value selected by `options` fails to parse.
pub fn parse_file(
    path: impl AsRef<Path>,
    options: Options,
) -> Result<Document<'static>, JsonError> {
    Document::parse_file(path.as_ref(), options)
}
