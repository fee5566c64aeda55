//! # JSON Lexer
//!
//! Turns JSON text into the flat, depth-first array of [`Token`]s. Only the
//! structure is validated here: brackets, quotes, separators and the first
//! byte of every value. Literal, number and string contents are checked
//! later, when the tokens get parsed.
//!
//! Open objects, arrays and keys are tracked on an explicit stack instead
//! of through recursion, so deeply nested input can't overflow the call
//! stack. The nesting depth is bounded by a configurable limit on top.
use log::{debug, trace};
use memchr::memchr2;

use crate::error::{JsonError, Location};
use crate::tokenizer::{Token, TokenType};

/// What the lexer accepts at the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    /// Any value
    Value,
    /// Any value or `]`, right after `[`
    ValueOrClose,
    /// A key or `}`, right after `{`
    KeyOrClose,
    /// A key, after a `,` in an object
    Key,
    /// `:` after a key
    Colon,
    /// `,` or the closing bracket of the innermost container
    CommaOrClose,
    /// Only whitespace after the top-level value
    End,
}

/// A lexer producing the token array of a single JSON document.
struct Lexer<'a> {
    /// The input text to tokenize
    text: &'a str,
    /// Label of the input, used in error messages
    label: &'a str,
    /// Current position (current byte)
    position: usize,
    /// Tokens produced so far
    tokens: Vec<Token>,
    /// Indices of the currently open containers and keys, innermost last
    stack: Vec<usize>,
    /// Number of containers on the stack
    depth: usize,
    /// Maximum allowed value of `depth`
    max_depth: usize,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str, label: &'a str, max_depth: usize) -> Self {
        Self {
            text,
            label,
            position: 0,
            tokens: Vec::new(),
            stack: Vec::new(),
            depth: 0,
            max_depth,
        }
    }

    /// Byte under examination, `None` at the end of input.
    fn byte(&self) -> Option<u8> {
        self.text.as_bytes().get(self.position).copied()
    }

    /// Consume whitespace byte(s) starting from the current position.
    fn skip_whitespace(&mut self) {
        while matches!(self.byte(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.position += 1;
        }
    }

    /// Runs the lexer over the whole input.
    fn run(mut self) -> Result<Vec<Token>, JsonError> {
        let mut expect = Expect::Value;

        loop {
            self.skip_whitespace();
            let Some(byte) = self.byte() else {
                return if expect == Expect::End {
                    Ok(self.tokens)
                } else {
                    Err(self.syntax_error("unexpected end of input"))
                };
            };

            expect = match expect {
                Expect::ValueOrClose if byte == b']' => self.close()?,
                Expect::Value | Expect::ValueOrClose => self.value(byte)?,
                Expect::KeyOrClose if byte == b'}' => self.close()?,
                Expect::KeyOrClose | Expect::Key => {
                    if byte != b'"' {
                        let expected = if expect == Expect::Key {
                            "a string key"
                        } else {
                            "a string key or }"
                        };
                        return Err(self.unexpected(expected));
                    }
                    let index = self.string()?;
                    self.tokens[index].mark_key();
                    self.stack.push(index);
                    Expect::Colon
                }
                Expect::Colon => {
                    if byte != b':' {
                        return Err(self.unexpected(":"));
                    }
                    self.position += 1;
                    Expect::Value
                }
                Expect::CommaOrClose => self.comma_or_close(byte)?,
                Expect::End => {
                    return Err(self.syntax_error(&format!(
                        "unexpected {} after the top-level value",
                        self.describe()
                    )));
                }
            };
        }
    }

    /// Starts a value at the current position.
    fn value(&mut self, byte: u8) -> Result<Expect, JsonError> {
        let Some(token_type) = TokenType::from_first_byte(byte) else {
            return Err(self.unexpected("a value"));
        };

        match token_type {
            TokenType::Object | TokenType::Array => {
                if self.depth == self.max_depth {
                    return Err(JsonError::DepthLimit {
                        limit: self.max_depth,
                        location: self.location(self.position),
                    });
                }
                self.depth += 1;
                self.stack.push(self.tokens.len());
                self.tokens.push(Token::new(token_type, self.position));
                self.position += 1;
                Ok(if token_type == TokenType::Object {
                    Expect::KeyOrClose
                } else {
                    Expect::ValueOrClose
                })
            }
            TokenType::String => {
                self.string()?;
                Ok(self.after_value())
            }
            TokenType::Null | TokenType::Bool => {
                self.scalar(token_type, |byte| byte.is_ascii_alphabetic());
                Ok(self.after_value())
            }
            TokenType::Number => {
                self.scalar(token_type, |byte| {
                    byte.is_ascii_digit()
                        || matches!(byte, b'e' | b'E' | b'+' | b'-' | b'.')
                });
                Ok(self.after_value())
            }
        }
    }

    /// Reads a literal or number as the maximal run of bytes matching
    /// `accept`. The contents are validated only when parsed.
    fn scalar(&mut self, token_type: TokenType, accept: impl Fn(u8) -> bool) {
        let start = self.position;
        self.position += 1;
        while self.byte().is_some_and(&accept) {
            self.position += 1;
        }
        let mut token = Token::new(token_type, start);
        token.set_len(self.position - start);
        self.tokens.push(token);
    }

    /// Reads a string up to the closing unescaped quote and returns the
    /// index of the new token. Escapes are only tracked so that an escaped
    /// quote doesn't end the string.
    fn string(&mut self) -> Result<usize, JsonError> {
        let start = self.position;
        let bytes = self.text.as_bytes();
        let mut cursor = start + 1;

        let end = loop {
            let found = bytes
                .get(cursor..)
                .and_then(|rest| memchr2(b'"', b'\\', rest));
            match found {
                Some(offset) if bytes[cursor + offset] == b'"' => {
                    break cursor + offset + 1;
                }
                // skip the escaped byte to avoid premature termination
                // with `\"`
                Some(offset) => cursor += offset + 2,
                None => {
                    return Err(JsonError::Syntax {
                        message: "unterminated string".to_string(),
                        location: self.location(start),
                    });
                }
            }
        };

        let index = self.tokens.len();
        let mut token = Token::new(TokenType::String, start);
        token.set_len(end - start);
        self.tokens.push(token);
        self.position = end;
        Ok(index)
    }

    /// Handles a `,` or closing bracket after a value inside a container.
    fn comma_or_close(&mut self, byte: u8) -> Result<Expect, JsonError> {
        let container = self.innermost_container();
        match (container, byte) {
            (TokenType::Object, b',') => {
                self.position += 1;
                Ok(Expect::Key)
            }
            (TokenType::Array, b',') => {
                self.position += 1;
                Ok(Expect::Value)
            }
            (TokenType::Object, b'}') | (TokenType::Array, b']') => {
                self.close()
            }
            (TokenType::Object, _) => Err(self.unexpected(", or }")),
            _ => Err(self.unexpected(", or ]")),
        }
    }

    /// Type of the container on top of the stack. Keys are popped as soon as
    /// their value is complete, so the top is always a container here.
    fn innermost_container(&self) -> TokenType {
        self.stack
            .last()
            .map_or(TokenType::Array, |&index| self.tokens[index].token_type())
    }

    /// Closes the innermost container at the current bracket, backpatching
    /// its span length and descendant count.
    ///
    /// # Panics
    ///
    /// Panics if no container is open. Closing brackets are only accepted
    /// in states entered after an opening bracket was pushed.
    fn close(&mut self) -> Result<Expect, JsonError> {
        let index = self
            .stack
            .pop()
            .expect("closing bracket accepted without an open container");
        debug_assert!(self.tokens[index].token_type().is_container());
        self.position += 1;
        self.depth -= 1;

        let descendants = self.tokens.len() - index - 1;
        let token = &mut self.tokens[index];
        token.set_len(self.position - token.span().start);
        token.set_descendants(descendants);
        trace!(
            "closed {} at token {index} with {descendants} descendants",
            token.token_type()
        );

        Ok(self.after_value())
    }

    /// Finishes a complete value: closes the key it belongs to, if any, and
    /// decides what may follow.
    fn after_value(&mut self) -> Expect {
        if let Some(&index) = self.stack.last()
            && self.tokens[index].is_key()
        {
            self.stack.pop();
            let descendants = self.tokens.len() - index - 1;
            self.tokens[index].set_descendants(descendants);
        }

        if self.stack.is_empty() {
            Expect::End
        } else {
            Expect::CommaOrClose
        }
    }

    /// Describes the character at the current position for error messages.
    fn describe(&self) -> String {
        self.text[self.position..]
            .chars()
            .next()
            .map_or_else(|| "end of input".to_string(), |c| c.to_string())
    }

    fn location(&self, offset: usize) -> Location {
        Location::new(self.label, self.text, offset)
    }

    fn syntax_error(&self, message: &str) -> JsonError {
        JsonError::Syntax {
            message: message.to_string(),
            location: self.location(self.position),
        }
    }

    fn unexpected(&self, expected: &str) -> JsonError {
        self.syntax_error(&format!(
            "expected {expected} but got {}",
            self.describe()
        ))
    }
}

/// Tokenize a JSON document into a flat token array ordered depth-first.
///
/// `label` names the input in error messages, `max_depth` bounds the
/// number of nested objects and arrays.
///
/// # Errors
///
/// Returns [`JsonError::Syntax`] for structurally invalid or empty input,
/// [`JsonError::DepthLimit`] for input nested deeper than `max_depth`.
pub fn tokenize(
    text: &str,
    label: &str,
    max_depth: usize,
) -> Result<Vec<Token>, JsonError> {
    let tokens = Lexer::new(text, label, max_depth).run()?;
    debug!(
        "tokenized {label}: {} bytes into {} tokens",
        text.len(),
        tokens.len()
    );
    Ok(tokens)
}
