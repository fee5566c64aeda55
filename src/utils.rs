//! Miscellaneous utility functions used by the `jsel` binary.

use anyhow::{Context as _, bail};
use colored::Colorize;
use serde::Serialize;
use std::io::Write;
use std::io::{self, ErrorKind};

use crate::navigate::{ArrayIter, ObjectIter, TokenRef};
use crate::tokenizer::{ParsedKind, TokenType};

/// Returns the nesting depth of the value at `token`. Scalars and empty
/// containers have depth 1, object keys don't add a level.
#[must_use]
pub fn depth(token: TokenRef<'_>) -> usize {
    // end indices of the containers enclosing the current token
    let mut open: Vec<usize> = Vec::new();
    let mut deepest = 0;
    for current in token.subtree() {
        while open.last().is_some_and(|&end| end <= current.index()) {
            open.pop();
        }
        if current.is_key() {
            continue;
        }
        deepest = deepest.max(open.len() + 1);
        if current.token_type().is_container() {
            open.push(current.index() + current.child_count() + 1);
        }
    }
    deepest
}

/// Selects a value by a dotted `path` such as `nodes.1.name`. On an object
/// a segment is a key, on an array it's an index. An empty path selects
/// `root` itself.
///
/// Keys don't need to be parsed beforehand.
///
/// # Errors
///
/// Returns an error if a segment doesn't exist, indexes a scalar or if a
/// key along the way has an invalid escape sequence.
pub fn select<'d>(
    root: TokenRef<'d>,
    path: &str,
) -> anyhow::Result<TokenRef<'d>> {
    if path.is_empty() {
        return Ok(root);
    }

    let mut current = root;
    for segment in path.split('.') {
        current = match current.token_type() {
            TokenType::Object => {
                let mut found = None;
                for item in current.as_object() {
                    if item.key_token().parse_string()? == segment {
                        found = Some(item.value());
                        break;
                    }
                }
                found.with_context(|| format!("key {segment:?} not found"))?
            }
            TokenType::Array => {
                let index: usize = segment.parse().with_context(|| {
                    format!("array index expected, got {segment:?}")
                })?;
                current.find_index(index).with_context(|| {
                    format!("index {index} out of range")
                })?
            }
            other => bail!("cannot select {segment:?} in a {other} value"),
        };
    }
    Ok(current)
}

/// One row of the token table.
#[derive(Debug, Serialize)]
pub struct TokenSummary<'d> {
    /// Position in the token array
    pub index: usize,
    /// Token type
    #[serde(rename = "type")]
    pub token_type: TokenType,
    /// Parsed kind, `None` if unparsed
    pub parsed: ParsedKind,
    /// Whether the token is an object key
    pub key: bool,
    /// Number of nested tokens
    pub children: usize,
    /// Byte offset of the token's start
    pub start: usize,
    /// Byte offset one past the token's end
    pub end: usize,
    /// Raw text, only for scalars
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<&'d str>,
}

impl<'d> From<TokenRef<'d>> for TokenSummary<'d> {
    fn from(token: TokenRef<'d>) -> Self {
        let span = token.token().span();
        Self {
            index: token.index(),
            token_type: token.token_type(),
            parsed: token.parsed_kind(),
            key: token.is_key(),
            children: token.child_count(),
            start: span.start,
            end: span.end,
            data: (!token.token_type().is_container()).then(|| token.data()),
        }
    }
}

/// Silently turns a broken pipe into success, so that piping to tools like
/// `less` or `head` exits cleanly.
fn ignore_broken_pipe(
    result: io::Result<()>,
    what: &'static str,
) -> anyhow::Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::BrokenPipe => Ok(()),
        Err(err) => Err(err).context(what),
    }
}

/// Write all tokens of the subtree at `root` to `writer`, either as an
/// aligned table or as one JSON object per line.
///
/// # Errors
///
/// Returns an error if writing to `writer` fails.
pub fn write_token_table<W: Write>(
    writer: &mut W,
    root: TokenRef<'_>,
    json_lines: bool,
) -> anyhow::Result<()> {
    let result = (|| -> io::Result<()> {
        if !json_lines {
            writeln!(
                writer,
                "{:>6}  {:<6}  {:<6}  {:>8}  span",
                "index", "type", "parsed", "children"
            )?;
        }
        for token in root.subtree() {
            let summary = TokenSummary::from(token);
            if json_lines {
                serde_json::to_writer(&mut *writer, &summary)?;
                writeln!(writer)?;
                continue;
            }
            let token_type = if summary.key {
                format!("{}*", summary.token_type)
            } else {
                summary.token_type.to_string()
            };
            writeln!(
                writer,
                "{:>6}  {:<6}  {:<6}  {:>8}  {}..{}",
                summary.index,
                token_type,
                summary.parsed.to_string(),
                summary.children,
                summary.start,
                summary.end
            )?;
        }
        Ok(())
    })();

    ignore_broken_pipe(result, "write token table to stdout")
}

// ==============================================================================
// Colorized JSON Output
// ==============================================================================

/// Write a selected value (path header + colorized JSON value) to `writer`.
///
/// # Errors
///
/// Returns an error if writing to `writer` fails.
pub fn write_colored_result<W: Write>(
    writer: &mut W,
    value: TokenRef<'_>,
    path: &str,
    pretty: bool,
    show_path: bool,
) -> anyhow::Result<()> {
    let result = (|| -> io::Result<()> {
        if show_path && !path.is_empty() {
            writeln!(writer, "{}:", path.bold().magenta())?;
        }
        write_colored_json(writer, value, pretty)?;
        writeln!(writer)?;
        Ok(())
    })();

    ignore_broken_pipe(result, "write colorized JSON to stdout")
}

/// Remaining items of a container being written.
enum Items<'d> {
    Array(ArrayIter<'d>),
    Object(ObjectIter<'d>),
}

/// An open container in [`write_colored_json`].
struct Frame<'d> {
    items: Items<'d>,
    /// Indentation of the container's own line
    indent: usize,
    /// No item written yet
    first: bool,
}

impl<'d> Frame<'d> {
    /// Next key (for objects) and value of the container.
    fn next_item(&mut self) -> Option<(Option<TokenRef<'d>>, TokenRef<'d>)> {
        match &mut self.items {
            Items::Array(items) => {
                items.next().map(|item| (None, item.value()))
            }
            Items::Object(items) => items
                .next()
                .map(|item| (Some(item.key_token()), item.value())),
        }
    }

    const fn closing(&self) -> &'static str {
        match self.items {
            Items::Array(_) => "]",
            Items::Object(_) => "}",
        }
    }
}

/// Write a JSON value with syntax highlighting. Scalars and keys are written
/// as they appear in the source, escapes included.
///
/// Open containers are kept on an explicit stack, so any document the
/// tokenizer accepted can be written regardless of its nesting.
fn write_colored_json<W: Write>(
    writer: &mut W,
    value: TokenRef<'_>,
    pretty: bool,
) -> io::Result<()> {
    let mut open: Vec<Frame<'_>> = Vec::new();
    let mut pending = Some(value);

    loop {
        if let Some(value) = pending.take() {
            let indent = open.last().map_or(0, |frame| frame.indent + 2);
            let items = match value.token_type() {
                TokenType::Null => {
                    write!(writer, "{}", value.data().red().dimmed())?;
                    None
                }
                TokenType::Bool => {
                    write!(writer, "{}", value.data().yellow().bold())?;
                    None
                }
                TokenType::Number => {
                    write!(writer, "{}", value.data().yellow())?;
                    None
                }
                TokenType::String => {
                    write!(writer, "{}", value.data().green())?;
                    None
                }
                TokenType::Array => {
                    write!(writer, "[")?;
                    Some(Items::Array(value.as_array()))
                }
                TokenType::Object => {
                    write!(writer, "{{")?;
                    Some(Items::Object(value.as_object()))
                }
            };
            if let Some(items) = items {
                open.push(Frame {
                    items,
                    indent,
                    first: true,
                });
            }
        }

        let Some(frame) = open.last_mut() else {
            return Ok(());
        };
        if let Some((key, value)) = frame.next_item() {
            if !frame.first {
                write!(writer, ",")?;
            }
            frame.first = false;
            if pretty {
                writeln!(writer)?;
                write!(writer, "{:width$}", "", width = frame.indent + 2)?;
            }
            if let Some(key) = key {
                write!(writer, "{}", key.data().cyan())?;
                write!(writer, "{}", if pretty { ": " } else { ":" })?;
            }
            pending = Some(value);
        } else {
            if pretty && !frame.first {
                writeln!(writer)?;
                write!(writer, "{:width$}", "", width = frame.indent)?;
            }
            write!(writer, "{}", frame.closing())?;
            open.pop();
        }
    }
}
