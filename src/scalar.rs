//! # Scalar Conversions
//!
//! Validation and conversion of a single token's text into a typed value.
//! Errors are plain messages; the caller attaches the token location.
use std::borrow::Cow;

use memchr::memchr;

/// Largest magnitude accepted for unsigned 64-bit values, keeping them
/// exactly representable as a double.
const MAX_U64_MAGNITUDE: u64 = 1 << 52;

/// Largest magnitude accepted for signed 64-bit values.
const MAX_I64_MAGNITUDE: u64 = 1 << 53;

/// Checks a `null` literal.
pub(crate) fn parse_null(text: &str) -> Result<(), String> {
    if text == "null" {
        Ok(())
    } else {
        Err(format!("invalid null literal {text}"))
    }
}

/// Checks and converts a `true` or `false` literal.
pub(crate) fn parse_bool(text: &str) -> Result<bool, String> {
    match text {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(format!("invalid bool literal {text}")),
    }
}

/// Shape of a number literal matching the JSON grammar
/// `-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?`.
struct NumberShape<'a> {
    negative: bool,
    /// Digits of the integer part
    integer: &'a str,
    /// Whether a fractional part or an exponent is present
    fractional: bool,
}

impl<'a> NumberShape<'a> {
    fn scan(text: &'a str) -> Option<Self> {
        let bytes = text.as_bytes();
        let digits_from = |mut position: usize| {
            while bytes.get(position).is_some_and(u8::is_ascii_digit) {
                position += 1;
            }
            position
        };

        let negative = bytes.first() == Some(&b'-');
        let integer_start = usize::from(negative);
        let integer_end = match bytes.get(integer_start) {
            Some(b'0') => integer_start + 1,
            Some(b'1'..=b'9') => digits_from(integer_start + 1),
            _ => return None,
        };

        let mut position = integer_end;
        if bytes.get(position) == Some(&b'.') {
            let end = digits_from(position + 1);
            if end == position + 1 {
                return None;
            }
            position = end;
        }
        if matches!(bytes.get(position), Some(b'e' | b'E')) {
            position += 1;
            if matches!(bytes.get(position), Some(b'+' | b'-')) {
                position += 1;
            }
            let end = digits_from(position);
            if end == position {
                return None;
            }
            position = end;
        }

        (position == bytes.len()).then(|| Self {
            negative,
            integer: &text[integer_start..integer_end],
            fractional: integer_end != bytes.len(),
        })
    }
}

/// Converts a number literal to a 64-bit float.
pub(crate) fn parse_double(text: &str) -> Result<f64, String> {
    NumberShape::scan(text)
        .and_then(|_| text.parse::<f64>().ok())
        .ok_or_else(|| format!("invalid floating-point literal {text}"))
        .and_then(|value| {
            if value.is_finite() {
                Ok(value)
            } else {
                Err(format!("floating-point literal {text} out of range"))
            }
        })
}

/// Converts a number literal to a 32-bit float, rounding from the full
/// decimal text.
pub(crate) fn parse_float(text: &str) -> Result<f32, String> {
    NumberShape::scan(text)
        .and_then(|_| text.parse::<f32>().ok())
        .ok_or_else(|| format!("invalid floating-point literal {text}"))
        .and_then(|value| {
            if value.is_finite() {
                Ok(value)
            } else {
                Err(format!("floating-point literal {text} out of range"))
            }
        })
}

/// Validates an integer literal and returns its sign and magnitude. A
/// fractional part or exponent is rejected even when the value is integral.
fn parse_integer(
    text: &str,
    what: &str,
    max_magnitude: u64,
) -> Result<(bool, u64), String> {
    let shape = NumberShape::scan(text)
        .filter(|shape| !shape.fractional)
        .ok_or_else(|| format!("invalid {what} literal {text}"))?;

    shape
        .integer
        .bytes()
        .try_fold(0u64, |value, digit| {
            value.checked_mul(10)?.checked_add(u64::from(digit - b'0'))
        })
        .filter(|&magnitude| magnitude <= max_magnitude)
        .map(|magnitude| (shape.negative, magnitude))
        .ok_or_else(|| format!("{what} literal {text} out of range"))
}

/// Validates an unsigned integer literal, rejecting any leading minus.
fn parse_unsigned(
    text: &str,
    what: &str,
    max_magnitude: u64,
) -> Result<u64, String> {
    if text.starts_with('-') {
        return Err(format!("invalid {what} literal {text}"));
    }
    parse_integer(text, what, max_magnitude).map(|(_, magnitude)| magnitude)
}

/// Validates a signed integer literal allowing `-max_negative..=max_positive`.
fn parse_signed(
    text: &str,
    what: &str,
    max_positive: u64,
    max_negative: u64,
) -> Result<i64, String> {
    let (negative, magnitude) =
        parse_integer(text, what, max_positive.max(max_negative))?;
    let limit = if negative { max_negative } else { max_positive };
    if magnitude > limit {
        return Err(format!("{what} literal {text} out of range"));
    }
    // magnitude is at most 2^53 here, well within i64
    let value = i64::try_from(magnitude)
        .map_err(|_| format!("{what} literal {text} out of range"))?;
    Ok(if negative { -value } else { value })
}

/// Converts a number literal to an unsigned 32-bit integer.
pub(crate) fn parse_u32(text: &str) -> Result<u32, String> {
    let what = "unsigned integer";
    parse_unsigned(text, what, u64::from(u32::MAX))
        .and_then(|value| u32::try_from(value).map_err(|e| e.to_string()))
}

/// Converts a number literal to a signed 32-bit integer.
pub(crate) fn parse_i32(text: &str) -> Result<i32, String> {
    let what = "integer";
    parse_signed(
        text,
        what,
        u64::from(i32::MAX.unsigned_abs()),
        u64::from(i32::MIN.unsigned_abs()),
    )
    .and_then(|value| i32::try_from(value).map_err(|e| e.to_string()))
}

/// Converts a number literal to an unsigned integer of at most 52 bits.
pub(crate) fn parse_u64(text: &str) -> Result<u64, String> {
    parse_unsigned(text, "unsigned long integer", MAX_U64_MAGNITUDE)
}

/// Converts a number literal to a signed integer of at most 53 bits.
pub(crate) fn parse_i64(text: &str) -> Result<i64, String> {
    parse_signed(text, "long integer", MAX_I64_MAGNITUDE, MAX_I64_MAGNITUDE)
}

/// Converts a number literal to a size, using the 64-bit rules on 64-bit
/// targets and the 32-bit rules elsewhere.
pub(crate) fn parse_size(text: &str) -> Result<usize, String> {
    #[cfg(target_pointer_width = "64")]
    let value = parse_u64(text)?;
    #[cfg(not(target_pointer_width = "64"))]
    let value = parse_u32(text)?;
    usize::try_from(value).map_err(|e| e.to_string())
}

/// Strips the surrounding quotes from a raw string token.
pub(crate) fn string_contents(raw: &str) -> &str {
    raw.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(raw)
}

/// Decodes escape sequences in string contents (without the quotes). The
/// input is returned as-is when it contains no backslash.
pub(crate) fn unescape(contents: &str) -> Result<Cow<'_, str>, String> {
    if memchr(b'\\', contents.as_bytes()).is_none() {
        return Ok(Cow::Borrowed(contents));
    }

    let mut decoded = String::with_capacity(contents.len());
    let mut rest = contents;
    while let Some(backslash) = memchr(b'\\', rest.as_bytes()) {
        decoded.push_str(&rest[..backslash]);
        let escape = &rest[backslash..];
        let (c, consumed) = match escape.as_bytes().get(1) {
            Some(b'"') => ('"', 2),
            Some(b'\\') => ('\\', 2),
            Some(b'/') => ('/', 2),
            Some(b'b') => ('\u{8}', 2),
            Some(b'f') => ('\u{c}', 2),
            Some(b'n') => ('\n', 2),
            Some(b'r') => ('\r', 2),
            Some(b't') => ('\t', 2),
            Some(b'u') => unicode_escape(escape)?,
            Some(_) => {
                let shown: String = escape.chars().take(2).collect();
                return Err(format!("invalid escape sequence {shown}"));
            }
            None => return Err("truncated escape sequence".to_string()),
        };
        decoded.push(c);
        rest = &escape[consumed..];
    }
    decoded.push_str(rest);

    Ok(Cow::Owned(decoded))
}

/// Reads the four hex digits of a `\uXXXX` escape at the start of `escape`.
fn hex4(escape: &str) -> Option<u16> {
    let digits = escape.get(2..6)?;
    if !digits.bytes().all(|byte| byte.is_ascii_hexdigit()) {
        return None;
    }
    u16::from_str_radix(digits, 16).ok()
}

/// Decodes a `\uXXXX` escape, combining a UTF-16 surrogate pair into one
/// character. Returns the character and the number of bytes consumed.
fn unicode_escape(escape: &str) -> Result<(char, usize), String> {
    let shown = || escape.chars().take(12).collect::<String>();
    let invalid = || format!("invalid unicode escape sequence {}", shown());

    let high = hex4(escape).ok_or_else(invalid)?;
    match high {
        0xd800..=0xdbff => {
            let low = escape
                .get(6..)
                .filter(|next| next.starts_with("\\u"))
                .and_then(hex4)
                .filter(|low| (0xdc00..=0xdfff).contains(low))
                .ok_or_else(|| {
                    format!("unpaired surrogate in {}", shown())
                })?;
            let code = 0x10000
                + ((u32::from(high) - 0xd800) << 10)
                + (u32::from(low) - 0xdc00);
            char::from_u32(code)
                .map(|c| (c, 12))
                .ok_or_else(invalid)
        }
        0xdc00..=0xdfff => Err(format!("unpaired surrogate in {}", shown())),
        _ => char::from_u32(u32::from(high))
            .map(|c| (c, 6))
            .ok_or_else(invalid),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals() {
        assert_eq!(parse_null("null"), Ok(()));
        assert!(parse_null("nul").is_err());
        assert!(parse_null("nullx").is_err());
        assert_eq!(parse_bool("true"), Ok(true));
        assert_eq!(parse_bool("false"), Ok(false));
        assert_eq!(
            parse_bool("True"),
            Err("invalid bool literal True".to_string())
        );
    }

    #[test]
    fn number_grammar() {
        for valid in ["0", "-0", "12", "-3.25", "1e5", "1E+5", "2.5e-3"] {
            assert!(parse_double(valid).is_ok(), "{valid}");
        }
        for invalid in
            ["-", "01", "1.", ".5", "1e", "1e+", "--1", "1.2.3", "1-2", "+1"]
        {
            assert!(parse_double(invalid).is_err(), "{invalid}");
        }
    }

    #[test]
    fn doubles_and_floats() {
        assert_eq!(parse_double("-3.25"), Ok(-3.25));
        assert_eq!(parse_double("1e3"), Ok(1000.0));
        assert_eq!(parse_float("0.1"), Ok(0.1f32));
        assert_eq!(parse_float("16777217"), Ok(16_777_216.0f32));
        assert_eq!(
            parse_double("1e400"),
            Err("floating-point literal 1e400 out of range".to_string())
        );
        assert!(parse_float("1e39").is_err());
    }

    #[test]
    fn unsigned_32() {
        assert_eq!(parse_u32("42"), Ok(42));
        assert_eq!(parse_u32("4294967295"), Ok(u32::MAX));
        assert_eq!(
            parse_u32("-1"),
            Err("invalid unsigned integer literal -1".to_string())
        );
        assert_eq!(
            parse_u32("4294967296"),
            Err("unsigned integer literal 4294967296 out of range".to_string())
        );
        assert_eq!(
            parse_u32("42.0"),
            Err("invalid unsigned integer literal 42.0".to_string())
        );
        assert!(parse_u32("1e2").is_err());
        assert!(parse_u32("-0").is_err());
        assert!(parse_u32("99999999999999999999999").is_err());
    }

    #[test]
    fn signed_32() {
        assert_eq!(parse_i32("-2147483648"), Ok(i32::MIN));
        assert_eq!(parse_i32("2147483647"), Ok(i32::MAX));
        assert_eq!(parse_i32("-0"), Ok(0));
        assert!(parse_i32("2147483648").is_err());
        assert!(parse_i32("-2147483649").is_err());
        assert!(parse_i32("-7.5").is_err());
    }

    #[test]
    fn wide_integers() {
        assert_eq!(parse_u64("4503599627370496"), Ok(1 << 52));
        assert!(parse_u64("4503599627370497").is_err());
        assert!(parse_u64("-1").is_err());
        assert_eq!(parse_i64("-9007199254740992"), Ok(-(1 << 53)));
        assert_eq!(parse_i64("9007199254740992"), Ok(1 << 53));
        assert!(parse_i64("9007199254740993").is_err());
        assert!(parse_i64("-9007199254740993").is_err());
        assert_eq!(parse_size("17"), Ok(17));
    }

    #[test]
    fn unescape_without_escapes_borrows() {
        let contents = "plain text";
        let Ok(Cow::Borrowed(view)) = unescape(contents) else {
            panic!("expected a borrowed view");
        };
        assert_eq!(view.as_ptr(), contents.as_ptr());
    }

    #[test]
    fn unescape_standard_escapes() {
        assert_eq!(unescape(r"a\nb").unwrap(), "a\nb");
        assert_eq!(unescape(r"a\nb").unwrap().chars().count(), 3);
        assert_eq!(
            unescape(r#"\"\\\/\b\f\n\r\t"#).unwrap(),
            "\"\\/\u{8}\u{c}\n\r\t"
        );
        assert_eq!(unescape(r"\u0041\u00e9\u017e").unwrap(), "Aéž");
    }

    #[test]
    fn unescape_surrogate_pairs() {
        assert_eq!(unescape(r"\ud83d\ude00!").unwrap(), "\u{1F600}!");
        assert_eq!(unescape(r"\uD834\uDD1E").unwrap(), "\u{1D11E}");
        assert!(unescape(r"\ud83d").is_err());
        assert!(unescape(r"\ud83dx").is_err());
        assert!(unescape(r"\ud83d\u0041").is_err());
        assert!(unescape(r"\ude00").is_err());
    }

    #[test]
    fn unescape_errors() {
        assert_eq!(
            unescape(r"a\x").unwrap_err(),
            r"invalid escape sequence \x"
        );
        assert!(unescape(r"\u12").is_err());
        assert!(unescape(r"\u+123").is_err());
        assert!(unescape(r"\uzzzz").is_err());
        assert!(unescape("\\").is_err());
        assert!(unescape("\\ž").is_err());
    }

    #[test]
    fn quotes_are_stripped() {
        assert_eq!(string_contents(r#""abc""#), "abc");
        assert_eq!(string_contents(r#""""#), "");
    }
}
