//! # Parse Options
//!
//! Flags selecting which token values get parsed right after tokenizing,
//! plus the nesting limit enforced by the tokenizer.
use std::ops::{BitOr, BitOrAssign};

/// Default limit of nested objects and arrays.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// A set of parse flags together with a nesting limit.
///
/// Flags are combined with `|`. Each flag is equivalent to calling the
/// matching [`Document`](crate::Document) bulk operation on the root token
/// right after tokenizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    flags: u8,
    max_depth: usize,
}

impl Options {
    /// Parse all `null`, `true` and `false` literals.
    pub const PARSE_LITERALS: Self = Self::from_flags(1 << 0);
    /// Parse all numbers as 64-bit floats. Takes precedence over
    /// [`Self::PARSE_FLOATS`].
    pub const PARSE_DOUBLES: Self = Self::from_flags(1 << 1);
    /// Parse all numbers as 32-bit floats.
    pub const PARSE_FLOATS: Self = Self::from_flags(1 << 2);
    /// Parse object keys, which is needed for key lookup and object
    /// iteration.
    pub const PARSE_STRING_KEYS: Self = Self::from_flags(1 << 3);
    /// Parse all strings. Implies [`Self::PARSE_STRING_KEYS`].
    pub const PARSE_STRINGS: Self =
        Self::from_flags((1 << 4) | Self::PARSE_STRING_KEYS.flags);

    const fn from_flags(flags: u8) -> Self {
        Self {
            flags,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// No flags, with the default nesting limit.
    #[must_use]
    pub const fn empty() -> Self {
        Self::from_flags(0)
    }

    /// Whether all flags of `other` are set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.flags & other.flags == other.flags
    }

    /// Sets the maximum nesting depth of objects and arrays.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Maximum nesting depth of objects and arrays.
    #[must_use]
    pub const fn max_depth(self) -> usize {
        self.max_depth
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::empty()
    }
}

/// Unions the flags. A non-default nesting limit on either side is kept,
/// preferring the left one.
impl BitOr for Options {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            flags: self.flags | rhs.flags,
            max_depth: if self.max_depth == DEFAULT_MAX_DEPTH {
                rhs.max_depth
            } else {
                self.max_depth
            },
        }
    }
}

impl BitOrAssign for Options {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_imply_keys() {
        assert!(Options::PARSE_STRINGS.contains(Options::PARSE_STRING_KEYS));
        assert!(!Options::PARSE_STRING_KEYS.contains(Options::PARSE_STRINGS));
    }

    #[test]
    fn union_of_flags() {
        let options = Options::PARSE_LITERALS | Options::PARSE_DOUBLES;
        assert!(options.contains(Options::PARSE_LITERALS));
        assert!(options.contains(Options::PARSE_DOUBLES));
        assert!(!options.contains(Options::PARSE_FLOATS));
        assert!(Options::empty().contains(Options::empty()));
    }

    #[test]
    fn max_depth_survives_union() {
        let options =
            Options::PARSE_LITERALS | Options::PARSE_STRINGS.with_max_depth(8);
        assert_eq!(options.max_depth(), 8);

        let mut options = Options::PARSE_LITERALS.with_max_depth(4);
        options |= Options::PARSE_DOUBLES;
        assert_eq!(options.max_depth(), 4);
        assert_eq!(Options::default().max_depth(), DEFAULT_MAX_DEPTH);
    }
}
