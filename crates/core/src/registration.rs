//! Registration (license plate) normalization.
//!
//! Scans free-text user input for the first plate-like substring and
//! canonicalizes it. The shape is configurable so the plate format is not
//! hard-wired into the scanning code; the default matches Finnish plates
//! (three letters, three digits, optional separator).

use regex::Regex;
use serde::{Deserialize, Serialize};

/// The expected shape of a registration plate: a run of letters followed by
/// a run of digits, with an optional `-` or space between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlateShape {
    pub letters: usize,
    pub digits: usize,
}

impl Default for PlateShape {
    fn default() -> Self {
        Self {
            letters: 3,
            digits: 3,
        }
    }
}

impl PlateShape {
    /// Build the scanning regex for this shape. Case-insensitive, matches
    /// anywhere in the input; the first match wins.
    fn pattern(&self) -> Regex {
        // Shape fields are small fixed counts, the pattern always compiles.
        Regex::new(&format!(
            r"(?i)([A-ZÄÖÅ]{{{l}}})[-\s]?(\d{{{d}}})",
            l = self.letters,
            d = self.digits
        ))
        .unwrap_or_else(|e| unreachable!("invalid plate pattern: {e}"))
    }

    /// Scan `text` for the first substring matching this plate shape.
    ///
    /// Returns `None` when no plate-like token is present — the caller must
    /// re-prompt the user instead of attempting a lookup.
    pub fn find_in(&self, text: &str) -> Option<RegistrationToken> {
        let caps = self.pattern().captures(text)?;
        let letters = caps.get(1)?.as_str().to_uppercase();
        let digits = caps.get(2)?.as_str().to_string();
        Some(RegistrationToken {
            letters,
            digits,
            canonical: *self,
        })
    }
}

/// A normalized registration token: separators stripped, uppercased.
///
/// Immutable once produced. `formatted()` reinserts a single separator for
/// the lookup site's form, which expects the `ABC-123` spelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationToken {
    letters: String,
    digits: String,
    canonical: PlateShape,
}

impl RegistrationToken {
    /// The bare normalized token, e.g. `ABC123`.
    pub fn normalized(&self) -> String {
        format!("{}{}", self.letters, self.digits)
    }

    /// The token with a single separator reinserted when it factors into
    /// the canonical shape, e.g. `ABC-123`. Tokens of a non-canonical shape
    /// are passed through bare.
    pub fn formatted(&self) -> String {
        if self.letters.len() == self.canonical.letters
            && self.digits.len() == self.canonical.digits
        {
            format!("{}-{}", self.letters, self.digits)
        } else {
            self.normalized()
        }
    }
}

impl std::fmt::Display for RegistrationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.formatted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape() -> PlateShape {
        PlateShape::default()
    }

    #[test]
    fn finds_plate_with_dash() {
        let token = shape().find_in("ABC-123 mitä vikaa").unwrap();
        assert_eq!(token.normalized(), "ABC123");
        assert_eq!(token.formatted(), "ABC-123");
    }

    #[test]
    fn finds_plate_with_space() {
        let token = shape().find_in("autoni abc 123 tärisee").unwrap();
        assert_eq!(token.normalized(), "ABC123");
    }

    #[test]
    fn finds_plate_without_separator() {
        let token = shape().find_in("xyz789").unwrap();
        assert_eq!(token.formatted(), "XYZ-789");
    }

    #[test]
    fn first_match_wins() {
        let token = shape().find_in("ABC-123 tai DEF-456").unwrap();
        assert_eq!(token.normalized(), "ABC123");
    }

    #[test]
    fn no_plate_yields_none() {
        assert!(shape().find_in("moi, autossa on vikaa").is_none());
        assert!(shape().find_in("").is_none());
        assert!(shape().find_in("AB-12").is_none());
    }

    #[test]
    fn lowercase_is_uppercased() {
        let token = shape().find_in("abc-123").unwrap();
        assert_eq!(token.formatted(), "ABC-123");
    }

    #[test]
    fn custom_shape() {
        let shape = PlateShape {
            letters: 2,
            digits: 4,
        };
        let token = shape.find_in("plate CD-5678 here").unwrap();
        assert_eq!(token.normalized(), "CD5678");
        assert_eq!(token.formatted(), "CD-5678");
    }
}
