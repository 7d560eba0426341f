//! Filename sanitization.
//!
//! Turns human-authored text (a headline, a product name, a merged record
//! field) into a fragment that is safe to use inside a filename on every
//! common filesystem.
//!
//! ```
//! use stylesplit::sanitize;
//!
//! assert_eq!(sanitize(Some("50% off — today!")).as_str(), "50pct-off-today");
//! assert_eq!(sanitize(None).as_str(), "unnamed");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// A sanitized filename fragment.
///
/// Always non-empty, at most [`FilenameFragment::MAX_LEN`] characters, made
/// of ASCII letters, digits and single hyphens, never starting or ending
/// with a hyphen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilenameFragment(String);

impl FilenameFragment {
    /// Returned for empty input or input with nothing usable in it.
    pub const FALLBACK: &'static str = "unnamed";

    /// Longest fragment produced. Leaves room for prefix, suffix and
    /// extension within the usual 255-byte filename limit.
    pub const MAX_LEN: usize = 200;

    fn fallback() -> Self {
        Self(Self::FALLBACK.to_string())
    }

    /// Borrow the fragment as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the fragment, returning the inner string.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Length in characters (the fragment is ASCII, so also in bytes).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether sanitization fell back to [`FilenameFragment::FALLBACK`].
    pub fn is_fallback(&self) -> bool {
        self.0 == Self::FALLBACK
    }
}

impl fmt::Display for FilenameFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FilenameFragment {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<FilenameFragment> for String {
    fn from(fragment: FilenameFragment) -> Self {
        fragment.0
    }
}

/// What happens to a single input character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Substitution {
    Keep(char),
    Word(&'static str),
    Hyphen,
    Drop,
}

/// Map one character through the substitution stages.
///
/// Typographic replacements come first so that `%` reads as `pct` rather
/// than collapsing into a separator. Every arm emits only ASCII
/// alphanumerics or a hyphen, so later stages never see a character an
/// earlier arm produced.
fn substitute(c: char) -> Substitution {
    use Substitution::*;

    match c {
        'A'..='Z' | 'a'..='z' | '0'..='9' => Keep(c),

        // em and en dash
        '\u{2014}' | '\u{2013}' => Hyphen,
        // curly double and single quotes
        '\u{201C}' | '\u{201D}' | '\u{2018}' | '\u{2019}' => Drop,
        '\u{00A9}' | '\u{00AE}' | '\u{2122}' => Drop,
        '\u{00B0}' => Word("deg"),
        '&' => Word("and"),
        '@' => Word("at"),
        '$' => Drop,
        '%' => Word("pct"),
        '#' => Word("num"),
        '+' => Word("plus"),
        '=' => Word("eq"),

        // illegal on Windows or Unix filesystems
        '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => Hyphen,

        '\u{0000}'..='\u{001F}' | '\u{007F}' => Drop,

        _ => Hyphen,
    }
}

/// Sanitize text into a filename fragment.
///
/// Total: every input, including `None`, maps to a valid fragment. Hyphen
/// runs collapse to one, leading and trailing hyphens are trimmed, and
/// results longer than [`FilenameFragment::MAX_LEN`] are cut back to the
/// last hyphen inside the limit so no word is left half-written.
pub fn sanitize(text: Option<&str>) -> FilenameFragment {
    let text = match text {
        Some(t) if !t.is_empty() => t,
        _ => return FilenameFragment::fallback(),
    };

    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match substitute(c) {
            Substitution::Keep(c) => out.push(c),
            Substitution::Word(word) => out.push_str(word),
            // Skipping a hyphen at the start or after another one collapses
            // runs and trims the leading edge in the same pass.
            Substitution::Hyphen => {
                if !out.is_empty() && !out.ends_with('-') {
                    out.push('-');
                }
            }
            Substitution::Drop => {}
        }
    }

    while out.ends_with('-') {
        out.pop();
    }

    if out.is_empty() {
        return FilenameFragment::fallback();
    }

    if out.len() > FilenameFragment::MAX_LEN {
        out.truncate(FilenameFragment::MAX_LEN);
        if let Some(pos) = out.rfind('-') {
            out.truncate(pos);
        }
    }

    FilenameFragment(out)
}
