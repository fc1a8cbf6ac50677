//! Input normalization.
//!
//! Matching works on words, not characters. This module turns a raw message
//! into [`InputWord`]s once, up front, so the matcher never re-scans text:
//!
//! - lowercase the whole message
//! - split on whitespace and on the separators `, ; ! ?` (`hello,bot` is two
//!   words; leading/trailing separators yield no empty words)
//! - keep each word's raw form and a *bare* form with every character that is
//!   not a letter or digit removed; drop words whose bare form is empty
//! - classify the bare form once (alphabetic-only, digits-only) for the
//!   `_` and `#` wildcards
//!
//! Literal pattern words compare against either form, so a pattern can still
//! spell out punctuation it cares about (`c++`, `what's`), while `whats`
//! matches `what's` and `_` accepts `o'brien`. Captures use the bare form.

/// One normalized word of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InputWord {
    /// Lowercased word exactly as it appeared between separators.
    pub raw: String,
    /// `raw` with only its letters and digits. Never empty.
    pub bare: String,
    pub alphabetic: bool,
    pub numeric: bool,
}

impl InputWord {
    /// Literal comparison against a (lowercase) pattern word.
    pub(crate) fn is(&self, literal: &str) -> bool {
        self.bare == literal || self.raw == literal
    }
}

/// Normalize `input` into matchable words.
pub(crate) fn normalize(input: &str) -> Vec<InputWord> {
    let lowered = input.to_lowercase();
    regex!(r"[\s,;!?]+")
        .split(&lowered)
        .filter_map(|raw| {
            let bare = regex!(r"[^\p{L}\p{N}]+").replace_all(raw, "");
            if bare.is_empty() {
                return None;
            }
            Some(InputWord {
                alphabetic: regex!(r"^\p{Alphabetic}+$").is_match(&bare),
                numeric: regex!(r"^[0-9]+$").is_match(&bare),
                bare: bare.into_owned(),
                raw: raw.to_string(),
            })
        })
        .collect()
}
