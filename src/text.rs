//! Text decoding and conservative mojibake repair.
//!
//! Legacy source files predate consistent UTF-8 handling: some are
//! Windows-1252 on disk, and others were decoded with a lossy strategy at
//! some point in their history, leaving U+FFFD replacement characters where
//! apostrophes belong. Decoding here is strict in both encodings; a lossy
//! decode would bake new replacement characters into the output.

use std::fs;
use std::path::Path;

use encoding_rs::WINDOWS_1252;
use serde_json::Value;

use crate::error::SitesmithError;

/// The Unicode replacement character. Should never appear in output.
pub const REPLACEMENT_CHAR: char = '\u{FFFD}';

/// Decode raw bytes as strict UTF-8, falling back to Windows-1252.
///
/// Neither attempt substitutes replacement characters; `None` means the
/// bytes are not valid in either encoding.
#[must_use]
pub fn decode_text(bytes: &[u8]) -> Option<String> {
    if let Ok(s) = std::str::from_utf8(bytes) {
        return Some(s.to_owned());
    }
    WINDOWS_1252
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(std::borrow::Cow::into_owned)
}

/// Read a legacy source file without introducing U+FFFD.
///
/// # Errors
///
/// Returns [`SitesmithError::Io`] if the file cannot be read and
/// [`SitesmithError::Decode`] if both decode attempts fail.
pub fn read_legacy_text(path: &Path) -> Result<String, SitesmithError> {
    let bytes = fs::read(path)?;
    decode_text(&bytes).ok_or_else(|| SitesmithError::Decode {
        path: path.to_path_buf(),
    })
}

/// Repair one narrow mojibake pattern: a U+FFFD strictly between two word
/// characters is almost certainly a lost right apostrophe (`Benjamin�s`).
///
/// Replacement characters in any other position (next to punctuation,
/// whitespace, or at string boundaries) are likely quotation marks and are
/// left untouched; pairing those back up is the fix-up pass's job, not this
/// one's.
#[must_use]
pub fn repair_mojibake(s: &str) -> String {
    if !s.contains(REPLACEMENT_CHAR) {
        return s.to_owned();
    }

    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    for (i, &c) in chars.iter().enumerate() {
        let between_words = c == REPLACEMENT_CHAR
            && i > 0
            && is_word_char(chars[i - 1])
            && chars.get(i + 1).is_some_and(|&next| is_word_char(next));
        if between_words {
            out.push('\u{2019}');
        } else {
            out.push(c);
        }
    }
    out
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Apply [`repair_mojibake`] recursively through a JSON value.
///
/// Strings are repaired in place; arrays and objects are walked; other
/// scalars pass through unchanged.
#[must_use]
pub fn normalize_value(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(repair_mojibake(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_value).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, normalize_value(v)))
                .collect(),
        ),
        other => other,
    }
}
