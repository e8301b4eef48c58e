//! Legacy JSON record loading.
//!
//! Each legacy JSON file describes one page (a bio or a sub-article). Most
//! are shaped `{"speakers": [{…}]}`; some are already a bare object. Field
//! values are sparse and loosely typed, so the record keeps the raw JSON map
//! and exposes normalizing accessors.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::error::SitesmithError;
use crate::text;

static ANALYSIS_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^analysis_(\d+)$").expect("valid regex"));

/// One loaded legacy page record.
#[derive(Debug, Clone)]
pub struct LegacyRecord {
    /// The JSON file this record came from.
    pub path: PathBuf,
    fields: Map<String, Value>,
}

/// An ordered reference from a record into the analysis block mapping.
///
/// Derived from paired `analysis_<n>` / `fact_<n>` keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRef {
    /// Order within the page, taken from the `analysis_<n>` suffix.
    pub order: u64,
    /// Heading text from the paired `fact_<n>` key; empty if absent.
    pub heading: String,
    /// The referenced analysis block id.
    pub analysis_id: String,
}

impl LegacyRecord {
    /// Build a record from an already-parsed JSON value.
    ///
    /// Unwraps the `{"speakers": [{…}]}` envelope when present; a bare
    /// object is accepted as-is.
    ///
    /// # Errors
    ///
    /// Returns [`SitesmithError::RecordShape`] for anything that is not a
    /// JSON object.
    pub fn from_value(path: &Path, value: Value) -> Result<Self, SitesmithError> {
        let fields = match value {
            Value::Object(mut map) => {
                let speaker = match map.get_mut("speakers") {
                    Some(Value::Array(items)) if !items.is_empty() => {
                        match items.first_mut().map(Value::take) {
                            Some(Value::Object(first)) => Some(first),
                            _ => None,
                        }
                    }
                    _ => None,
                };
                speaker.unwrap_or(map)
            }
            other => {
                return Err(SitesmithError::RecordShape {
                    path: path.to_path_buf(),
                    message: format!("expected object, got {}", json_type_name(&other)),
                });
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            fields,
        })
    }

    /// A field's text value: trimmed strings, stringified numbers, empty
    /// for everything else (including null and absent keys).
    #[must_use]
    pub fn text_field(&self, key: &str) -> String {
        match self.fields.get(key) {
            Some(Value::String(s)) => s.trim().to_owned(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> String {
        self.text_field("name")
    }

    /// Slug, from the legacy `link` field.
    #[must_use]
    pub fn link(&self) -> String {
        self.text_field("link")
    }

    /// Free-text description.
    #[must_use]
    pub fn description(&self) -> String {
        self.text_field("description")
    }

    /// Year label (free text in the legacy data, e.g. `"148 B.C."`).
    #[must_use]
    pub fn year(&self) -> String {
        self.text_field("year")
    }

    /// Raw legacy image path.
    #[must_use]
    pub fn img(&self) -> String {
        self.text_field("img")
    }

    /// Word count when present as an integer, else 0.
    #[must_use]
    pub fn word_count(&self) -> i64 {
        self.fields
            .get("word_count")
            .and_then(Value::as_i64)
            .unwrap_or(0)
    }

    /// Collect the record's section references, sorted by order.
    ///
    /// Entries whose `analysis_<n>` value is empty after trimming are
    /// skipped entirely.
    #[must_use]
    pub fn section_refs(&self) -> Vec<SectionRef> {
        let mut refs: Vec<SectionRef> = self
            .fields
            .iter()
            .filter_map(|(key, value)| {
                let caps = ANALYSIS_KEY_RE.captures(key)?;
                let order: u64 = caps[1].parse().ok()?;
                let analysis_id = match value {
                    Value::String(s) => s.trim().to_owned(),
                    _ => String::new(),
                };
                if analysis_id.is_empty() {
                    return None;
                }
                Some(SectionRef {
                    order,
                    heading: self.text_field(&format!("fact_{order}")),
                    analysis_id,
                })
            })
            .collect();
        refs.sort_by_key(|r| r.order);
        refs
    }
}

/// Load a legacy record from disk: decode, parse, repair mojibake.
///
/// # Errors
///
/// Returns an error if the file cannot be read, decoded, parsed as JSON,
/// or is not object-shaped.
pub fn load_legacy_record(path: &Path) -> Result<LegacyRecord, SitesmithError> {
    let raw = text::read_legacy_text(path)?;
    let value: Value = serde_json::from_str(&raw)?;
    LegacyRecord::from_value(path, text::normalize_value(value))
}

const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
