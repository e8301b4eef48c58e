//! Analysis block extraction from legacy source files.
//!
//! Legacy `*-analysis.js` files hold content blocks behind conditional
//! guards of the form `if (id === 'some-id') { return <div>…</div>; }`.
//! This is pattern matching over text, not parsing: the scanner walks guard
//! occurrences in source order and lifts the returned markup span out of
//! each one with a same-tag nesting counter. The legacy format is shallow
//! and uniform enough that this is sufficient.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::markup;

static GUARD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:else\s+)?if\s*\(\s*id\s*===\s*['"]([^'"]+)['"]\s*\)"#).expect("valid regex")
});

static OPEN_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([A-Za-z][A-Za-z0-9]*)").expect("valid regex"));

/// One extracted, converted content block.
#[derive(Debug, Clone)]
pub struct AnalysisBlock {
    /// Unique key for this block, disambiguated on per-file collision.
    pub analysis_id: String,
    /// The converted HTML fragment.
    pub html: String,
    /// The file the block was extracted from.
    pub source_path: PathBuf,
}

/// Scan one legacy source file's text and extract every guarded block.
///
/// Blocks are yielded in source order. A per-file occurrence counter
/// disambiguates repeated guard ids: the first occurrence of `x` keeps the
/// literal id, the second becomes `x2`, the third `x3`, and so on. Guards
/// with no following `return` are skipped.
#[must_use]
pub fn parse_analysis_source(text: &str, source_path: &Path) -> Vec<AnalysisBlock> {
    let mut occurrences: HashMap<String, u32> = HashMap::new();
    let mut blocks = Vec::new();

    for caps in GUARD_RE.captures_iter(text) {
        let base_id = caps.get(1).map_or("", |m| m.as_str());
        let count = occurrences
            .entry(base_id.to_owned())
            .and_modify(|c| *c += 1)
            .or_insert(1);
        let analysis_id = if *count == 1 {
            base_id.to_owned()
        } else {
            format!("{base_id}{count}")
        };

        let guard_end = caps.get(0).map_or(0, |m| m.end());
        let after = &text[guard_end..];
        let Some(ret_pos) = after.find("return") else {
            continue;
        };
        let body = &after[ret_pos + "return".len()..];
        let span = extract_balanced_span(body);

        blocks.push(AnalysisBlock {
            analysis_id,
            html: markup::convert_fragment(span),
            source_path: source_path.to_path_buf(),
        });
    }

    blocks
}

/// Extract the minimal balanced span from the first open tag in `body` up
/// to its matching close tag.
///
/// Counts same-name open/close tags; stops when the counter returns to zero
/// after a close. No open tag at all yields the trimmed remainder of the
/// return expression; a missing close tag yields everything to end of text.
fn extract_balanced_span(body: &str) -> &str {
    let Some(open) = OPEN_TAG_RE.captures(body) else {
        return body.trim();
    };
    let tag_name = open.get(1).map_or("", |m| m.as_str());
    let start = open.get(0).map_or(0, |m| m.start());
    let rel = &body[start..];

    let tag_re = Regex::new(&format!(r"(?i)</?{}\b", regex::escape(tag_name)))
        .expect("escaped tag name is a valid regex");

    let mut depth: i32 = 0;
    for m in tag_re.find_iter(rel) {
        if m.as_str().starts_with("</") {
            depth -= 1;
            if depth == 0 {
                // Include the closing tag's '>' when present.
                let end = rel[m.start()..]
                    .find('>')
                    .map_or(m.end(), |gt| m.start() + gt + 1);
                return rel[..end].trim();
            }
        } else {
            depth += 1;
        }
    }

    rel.trim()
}
