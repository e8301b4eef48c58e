//! Embedded-markup to HTML conversion.
//!
//! Legacy analysis blocks are written in a JSX-like dialect: `className=`
//! attributes, `style={{ … }}` objects, `{/* … */}` comments, and a handful
//! of structural quirks. This module rewrites one extracted fragment into an
//! HTML fragment suitable for injection into a page, without attempting to
//! be a general JSX parser; only the patterns the legacy corpus actually
//! uses are supported.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::text;

static CLASSNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bclassName=").expect("valid regex"));

static STYLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"style=\{\{([^}]*)\}\}").expect("valid regex"));

static REQUIRE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"src=\{require\(['"]([^'"]*)['"]\)\}"#).expect("valid regex"));

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{/\*.*?\*/\}").expect("valid regex"));

static BR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<br\s*/>").expect("valid regex"));

static KEBAB_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("valid regex"));

static STYLE_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

// Legacy sources spell the left-margin pseudo-attribute several ways
// (marginLeft, marginleft, margin-left, margin_left) and use both
// `key: value` and `key="value"` forms inside a tag.
static MARGIN_QUOTED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<([a-z][a-z0-9]*)([^>]*?)\s*margin[-_]?left\s*[:=]\s*["']([^"'>]*)["']([^>]*)>"#)
        .expect("valid regex")
});

static MARGIN_BARE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<([a-z][a-z0-9]*)([^>]*?)\s*margin[-_]?left\s*[:=]\s*([^"'\s>]+)([^>]*)>"#)
        .expect("valid regex")
});

static KEY_INSIGHTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(?:b|strong)\b[^>]*>\s*key\s+insights\s*</(?:b|strong)>\s*(?:<br\s*/?>\s*){1,4}")
        .expect("valid regex")
});

static OUTER_P_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)^<p(?:\s[^>]*)?>(.*)</p>$").expect("valid regex"));

static P_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?p\b").expect("valid regex"));

static HAS_P_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<p[\s>]").expect("valid regex"));

static OUTER_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^<([a-z][a-z0-9]*)((?:\s[^>]*)?)>(.*)</([a-z][a-z0-9]*)>$")
        .expect("valid regex")
});

static EMPTY_P_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<p(?:\s[^>]*)?>\s*</p>").expect("valid regex"));

static DOUBLE_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</p>\s*</p>").expect("valid regex"));

static DOUBLE_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<p>\s*<p>").expect("valid regex"));

static ORPHAN_CLOSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(<[a-z][a-z0-9]*(?:\s[^>]*)?>)\s*</p>").expect("valid regex")
});

/// Convert a camelCase style key to its CSS kebab-case form.
#[must_use]
pub fn kebab_case(name: &str) -> String {
    KEBAB_RE.replace_all(name, "$1-$2").to_lowercase()
}

/// Convert the body of a `style={{ … }}` object into inline CSS.
///
/// Splits on commas outside quotes; each `key: value` pair has its key
/// kebab-cased and its value unwrapped of surrounding quotes. Tokens that do
/// not look like a pair are dropped.
#[must_use]
pub fn convert_style_object(style_obj: &str) -> String {
    let mut parts = Vec::new();
    for token in split_outside_quotes(style_obj.trim(), ',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let Some((key, raw_val)) = token.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if !STYLE_KEY_RE.is_match(key) {
            continue;
        }
        let mut val = raw_val.trim();
        if val.len() >= 2
            && ((val.starts_with('\'') && val.ends_with('\''))
                || (val.starts_with('"') && val.ends_with('"')))
        {
            val = &val[1..val.len() - 1];
        }
        parts.push(format!("{}: {};", kebab_case(key), val));
    }
    parts.join(" ")
}

/// Convert one embedded-markup fragment into an HTML fragment.
///
/// Applies the textual conversion passes in order, then the structural
/// repair passes. Repairs are idempotent: converting an already-converted
/// fragment is a no-op.
#[must_use]
pub fn convert_fragment(fragment: &str) -> String {
    let mut out = text::repair_mojibake(fragment);

    out = CLASSNAME_RE.replace_all(&out, "class=").into_owned();
    out = STYLE_RE
        .replace_all(&out, |caps: &Captures<'_>| {
            format!("style=\"{}\"", convert_style_object(&caps[1]))
        })
        .into_owned();
    out = REQUIRE_RE.replace_all(&out, "src=\"$1\"").into_owned();
    out = COMMENT_RE.replace_all(&out, "").into_owned();
    out = out.replace("{' '}", " ");
    out = BR_RE.replace_all(&out, "<br>").into_owned();
    out = out.trim().to_owned();

    out = fix_margin_attrs(&out);
    out = replace_key_insights(&out);
    out = unwrap_nested_paragraph(&out);
    out = ensure_paragraph(&out);
    out = cleanup_paragraphs(&out);

    out.trim().to_owned()
}

/// Split on `sep` at positions not enclosed in single or double quotes.
fn split_outside_quotes(s: &str, sep: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_single = false;
    let mut in_double = false;
    for c in s.chars() {
        match c {
            '\'' if !in_double => {
                in_single = !in_single;
                current.push(c);
            }
            '"' if !in_single => {
                in_double = !in_double;
                current.push(c);
            }
            c if c == sep && !in_single && !in_double => {
                parts.push(std::mem::take(&mut current));
            }
            c => current.push(c),
        }
    }
    parts.push(current);
    parts
}

/// Rewrite a tag carrying a legacy left-margin pseudo-attribute to carry a
/// proper `style="margin-left: <value>;"` attribute instead.
fn fix_margin_attrs(fragment: &str) -> String {
    let repl = |caps: &Captures<'_>| {
        // An odd number of quotes before the pseudo-attribute means we are
        // inside a quoted attribute value (e.g. a real style="margin-left:…"),
        // not looking at a bare pseudo-attribute.
        let pre_raw = &caps[2];
        if pre_raw.matches('"').count() % 2 == 1 || pre_raw.matches('\'').count() % 2 == 1 {
            return caps[0].to_owned();
        }
        let tag = &caps[1];
        let pre = caps[2].trim_end();
        let val = caps[3].trim().trim_end_matches(';');
        let post = caps[4].trim();
        let mut attrs = pre.to_owned();
        if !post.is_empty() {
            attrs.push(' ');
            attrs.push_str(post);
        }
        format!("<{tag}{attrs} style=\"margin-left: {val};\">")
    };
    let out = MARGIN_QUOTED_RE.replace_all(fragment, repl);
    MARGIN_BARE_RE.replace_all(&out, repl).into_owned()
}

/// Replace a bold "Key Insights" marker plus trailing line breaks with a
/// paragraph boundary and a "Suggested application" heading.
fn replace_key_insights(fragment: &str) -> String {
    KEY_INSIGHTS_RE
        .replace_all(fragment, "</p>\n<h3>Suggested application</h3>\n<p>")
        .into_owned()
}

/// Unwrap an outer `<p>` that illegally contains nested paragraph tags.
///
/// Only fires when the inner content genuinely opens its own paragraphs; a
/// plain `<p>text</p>` fragment is left untouched. Content whose first
/// paragraph token is a close tag is not nested but adjacent (`<p>A</p>
/// <p>B</p>`), so that is left untouched too.
fn unwrap_nested_paragraph(fragment: &str) -> String {
    let trimmed = fragment.trim();
    if let Some(caps) = OUTER_P_RE.captures(trimmed) {
        let inner = &caps[1];
        if has_nested_paragraph(inner) {
            return inner.trim().to_owned();
        }
    }
    fragment.to_owned()
}

fn has_nested_paragraph(inner: &str) -> bool {
    let mut depth: i32 = 0;
    let mut opened = false;
    for m in P_TAG_RE.find_iter(inner) {
        if m.as_str().starts_with("</") {
            depth -= 1;
            if depth < 0 {
                return false;
            }
        } else {
            depth += 1;
            opened = true;
        }
    }
    opened && depth >= 0
}

/// Wrap the fragment's inner content in a synthetic paragraph pair when no
/// paragraph tag exists at all, so the fragment stays valid when injected.
fn ensure_paragraph(fragment: &str) -> String {
    if HAS_P_RE.is_match(fragment) {
        return fragment.to_owned();
    }
    let trimmed = fragment.trim();
    if let Some(caps) = OUTER_TAG_RE.captures(trimmed) {
        let (open_name, close_name) = (&caps[1], &caps[4]);
        if open_name.eq_ignore_ascii_case(close_name) {
            return format!(
                "<{}{}><p>{}</p></{}>",
                &caps[1],
                &caps[2],
                caps[3].trim(),
                &caps[4]
            );
        }
    }
    format!("<p>{trimmed}</p>")
}

/// Collapse empty paragraph pairs, doubled boundaries, and an orphaned
/// close tag right after the fragment's outer open tag.
fn cleanup_paragraphs(fragment: &str) -> String {
    let mut out = fragment.to_owned();
    loop {
        let mut next = EMPTY_P_RE.replace_all(&out, "").into_owned();
        next = DOUBLE_CLOSE_RE.replace_all(&next, "</p>").into_owned();
        next = DOUBLE_OPEN_RE.replace_all(&next, "<p>").into_owned();
        next = ORPHAN_CLOSE_RE.replace(&next, "$1").into_owned();
        if next == out {
            return out;
        }
        out = next;
    }
}
