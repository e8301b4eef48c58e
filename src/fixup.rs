//! In-place repair of mojibake left in already-published text files.
//!
//! Two damage patterns show up in the wild: UTF-8 punctuation that was
//! decoded as Windows-1252 (the `â€™` family), and punctuation lost
//! entirely to U+FFFD replacement characters. The first is reversed by a
//! literal substitution table; the second is repaired heuristically from
//! surrounding context.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::SitesmithError;

/// Literal mojibake sequences and their intended characters.
///
/// Order matters: `Â ` (with NBSP) must run before the bare NBSP and bare
/// `Â` entries or it could never match.
const LITERAL_FIXES: &[(&str, &str, &str)] = &[
    ("\u{e2}\u{20ac}\u{2122}", "\u{2019}", "right single quote"),
    ("\u{e2}\u{20ac}\u{2dc}", "\u{2018}", "left single quote"),
    ("\u{e2}\u{20ac}\u{153}", "\u{201c}", "left double quote"),
    // The right double quote's third byte (0x9D) survives either as the
    // C1 control or as U+FFFD, depending on how the file was decoded.
    ("\u{e2}\u{20ac}\u{FFFD}", "\u{201d}", "right double quote"),
    ("\u{e2}\u{20ac}\u{9d}", "\u{201d}", "right double quote"),
    ("\u{e2}\u{20ac}\u{201c}", "\u{2013}", "en dash"),
    ("\u{e2}\u{20ac}\u{201d}", "\u{2014}", "em dash"),
    ("\u{e2}\u{20ac}\u{a6}", "\u{2026}", "ellipsis"),
    ("\u{c2}\u{a0}", " ", "non-breaking space (prefixed)"),
    ("\u{a0}", " ", "non-breaking space"),
    ("\u{c2}", "", "stray prefix byte"),
];

/// U+FFFD between two letters is a lost apostrophe (don<?>t, Alma<?>s).
static WORD_APOSTROPHE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z])\u{FFFD}([A-Za-z])").expect("valid regex")
});

/// U+FFFD after a trailing `s`, before punctuation or end, is a lost
/// possessive apostrophe (the peoples<?>).
static TRAILING_S_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("([sS])\u{FFFD}($|[\\s.,;:!?()\\[\\]{}'\"])").expect("valid regex")
});

/// A short span bracketed by two U+FFFD on one line is a lost quote pair.
static QUOTE_PAIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("\u{FFFD}([^\u{FFFD}\n]{1,80})\u{FFFD}").expect("valid regex")
});

/// File extensions eligible for repair.
const TEXT_EXTENSIONS: &[&str] = &["html", "htm", "json", "js", "css", "md", "txt"];

/// Settings for one fixup run.
#[derive(Debug, Clone)]
pub struct FixOptions {
    /// Root of the published tree to repair.
    pub root: std::path::PathBuf,
    /// Report what would change without writing anything.
    pub check: bool,
}

/// Counters for a fixup run.
#[derive(Debug, Default)]
pub struct FixReport {
    /// Eligible files examined.
    pub files_scanned: usize,
    /// Files whose content changed (or would change, under `--check`).
    pub files_changed: usize,
    /// Replacement counts keyed by rule label, in sorted order.
    pub replacements: BTreeMap<String, usize>,
}

fn bump(counts: &mut BTreeMap<String, usize>, label: &str, by: usize) {
    if by > 0 {
        *counts.entry(label.to_owned()).or_insert(0) += by;
    }
}

/// Repeatedly apply a regex substitution until the text stops changing.
///
/// Adjacent damage overlaps its own context (`don<?>t<?>s` shares the `t`),
/// so a single `replace_all` pass is not enough.
fn replace_until_stable(
    re: &Regex,
    replacement: &str,
    label: &str,
    mut text: String,
    counts: &mut BTreeMap<String, usize>,
) -> String {
    loop {
        let hits = re.find_iter(&text).count();
        if hits == 0 {
            return text;
        }
        bump(counts, label, hits);
        text = re.replace_all(&text, replacement).into_owned();
    }
}

/// Apply every repair rule to one text, tallying replacements per rule.
#[must_use]
pub fn fix_text(input: &str, counts: &mut BTreeMap<String, usize>) -> String {
    let mut text = input.to_owned();

    for (pattern, replacement, label) in LITERAL_FIXES {
        let hits = text.matches(pattern).count();
        if hits > 0 {
            bump(counts, label, hits);
            text = text.replace(pattern, replacement);
        }
    }

    text = replace_until_stable(
        &WORD_APOSTROPHE_RE,
        "${1}\u{2019}${2}",
        "apostrophe in word",
        text,
        counts,
    );
    text = replace_until_stable(
        &TRAILING_S_RE,
        "${1}\u{2019}${2}",
        "trailing possessive",
        text,
        counts,
    );

    let hits = QUOTE_PAIR_RE.find_iter(&text).count();
    if hits > 0 {
        bump(counts, "quote pair", hits);
        text = QUOTE_PAIR_RE
            .replace_all(&text, "\u{201c}${1}\u{201d}")
            .into_owned();
    }

    text
}

fn is_text_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            let lower = ext.to_ascii_lowercase();
            TEXT_EXTENSIONS.contains(&lower.as_str())
        })
}

/// Walk a published tree and repair every eligible text file in place.
///
/// Files that are not valid UTF-8 are left untouched; this pass fixes
/// damage inside already-decoded text, it never re-decodes.
///
/// # Errors
///
/// Returns an error when the root is missing or a changed file cannot be
/// written back.
pub fn run_fix(opts: &FixOptions) -> Result<FixReport, SitesmithError> {
    if !opts.root.is_dir() {
        return Err(SitesmithError::MissingRoot {
            path: opts.root.clone(),
        });
    }

    let mut report = FixReport::default();
    let walker = WalkDir::new(&opts.root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.file_name() != "node_modules");

    for entry in walker.filter_map(Result::ok) {
        if !entry.file_type().is_file() || !is_text_file(entry.path()) {
            continue;
        }
        report.files_scanned += 1;

        let bytes = fs::read(entry.path())?;
        let Ok(original) = String::from_utf8(bytes) else {
            debug!(path = %entry.path().display(), "skipping non-UTF-8 file");
            continue;
        };

        let fixed = fix_text(&original, &mut report.replacements);
        if fixed != original {
            report.files_changed += 1;
            if opts.check {
                info!(path = %entry.path().display(), "would fix");
            } else {
                fs::write(entry.path(), fixed)?;
                info!(path = %entry.path().display(), "fixed");
            }
        }
    }

    Ok(report)
}
