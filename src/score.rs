//! Heuristic scoring for canonical id and page selection.
//!
//! The tie-break order of these functions is a load-bearing contract: the
//! same input group must always produce the same canonical id and the same
//! primary page, or entity directories would churn between runs. They are
//! kept as small named functions over explicit tuples rather than inline
//! sort keys so each one can be unit tested on its own.

use std::cmp::Ordering;

use crate::entity::PageOut;
use crate::record::LegacyRecord;

/// Score a record for canonical-id selection.
///
/// The first component sums two independent boolean signals: having a
/// year AND having a description scores 2, either alone scores 1. This is
/// deliberately additive, not a boolean OR: a record carrying both
/// attributes outranks one carrying either, regardless of word count.
#[must_use]
pub fn canonical_score(record: &LegacyRecord) -> (u8, i64, usize) {
    let has_year = u8::from(!record.year().is_empty());
    let has_desc = u8::from(!record.description().is_empty());
    (
        has_year + has_desc,
        record.word_count(),
        record.name().chars().count(),
    )
}

/// Pick the canonical entity id for a group of records.
///
/// Takes the best-scoring record's slug; falls back to its slugified name,
/// then to the literal `"person"`. The first maximum wins on ties, so the
/// choice is stable across reruns.
#[must_use]
pub fn pick_canonical_id(records: &[LegacyRecord]) -> String {
    let Some(best) = first_max_by_key(records, canonical_score) else {
        return "person".to_owned();
    };
    let id = best.link();
    if !id.is_empty() {
        return id;
    }
    let slug = slugify(&best.name());
    if slug.is_empty() {
        "person".to_owned()
    } else {
        slug
    }
}

/// Slugify a display name: lowercase, non-alphanumeric runs collapsed to a
/// single hyphen, trimmed of leading/trailing hyphens.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for c in name.trim().to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(c);
        } else {
            pending_hyphen = true;
        }
    }
    out
}

/// A record looks like a true biography when it has real content and a year.
#[must_use]
pub fn is_bio_like(record: &LegacyRecord) -> bool {
    record.word_count() > 0 && !record.year().is_empty()
}

/// Page ordering for person entities: bio-like first, then word count
/// descending, then name ascending.
#[must_use]
pub fn person_page_order(a: &LegacyRecord, b: &LegacyRecord) -> Ordering {
    u8::from(is_bio_like(b))
        .cmp(&u8::from(is_bio_like(a)))
        .then_with(|| b.word_count().cmp(&a.word_count()))
        .then_with(|| a.name().cmp(&b.name()))
}

/// Page ordering for concept/influence entities: word count descending,
/// then name ascending. No bio-likelihood tier.
#[must_use]
pub fn item_page_order(a: &LegacyRecord, b: &LegacyRecord) -> Ordering {
    b.word_count()
        .cmp(&a.word_count())
        .then_with(|| a.name().cmp(&b.name()))
}

/// Score a built page for a person entity's display fields.
#[must_use]
pub fn bio_like_page_score(page: &PageOut) -> (u8, i64, usize) {
    (
        u8::from(!page.year.is_empty()),
        page.word_count,
        page.description.chars().count(),
    )
}

/// Score a built page for a concept/influence entity's display fields.
#[must_use]
pub fn primary_page_score(page: &PageOut) -> (usize, i64, usize) {
    (
        page.description.chars().count(),
        page.word_count,
        page.title.chars().count(),
    )
}

/// Return the first element attaining the maximum key, or `None` when
/// `items` is empty.
///
/// Unlike `Iterator::max_by_key`, which returns the last maximum, this
/// keeps the earliest one, so ties do not depend on input order quirks.
pub fn first_max_by_key<T, K: Ord>(items: &[T], key: impl Fn(&T) -> K) -> Option<&T> {
    let mut best: Option<(&T, K)> = None;
    for item in items {
        let k = key(item);
        match &best {
            Some((_, best_k)) if k <= *best_k => {}
            _ => best = Some((item, k)),
        }
    }
    best.map(|(item, _)| item)
}
