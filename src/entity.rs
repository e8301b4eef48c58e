//! Canonical entity records as serialized to details JSON.
//!
//! Field declaration order here IS the key order in the output files, so
//! these structs double as the wire format contract. Serialization goes
//! through `serde_json::to_string_pretty`, which keeps non-ASCII characters
//! literal.

use serde::Serialize;

/// Person tier, from the legacy tree's two tier roots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    /// Tier root of primary figures.
    Major,
    /// Tier root of secondary figures.
    Minor,
}

impl Tier {
    /// The tier label as written into details JSON.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Major => "major",
            Self::Minor => "minor",
        }
    }
}

/// Non-person entity category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Category {
    /// Key concepts and phrases.
    Concepts,
    /// Influence relationships.
    Influences,
}

impl Category {
    /// The category label, which is also the output subdirectory name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Concepts => "concepts",
            Self::Influences => "influences",
        }
    }

    /// Details JSON filename for this category.
    #[must_use]
    pub const fn details_filename(self) -> &'static str {
        match self {
            Self::Concepts => "concept-details.json",
            Self::Influences => "influence-details.json",
        }
    }
}

/// One ordered section within a page.
#[derive(Debug, Clone, Serialize)]
pub struct SectionOut {
    /// Order within the page, from the `analysis_<n>` suffix.
    pub order: u64,
    /// Heading text (may be empty).
    pub heading: String,
    /// Referenced analysis block id.
    pub analysis_id: String,
    /// Relative path of the fragment file (`./<analysis_id>.html`).
    pub html: String,
}

/// Pointer back to the originating legacy JSON file.
#[derive(Debug, Clone, Serialize)]
pub struct SourceRef {
    /// Path of the source JSON, relative to the input root when possible.
    pub json: String,
}

/// One page (bio or sub-article) of an entity.
#[derive(Debug, Clone, Serialize)]
pub struct PageOut {
    /// Page slug.
    pub slug: String,
    /// Page title.
    pub title: String,
    /// Year label (free text, may be empty).
    pub year: String,
    /// Word count, 0 when absent in the legacy record.
    pub word_count: i64,
    /// Description text.
    pub description: String,
    /// Image reference (legacy path until materialized).
    pub image: String,
    /// Ordered sections.
    pub sections: Vec<SectionOut>,
    /// Originating file pointer.
    pub source: SourceRef,
}

/// Details record for a person entity.
#[derive(Debug, Clone, Serialize)]
pub struct PersonDetails {
    /// Canonical entity id (slug).
    pub person_id: String,
    /// Tier label (`major` or `minor`).
    pub tier: String,
    /// The grouping anchor the records were found under.
    pub group: String,
    /// Display name, from the most bio-like page.
    pub display_name: String,
    /// Year label, from the most bio-like page.
    pub year: String,
    /// Word count, from the most bio-like page.
    pub word_count: i64,
    /// Image reference, from the most bio-like page.
    pub image: String,
    /// Description, from the most bio-like page.
    pub description: String,
    /// All pages, ordered bio-first.
    pub pages: Vec<PageOut>,
}

/// Details record for a concept or influence entity.
#[derive(Debug, Clone, Serialize)]
pub struct ItemDetails {
    /// Canonical entity id (slug).
    pub item_id: String,
    /// Category label (`concepts` or `influences`).
    pub category: String,
    /// The grouping anchor the records were found under.
    pub group: String,
    /// Display name, from the primary page.
    pub display_name: String,
    /// Year label, from the primary page.
    pub year: String,
    /// Word count, from the primary page.
    pub word_count: i64,
    /// Image reference, from the primary page.
    pub image: String,
    /// Description, from the primary page.
    pub description: String,
    /// All pages, ordered by word count.
    pub pages: Vec<PageOut>,
}
