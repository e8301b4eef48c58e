//! Building canonical entity output from grouped legacy records.
//!
//! Each entity group becomes one directory containing the details JSON,
//! one HTML fragment per referenced analysis block, and (when resolvable)
//! a normalized image file named after the entity id.

use std::collections::HashMap;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::entity::{Category, ItemDetails, PageOut, PersonDetails, SectionOut, SourceRef, Tier};
use crate::error::SitesmithError;
use crate::extract::AnalysisBlock;
use crate::record::LegacyRecord;
use crate::score;

/// Write `content` plus a trailing newline, creating parent directories.
///
/// # Errors
///
/// Returns an error when a directory or the file cannot be created.
pub fn write_text(path: &Path, content: &str) -> Result<(), SitesmithError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut body = content.to_owned();
    if !body.ends_with('\n') {
        body.push('\n');
    }
    fs::write(path, body)?;
    Ok(())
}

fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://") || s.starts_with("//")
}

/// Person page slug: `link`, else the slugified name, else the entity id.
fn person_page_slug(record: &LegacyRecord, entity_id: &str) -> String {
    let link = record.link();
    if !link.is_empty() {
        return link;
    }
    let slug = score::slugify(&record.name());
    if slug.is_empty() { entity_id.to_owned() } else { slug }
}

/// Item page slug: `link`, else the JSON file stem, else the entity id.
fn item_page_slug(record: &LegacyRecord, entity_id: &str) -> String {
    let link = record.link();
    if !link.is_empty() {
        return link;
    }
    record
        .path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| entity_id.to_owned())
}

/// Relative source pointer for a record, falling back to the full path
/// when the record lives outside `input_root`.
fn source_ref(record: &LegacyRecord, input_root: &Path) -> SourceRef {
    let rel = record.path.strip_prefix(input_root).unwrap_or(&record.path);
    SourceRef {
        json: rel.to_string_lossy().into_owned(),
    }
}

/// Build one output page from a record, writing any resolvable HTML
/// fragments into `entity_dir` on the way.
///
/// Sections whose analysis id is unknown keep their entry (and its
/// `./<id>.html` pointer) so the miss is visible downstream; no file is
/// written for them. `written` deduplicates fragment writes across the
/// pages of one entity.
fn build_page(
    record: &LegacyRecord,
    slug: String,
    blocks: &HashMap<String, AnalysisBlock>,
    entity_dir: &Path,
    input_root: &Path,
    written: &mut HashSet<String>,
) -> Result<PageOut, SitesmithError> {
    let mut sections = Vec::new();
    for section in record.section_refs() {
        if let Some(block) = blocks.get(&section.analysis_id) {
            if written.insert(section.analysis_id.clone()) {
                let fragment_path = entity_dir.join(format!("{}.html", section.analysis_id));
                write_text(&fragment_path, &block.html)?;
            }
        }
        sections.push(SectionOut {
            html: format!("./{}.html", section.analysis_id),
            order: section.order,
            heading: section.heading,
            analysis_id: section.analysis_id,
        });
    }

    let name = record.name();
    let title = if name.is_empty() { slug.clone() } else { name };

    Ok(PageOut {
        slug,
        title,
        year: record.year(),
        word_count: record.word_count(),
        description: record.description().replace('\u{FFFD}', "\u{2019}"),
        image: record.img(),
        sections,
        source: source_ref(record, input_root),
    })
}

/// Build the details record for one person entity, writing fragments.
///
/// Pages are ordered bio-first; the entity's display fields come from its
/// most bio-like page.
///
/// # Errors
///
/// Returns an error when a fragment file cannot be written.
pub fn build_person_details(
    tier: Tier,
    group: &str,
    person_id: &str,
    records: &[LegacyRecord],
    blocks: &HashMap<String, AnalysisBlock>,
    entity_dir: &Path,
    input_root: &Path,
) -> Result<PersonDetails, SitesmithError> {
    let mut ordered: Vec<&LegacyRecord> = records.iter().collect();
    ordered.sort_by(|a, b| score::person_page_order(a, b));

    let mut written = HashSet::new();
    let mut pages = Vec::with_capacity(ordered.len());
    for record in ordered {
        pages.push(build_page(
            record,
            person_page_slug(record, person_id),
            blocks,
            entity_dir,
            input_root,
            &mut written,
        )?);
    }

    let primary = score::first_max_by_key(&pages, score::bio_like_page_score);
    let (display_name, year, word_count, image, description) = primary.map_or_else(
        || (String::new(), String::new(), 0, String::new(), String::new()),
        |p| {
            (
                p.title.clone(),
                p.year.clone(),
                p.word_count,
                p.image.clone(),
                p.description.clone(),
            )
        },
    );

    Ok(PersonDetails {
        person_id: person_id.to_owned(),
        tier: tier.as_str().to_owned(),
        group: group.to_owned(),
        display_name,
        year,
        word_count,
        image,
        description,
        pages,
    })
}

/// Build the details record for one concept or influence entity.
///
/// Pages are ordered by word count; display fields come from the page
/// with the richest description.
///
/// # Errors
///
/// Returns an error when a fragment file cannot be written.
pub fn build_item_details(
    category: Category,
    group: &str,
    item_id: &str,
    records: &[LegacyRecord],
    blocks: &HashMap<String, AnalysisBlock>,
    entity_dir: &Path,
    input_root: &Path,
) -> Result<ItemDetails, SitesmithError> {
    let mut ordered: Vec<&LegacyRecord> = records.iter().collect();
    ordered.sort_by(|a, b| score::item_page_order(a, b));

    let mut written = HashSet::new();
    let mut pages = Vec::with_capacity(ordered.len());
    for record in ordered {
        pages.push(build_page(
            record,
            item_page_slug(record, item_id),
            blocks,
            entity_dir,
            input_root,
            &mut written,
        )?);
    }

    let primary = score::first_max_by_key(&pages, score::primary_page_score);
    let (display_name, year, word_count, image, description) = primary.map_or_else(
        || (String::new(), String::new(), 0, String::new(), String::new()),
        |p| {
            (
                p.title.clone(),
                p.year.clone(),
                p.word_count,
                p.image.clone(),
                p.description.clone(),
            )
        },
    );

    Ok(ItemDetails {
        item_id: item_id.to_owned(),
        category: category.as_str().to_owned(),
        group: group.to_owned(),
        display_name,
        year,
        word_count,
        image,
        description,
        pages,
    })
}

/// Materialize the entity's image as `<entity_id>.<ext>` in its directory
/// and rewrite the given image references to point at it.
///
/// The first local (non-URL, non-`main.jpg`) reference names the source
/// file. It is copied from `images_root` when present there; failing that
/// an already-deposited `main.jpg` in the entity directory is renamed.
/// When neither source exists the references are left untouched. A stale
/// `main.jpg` left behind after a copy is removed.
///
/// # Errors
///
/// Returns an error when the copy, rename, or removal fails.
pub fn materialize_image(
    entity_id: &str,
    entity_dir: &Path,
    images_root: Option<&Path>,
    mut refs: Vec<&mut String>,
) -> Result<(), SitesmithError> {
    let basename = refs
        .iter()
        .filter(|r| !r.is_empty() && !is_url(r))
        .filter_map(|r| Path::new(r.as_str()).file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .find(|n| n != "main.jpg");
    let Some(basename) = basename else {
        // Nothing to name the file after; a bare main.jpg stays as-is.
        return Ok(());
    };

    let ext = Path::new(&basename)
        .extension()
        .map_or_else(|| "jpg".to_owned(), |e| e.to_string_lossy().to_lowercase());
    let dest_name = format!("{entity_id}.{ext}");
    let dest = entity_dir.join(&dest_name);
    let stale_main = entity_dir.join("main.jpg");

    let mut placed = dest.exists();
    if !placed {
        if let Some(root) = images_root {
            let candidate = root.join(&basename);
            if candidate.exists() {
                fs::copy(&candidate, &dest)?;
                placed = true;
            }
        }
    }
    if !placed && stale_main.exists() {
        fs::rename(&stale_main, &dest)?;
        placed = true;
    }
    if !placed {
        debug!(entity = entity_id, image = %basename, "no image source found");
        return Ok(());
    }
    if dest_name != "main.jpg" && stale_main.exists() {
        fs::remove_file(&stale_main)?;
    }

    let target = format!("./{dest_name}");
    for r in &mut refs {
        if !r.is_empty() && !is_url(r) {
            **r = target.clone();
        }
    }
    Ok(())
}

/// Materialize and rewire the image for a person entity.
///
/// # Errors
///
/// Propagates filesystem errors from [`materialize_image`].
pub fn materialize_person_image(
    details: &mut PersonDetails,
    entity_dir: &Path,
    images_root: Option<&Path>,
) -> Result<(), SitesmithError> {
    let entity_id = details.person_id.clone();
    let mut refs = vec![&mut details.image];
    refs.extend(details.pages.iter_mut().map(|p| &mut p.image));
    materialize_image(&entity_id, entity_dir, images_root, refs)
}

/// Materialize and rewire the image for a concept/influence entity.
///
/// # Errors
///
/// Propagates filesystem errors from [`materialize_image`].
pub fn materialize_item_image(
    details: &mut ItemDetails,
    entity_dir: &Path,
    images_root: Option<&Path>,
) -> Result<(), SitesmithError> {
    let entity_id = details.item_id.clone();
    let mut refs = vec![&mut details.image];
    refs.extend(details.pages.iter_mut().map(|p| &mut p.image));
    materialize_image(&entity_id, entity_dir, images_root, refs)
}
