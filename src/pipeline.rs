//! End-to-end conversion pipeline: scan, extract, group, build, write.
//!
//! The pipeline is deliberately synchronous and single pass. Input trees
//! for real sites are a few thousand small files; a deterministic walk
//! order matters far more here than parallelism.

use std::collections::HashMap;
use std::path::PathBuf;

use clap::ValueEnum;
use tracing::{debug, info, warn};

use crate::build;
use crate::entity::{Category, Tier};
use crate::error::SitesmithError;
use crate::extract::{self, AnalysisBlock};
use crate::group;
use crate::text;

/// Which entity kinds a conversion run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Include {
    /// People tiers only.
    People,
    /// People plus concepts and influences.
    All,
}

/// Settings for one conversion run.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Legacy input root.
    pub input: PathBuf,
    /// Output root; entity directories are created beneath it.
    pub out: PathBuf,
    /// Optional directory of source images to copy from.
    pub images_root: Option<PathBuf>,
    /// Entity kinds to convert.
    pub include: Include,
    /// Major tier directory name under the input root.
    pub major_dir: String,
    /// Minor tier directory name under the input root.
    pub minor_dir: String,
    /// Concepts directory name under the input root.
    pub concepts_dir: String,
    /// Influences directory name under the input root.
    pub influences_dir: String,
}

/// Outcome counters and diagnostics for a conversion run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Person entities written.
    pub people_written: usize,
    /// Concept entities written.
    pub concepts_written: usize,
    /// Influence entities written.
    pub influences_written: usize,
    /// Legacy records skipped as unreadable.
    pub records_skipped: usize,
    /// Analysis source files skipped as unreadable.
    pub sources_skipped: usize,
    /// Every unresolved analysis id, one entry per referencing section.
    pub missing_refs: Vec<String>,
}

impl RunReport {
    /// Unresolved ids deduplicated, in first-seen order.
    #[must_use]
    pub fn missing_unique(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.missing_refs
            .iter()
            .map(String::as_str)
            .filter(|r| seen.insert(*r))
            .collect()
    }
}

/// Scan the input tree for `*-analysis.js` files and build the block map.
///
/// Ids are unique within one file (disambiguated there); across files the
/// first definition wins and later ones are dropped with a warning. A file
/// that cannot be read is skipped with a warning; the scan continues.
/// Returns the block map and the number of skipped files.
fn collect_blocks(opts: &ConvertOptions) -> (HashMap<String, AnalysisBlock>, usize) {
    let mut blocks: HashMap<String, AnalysisBlock> = HashMap::new();
    let mut skipped = 0;
    for path in group::analysis_files(&opts.input) {
        let source = match text::read_legacy_text(&path) {
            Ok(source) => source,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable analysis file");
                skipped += 1;
                continue;
            }
        };
        for block in extract::parse_analysis_source(&source, &path) {
            match blocks.get(&block.analysis_id) {
                Some(existing) => {
                    warn!(
                        id = %block.analysis_id,
                        kept = %existing.source_path.display(),
                        dropped = %path.display(),
                        "duplicate analysis id across files"
                    );
                }
                None => {
                    blocks.insert(block.analysis_id.clone(), block);
                }
            }
        }
    }
    debug!(count = blocks.len(), "analysis blocks collected");
    (blocks, skipped)
}

/// Run a full conversion.
///
/// # Errors
///
/// Returns an error when the input root is missing or output files cannot
/// be written. Individual unreadable source files and malformed records
/// are skipped and counted instead of aborting the run.
pub fn run_convert(opts: &ConvertOptions) -> Result<RunReport, SitesmithError> {
    if !opts.input.is_dir() {
        return Err(SitesmithError::MissingRoot {
            path: opts.input.clone(),
        });
    }

    let (blocks, sources_skipped) = collect_blocks(opts);
    let mut report = RunReport {
        sources_skipped,
        ..RunReport::default()
    };

    let tier_roots = [
        (Tier::Major, opts.input.join(&opts.major_dir)),
        (Tier::Minor, opts.input.join(&opts.minor_dir)),
    ];
    let (people, skipped) = group::group_people(&tier_roots);
    report.records_skipped += skipped;

    for ((tier, anchor), records) in &people {
        let person_id = crate::score::pick_canonical_id(records);
        let entity_dir = opts.out.join("people").join(&person_id);
        let mut details = build::build_person_details(
            *tier,
            anchor,
            &person_id,
            records,
            &blocks,
            &entity_dir,
            &opts.input,
        )?;
        for page in &details.pages {
            for section in &page.sections {
                if !blocks.contains_key(&section.analysis_id) {
                    warn!(entity = %person_id, id = %section.analysis_id, "unresolved analysis reference");
                    report.missing_refs.push(section.analysis_id.clone());
                }
            }
        }
        build::materialize_person_image(&mut details, &entity_dir, opts.images_root.as_deref())?;
        let json = serde_json::to_string_pretty(&details)?;
        build::write_text(&entity_dir.join("person-details.json"), &json)?;
        report.people_written += 1;
        info!(id = %person_id, pages = details.pages.len(), "person written");
    }

    if opts.include == Include::All {
        let category_roots = [
            (Category::Concepts, opts.input.join(&opts.concepts_dir)),
            (Category::Influences, opts.input.join(&opts.influences_dir)),
        ];
        let (items, skipped) = group::group_items(&category_roots);
        report.records_skipped += skipped;

        for ((category, anchor), records) in &items {
            let item_id = crate::score::pick_canonical_id(records);
            let entity_dir = opts.out.join(category.as_str()).join(&item_id);
            let mut details = build::build_item_details(
                *category,
                anchor,
                &item_id,
                records,
                &blocks,
                &entity_dir,
                &opts.input,
            )?;
            for page in &details.pages {
                for section in &page.sections {
                    if !blocks.contains_key(&section.analysis_id) {
                        warn!(
                            entity = %format!("{}/{item_id}", category.as_str()),
                            id = %section.analysis_id,
                            "unresolved analysis reference"
                        );
                        report.missing_refs.push(section.analysis_id.clone());
                    }
                }
            }
            build::materialize_item_image(&mut details, &entity_dir, opts.images_root.as_deref())?;
            let json = serde_json::to_string_pretty(&details)?;
            build::write_text(&entity_dir.join(category.details_filename()), &json)?;
            match category {
                Category::Concepts => report.concepts_written += 1,
                Category::Influences => report.influences_written += 1,
            }
            info!(id = %item_id, category = category.as_str(), "item written");
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_input_root_is_an_error() {
        let opts = ConvertOptions {
            input: PathBuf::from("/definitely/not/here"),
            out: PathBuf::from("/tmp/out"),
            images_root: None,
            include: Include::People,
            major_dir: "Major speakers".to_owned(),
            minor_dir: "Minor speakers".to_owned(),
            concepts_dir: "Concepts".to_owned(),
            influences_dir: "Influences".to_owned(),
        };
        let err = run_convert(&opts).unwrap_err();
        assert!(matches!(err, SitesmithError::MissingRoot { .. }));
    }

    #[test]
    fn missing_unique_dedups_preserving_order() {
        let report = RunReport {
            missing_refs: vec![
                "ghost".to_owned(),
                "lost".to_owned(),
                "ghost".to_owned(),
                "gone".to_owned(),
            ],
            ..RunReport::default()
        };
        assert_eq!(report.missing_unique(), vec!["ghost", "lost", "gone"]);
    }
}
