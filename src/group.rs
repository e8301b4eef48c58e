//! Grouping of scattered legacy records into entity groups.
//!
//! Records for one person are spread over several JSON files under a shared
//! folder. The grouping anchor is the first path segment under a tier or
//! category root (or the file stem when the file sits directly under the
//! root). The anchor is only a grouping key; the canonical entity id is
//! chosen later by scoring.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::entity::{Category, Tier};
use crate::record::{self, LegacyRecord};

/// Person groups keyed by (tier, anchor), in sorted key order.
pub type PeopleGroups = BTreeMap<(Tier, String), Vec<LegacyRecord>>;

/// Concept/influence groups keyed by (category, anchor), in sorted key order.
pub type ItemGroups = BTreeMap<(Category, String), Vec<LegacyRecord>>;

/// Collect every `*.json` file under `root`, in a deterministic order.
fn json_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        })
        .map(walkdir::DirEntry::into_path)
        .collect()
}

/// Collect every `*-analysis.js` file under `root`, in a deterministic order.
#[must_use]
pub fn analysis_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.file_name()
                .to_str()
                .is_some_and(|name| name.ends_with("-analysis.js"))
        })
        .map(walkdir::DirEntry::into_path)
        .collect()
}

/// The grouping anchor for a record file under `root`: the first relative
/// path segment when the file sits in a subfolder, else the file stem.
fn anchor_for(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let mut components = rel.components();
    let first = components.next();
    if components.next().is_some() {
        first.map_or_else(String::new, |c| c.as_os_str().to_string_lossy().into_owned())
    } else {
        path.file_stem()
            .map_or_else(String::new, |s| s.to_string_lossy().into_owned())
    }
}

/// Group person records from the tier roots by (tier, anchor).
///
/// Records that fail to load are skipped with a warning; the walk
/// continues. Returns the groups and the number of skipped records.
#[must_use]
pub fn group_people(tier_roots: &[(Tier, PathBuf)]) -> (PeopleGroups, usize) {
    let mut groups = PeopleGroups::new();
    let mut skipped = 0;

    for (tier, root) in tier_roots {
        if !root.exists() {
            continue;
        }
        for json_path in json_files(root) {
            match record::load_legacy_record(&json_path) {
                Ok(rec) => {
                    let anchor = anchor_for(root, &json_path);
                    groups.entry((*tier, anchor)).or_default().push(rec);
                }
                Err(e) => {
                    warn!(path = %json_path.display(), error = %e, "skipping unreadable record");
                    skipped += 1;
                }
            }
        }
    }

    (groups, skipped)
}

/// Group concept/influence records from the category roots by
/// (category, anchor). Same skip-and-continue behavior as [`group_people`].
#[must_use]
pub fn group_items(category_roots: &[(Category, PathBuf)]) -> (ItemGroups, usize) {
    let mut groups = ItemGroups::new();
    let mut skipped = 0;

    for (category, root) in category_roots {
        if !root.exists() {
            continue;
        }
        for json_path in json_files(root) {
            match record::load_legacy_record(&json_path) {
                Ok(rec) => {
                    let anchor = anchor_for(root, &json_path);
                    groups.entry((*category, anchor)).or_default().push(rec);
                }
                Err(e) => {
                    warn!(path = %json_path.display(), error = %e, "skipping unreadable record");
                    skipped += 1;
                }
            }
        }
    }

    (groups, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn anchor_is_first_segment_or_file_stem() {
        let root = Path::new("/data/Major speakers");
        assert_eq!(
            anchor_for(root, Path::new("/data/Major speakers/abinadi/trial.json")),
            "abinadi"
        );
        assert_eq!(
            anchor_for(root, Path::new("/data/Major speakers/zeniff.json")),
            "zeniff"
        );
    }

    #[test]
    fn records_grouped_by_tier_and_anchor() {
        let tmp = TempDir::new().unwrap();
        let major = tmp.path().join("Major speakers");
        write(&major, "abinadi/abinadi.json", r#"{"speakers":[{"name":"Abinadi"}]}"#);
        write(&major, "abinadi/trial.json", r#"{"speakers":[{"name":"Trial"}]}"#);
        write(&major, "zeniff.json", r#"{"speakers":[{"name":"Zeniff"}]}"#);

        let (groups, skipped) = group_people(&[(Tier::Major, major)]);
        assert_eq!(skipped, 0);
        assert_eq!(groups.len(), 2);
        let abinadi = &groups[&(Tier::Major, "abinadi".to_owned())];
        assert_eq!(abinadi.len(), 2);
    }

    #[test]
    fn malformed_record_skipped_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let major = tmp.path().join("Major speakers");
        write(&major, "bad/broken.json", "{not json");
        write(&major, "bad/good.json", r#"{"name":"Fine"}"#);

        let (groups, skipped) = group_people(&[(Tier::Major, major)]);
        assert_eq!(skipped, 1);
        assert_eq!(groups[&(Tier::Major, "bad".to_owned())].len(), 1);
    }

    #[test]
    fn missing_root_yields_no_groups() {
        let (groups, skipped) = group_people(&[(Tier::Minor, PathBuf::from("/nonexistent"))]);
        assert!(groups.is_empty());
        assert_eq!(skipped, 0);
    }

    #[test]
    fn analysis_files_filtered_by_suffix() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write(root, "a/alma-analysis.js", "x");
        write(root, "a/alma.json", "{}");
        write(root, "a/notes.js", "x");

        let files = analysis_files(root);
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("alma-analysis.js"));
    }
}
