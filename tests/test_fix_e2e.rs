//! End-to-end fixup runs against scratch published trees.

use std::fs;

use tempfile::TempDir;

use sitesmith::fixup::{FixOptions, run_fix};

#[test]
fn repairs_mixed_damage_across_a_tree() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    fs::create_dir_all(root.join("people/abinadi")).unwrap();
    fs::write(
        root.join("people/abinadi/courage.html"),
        "<p>Abinadi\u{e2}\u{20ac}\u{2122}s trial didn\u{FFFD}t end there.</p>",
    )
    .unwrap();
    fs::write(
        root.join("people/abinadi/person-details.json"),
        "{\"description\": \"the peoples\u{FFFD} king\"}",
    )
    .unwrap();
    fs::write(root.join("styles.css"), "/* clean */").unwrap();

    let report = run_fix(&FixOptions {
        root: root.to_path_buf(),
        check: false,
    })
    .unwrap();

    assert_eq!(report.files_scanned, 3);
    assert_eq!(report.files_changed, 2);

    let html = fs::read_to_string(root.join("people/abinadi/courage.html")).unwrap();
    assert_eq!(
        html,
        "<p>Abinadi\u{2019}s trial didn\u{2019}t end there.</p>"
    );
    let json = fs::read_to_string(root.join("people/abinadi/person-details.json")).unwrap();
    assert_eq!(json, "{\"description\": \"the peoples\u{2019} king\"}");
    assert_eq!(fs::read_to_string(root.join("styles.css")).unwrap(), "/* clean */");
}

#[test]
fn check_mode_leaves_tree_untouched() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    let damaged = "don\u{FFFD}t";
    fs::write(root.join("index.html"), damaged).unwrap();

    let report = run_fix(&FixOptions {
        root: root.to_path_buf(),
        check: true,
    })
    .unwrap();

    assert_eq!(report.files_changed, 1);
    assert_eq!(fs::read_to_string(root.join("index.html")).unwrap(), damaged);
}

#[test]
fn missing_root_is_an_error() {
    let err = run_fix(&FixOptions {
        root: "/no/such/tree".into(),
        check: true,
    })
    .unwrap_err();
    assert_eq!(err.exit_code(), 2);
}
