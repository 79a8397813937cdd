//! End-to-end pipeline tests: parse tool output, hydrate it against a real
//! workspace, apply it, and check what landed on disk.

use resplice::{hydrate, results_from_str, LoadError, ResultSet};
use std::fs;
use tempfile::TempDir;

const TOOL_OUTPUT: &str = r##"[
    {
        "filePath": "src/greet.rs",
        "affected": true,
        "conflicted": false,
        "actions": [
            {"kind": "edit", "start": 2, "end": 4, "newCode": "XY"},
            {"kind": "group", "children": [
                {"kind": "edit", "start": 6, "end": 8, "newCode": "Z"}
            ]}
        ]
    },
    {
        "filePath": "src/old.rs",
        "affected": true,
        "actions": [{"kind": "remove_file"}]
    },
    {
        "filePath": "docs/guide/new.md",
        "affected": true,
        "actions": [{"kind": "add_file", "newCode": "# Guide\n"}]
    }
]"##;

fn setup_workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("src")).unwrap();
    fs::write(dir.path().join("src/greet.rs"), "abcdefghij").unwrap();
    fs::write(dir.path().join("src/old.rs"), "to be removed\n").unwrap();
    dir
}

#[test]
fn test_full_apply_workflow() {
    let dir = setup_workspace();

    let mut results = results_from_str(TOOL_OUTPUT).unwrap();
    hydrate(&mut results, dir.path()).unwrap();
    let mut set = ResultSet::new(results);
    assert_eq!(set.len(), 3);
    assert_eq!(set.total_actions(), 4);

    let report = set.apply_all();

    assert!(report.is_success());
    assert_eq!(report.applied(), 3);
    assert!(set.is_empty());
    assert_eq!(set.total_actions(), 0);

    assert_eq!(
        fs::read_to_string(dir.path().join("src/greet.rs")).unwrap(),
        "abXYefZij"
    );
    assert!(!dir.path().join("src/old.rs").exists());
    assert_eq!(
        fs::read_to_string(dir.path().join("docs/guide/new.md")).unwrap(),
        "# Guide\n"
    );
}

#[test]
fn test_apply_all_keeps_failures_pending_for_retry() {
    let dir = setup_workspace();

    let mut results = results_from_str(TOOL_OUTPUT).unwrap();
    hydrate(&mut results, dir.path()).unwrap();
    let mut set = ResultSet::new(results);

    // the edit target disappears between hydration and application
    fs::remove_file(dir.path().join("src/greet.rs")).unwrap();

    let report = set.apply_all();

    assert!(!report.is_success());
    assert_eq!(report.applied(), 2);
    assert_eq!(report.failed(), 1);
    let message = report.error_message().unwrap();
    assert!(message.contains("src/greet.rs"));
    assert!(message.contains("file not found"));

    // the failed result is still pending, everything else resolved
    assert_eq!(set.len(), 1);
    assert_eq!(set.get(0).unwrap().file_path, "src/greet.rs");
    assert!(!dir.path().join("src/old.rs").exists());
    assert!(dir.path().join("docs/guide/new.md").exists());

    // restore the file and retry the survivor
    fs::write(dir.path().join("src/greet.rs"), "abcdefghij").unwrap();
    let report = set.apply_all();
    assert!(report.is_success());
    assert!(set.is_empty());
    assert_eq!(
        fs::read_to_string(dir.path().join("src/greet.rs")).unwrap(),
        "abXYefZij"
    );
}

#[test]
fn test_selective_discard_then_apply_rest() {
    let dir = setup_workspace();

    let mut results = results_from_str(TOOL_OUTPUT).unwrap();
    hydrate(&mut results, dir.path()).unwrap();
    let mut set = ResultSet::new(results);

    // the collaborator decides to keep src/old.rs
    let discarded = set.remove_result(1).unwrap();
    assert_eq!(discarded.file_path, "src/old.rs");

    let report = set.apply_all();

    assert!(report.is_success());
    assert!(set.is_empty());
    assert_eq!(
        fs::read_to_string(dir.path().join("src/old.rs")).unwrap(),
        "to be removed\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("src/greet.rs")).unwrap(),
        "abXYefZij"
    );
    assert!(dir.path().join("docs/guide/new.md").exists());
}

#[test]
fn test_hydrate_refuses_results_outside_workspace() {
    let dir = setup_workspace();
    let escaping = r#"[
        {
            "filePath": "../outside.txt",
            "actions": [{"kind": "edit", "start": 0, "end": 1, "newCode": "x"}]
        }
    ]"#;

    let mut results = results_from_str(escaping).unwrap();
    let err = hydrate(&mut results, dir.path()).unwrap_err();

    assert!(matches!(err, LoadError::Path(_)));
    assert!(!dir.path().parent().unwrap().join("outside.txt").exists());
}
