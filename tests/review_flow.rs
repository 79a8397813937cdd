//! Interactive review flows: applying and discarding individual results and
//! actions while the set's indices stay live.

use resplice::{hydrate, Action, ApplyError, ResultSet, ResultSetError, RewriteResult};
use std::fs;
use tempfile::TempDir;

fn setup_workspace(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, content) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
    dir
}

fn hydrated_set(dir: &TempDir, results: Vec<RewriteResult>) -> ResultSet {
    let mut results = results;
    hydrate(&mut results, dir.path()).unwrap();
    ResultSet::new(results)
}

#[test]
fn test_partially_applied_result_tracks_moving_offsets() {
    let source = "fn main() {\n    println!(\"hello\");\n    println!(\"world\");\n}\n";
    let dir = setup_workspace(&[("src/main.rs", source)]);

    let hello = source.find("hello").unwrap();
    let world = source.find("world").unwrap();
    let mut set = hydrated_set(
        &dir,
        vec![RewriteResult::new(
            "src/main.rs",
            vec![
                Action::edit(hello, hello + "hello".len(), "goodbye"),
                Action::edit(world, world + "world".len(), "moon"),
            ],
        )],
    );

    let first = set.apply_action(0, 0).unwrap();
    assert_eq!(first.offset_delta, 2);
    assert!(!first.result_resolved);

    // the surviving action now points at "world" in the rewritten text
    let pending = &set.get(0).unwrap().actions[0];
    assert_eq!((pending.start, pending.end), (world + 2, world + 2 + "world".len()));

    let second = set.apply_action(0, 0).unwrap();
    assert!(second.result_resolved);
    assert!(set.is_empty());

    let expected = source.replace("hello", "goodbye").replace("world", "moon");
    assert_eq!(
        fs::read_to_string(dir.path().join("src/main.rs")).unwrap(),
        expected
    );
}

#[test]
fn test_discard_action_then_apply_remainder() {
    let dir = setup_workspace(&[("notes.txt", "abcdefghij")]);
    let mut set = hydrated_set(
        &dir,
        vec![RewriteResult::new(
            "notes.txt",
            vec![Action::edit(0, 2, "AA"), Action::edit(6, 8, "ZZ")],
        )],
    );

    let removed = set.remove_action(0, 0).unwrap();
    assert!(!removed.result_resolved);

    // no splice happened, so the remaining action still uses original offsets
    let effect = set.apply_result(0).unwrap();

    assert_eq!(effect.path(), dir.path().join("notes.txt"));
    assert!(set.is_empty());
    assert_eq!(
        fs::read_to_string(dir.path().join("notes.txt")).unwrap(),
        "abcdefZZij"
    );
}

#[test]
fn test_structural_results_resolve_in_one_step() {
    let dir = setup_workspace(&[("stale.txt", "old\n")]);
    let mut set = hydrated_set(
        &dir,
        vec![
            RewriteResult::new("generated/config.json", vec![Action::add_file("{}\n")]),
            RewriteResult::new("stale.txt", vec![Action::remove_file()]),
        ],
    );

    let created = set.apply_action(0, 0).unwrap();
    assert!(created.result_resolved);
    assert_eq!(set.len(), 1);

    let removed = set.apply_action(0, 0).unwrap();
    assert!(removed.result_resolved);
    assert!(set.is_empty());

    assert_eq!(
        fs::read_to_string(dir.path().join("generated/config.json")).unwrap(),
        "{}\n"
    );
    assert!(!dir.path().join("stale.txt").exists());
}

#[test]
fn test_failed_apply_keeps_review_state_for_retry() {
    let dir = setup_workspace(&[("notes.txt", "abcdefghij")]);
    let mut set = hydrated_set(
        &dir,
        vec![RewriteResult::new(
            "notes.txt",
            vec![Action::edit(2, 4, "XY")],
        )],
    );

    fs::remove_file(dir.path().join("notes.txt")).unwrap();
    let err = set.apply_action(0, 0).unwrap_err();
    assert!(matches!(
        err,
        ResultSetError::Apply(ApplyError::FileNotFound { .. })
    ));
    assert_eq!(set.len(), 1);
    assert_eq!(set.total_actions(), 1);

    // put the file back and the very same click succeeds
    fs::write(dir.path().join("notes.txt"), "abcdefghij").unwrap();
    let applied = set.apply_action(0, 0).unwrap();
    assert!(applied.result_resolved);
    assert_eq!(
        fs::read_to_string(dir.path().join("notes.txt")).unwrap(),
        "abXYefghij"
    );
}

#[test]
fn test_indices_rebind_as_results_resolve() {
    let dir = setup_workspace(&[
        ("a.txt", "0123456789"),
        ("b.txt", "0123456789"),
        ("c.txt", "0123456789"),
    ]);
    let mut set = hydrated_set(
        &dir,
        vec![
            RewriteResult::new("a.txt", vec![Action::edit(0, 1, "A")]),
            RewriteResult::new("b.txt", vec![Action::edit(0, 1, "B")]),
            RewriteResult::new("c.txt", vec![Action::edit(0, 1, "C")]),
        ],
    );

    let effect = set.apply_result(0).unwrap();
    assert_eq!(effect.path(), dir.path().join("a.txt"));
    assert_eq!(set.get(0).unwrap().file_path, "b.txt");

    let discarded = set.remove_result(0).unwrap();
    assert_eq!(discarded.file_path, "b.txt");
    assert_eq!(set.get(0).unwrap().file_path, "c.txt");

    let applied = set.apply_action(0, 0).unwrap();
    assert!(applied.result_resolved);
    assert!(set.is_empty());

    assert_eq!(
        fs::read_to_string(dir.path().join("a.txt")).unwrap(),
        "A123456789"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("b.txt")).unwrap(),
        "0123456789"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("c.txt")).unwrap(),
        "C123456789"
    );
}
