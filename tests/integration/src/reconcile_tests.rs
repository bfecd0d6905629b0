//! End-to-end reconciliation against the checked-in file root.
//!
//! Every test uses the real [`LocalFetcher`](filestate_core::LocalFetcher)
//! over `test-fixtures/file-roots` and a scratch tree for targets.

use std::fs;

use filestate_core::{Engine, EngineConfig, Outcome, StateFile, StateKind, StateRequest};
use filestate_fs::HashAlgorithm;
use filestate_test_utils::{TestTree, file_root};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn engine() -> Engine {
    Engine::new(EngineConfig::default().with_file_root(file_root()))
}

#[tokio::test]
async fn test_sed_scenario() {
    let tree = TestTree::new();
    let target = tree.write("sed.txt", "change_me\n");
    let sed = || {
        StateRequest::new(StateKind::Sed, &target)
            .with_param("before", "change")
            .with_param("after", "salt")
    };

    let result = engine().execute(sed()).await.unwrap();
    assert_eq!(result.outcome, Outcome::Succeeded);
    assert!(result.changes.contains_key("diff"));
    assert_eq!(tree.read("sed.txt"), "salt_me\n");

    let again = engine().execute(sed().dry_run(true)).await.unwrap();
    assert_eq!(again.outcome, Outcome::Succeeded);
    assert_eq!(again.comment, "Edit already performed");
    assert!(again.changes.is_empty());
}

#[rstest]
#[case::comment(StateKind::Comment, "^comment_me")]
#[case::uncomment(StateKind::Uncomment, "uncomment_me")]
#[case::append(StateKind::Append, "")]
#[tokio::test]
async fn test_text_edits_are_idempotent(#[case] kind: StateKind, #[case] regex: &str) {
    let tree = TestTree::new();
    let target = tree.write("file", "comment_me\n#uncomment_me\n");
    let request = || {
        let request = StateRequest::new(kind, &target);
        match kind {
            StateKind::Append => request.with_param("text", serde_json::json!(["one", "two"])),
            _ => request.with_param("regex", regex),
        }
    };

    let first = engine().execute(request()).await.unwrap();
    assert_eq!(first.outcome, Outcome::Succeeded);
    assert!(!first.changes.is_empty());
    let once = tree.snapshot();

    let second = engine().execute(request()).await.unwrap();
    assert_eq!(second.outcome, Outcome::Succeeded);
    assert!(second.changes.is_empty(), "{:?}", second.changes);
    assert_eq!(tree.snapshot(), once);
}

#[tokio::test]
async fn test_append_makedirs() {
    let tree = TestTree::new();
    let target = tree.path("a/b/c/motd");
    let append = |makedirs: bool| {
        StateRequest::new(StateKind::Append, &target)
            .with_param("text", "Authorized use only")
            .with_param("makedirs", makedirs)
    };

    let refused = engine().reconcile(append(false)).await;
    assert_eq!(refused.outcome, Outcome::Failed);
    tree.assert_not_exists("a");

    let made = engine().execute(append(true)).await.unwrap();
    assert_eq!(made.outcome, Outcome::Succeeded);
    assert_eq!(tree.read("a/b/c/motd"), "Authorized use only\n");
}

#[rstest]
#[case::file("victim", false)]
#[case::empty_dir("victim", true)]
#[tokio::test]
async fn test_absent_removes_entries(#[case] name: &str, #[case] dir: bool) {
    let tree = TestTree::new();
    let target = if dir {
        tree.mkdir(name)
    } else {
        tree.write(name, "doomed\n")
    };

    let result = engine()
        .execute(StateRequest::new(StateKind::Absent, &target))
        .await
        .unwrap();

    assert_eq!(result.outcome, Outcome::Succeeded);
    assert_eq!(result.changes["removed"], target.display().to_string());
    tree.assert_not_exists(name);
}

#[cfg(unix)]
#[tokio::test]
async fn test_absent_removes_symlink_not_its_target() {
    let tree = TestTree::new();
    tree.write("real", "keep\n");
    let link = tree.symlink("link", tree.path("real"));

    engine()
        .execute(StateRequest::new(StateKind::Absent, &link))
        .await
        .unwrap();

    assert!(fs::symlink_metadata(&link).is_err());
    tree.assert_file_contains("real", "keep");
}

#[tokio::test]
async fn test_absent_missing_path_is_noop() {
    let tree = TestTree::new();

    let result = engine()
        .execute(StateRequest::new(StateKind::Absent, tree.path("never")))
        .await
        .unwrap();

    assert_eq!(result.outcome, Outcome::Succeeded);
    assert!(result.changes.is_empty());
}

#[tokio::test]
async fn test_recurse_from_file_root_and_remove() {
    let tree = TestTree::new();
    let target = tree.path("grail");
    let recurse = || StateRequest::new(StateKind::Recurse, &target).with_param("source", "fs://grail");

    let result = engine().execute(recurse()).await.unwrap();
    assert_eq!(result.outcome, Outcome::Succeeded);
    assert_eq!(
        tree.read("grail/36/scene"),
        fs::read_to_string(file_root().join("grail/36/scene")).unwrap()
    );
    assert_eq!(
        tree.listing(),
        vec!["grail", "grail/36", "grail/36/scene", "grail/scene33"]
    );

    let again = engine().execute(recurse()).await.unwrap();
    assert!(again.changes.is_empty());

    let removed = engine()
        .execute(StateRequest::new(StateKind::Absent, &target))
        .await
        .unwrap();
    assert_eq!(removed.outcome, Outcome::Succeeded);
    assert_eq!(tree.listing(), Vec::<String>::new());
}

#[tokio::test]
async fn test_managed_from_file_root_with_source_hash() {
    let tree = TestTree::new();
    let target = tree.path("scene33");
    let expected = fs::read(file_root().join("grail/scene33")).unwrap();
    let managed = |hash: String| {
        StateRequest::new(StateKind::Managed, &target)
            .with_param("source", "fs://grail/scene33")
            .with_param("source_hash", hash)
    };

    let wrong = format!("md5={}", HashAlgorithm::Md5.digest(b"something else"));
    let failed = engine().execute(managed(wrong)).await.unwrap();
    assert_eq!(failed.outcome, Outcome::Failed);
    assert!(failed.comment.starts_with("Source hash mismatch"));
    tree.assert_not_exists("scene33");

    let right = format!("sha256={}", HashAlgorithm::Sha256.digest(&expected));
    let written = engine().execute(managed(right.clone())).await.unwrap();
    assert_eq!(written.outcome, Outcome::Succeeded);
    assert_eq!(fs::read(&target).unwrap(), expected);

    let again = engine().execute(managed(right)).await.unwrap();
    assert!(again.changes.is_empty());
}

#[tokio::test]
async fn test_state_file_end_to_end() {
    let tree = TestTree::new();
    tree.write("conf/app.conf", "debug = true\nport = 80\n");
    let states = tree.write(
        "states.yaml",
        format!(
            "state:\n\
             \x20 - kind: directory\n\
             \x20   name: {root}/www\n\
             \x20 - kind: file.managed\n\
             \x20   name: {root}/www/scene\n\
             \x20   source: fs://grail/36/scene\n\
             \x20 - kind: comment\n\
             \x20   name: {root}/conf/app.conf\n\
             \x20   regex: ^debug\n\
             \x20 - kind: touch\n\
             \x20   name: {root}/www/.stamp\n",
            root = tree.root().display()
        ),
    );

    let file = StateFile::load(&states).unwrap();
    let results = file.run(&engine(), false).await;

    assert_eq!(results.len(), 4);
    for (id, result) in &results {
        assert_eq!(result.outcome, Outcome::Succeeded, "{id}: {}", result.comment);
    }
    tree.assert_file_contains("www/scene", "ARTHUR: Old woman!");
    assert_eq!(tree.read("conf/app.conf"), "#debug = true\nport = 80\n");
    tree.assert_exists("www/.stamp");

    // A dry run of the same file now has nothing to do except touch
    let rerun = file.run(&engine(), true).await;
    let pending: Vec<_> = rerun
        .iter()
        .filter(|(_, result)| result.outcome == Outcome::WouldChange)
        .map(|(id, _)| id.as_str())
        .collect();
    assert_eq!(pending.len(), 1);
    assert!(pending[0].starts_with("touch:"));
}
