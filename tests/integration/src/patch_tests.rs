//! Patch state driven by the system `patch` program.
//!
//! Tests needing the interpreter return early when it is not installed.

use filestate_core::{Engine, EngineConfig, Error, Outcome, StateKind, StateRequest};
use filestate_fs::HashAlgorithm;
use filestate_test_utils::{TestTree, file_root, patch_available};
use pretty_assertions::assert_eq;

fn engine() -> Engine {
    Engine::new(EngineConfig::default().with_file_root(file_root()))
}

fn patch(target: &std::path::Path, source: &str, expected: &str) -> StateRequest {
    StateRequest::new(StateKind::Patch, target)
        .with_param("source", source)
        .with_param(
            "hash",
            format!("md5={}", HashAlgorithm::Md5.digest(expected.as_bytes())),
        )
}

macro_rules! require_patch {
    () => {
        if !patch_available() {
            eprintln!("skipping: no patch interpreter on PATH");
            return;
        }
    };
}

#[tokio::test]
async fn test_patch_applies_once() {
    require_patch!();
    let tree = TestTree::new();
    let target = tree.write("src.txt", "Hello\n");

    let result = engine()
        .execute(patch(&target, "fs://hello.patch", "Hello world\n"))
        .await
        .unwrap();
    assert_eq!(result.outcome, Outcome::Succeeded, "{}", result.comment);
    assert_eq!(result.comment, "Patch successfully applied");
    assert_eq!(tree.read("src.txt"), "Hello world\n");

    let once = tree.snapshot();
    let again = engine()
        .execute(patch(&target, "fs://hello.patch", "Hello world\n"))
        .await
        .unwrap();
    assert_eq!(again.comment, "Patch is already applied");
    assert_eq!(tree.snapshot(), once);
}

#[tokio::test]
async fn test_patch_dry_run() {
    require_patch!();
    let tree = TestTree::new();
    let target = tree.write("src.txt", "Hello\n");
    let before = tree.snapshot();

    let result = engine()
        .execute(patch(&target, "fs://hello.patch", "Hello world\n").dry_run(true))
        .await
        .unwrap();

    assert_eq!(result.outcome, Outcome::WouldChange);
    assert!(result.changes.contains_key("patch"));
    assert_eq!(tree.snapshot(), before);
}

#[tokio::test]
async fn test_patch_result_hash_mismatch() {
    require_patch!();
    let tree = TestTree::new();
    let target = tree.write("src.txt", "Hello\n");

    let result = engine()
        .execute(patch(&target, "fs://hello_dolly.patch", "Hello world\n"))
        .await
        .unwrap();

    assert_eq!(result.outcome, Outcome::Failed);
    assert_eq!(
        result.comment,
        format!("File {} hash mismatch after patch was applied", target.display())
    );
    assert_eq!(tree.read("src.txt"), "Hello\n");
}

#[tokio::test]
async fn test_patch_that_does_not_apply() {
    require_patch!();
    let tree = TestTree::new();
    let target = tree.write("src.txt", "Goodbye\n");

    let err = engine()
        .execute(patch(&target, "fs://hello.patch", "Hello world\n"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::PatchRejected { .. }), "got {err:?}");
    assert_eq!(tree.read("src.txt"), "Goodbye\n");
}

#[tokio::test]
async fn test_missing_interpreter_is_reported() {
    let tree = TestTree::new();
    let target = tree.write("src.txt", "Hello\n");
    let config = EngineConfig {
        patch_program: tree.path("no-such-patch").display().to_string(),
        ..EngineConfig::default()
    }
    .with_file_root(file_root());

    let result = Engine::new(config)
        .reconcile(patch(&target, "fs://hello.patch", "Hello world\n"))
        .await;

    assert_eq!(result.outcome, Outcome::Failed);
    assert!(result.comment.contains("no-such-patch"), "{}", result.comment);
    assert_eq!(tree.read("src.txt"), "Hello\n");
}
