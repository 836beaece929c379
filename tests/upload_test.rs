//! Upload Tests - create vs update, failure isolation, confirmed batches

mod common;

use std::sync::Arc;
use tempfile::TempDir;

use common::{context, write_file, Call, Failure, MockContentApi};
use repomirror::cancel::CancelSignal;
use repomirror::upload::{upload_batch, upload_file, UploadOutcome};

// ===================================================================
// SINGLE FILE
// ===================================================================

#[tokio::test]
async fn test_new_path_is_created_without_revision() {
	let dir = TempDir::new().unwrap();
	let local = write_file(dir.path(), "notes/a.txt", "hello");
	let api = Arc::new(MockContentApi::new());
	let (ctx, _rx) = context(api.clone(), dir.path());

	let outcome = upload_file(api.as_ref(), &ctx.events, &local, "notes/a.txt").await;

	assert!(matches!(outcome, UploadOutcome::Created));
	assert_eq!(api.content("notes/a.txt").unwrap(), b"hello");
	assert_eq!(
		api.calls()[1],
		Call::Put { path: "notes/a.txt".into(), sha: None, message: "Sync: Update notes/a.txt".into() }
	);
}

#[tokio::test]
async fn test_existing_path_is_updated_with_current_revision() {
	let dir = TempDir::new().unwrap();
	let local = write_file(dir.path(), "a.txt", "new");
	let api = Arc::new(MockContentApi::new().with_file("a.txt", b"old"));
	let old_sha = api.sha("a.txt");
	let (ctx, _rx) = context(api.clone(), dir.path());

	let outcome = upload_file(api.as_ref(), &ctx.events, &local, "a.txt").await;

	assert!(matches!(outcome, UploadOutcome::Updated));
	assert_eq!(api.content("a.txt").unwrap(), b"new");
	match &api.calls()[1] {
		Call::Put { sha, .. } => assert_eq!(sha, &old_sha),
		other => panic!("expected put, got {:?}", other),
	}
}

#[tokio::test]
async fn test_unreadable_file_makes_no_request() {
	let dir = TempDir::new().unwrap();
	let api = Arc::new(MockContentApi::new());
	let (ctx, mut rx) = context(api.clone(), dir.path());

	let outcome = upload_file(api.as_ref(), &ctx.events, &dir.path().join("gone.txt"), "gone.txt").await;

	assert!(matches!(outcome, UploadOutcome::ReadFailed { .. }));
	assert!(api.calls().is_empty());
	let logs = common::log_lines(&rx.drain());
	assert!(logs.iter().any(|l| l.contains("Cannot read")));
}

#[tokio::test]
async fn test_failed_lookup_is_treated_as_create() {
	let dir = TempDir::new().unwrap();
	let local = write_file(dir.path(), "a.txt", "x");
	let api = Arc::new(MockContentApi::new().fail_get("a.txt", Failure::Status(500)));
	let (ctx, _rx) = context(api.clone(), dir.path());

	let outcome = upload_file(api.as_ref(), &ctx.events, &local, "a.txt").await;

	assert!(matches!(outcome, UploadOutcome::Created));
}

#[tokio::test]
async fn test_stale_lookup_surfaces_as_conflict() {
	let dir = TempDir::new().unwrap();
	let local = write_file(dir.path(), "a.txt", "x");
	// Lookup fails, so the write goes out without a revision and the store refuses it
	let api = Arc::new(
		MockContentApi::new().with_file("a.txt", b"remote").fail_get("a.txt", Failure::Transport),
	);
	let (ctx, _rx) = context(api.clone(), dir.path());

	let outcome = upload_file(api.as_ref(), &ctx.events, &local, "a.txt").await;

	match outcome {
		UploadOutcome::Failed(e) => assert_eq!(e.class(), "conflict"),
		other => panic!("expected conflict, got {:?}", other),
	}
	assert_eq!(api.content("a.txt").unwrap(), b"remote");
}

#[tokio::test]
async fn test_rejected_write_is_reported_not_propagated() {
	let dir = TempDir::new().unwrap();
	let local = write_file(dir.path(), "a.txt", "x");
	let api = Arc::new(MockContentApi::new().fail_put("a.txt", Failure::Status(403)));
	let (ctx, mut rx) = context(api.clone(), dir.path());

	let outcome = upload_file(api.as_ref(), &ctx.events, &local, "a.txt").await;

	assert!(!outcome.is_success());
	let logs = common::log_lines(&rx.drain());
	assert!(logs.iter().any(|l| l.contains("Upload of 'a.txt' failed (rejected)")));
}

// ===================================================================
// CONFIRMED BATCHES
// ===================================================================

#[tokio::test]
async fn test_batch_uploads_each_file_independently() {
	let dir = TempDir::new().unwrap();
	let paths = vec![
		write_file(dir.path(), "a.txt", "a"),
		write_file(dir.path(), "b.txt", "b"),
		write_file(dir.path(), "c.txt", "c"),
	];
	let api = Arc::new(MockContentApi::new().fail_put("b.txt", Failure::Transport));
	let (ctx, _rx) = context(api.clone(), dir.path());

	let report = upload_batch(&ctx, &CancelSignal::new(), &paths).await;

	assert_eq!(report.uploaded, 2);
	assert_eq!(report.failed, 1);
	assert_eq!(report.skipped, 0);
	assert!(api.content("c.txt").is_some());
}

#[tokio::test]
async fn test_batch_stops_when_cancelled() {
	let dir = TempDir::new().unwrap();
	let paths = vec![
		write_file(dir.path(), "a.txt", "a"),
		write_file(dir.path(), "b.txt", "b"),
		write_file(dir.path(), "c.txt", "c"),
	];
	let cancel = CancelSignal::new();
	let api = Arc::new(MockContentApi::new().cancel_after_puts(1, cancel.clone()));
	let (ctx, mut rx) = context(api.clone(), dir.path());

	let report = upload_batch(&ctx, &cancel, &paths).await;

	assert_eq!(report.uploaded, 1);
	assert_eq!(report.skipped, 2);
	assert_eq!(api.put_paths(), vec!["a.txt".to_string()]);
	let logs = common::log_lines(&rx.drain());
	assert!(logs.iter().any(|l| l == "Batch upload cancelled"));
}

#[tokio::test]
async fn test_batch_ignores_paths_outside_root() {
	let dir = TempDir::new().unwrap();
	let other = TempDir::new().unwrap();
	let outside = write_file(other.path(), "x.txt", "x");
	let api = Arc::new(MockContentApi::new());
	let (ctx, _rx) = context(api.clone(), dir.path());

	let report = upload_batch(&ctx, &CancelSignal::new(), &[outside]).await;

	assert_eq!(report.failed, 1);
	assert!(api.calls().is_empty());
}

// vim: ts=4
