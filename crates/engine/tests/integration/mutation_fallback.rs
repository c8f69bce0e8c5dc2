use proofline_engine::mutation::{StrategyAttempt, StrategyKind};
use proofline_engine::{MutationBackend, MutationError, SurfaceCapabilities};

use crate::common::{SURFACE, spawn};

const TEXT: &str = "Teh fox.";

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn clipboard_paste_is_used_when_ranges_are_unsupported() {
	let caps = SurfaceCapabilities {
		range_replace: false,
		..SurfaceCapabilities::FULL
	};
	let h = spawn(TEXT, caps);
	h.backend.set_clipboard(Some("user data")).unwrap();
	h.handle.edit(SURFACE, TEXT).unwrap();
	h.handle.settled().await.unwrap();

	let teh = h.handle.view(SURFACE).await.unwrap().unwrap().findings[0].clone();
	let applied = h.handle.accept(SURFACE, teh, "The").await.unwrap().unwrap();

	assert_eq!(applied.strategy, StrategyKind::ClipboardPaste);
	assert!(matches!(
		applied.attempts.as_slice(),
		[StrategyAttempt::Skipped {
			strategy: StrategyKind::DirectReplace,
			..
		}]
	));
	assert_eq!(h.backend.text(SURFACE).as_deref(), Some("The fox."));
	assert_eq!(h.backend.clipboard_contents().as_deref(), Some("user data"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn exhausted_chain_leaves_everything_unchanged() {
	let h = spawn(TEXT, SurfaceCapabilities::default());
	h.handle.edit(SURFACE, TEXT).unwrap();
	h.handle.settled().await.unwrap();

	let before = h.handle.view(SURFACE).await.unwrap().unwrap();
	let outcome = h.handle.accept(SURFACE, before.findings[0].clone(), "The").await.unwrap();

	let Err(MutationError::AllStrategiesFailed { attempts }) = outcome else {
		panic!("expected every strategy to fail");
	};
	assert_eq!(attempts.len(), 3);
	assert_eq!(h.backend.text(SURFACE).as_deref(), Some(TEXT));

	let after = h.handle.view(SURFACE).await.unwrap().unwrap();
	assert_eq!(after.findings, before.findings);
	assert_eq!(after.generation, before.generation);
	assert!(!after.mutation_pending);
	assert_eq!(h.handle.metrics().mutations_failed, 1);
}
