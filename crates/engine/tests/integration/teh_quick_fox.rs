use std::time::Duration;

use proofline_engine::{PresentationState, SurfaceCapabilities};
use proofline_primitives::text::char_slice;

use crate::common::{SURFACE, spawn, wait_until};

const TEXT: &str = "Teh quick brown fox jumps over the dog.";

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn typo_is_flagged_and_fixed_without_reanalysis() {
	let h = spawn(TEXT, SurfaceCapabilities::FULL);
	h.handle.edit(SURFACE, TEXT).unwrap();
	h.handle.settled().await.unwrap();

	let view = h.handle.view(SURFACE).await.unwrap().unwrap();
	let ranges: Vec<_> = view.findings.iter().map(|f| (f.rule_id.as_str(), f.range())).collect();
	assert_eq!(ranges, vec![("TABLE", 0..3), ("TABLE", 4..9)]);
	assert_eq!(view.state, PresentationState::Displaying);
	assert!(h.renderer.last().is_some_and(|frame| frame.findings.len() == 2));

	let teh = view.findings[0].clone();
	let applied = h.handle.accept(SURFACE, teh, "The").await.unwrap();
	assert!(applied.is_ok());
	assert_eq!(h.backend.text(SURFACE).as_deref(), Some("The quick brown fox jumps over the dog."));

	let view = h.handle.view(SURFACE).await.unwrap().unwrap();
	assert_eq!(view.findings.len(), 1);
	assert_eq!(view.findings[0].range(), 4..9);
	assert!(view.in_grace);

	// The observer echoes the edit; nothing is analyzed again.
	h.observe();
	h.handle.settled().await.unwrap();
	assert_eq!(h.fast.calls(), 1);
	assert_eq!(h.slow.calls(), 1);
	let metrics = h.handle.metrics();
	assert_eq!(metrics.mutations_applied, 1);
	assert_eq!(metrics.edits_accepted, 1);

	h.handle.shutdown();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn longer_replacement_shifts_later_findings() {
	let text = "Teh fxo jumps.";
	let h = spawn(text, SurfaceCapabilities::FULL);
	h.handle.edit(SURFACE, text).unwrap();
	h.handle.settled().await.unwrap();

	let view = h.handle.view(SURFACE).await.unwrap().unwrap();
	assert_eq!(view.findings.len(), 2);
	h.handle.accept(SURFACE, view.findings[0].clone(), "That").await.unwrap().unwrap();

	let view = h.handle.view(SURFACE).await.unwrap().unwrap();
	let current = h.backend.text(SURFACE).unwrap();
	assert_eq!(current, "That fxo jumps.");
	assert_eq!(view.findings.len(), 1);
	assert_eq!(char_slice(&current, view.findings[0].range()), Some("fxo"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn typing_after_a_fix_is_analyzed_normally() {
	let h = spawn(TEXT, SurfaceCapabilities::FULL);
	h.handle.edit(SURFACE, TEXT).unwrap();
	h.handle.settled().await.unwrap();

	let teh = h.handle.view(SURFACE).await.unwrap().unwrap().findings[0].clone();
	h.handle.accept(SURFACE, teh, "The").await.unwrap().unwrap();
	h.observe();

	h.handle.edit(SURFACE, "The quick brown fxo jumps over the dog.").unwrap();
	let handle = h.handle.clone();
	let flagged = wait_until(Duration::from_secs(2), || {
		let handle = handle.clone();
		async move {
			let view = handle.view(SURFACE).await.ok().flatten();
			view.is_some_and(|v| v.findings.iter().any(|f| f.range() == (16..19)))
		}
	})
	.await;
	assert!(flagged);
	assert_eq!(h.fast.calls(), 2);
}
