//! Shared fixtures for coordinator integration tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use proofline_config::{AnalysisConfig, AnalyzerParams, EngineConfig, MutationTimingConfig, SharedConfig};
use proofline_engine::{
	Analyzer, AnalyzerError, Coordinator, CoordinatorDeps, CoordinatorHandle, MemoryBackend, NoZones, RenderFrame, Renderer, SurfaceCapabilities,
};
use proofline_primitives::{Finding, SurfaceId};

pub const SURFACE: SurfaceId = SurfaceId(42);

/// Flags whole words found in a fixed table.
pub struct TableAnalyzer {
	table: Vec<(&'static str, &'static str)>,
	calls: AtomicUsize,
}

impl TableAnalyzer {
	pub fn new(table: &[(&'static str, &'static str)]) -> Self {
		Self {
			table: table.to_vec(),
			calls: AtomicUsize::new(0),
		}
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

impl Analyzer for TableAnalyzer {
	fn name(&self) -> &str {
		"table"
	}

	fn analyze(&self, text: &str, _params: &AnalyzerParams) -> Result<Vec<Finding>, AnalyzerError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		let mut findings = Vec::new();
		let mut offset = 0;
		for word in text.split(' ') {
			let len = word.chars().count();
			let bare = word.trim_end_matches(['.', ',', '!', '?']);
			if let Some((_, fix)) = self.table.iter().find(|(typo, _)| *typo == bare) {
				let end = offset + bare.chars().count();
				findings.push(Finding::new(offset..end, format!("Did you mean \"{fix}\"?"), "spelling", "TABLE").with_suggestions([*fix]));
			}
			offset += len + 1;
		}
		Ok(findings)
	}
}

#[derive(Default)]
pub struct RecordingRenderer {
	frames: Mutex<Vec<RenderFrame>>,
}

impl RecordingRenderer {
	pub fn last(&self) -> Option<RenderFrame> {
		self.frames.lock().last().cloned()
	}
}

impl Renderer for RecordingRenderer {
	fn render(&self, frame: &RenderFrame) {
		self.frames.lock().push(frame.clone());
	}
}

pub struct Harness {
	pub handle: CoordinatorHandle,
	pub backend: Arc<MemoryBackend>,
	pub fast: Arc<TableAnalyzer>,
	pub slow: Arc<TableAnalyzer>,
	pub renderer: Arc<RecordingRenderer>,
}

impl Harness {
	/// Current text of the in-memory surface, as an observer would report it.
	pub fn observe(&self) {
		if let Some(text) = self.backend.text(SURFACE) {
			let _ = self.handle.edit(SURFACE, text);
		}
	}
}

pub fn engine_config() -> EngineConfig {
	EngineConfig {
		semantic_debounce_ms: 100,
		settle_window_ms: 50,
		geometry_poll_ms: 10,
		mutation_grace_ms: 200,
		mutation: MutationTimingConfig::ZERO,
		..EngineConfig::default()
	}
}

pub fn spawn(text: &str, caps: SurfaceCapabilities) -> Harness {
	let _ = tracing_subscriber::fmt::try_init();
	let backend = Arc::new(MemoryBackend::new());
	backend.add_surface(SURFACE, text, caps);
	let fast = Arc::new(TableAnalyzer::new(&[("Teh", "The"), ("fxo", "fox")]));
	let slow = Arc::new(TableAnalyzer::new(&[("quick", "fast")]));
	let renderer = Arc::new(RecordingRenderer::default());
	let deps = CoordinatorDeps {
		fast: fast.clone(),
		slow: slow.clone(),
		renderer: renderer.clone(),
		backend: backend.clone(),
		config: Arc::new(SharedConfig::new(AnalysisConfig::default())),
		zones: Arc::new(NoZones),
		probe: None,
	};
	Harness {
		handle: Coordinator::spawn(deps, engine_config()),
		backend,
		fast,
		slow,
		renderer,
	}
}

/// Polls `f` every 10ms until it returns true or `timeout` elapses.
pub async fn wait_until<F, Fut>(timeout: Duration, mut f: F) -> bool
where
	F: FnMut() -> Fut,
	Fut: std::future::Future<Output = bool>,
{
	let start = std::time::Instant::now();
	while start.elapsed() < timeout {
		if f().await {
			return true;
		}
		tokio::time::sleep(Duration::from_millis(10)).await;
	}
	false
}
