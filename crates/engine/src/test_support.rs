use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use proofline_config::{AnalysisConfig, AnalyzerParams, EngineConfig, SharedConfig};
use proofline_primitives::Finding;

use crate::analyzer::{AnalysisJob, Analyzer};
use crate::engine::{Effect, Engine};
use crate::error::AnalyzerError;
use crate::mutation::{MutationRequest, MutationTicket};
use crate::presentation::{RenderFrame, Renderer};
use crate::zones::NoZones;

/// Flags every occurrence of a fixed set of misspellings.
pub struct TypoAnalyzer {
	typos: Vec<(&'static str, &'static str)>,
	calls: AtomicUsize,
	failing: AtomicBool,
}

impl TypoAnalyzer {
	pub fn new(typos: &[(&'static str, &'static str)]) -> Self {
		Self {
			typos: typos.to_vec(),
			calls: AtomicUsize::new(0),
			failing: AtomicBool::new(false),
		}
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	pub fn fail(&self, failing: bool) {
		self.failing.store(failing, Ordering::SeqCst);
	}
}

impl Default for TypoAnalyzer {
	fn default() -> Self {
		Self::new(&[("Teh", "The"), ("teh", "the"), ("recieve", "receive")])
	}
}

impl Analyzer for TypoAnalyzer {
	fn name(&self) -> &str {
		"typos"
	}

	fn analyze(&self, text: &str, _params: &AnalyzerParams) -> Result<Vec<Finding>, AnalyzerError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		if self.failing.load(Ordering::SeqCst) {
			return Err(AnalyzerError::Failed("scripted failure".into()));
		}
		let chars: Vec<char> = text.chars().collect();
		let mut findings = Vec::new();
		for (typo, fix) in &self.typos {
			let needle: Vec<char> = typo.chars().collect();
			let mut idx = 0;
			while idx + needle.len() <= chars.len() {
				let boundary_before = idx == 0 || !chars[idx - 1].is_alphanumeric();
				let boundary_after = chars.get(idx + needle.len()).is_none_or(|c| !c.is_alphanumeric());
				if boundary_before && boundary_after && chars[idx..idx + needle.len()] == needle[..] {
					findings.push(
						Finding::new(idx..idx + needle.len(), format!("Did you mean \"{fix}\"?"), "spelling", "TYPO")
							.with_suggestions([*fix]),
					);
					idx += needle.len();
				} else {
					idx += 1;
				}
			}
		}
		findings.sort_by_key(|f| f.start);
		Ok(findings)
	}
}

/// Returns the same findings whatever the text.
pub struct FixedAnalyzer(pub Vec<Finding>);

impl Analyzer for FixedAnalyzer {
	fn name(&self) -> &str {
		"fixed"
	}

	fn analyze(&self, _text: &str, _params: &AnalyzerParams) -> Result<Vec<Finding>, AnalyzerError> {
		Ok(self.0.clone())
	}
}

/// Keeps every frame it was handed.
#[derive(Default)]
pub struct RecordingRenderer {
	frames: Mutex<Vec<RenderFrame>>,
}

impl RecordingRenderer {
	pub fn frames(&self) -> Vec<RenderFrame> {
		self.frames.lock().clone()
	}

	pub fn last(&self) -> Option<RenderFrame> {
		self.frames.lock().last().cloned()
	}
}

impl Renderer for RecordingRenderer {
	fn render(&self, frame: &RenderFrame) {
		self.frames.lock().push(frame.clone());
	}
}

pub fn engine_config() -> EngineConfig {
	EngineConfig {
		semantic_debounce_ms: 1_000,
		settle_window_ms: 200,
		mutation_grace_ms: 500,
		..EngineConfig::default()
	}
}

pub fn engine_with(config: AnalysisConfig) -> (Engine, Arc<SharedConfig>) {
	let shared = Arc::new(SharedConfig::new(config));
	let engine = Engine::new(engine_config(), shared.clone(), Arc::new(NoZones));
	(engine, shared)
}

pub fn engine() -> (Engine, Arc<SharedConfig>) {
	engine_with(AnalysisConfig::default())
}

pub fn at(start: Instant, ms: u64) -> Instant {
	start + Duration::from_millis(ms)
}

pub fn jobs(effects: &[Effect]) -> Vec<AnalysisJob> {
	effects
		.iter()
		.filter_map(|e| match e {
			Effect::Analyze(job) => Some(job.clone()),
			_ => None,
		})
		.collect()
}

pub fn frames(effects: &[Effect]) -> Vec<RenderFrame> {
	effects
		.iter()
		.filter_map(|e| match e {
			Effect::Render(frame) => Some(frame.clone()),
			_ => None,
		})
		.collect()
}

pub fn mutation_request(effects: &[Effect]) -> Option<(MutationTicket, MutationRequest)> {
	effects.iter().find_map(|e| match e {
		Effect::Mutate { ticket, request } => Some((*ticket, request.clone())),
		_ => None,
	})
}
