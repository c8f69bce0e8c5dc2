//! Single-writer orchestration core.
//!
//! [`Engine`] owns all canonical state and is only ever touched through
//! [`Engine::handle`], one event at a time. It never blocks and never spawns:
//! work it wants done comes back as [`Effect`]s, and the results of that work
//! re-enter as events. The [`crate::Coordinator`] provides the serialization
//! in production; tests drive the engine directly with explicit instants.

use std::sync::Arc;
use std::time::{Duration, Instant};

use proofline_config::{AnalysisConfig, ConfigProvider, EngineConfig};
use proofline_primitives::text::char_len;
use proofline_primitives::{Finding, Generation, SurfaceId};
use rustc_hash::FxHashMap;

use crate::analyzer::{AnalysisCompletion, AnalysisJob, AnalysisTier};
use crate::cache::{AnalysisCaches, CacheKey, CacheStats};
use crate::error::MutationError;
use crate::metrics::EngineMetrics;
use crate::mutation::{self, MutationOutcome, MutationRequest, MutationTicket};
use crate::pipeline::{self, DismissalLedger, FilterContext, Rejection, RejectionReason};
use crate::presentation::{Presentation, PresentationState, RenderFrame, SurfaceEvent};
use crate::scheduler::{AnalysisPlan, DueSemantic, EditDecision, EditDiff, Scheduler};
use crate::zones::ZoneProvider;


/// Inputs to the engine.
#[derive(Debug, Clone)]
pub enum EngineEvent {
	/// The observer reported the surface's full text.
	Edit { surface: SurfaceId, text: String },
	Focus { surface: SurfaceId, focused: bool },
	Surface { surface: SurfaceId, event: SurfaceEvent },
	AnalysisFinished(AnalysisCompletion),
	Accept {
		surface: SurfaceId,
		finding: Finding,
		suggestion: String,
		ticket: MutationTicket,
	},
	Dismiss {
		surface: SurfaceId,
		finding: Finding,
		reason: RejectionReason,
	},
	MutationFinished {
		surface: SurfaceId,
		ticket: MutationTicket,
		outcome: MutationOutcome,
	},
	ConfigChanged,
	/// Timer housekeeping: semantic debounces, grace windows, settle windows.
	Tick,
}

/// Work requested by the engine.
#[derive(Debug, Clone)]
pub enum Effect {
	Analyze(AnalysisJob),
	Render(RenderFrame),
	Mutate { ticket: MutationTicket, request: MutationRequest },
	/// Final answer for an accepted suggestion.
	MutationResolved { ticket: MutationTicket, outcome: MutationOutcome },
}

/// What happened to an analysis completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
	/// Became part of the canonical set.
	Applied,
	/// Captured at a superseded generation and dropped.
	Stale,
	/// The analyzer failed; the previous canonical set stays.
	Failed,
}

/// Read-only view of one surface, for handles and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceView {
	pub surface: SurfaceId,
	pub generation: Generation,
	/// Generation the canonical findings are positioned against.
	pub revision: Generation,
	pub text: Option<String>,
	pub findings: Vec<Finding>,
	pub state: PresentationState,
	pub popover: Option<Finding>,
	pub active: bool,
	pub mutation_pending: bool,
	pub in_grace: bool,
}

#[derive(Debug, Clone)]
struct RawFindings {
	generation: Generation,
	findings: Vec<Finding>,
	/// False once carried across an edit: the findings were computed for
	/// other text and say nothing about what the edit introduced.
	analyzed: bool,
}

#[derive(Debug, Clone)]
struct PendingMutation {
	ticket: MutationTicket,
	finding: Finding,
	suggestion: String,
	/// Generation the mutation was computed against.
	revision: Generation,
	/// Generation assigned when the surface reported our edit before the
	/// mutation job returned.
	observed: Option<Generation>,
}

struct SurfaceState {
	canonical: Vec<Finding>,
	revision: Generation,
	fast: Option<RawFindings>,
	slow: Option<RawFindings>,
	/// Settings of the most recent cycle, reused when re-filtering.
	config: Arc<AnalysisConfig>,
	presentation: Presentation,
	mutation: Option<PendingMutation>,
	last_frame: Option<RenderFrame>,
}

impl SurfaceState {
	fn new(settle_window: Duration, config: Arc<AnalysisConfig>) -> Self {
		Self {
			canonical: Vec::new(),
			revision: Generation::ZERO,
			fast: None,
			slow: None,
			config,
			presentation: Presentation::new(settle_window),
			mutation: None,
			last_frame: None,
		}
	}

	fn raw_mut(&mut self, tier: AnalysisTier) -> &mut Option<RawFindings> {
		match tier {
			AnalysisTier::Fast => &mut self.fast,
			AnalysisTier::Slow => &mut self.slow,
		}
	}

	/// Moves every finding across an edit. Findings the edit touched are gone.
	fn carry_over(&mut self, diff: Option<&EditDiff>, generation: Generation) {
		if let Some(diff) = diff {
			let translate = |findings: &mut Vec<Finding>| {
				*findings = findings.iter().filter_map(|f| diff.translate(f)).collect();
			};
			translate(&mut self.canonical);
			for raw in [&mut self.fast, &mut self.slow].into_iter().flatten() {
				translate(&mut raw.findings);
			}
		}
		self.revision = generation;
		for raw in [&mut self.fast, &mut self.slow].into_iter().flatten() {
			raw.generation = generation;
			raw.analyzed = false;
		}
	}
}

/// The orchestration core. See the module docs.
pub struct Engine {
	config: EngineConfig,
	provider: Arc<dyn ConfigProvider>,
	zones: Arc<dyn ZoneProvider>,
	scheduler: Scheduler,
	caches: AnalysisCaches,
	surfaces: FxHashMap<SurfaceId, SurfaceState>,
	active: Option<SurfaceId>,
	dismissals: DismissalLedger,
	metrics: Arc<EngineMetrics>,
}

impl Engine {
	pub fn new(config: EngineConfig, provider: Arc<dyn ConfigProvider>, zones: Arc<dyn ZoneProvider>) -> Self {
		Self {
			scheduler: Scheduler::new(&config),
			caches: AnalysisCaches::new(&config.fast_cache, &config.slow_cache),
			config,
			provider,
			zones,
			surfaces: FxHashMap::default(),
			active: None,
			dismissals: DismissalLedger::default(),
			metrics: Arc::new(EngineMetrics::new()),
		}
	}

	pub fn metrics(&self) -> Arc<EngineMetrics> {
		Arc::clone(&self.metrics)
	}

	pub fn active(&self) -> Option<SurfaceId> {
		self.active
	}

	pub fn dismissals(&self) -> &[Rejection] {
		self.dismissals.rejections()
	}

	pub fn cache_stats(&self, tier: AnalysisTier) -> CacheStats {
		match tier {
			AnalysisTier::Fast => self.caches.fast.stats(),
			AnalysisTier::Slow => self.caches.slow.stats(),
		}
	}

	/// Processes one event and returns the work it produced.
	pub fn handle(&mut self, event: EngineEvent, now: Instant) -> Vec<Effect> {
		let mut fx = Vec::new();
		match event {
			EngineEvent::Edit { surface, text } => self.on_edit(surface, &text, now, &mut fx),
			EngineEvent::Focus { surface, focused } => self.on_focus(surface, focused, &mut fx),
			EngineEvent::Surface { surface, event } => self.on_surface(surface, event, now, &mut fx),
			EngineEvent::AnalysisFinished(completion) => {
				self.on_analysis(completion, now, &mut fx);
			}
			EngineEvent::Accept {
				surface,
				finding,
				suggestion,
				ticket,
			} => self.on_accept(surface, &finding, suggestion, ticket, &mut fx),
			EngineEvent::Dismiss { surface, finding, reason } => self.on_dismiss(surface, &finding, reason, &mut fx),
			EngineEvent::MutationFinished { surface, ticket, outcome } => self.on_mutation_finished(surface, ticket, outcome, now, &mut fx),
			EngineEvent::ConfigChanged => self.on_config_changed(now, &mut fx),
			EngineEvent::Tick => self.on_tick(now, &mut fx),
		}
		fx
	}

	pub fn view(&self, surface: SurfaceId, now: Instant) -> Option<SurfaceView> {
		let state = self.surfaces.get(&surface)?;
		Some(SurfaceView {
			surface,
			generation: self.scheduler.generation(surface),
			revision: state.revision,
			text: self.scheduler.text(surface).map(|t| t.to_string()),
			findings: state.canonical.clone(),
			state: state.presentation.state(),
			popover: state.presentation.popover().cloned(),
			active: self.active == Some(surface),
			mutation_pending: state.mutation.is_some(),
			in_grace: self.scheduler.grace_since(surface, now).is_some(),
		})
	}

	pub fn presentation_state(&self, surface: SurfaceId) -> Option<PresentationState> {
		self.surfaces.get(&surface).map(|s| s.presentation.state())
	}

	/// True when no semantic timer, mutation or transient suppression is
	/// pending. Analysis jobs in flight are tracked by the caller.
	pub fn is_quiescent(&self) -> bool {
		self.scheduler.next_semantic_due().is_none()
			&& self
				.surfaces
				.values()
				.all(|s| s.mutation.is_none() && s.presentation.settle_deadline().is_none())
	}

	fn state_mut(&mut self, surface: SurfaceId) -> &mut SurfaceState {
		let settle = self.config.settle_window();
		let provider = &self.provider;
		self.surfaces
			.entry(surface)
			.or_insert_with(|| SurfaceState::new(settle, provider.analysis()))
	}

	fn on_edit(&mut self, surface: SurfaceId, text: &str, now: Instant, fx: &mut Vec<Effect>) {
		self.activate(surface, fx);
		let config = self.provider.analysis();
		match self.scheduler.on_edit(surface, text, &config.semantic, now) {
			EditDecision::Unchanged => self.metrics.inc_unchanged(),
			EditDecision::SelfInflicted { generation } => {
				self.metrics.inc_self_inflicted();
				if let Some(pending) = self.state_mut(surface).mutation.as_mut() {
					pending.observed = Some(generation);
				}
			}
			EditDecision::Analyze(plan) => {
				self.metrics.inc_edit();
				self.start_cycle(plan, config, now, fx);
			}
		}
	}

	/// Carries existing findings over to the new generation, then dispatches
	/// fast analysis or serves it from cache.
	fn start_cycle(&mut self, plan: AnalysisPlan, config: Arc<AnalysisConfig>, now: Instant, fx: &mut Vec<Effect>) {
		let surface = plan.surface;
		let active = self.active == Some(surface);
		let state = self.state_mut(surface);
		state.carry_over(plan.diff.as_ref(), plan.generation);
		if active {
			state.presentation.findings_updated(&state.canonical);
		}
		self.push_frame(surface, fx);

		let params = config.analyzer_params();
		let job = AnalysisJob {
			surface,
			tier: AnalysisTier::Fast,
			generation: plan.generation,
			key: CacheKey::new(&plan.text, params.fingerprint()),
			text: plan.text,
			params,
			config,
		};
		tracing::debug!(%surface, generation = %job.generation, class = plan.class.as_str(), "engine.cycle.started");
		self.dispatch(job, now, fx);
	}

	fn dispatch(&mut self, job: AnalysisJob, now: Instant, fx: &mut Vec<Effect>) {
		let cached = self.caches.tier(job.tier).get_at(&job.key, now).cloned();
		self.metrics.inc_cache(cached.is_some());
		match cached {
			Some(findings) => {
				tracing::debug!(surface = %job.surface, tier = job.tier.as_str(), "engine.cache.hit");
				let mut completion = job.complete(Ok(findings), Duration::ZERO);
				completion.from_cache = true;
				self.on_analysis(completion, now, fx);
			}
			None => {
				self.metrics.inc_dispatched(job.tier);
				fx.push(Effect::Analyze(job));
			}
		}
	}

	fn dispatch_semantic(&mut self, due: DueSemantic, now: Instant, fx: &mut Vec<Effect>) {
		let config = self.provider.analysis();
		let params = config.analyzer_params();
		let job = AnalysisJob {
			surface: due.surface,
			tier: AnalysisTier::Slow,
			generation: due.generation,
			key: CacheKey::new(&due.text, params.fingerprint()),
			text: due.text,
			params,
			config,
		};
		self.dispatch(job, now, fx);
	}

	/// Validates a completion against the current generation and, if it is
	/// still current, folds it into the canonical set.
	pub fn on_analysis(&mut self, completion: AnalysisCompletion, now: Instant, fx: &mut Vec<Effect>) -> Completion {
		let AnalysisCompletion {
			surface,
			tier,
			generation,
			key,
			config,
			result,
			elapsed,
			from_cache,
		} = completion;

		if !self.scheduler.is_current(surface, generation) {
			// Results for text that predates our own mutation are counted apart.
			if self.scheduler.grace_since(surface, now).is_some_and(|since| generation < since) {
				self.metrics.inc_grace_discarded();
			}
			self.metrics.inc_stale();
			tracing::debug!(
				%surface,
				tier = tier.as_str(),
				%generation,
				current = %self.scheduler.generation(surface),
				"engine.analysis.stale"
			);
			return Completion::Stale;
		}

		let findings = match result {
			Ok(findings) => findings,
			Err(error) => {
				self.metrics.inc_analyzer_failure();
				tracing::warn!(%surface, tier = tier.as_str(), %error, "engine.analysis.failed");
				return Completion::Failed;
			}
		};

		tracing::debug!(
			%surface,
			tier = tier.as_str(),
			%generation,
			raw = findings.len(),
			elapsed_ms = elapsed.as_millis() as u64,
			"engine.analysis.completed"
		);
		if !from_cache {
			self.caches.tier(tier).put_at(key, findings.clone(), now);
		}
		let state = self.state_mut(surface);
		*state.raw_mut(tier) = Some(RawFindings {
			generation,
			findings,
			analyzed: true,
		});
		state.config = config;
		self.refresh(surface, fx);
		Completion::Applied
	}

	/// Rebuilds the canonical set from the current raw findings.
	fn refresh(&mut self, surface: SurfaceId, fx: &mut Vec<Effect>) {
		let active = self.active == Some(surface);
		let Some(snapshot) = self.scheduler.snapshot(surface) else {
			return;
		};
		let Some(state) = self.surfaces.get_mut(&surface) else {
			return;
		};

		let revision = snapshot.revision;
		fn current(raw: &Option<RawFindings>, revision: Generation) -> Option<&[Finding]> {
			raw.as_ref()
				.filter(|r| r.generation == revision)
				.map(|r| r.findings.as_slice())
		}
		let merged = pipeline::merge(current(&state.fast, revision), current(&state.slow, revision));
		let zones = self.zones.zones(surface, snapshot);
		let ctx = FilterContext {
			config: &state.config,
			snapshot,
			zones: &zones,
			dismissals: &self.dismissals,
		};
		let (findings, report) = pipeline::run(merged, &ctx);
		self.metrics.add_invalid_ranges(report.invalid_range);
		tracing::debug!(
			%surface,
			%revision,
			input = report.input,
			output = report.output,
			overlapping = report.overlapping,
			duplicates = report.duplicates,
			ignored = report.ignored_rule + report.ignored_text,
			excluded = report.excluded,
			foreign = report.foreign_language,
			invalid = report.invalid_range,
			"engine.findings.updated"
		);

		state.canonical = findings;
		state.revision = revision;
		if active {
			state.presentation.findings_updated(&state.canonical);
		}
		self.push_frame(surface, fx);
	}

	/// Emits a render effect if the frame differs from the last one sent.
	fn push_frame(&mut self, surface: SurfaceId, fx: &mut Vec<Effect>) {
		let Some(state) = self.surfaces.get_mut(&surface) else {
			return;
		};
		let frame = state.presentation.frame(surface, &state.canonical);
		if state.last_frame.as_ref() == Some(&frame) {
			return;
		}
		state.last_frame = Some(frame.clone());
		fx.push(Effect::Render(frame));
	}

	fn activate(&mut self, surface: SurfaceId, fx: &mut Vec<Effect>) {
		if self.active == Some(surface) {
			return;
		}
		if let Some(previous) = self.active.replace(surface) {
			self.deactivate(previous, fx);
		}
		tracing::debug!(%surface, "engine.surface.activated");
	}

	fn deactivate(&mut self, surface: SurfaceId, fx: &mut Vec<Effect>) {
		self.scheduler.cancel_debounce(surface);
		if let Some(state) = self.surfaces.get_mut(&surface) {
			state.presentation.deactivate();
		}
		tracing::debug!(%surface, "engine.surface.deactivated");
		self.push_frame(surface, fx);
	}

	fn on_focus(&mut self, surface: SurfaceId, focused: bool, fx: &mut Vec<Effect>) {
		if focused {
			self.activate(surface, fx);
			let state = self.state_mut(surface);
			state.presentation.findings_updated(&state.canonical);
			self.push_frame(surface, fx);
		} else if self.active == Some(surface) {
			self.active = None;
			self.deactivate(surface, fx);
		}
	}

	fn on_surface(&mut self, surface: SurfaceId, event: SurfaceEvent, now: Instant, fx: &mut Vec<Effect>) {
		let state = self.state_mut(surface);
		if let SurfaceEvent::Hover(finding) | SurfaceEvent::Click(finding) = &event
			&& !state.canonical.iter().any(|f| f.same_report(finding))
		{
			tracing::trace!(%surface, "engine.popover.unknown_finding");
			return;
		}
		let changed = state.presentation.on_event(&event, now);
		match event {
			SurfaceEvent::Unavailable if changed => tracing::warn!(%surface, "engine.surface.unavailable"),
			SurfaceEvent::Available if changed => {
				tracing::info!(%surface, "engine.surface.available");
				state.presentation.findings_updated(&state.canonical);
			}
			_ => {}
		}
		self.push_frame(surface, fx);
	}

	fn on_accept(&mut self, surface: SurfaceId, finding: &Finding, suggestion: String, ticket: MutationTicket, fx: &mut Vec<Effect>) {
		match self.prepare_mutation(surface, finding, suggestion, ticket) {
			Ok(request) => {
				tracing::debug!(%surface, ticket = ticket.0, rule = %request.finding.rule_id, "engine.mutation.requested");
				fx.push(Effect::Mutate { ticket, request });
			}
			Err(error) => {
				tracing::debug!(%surface, ticket = ticket.0, %error, "engine.mutation.rejected");
				fx.push(Effect::MutationResolved { ticket, outcome: Err(error) });
			}
		}
		self.push_frame(surface, fx);
	}

	fn prepare_mutation(
		&mut self,
		surface: SurfaceId,
		finding: &Finding,
		suggestion: String,
		ticket: MutationTicket,
	) -> Result<MutationRequest, MutationError> {
		let current = self.scheduler.generation(surface);
		let state = self.surfaces.get_mut(&surface).ok_or(MutationError::UnknownFinding)?;
		if state.mutation.is_some() {
			return Err(MutationError::Busy);
		}
		let finding = state
			.canonical
			.iter()
			.find(|f| f.same_report(finding))
			.cloned()
			.ok_or(MutationError::UnknownFinding)?;
		let stale = MutationError::StaleFinding {
			finding_revision: state.revision,
			current,
		};
		if state.revision != current {
			return Err(stale);
		}
		let snapshot = self
			.scheduler
			.snapshot(surface)
			.filter(|s| s.revision == current)
			.ok_or(stale)?;
		let invalid = MutationError::InvalidRange {
			start: finding.start,
			end: finding.end,
		};
		let original = snapshot.slice(finding.range()).ok_or(invalid)?;
		let mut expected = snapshot.content.clone();
		expected.remove(finding.range());
		expected.insert(finding.start, &suggestion);
		let expected: Arc<str> = Arc::from(expected.to_string());

		state.presentation.close_popover();
		state.mutation = Some(PendingMutation {
			ticket,
			finding: finding.clone(),
			suggestion: suggestion.clone(),
			revision: current,
			observed: None,
		});
		self.scheduler.expect_self_edit(surface, expected);

		Ok(MutationRequest {
			surface,
			finding,
			suggestion,
			original,
		})
	}

	fn on_mutation_finished(&mut self, surface: SurfaceId, ticket: MutationTicket, outcome: MutationOutcome, now: Instant, fx: &mut Vec<Effect>) {
		let pending = self
			.surfaces
			.get_mut(&surface)
			.and_then(|state| state.mutation.take_if(|p| p.ticket == ticket));
		let Some(pending) = pending else {
			tracing::warn!(%surface, ticket = ticket.0, "engine.mutation.unknown_ticket");
			return;
		};

		match &outcome {
			Ok(applied) => {
				self.metrics.inc_mutation(true);
				tracing::info!(%surface, ticket = ticket.0, strategy = applied.strategy.as_str(), "engine.mutation.applied");
				self.land_mutation(surface, pending, now, fx);
			}
			Err(error) => {
				self.metrics.inc_mutation(false);
				tracing::warn!(%surface, ticket = ticket.0, %error, "engine.mutation.failed");
				self.scheduler.clear_self_edit(surface);
				if matches!(error, MutationError::Surface(_)) {
					self.state_mut(surface).presentation.surface_unavailable();
				}
				if pending.observed.is_some() {
					// The surface changed even though the chain reported failure.
					self.reanalyze(surface, now, fx);
				}
				self.push_frame(surface, fx);
			}
		}
		fx.push(Effect::MutationResolved { ticket, outcome });
	}

	/// Patches local state with a mutation the surface accepted.
	fn land_mutation(&mut self, surface: SurfaceId, pending: PendingMutation, now: Instant, fx: &mut Vec<Effect>) {
		let current = self.scheduler.generation(surface);
		if current != pending.revision && Some(current) != pending.observed {
			// The user edited in between; the observer will report the combined text.
			tracing::debug!(%surface, "engine.mutation.superseded");
			self.scheduler.clear_self_edit(surface);
			return;
		}

		let Some(generation) = self.scheduler.apply_self_edit(
			surface,
			pending.finding.range(),
			&pending.suggestion,
			self.config.mutation_grace(),
			now,
		) else {
			tracing::warn!(%surface, "engine.mutation.unpatchable");
			self.scheduler.clear_self_edit(surface);
			return;
		};

		let replacement_len = char_len(&pending.suggestion);
		let active = self.active == Some(surface);
		let Some(state) = self.surfaces.get_mut(&surface) else {
			return;
		};
		mutation::reconcile(&mut state.canonical, &pending.finding, replacement_len);
		state.revision = generation;
		for raw in [&mut state.fast, &mut state.slow].into_iter().flatten() {
			mutation::reconcile(&mut raw.findings, &pending.finding, replacement_len);
			raw.generation = generation;
		}

		// Only findings computed for the pre-mutation text describe the
		// patched text; carried-over ones may miss what the last edit added.
		if let Some(snapshot) = self.scheduler.snapshot(surface) {
			let key = CacheKey::for_rope(&snapshot.content, state.config.analyzer_params().fingerprint());
			if let Some(raw) = state.fast.as_ref().filter(|r| r.analyzed) {
				self.caches.fast.put_at(key, raw.findings.clone(), now);
			}
			if let Some(raw) = state.slow.as_ref().filter(|r| r.analyzed) {
				self.caches.slow.put_at(key, raw.findings.clone(), now);
			}
		}
		let needs_fast = !state.fast.as_ref().is_some_and(|r| r.analyzed);
		let config = Arc::clone(&state.config);

		if active {
			state.presentation.findings_updated(&state.canonical);
		}
		tracing::debug!(%surface, %generation, remaining = state.canonical.len(), needs_fast, "engine.mutation.patched");
		self.push_frame(surface, fx);

		if needs_fast && let Some(text) = self.scheduler.text(surface).cloned() {
			let params = config.analyzer_params();
			let job = AnalysisJob {
				surface,
				tier: AnalysisTier::Fast,
				generation,
				key: CacheKey::new(&text, params.fingerprint()),
				text,
				params,
				config,
			};
			self.dispatch(job, now, fx);
		}
	}

	fn on_dismiss(&mut self, surface: SurfaceId, finding: &Finding, reason: RejectionReason, fx: &mut Vec<Effect>) {
		let text = self.scheduler.snapshot(surface).and_then(|s| s.slice(finding.range()));
		let Some(state) = self.surfaces.get_mut(&surface) else {
			return;
		};
		let Some(position) = state.canonical.iter().position(|f| f.same_report(finding)) else {
			tracing::debug!(%surface, "engine.dismiss.unknown_finding");
			return;
		};
		let removed = state.canonical.remove(position);
		state.presentation.close_popover();
		if let Some(text) = text {
			self.dismissals.record(Rejection {
				rule_id: removed.rule_id,
				text,
				reason,
			});
		}
		self.refresh(surface, fx);
	}

	fn reanalyze(&mut self, surface: SurfaceId, now: Instant, fx: &mut Vec<Effect>) {
		let config = self.provider.analysis();
		if let Some(plan) = self.scheduler.replan(surface, &config.semantic, now) {
			self.start_cycle(plan, config, now, fx);
		}
	}

	fn on_config_changed(&mut self, now: Instant, fx: &mut Vec<Effect>) {
		self.caches.clear();
		tracing::info!("engine.config.changed");
		if let Some(surface) = self.active {
			self.reanalyze(surface, now, fx);
		}
	}

	fn on_tick(&mut self, now: Instant, fx: &mut Vec<Effect>) {
		for due in self.scheduler.due_semantic(now) {
			self.dispatch_semantic(due, now, fx);
		}
		self.scheduler.expire_grace(now);

		let mut settled: Vec<SurfaceId> = self
			.surfaces
			.iter_mut()
			.filter_map(|(&surface, state)| state.presentation.tick(now).then_some(surface))
			.collect();
		settled.sort();
		for surface in settled {
			self.push_frame(surface, fx);
		}
	}
}
