//! Edit intake and analysis scheduling.
//!
//! The scheduler owns everything that is keyed by "what text does this
//! surface hold right now": the last known text, the current snapshot and
//! generation, the semantic debounce timer and the self-edit expectation set
//! while one of our own mutations is in flight. It decides, per edit, whether
//! anything needs to run; it never runs anything itself.

use std::ops::Range;
use std::sync::Arc;
use std::time::{Duration, Instant};

use proofline_config::{EngineConfig, SemanticConfig};
use proofline_primitives::text::char_len;
use proofline_primitives::{CharIdx, Finding, Generation, SurfaceId, TextSnapshot};
use rustc_hash::FxHashMap;

use crate::staleness::GenerationTracker;

pub mod gate;

pub use gate::GateBlock;

/// How large an edit was relative to the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditClass {
	/// The buffer is below the size threshold; everything is cheap.
	Small,
	/// Large buffer, large change.
	Significant,
	/// Large buffer, small change.
	Minor,
}

impl EditClass {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Small => "small",
			Self::Significant => "significant",
			Self::Minor => "minor",
		}
	}
}

/// Char-level difference between two texts: `start..old_end` of the old
/// text was replaced by `start..new_end` of the new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditDiff {
	pub start: CharIdx,
	pub old_end: CharIdx,
	pub new_end: CharIdx,
}

impl EditDiff {
	/// Computes the diff from the common prefix and suffix of both texts.
	pub fn between(old: &str, new: &str) -> Self {
		let prefix = old.chars().zip(new.chars()).take_while(|(a, b)| a == b).count();
		let old_len = char_len(old);
		let new_len = char_len(new);
		let max_suffix = old_len.min(new_len) - prefix;
		let suffix = old
			.chars()
			.rev()
			.zip(new.chars().rev())
			.take(max_suffix)
			.take_while(|(a, b)| a == b)
			.count();
		Self {
			start: prefix,
			old_end: old_len - suffix,
			new_end: new_len - suffix,
		}
	}

	pub fn changed_chars(&self) -> usize {
		(self.old_end - self.start).max(self.new_end - self.start)
	}

	pub fn delta(&self) -> isize {
		self.new_end as isize - self.old_end as isize
	}

	/// Maps a finding on the old text onto the new text. Findings that touch
	/// the replaced region have no counterpart and map to `None`.
	pub fn translate(&self, finding: &Finding) -> Option<Finding> {
		if finding.end <= self.start {
			return Some(finding.clone());
		}
		if finding.start >= self.old_end {
			let mut moved = finding.clone();
			moved.shift(self.delta());
			return Some(moved);
		}
		None
	}
}

/// When the semantic pass for an edit will run, if at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticPlan {
	Debounced { due_at: Instant },
	Blocked(GateBlock),
}

/// Work required for one accepted text change.
#[derive(Debug, Clone)]
pub struct AnalysisPlan {
	pub surface: SurfaceId,
	pub generation: Generation,
	pub text: Arc<str>,
	pub class: EditClass,
	/// Diff against the previous snapshot, `None` when there is nothing to
	/// carry over or the text did not change.
	pub diff: Option<EditDiff>,
	pub semantic: SemanticPlan,
}

#[derive(Debug, Clone)]
pub enum EditDecision {
	/// Same text as last seen.
	Unchanged,
	/// The text is the result of our own in-flight mutation. The generation
	/// advanced but nothing is dispatched.
	SelfInflicted { generation: Generation },
	Analyze(AnalysisPlan),
}

/// A semantic debounce that fired for a still-current generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueSemantic {
	pub surface: SurfaceId,
	pub generation: Generation,
	pub text: Arc<str>,
}

#[derive(Debug, Clone, Copy)]
struct Thresholds {
	size_chars: usize,
	significant_chars: usize,
	significant_ratio: f64,
	debounce: Duration,
}

impl Thresholds {
	fn classify(&self, len: usize, prev_len: usize, diff: Option<EditDiff>) -> EditClass {
		if len < self.size_chars {
			return EditClass::Small;
		}
		let Some(diff) = diff else {
			return EditClass::Significant;
		};
		let changed = diff.changed_chars();
		let ratio = changed as f64 / prev_len.max(1) as f64;
		if changed > self.significant_chars || ratio > self.significant_ratio {
			EditClass::Significant
		} else {
			EditClass::Minor
		}
	}
}

#[derive(Debug, Clone, Copy)]
struct Debounce {
	due_at: Instant,
	generation: Generation,
}

impl Debounce {
	fn is_due(&self, now: Instant) -> bool {
		self.due_at <= now
	}
}

#[derive(Debug, Clone)]
enum SelfEdit {
	/// A mutation is running; the surface is expected to report `expected`.
	InFlight { expected: Arc<str> },
	/// The mutation landed at `since`. Results dispatched before that are
	/// not authoritative until `until`.
	Grace {
		expected: Arc<str>,
		since: Generation,
		until: Instant,
	},
}

impl SelfEdit {
	fn expected(&self) -> &Arc<str> {
		match self {
			Self::InFlight { expected } | Self::Grace { expected, .. } => expected,
		}
	}
}

#[derive(Debug, Default)]
struct SurfaceSchedule {
	text: Option<Arc<str>>,
	snapshot: Option<TextSnapshot>,
	debounce: Option<Debounce>,
	self_edit: Option<SelfEdit>,
}

impl SurfaceSchedule {
	fn plan_semantic(&mut self, generation: Generation, semantic: &SemanticConfig, debounce: Duration, now: Instant) -> SemanticPlan {
		self.debounce = None;
		let Some(text) = self.text.as_deref() else {
			return SemanticPlan::Blocked(GateBlock::TooShort);
		};
		match gate::check(text, semantic) {
			Ok(()) => {
				let due_at = now + debounce;
				self.debounce = Some(Debounce { due_at, generation });
				SemanticPlan::Debounced { due_at }
			}
			Err(block) => SemanticPlan::Blocked(block),
		}
	}
}

/// Per-surface edit intake. See the module docs.
#[derive(Debug)]
pub struct Scheduler {
	thresholds: Thresholds,
	generations: GenerationTracker,
	surfaces: FxHashMap<SurfaceId, SurfaceSchedule>,
}

impl Scheduler {
	pub fn new(config: &EngineConfig) -> Self {
		Self {
			thresholds: Thresholds {
				size_chars: config.size_threshold_chars,
				significant_chars: config.significant_change_chars,
				significant_ratio: config.significant_change_ratio,
				debounce: config.semantic_debounce(),
			},
			generations: GenerationTracker::default(),
			surfaces: FxHashMap::default(),
		}
	}

	/// Takes in the text a surface reported after an edit.
	pub fn on_edit(&mut self, surface: SurfaceId, text: &str, semantic: &SemanticConfig, now: Instant) -> EditDecision {
		let state = self.surfaces.entry(surface).or_default();
		if state.text.as_deref() == Some(text) {
			tracing::trace!(%surface, "scheduler.edit.unchanged");
			return EditDecision::Unchanged;
		}

		let expected = state.self_edit.as_ref().map(|s| Arc::clone(s.expected()));
		if let Some(expected) = expected
			&& expected.as_ref() == text
		{
			let generation = self.generations.bump(surface);
			state.text = Some(expected);
			state.debounce = None;
			tracing::debug!(%surface, %generation, "scheduler.edit.self_inflicted");
			return EditDecision::SelfInflicted { generation };
		}
		if matches!(state.self_edit, Some(SelfEdit::Grace { .. })) {
			state.self_edit = None;
		}

		let prev_len = state.text.as_deref().map_or(0, char_len);
		let diff = state.text.as_deref().map(|old| EditDiff::between(old, text));
		let class = self.thresholds.classify(char_len(text), prev_len, diff);
		let generation = self.generations.bump(surface);
		let text: Arc<str> = Arc::from(text);
		state.snapshot = Some(TextSnapshot::new(surface, &text, generation));
		state.text = Some(Arc::clone(&text));
		let semantic = state.plan_semantic(generation, semantic, self.thresholds.debounce, now);

		tracing::debug!(%surface, %generation, class = class.as_str(), "scheduler.edit.accepted");
		EditDecision::Analyze(AnalysisPlan {
			surface,
			generation,
			text,
			class,
			diff,
			semantic,
		})
	}

	/// Re-runs analysis of the last known text under a fresh generation.
	///
	/// The plan carries a diff when the snapshot lagged behind the text, which
	/// happens when our own edit was observed but its mutation then failed.
	pub fn replan(&mut self, surface: SurfaceId, semantic: &SemanticConfig, now: Instant) -> Option<AnalysisPlan> {
		let state = self.surfaces.get_mut(&surface)?;
		let text = state.text.clone()?;
		let diff = state
			.snapshot
			.as_ref()
			.filter(|snapshot| snapshot.content != text.as_ref())
			.map(|snapshot| EditDiff::between(&snapshot.text(), &text));
		let generation = self.generations.bump(surface);
		state.snapshot = Some(TextSnapshot::new(surface, &text, generation));
		let semantic = state.plan_semantic(generation, semantic, self.thresholds.debounce, now);
		let len = char_len(&text);
		Some(AnalysisPlan {
			surface,
			generation,
			class: self.thresholds.classify(len, len, diff),
			text,
			diff,
			semantic,
		})
	}

	/// Pops every semantic timer that is due. Timers whose generation was
	/// superseded are dropped without a trace beyond a log line.
	pub fn due_semantic(&mut self, now: Instant) -> Vec<DueSemantic> {
		let mut due = Vec::new();
		for (&surface, state) in &mut self.surfaces {
			if !state.debounce.is_some_and(|d| d.is_due(now)) {
				continue;
			}
			let Some(timer) = state.debounce.take() else {
				continue;
			};
			if !self.generations.is_current(surface, timer.generation) {
				tracing::trace!(%surface, generation = %timer.generation, "scheduler.semantic.superseded");
				continue;
			}
			if let Some(text) = state.text.clone() {
				due.push(DueSemantic {
					surface,
					generation: timer.generation,
					text,
				});
			}
		}
		due.sort_by_key(|d| d.surface);
		due
	}

	/// Earliest pending semantic deadline across all surfaces.
	pub fn next_semantic_due(&self) -> Option<Instant> {
		self.surfaces.values().filter_map(|s| s.debounce.map(|d| d.due_at)).min()
	}

	pub fn cancel_debounce(&mut self, surface: SurfaceId) {
		if let Some(state) = self.surfaces.get_mut(&surface)
			&& state.debounce.take().is_some()
		{
			tracing::trace!(%surface, "scheduler.semantic.cancelled");
		}
	}

	/// Records that the surface should soon report `expected` as a result of
	/// our own mutation.
	pub fn expect_self_edit(&mut self, surface: SurfaceId, expected: Arc<str>) {
		self.surfaces.entry(surface).or_default().self_edit = Some(SelfEdit::InFlight { expected });
	}

	pub fn clear_self_edit(&mut self, surface: SurfaceId) {
		if let Some(state) = self.surfaces.get_mut(&surface) {
			state.self_edit = None;
		}
	}

	/// Patches the snapshot with a mutation that just landed, bumps the
	/// generation and opens the grace window.
	///
	/// Returns `None` if no mutation was in flight or `range` no longer fits.
	pub fn apply_self_edit(
		&mut self,
		surface: SurfaceId,
		range: Range<CharIdx>,
		replacement: &str,
		grace: Duration,
		now: Instant,
	) -> Option<Generation> {
		let state = self.surfaces.get_mut(&surface)?;
		let Some(SelfEdit::InFlight { expected }) = state.self_edit.clone() else {
			return None;
		};
		let snapshot = state.snapshot.as_mut()?;
		if range.start > range.end || range.end > snapshot.len_chars() {
			return None;
		}
		let generation = self.generations.bump(surface);
		snapshot.apply_replacement(range, replacement, generation);
		state.text = Some(Arc::clone(&expected));
		state.debounce = None;
		state.self_edit = Some(SelfEdit::Grace {
			expected,
			since: generation,
			until: now + grace,
		});
		Some(generation)
	}

	/// Generation at which the active grace window began, if one is open.
	pub fn grace_since(&self, surface: SurfaceId, now: Instant) -> Option<Generation> {
		match self.surfaces.get(&surface)?.self_edit.as_ref()? {
			SelfEdit::Grace { since, until, .. } if *until > now => Some(*since),
			_ => None,
		}
	}

	pub fn expire_grace(&mut self, now: Instant) {
		for (surface, state) in &mut self.surfaces {
			if matches!(state.self_edit, Some(SelfEdit::Grace { until, .. }) if until <= now) {
				state.self_edit = None;
				tracing::trace!(%surface, "scheduler.grace.expired");
			}
		}
	}

	pub fn snapshot(&self, surface: SurfaceId) -> Option<&TextSnapshot> {
		self.surfaces.get(&surface)?.snapshot.as_ref()
	}

	pub fn text(&self, surface: SurfaceId) -> Option<&Arc<str>> {
		self.surfaces.get(&surface)?.text.as_ref()
	}

	pub fn generation(&self, surface: SurfaceId) -> Generation {
		self.generations.current(surface)
	}

	pub fn is_current(&self, surface: SurfaceId, generation: Generation) -> bool {
		self.generations.is_current(surface, generation)
	}
}
