//! Merge and filter pipeline.
//!
//! Raw analyzer output becomes the canonical finding set by running through
//! ordered stages, each a pure function over the list:
//!
//! 0. suggestion normalization (sentence-start capitalization, optional)
//! 1. category enablement
//! 2. same-span resolution across categories
//! 3. adjacent-duplicate collapse
//! 4. ignored rules
//! 5. ignored texts, vocabulary and dismissed findings
//! 6. exclusion zones
//! 7. excluded languages (optional)
//! 8. range validation against the snapshot
//!
//! Stages 5 and 7 keep findings whose range cannot be resolved; stage 8 is
//! where they are dropped.

use std::ops::Range;

use proofline_config::AnalysisConfig;
use proofline_primitives::text::capitalize_first;
use proofline_primitives::{Category, CharIdx, Finding, Severity, TextSnapshot};
use rustc_hash::FxHashMap;

mod dismissals;
pub mod language;
#[cfg(test)]
mod tests;

pub use dismissals::{DismissalLedger, Rejection, RejectionReason};
pub use language::LanguageFilter;

/// Everything the stages read besides the findings themselves.
pub struct FilterContext<'a> {
	pub config: &'a AnalysisConfig,
	pub snapshot: &'a TextSnapshot,
	pub zones: &'a [Range<CharIdx>],
	pub dismissals: &'a DismissalLedger,
}

/// Per-stage drop counts for one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterReport {
	pub input: usize,
	pub disabled_category: usize,
	pub overlapping: usize,
	pub duplicates: usize,
	pub ignored_rule: usize,
	pub ignored_text: usize,
	pub excluded: usize,
	pub foreign_language: usize,
	pub invalid_range: usize,
	pub output: usize,
}

/// Runs every stage in order.
pub fn run(findings: Vec<Finding>, ctx: &FilterContext<'_>) -> (Vec<Finding>, FilterReport) {
	let mut report = FilterReport {
		input: findings.len(),
		..FilterReport::default()
	};

	let mut findings = findings;
	if ctx.config.capitalize_sentence_start {
		capitalize_sentence_starts(&mut findings, ctx.snapshot);
	}

	let findings = counted(findings, &mut report.disabled_category, |f| retain_enabled(f, ctx.config));
	let findings = counted(findings, &mut report.overlapping, resolve_same_span);
	let findings = counted(findings, &mut report.duplicates, collapse_adjacent);
	let findings = counted(findings, &mut report.ignored_rule, |f| drop_ignored_rules(f, ctx.config));
	let findings = counted(findings, &mut report.ignored_text, |f| drop_ignored_text(f, ctx));
	let findings = counted(findings, &mut report.excluded, |f| drop_excluded(f, ctx.zones));
	let findings = match LanguageFilter::from_config(ctx.config) {
		Some(filter) => counted(findings, &mut report.foreign_language, |f| filter.retain(f, &ctx.snapshot.text())),
		None => findings,
	};
	let findings = counted(findings, &mut report.invalid_range, |f| drop_invalid_ranges(f, ctx.snapshot));

	report.output = findings.len();
	(findings, report)
}

fn counted(findings: Vec<Finding>, counter: &mut usize, stage: impl FnOnce(Vec<Finding>) -> Vec<Finding>) -> Vec<Finding> {
	let before = findings.len();
	let after = stage(findings);
	*counter += before - after.len();
	after
}

/// Upper-cases the first char of each suggestion on findings that begin a sentence.
pub fn capitalize_sentence_starts(findings: &mut [Finding], snapshot: &TextSnapshot) {
	for finding in findings.iter_mut() {
		if !finding.fits(snapshot.len_chars()) || !snapshot.is_sentence_start(finding.start) {
			continue;
		}
		for suggestion in &mut finding.suggestions {
			*suggestion = capitalize_first(suggestion);
		}
	}
}

pub fn retain_enabled(mut findings: Vec<Finding>, config: &AnalysisConfig) -> Vec<Finding> {
	findings.retain(|f| config.is_category_enabled(f.category.as_str()));
	findings
}

/// Rank of a category when findings of different categories flag the same
/// span. Unknown categories rank lowest.
pub fn category_rank(category: &Category) -> u8 {
	match category.as_str() {
		"grammar" => 10,
		"spelling" => 9,
		"punctuation" => 8,
		"style" => 7,
		"formatting" => 6,
		"typo" => 5,
		_ => 1,
	}
}

fn span_rank(finding: &Finding) -> (u8, Severity) {
	(category_rank(&finding.category), finding.severity)
}

/// Where findings of different categories cover exactly the same span, keeps
/// only the category that ranks highest, severity breaking ties and the
/// earliest finding breaking those. Findings sharing the winner's category
/// all survive; order is preserved.
pub fn resolve_same_span(mut findings: Vec<Finding>) -> Vec<Finding> {
	if findings.len() < 2 {
		return findings;
	}
	let mut winners: FxHashMap<(CharIdx, CharIdx), usize> = FxHashMap::default();
	for (idx, finding) in findings.iter().enumerate() {
		winners
			.entry((finding.start, finding.end))
			.and_modify(|best| {
				if span_rank(finding) > span_rank(&findings[*best]) {
					*best = idx;
				}
			})
			.or_insert(idx);
	}
	let keep: Vec<bool> = findings
		.iter()
		.map(|f| {
			let best = &findings[winners[&(f.start, f.end)]];
			f.category == best.category
		})
		.collect();
	let mut keep = keep.into_iter();
	findings.retain(|_| keep.next().unwrap_or(true));
	findings
}

/// Collapses each maximal run of consecutive identical reports into its first
/// element. Equal reports separated by anything else are kept.
pub fn collapse_adjacent(mut findings: Vec<Finding>) -> Vec<Finding> {
	findings.dedup_by(|next, kept| next.same_report(kept));
	findings
}

pub fn drop_ignored_rules(mut findings: Vec<Finding>, config: &AnalysisConfig) -> Vec<Finding> {
	findings.retain(|f| !config.is_rule_ignored(&f.rule_id));
	findings
}

/// Drops findings whose flagged text is ignored, in the vocabulary or was
/// dismissed under the same rule. Unresolvable ranges are kept.
pub fn drop_ignored_text(mut findings: Vec<Finding>, ctx: &FilterContext<'_>) -> Vec<Finding> {
	findings.retain(|f| {
		let Some(text) = ctx.snapshot.slice(f.range()) else {
			return true;
		};
		!(ctx.config.is_text_ignored(&text) || ctx.config.is_known_word(&text) || ctx.dismissals.is_dismissed(&f.rule_id, &text))
	});
	findings
}

pub fn drop_excluded(mut findings: Vec<Finding>, zones: &[Range<CharIdx>]) -> Vec<Finding> {
	if zones.is_empty() {
		return findings;
	}
	findings.retain(|f| !zones.iter().any(|zone| f.overlaps(zone)));
	findings
}

pub fn drop_invalid_ranges(mut findings: Vec<Finding>, snapshot: &TextSnapshot) -> Vec<Finding> {
	let len = snapshot.len_chars();
	findings.retain(|f| {
		let fits = f.fits(len);
		if !fits {
			tracing::debug!(start = f.start, end = f.end, len, rule = %f.rule_id, "pipeline.range.invalid");
		}
		fits
	});
	findings
}

/// Concatenates fast and slow raw findings in tier order.
pub fn merge(fast: Option<&[Finding]>, slow: Option<&[Finding]>) -> Vec<Finding> {
	let mut merged = Vec::with_capacity(fast.map_or(0, <[_]>::len) + slow.map_or(0, <[_]>::len));
	merged.extend_from_slice(fast.unwrap_or_default());
	merged.extend_from_slice(slow.unwrap_or_default());
	merged
}
