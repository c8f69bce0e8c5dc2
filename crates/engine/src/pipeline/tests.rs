use std::collections::BTreeSet;

use pretty_assertions::assert_eq;
use proofline_config::AnalysisConfig;
use proofline_primitives::{Finding, Generation, Severity, SurfaceId, TextSnapshot};
use proptest::prelude::*;

use super::*;

fn snapshot(text: &str) -> TextSnapshot {
	TextSnapshot::new(SurfaceId(1), text, Generation(1))
}

fn finding(range: Range<usize>, rule: &str) -> Finding {
	Finding::new(range, format!("{rule} message"), "spelling", rule)
}

fn run_with(findings: Vec<Finding>, config: &AnalysisConfig, snap: &TextSnapshot, zones: &[Range<usize>], dismissals: &DismissalLedger) -> (Vec<Finding>, FilterReport) {
	let ctx = FilterContext {
		config,
		snapshot: snap,
		zones,
		dismissals,
	};
	run(findings, &ctx)
}

#[test]
fn adjacent_runs_collapse_but_separated_repeats_survive() {
	let a = finding(0..3, "A");
	let b = finding(4..9, "B");
	let collapsed = collapse_adjacent(vec![a.clone(), a.clone(), a.clone(), b.clone(), a.clone()]);
	assert_eq!(collapsed, vec![a.clone(), b, a]);
}

#[test]
fn identical_reports_at_different_ranges_are_not_duplicates() {
	let first = finding(0..3, "TYPO");
	let second = finding(10..13, "TYPO");
	let collapsed = collapse_adjacent(vec![first.clone(), second.clone()]);
	assert_eq!(collapsed, vec![first, second]);
}

#[test]
fn disabled_categories_are_dropped() {
	let config = AnalysisConfig {
		enabled_categories: Some(BTreeSet::from(["grammar".to_string()])),
		..AnalysisConfig::default()
	};
	let spelling = finding(0..3, "S");
	let grammar = Finding::new(4..9, "agreement", "Grammar", "G");
	assert_eq!(retain_enabled(vec![spelling, grammar.clone()], &config), vec![grammar]);
}

#[test]
fn ignored_rules_texts_and_vocabulary_are_dropped() {
	let snap = snapshot("Teh kubernetes TODO thing");
	let config = AnalysisConfig {
		ignored_rules: BTreeSet::from(["NOISY".to_string()]),
		ignored_texts: BTreeSet::from(["TODO".to_string()]),
		vocabulary: BTreeSet::from(["kubernetes".to_string()]),
		..AnalysisConfig::default()
	};
	let keep = finding(0..3, "TYPO");
	let findings = vec![
		keep.clone(),
		finding(4..14, "TYPO"),
		finding(15..19, "TYPO"),
		finding(20..25, "NOISY"),
	];

	let (out, report) = run_with(findings, &config, &snap, &[], &DismissalLedger::default());

	assert_eq!(out, vec![keep]);
	assert_eq!(report.ignored_rule, 1);
	assert_eq!(report.ignored_text, 2);
	assert_eq!(report.output, 1);
}

#[test]
fn vocabulary_matches_case_insensitively() {
	let snap = snapshot("Kubernetes rocks");
	let config = AnalysisConfig {
		vocabulary: BTreeSet::from(["kubernetes".to_string()]),
		..AnalysisConfig::default()
	};
	let ctx = FilterContext {
		config: &config,
		snapshot: &snap,
		zones: &[],
		dismissals: &DismissalLedger::default(),
	};
	assert!(drop_ignored_text(vec![finding(0..10, "TYPO")], &ctx).is_empty());
}

#[test]
fn out_of_bounds_finding_survives_text_filter_but_not_validation() {
	let snap = snapshot("short");
	let config = AnalysisConfig::default();
	let ledger = DismissalLedger::default();
	let ctx = FilterContext {
		config: &config,
		snapshot: &snap,
		zones: &[],
		dismissals: &ledger,
	};
	let bogus = finding(3..40, "TYPO");
	assert_eq!(drop_ignored_text(vec![bogus.clone()], &ctx), vec![bogus.clone()]);

	let valid = finding(0..5, "TYPO");
	let (out, report) = run_with(vec![bogus, valid.clone()], &config, &snap, &[], &ledger);
	assert_eq!(out, vec![valid]);
	assert_eq!(report.invalid_range, 1);
}

#[test]
fn exclusion_zones_drop_overlapping_findings() {
	let inside = finding(5..8, "A");
	let straddling = finding(8..12, "B");
	let outside = finding(0..3, "C");
	let touching = finding(12..14, "D");
	let zones = [4..10, 11..12];
	assert_eq!(
		drop_excluded(vec![inside, straddling, outside.clone(), touching.clone()], &zones),
		vec![outside, touching]
	);
}

#[test]
fn dismissed_pairs_are_suppressed_for_that_rule_only() {
	let snap = snapshot("irregardless of irregardless");
	let config = AnalysisConfig::default();
	let mut ledger = DismissalLedger::default();
	ledger.record(Rejection {
		rule_id: "NONSTANDARD".into(),
		text: "irregardless".into(),
		reason: RejectionReason::WrongTerm,
	});

	let other_rule = finding(16..28, "TYPO");
	let (out, report) = run_with(vec![finding(0..12, "NONSTANDARD"), other_rule.clone()], &config, &snap, &[], &ledger);

	assert_eq!(out, vec![other_rule]);
	assert_eq!(report.ignored_text, 1);
	assert_eq!(ledger.rejections().len(), 1);
}

#[test]
fn sentence_start_suggestions_are_capitalized_when_enabled() {
	let snap = snapshot("teh cat. teh dog and teh bird");
	let findings = vec![
		finding(0..3, "TYPO").with_suggestions(["the"]),
		finding(9..12, "TYPO").with_suggestions(["the", "tea"]),
		finding(21..24, "TYPO").with_suggestions(["the"]),
	];
	let config = AnalysisConfig {
		capitalize_sentence_start: true,
		..AnalysisConfig::default()
	};

	let (out, _) = run_with(findings.clone(), &config, &snap, &[], &DismissalLedger::default());
	let suggestions: Vec<_> = out.iter().map(|f| f.suggestions.clone()).collect();
	assert_eq!(suggestions, vec![vec!["The".to_string()], vec!["The".into(), "Tea".into()], vec!["the".into()]]);

	let off = AnalysisConfig {
		capitalize_sentence_start: false,
		..AnalysisConfig::default()
	};
	let (out, _) = run_with(findings.clone(), &off, &snap, &[], &DismissalLedger::default());
	assert_eq!(out[0].suggestions, vec!["the".to_string()]);

	let (out, _) = run_with(findings, &AnalysisConfig::default(), &snap, &[], &DismissalLedger::default());
	assert_eq!(out[0].suggestions, vec!["The".to_string()]);
}

#[test]
fn same_span_keeps_the_highest_ranked_category() {
	let typo = Finding::new(0..3, "Possible typo", "typo", "TYPO");
	let spelling = Finding::new(0..3, "Unknown word", "spelling", "MISSPELLING");
	let style = Finding::new(4..9, "Wordy", "style", "WORDY");
	let out = resolve_same_span(vec![typo, style.clone(), spelling.clone()]);
	assert_eq!(out, vec![style, spelling]);
}

#[test]
fn same_span_ties_go_to_severity_then_order() {
	let mild = Finding::new(0..4, "a", "custom", "A").with_severity(Severity::Info);
	let harsh = Finding::new(0..4, "b", "other", "B").with_severity(Severity::Error);
	assert_eq!(resolve_same_span(vec![mild.clone(), harsh.clone()]), vec![harsh]);

	let first = Finding::new(0..4, "a", "custom", "A");
	let second = Finding::new(0..4, "b", "other", "B");
	assert_eq!(resolve_same_span(vec![first.clone(), second]), vec![first]);
}

#[test]
fn same_span_keeps_every_finding_of_the_winning_category() {
	let a = finding(0..3, "A");
	let b = finding(0..3, "B");
	let typo = Finding::new(0..3, "t", "typo", "T");
	let (out, report) = run_with(vec![a.clone(), typo, b.clone()], &AnalysisConfig::default(), &snapshot("abc def"), &[], &DismissalLedger::default());
	assert_eq!(out, vec![a, b]);
	assert_eq!(report.overlapping, 1);
}

#[test]
fn segments_split_after_terminator_runs_and_lines() {
	let segs = language::segments("Wait... what?! Fine\n\nNext line");
	let ranges: Vec<_> = segs.iter().map(|s| s.range.clone()).collect();
	assert_eq!(ranges, vec![0..7, 7..14, 14..20, 21..30]);
	assert_eq!(segs[1].text, " what?!");
}

fn language_config(languages: &[&str]) -> AnalysisConfig {
	AnalysisConfig {
		language_filter: true,
		excluded_languages: languages.iter().map(|l| l.to_string()).collect(),
		..AnalysisConfig::default()
	}
}

#[test]
fn language_filter_needs_toggle_and_known_languages() {
	assert!(LanguageFilter::from_config(&AnalysisConfig::default()).is_none());
	let off = AnalysisConfig {
		language_filter: false,
		..language_config(&["german"])
	};
	assert!(LanguageFilter::from_config(&off).is_none());
	assert!(LanguageFilter::from_config(&language_config(&["klingon"])).is_none());
	assert!(LanguageFilter::from_config(&language_config(&["german"])).is_some());
}

#[test]
fn findings_in_excluded_language_sentences_are_dropped() {
	let text = "I walked to the market this morning and bought fresh bread for the family. \
		Der Hund läuft jeden Morgen schnell durch den großen Garten. \
		Afterwards we went home and had a lovely breakfast together in the kitchen.";
	let snap = snapshot(text);
	let english = finding(2..8, "E1");
	let german = finding(79..83, "G");
	let later = finding(150..154, "E2");
	assert_eq!(snap.slice(german.range()).as_deref(), Some("Hund"));

	let (out, report) = run_with(vec![english.clone(), german.clone(), later.clone()], &language_config(&["german"]), &snap, &[], &DismissalLedger::default());
	assert_eq!(out, vec![english.clone(), later.clone()]);
	assert_eq!(report.foreign_language, 1);

	// Excluding a different language keeps everything.
	let (out, _) = run_with(vec![english, german, later], &language_config(&["spanish"]), &snap, &[], &DismissalLedger::default());
	assert_eq!(out.len(), 3);
}

#[test]
fn document_in_an_excluded_language_drops_everything() {
	let text = "Der Hund läuft jeden Morgen durch den Garten. Die Katze schläft den ganzen Tag auf dem Sofa. Wir essen heute Abend zusammen mit unseren Freunden.";
	let snap = snapshot(text);
	let findings = vec![finding(4..8, "A"), finding(50..55, "B")];
	let (out, report) = run_with(findings, &language_config(&["german"]), &snap, &[], &DismissalLedger::default());
	assert!(out.is_empty());
	assert_eq!(report.foreign_language, 2);
}

#[test]
fn rejection_reasons_parse_from_their_names() {
	for reason in RejectionReason::ALL {
		assert_eq!(reason.as_str().parse::<RejectionReason>(), Ok(reason));
	}
	assert!("bogus".parse::<RejectionReason>().is_err());
}

#[test]
fn merge_keeps_tier_order() {
	let fast = [finding(0..1, "F")];
	let slow = [finding(0..1, "S")];
	let merged = merge(Some(&fast), Some(&slow));
	assert_eq!(merged.iter().map(|f| f.rule_id.as_str()).collect::<Vec<_>>(), ["F", "S"]);
	assert!(merge(None, None).is_empty());
}

fn arb_finding() -> impl Strategy<Value = Finding> {
	(0usize..3, 0usize..3).prop_map(|(pos, rule)| finding(pos..pos + 1, ["A", "B", "C"][rule]))
}

proptest! {
	#[test]
	fn collapse_leaves_no_adjacent_duplicates(findings in proptest::collection::vec(arb_finding(), 0..24)) {
		let collapsed = collapse_adjacent(findings.clone());
		prop_assert!(collapsed.windows(2).all(|w| !w[0].same_report(&w[1])));

		// Output is a subsequence of the input and collapsing again changes nothing.
		let mut rest = findings.iter();
		prop_assert!(collapsed.iter().all(|c| rest.any(|f| f == c)));
		prop_assert_eq!(collapse_adjacent(collapsed.clone()), collapsed);
	}

	#[test]
	fn collapse_preserves_run_count(findings in proptest::collection::vec(arb_finding(), 1..24)) {
		let runs = 1 + findings.windows(2).filter(|w| !w[0].same_report(&w[1])).count();
		prop_assert_eq!(collapse_adjacent(findings).len(), runs);
	}
}
