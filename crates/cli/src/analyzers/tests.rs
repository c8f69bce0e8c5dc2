use pretty_assertions::assert_eq;
use proofline_config::{AnalyzerParams, Dialect};
use proofline_engine::Analyzer;

use super::*;

fn fast(text: &str, dialect: Dialect) -> Vec<(String, std::ops::Range<CharIdx>, Vec<String>)> {
	let params = AnalyzerParams {
		dialect,
		..AnalyzerParams::default()
	};
	DemoFast
		.analyze(text, &params)
		.unwrap()
		.into_iter()
		.map(|f| (f.rule_id.clone(), f.range(), f.suggestions))
		.collect()
}

#[test]
fn words_use_char_offsets() {
	let found: Vec<_> = words("naïve café, it's").into_iter().map(|w| (w.start, w.end, w.text)).collect();
	assert_eq!(found, vec![(0, 5, "naïve"), (6, 10, "café"), (12, 16, "it's")]);
}

#[test]
fn misspelling_keeps_capitalization() {
	assert_eq!(
		fast("Teh fox will recieve it.", Dialect::American),
		vec![
			("MISSPELLING".to_string(), 0..3, vec!["The".to_string()]),
			("MISSPELLING".to_string(), 13..20, vec!["receive".to_string()]),
		]
	);
}

#[test]
fn dialect_spelling_follows_params() {
	let text = "My favourite color.";
	assert_eq!(
		fast(text, Dialect::American),
		vec![("DIALECT_SPELLING".to_string(), 3..12, vec!["favorite".to_string()])]
	);
	assert_eq!(
		fast(text, Dialect::British),
		vec![("DIALECT_SPELLING".to_string(), 13..18, vec!["colour".to_string()])]
	);
	assert!(fast(text, Dialect::Canadian).is_empty());
}

#[test]
fn repeated_word_suggests_deleting_the_second() {
	let text = "over the the dog";
	let found = fast(text, Dialect::American);
	assert_eq!(found, vec![("REPEATED_WORD".to_string(), 8..12, vec![String::new()])]);
	assert_eq!(proofline_primitives::text::replace_chars(text, 8..12, "").as_deref(), Some("over the dog"));
}

#[test]
fn punctuation_breaks_a_repetition() {
	assert!(fast("It was that, that was it.", Dialect::American).is_empty());
}

#[test]
fn double_space_between_words_only() {
	let found = fast("  Indented  twice.", Dialect::American);
	assert_eq!(found, vec![("DOUBLE_SPACE".to_string(), 10..12, vec![" ".to_string()])]);
	assert!(fast("Trailing.   ", Dialect::American).is_empty());
}

#[test]
fn sentences_split_on_terminators() {
	assert_eq!(sentences("One two. Three? 3.5 four"), vec![0..8, 9..15, 16..24]);
	assert!(sentences("   ").is_empty());
}

#[test]
fn long_sentences_are_flagged() {
	let long = vec!["word"; 12].join(" ");
	let text = format!("Short one. {long}.");
	let findings = LongSentences { max_words: 10 }.analyze(&text, &AnalyzerParams::default()).unwrap();
	assert_eq!(findings.len(), 1);
	assert_eq!(findings[0].rule_id, "LONG_SENTENCE");
	assert_eq!(findings[0].range(), 11..text.chars().count());
	assert!(findings[0].suggestions.is_empty());
}
