//! Sentence-shape gate for the semantic analyzer.
//!
//! Semantic analysis is expensive and meaningless on half-typed fragments, so
//! it only runs once the buffer ends with a complete sentence of some minimum
//! length.

use proofline_config::SemanticConfig;

/// Why the gate held back a semantic pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateBlock {
	Disabled,
	TooShort,
	IncompleteSentence,
}

impl GateBlock {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Disabled => "disabled",
			Self::TooShort => "too_short",
			Self::IncompleteSentence => "incomplete_sentence",
		}
	}
}

/// A complete sentence found in a buffer, as a char range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceSpan {
	pub start: usize,
	pub end: usize,
	pub words: usize,
}

pub fn is_terminator(c: char) -> bool {
	matches!(c, '.' | '!' | '?' | '…' | '。' | '！' | '？')
}

fn is_cjk(c: char) -> bool {
	matches!(c as u32,
		0x3040..=0x30FF // kana
		| 0x3400..=0x4DBF
		| 0x4E00..=0x9FFF
		| 0xAC00..=0xD7AF // hangul
		| 0xF900..=0xFAFF)
}

/// Whitespace-separated words, with each CJK char counted as a word since
/// those scripts do not separate words with spaces.
pub fn word_count(text: &str) -> usize {
	text.split_whitespace()
		.map(|token| {
			let cjk = token.chars().filter(|&c| is_cjk(c)).count();
			let rest = token.chars().any(|c| !is_cjk(c) && c.is_alphanumeric());
			cjk + usize::from(rest || cjk == 0)
		})
		.sum()
}

/// Splits `text` into sentences at terminators and paragraph breaks, keeping
/// those with at least `min_words` words. A run of terminators (`...`, `?!`)
/// ends one sentence. A trailing fragment with no terminator is not a sentence.
pub fn complete_sentences(text: &str, min_words: usize) -> Vec<SentenceSpan> {
	let mut sentences = Vec::new();
	let mut start = 0;
	let mut current = String::new();
	let mut chars = text.chars().enumerate().peekable();

	while let Some((idx, c)) = chars.next() {
		current.push(c);
		let paragraph_break = c == '\n' && current.trim().chars().count() > 1;
		if !is_terminator(c) && !paragraph_break {
			continue;
		}
		if is_terminator(c) && chars.peek().is_some_and(|&(_, next)| is_terminator(next)) {
			continue;
		}
		let trimmed = current.trim();
		let words = word_count(trimmed);
		if !trimmed.is_empty() && words >= min_words {
			sentences.push(SentenceSpan { start, end: idx + 1, words });
		}
		start = idx + 1;
		current.clear();
	}
	sentences
}

/// True if the buffer, ignoring trailing whitespace, ends with a terminator
/// and holds at least one sentence of `min_words` words.
///
/// The last sentence itself may be short: "A long first sentence here. Ok."
/// passes.
pub fn ends_with_complete_sentence(text: &str, min_words: usize) -> bool {
	let trimmed = text.trim_end();
	if !trimmed.chars().next_back().is_some_and(is_terminator) {
		return false;
	}
	!complete_sentences(trimmed, min_words).is_empty()
}

/// Decides whether `text` is worth a semantic pass.
pub fn check(text: &str, config: &SemanticConfig) -> Result<(), GateBlock> {
	if !config.enabled {
		return Err(GateBlock::Disabled);
	}
	if text.trim().chars().count() < config.min_chars {
		return Err(GateBlock::TooShort);
	}
	if config.require_complete_sentence {
		if !ends_with_complete_sentence(text, config.min_words) {
			return Err(GateBlock::IncompleteSentence);
		}
	} else if word_count(text) < config.min_words {
		return Err(GateBlock::TooShort);
	}
	Ok(())
}
