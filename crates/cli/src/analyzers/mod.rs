//! Small rule-based analyzers so the binary has something to run.
//!
//! [`DemoFast`] bundles the per-edit checks (misspellings, dialect spellings,
//! repeated words, double spaces). [`LongSentences`] stands in for the slow
//! tier. Both report char offsets into the text they are given.

use proofline_config::{AnalyzerParams, Dialect};
use proofline_engine::{Analyzer, AnalyzerError};
use proofline_primitives::text::{capitalize_first, char_slice};
use proofline_primitives::{CharIdx, Finding, Severity};

#[cfg(test)]
mod tests;

const MISSPELLINGS: &[(&str, &str)] = &[
	("teh", "the"),
	("recieve", "receive"),
	("seperate", "separate"),
	("definately", "definitely"),
	("occured", "occurred"),
	("untill", "until"),
	("wich", "which"),
	("adress", "address"),
	("beleive", "believe"),
	("accross", "across"),
	("goverment", "government"),
	("thier", "their"),
];

/// American spelling, then the Commonwealth one.
const DIALECT_PAIRS: &[(&str, &str)] = &[
	("color", "colour"),
	("favorite", "favourite"),
	("center", "centre"),
	("organize", "organise"),
	("analyze", "analyse"),
	("behavior", "behaviour"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Word<'a> {
	pub start: CharIdx,
	pub end: CharIdx,
	pub text: &'a str,
}

/// Splits `text` into runs of alphanumerics and apostrophes.
pub(crate) fn words(text: &str) -> Vec<Word<'_>> {
	let mut out = Vec::new();
	let mut open: Option<(CharIdx, usize)> = None;
	let mut chars = 0;
	for (char_idx, (byte_idx, ch)) in text.char_indices().enumerate() {
		chars = char_idx + 1;
		let inside = ch.is_alphanumeric() || ch == '\'';
		match (inside, open) {
			(true, None) => open = Some((char_idx, byte_idx)),
			(false, Some((start, byte_start))) => {
				out.push(Word {
					start,
					end: char_idx,
					text: &text[byte_start..byte_idx],
				});
				open = None;
			}
			_ => {}
		}
	}
	if let Some((start, byte_start)) = open {
		out.push(Word {
			start,
			end: chars,
			text: &text[byte_start..],
		});
	}
	out
}

/// Keeps the capitalization of `original` on `fix`.
fn match_case(original: &str, fix: &str) -> String {
	if original.chars().next().is_some_and(char::is_uppercase) {
		capitalize_first(fix)
	} else {
		fix.to_string()
	}
}

fn misspellings(words: &[Word<'_>], out: &mut Vec<Finding>) {
	for word in words {
		let lower = word.text.to_lowercase();
		if let Some((_, fix)) = MISSPELLINGS.iter().find(|(typo, _)| *typo == lower) {
			out.push(
				Finding::new(word.start..word.end, format!("Did you mean \"{fix}\"?"), "spelling", "MISSPELLING")
					.with_severity(Severity::Error)
					.with_suggestions([match_case(word.text, fix)]),
			);
		}
	}
}

fn dialect_spellings(words: &[Word<'_>], dialect: Dialect, out: &mut Vec<Finding>) {
	let american = match dialect {
		Dialect::American => true,
		Dialect::British | Dialect::Australian => false,
		// Both spellings are in common use.
		Dialect::Canadian => return,
	};
	for word in words {
		let lower = word.text.to_lowercase();
		let fix = DIALECT_PAIRS.iter().find_map(|&(us, uk)| {
			let (from, to) = if american { (uk, us) } else { (us, uk) };
			(lower == from).then_some(to)
		});
		if let Some(fix) = fix {
			out.push(
				Finding::new(word.start..word.end, format!("Prefer the {dialect:?} spelling \"{fix}\""), "spelling", "DIALECT_SPELLING")
					.with_suggestions([match_case(word.text, fix)]),
			);
		}
	}
}

fn repeated_words(text: &str, words: &[Word<'_>], out: &mut Vec<Finding>) {
	for pair in words.windows(2) {
		let [prev, word] = pair else { continue };
		if !prev.text.eq_ignore_ascii_case(word.text) {
			continue;
		}
		let only_space = char_slice(text, prev.end..word.start).is_some_and(|gap| !gap.is_empty() && gap.chars().all(char::is_whitespace));
		if only_space {
			out.push(
				Finding::new(prev.end..word.end, format!("Repeated word \"{}\"", word.text), "grammar", "REPEATED_WORD").with_suggestions([""]),
			);
		}
	}
}

fn double_spaces(text: &str, out: &mut Vec<Finding>) {
	let mut prev: Option<char> = None;
	let mut run: Option<(CharIdx, usize)> = None;
	for (idx, ch) in text.chars().enumerate() {
		if ch == ' ' {
			match &mut run {
				Some((_, len)) => *len += 1,
				// Leading indentation is not a double space.
				None if prev.is_some_and(|p| !p.is_whitespace()) => run = Some((idx, 1)),
				None => {}
			}
		} else if let Some((start, len)) = run.take()
			&& len > 1 && !ch.is_whitespace()
		{
			out.push(
				Finding::new(start..start + len, "Use a single space", "typography", "DOUBLE_SPACE")
					.with_severity(Severity::Info)
					.with_suggestions([" "]),
			);
		}
		prev = Some(ch);
	}
}

/// Per-edit checks.
#[derive(Debug, Default, Clone, Copy)]
pub struct DemoFast;

impl Analyzer for DemoFast {
	fn name(&self) -> &str {
		"demo-fast"
	}

	fn analyze(&self, text: &str, params: &AnalyzerParams) -> Result<Vec<Finding>, AnalyzerError> {
		let words = words(text);
		let mut out = Vec::new();
		misspellings(&words, &mut out);
		dialect_spellings(&words, params.dialect, &mut out);
		repeated_words(text, &words, &mut out);
		double_spaces(text, &mut out);
		out.sort_by_key(|f| (f.start, f.end));
		Ok(out)
	}
}

/// Flags sentences longer than `max_words`.
#[derive(Debug, Clone, Copy)]
pub struct LongSentences {
	pub max_words: usize,
}

impl Default for LongSentences {
	fn default() -> Self {
		Self { max_words: 30 }
	}
}

/// Char ranges of the sentences in `text`, trimmed of surrounding whitespace.
pub(crate) fn sentences(text: &str) -> Vec<std::ops::Range<CharIdx>> {
	let chars: Vec<char> = text.chars().collect();
	let mut out = Vec::new();
	let mut start = None;
	let mut last_content = 0;
	for (idx, &ch) in chars.iter().enumerate() {
		if ch.is_whitespace() {
			continue;
		}
		start.get_or_insert(idx);
		last_content = idx + 1;
		let terminal = matches!(ch, '.' | '!' | '?') && chars.get(idx + 1).is_none_or(|next| next.is_whitespace());
		if terminal && let Some(begin) = start.take() {
			out.push(begin..idx + 1);
		}
	}
	if let Some(begin) = start {
		out.push(begin..last_content);
	}
	out
}

impl Analyzer for LongSentences {
	fn name(&self) -> &str {
		"demo-long-sentences"
	}

	fn analyze(&self, text: &str, _params: &AnalyzerParams) -> Result<Vec<Finding>, AnalyzerError> {
		let words = words(text);
		let mut out = Vec::new();
		for sentence in sentences(text) {
			let count = words.iter().filter(|w| w.start >= sentence.start && w.end <= sentence.end).count();
			if count > self.max_words {
				out.push(
					Finding::new(sentence, format!("Sentence has {count} words; consider splitting it"), "style", "LONG_SENTENCE")
						.with_severity(Severity::Info),
				);
			}
		}
		Ok(out)
	}
}
