//! Sentence-level language exclusion.
//!
//! Analyzers only speak English; a German quotation inside an English
//! document shows up as a wall of misspellings. With the filter on, findings
//! inside sentences detected as an excluded language are dropped, and if the
//! whole document reads as one excluded language every finding is.

use std::ops::Range;

use proofline_config::AnalysisConfig;
use proofline_primitives::{CharIdx, Finding};
use whichlang::{Lang, detect_language};

use crate::scheduler::gate::is_terminator;

/// Share of sentences a document's detected language must exceed before the
/// document as a whole counts as written in it.
const DOCUMENT_SHARE: f64 = 0.6;

/// Maps a name from `excluded_languages` to its detector language.
pub fn lang_from_name(name: &str) -> Option<Lang> {
	Some(match name {
		"arabic" => Lang::Ara,
		"chinese" => Lang::Cmn,
		"dutch" => Lang::Nld,
		"french" => Lang::Fra,
		"german" => Lang::Deu,
		"hindi" => Lang::Hin,
		"italian" => Lang::Ita,
		"japanese" => Lang::Jpn,
		"korean" => Lang::Kor,
		"portuguese" => Lang::Por,
		"russian" => Lang::Rus,
		"spanish" => Lang::Spa,
		"swedish" => Lang::Swe,
		"turkish" => Lang::Tur,
		"vietnamese" => Lang::Vie,
		_ => return None,
	})
}

/// One segment of the document and its char range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
	pub range: Range<CharIdx>,
	pub text: String,
}

/// Splits `text` after each run of terminators and at every line break.
/// Whitespace-only segments are skipped; a trailing unterminated fragment is
/// its own segment.
pub fn segments(text: &str) -> Vec<Segment> {
	let mut out = Vec::new();
	let mut start = 0;
	let mut current = String::new();
	let mut chars = text.chars().enumerate().peekable();

	let mut flush = |start: CharIdx, end: CharIdx, current: &mut String| {
		if !current.trim().is_empty() {
			out.push(Segment {
				range: start..end,
				text: std::mem::take(current),
			});
		}
		current.clear();
	};

	while let Some((idx, c)) = chars.next() {
		current.push(c);
		let boundary = c == '\n' || (is_terminator(c) && !chars.peek().is_some_and(|&(_, next)| is_terminator(next)));
		if boundary {
			flush(start, idx + 1, &mut current);
			start = idx + 1;
		}
	}
	let end = start + current.chars().count();
	flush(start, end, &mut current);
	out
}

/// Drops findings written in excluded languages.
#[derive(Debug, Clone)]
pub struct LanguageFilter {
	excluded: Vec<Lang>,
}

impl LanguageFilter {
	/// `None` when the filter is off or names no detectable language.
	pub fn from_config(config: &AnalysisConfig) -> Option<Self> {
		if !config.filters_languages() {
			return None;
		}
		let excluded: Vec<Lang> = config.excluded_languages.iter().filter_map(|name| lang_from_name(name)).collect();
		(!excluded.is_empty()).then_some(Self { excluded })
	}

	fn is_excluded(&self, lang: Lang) -> bool {
		self.excluded.contains(&lang)
	}

	/// The excluded language the whole document is written in, if any.
	pub fn document_language(&self, text: &str, segments: &[Segment]) -> Option<Lang> {
		let lang = detect_language(text);
		if !self.is_excluded(lang) || segments.is_empty() {
			return None;
		}
		let matching = segments.iter().filter(|s| detect_language(&s.text) == lang).count();
		let share = matching as f64 / segments.len() as f64;
		tracing::trace!(lang = ?lang, share, "pipeline.language.document");
		(share > DOCUMENT_SHARE).then_some(lang)
	}

	/// Keeps findings outside excluded-language sentences. A finding that
	/// does not fit inside a single sentence is kept.
	pub fn retain(&self, mut findings: Vec<Finding>, text: &str) -> Vec<Finding> {
		if findings.is_empty() {
			return findings;
		}
		let segments = segments(text);
		if let Some(lang) = self.document_language(text, &segments) {
			tracing::debug!(lang = ?lang, dropped = findings.len(), "pipeline.language.document_excluded");
			findings.clear();
			return findings;
		}

		let excluded: Vec<&Range<CharIdx>> = segments
			.iter()
			.filter(|s| self.is_excluded(detect_language(&s.text)))
			.map(|s| &s.range)
			.collect();
		if excluded.is_empty() {
			return findings;
		}
		findings.retain(|f| !excluded.iter().any(|r| r.start <= f.start && f.end <= r.end));
		findings
	}
}
