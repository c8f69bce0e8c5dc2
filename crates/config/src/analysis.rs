//! User-facing analysis settings: what to check and what to ignore.

use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// English dialect passed to analyzers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
	#[default]
	American,
	British,
	Canadian,
	Australian,
}

/// Optional word lists an analyzer may merge into its dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Wordlist {
	InternetAbbreviations,
	GenZSlang,
	ItTerminology,
	BrandNames,
	PersonNames,
	LastNames,
}

/// Gate for the slow (semantic) analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SemanticConfig {
	pub enabled: bool,
	/// Minimum buffer length in chars before a semantic pass is worthwhile.
	pub min_chars: usize,
	/// Minimum word count of the trailing sentence.
	pub min_words: usize,
	/// Only analyze once the buffer ends with a complete sentence.
	pub require_complete_sentence: bool,
}

impl Default for SemanticConfig {
	fn default() -> Self {
		Self {
			enabled: true,
			min_chars: 20,
			min_words: 5,
			require_complete_sentence: true,
		}
	}
}

/// Names accepted in `excluded_languages`, by full English name.
pub const EXCLUDABLE_LANGUAGES: &[&str] = &[
	"arabic",
	"chinese",
	"dutch",
	"french",
	"german",
	"hindi",
	"italian",
	"japanese",
	"korean",
	"portuguese",
	"russian",
	"spanish",
	"swedish",
	"turkish",
	"vietnamese",
];

/// Analysis settings read once per analysis cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
	pub dialect: Dialect,
	/// Enabled finding categories. `None` enables every category.
	pub enabled_categories: Option<BTreeSet<String>>,
	/// Rule ids the user has permanently silenced.
	pub ignored_rules: BTreeSet<String>,
	/// Exact texts never reported.
	pub ignored_texts: BTreeSet<String>,
	/// Known-good words, matched case-insensitively.
	pub vocabulary: BTreeSet<String>,
	pub wordlists: BTreeSet<Wordlist>,
	/// Capitalize suggestions for findings at the start of a sentence.
	pub capitalize_sentence_start: bool,
	/// Drop findings inside sentences written in one of `excluded_languages`.
	pub language_filter: bool,
	/// Lower-cased names from [`EXCLUDABLE_LANGUAGES`].
	pub excluded_languages: BTreeSet<String>,
	pub semantic: SemanticConfig,
}

impl Default for AnalysisConfig {
	fn default() -> Self {
		Self {
			dialect: Dialect::default(),
			enabled_categories: None,
			ignored_rules: BTreeSet::new(),
			ignored_texts: BTreeSet::new(),
			vocabulary: BTreeSet::new(),
			wordlists: BTreeSet::new(),
			capitalize_sentence_start: true,
			language_filter: false,
			excluded_languages: BTreeSet::new(),
			semantic: SemanticConfig::default(),
		}
	}
}

impl AnalysisConfig {
	/// Lower-cases category and vocabulary entries so lookups are case-insensitive.
	pub fn normalize(&mut self) {
		if let Some(categories) = self.enabled_categories.take() {
			self.enabled_categories = Some(categories.into_iter().map(|c| c.to_lowercase()).collect());
		}
		self.vocabulary = std::mem::take(&mut self.vocabulary)
			.into_iter()
			.map(|w| w.to_lowercase())
			.collect();
		self.excluded_languages = std::mem::take(&mut self.excluded_languages)
			.into_iter()
			.map(|l| l.to_lowercase())
			.collect();
	}

	/// Rejects language names the language filter cannot detect.
	pub fn validate(&self) -> Result<()> {
		if let Some(unknown) = self.excluded_languages.iter().find(|l| !EXCLUDABLE_LANGUAGES.contains(&l.as_str())) {
			return Err(ConfigError::Invalid {
				field: "analysis.excluded_languages",
				reason: format!("unsupported language {unknown:?}"),
			});
		}
		Ok(())
	}

	/// True if findings in `excluded_languages` sentences should be dropped.
	pub fn filters_languages(&self) -> bool {
		self.language_filter && !self.excluded_languages.is_empty()
	}

	/// Returns a normalized copy.
	pub fn normalized(mut self) -> Self {
		self.normalize();
		self
	}

	pub fn is_category_enabled(&self, category: &str) -> bool {
		self.enabled_categories
			.as_ref()
			.is_none_or(|set| set.contains(category) || set.contains(&category.to_lowercase()))
	}

	pub fn is_rule_ignored(&self, rule_id: &str) -> bool {
		self.ignored_rules.contains(rule_id)
	}

	pub fn is_text_ignored(&self, text: &str) -> bool {
		self.ignored_texts.contains(text)
	}

	pub fn is_known_word(&self, text: &str) -> bool {
		self.vocabulary.contains(text) || self.vocabulary.contains(&text.to_lowercase())
	}

	/// The subset of settings that changes what analyzers produce.
	pub fn analyzer_params(&self) -> AnalyzerParams {
		AnalyzerParams {
			dialect: self.dialect,
			wordlists: self.wordlists.clone(),
		}
	}
}

/// Settings handed to analyzers. Anything in here is part of the cache key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AnalyzerParams {
	pub dialect: Dialect,
	pub wordlists: BTreeSet<Wordlist>,
}

impl AnalyzerParams {
	/// Stable hash of the parameters, combined with a content hash to key cached results.
	pub fn fingerprint(&self) -> u64 {
		let mut hasher = FxHasher::default();
		self.hash(&mut hasher);
		hasher.finish()
	}
}
