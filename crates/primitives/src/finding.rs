use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::text::{CharIdx, CharLen};

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
	Info,
	Warning,
	Error,
}

impl Severity {
	/// Maps an analyzer rule priority (0..=255) to a severity.
	pub const fn from_priority(priority: u8) -> Self {
		match priority {
			127..=u8::MAX => Self::Error,
			64..=126 => Self::Warning,
			_ => Self::Info,
		}
	}

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Info => "info",
			Self::Warning => "warning",
			Self::Error => "error",
		}
	}
}

/// Finding category (spelling, grammar, style, ...).
///
/// Stored lower-cased so user toggles match regardless of how an analyzer
/// spells the category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
	pub fn new(name: impl AsRef<str>) -> Self {
		Self(name.as_ref().to_lowercase())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for Category {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for Category {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}

/// One detected issue in a text snapshot.
///
/// `start..end` is a char range into the content of the snapshot the finding
/// was computed from, and into nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Finding {
	pub start: CharIdx,
	pub end: CharIdx,
	pub message: String,
	pub category: Category,
	pub severity: Severity,
	pub rule_id: String,
	pub suggestions: Vec<String>,
}

impl Finding {
	/// Creates a finding with no suggestions and [`Severity::Warning`].
	pub fn new(range: Range<CharIdx>, message: impl Into<String>, category: impl Into<Category>, rule_id: impl Into<String>) -> Self {
		Self {
			start: range.start,
			end: range.end,
			message: message.into(),
			category: category.into(),
			severity: Severity::Warning,
			rule_id: rule_id.into(),
			suggestions: Vec::new(),
		}
	}

	pub fn with_severity(mut self, severity: Severity) -> Self {
		self.severity = severity;
		self
	}

	pub fn with_suggestions<I, S>(mut self, suggestions: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.suggestions = suggestions.into_iter().map(Into::into).collect();
		self
	}

	#[inline]
	pub fn range(&self) -> Range<CharIdx> {
		self.start..self.end
	}

	#[inline]
	pub fn len(&self) -> CharLen {
		self.end.saturating_sub(self.start)
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// True if the range is well formed and fits in a buffer of `content_len` chars.
	#[inline]
	pub fn fits(&self, content_len: CharLen) -> bool {
		self.start <= self.end && self.end <= content_len
	}

	/// True if `self` and `other` report the same issue at the same place.
	///
	/// Severity and suggestions are not part of the identity.
	pub fn same_report(&self, other: &Self) -> bool {
		self.start == other.start
			&& self.end == other.end
			&& self.rule_id == other.rule_id
			&& self.category == other.category
			&& self.message == other.message
	}

	/// True if the finding's range intersects `zone`. Empty findings overlap a
	/// zone that strictly contains their position.
	pub fn overlaps(&self, zone: &Range<CharIdx>) -> bool {
		if self.is_empty() {
			return zone.start < self.start && self.start < zone.end;
		}
		self.start < zone.end && zone.start < self.end
	}

	/// Moves the range by `delta` chars, saturating at zero.
	pub fn shift(&mut self, delta: isize) {
		self.start = self.start.saturating_add_signed(delta);
		self.end = self.end.saturating_add_signed(delta);
	}
}
