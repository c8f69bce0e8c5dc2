use std::fmt;
use std::str::FromStr;

use rustc_hash::FxHashSet;

/// Why the user rejected a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionReason {
	WrongMeaning,
	TooFormal,
	TooInformal,
	UnnecessaryChange,
	WrongTerm,
	Other,
}

impl RejectionReason {
	pub const ALL: [Self; 6] = [
		Self::WrongMeaning,
		Self::TooFormal,
		Self::TooInformal,
		Self::UnnecessaryChange,
		Self::WrongTerm,
		Self::Other,
	];

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::WrongMeaning => "wrong_meaning",
			Self::TooFormal => "too_formal",
			Self::TooInformal => "too_informal",
			Self::UnnecessaryChange => "unnecessary_change",
			Self::WrongTerm => "wrong_term",
			Self::Other => "other",
		}
	}
}

impl fmt::Display for RejectionReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for RejectionReason {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|r| r.as_str() == s)
			.ok_or_else(|| format!("unknown rejection reason `{s}`"))
	}
}

/// A finding the user dismissed, keyed by rule and flagged text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
	pub rule_id: String,
	pub text: String,
	pub reason: RejectionReason,
}

/// Session-scoped record of dismissed findings.
///
/// A dismissed `(rule_id, text)` pair is suppressed wherever it reappears,
/// across edits and surfaces, until the engine is dropped.
#[derive(Debug, Default)]
pub struct DismissalLedger {
	suppressed: FxHashSet<(String, String)>,
	log: Vec<Rejection>,
}

impl DismissalLedger {
	pub fn record(&mut self, rejection: Rejection) {
		tracing::debug!(rule = %rejection.rule_id, reason = %rejection.reason, "pipeline.dismissal.recorded");
		self.suppressed.insert((rejection.rule_id.clone(), rejection.text.clone()));
		self.log.push(rejection);
	}

	pub fn is_dismissed(&self, rule_id: &str, text: &str) -> bool {
		!self.suppressed.is_empty() && self.suppressed.contains(&(rule_id.to_string(), text.to_string()))
	}

	pub fn rejections(&self) -> &[Rejection] {
		&self.log
	}

	pub fn len(&self) -> usize {
		self.suppressed.len()
	}

	pub fn is_empty(&self) -> bool {
		self.suppressed.is_empty()
	}
}
