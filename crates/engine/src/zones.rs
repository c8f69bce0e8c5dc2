//! Exclusion zones: regions of a surface that must never carry findings
//! (code spans, quoted replies, URLs). Zones are recomputed every cycle.

use std::ops::Range;

use proofline_primitives::{CharIdx, SurfaceId, TextSnapshot};

pub trait ZoneProvider: Send + Sync {
	/// Char ranges of `snapshot` to exclude.
	fn zones(&self, surface: SurfaceId, snapshot: &TextSnapshot) -> Vec<Range<CharIdx>>;
}

/// Provider with no exclusion zones.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoZones;

impl ZoneProvider for NoZones {
	fn zones(&self, _surface: SurfaceId, _snapshot: &TextSnapshot) -> Vec<Range<CharIdx>> {
		Vec::new()
	}
}

/// Excludes every span between a pair of backticks.
#[derive(Debug, Clone, Copy, Default)]
pub struct BacktickZones;

impl ZoneProvider for BacktickZones {
	fn zones(&self, _surface: SurfaceId, snapshot: &TextSnapshot) -> Vec<Range<CharIdx>> {
		let mut zones = Vec::new();
		let mut open = None;
		for (idx, c) in snapshot.content.chars().enumerate() {
			if c != '`' {
				continue;
			}
			match open.take() {
				Some(start) => zones.push(start..idx + 1),
				None => open = Some(idx),
			}
		}
		zones
	}
}
