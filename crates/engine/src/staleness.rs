//! Per-surface generation counters.
//!
//! Every accepted text change bumps its surface's generation. Work is tagged
//! with the generation it was captured at and is only applied while that tag
//! is still current; there is no preemption, stale work simply finishes and
//! is thrown away.

use proofline_primitives::{Generation, SurfaceId};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
	Current,
	Stale { captured: Generation, current: Generation },
}

#[derive(Debug, Default)]
pub struct GenerationTracker {
	current: FxHashMap<SurfaceId, Generation>,
}

impl GenerationTracker {
	/// Advances `surface` to its next generation and returns it.
	pub fn bump(&mut self, surface: SurfaceId) -> Generation {
		let slot = self.current.entry(surface).or_insert(Generation::ZERO);
		*slot = slot.next();
		*slot
	}

	/// Current generation, [`Generation::ZERO`] for a surface never seen.
	pub fn current(&self, surface: SurfaceId) -> Generation {
		self.current.get(&surface).copied().unwrap_or(Generation::ZERO)
	}

	pub fn check(&self, surface: SurfaceId, captured: Generation) -> Freshness {
		let current = self.current(surface);
		if captured == current {
			Freshness::Current
		} else {
			Freshness::Stale { captured, current }
		}
	}

	pub fn is_current(&self, surface: SurfaceId, captured: Generation) -> bool {
		self.check(surface, captured) == Freshness::Current
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn generations_are_per_surface_and_monotonic() {
		let mut tracker = GenerationTracker::default();
		let a = SurfaceId(1);
		let b = SurfaceId(2);

		assert_eq!(tracker.current(a), Generation::ZERO);
		let g1 = tracker.bump(a);
		let g2 = tracker.bump(a);
		assert!(g2 > g1);
		assert_eq!(tracker.bump(b), Generation(1));

		assert!(tracker.is_current(a, g2));
		assert_eq!(tracker.check(a, g1), Freshness::Stale { captured: g1, current: g2 });
	}
}
