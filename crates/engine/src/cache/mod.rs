//! Two-tier analysis result cache.
//!
//! Results are keyed by a hash of the analyzed text plus a fingerprint of the
//! analyzer parameters, so the same text analyzed under different settings
//! never shares an entry. Each tier is bounded by a capacity (least recently
//! accessed entry evicted first) and a TTL measured from insertion; expired
//! entries are dropped lazily on lookup.

use std::hash::Hasher;
use std::time::{Duration, Instant};

use lru::LruCache;
use proofline_config::CacheTierConfig;
use proofline_primitives::{Finding, Rope};
use rustc_hash::FxHasher;

use crate::analyzer::AnalysisTier;

#[cfg(test)]
mod tests;

/// Identity of a cached analysis result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
	pub content: u64,
	pub config: u64,
}

impl CacheKey {
	pub fn new(text: &str, fingerprint: u64) -> Self {
		Self {
			content: content_hash(text),
			config: fingerprint,
		}
	}

	pub fn for_rope(rope: &Rope, fingerprint: u64) -> Self {
		Self {
			content: hash_chars(rope.chars()),
			config: fingerprint,
		}
	}
}

/// Hashes the char sequence of `text`.
///
/// Hashing per char rather than per byte run makes a `&str` and a [`Rope`]
/// holding the same text agree regardless of how the rope is chunked.
pub fn content_hash(text: &str) -> u64 {
	hash_chars(text.chars())
}

fn hash_chars(chars: impl Iterator<Item = char>) -> u64 {
	let mut hasher = FxHasher::default();
	let mut len = 0u64;
	for c in chars {
		hasher.write_u32(c as u32);
		len += 1;
	}
	hasher.write_u64(len);
	hasher.finish()
}

#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
	pub value: V,
	pub created_at: Instant,
	pub last_accessed_at: Instant,
}

/// Hit/miss counters for one tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
	pub hits: u64,
	pub misses: u64,
	pub expired: u64,
	pub evicted: u64,
	pub len: usize,
}

/// Bounded TTL cache of analysis results.
pub struct ResultCache<V> {
	name: &'static str,
	capacity: usize,
	ttl: Duration,
	entries: LruCache<CacheKey, CacheEntry<V>>,
	stats: CacheStats,
}

impl<V> ResultCache<V> {
	pub fn new(name: &'static str, capacity: usize, ttl: Duration) -> Self {
		Self {
			name,
			capacity: capacity.max(1),
			ttl,
			entries: LruCache::unbounded(),
			stats: CacheStats::default(),
		}
	}

	pub fn from_config(name: &'static str, config: &CacheTierConfig) -> Self {
		Self::new(name, config.capacity, config.ttl())
	}

	pub fn get(&mut self, key: &CacheKey) -> Option<&V> {
		self.get_at(key, Instant::now())
	}

	/// Looks up `key` as of `now`. An entry older than the TTL is removed and
	/// reported as a miss; a hit refreshes the entry's access time.
	pub fn get_at(&mut self, key: &CacheKey, now: Instant) -> Option<&V> {
		let expired = match self.entries.peek(key) {
			Some(entry) => now.saturating_duration_since(entry.created_at) > self.ttl,
			None => {
				self.stats.misses += 1;
				return None;
			}
		};
		if expired {
			self.entries.pop(key);
			self.stats.misses += 1;
			self.stats.expired += 1;
			tracing::trace!(cache = self.name, "cache.expired");
			return None;
		}

		let entry = self.entries.get_mut(key)?;
		entry.last_accessed_at = now;
		self.stats.hits += 1;
		Some(&entry.value)
	}

	pub fn put(&mut self, key: CacheKey, value: V) {
		self.put_at(key, value, Instant::now());
	}

	/// Inserts or overwrites `key`, then evicts least recently accessed
	/// entries until the tier is back within capacity.
	pub fn put_at(&mut self, key: CacheKey, value: V, now: Instant) {
		self.entries.put(
			key,
			CacheEntry {
				value,
				created_at: now,
				last_accessed_at: now,
			},
		);
		while self.entries.len() > self.capacity {
			if self.entries.pop_lru().is_none() {
				break;
			}
			self.stats.evicted += 1;
			tracing::trace!(cache = self.name, "cache.evicted");
		}
	}

	pub fn clear(&mut self) {
		self.entries.clear();
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn stats(&self) -> CacheStats {
		CacheStats {
			len: self.entries.len(),
			..self.stats
		}
	}
}

/// The fast and slow result tiers.
pub struct AnalysisCaches {
	pub fast: ResultCache<Vec<Finding>>,
	pub slow: ResultCache<Vec<Finding>>,
}

impl AnalysisCaches {
	pub fn new(fast: &CacheTierConfig, slow: &CacheTierConfig) -> Self {
		Self {
			fast: ResultCache::from_config("fast", fast),
			slow: ResultCache::from_config("slow", slow),
		}
	}

	pub fn tier(&mut self, tier: AnalysisTier) -> &mut ResultCache<Vec<Finding>> {
		match tier {
			AnalysisTier::Fast => &mut self.fast,
			AnalysisTier::Slow => &mut self.slow,
		}
	}

	pub fn clear(&mut self) {
		self.fast.clear();
		self.slow.clear();
	}
}
