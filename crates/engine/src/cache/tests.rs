use std::time::{Duration, Instant};

use proofline_primitives::Rope;

use super::*;

fn key(text: &str) -> CacheKey {
	CacheKey::new(text, 7)
}

#[test]
fn hit_refreshes_access_time_but_not_age() {
	let mut cache = ResultCache::new("test", 4, Duration::from_secs(10));
	let t0 = Instant::now();
	cache.put_at(key("a"), 1, t0);

	assert_eq!(cache.get_at(&key("a"), t0 + Duration::from_secs(9)), Some(&1));
	// Age counts from insertion, so access does not extend life.
	assert_eq!(cache.get_at(&key("a"), t0 + Duration::from_secs(11)), None);
	assert!(cache.is_empty());

	let stats = cache.stats();
	assert_eq!(stats.hits, 1);
	assert_eq!(stats.misses, 1);
	assert_eq!(stats.expired, 1);
}

#[test]
fn overflow_evicts_least_recently_accessed() {
	let mut cache = ResultCache::new("test", 2, Duration::from_secs(60));
	let t0 = Instant::now();
	cache.put_at(key("a"), 1, t0);
	cache.put_at(key("b"), 2, t0 + Duration::from_millis(1));
	assert_eq!(cache.get_at(&key("a"), t0 + Duration::from_millis(2)), Some(&1));

	cache.put_at(key("c"), 3, t0 + Duration::from_millis(3));

	assert_eq!(cache.len(), 2);
	assert_eq!(cache.get_at(&key("b"), t0 + Duration::from_millis(4)), None);
	assert_eq!(cache.get_at(&key("a"), t0 + Duration::from_millis(4)), Some(&1));
	assert_eq!(cache.get_at(&key("c"), t0 + Duration::from_millis(4)), Some(&3));
	assert_eq!(cache.stats().evicted, 1);
}

#[test]
fn overwrite_resets_creation_time() {
	let mut cache = ResultCache::new("test", 2, Duration::from_secs(5));
	let t0 = Instant::now();
	cache.put_at(key("a"), 1, t0);
	cache.put_at(key("a"), 2, t0 + Duration::from_secs(4));

	assert_eq!(cache.len(), 1);
	assert_eq!(cache.get_at(&key("a"), t0 + Duration::from_secs(8)), Some(&2));
}

#[test]
fn config_fingerprint_separates_entries() {
	let mut cache = ResultCache::new("test", 8, Duration::from_secs(60));
	cache.put(CacheKey::new("same text", 1), "american");
	cache.put(CacheKey::new("same text", 2), "british");

	assert_eq!(cache.get(&CacheKey::new("same text", 1)), Some(&"american"));
	assert_eq!(cache.get(&CacheKey::new("same text", 2)), Some(&"british"));
	assert_eq!(cache.get(&CacheKey::new("same text", 3)), None);
}

#[test]
fn rope_and_str_keys_agree() {
	let text = "ünïcode text spanning several words ".repeat(200);
	let rope = Rope::from_str(&text);
	assert_eq!(CacheKey::for_rope(&rope, 9), CacheKey::new(&text, 9));
	assert_ne!(CacheKey::new("ab", 9), CacheKey::new("ba", 9));
}

#[test]
fn tiers_clear_together() {
	let tier = proofline_config::CacheTierConfig { capacity: 4, ttl_secs: 60 };
	let mut caches = AnalysisCaches::new(&tier, &tier);
	caches.tier(AnalysisTier::Fast).put(key("x"), Vec::new());
	caches.tier(AnalysisTier::Slow).put(key("x"), Vec::new());

	caches.clear();

	assert!(caches.fast.is_empty());
	assert!(caches.slow.is_empty());
}
