//! Mapping cache and context scoping
//!
//! Repeated lookups of the same source type are cheap: results are stored
//! in a bounded least-recently-used cache with an expiry window, keyed by a
//! deterministic encoding of the normalized request. Two surfaces exist: a
//! default shared cache used when no context is active, and explicitly
//! constructed scoped contexts that batch jobs and tests activate around a
//! unit of work so runs do not contaminate each other's cache contents.
//!
//! The engine is single-threaded per request; both surfaces are
//! thread-local, which gives a multi-threaded host one independent instance
//! per worker with no locking.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::mapper::MapMode;
use crate::mapper::classify::normalize_source_type;
use crate::types::{MappingResult, TypeMeta};

/// Default bounded capacity of a cache instance
pub const DEFAULT_CACHE_CAPACITY: usize = 512;

/// Default expiry window for cached results
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Encode the deterministic cache key for a mapping request
///
/// Pure over normalized inputs: lowercase/trim, alias collapse, and array
/// markers folded into the normalized name, then
/// `{normalized}|{mode}|{maxLength}|{precision}|{scale}` with empty text
/// for absent fields. Alias spellings (`int4`, `bool`, ...) encode to the
/// same key as their canonical form.
pub fn encode_cache_key(source_type: &str, meta: Option<&TypeMeta>, mode: MapMode) -> String {
    let norm = normalize_source_type(source_type);
    let name = if norm.is_array {
        format!("{}[]", norm.name)
    } else {
        norm.name
    };
    let meta = meta.copied().unwrap_or_default();

    fn field(v: Option<u32>) -> String {
        v.map(|n| n.to_string()).unwrap_or_default()
    }

    format!(
        "{}|{}|{}|{}|{}",
        name,
        mode,
        field(meta.max_length),
        field(meta.precision),
        field(meta.scale)
    )
}

struct CacheEntry {
    result: MappingResult,
    inserted: Instant,
    last_used: u64,
}

/// Bounded LRU cache with an expiry window
///
/// Eviction and expiry are transparent: a miss simply recomputes.
pub struct MappingCache {
    entries: HashMap<String, CacheEntry>,
    capacity: usize,
    ttl: Duration,
    tick: u64,
}

impl MappingCache {
    /// A cache with the default capacity and expiry window
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL)
    }

    /// A cache with explicit capacity and expiry window
    pub fn with_limits(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
            ttl,
            tick: 0,
        }
    }

    /// Look up a cached result, refreshing its recency
    pub fn get(&mut self, key: &str) -> Option<MappingResult> {
        self.tick += 1;
        let tick = self.tick;
        let ttl = self.ttl;

        match self.entries.get_mut(key) {
            Some(entry) if entry.inserted.elapsed() <= ttl => {
                entry.last_used = tick;
                Some(entry.result.clone())
            }
            Some(_) => {
                // Expired entries drop on access
                self.entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store a result, evicting the least recently used entry at capacity
    pub fn insert(&mut self, key: String, result: MappingResult) {
        self.tick += 1;
        if self.entries.len() >= self.capacity && !self.entries.contains_key(&key) {
            if let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, e)| e.last_used)
                .map(|(k, _)| k.clone())
            {
                self.entries.remove(&oldest);
            }
        }
        self.entries.insert(
            key,
            CacheEntry {
                result,
                inserted: Instant::now(),
                last_used: self.tick,
            },
        );
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entries are cached
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MappingCache {
    fn default() -> Self {
        Self::new()
    }
}

thread_local! {
    static DEFAULT_CACHE: RefCell<MappingCache> = RefCell::new(MappingCache::new());
    static CONTEXT_STACK: RefCell<Vec<Rc<RefCell<MappingCache>>>> =
        const { RefCell::new(Vec::new()) };
}

/// A caller-activated cache instance, isolated from the shared default
///
/// Activate with [`with_scoped_context`]; clones share the same underlying
/// cache.
#[derive(Clone)]
pub struct ScopedContext {
    cache: Rc<RefCell<MappingCache>>,
}

impl ScopedContext {
    /// A fresh, empty scoped cache with default limits
    pub fn new() -> Self {
        Self {
            cache: Rc::new(RefCell::new(MappingCache::new())),
        }
    }

    /// A scoped cache with explicit limits
    pub fn with_limits(capacity: usize, ttl: Duration) -> Self {
        Self {
            cache: Rc::new(RefCell::new(MappingCache::with_limits(capacity, ttl))),
        }
    }

    /// Drop every entry in this context
    pub fn clear(&self) {
        self.cache.borrow_mut().clear();
    }

    /// Number of entries cached in this context
    pub fn len(&self) -> usize {
        self.cache.borrow().len()
    }

    /// True when this context holds no entries
    pub fn is_empty(&self) -> bool {
        self.cache.borrow().is_empty()
    }
}

impl Default for ScopedContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Construct a fresh scoped cache context
pub fn create_scoped_context() -> ScopedContext {
    ScopedContext::new()
}

/// Run `f` with `ctx` as the active cache
///
/// Stack-discipline push/pop: the previous context (possibly "none",
/// meaning the shared default) is restored on exit, including when `f`
/// panics.
pub fn with_scoped_context<T>(ctx: &ScopedContext, f: impl FnOnce() -> T) -> T {
    struct PopGuard;
    impl Drop for PopGuard {
        fn drop(&mut self) {
            CONTEXT_STACK.with(|stack| {
                stack.borrow_mut().pop();
            });
        }
    }

    CONTEXT_STACK.with(|stack| stack.borrow_mut().push(ctx.cache.clone()));
    let _guard = PopGuard;
    f()
}

/// Clear the default shared cache for this thread
pub fn clear_global_cache() {
    DEFAULT_CACHE.with(|cache| cache.borrow_mut().clear());
}

/// Run `f` against the active cache: the innermost scoped context, or the
/// shared default when none is active
pub(crate) fn with_active_cache<T>(f: impl FnOnce(&mut MappingCache) -> T) -> T {
    let scoped = CONTEXT_STACK.with(|stack| stack.borrow().last().cloned());
    match scoped {
        Some(cache) => f(&mut cache.borrow_mut()),
        None => DEFAULT_CACHE.with(|cache| f(&mut cache.borrow_mut())),
    }
}
