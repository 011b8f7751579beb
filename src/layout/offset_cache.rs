//! Append-only cache of cumulative offsets for one axis.
//!
//! `entries[i]` is the pixel offset of the start of index `i`. The cache is
//! only ever cleared wholesale (when a new generation starts) and then grown
//! by appending chunks, so readers always see a consistent prefix.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};

/// Token identifying one indexing run of one axis.
///
/// A chunk is appended only if its generation is still the active one when
/// the append happens. Anything else is dropped on the floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(u64);

/// Process-wide counter so tokens never repeat, even across axes.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

impl Generation {
    /// Generation of a cache nobody has indexed yet.
    pub const NONE: Generation = Generation(0);

    /// Mint a fresh, never-before-seen token.
    pub fn mint() -> Self {
        Generation(NEXT_GENERATION.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw token value, mostly for logging.
    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
struct CacheState {
    generation: Generation,
    entries: Vec<f64>,
}

/// Longest single sleep in [`OffsetCache::wait_for_len`]; bounds the cost of a
/// wakeup that raced with the length check.
const WAIT_SLICE: Duration = Duration::from_millis(10);

/// Growable array of precomputed offsets, gated by the active [`Generation`].
#[derive(Debug)]
pub struct OffsetCache {
    state: RwLock<CacheState>,
    /// Mirror of `state.generation` for lock-free supersession checks.
    active: AtomicU64,
    grown: Condvar,
    grown_lock: Mutex<()>,
}

impl Default for OffsetCache {
    fn default() -> Self {
        Self::new()
    }
}

impl OffsetCache {
    /// Create an empty cache with no active generation.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(CacheState {
                generation: Generation::NONE,
                entries: Vec::new(),
            }),
            active: AtomicU64::new(Generation::NONE.0),
            grown: Condvar::new(),
            grown_lock: Mutex::new(()),
        }
    }

    /// The generation whose chunks are currently accepted.
    pub fn active_generation(&self) -> Generation {
        Generation(self.active.load(Ordering::Acquire))
    }

    /// True if `generation` is still the active one.
    pub fn is_current(&self, generation: Generation) -> bool {
        self.active.load(Ordering::Acquire) == generation.0
    }

    /// Make `generation` active and drop every entry.
    ///
    /// After this returns no chunk from an older generation can land.
    pub fn reset(&self, generation: Generation) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.generation = generation;
        state.entries.clear();
        self.active.store(generation.0, Ordering::Release);
    }

    /// Append `chunk` if `generation` is still active.
    ///
    /// The check and the append happen under the same write lock, so a reset
    /// racing with this call either fully precedes or fully follows it.
    /// Returns `false` if the chunk was discarded.
    pub fn append_chunk(&self, generation: Generation, chunk: &[f64]) -> bool {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            if state.generation != generation {
                return false;
            }
            state.entries.extend_from_slice(chunk);
        }
        let _guard = self.grown_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.grown.notify_all();
        true
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.read(<[f64]>::len)
    }

    /// True if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cached offset of `index`, if the indexer has reached it.
    pub fn get(&self, index: u32) -> Option<f64> {
        let index = usize::try_from(index).ok()?;
        self.read(|entries| entries.get(index).copied())
    }

    /// Run `f` against the current entries under a read lock.
    pub fn read<R>(&self, f: impl FnOnce(&[f64]) -> R) -> R {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state.entries)
    }

    /// Copy of the current entries.
    pub fn snapshot(&self) -> Vec<f64> {
        self.read(<[f64]>::to_vec)
    }

    /// Block until at least `len` entries are cached or `timeout` elapses.
    ///
    /// Only for callers that can afford to wait (CLI, tests). Queries never
    /// call this. Returns `true` if the length was reached.
    pub fn wait_for_len(&self, len: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.len() >= len {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let guard = self.grown_lock.lock().unwrap_or_else(PoisonError::into_inner);
            let slice = (deadline - now).min(WAIT_SLICE);
            let (_guard, _timed_out) = self
                .grown
                .wait_timeout(guard, slice)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_generations_are_unique() {
        let a = Generation::mint();
        let b = Generation::mint();
        assert_ne!(a, b);
        assert_ne!(a, Generation::NONE);
        assert!(b.get() > a.get());
    }

    #[test]
    fn test_append_requires_active_generation() {
        let cache = OffsetCache::new();
        let g1 = Generation::mint();
        cache.reset(g1);
        assert!(cache.append_chunk(g1, &[0.0, 10.0]));

        let g2 = Generation::mint();
        cache.reset(g2);
        assert!(cache.is_empty());
        assert!(!cache.append_chunk(g1, &[20.0, 30.0]));
        assert!(cache.is_empty());
        assert!(cache.append_chunk(g2, &[0.0]));
        assert_eq!(cache.snapshot(), vec![0.0]);
        assert_eq!(cache.active_generation(), g2);
        assert!(!cache.is_current(g1));
    }

    #[test]
    fn test_get_past_the_end() {
        let cache = OffsetCache::new();
        let g = Generation::mint();
        cache.reset(g);
        cache.append_chunk(g, &[0.0, 5.0, 9.0]);
        assert_eq!(cache.get(2), Some(9.0));
        assert_eq!(cache.get(3), None);
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_wait_for_len_wakes_on_append() {
        let cache = Arc::new(OffsetCache::new());
        let g = Generation::mint();
        cache.reset(g);
        let writer = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                cache.append_chunk(g, &[0.0, 1.0, 2.0]);
            })
        };
        assert!(cache.wait_for_len(3, Duration::from_secs(5)));
        writer.join().unwrap();
        assert!(!cache.wait_for_len(4, Duration::from_millis(30)));
    }
}
