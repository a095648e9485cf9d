//! Typed interning table over moka

use moka::sync::Cache;
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Statistics for interning performance monitoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InternStats {
    /// Number of canonical instances held
    pub entry_count: u64,

    /// Lookups answered by an existing instance
    pub hits: u64,

    /// Lookups that constructed the canonical instance
    pub misses: u64,
}

impl InternStats {
    /// Combine two snapshots
    #[inline]
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            entry_count: self.entry_count + other.entry_count,
            hits: self.hits + other.hits,
            misses: self.misses + other.misses,
        }
    }
}

/// Interning table from canonical arguments `A` to shared instances of `T`
///
/// # Invariants
/// - Entries are never evicted or expired
/// - Equal arguments always yield the same `Arc`, including under
///   concurrent first insertion: moka coalesces concurrent `get_with`
///   calls for one key, so `build` runs once and every caller receives the
///   published instance
pub struct InternTable<A, T> {
    inner: Cache<A, Arc<T>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<A, T> InternTable<A, T>
where
    A: Hash + Eq + Clone + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    /// Create table sized for `initial_capacity` entries
    #[must_use]
    pub fn new(initial_capacity: usize) -> Self {
        Self {
            inner: Cache::builder().initial_capacity(initial_capacity).build(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Canonical instance for `args`, constructing it on first request
    pub fn intern(&self, args: A, build: impl FnOnce(&A) -> T) -> Arc<T> {
        let mut built = false;
        let key = args.clone();
        let shared = self.inner.get_with(key, || {
            built = true;
            Arc::new(build(&args))
        });
        if built {
            self.misses.fetch_add(1, Ordering::Relaxed);
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        shared
    }

    /// Existing canonical instance for `args`
    #[must_use]
    pub fn get(&self, args: &A) -> Option<Arc<T>> {
        self.inner.get(args)
    }

    /// Whether `args` has been interned
    #[inline]
    #[must_use]
    pub fn contains(&self, args: &A) -> bool {
        self.inner.contains_key(args)
    }

    /// Current statistics
    #[must_use]
    pub fn stats(&self) -> InternStats {
        self.inner.run_pending_tasks();
        InternStats {
            entry_count: self.inner.entry_count(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl<A, T> fmt::Debug for InternTable<A, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InternTable")
            .field("args", &std::any::type_name::<A>())
            .field("instance", &std::any::type_name::<T>())
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
