//! Process-wide interning cache
//!
//! One [`InternTable`] per (argument type, instance type) pair, created
//! lazily and shared by every caller.

use crate::table::{InternStats, InternTable};
use dashmap::DashMap;
use propdata_value::{DataValue, ErasedValue, ImmutableDataManipulator, ImmutableValue, Key, KeyId};
use std::any::{Any, TypeId};
use std::hash::Hash;
use std::sync::Arc;

/// Default capacity hint of a fresh table
pub const DEFAULT_INITIAL_CAPACITY: usize = 256;

type ValueArgs<V> = (KeyId, V);

struct TableSlot {
    table: Arc<dyn Any + Send + Sync>,
    stats: fn(&(dyn Any + Send + Sync)) -> InternStats,
}

/// Concurrent set of interning tables keyed by type
pub struct InternCache {
    tables: DashMap<TypeId, TableSlot>,
    initial_capacity: usize,
}

impl InternCache {
    /// Create cache whose tables start at `initial_capacity`
    #[must_use]
    pub fn new(initial_capacity: usize) -> Self {
        Self {
            tables: DashMap::new(),
            initial_capacity,
        }
    }

    /// Table for arguments `A` and instances `T`, created on first use
    #[must_use]
    pub fn table<A, T>(&self) -> Arc<InternTable<A, T>>
    where
        A: Hash + Eq + Clone + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        let slot = self
            .tables
            .entry(TypeId::of::<InternTable<A, T>>())
            .or_insert_with(|| {
                tracing::debug!(
                    args = std::any::type_name::<A>(),
                    instance = std::any::type_name::<T>(),
                    "created intern table"
                );
                TableSlot {
                    table: Arc::new(InternTable::<A, T>::new(self.initial_capacity)),
                    stats: table_stats::<A, T>,
                }
            });
        match Arc::clone(&slot.table).downcast::<InternTable<A, T>>() {
            Ok(table) => table,
            Err(_) => unreachable!("intern tables are keyed by their own TypeId"),
        }
    }

    /// Canonical immutable value for `(key, value)`
    ///
    /// The returned handle shares its allocation with every other call for an
    /// equal pair, so [`ErasedValue::ptr_eq`] holds between them.
    #[must_use]
    pub fn intern_value<V: DataValue>(&self, key: &Key<V>, value: V) -> ErasedValue {
        let shared = self
            .table::<ValueArgs<V>, ImmutableValue<V>>()
            .intern((key.id().clone(), value), |(_, v)| {
                ImmutableValue::new(key.clone(), v.clone())
            });
        ErasedValue::from(shared)
    }

    /// Canonical instance of a frozen bundle
    #[must_use]
    pub fn intern_manipulator(&self, manipulator: ImmutableDataManipulator) -> ImmutableDataManipulator {
        let shared = self
            .table::<ImmutableDataManipulator, ImmutableDataManipulator>()
            .intern(manipulator, ImmutableDataManipulator::clone);
        (*shared).clone()
    }

    /// Number of tables created so far
    #[inline]
    #[must_use]
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Statistics summed over every table
    #[must_use]
    pub fn stats(&self) -> InternStats {
        self.tables
            .iter()
            .map(|slot| (slot.stats)(&*slot.table))
            .fold(InternStats::default(), InternStats::merge)
    }
}

impl Default for InternCache {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_CAPACITY)
    }
}

impl std::fmt::Debug for InternCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InternCache")
            .field("tables", &self.tables.len())
            .field("initial_capacity", &self.initial_capacity)
            .finish()
    }
}

fn table_stats<A, T>(table: &(dyn Any + Send + Sync)) -> InternStats
where
    A: Hash + Eq + Clone + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    table
        .downcast_ref::<InternTable<A, T>>()
        .map(InternTable::<A, T>::stats)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use propdata_value::DataKind;

    #[test]
    fn tables_are_created_once_per_type() {
        let cache = InternCache::default();
        let a = cache.table::<u8, u8>();
        let b = cache.table::<u8, u8>();
        let _ = cache.table::<u16, u8>();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.table_count(), 2);
    }

    #[test]
    fn interned_values_share_allocation() {
        let cache = InternCache::default();
        let key = Key::plain("test:flag", false);

        let a = cache.intern_value(&key, true);
        let b = cache.intern_value(&key, true);
        let c = cache.intern_value(&key, false);

        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
        assert_eq!(a.get::<bool>(), Some(&true));
    }

    #[test]
    fn same_value_under_different_keys_is_distinct() {
        let cache = InternCache::default();
        let a = cache.intern_value(&Key::plain("test:a", false), true);
        let b = cache.intern_value(&Key::plain("test:b", false), true);
        assert!(!a.ptr_eq(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn interned_manipulators_share_allocation() {
        let flag = Key::plain("test:flag", false);
        let kind = DataKind::new("test:bundle", [flag.erased()]);
        let cache = InternCache::default();

        let a = cache.intern_manipulator(ImmutableDataManipulator::of_defaults(kind.clone()));
        let b = cache.intern_manipulator(ImmutableDataManipulator::of_defaults(kind));
        assert!(a.ptr_eq(&b));

        let changed = a.with(&flag, true).unwrap();
        let c = cache.intern_manipulator(changed);
        assert!(!a.ptr_eq(&c));
    }

    #[test]
    fn stats_sum_tables() {
        let cache = InternCache::default();
        let key = Key::plain("test:n", 0_i32);
        for n in [1, 2, 1] {
            let _ = cache.intern_value(&key, n);
        }
        let _ = cache.table::<u8, u8>().intern(1, |n| *n);

        let stats = cache.stats();
        assert_eq!(stats.misses, 3);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.entry_count, 3);
    }
}
