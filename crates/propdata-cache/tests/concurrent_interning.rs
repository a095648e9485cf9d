//! Concurrent first insertion must publish one canonical instance per key

use propdata_cache::InternCache;
use propdata_value::{ErasedValue, Key};
use proptest::prelude::*;
use rayon::prelude::*;

#[test]
fn racing_first_insertions_publish_one_instance() {
    let cache = InternCache::default();
    let key = Key::bounded("test:level", 0, 0, 15);

    for round in 0..16 {
        let handles: Vec<ErasedValue> = (0..64)
            .into_par_iter()
            .map(|_| cache.intern_value(&key, round))
            .collect();

        let canonical = &handles[0];
        assert!(handles.iter().all(|h| h.ptr_eq(canonical)), "round {round}");
    }

    let stats = cache.stats();
    assert_eq!(stats.misses, 16);
    assert_eq!(stats.entry_count, 16);
}

#[test]
fn racing_tables_are_created_once() {
    let cache = InternCache::default();
    (0..32).into_par_iter().for_each(|n: u32| {
        let _ = cache.table::<u32, u32>().intern(n % 4, |v| *v);
    });

    assert_eq!(cache.table_count(), 1);
    assert_eq!(cache.table::<u32, u32>().stats().misses, 4);
}

proptest! {
    #[test]
    fn equal_arguments_are_identical(a in 0_i32..8, b in 0_i32..8) {
        let cache = InternCache::default();
        let key = Key::plain("test:n", 0_i32);

        let first = cache.intern_value(&key, a);
        let second = cache.intern_value(&key, b);

        prop_assert_eq!(first.ptr_eq(&second), a == b);
        prop_assert_eq!(first == second, a == b);
    }
}
