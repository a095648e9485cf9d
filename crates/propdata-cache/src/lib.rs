//! propdata interning cache
//!
//! Immutable values and bundles are rebuilt on nearly every property read,
//! and their domains are small. Interning maps value-equal constructions to
//! one shared instance.
//!
//! # Concurrency
//!
//! Lookups and first insertions are safe from any thread. Concurrent first
//! insertions of one key are coalesced: the constructor runs once and every
//! caller receives the same canonical instance. No duplicate is ever
//! published.
//!
//! # Example
//!
//! ```rust
//! use propdata_cache::InternCache;
//! use propdata_value::Key;
//!
//! let cache = InternCache::default();
//! let sheared = Key::plain("core:is_sheared", false);
//!
//! let a = cache.intern_value(&sheared, true);
//! let b = cache.intern_value(&sheared, true);
//! assert!(a.ptr_eq(&b));
//! ```

mod cache;
mod table;

// Re-exports
pub use cache::{InternCache, DEFAULT_INITIAL_CAPACITY};
pub use table::{InternStats, InternTable};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
