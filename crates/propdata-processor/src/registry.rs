//! Processor registry
//!
//! Two phases, as with keys:
//! - [`ProcessorRegistryBuilder`]: accepts processors, rejects duplicates
//!   and ambiguous host kinds as they are registered
//! - [`ProcessorRegistry`]: frozen, `Send + Sync`, resolves the most
//!   specific processor for a (host kind, key) pair
//!
//! # Resolution
//!
//! The host's kind ancestry is walked from most-derived to root and the
//! first kind with a registered processor wins. Only one processor can be
//! registered per (kind, key), so the walk never meets a tie. The winner is
//! final: if it does not support a particular host instance the property is
//! unsupported on that instance, and processors registered on ancestor
//! kinds are not consulted.
//!
//! Results (including "no processor") are memoized per (host kind, key).

use crate::data::{DataProcessor, ValueBackedDataProcessor};
use crate::error::{RegistryError, Result};
use crate::facet::{FacetProcessor, FacetValueProcessor};
use crate::host::HostKind;
use crate::value::{downcast_processor, AnyValueProcessor, ProcessorEntry, ValueProcessor};
use dashmap::DashMap;
use indexmap::IndexMap;
use propdata_cache::InternCache;
use propdata_value::{DataKind, DataKindId, DataValue, Key, KeyError, KeyId, KeyRegistry};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;

type ValueSlots = IndexMap<&'static HostKind, Arc<dyn AnyValueProcessor>>;
type DataSlots = IndexMap<&'static HostKind, Arc<dyn DataProcessor>>;

enum DataEntry {
    Custom(Arc<dyn DataProcessor>),
    ValueBacked,
}

/// Registry under construction
pub struct ProcessorRegistryBuilder {
    values: IndexMap<KeyId, ValueSlots>,
    data: IndexMap<DataKindId, IndexMap<&'static HostKind, DataEntry>>,
    host_kinds: IndexMap<&'static str, &'static HostKind>,
    cache: Option<Arc<InternCache>>,
    memoize: bool,
}

impl Default for ProcessorRegistryBuilder {
    fn default() -> Self {
        Self {
            values: IndexMap::new(),
            data: IndexMap::new(),
            host_kinds: IndexMap::new(),
            cache: None,
            memoize: true,
        }
    }
}

impl ProcessorRegistryBuilder {
    /// Create empty builder (memoization on, no interning)
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Share immutable values of interning processors through `cache`
    ///
    /// Applies to facet processors registered after this call.
    #[must_use]
    pub fn with_intern_cache(mut self, cache: Arc<InternCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Enable or disable resolution memoization
    #[inline]
    #[must_use]
    pub fn with_memoization(mut self, memoize: bool) -> Self {
        self.memoize = memoize;
        self
    }

    /// Register a value processor
    ///
    /// # Errors
    /// - `DuplicateProcessor` if the (host kind, key) pair is taken
    /// - `AmbiguousHostKind` if the host kind's name clashes with a
    ///   different kind already seen
    pub fn register<V, P>(&mut self, processor: P) -> Result<&mut Self>
    where
        V: DataValue,
        P: ValueProcessor<V> + 'static,
    {
        let host = processor.host_kind();
        self.note_host_kind(host)?;

        let key = processor.key().id().clone();
        let slots = self.values.entry(key.clone()).or_default();
        if slots.contains_key(host) {
            return Err(RegistryError::DuplicateProcessor {
                host: host.name(),
                key,
            });
        }
        tracing::trace!(key = %key, host = %host, "registered value processor");
        slots.insert(host, Arc::new(ProcessorEntry(Arc::new(processor))));
        Ok(self)
    }

    /// Register a facet-typed value processor
    ///
    /// # Errors
    /// Same as [`register`](Self::register).
    pub fn register_facet<P: FacetValueProcessor>(&mut self, processor: P) -> Result<&mut Self> {
        let mut adapted = FacetProcessor::new(processor);
        if let Some(cache) = &self.cache {
            adapted = adapted.with_cache(cache);
        }
        self.register::<P::Value, _>(adapted)
    }

    /// Register a hand-written data processor
    ///
    /// # Errors
    /// - `DuplicateDataProcessor` if the (host kind, data kind) pair is taken
    /// - `AmbiguousHostKind` as for value processors
    pub fn register_data<P: DataProcessor + 'static>(&mut self, processor: P) -> Result<&mut Self> {
        let host = processor.host_kind();
        let kind = processor.kind().id().clone();
        self.insert_data(host, kind, DataEntry::Custom(Arc::new(processor)))
    }

    /// Serve `kind` on `host` by composing the value processors of its keys
    ///
    /// Coverage is checked when the registry is frozen.
    ///
    /// # Errors
    /// Same as [`register_data`](Self::register_data).
    pub fn register_value_backed(
        &mut self,
        host: &'static HostKind,
        kind: &DataKindId,
    ) -> Result<&mut Self> {
        self.insert_data(host, kind.clone(), DataEntry::ValueBacked)
    }

    fn insert_data(
        &mut self,
        host: &'static HostKind,
        kind: DataKindId,
        entry: DataEntry,
    ) -> Result<&mut Self> {
        self.note_host_kind(host)?;
        let slots = self.data.entry(kind.clone()).or_default();
        if slots.contains_key(host) {
            return Err(RegistryError::DuplicateDataProcessor {
                host: host.name(),
                kind,
            });
        }
        tracing::trace!(kind = %kind, host = %host, "registered data processor");
        slots.insert(host, entry);
        Ok(self)
    }

    fn note_host_kind(&mut self, kind: &'static HostKind) -> Result<()> {
        for step in kind.ancestry() {
            match self.host_kinds.get(step.name()) {
                Some(seen) if *seen != step => {
                    return Err(RegistryError::AmbiguousHostKind(step.name()));
                }
                Some(_) => {}
                None => {
                    self.host_kinds.insert(step.name(), step);
                }
            }
        }
        Ok(())
    }

    /// Number of value processors registered so far
    #[must_use]
    pub fn value_processor_count(&self) -> usize {
        self.values.values().map(IndexMap::len).sum()
    }

    /// Validate against `keys` and freeze
    ///
    /// # Errors
    /// - `Key(UnknownKey)` / `Key(KeyTypeMismatch)` for processors of keys
    ///   not in `keys`
    /// - `Key(UnknownDataKind)` for data processors of unknown kinds
    /// - `IncompleteDataProcessor` for composed bundles with an uncovered key
    pub fn freeze(self, keys: &KeyRegistry) -> Result<ProcessorRegistry> {
        for (key_id, slots) in &self.values {
            let key = keys.lookup(key_id.as_str())?;
            for processor in slots.values() {
                if processor.value_type() != key.value_type() {
                    return Err(KeyError::KeyTypeMismatch {
                        id: key_id.clone(),
                        actual: key.value_type_name(),
                        requested: processor.value_type_name(),
                    }
                    .into());
                }
            }
        }

        let mut data: HashMap<DataKindId, DataSlots> = HashMap::new();
        for (kind_id, slots) in self.data {
            let kind = keys.kind(kind_id.as_str())?;
            let mut frozen = DataSlots::new();
            for (host, entry) in slots {
                let processor = match entry {
                    DataEntry::Custom(processor) => processor,
                    DataEntry::ValueBacked => compose(&self.values, kind, host)?,
                };
                frozen.insert(host, processor);
            }
            data.insert(kind_id, frozen);
        }

        let data_kinds: Vec<DataKind> = keys
            .kinds()
            .filter(|kind| data.contains_key(kind.id()))
            .cloned()
            .collect();

        let values: HashMap<KeyId, ValueSlots> = self.values.into_iter().collect();
        let registry = ProcessorRegistry {
            values,
            data,
            data_kinds,
            host_kinds: self.host_kinds.into_values().collect(),
            memoize: self.memoize,
            value_memo: DashMap::new(),
            data_memo: DashMap::new(),
        };
        tracing::info!(
            value_processors = registry.value_processor_count(),
            data_processors = registry.data_processor_count(),
            host_kinds = registry.host_kinds.len(),
            memoize = registry.memoize,
            "processor registry frozen"
        );
        Ok(registry)
    }
}

fn most_specific<'a, T>(
    slots: &'a IndexMap<&'static HostKind, T>,
    host: &'static HostKind,
) -> Option<&'a T> {
    host.ancestry().find_map(|step| slots.get(step))
}

fn compose(
    values: &IndexMap<KeyId, ValueSlots>,
    kind: &DataKind,
    host: &'static HostKind,
) -> Result<Arc<dyn DataProcessor>> {
    let mut processors = Vec::with_capacity(kind.keys().len());
    for key in kind.keys() {
        let processor = values
            .get(key.id())
            .and_then(|slots| most_specific(slots, host))
            .ok_or_else(|| RegistryError::IncompleteDataProcessor {
                host: host.name(),
                kind: kind.id().clone(),
                key: key.id().clone(),
            })?;
        processors.push(Arc::clone(processor));
    }
    Ok(Arc::new(ValueBackedDataProcessor::new(kind.clone(), host, processors)))
}

/// Frozen processor registry
pub struct ProcessorRegistry {
    values: HashMap<KeyId, ValueSlots>,
    data: HashMap<DataKindId, DataSlots>,
    data_kinds: Vec<DataKind>,
    host_kinds: Vec<&'static HostKind>,
    memoize: bool,
    value_memo: DashMap<(&'static HostKind, KeyId), Option<Arc<dyn AnyValueProcessor>>>,
    data_memo: DashMap<(&'static HostKind, DataKindId), Option<Arc<dyn DataProcessor>>>,
}

impl ProcessorRegistry {
    /// Most specific value processor for `key` on hosts of `host`
    #[must_use]
    pub fn resolve_erased(
        &self,
        host: &'static HostKind,
        key: &KeyId,
    ) -> Option<Arc<dyn AnyValueProcessor>> {
        let walk = || {
            self.values
                .get(key)
                .and_then(|slots| most_specific(slots, host))
                .cloned()
        };
        if !self.memoize {
            return walk();
        }
        let memo_key = (host, key.clone());
        if let Some(hit) = self.value_memo.get(&memo_key) {
            return hit.clone();
        }
        let found = walk();
        tracing::debug!(
            host = %host,
            key = %key,
            resolved_on = found.as_ref().map(|p| p.host_kind().name()),
            "resolved value processor"
        );
        self.value_memo.insert(memo_key, found.clone());
        found
    }

    /// Most specific typed value processor for `key` on hosts of `host`
    #[must_use]
    pub fn resolve<V: DataValue>(
        &self,
        host: &'static HostKind,
        key: &Key<V>,
    ) -> Option<Arc<dyn ValueProcessor<V>>> {
        self.resolve_erased(host, key.id())
            .and_then(|erased| downcast_processor::<V>(&*erased))
    }

    /// Most specific data processor for `kind` on hosts of `host`
    #[must_use]
    pub fn resolve_data(
        &self,
        host: &'static HostKind,
        kind: &DataKindId,
    ) -> Option<Arc<dyn DataProcessor>> {
        let walk = || {
            self.data
                .get(kind)
                .and_then(|slots| most_specific(slots, host))
                .cloned()
        };
        if !self.memoize {
            return walk();
        }
        let memo_key = (host, kind.clone());
        if let Some(hit) = self.data_memo.get(&memo_key) {
            return hit.clone();
        }
        let found = walk();
        tracing::debug!(host = %host, kind = %kind, found = found.is_some(), "resolved data processor");
        self.data_memo.insert(memo_key, found.clone());
        found
    }

    /// Data processors resolvable for `host`, in data kind registration order
    #[must_use]
    pub fn applicable_data(&self, host: &'static HostKind) -> SmallVec<[Arc<dyn DataProcessor>; 8]> {
        self.data_kinds
            .iter()
            .filter_map(|kind| self.resolve_data(host, kind.id()))
            .collect()
    }

    /// Keys with a processor resolvable for `host`
    #[must_use]
    pub fn keys_for(&self, host: &'static HostKind) -> Vec<KeyId> {
        let mut keys: Vec<KeyId> = self
            .values
            .iter()
            .filter(|(_, slots)| most_specific(slots, host).is_some())
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Data kinds served by at least one processor, in registration order
    #[inline]
    #[must_use]
    pub fn data_kinds(&self) -> &[DataKind] {
        &self.data_kinds
    }

    /// Host kinds seen during registration
    #[inline]
    #[must_use]
    pub fn host_kinds(&self) -> &[&'static HostKind] {
        &self.host_kinds
    }

    /// Number of value processors
    #[must_use]
    pub fn value_processor_count(&self) -> usize {
        self.values.values().map(IndexMap::len).sum()
    }

    /// Number of data processors
    #[must_use]
    pub fn data_processor_count(&self) -> usize {
        self.data.values().map(IndexMap::len).sum()
    }

    /// Whether resolution results are memoized
    #[inline]
    #[must_use]
    pub fn is_memoized(&self) -> bool {
        self.memoize
    }

    /// Number of memoized resolutions (value and data)
    #[must_use]
    pub fn memo_len(&self) -> usize {
        self.value_memo.len() + self.data_memo.len()
    }
}

impl std::fmt::Debug for ProcessorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessorRegistry")
            .field("value_processors", &self.value_processor_count())
            .field("data_processors", &self.data_processor_count())
            .field("host_kinds", &self.host_kinds.len())
            .field("memoize", &self.memoize)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for ProcessorRegistryBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessorRegistryBuilder")
            .field("value_processors", &self.value_processor_count())
            .field("data_kinds", &self.data.len())
            .field("memoize", &self.memoize)
            .finish_non_exhaustive()
    }
}
