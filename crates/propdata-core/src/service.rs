//! Property access facade
//!
//! [`DataService`] is the surface external callers use: read, write,
//! transform and remove single properties, read and apply whole bundles, and
//! rebuild value-type hosts. It owns the frozen key and processor registries
//! and the interning cache.
//!
//! Per-call outcomes are data, never errors: an unsupported key reads as
//! `None` and writes as NO_DATA.

use crate::builtin;
use crate::config::DataConfig;
use propdata_cache::InternCache;
use propdata_processor::{
    DataProcessor, FacetValueProcessor, Host, HostKind, ProcessorRegistry,
    ProcessorRegistryBuilder, RegistryError, ValueProcessor,
};
use propdata_value::{
    DataKind, DataKindId, DataManipulator, DataValue, ErasedValue, ImmutableDataManipulator,
    ImmutableValue, Key, KeyId, KeyRegistry, KeyRegistryBuilder, TransactionResult,
};
use std::fmt;
use std::sync::Arc;

type Result<T> = std::result::Result<T, RegistryError>;

/// Collects keys, kinds and processors, then freezes them together
pub struct DataServiceBuilder {
    config: DataConfig,
    cache: Arc<InternCache>,
    keys: KeyRegistryBuilder,
    processors: ProcessorRegistryBuilder,
}

impl DataServiceBuilder {
    /// Empty builder configured by `config`
    #[must_use]
    pub fn new(config: DataConfig) -> Self {
        let cache = Arc::new(InternCache::new(config.intern_initial_capacity));
        let mut processors =
            ProcessorRegistryBuilder::new().with_memoization(config.memoize_resolution);
        if config.intern_immutables {
            processors = processors.with_intern_cache(Arc::clone(&cache));
        }
        Self {
            config,
            cache,
            keys: KeyRegistryBuilder::new(),
            processors,
        }
    }

    /// Register a key
    ///
    /// # Errors
    /// `Key(DuplicateKey)` or `Key(InvalidKeyId)`.
    pub fn register_key<V: DataValue>(&mut self, key: &Key<V>) -> Result<&mut Self> {
        self.keys.register(key)?;
        Ok(self)
    }

    /// Register a bundle kind; its keys must already be registered
    ///
    /// # Errors
    /// `Key(DuplicateDataKind)` or `Key(KindKeyUnregistered)`.
    pub fn register_kind(&mut self, kind: DataKind) -> Result<&mut Self> {
        self.keys.register_kind(kind)?;
        Ok(self)
    }

    /// Register a value processor
    ///
    /// # Errors
    /// `DuplicateProcessor` or `AmbiguousHostKind`.
    pub fn register_processor<V, P>(&mut self, processor: P) -> Result<&mut Self>
    where
        V: DataValue,
        P: ValueProcessor<V> + 'static,
    {
        self.processors.register::<V, P>(processor)?;
        Ok(self)
    }

    /// Register a facet-typed value processor
    ///
    /// # Errors
    /// `DuplicateProcessor` or `AmbiguousHostKind`.
    pub fn register_facet<P: FacetValueProcessor>(&mut self, processor: P) -> Result<&mut Self> {
        self.processors.register_facet(processor)?;
        Ok(self)
    }

    /// Register a hand-written data processor
    ///
    /// # Errors
    /// `DuplicateDataProcessor` or `AmbiguousHostKind`.
    pub fn register_data<P: DataProcessor + 'static>(&mut self, processor: P) -> Result<&mut Self> {
        self.processors.register_data(processor)?;
        Ok(self)
    }

    /// Serve `kind` on `host` from the value processors of its keys
    ///
    /// # Errors
    /// `DuplicateDataProcessor` or `AmbiguousHostKind`; coverage errors are
    /// reported by [`build`](Self::build).
    pub fn register_value_backed(
        &mut self,
        host: &'static HostKind,
        kind: &DataKindId,
    ) -> Result<&mut Self> {
        self.processors.register_value_backed(host, kind)?;
        Ok(self)
    }

    /// Register the built-in catalog
    ///
    /// # Errors
    /// Any registration error, e.g. when a built-in key was already
    /// registered by hand.
    pub fn register_builtin(&mut self) -> Result<&mut Self> {
        builtin::register(self)?;
        Ok(self)
    }

    /// Freeze everything registered so far
    ///
    /// # Errors
    /// Freeze-time validation errors of
    /// [`ProcessorRegistryBuilder::freeze`].
    pub fn build(self) -> Result<DataService> {
        let keys = self.keys.build();
        let processors = self.processors.freeze(&keys)?;
        tracing::info!(
            keys = keys.len(),
            data_kinds = processors.data_kinds().len(),
            intern = self.config.intern_immutables,
            "data service ready"
        );
        Ok(DataService {
            config: self.config,
            keys,
            processors,
            cache: self.cache,
        })
    }
}

impl fmt::Debug for DataServiceBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataServiceBuilder")
            .field("config", &self.config)
            .field("keys", &self.keys.len())
            .field("processors", &self.processors)
            .finish_non_exhaustive()
    }
}

/// Frozen property access service
///
/// `Send + Sync`; share it behind an `Arc`.
pub struct DataService {
    config: DataConfig,
    keys: KeyRegistry,
    processors: ProcessorRegistry,
    cache: Arc<InternCache>,
}

impl DataService {
    /// Start a builder
    #[inline]
    #[must_use]
    pub fn builder(config: DataConfig) -> DataServiceBuilder {
        DataServiceBuilder::new(config)
    }

    /// Service with only the built-in catalog registered
    ///
    /// # Errors
    /// Only if the built-in catalog is inconsistent.
    pub fn builtin(config: DataConfig) -> Result<Self> {
        let mut builder = DataServiceBuilder::new(config);
        builder.register_builtin()?;
        builder.build()
    }

    fn value_processor<V: DataValue>(
        &self,
        host: &dyn Host,
        key: &Key<V>,
    ) -> Option<Arc<dyn ValueProcessor<V>>> {
        let processor = self
            .processors
            .resolve(host.kind(), key)
            .filter(|p| p.supports(host));
        if processor.is_none() {
            tracing::trace!(host = %host.kind(), key = %key.id(), "key unsupported on host");
        }
        processor
    }

    fn data_processor(&self, host: &dyn Host, kind: &DataKindId) -> Option<Arc<dyn DataProcessor>> {
        let processor = self
            .processors
            .resolve_data(host.kind(), kind)
            .filter(|p| p.supports(host));
        if processor.is_none() {
            tracing::trace!(host = %host.kind(), kind = %kind, "data kind unsupported on host");
        }
        processor
    }

    /// Current value of `key` on `host`
    #[must_use]
    pub fn get<V: DataValue>(&self, host: &dyn Host, key: &Key<V>) -> Option<V> {
        self.value_processor(host, key)?.get(host)
    }

    /// Current value of `key` on `host`, wrapped with its key
    #[must_use]
    pub fn get_value<V: DataValue>(&self, host: &dyn Host, key: &Key<V>) -> Option<ImmutableValue<V>> {
        let value = self.get(host, key)?;
        Some(ImmutableValue::new(key.clone(), value))
    }

    /// Current value of the key `key` on `host`, as the processor's
    /// (possibly shared) immutable value
    #[must_use]
    pub fn get_erased(&self, host: &dyn Host, key: &KeyId) -> Option<ErasedValue> {
        self.processors
            .resolve_erased(host.kind(), key)
            .filter(|p| p.supports(host))?
            .get_erased(host)
    }

    /// Whether `key` is supported on this host instance
    #[must_use]
    pub fn supports(&self, host: &dyn Host, key: &KeyId) -> bool {
        self.processors
            .resolve_erased(host.kind(), key)
            .is_some_and(|p| p.supports(host))
    }

    /// Write `value` to `key` on `host`
    ///
    /// NO_DATA if unsupported, FAILURE with `value` rejected if out of
    /// bounds or refused, otherwise SUCCESS with the prior value replaced.
    pub fn set<V: DataValue>(&self, host: &mut dyn Host, key: &Key<V>, value: V) -> TransactionResult {
        match self.value_processor(host, key) {
            Some(processor) => processor.offer(host, value),
            None => TransactionResult::fail_no_data(),
        }
    }

    /// Write an erased value to the key it belongs to
    pub fn offer_erased(&self, host: &mut dyn Host, value: &ErasedValue) -> TransactionResult {
        match self.processors.resolve_erased(host.kind(), value.key_id()) {
            Some(processor) => processor.offer_erased(host, value),
            None => TransactionResult::fail_no_data(),
        }
    }

    /// Read, apply `f`, write back
    ///
    /// NO_DATA when the property is unsupported or currently absent.
    pub fn transform<V: DataValue>(
        &self,
        host: &mut dyn Host,
        key: &Key<V>,
        f: impl FnOnce(&V) -> V,
    ) -> TransactionResult {
        let Some(processor) = self.value_processor(host, key) else {
            return TransactionResult::fail_no_data();
        };
        match processor.get(host) {
            Some(current) => processor.offer(host, f(&current)),
            None => TransactionResult::fail_no_data(),
        }
    }

    /// Remove `key` from `host`
    ///
    /// NO_DATA if unsupported or structural.
    pub fn remove(&self, host: &mut dyn Host, key: &KeyId) -> TransactionResult {
        match self.processors.resolve_erased(host.kind(), key) {
            Some(processor) if processor.supports(host) => processor.remove_from(host),
            _ => {
                tracing::trace!(host = %host.kind(), key = %key, "remove of unsupported key");
                TransactionResult::fail_no_data()
            }
        }
    }

    /// Live view of `key` on `host`, `None` if unsupported
    pub fn value_view<'a, V: DataValue>(
        &self,
        host: &'a mut dyn Host,
        key: &Key<V>,
    ) -> Option<ValueView<'a, V>> {
        let processor = self.value_processor(host, key)?;
        Some(ValueView { host, processor })
    }

    /// Bundle of `kind` read from `host`
    #[must_use]
    pub fn get_manipulator(&self, host: &dyn Host, kind: &DataKindId) -> Option<DataManipulator> {
        self.data_processor(host, kind)?.create_from(host)
    }

    /// Apply every value of `manipulator` to `host`
    pub fn offer_manipulator(
        &self,
        host: &mut dyn Host,
        manipulator: &DataManipulator,
    ) -> TransactionResult {
        match self.data_processor(host, manipulator.kind().id()) {
            Some(processor) => processor.put_onto(host, manipulator),
            None => TransactionResult::fail_no_data(),
        }
    }

    /// Remove the bundle `kind` from `host`
    pub fn remove_manipulator(&self, host: &mut dyn Host, kind: &DataKindId) -> TransactionResult {
        match self.data_processor(host, kind) {
            Some(processor) => processor.remove_from(host),
            None => TransactionResult::fail_no_data(),
        }
    }

    /// Immutable snapshot of every bundle currently present on `host`, in
    /// data kind registration order
    #[must_use]
    pub fn get_manipulators(&self, host: &dyn Host) -> Vec<ImmutableDataManipulator> {
        self.processors
            .applicable_data(host.kind())
            .iter()
            .filter(|p| p.supports(host))
            .filter_map(|p| p.create_from(host))
            .map(|m| self.freeze_manipulator(m.as_immutable()))
            .collect()
    }

    /// Copy of the value-type host `state` with `manipulator` applied
    ///
    /// `None` when the bundle cannot be expressed on this state.
    #[must_use]
    pub fn state_with_data<S: Host + Clone>(
        &self,
        state: &S,
        manipulator: &DataManipulator,
    ) -> Option<S> {
        let mut next = state.clone();
        self.offer_manipulator(&mut next, manipulator)
            .is_successful()
            .then_some(next)
    }

    /// Copy of the value-type host `state` with `key` set to `value`
    ///
    /// `None` when the value cannot be expressed on this state.
    #[must_use]
    pub fn state_with_value<S: Host + Clone, V: DataValue>(
        &self,
        state: &S,
        key: &Key<V>,
        value: V,
    ) -> Option<S> {
        let mut next = state.clone();
        self.set(&mut next, key, value).is_successful().then_some(next)
    }

    /// Shared immutable value for (`key`, `value`)
    #[must_use]
    pub fn intern_value<V: DataValue>(&self, key: &Key<V>, value: V) -> ErasedValue {
        self.cache.intern_value(key, value)
    }

    /// Shared instance structurally equal to `manipulator`
    #[must_use]
    pub fn intern_manipulator(&self, manipulator: ImmutableDataManipulator) -> ImmutableDataManipulator {
        self.cache.intern_manipulator(manipulator)
    }

    fn freeze_manipulator(&self, manipulator: ImmutableDataManipulator) -> ImmutableDataManipulator {
        if self.config.intern_immutables {
            self.cache.intern_manipulator(manipulator)
        } else {
            manipulator
        }
    }

    /// Configuration the service was built with
    #[inline]
    #[must_use]
    pub fn config(&self) -> &DataConfig {
        &self.config
    }

    /// Key registry
    #[inline]
    #[must_use]
    pub fn keys(&self) -> &KeyRegistry {
        &self.keys
    }

    /// Processor registry
    #[inline]
    #[must_use]
    pub fn processors(&self) -> &ProcessorRegistry {
        &self.processors
    }

    /// Interning cache
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &InternCache {
        &self.cache
    }
}

impl fmt::Debug for DataService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataService")
            .field("config", &self.config)
            .field("keys", &self.keys.len())
            .field("processors", &self.processors)
            .field("cache", &self.cache)
            .finish()
    }
}

/// Live view of one property on one host
///
/// Reads and writes go straight through the resolved processor.
pub struct ValueView<'a, V: DataValue> {
    host: &'a mut dyn Host,
    processor: Arc<dyn ValueProcessor<V>>,
}

impl<V: DataValue> ValueView<'_, V> {
    /// Key of the viewed property
    #[inline]
    #[must_use]
    pub fn key(&self) -> &Key<V> {
        self.processor.key()
    }

    /// Current value
    #[must_use]
    pub fn get(&self) -> Option<V> {
        self.processor.get(&*self.host)
    }

    /// Write `value`
    pub fn set(&mut self, value: V) -> TransactionResult {
        self.processor.offer(&mut *self.host, value)
    }

    /// Read, apply `f`, write back; NO_DATA if absent
    pub fn transform(&mut self, f: impl FnOnce(&V) -> V) -> TransactionResult {
        match self.get() {
            Some(current) => self.set(f(&current)),
            None => TransactionResult::fail_no_data(),
        }
    }

    /// Remove the property from the host
    pub fn remove(&mut self) -> TransactionResult {
        self.processor.remove_from(&mut *self.host)
    }

    /// Snapshot of the current value
    #[must_use]
    pub fn as_immutable(&self) -> Option<ImmutableValue<V>> {
        self.get().map(|v| ImmutableValue::new(self.key().clone(), v))
    }
}

impl<V: DataValue> fmt::Debug for ValueView<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueView")
            .field("host", self.host.kind())
            .field("processor", &self.processor)
            .finish()
    }
}
