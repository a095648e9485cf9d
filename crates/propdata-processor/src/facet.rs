//! Facet-typed value processors
//!
//! Most processors only care about one facet of the host (an entity's
//! motion state, an item's damage counters). [`FacetValueProcessor`] lets
//! them be written against that facet type directly; [`FacetProcessor`]
//! adapts them to [`ValueProcessor`] by looking the facet up on the host.

use crate::host::{Host, HostKind};
use crate::value::ValueProcessor;
use propdata_cache::{InternCache, InternTable};
use propdata_value::{DataValue, ErasedValue, ImmutableValue, Key, KeyId, TransactionResult};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Strategy for one key written against a facet type
pub trait FacetValueProcessor: Send + Sync + 'static {
    /// Facet of the host this processor reads and writes
    type Facet: Any;

    /// Value type of the key
    type Value: DataValue;

    /// Key this processor handles
    fn key(&self) -> &Key<Self::Value>;

    /// Host kind whose facet this processor operates on
    fn host_kind(&self) -> &'static HostKind;

    /// Whether the property applies to this facet
    fn supports_facet(&self, _facet: &Self::Facet) -> bool {
        true
    }

    /// Current value, `None` when absent on this instance
    fn get_value(&self, facet: &Self::Facet) -> Option<Self::Value>;

    /// Write `value`; `false` leaves the facet unchanged
    fn set_value(&self, facet: &mut Self::Facet, value: Self::Value) -> bool;

    /// Remove the property; structural properties keep the default NO_DATA
    fn remove_value(&self, _facet: &mut Self::Facet) -> TransactionResult {
        TransactionResult::fail_no_data()
    }

    /// Whether immutable values of this key are shared through the
    /// interning cache (small, finite value domains)
    fn intern_values(&self) -> bool {
        false
    }
}

type ValueTable<V> = InternTable<(KeyId, V), ImmutableValue<V>>;

/// Adapter from [`FacetValueProcessor`] to [`ValueProcessor`]
pub struct FacetProcessor<P: FacetValueProcessor> {
    inner: P,
    interned: Option<Arc<ValueTable<P::Value>>>,
}

impl<P: FacetValueProcessor> FacetProcessor<P> {
    /// Wrap a facet processor
    #[inline]
    #[must_use]
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            interned: None,
        }
    }

    /// Share immutable values through `cache` when the processor asks for it
    #[must_use]
    pub fn with_cache(mut self, cache: &InternCache) -> Self {
        if self.inner.intern_values() {
            self.interned = Some(cache.table());
        }
        self
    }

    /// The wrapped processor
    #[inline]
    #[must_use]
    pub fn inner(&self) -> &P {
        &self.inner
    }

    fn facet<'a>(&self, host: &'a dyn Host) -> Option<&'a P::Facet> {
        let kind = self.inner.host_kind();
        if !host.kind().is_a(kind) {
            return None;
        }
        let facet = host.facet(kind).and_then(|f| f.downcast_ref::<P::Facet>());
        if facet.is_none() {
            host_type_mismatch::<P>(host.kind(), kind);
        }
        facet
    }

    fn facet_mut<'a>(&self, host: &'a mut dyn Host) -> Option<&'a mut P::Facet> {
        let kind = self.inner.host_kind();
        let host_kind = host.kind();
        if !host_kind.is_a(kind) {
            return None;
        }
        let facet = host.facet_mut(kind).and_then(|f| f.downcast_mut::<P::Facet>());
        if facet.is_none() {
            host_type_mismatch::<P>(host_kind, kind);
        }
        facet
    }
}

fn host_type_mismatch<P: FacetValueProcessor>(host: &HostKind, expected: &HostKind) {
    tracing::error!(
        host = ?host,
        expected = %expected,
        facet = std::any::type_name::<P::Facet>(),
        "host does not expose the facet its kind promises"
    );
    if cfg!(debug_assertions) {
        panic!("host {host:?} has no {expected} facet");
    }
}

impl<P: FacetValueProcessor> ValueProcessor<P::Value> for FacetProcessor<P> {
    fn key(&self) -> &Key<P::Value> {
        self.inner.key()
    }

    fn host_kind(&self) -> &'static HostKind {
        self.inner.host_kind()
    }

    fn supports(&self, host: &dyn Host) -> bool {
        self.facet(host).is_some_and(|f| self.inner.supports_facet(f))
    }

    fn get(&self, host: &dyn Host) -> Option<P::Value> {
        self.facet(host).and_then(|f| self.inner.get_value(f))
    }

    fn set(&self, host: &mut dyn Host, value: P::Value) -> bool {
        self.facet_mut(host)
            .is_some_and(|f| self.inner.set_value(f, value))
    }

    fn remove_from(&self, host: &mut dyn Host) -> TransactionResult {
        match self.facet_mut(host) {
            Some(f) if self.inner.supports_facet(f) => self.inner.remove_value(f),
            _ => TransactionResult::fail_no_data(),
        }
    }

    fn construct_immutable_value(&self, value: P::Value) -> ErasedValue {
        let key = self.inner.key();
        match &self.interned {
            Some(table) => {
                let shared = table.intern((key.id().clone(), value), |(_, v)| {
                    ImmutableValue::new(key.clone(), v.clone())
                });
                ErasedValue::from(shared)
            }
            None => ImmutableValue::new(key.clone(), value).erase(),
        }
    }
}

impl<P: FacetValueProcessor> fmt::Debug for FacetProcessor<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FacetProcessor")
            .field("key", self.inner.key().id())
            .field("host_kind", &self.inner.host_kind().name())
            .field("facet", &std::any::type_name::<P::Facet>())
            .field("interned", &self.interned.is_some())
            .finish()
    }
}
