//! Value processors
//!
//! A value processor is the strategy bound to one (host kind, key) pair. It
//! reads and writes a single property directly on the host object.

use crate::host::{Host, HostKind};
use propdata_value::{
    DataValue, ErasedValue, ImmutableValue, Key, KeyId, MutableValue, TransactionResult,
};
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Strategy reading and writing one key on hosts of one kind
///
/// The registry only calls `get`, `set` and `remove_from` on hosts for which
/// `supports` returned true.
pub trait ValueProcessor<V: DataValue>: Send + Sync + fmt::Debug {
    /// Key this processor handles
    fn key(&self) -> &Key<V>;

    /// Most specific host kind this processor applies to
    fn host_kind(&self) -> &'static HostKind;

    /// Whether the property applies to this host instance
    ///
    /// Must be cheap and side-effect free.
    fn supports(&self, host: &dyn Host) -> bool;

    /// Current value, `None` when the property is absent on this instance
    fn get(&self, host: &dyn Host) -> Option<V>;

    /// Write `value`; `false` leaves the host unchanged
    fn set(&self, host: &mut dyn Host, value: V) -> bool;

    /// Remove the property
    ///
    /// Processors for structural properties return NO_DATA without touching
    /// the host.
    fn remove_from(&self, host: &mut dyn Host) -> TransactionResult;

    /// Mutable value wrapper for `value`
    fn construct_value(&self, value: V) -> MutableValue<V> {
        MutableValue::new(self.key().clone(), value)
    }

    /// Immutable value wrapper for `value`
    fn construct_immutable_value(&self, value: V) -> ErasedValue {
        ImmutableValue::new(self.key().clone(), value).erase()
    }

    /// Bounds check, read prior value, write, and report
    ///
    /// - unsupported host: NO_DATA
    /// - out of bounds or refused by `set`: FAILURE, value in `rejected`
    /// - written: SUCCESS, prior value (if any) in `replaced`
    fn offer(&self, host: &mut dyn Host, value: V) -> TransactionResult {
        if !self.supports(host) {
            return TransactionResult::fail_no_data();
        }
        let key = self.key();
        if !key.accepts(&value) {
            tracing::warn!(key = %key.id(), ?value, "rejected out-of-bounds value");
            return TransactionResult::error(self.construct_immutable_value(value));
        }
        let previous = self.get(host);
        let offered = self.construct_immutable_value(value.clone());
        if !self.set(host, value) {
            tracing::warn!(key = %key.id(), host = %host.kind(), "processor refused value");
            return TransactionResult::error(offered);
        }
        let mut builder = TransactionResult::builder().success(offered);
        if let Some(previous) = previous {
            builder = builder.replace(self.construct_immutable_value(previous));
        }
        builder.build()
    }
}

/// Type-erased view of a registered value processor
pub trait AnyValueProcessor: Send + Sync + fmt::Debug {
    /// Id of the handled key
    fn key_id(&self) -> &KeyId;

    /// `TypeId` of the handled value type
    fn value_type(&self) -> TypeId;

    /// Name of the handled value type
    fn value_type_name(&self) -> &'static str;

    /// Most specific host kind
    fn host_kind(&self) -> &'static HostKind;

    /// See [`ValueProcessor::supports`]
    fn supports(&self, host: &dyn Host) -> bool;

    /// Current value, erased
    fn get_erased(&self, host: &dyn Host) -> Option<ErasedValue>;

    /// Whether `value` has the key's type and lies within its bounds
    fn accepts_erased(&self, value: &ErasedValue) -> bool;

    /// Offer an erased value; FAILURE if its type does not match the key
    fn offer_erased(&self, host: &mut dyn Host, value: &ErasedValue) -> TransactionResult;

    /// See [`ValueProcessor::remove_from`]
    fn remove_from(&self, host: &mut dyn Host) -> TransactionResult;

    /// Upcast for recovering the typed processor
    fn as_any(&self) -> &dyn Any;
}

/// Registry slot holding a typed processor behind [`AnyValueProcessor`]
pub(crate) struct ProcessorEntry<V: DataValue>(pub(crate) Arc<dyn ValueProcessor<V>>);

impl<V: DataValue> fmt::Debug for ProcessorEntry<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl<V: DataValue> AnyValueProcessor for ProcessorEntry<V> {
    fn key_id(&self) -> &KeyId {
        self.0.key().id()
    }

    fn value_type(&self) -> TypeId {
        TypeId::of::<V>()
    }

    fn value_type_name(&self) -> &'static str {
        std::any::type_name::<V>()
    }

    fn host_kind(&self) -> &'static HostKind {
        self.0.host_kind()
    }

    fn supports(&self, host: &dyn Host) -> bool {
        self.0.supports(host)
    }

    fn get_erased(&self, host: &dyn Host) -> Option<ErasedValue> {
        self.0.get(host).map(|v| self.0.construct_immutable_value(v))
    }

    fn accepts_erased(&self, value: &ErasedValue) -> bool {
        value.get::<V>().is_some_and(|typed| self.0.key().accepts(typed))
    }

    fn offer_erased(&self, host: &mut dyn Host, value: &ErasedValue) -> TransactionResult {
        match value.get::<V>() {
            Some(typed) => self.0.offer(host, typed.clone()),
            None => TransactionResult::error(value.clone()),
        }
    }

    fn remove_from(&self, host: &mut dyn Host) -> TransactionResult {
        self.0.remove_from(host)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Recover the typed processor behind an erased registry slot
#[must_use]
pub fn downcast_processor<V: DataValue>(
    erased: &dyn AnyValueProcessor,
) -> Option<Arc<dyn ValueProcessor<V>>> {
    erased
        .as_any()
        .downcast_ref::<ProcessorEntry<V>>()
        .map(|entry| Arc::clone(&entry.0))
}
