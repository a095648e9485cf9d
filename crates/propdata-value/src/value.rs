//! Property values
//!
//! Two representations of a single property instance:
//! - [`ImmutableValue<V>`]: frozen snapshot, compared and hashed by (key, value)
//! - [`MutableValue<V>`]: owned, writable cell; never compared by value
//!
//! [`ErasedValue`] carries an immutable value whose type is not known
//! statically, which is what transaction results and bundles store.

use crate::key::{DataValue, Key, KeyId};
use crate::transaction::TransactionResult;
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Immutable property value
///
/// # Invariants
/// - Never changes after construction; `with`/`transform` return new instances
/// - Equality and hashing are structural over (key id, value)
#[derive(Clone)]
pub struct ImmutableValue<V> {
    key: Key<V>,
    value: V,
}

impl<V: DataValue> ImmutableValue<V> {
    /// Create value for key
    #[inline]
    #[must_use]
    pub fn new(key: Key<V>, value: V) -> Self {
        Self { key, value }
    }

    /// Create value holding the key's default
    #[must_use]
    pub fn of_default(key: Key<V>) -> Self {
        let value = key.default_value().clone();
        Self { key, value }
    }

    /// The key
    #[inline]
    #[must_use]
    pub fn key(&self) -> &Key<V> {
        &self.key
    }

    /// The value
    #[inline]
    #[must_use]
    pub fn get(&self) -> &V {
        &self.value
    }

    /// Take the value out
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> V {
        self.value
    }

    /// New instance holding `value`
    #[must_use]
    pub fn with(&self, value: V) -> Self {
        Self::new(self.key.clone(), value)
    }

    /// New instance holding `f(current)`
    #[must_use]
    pub fn transform(&self, f: impl FnOnce(&V) -> V) -> Self {
        self.with(f(&self.value))
    }

    /// Whether the value lies within the key's bounds
    #[inline]
    #[must_use]
    pub fn is_within_bounds(&self) -> bool {
        self.key.accepts(&self.value)
    }

    /// Mutable copy
    #[must_use]
    pub fn as_mutable(&self) -> MutableValue<V> {
        MutableValue::new(self.key.clone(), self.value.clone())
    }

    /// Type-erased form
    #[must_use]
    pub fn erase(self) -> ErasedValue {
        ErasedValue(Arc::new(self))
    }
}

impl<V: DataValue> PartialEq for ImmutableValue<V> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.value == other.value
    }
}

impl<V: DataValue> Eq for ImmutableValue<V> {}

impl<V: DataValue> Hash for ImmutableValue<V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
        self.value.hash(state);
    }
}

impl<V: DataValue> fmt::Debug for ImmutableValue<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={:?}", self.key.id(), self.value)
    }
}

/// Mutable property value
///
/// Holds copied state. Writes are validated against the key's bounds and
/// report their outcome as a [`TransactionResult`].
#[derive(Clone)]
pub struct MutableValue<V> {
    key: Key<V>,
    value: V,
}

impl<V: DataValue> MutableValue<V> {
    /// Create value for key
    #[inline]
    #[must_use]
    pub fn new(key: Key<V>, value: V) -> Self {
        Self { key, value }
    }

    /// The key
    #[inline]
    #[must_use]
    pub fn key(&self) -> &Key<V> {
        &self.key
    }

    /// Current value
    #[inline]
    #[must_use]
    pub fn get(&self) -> &V {
        &self.value
    }

    /// Replace the value
    ///
    /// Out-of-bounds values are rejected and the current value is kept.
    pub fn set(&mut self, value: V) -> TransactionResult {
        if !self.key.accepts(&value) {
            tracing::warn!(key = %self.key.id(), ?value, "rejected out-of-bounds value");
            return TransactionResult::error(ImmutableValue::new(self.key.clone(), value).erase());
        }
        let previous = std::mem::replace(&mut self.value, value.clone());
        TransactionResult::success_replace(
            ImmutableValue::new(self.key.clone(), value).erase(),
            ImmutableValue::new(self.key.clone(), previous).erase(),
        )
    }

    /// Replace the value with `f(current)`
    pub fn transform(&mut self, f: impl FnOnce(&V) -> V) -> TransactionResult {
        let next = f(&self.value);
        self.set(next)
    }

    /// Immutable snapshot of the current value
    #[must_use]
    pub fn as_immutable(&self) -> ImmutableValue<V> {
        ImmutableValue::new(self.key.clone(), self.value.clone())
    }
}

impl<V: DataValue> fmt::Debug for MutableValue<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mutable({}={:?})", self.key.id(), self.value)
    }
}

/// Object-safe view of an [`ImmutableValue<V>`]
pub trait AnyValue: Send + Sync + fmt::Debug + 'static {
    /// Id of the value's key
    fn key_id(&self) -> &KeyId;

    /// Whether the value lies within its key's bounds
    fn within_bounds(&self) -> bool;

    /// Structural equality across erased values
    fn dyn_eq(&self, other: &dyn AnyValue) -> bool;

    /// Structural hash
    fn dyn_hash(&self, state: &mut dyn Hasher);

    /// Upcast for downcasting
    fn as_any(&self) -> &dyn Any;
}

impl<V: DataValue> AnyValue for ImmutableValue<V> {
    fn key_id(&self) -> &KeyId {
        self.key.id()
    }

    fn within_bounds(&self) -> bool {
        self.is_within_bounds()
    }

    fn dyn_eq(&self, other: &dyn AnyValue) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|other| self == other)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        self.hash(&mut state);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Shared, type-erased immutable value
#[derive(Clone)]
pub struct ErasedValue(Arc<dyn AnyValue>);

impl ErasedValue {
    /// Erase a typed value
    #[inline]
    #[must_use]
    pub fn new<V: DataValue>(value: ImmutableValue<V>) -> Self {
        value.erase()
    }

    /// Erase `value` for `key`
    #[must_use]
    pub fn of<V: DataValue>(key: &Key<V>, value: V) -> Self {
        ImmutableValue::new(key.clone(), value).erase()
    }

    /// Id of the value's key
    #[inline]
    #[must_use]
    pub fn key_id(&self) -> &KeyId {
        self.0.key_id()
    }

    /// Whether the value lies within its key's bounds
    #[inline]
    #[must_use]
    pub fn within_bounds(&self) -> bool {
        self.0.within_bounds()
    }

    /// Typed view, `None` if the value type is not `V`
    #[must_use]
    pub fn downcast<V: DataValue>(&self) -> Option<&ImmutableValue<V>> {
        self.0.as_any().downcast_ref::<ImmutableValue<V>>()
    }

    /// Typed value, `None` if the value type is not `V`
    #[must_use]
    pub fn get<V: DataValue>(&self) -> Option<&V> {
        self.downcast::<V>().map(ImmutableValue::get)
    }

    /// `TypeId` of the underlying `ImmutableValue<V>`
    #[inline]
    #[must_use]
    pub fn value_type_id(&self) -> TypeId {
        Any::type_id(self.0.as_any())
    }

    /// Whether both handles share one allocation
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<V: DataValue> From<Arc<ImmutableValue<V>>> for ErasedValue {
    /// Wrap an already shared value without copying it
    fn from(value: Arc<ImmutableValue<V>>) -> Self {
        Self(value)
    }
}

impl<V: DataValue> From<ImmutableValue<V>> for ErasedValue {
    fn from(value: ImmutableValue<V>) -> Self {
        value.erase()
    }
}

impl PartialEq for ErasedValue {
    fn eq(&self, other: &Self) -> bool {
        self.0.dyn_eq(&*other.0)
    }
}

impl Eq for ErasedValue {}

impl Hash for ErasedValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.dyn_hash(state);
    }
}

impl fmt::Debug for ErasedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}
