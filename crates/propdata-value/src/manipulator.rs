//! Data manipulators (property bundles)
//!
//! A [`DataKind`] names a bundle of related keys. Bundles exist in two forms:
//! [`DataManipulator`] (mutable, copied state) and
//! [`ImmutableDataManipulator`] (frozen, shared). Converting between the two
//! preserves the key set and every value.

use crate::key::{DataValue, ErasedKey, Key, KeyId};
use crate::transaction::TransactionResult;
use crate::value::{ErasedValue, ImmutableValue};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Identifier of a data kind
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataKindId(Arc<str>);

impl DataKindId {
    /// Create id from string
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Id as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DataKindId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::borrow::Borrow<str> for DataKindId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[derive(Debug)]
struct DataKindDef {
    id: DataKindId,
    keys: Vec<ErasedKey>,
}

/// Named bundle descriptor: an id plus the ordered set of keys it carries
#[derive(Clone)]
pub struct DataKind(Arc<DataKindDef>);

impl DataKind {
    /// Create kind; duplicate keys are collapsed, first occurrence wins
    #[must_use]
    pub fn new(id: &str, keys: impl IntoIterator<Item = ErasedKey>) -> Self {
        let mut unique: Vec<ErasedKey> = Vec::new();
        for key in keys {
            if !unique.contains(&key) {
                unique.push(key);
            }
        }
        Self(Arc::new(DataKindDef {
            id: DataKindId::new(id),
            keys: unique,
        }))
    }

    /// Kind id
    #[inline]
    #[must_use]
    pub fn id(&self) -> &DataKindId {
        &self.0.id
    }

    /// Keys carried by this kind
    #[inline]
    #[must_use]
    pub fn keys(&self) -> &[ErasedKey] {
        &self.0.keys
    }

    /// Whether the kind carries `key`
    #[must_use]
    pub fn contains(&self, key: &KeyId) -> bool {
        self.0.keys.iter().any(|k| k.id() == key)
    }

    fn defaults(&self) -> BTreeMap<KeyId, ErasedValue> {
        self.0
            .keys
            .iter()
            .map(|k| (k.id().clone(), k.default_value()))
            .collect()
    }
}

impl PartialEq for DataKind {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for DataKind {}

impl Hash for DataKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl fmt::Debug for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataKind")
            .field("id", &self.0.id)
            .field("keys", &self.0.keys.iter().map(ErasedKey::id).collect::<Vec<_>>())
            .finish()
    }
}

/// Mutable bundle holding copied values for every key of its kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataManipulator {
    kind: DataKind,
    values: BTreeMap<KeyId, ErasedValue>,
}

impl DataManipulator {
    /// Create bundle filled with key defaults
    #[must_use]
    pub fn new(kind: DataKind) -> Self {
        let values = kind.defaults();
        Self { kind, values }
    }

    /// The bundle kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &DataKind {
        &self.kind
    }

    /// Whether the bundle carries `key`
    #[inline]
    #[must_use]
    pub fn supports(&self, key: &KeyId) -> bool {
        self.values.contains_key(key)
    }

    /// Keys in id order
    pub fn keys(&self) -> impl Iterator<Item = &KeyId> {
        self.values.keys()
    }

    /// Values in key id order
    pub fn values(&self) -> impl Iterator<Item = &ErasedValue> {
        self.values.values()
    }

    /// Current value of `key`
    #[must_use]
    pub fn get<V: DataValue>(&self, key: &Key<V>) -> Option<V> {
        self.values.get(key.id()).and_then(ErasedValue::get::<V>).cloned()
    }

    /// Current value of `key` as an immutable value
    #[must_use]
    pub fn get_value<V: DataValue>(&self, key: &Key<V>) -> Option<ImmutableValue<V>> {
        self.values.get(key.id()).and_then(ErasedValue::downcast::<V>).cloned()
    }

    /// Erased value stored under `key`
    #[inline]
    #[must_use]
    pub fn value_of(&self, key: &KeyId) -> Option<&ErasedValue> {
        self.values.get(key)
    }

    /// Replace the value of `key`
    ///
    /// NO_DATA if the kind does not carry `key`; FAILURE (value kept) if the
    /// new value is out of bounds.
    pub fn set<V: DataValue>(&mut self, key: &Key<V>, value: V) -> TransactionResult {
        self.put(ErasedValue::of(key, value))
    }

    /// Replace a value given in erased form
    pub fn put(&mut self, value: ErasedValue) -> TransactionResult {
        let Some(slot) = self.values.get_mut(value.key_id()) else {
            return TransactionResult::fail_no_data();
        };
        if !value.within_bounds() || slot.value_type_id() != value.value_type_id() {
            tracing::warn!(kind = %self.kind.id(), ?value, "rejected bundle value");
            return TransactionResult::error(value);
        }
        let previous = std::mem::replace(slot, value.clone());
        TransactionResult::success_replace(value, previous)
    }

    /// Frozen copy
    #[must_use]
    pub fn as_immutable(&self) -> ImmutableDataManipulator {
        ImmutableDataManipulator(Arc::new(Frozen {
            kind: self.kind.clone(),
            values: self.values.clone(),
        }))
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Frozen {
    kind: DataKind,
    values: BTreeMap<KeyId, ErasedValue>,
}

/// Immutable, shareable bundle
///
/// # Invariants
/// - Never mutated after construction; `with` returns a new instance
/// - Equality and hashing are structural over (kind, values)
#[derive(Clone)]
pub struct ImmutableDataManipulator(Arc<Frozen>);

impl ImmutableDataManipulator {
    /// Bundle filled with key defaults
    #[must_use]
    pub fn of_defaults(kind: DataKind) -> Self {
        DataManipulator::new(kind).as_immutable()
    }

    /// The bundle kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &DataKind {
        &self.0.kind
    }

    /// Whether the bundle carries `key`
    #[inline]
    #[must_use]
    pub fn supports(&self, key: &KeyId) -> bool {
        self.0.values.contains_key(key)
    }

    /// Keys in id order
    pub fn keys(&self) -> impl Iterator<Item = &KeyId> {
        self.0.values.keys()
    }

    /// Values in key id order
    pub fn values(&self) -> impl Iterator<Item = &ErasedValue> {
        self.0.values.values()
    }

    /// Value of `key`
    #[must_use]
    pub fn get<V: DataValue>(&self, key: &Key<V>) -> Option<V> {
        self.0.values.get(key.id()).and_then(ErasedValue::get::<V>).cloned()
    }

    /// Value of `key` as an immutable value
    #[must_use]
    pub fn get_value<V: DataValue>(&self, key: &Key<V>) -> Option<ImmutableValue<V>> {
        self.0
            .values
            .get(key.id())
            .and_then(ErasedValue::downcast::<V>)
            .cloned()
    }

    /// New bundle with `key` set to `value`
    ///
    /// `None` if the kind does not carry `key` or the value is out of bounds.
    #[must_use]
    pub fn with<V: DataValue>(&self, key: &Key<V>, value: V) -> Option<Self> {
        let mut copy = self.as_mutable();
        copy.set(key, value).is_successful().then(|| copy.as_immutable())
    }

    /// Mutable copy
    #[must_use]
    pub fn as_mutable(&self) -> DataManipulator {
        DataManipulator {
            kind: self.0.kind.clone(),
            values: self.0.values.clone(),
        }
    }

    /// Whether both handles share one allocation
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for ImmutableDataManipulator {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || *self.0 == *other.0
    }
}

impl Eq for ImmutableDataManipulator {}

impl Hash for ImmutableDataManipulator {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.kind.hash(state);
        for value in self.0.values.values() {
            value.hash(state);
        }
    }
}

impl fmt::Debug for ImmutableDataManipulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImmutableDataManipulator")
            .field("kind", self.0.kind.id())
            .field("values", &self.0.values.values().collect::<Vec<_>>())
            .finish()
    }
}

impl From<&DataManipulator> for ImmutableDataManipulator {
    fn from(value: &DataManipulator) -> Self {
        value.as_immutable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::ResultKind;

    fn sheared() -> Key<bool> {
        Key::plain("test:is_sheared", false)
    }

    fn level() -> Key<i32> {
        Key::bounded("test:level", 1, 0, 10)
    }

    fn kind() -> DataKind {
        DataKind::new("test:sheep", [sheared().erased(), level().erased()])
    }

    #[test]
    fn new_bundle_holds_defaults() {
        let bundle = DataManipulator::new(kind());
        assert_eq!(bundle.get(&sheared()), Some(false));
        assert_eq!(bundle.get(&level()), Some(1));
        assert_eq!(bundle.keys().count(), 2);
    }

    #[test]
    fn kind_collapses_duplicate_keys() {
        let k = DataKind::new("test:dup", [sheared().erased(), sheared().erased()]);
        assert_eq!(k.keys().len(), 1);
    }

    #[test]
    fn set_unknown_key_is_no_data() {
        let mut bundle = DataManipulator::new(kind());
        let other = Key::plain("test:unrelated", 0_u8);
        let result = bundle.set(&other, 3);
        assert_eq!(result.kind(), ResultKind::NoData);
    }

    #[test]
    fn set_out_of_bounds_keeps_value() {
        let mut bundle = DataManipulator::new(kind());
        let result = bundle.set(&level(), 11);

        assert_eq!(result.kind(), ResultKind::Failure);
        assert_eq!(bundle.get(&level()), Some(1));
    }

    #[test]
    fn set_reports_replaced() {
        let mut bundle = DataManipulator::new(kind());
        let result = bundle.set(&sheared(), true);

        assert!(result.is_successful());
        assert_eq!(result.replaced()[0].get::<bool>(), Some(&false));
        assert_eq!(bundle.get(&sheared()), Some(true));
    }

    #[test]
    fn put_wrong_value_type_is_rejected() {
        let mut bundle = DataManipulator::new(kind());
        let impostor = Key::plain("test:is_sheared", 0_i32);
        let result = bundle.put(ErasedValue::of(&impostor, 1));

        assert_eq!(result.kind(), ResultKind::Failure);
        assert_eq!(bundle.get(&sheared()), Some(false));
    }

    #[test]
    fn immutable_roundtrip_preserves_values() {
        let mut bundle = DataManipulator::new(kind());
        let _ = bundle.set(&level(), 7);

        let frozen = bundle.as_immutable();
        let thawed = frozen.as_mutable();
        assert_eq!(thawed, bundle);
        assert_eq!(frozen.get(&level()), Some(7));
    }

    #[test]
    fn immutable_with_returns_new_instance() {
        let frozen = ImmutableDataManipulator::of_defaults(kind());
        let changed = frozen.with(&sheared(), true).unwrap();

        assert_eq!(frozen.get(&sheared()), Some(false));
        assert_eq!(changed.get(&sheared()), Some(true));
        assert!(frozen.with(&level(), 99).is_none());
    }

    #[test]
    fn immutable_equality_is_structural() {
        let a = ImmutableDataManipulator::of_defaults(kind());
        let b = ImmutableDataManipulator::of_defaults(kind());
        assert_eq!(a, b);
        assert!(!a.ptr_eq(&b));
    }
}
