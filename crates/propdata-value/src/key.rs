//! Typed property keys
//!
//! A [`Key<V>`] names one property, declares the Rust type of its value, the
//! [`ValueShape`] of that value and the default used when a host exposes the
//! property without anything stored.

use crate::value::{ErasedValue, ImmutableValue};
use std::any::{Any, TypeId};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Marker for types that can be stored as a property value
///
/// Immutable values are compared and hashed structurally, so every value
/// type must be `Eq + Hash`. Blanket-implemented.
pub trait DataValue: Clone + fmt::Debug + Eq + Hash + Send + Sync + 'static {}

impl<T> DataValue for T where T: Clone + fmt::Debug + Eq + Hash + Send + Sync + 'static {}

/// Namespaced identifier of a key (`namespace:path`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyId(Arc<str>);

impl KeyId {
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

    /// Namespace part (before the first `:`), empty if absent
    #[must_use]
    pub fn namespace(&self) -> &str {
        self.0.split_once(':').map_or("", |(ns, _)| ns)
    }

    /// Path part (after the first `:`)
    #[must_use]
    pub fn path(&self) -> &str {
        self.0.split_once(':').map_or(&self.0, |(_, path)| path)
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for KeyId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl Borrow<str> for KeyId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Shape of the value a key carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueShape {
    /// Single plain value
    Plain,

    /// Ordered value restricted to an inclusive range
    Bounded,

    /// Ordered list of values
    List,

    /// Map of values
    Map,
}

impl fmt::Display for ValueShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Plain => "plain",
            Self::Bounded => "bounded",
            Self::List => "list",
            Self::Map => "map",
        };
        f.write_str(name)
    }
}

/// Inclusive bounds of a bounded key
///
/// The comparator is captured when the bounds are built, so `V` itself
/// only needs `Ord` at construction time.
pub struct Bounds<V> {
    min: V,
    max: V,
    cmp: fn(&V, &V) -> Ordering,
}

impl<V: Ord> Bounds<V> {
    /// Create bounds `[min, max]`
    #[inline]
    #[must_use]
    pub fn new(min: V, max: V) -> Self {
        Self {
            min,
            max,
            cmp: V::cmp,
        }
    }
}

impl<V> Bounds<V> {
    /// Lower bound (inclusive)
    #[inline]
    #[must_use]
    pub fn min(&self) -> &V {
        &self.min
    }

    /// Upper bound (inclusive)
    #[inline]
    #[must_use]
    pub fn max(&self) -> &V {
        &self.max
    }

    /// Check `min <= value <= max`
    #[inline]
    #[must_use]
    pub fn contains(&self, value: &V) -> bool {
        (self.cmp)(&self.min, value) != Ordering::Greater
            && (self.cmp)(value, &self.max) != Ordering::Greater
    }

    /// Check `min <= max`
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (self.cmp)(&self.min, &self.max) != Ordering::Greater
    }
}

impl<V: Clone> Clone for Bounds<V> {
    fn clone(&self) -> Self {
        Self {
            min: self.min.clone(),
            max: self.max.clone(),
            cmp: self.cmp,
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Bounds<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bounds")
            .field("min", &self.min)
            .field("max", &self.max)
            .finish()
    }
}

struct KeyDef<V> {
    id: KeyId,
    shape: ValueShape,
    default: V,
    bounds: Option<Bounds<V>>,
}

/// Typed property key
///
/// # Invariants
/// - Identity (equality, hashing) is the id alone
/// - Shape, default and bounds never change after construction
/// - Cheap to clone
pub struct Key<V> {
    def: Arc<KeyDef<V>>,
}

impl<V> Clone for Key<V> {
    fn clone(&self) -> Self {
        Self {
            def: Arc::clone(&self.def),
        }
    }
}

impl<V> PartialEq for Key<V> {
    fn eq(&self, other: &Self) -> bool {
        self.def.id == other.def.id
    }
}

impl<V> Eq for Key<V> {}

impl<V> Hash for Key<V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.def.id.hash(state);
    }
}

impl<V> fmt::Debug for Key<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({}, {})", self.def.id, self.def.shape)
    }
}

impl<V: DataValue> Key<V> {
    fn with_def(id: &str, shape: ValueShape, default: V, bounds: Option<Bounds<V>>) -> Self {
        Self {
            def: Arc::new(KeyDef {
                id: KeyId::new(id),
                shape,
                default,
                bounds,
            }),
        }
    }

    /// Create key for a plain value
    #[must_use]
    pub fn plain(id: &str, default: V) -> Self {
        Self::with_def(id, ValueShape::Plain, default, None)
    }

    /// Create key for a value restricted to `[min, max]`
    #[must_use]
    pub fn bounded(id: &str, default: V, min: V, max: V) -> Self
    where
        V: Ord,
    {
        Self::with_def(id, ValueShape::Bounded, default, Some(Bounds::new(min, max)))
    }

    /// Key id
    #[inline]
    #[must_use]
    pub fn id(&self) -> &KeyId {
        &self.def.id
    }

    /// Value shape
    #[inline]
    #[must_use]
    pub fn shape(&self) -> ValueShape {
        self.def.shape
    }

    /// Default value
    #[inline]
    #[must_use]
    pub fn default_value(&self) -> &V {
        &self.def.default
    }

    /// Bounds (bounded keys only)
    #[inline]
    #[must_use]
    pub fn bounds(&self) -> Option<&Bounds<V>> {
        self.def.bounds.as_ref()
    }

    /// Check value against the key's bounds
    #[inline]
    #[must_use]
    pub fn accepts(&self, value: &V) -> bool {
        self.def.bounds.as_ref().map_or(true, |b| b.contains(value))
    }

    /// Type-erased handle to this key
    #[must_use]
    pub fn erased(&self) -> ErasedKey {
        ErasedKey(Arc::new(self.clone()))
    }
}

impl<T: DataValue> Key<Vec<T>> {
    /// Create key for a list value
    #[must_use]
    pub fn list(id: &str, default: Vec<T>) -> Self {
        Self::with_def(id, ValueShape::List, default, None)
    }
}

impl<K: DataValue + Ord, T: DataValue> Key<BTreeMap<K, T>> {
    /// Create key for a map value
    #[must_use]
    pub fn map(id: &str, default: BTreeMap<K, T>) -> Self {
        Self::with_def(id, ValueShape::Map, default, None)
    }
}

/// Object-safe view of a [`Key<V>`] whose value type is not known statically
pub trait AnyKey: Send + Sync + fmt::Debug + 'static {
    /// Key id
    fn id(&self) -> &KeyId;

    /// Value shape
    fn shape(&self) -> ValueShape;

    /// `TypeId` of the value type
    fn value_type(&self) -> TypeId;

    /// Name of the value type (diagnostics only)
    fn value_type_name(&self) -> &'static str;

    /// Default value, erased
    fn default_erased(&self) -> ErasedValue;

    /// Whether the bounds (if any) are well formed
    fn has_valid_bounds(&self) -> bool;

    /// Whether the default value lies within the bounds (if any)
    fn has_valid_default(&self) -> bool;

    /// Upcast for downcasting back to `Key<V>`
    fn as_any(&self) -> &dyn Any;
}

impl<V: DataValue> AnyKey for Key<V> {
    fn id(&self) -> &KeyId {
        Key::id(self)
    }

    fn shape(&self) -> ValueShape {
        Key::shape(self)
    }

    fn value_type(&self) -> TypeId {
        TypeId::of::<V>()
    }

    fn value_type_name(&self) -> &'static str {
        std::any::type_name::<V>()
    }

    fn default_erased(&self) -> ErasedValue {
        ImmutableValue::new(self.clone(), self.default_value().clone()).erase()
    }

    fn has_valid_bounds(&self) -> bool {
        self.bounds().map_or(true, Bounds::is_valid)
    }

    fn has_valid_default(&self) -> bool {
        self.accepts(self.default_value())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Shared, type-erased key handle
#[derive(Clone)]
pub struct ErasedKey(Arc<dyn AnyKey>);

impl ErasedKey {
    /// Key id
    #[inline]
    #[must_use]
    pub fn id(&self) -> &KeyId {
        self.0.id()
    }

    /// Value shape
    #[inline]
    #[must_use]
    pub fn shape(&self) -> ValueShape {
        self.0.shape()
    }

    /// Name of the value type
    #[inline]
    #[must_use]
    pub fn value_type_name(&self) -> &'static str {
        self.0.value_type_name()
    }

    /// `TypeId` of the value type
    #[inline]
    #[must_use]
    pub fn value_type(&self) -> TypeId {
        self.0.value_type()
    }

    /// Whether the value type is `V`
    #[inline]
    #[must_use]
    pub fn is<V: DataValue>(&self) -> bool {
        self.0.value_type() == TypeId::of::<V>()
    }

    /// Recover the typed key
    #[must_use]
    pub fn downcast<V: DataValue>(&self) -> Option<Key<V>> {
        self.0.as_any().downcast_ref::<Key<V>>().cloned()
    }

    /// Default value, erased
    #[must_use]
    pub fn default_value(&self) -> ErasedValue {
        self.0.default_erased()
    }

    pub(crate) fn has_valid_bounds(&self) -> bool {
        self.0.has_valid_bounds()
    }

    pub(crate) fn has_valid_default(&self) -> bool {
        self.0.has_valid_default()
    }
}

impl PartialEq for ErasedKey {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for ErasedKey {}

impl Hash for ErasedKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Debug for ErasedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl<V: DataValue> From<&Key<V>> for ErasedKey {
    fn from(key: &Key<V>) -> Self {
        key.erased()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_id_parts() {
        let id = KeyId::new("core:has_gravity");
        assert_eq!(id.namespace(), "core");
        assert_eq!(id.path(), "has_gravity");

        let bare = KeyId::new("bare");
        assert_eq!(bare.namespace(), "");
        assert_eq!(bare.path(), "bare");
    }

    #[test]
    fn key_equality_is_by_id() {
        let a = Key::plain("test:flag", true);
        let b = Key::plain("test:flag", false);
        let c = Key::plain("test:other", true);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn bounded_key_accepts_inclusive_range() {
        let key = Key::bounded("test:level", 5, 0, 10);
        assert_eq!(key.shape(), ValueShape::Bounded);
        assert!(key.accepts(&0));
        assert!(key.accepts(&10));
        assert!(!key.accepts(&-1));
        assert!(!key.accepts(&11));
    }

    #[test]
    fn plain_key_accepts_everything() {
        let key = Key::plain("test:count", 0_i64);
        assert!(key.bounds().is_none());
        assert!(key.accepts(&i64::MIN));
    }

    #[test]
    fn inverted_bounds_are_invalid() {
        let bounds = Bounds::new(10, 0);
        assert!(!bounds.is_valid());
        assert!(!bounds.contains(&5));
    }

    #[test]
    fn list_and_map_shapes() {
        let list = Key::list("test:names", vec!["a".to_string()]);
        assert_eq!(list.shape(), ValueShape::List);

        let map: Key<BTreeMap<String, i32>> = Key::map("test:scores", BTreeMap::new());
        assert_eq!(map.shape(), ValueShape::Map);
    }

    #[test]
    fn erased_key_downcast() {
        let key = Key::plain("test:flag", true);
        let erased = key.erased();

        assert!(erased.is::<bool>());
        assert!(!erased.is::<i32>());
        assert_eq!(erased.downcast::<bool>(), Some(key));
        assert!(erased.downcast::<i32>().is_none());
        assert_eq!(erased.value_type(), TypeId::of::<bool>());
    }

    #[test]
    fn default_outside_bounds_is_invalid() {
        let key = Key::bounded("test:level", 100, 0, 10);
        assert!(key.erased().has_valid_bounds());
        assert!(!key.erased().has_valid_default());
        assert!(Key::bounded("test:level", 10, 0, 10).erased().has_valid_default());
    }

    #[test]
    fn erased_key_default_value() {
        let key = Key::plain("test:flag", true);
        let default = key.erased().default_value();
        assert_eq!(default.get::<bool>(), Some(&true));
    }
}
