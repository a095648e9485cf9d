//! Key and data kind registry
//!
//! Two phases:
//! - [`KeyRegistryBuilder`]: accepts registrations, rejects duplicates
//! - [`KeyRegistry`]: frozen catalog, read-only and shareable across threads
//!
//! The frozen registry exposes no write API, so a late registration cannot
//! be expressed.

use crate::error::{KeyError, Result};
use crate::key::{DataValue, ErasedKey, Key, KeyId};
use crate::manipulator::{DataKind, DataKindId};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

static KEY_ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9_.\-]+:[a-z0-9_./\-]+$").expect("key id pattern is a valid regex")
});

/// Check a key or data kind id against `namespace:path`
#[must_use]
pub fn is_valid_id(id: &str) -> bool {
    KEY_ID_PATTERN.is_match(id)
}

/// Registry under construction
#[derive(Debug, Default)]
pub struct KeyRegistryBuilder {
    keys: IndexMap<KeyId, ErasedKey>,
    kinds: IndexMap<DataKindId, DataKind>,
}

impl KeyRegistryBuilder {
    /// Create empty builder
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a typed key
    ///
    /// # Errors
    /// - `InvalidKeyId` if the id is not `namespace:path`
    /// - `DuplicateKey` if the id is already registered
    /// - `InvalidBounds` if a bounded key has `min > max`
    /// - `InvalidDefault` if a bounded key's default is outside its bounds
    pub fn register<V: DataValue>(&mut self, key: &Key<V>) -> Result<&mut Self> {
        self.register_erased(key.erased())
    }

    /// Register an erased key
    ///
    /// # Errors
    /// Same as [`register`](Self::register).
    pub fn register_erased(&mut self, key: ErasedKey) -> Result<&mut Self> {
        if !is_valid_id(key.id().as_str()) {
            return Err(KeyError::InvalidKeyId(key.id().to_string()));
        }
        if self.keys.contains_key(key.id()) {
            return Err(KeyError::DuplicateKey(key.id().clone()));
        }
        if !key.has_valid_bounds() {
            return Err(KeyError::InvalidBounds(key.id().clone()));
        }
        if !key.has_valid_default() {
            return Err(KeyError::InvalidDefault(key.id().clone()));
        }
        tracing::trace!(key = %key.id(), shape = %key.shape(), "registered key");
        self.keys.insert(key.id().clone(), key);
        Ok(self)
    }

    /// Register a data kind; every key it carries must already be registered
    ///
    /// # Errors
    /// - `InvalidKeyId` if the kind id is not `namespace:path`
    /// - `DuplicateDataKind` if the id is already registered
    /// - `KindKeyUnregistered` if the kind carries an unknown key
    /// - `KeyTypeMismatch` if a key of the kind has a different value type
    ///   than the registered key with the same id
    pub fn register_kind(&mut self, kind: DataKind) -> Result<&mut Self> {
        if !is_valid_id(kind.id().as_str()) {
            return Err(KeyError::InvalidKeyId(kind.id().to_string()));
        }
        if self.kinds.contains_key(kind.id()) {
            return Err(KeyError::DuplicateDataKind(kind.id().clone()));
        }
        for key in kind.keys() {
            let Some(registered) = self.keys.get(key.id()) else {
                return Err(KeyError::KindKeyUnregistered {
                    kind: kind.id().clone(),
                    key: key.id().clone(),
                });
            };
            if registered.value_type() != key.value_type() {
                return Err(KeyError::KeyTypeMismatch {
                    id: key.id().clone(),
                    actual: registered.value_type_name(),
                    requested: key.value_type_name(),
                });
            }
        }
        self.kinds.insert(kind.id().clone(), kind);
        Ok(self)
    }

    /// Number of keys registered so far
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether nothing is registered yet
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Freeze into a read-only registry
    #[must_use]
    pub fn build(self) -> KeyRegistry {
        tracing::debug!(keys = self.keys.len(), kinds = self.kinds.len(), "key registry frozen");
        KeyRegistry {
            keys: self.keys,
            kinds: self.kinds,
        }
    }
}

/// Frozen key and data kind catalog
#[derive(Debug, Clone)]
pub struct KeyRegistry {
    keys: IndexMap<KeyId, ErasedKey>,
    kinds: IndexMap<DataKindId, DataKind>,
}

impl KeyRegistry {
    /// Look up a key by id
    ///
    /// # Errors
    /// `UnknownKey` if no key has this id.
    pub fn lookup(&self, id: &str) -> Result<&ErasedKey> {
        self.keys
            .get(id)
            .ok_or_else(|| KeyError::UnknownKey(KeyId::new(id)))
    }

    /// Look up a key and recover its value type
    ///
    /// # Errors
    /// - `UnknownKey` if no key has this id
    /// - `KeyTypeMismatch` if the key's value type is not `V`
    pub fn get<V: DataValue>(&self, id: &str) -> Result<Key<V>> {
        let key = self.lookup(id)?;
        key.downcast::<V>().ok_or_else(|| KeyError::KeyTypeMismatch {
            id: key.id().clone(),
            actual: key.value_type_name(),
            requested: std::any::type_name::<V>(),
        })
    }

    /// Whether a key with this id is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.keys.contains_key(id)
    }

    /// Look up a data kind by id
    ///
    /// # Errors
    /// `UnknownDataKind` if no kind has this id.
    pub fn kind(&self, id: &str) -> Result<&DataKind> {
        self.kinds
            .get(id)
            .ok_or_else(|| KeyError::UnknownDataKind(DataKindId::new(id)))
    }

    /// Keys in registration order
    pub fn iter(&self) -> impl Iterator<Item = &ErasedKey> {
        self.keys.values()
    }

    /// Data kinds in registration order
    pub fn kinds(&self) -> impl Iterator<Item = &DataKind> {
        self.kinds.values()
    }

    /// Number of keys
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the registry holds no keys
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_key_is_rejected() {
        let mut builder = KeyRegistryBuilder::new();
        builder.register(&Key::plain("test:flag", true)).unwrap();

        let err = builder.register(&Key::plain("test:flag", 0_i32)).unwrap_err();
        assert_eq!(err, KeyError::DuplicateKey(KeyId::new("test:flag")));
    }

    #[test]
    fn invalid_ids_are_rejected() {
        let mut builder = KeyRegistryBuilder::new();
        for id in ["nonamespace", "Upper:case", "core:", ":path", "core:has space"] {
            let err = builder.register(&Key::plain(id, true)).unwrap_err();
            assert!(matches!(err, KeyError::InvalidKeyId(_)), "{id}");
        }
        assert!(builder.is_empty());
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let mut builder = KeyRegistryBuilder::new();
        let err = builder.register(&Key::bounded("test:level", 0, 10, 1)).unwrap_err();
        assert_eq!(err, KeyError::InvalidBounds(KeyId::new("test:level")));
    }

    #[test]
    fn default_outside_bounds_is_rejected() {
        let mut builder = KeyRegistryBuilder::new();
        let err = builder.register(&Key::bounded("test:level", 100, 0, 10)).unwrap_err();
        assert_eq!(err, KeyError::InvalidDefault(KeyId::new("test:level")));
        assert!(builder.is_empty());

        builder.register(&Key::bounded("test:level", 10, 0, 10)).unwrap();
    }

    #[test]
    fn lookup_and_typed_get() {
        let mut builder = KeyRegistryBuilder::new();
        builder
            .register(&Key::plain("test:flag", true))
            .unwrap()
            .register(&Key::bounded("test:level", 1, 0, 5))
            .unwrap();
        let registry = builder.build();

        assert_eq!(registry.len(), 2);
        assert!(registry.lookup("test:flag").is_ok());
        assert_eq!(
            registry.lookup("test:missing").unwrap_err(),
            KeyError::UnknownKey(KeyId::new("test:missing"))
        );

        let level: Key<i32> = registry.get("test:level").unwrap();
        assert_eq!(*level.default_value(), 1);
        assert!(matches!(
            registry.get::<bool>("test:level"),
            Err(KeyError::KeyTypeMismatch { .. })
        ));
    }

    #[test]
    fn iteration_follows_registration_order() {
        let mut builder = KeyRegistryBuilder::new();
        for id in ["test:c", "test:a", "test:b"] {
            builder.register(&Key::plain(id, 0_u8)).unwrap();
        }
        let registry = builder.build();
        let ids: Vec<_> = registry.iter().map(|k| k.id().as_str().to_string()).collect();
        assert_eq!(ids, ["test:c", "test:a", "test:b"]);
    }

    #[test]
    fn kind_requires_registered_keys() {
        let flag = Key::plain("test:flag", true);
        let mut builder = KeyRegistryBuilder::new();

        let err = builder
            .register_kind(DataKind::new("test:bundle", [flag.erased()]))
            .unwrap_err();
        assert!(matches!(err, KeyError::KindKeyUnregistered { .. }));

        builder.register(&flag).unwrap();
        builder
            .register_kind(DataKind::new("test:bundle", [flag.erased()]))
            .unwrap();
        let err = builder
            .register_kind(DataKind::new("test:bundle", [flag.erased()]))
            .unwrap_err();
        assert_eq!(err, KeyError::DuplicateDataKind(DataKindId::new("test:bundle")));

        let registry = builder.build();
        assert_eq!(registry.kind("test:bundle").unwrap().keys().len(), 1);
        assert!(registry.kind("test:nope").is_err());
    }

    #[test]
    fn kind_key_with_other_value_type_is_rejected() {
        let mut builder = KeyRegistryBuilder::new();
        builder.register(&Key::plain("test:flag", true)).unwrap();

        let impostor = Key::plain("test:flag", 42_u8);
        let err = builder
            .register_kind(DataKind::new("test:bundle", [impostor.erased()]))
            .unwrap_err();
        assert!(matches!(
            err,
            KeyError::KeyTypeMismatch { ref id, .. } if id.as_str() == "test:flag"
        ));
        assert!(builder.build().kind("test:bundle").is_err());
    }
}
