//! Error types for key and data kind registration

use crate::key::KeyId;
use crate::manipulator::DataKindId;

/// Key registry error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    /// Key id registered twice
    #[error("duplicate key: {0}")]
    DuplicateKey(KeyId),

    /// Key id not registered
    #[error("unknown key: {0}")]
    UnknownKey(KeyId),

    /// Key id does not match `namespace:path`
    #[error("invalid key id '{0}': expected lowercase 'namespace:path'")]
    InvalidKeyId(String),

    /// Key registered with a different value type than requested
    #[error("key {id} holds {actual}, requested {requested}")]
    KeyTypeMismatch {
        /// Key id
        id: KeyId,
        /// Registered value type
        actual: &'static str,
        /// Requested value type
        requested: &'static str,
    },

    /// Bounded key with `min > max`
    #[error("invalid bounds on key {0}: min exceeds max")]
    InvalidBounds(KeyId),

    /// Bounded key whose default lies outside its bounds
    #[error("invalid default on key {0}: outside the key's bounds")]
    InvalidDefault(KeyId),

    /// Data kind id registered twice
    #[error("duplicate data kind: {0}")]
    DuplicateDataKind(DataKindId),

    /// Data kind id not registered
    #[error("unknown data kind: {0}")]
    UnknownDataKind(DataKindId),

    /// Data kind references a key that is not registered
    #[error("data kind {kind} references unregistered key {key}")]
    KindKeyUnregistered {
        /// Data kind id
        kind: DataKindId,
        /// Missing key id
        key: KeyId,
    },
}

/// Key registry result alias
pub type Result<T> = std::result::Result<T, KeyError>;
