//! Error types for processor registration

use propdata_value::{DataKindId, KeyError, KeyId};

/// Processor registry configuration error
///
/// Every variant is fatal: registration happens once at startup and any
/// error aborts initialisation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Two value processors for one (host kind, key) pair
    #[error("duplicate value processor for key {key} on host kind {host}")]
    DuplicateProcessor {
        /// Host kind name
        host: &'static str,
        /// Key id
        key: KeyId,
    },

    /// Two data processors for one (host kind, data kind) pair
    #[error("duplicate data processor for {kind} on host kind {host}")]
    DuplicateDataProcessor {
        /// Host kind name
        host: &'static str,
        /// Data kind id
        kind: DataKindId,
    },

    /// Two distinct host kinds share a name
    #[error("host kind name '{0}' is used by two kinds with different ancestry")]
    AmbiguousHostKind(&'static str),

    /// A composed data processor has no value processor for one of its keys
    #[error("data kind {kind} on host kind {host} has no value processor for key {key}")]
    IncompleteDataProcessor {
        /// Host kind name
        host: &'static str,
        /// Data kind id
        kind: DataKindId,
        /// Uncovered key id
        key: KeyId,
    },

    /// Processor refers to an unknown key or data kind
    #[error(transparent)]
    Key(#[from] KeyError),
}

/// Processor registry result alias
pub type Result<T> = std::result::Result<T, RegistryError>;
