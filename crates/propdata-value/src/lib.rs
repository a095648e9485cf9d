//! propdata values
//!
//! Typed property keys and the values, bundles and transaction results that
//! flow through the property layer.
//!
//! # Overview
//!
//! - **Key**: typed, namespaced property descriptor with shape and default
//! - **KeyRegistry**: write-once catalog of keys and data kinds
//! - **ImmutableValue / MutableValue**: snapshot and owned cell of one property
//! - **DataManipulator**: bundle of related values in mutable and frozen form
//! - **TransactionResult**: outcome of every mutating call
//!
//! # Example
//!
//! ```rust
//! use propdata_value::{Key, KeyRegistryBuilder, MutableValue, ResultKind};
//!
//! let durability = Key::bounded("core:item_durability", 60, 0, i32::MAX);
//!
//! let mut builder = KeyRegistryBuilder::new();
//! builder.register(&durability).unwrap();
//! let registry = builder.build();
//! assert!(registry.contains("core:item_durability"));
//!
//! let mut value = MutableValue::new(durability, 60);
//! assert_eq!(value.set(-1).kind(), ResultKind::Failure);
//! assert_eq!(*value.get(), 60);
//! ```

pub mod error;
pub mod key;
pub mod manipulator;
pub mod registry;
pub mod transaction;
pub mod value;

// Re-exports
pub use error::KeyError;
pub use key::{AnyKey, Bounds, DataValue, ErasedKey, Key, KeyId, ValueShape};
pub use manipulator::{DataKind, DataKindId, DataManipulator, ImmutableDataManipulator};
pub use registry::{is_valid_id, KeyRegistry, KeyRegistryBuilder};
pub use transaction::{ResultKind, TransactionResult, TransactionResultBuilder};
pub use value::{AnyValue, ErasedValue, ImmutableValue, MutableValue};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with keys and values
    pub use crate::{
        DataKind, DataManipulator, DataValue, ErasedValue, ImmutableDataManipulator,
        ImmutableValue, Key, KeyId, MutableValue, ResultKind, TransactionResult, ValueShape,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
