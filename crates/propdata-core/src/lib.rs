//! propdata core
//!
//! Property access facade over host objects, its configuration, and the
//! built-in property catalog.
//!
//! # Example
//!
//! ```rust
//! use propdata_core::builtin::hosts::Sheep;
//! use propdata_core::builtin::keys::{DyeColor, DYE_COLOR, HAS_GRAVITY};
//! use propdata_core::{DataConfig, DataService};
//!
//! let service = DataService::builtin(DataConfig::default()).unwrap();
//! let mut sheep = Sheep::new(1, DyeColor::Red);
//!
//! assert_eq!(service.get(&sheep, &DYE_COLOR), Some(DyeColor::Red));
//!
//! let result = service.set(&mut sheep, &HAS_GRAVITY, false);
//! assert!(result.is_successful());
//! assert_eq!(service.get(&sheep, &HAS_GRAVITY), Some(false));
//! ```

pub mod builtin;
pub mod config;
pub mod service;

// Re-exports
pub use config::{ConfigError, DataConfig};
pub use service::{DataService, DataServiceBuilder, ValueView};

pub use propdata_cache::{InternCache, InternStats};
pub use propdata_processor::{
    DataProcessor, FacetValueProcessor, Host, HostKind, RegistryError, ValueProcessor,
};
pub use propdata_value::{
    DataKind, DataKindId, DataManipulator, ErasedValue, ImmutableDataManipulator,
    ImmutableValue, Key, KeyId, MutableValue, ResultKind, TransactionResult,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
