//! propdata processors
//!
//! Strategies that read and write properties on host objects, and the
//! registry that picks the right strategy for a host.
//!
//! # Core Concepts
//!
//! - [`HostKind`]: static type tag tree of host objects
//! - [`Host`]: host object exposing facets to processors
//! - [`ValueProcessor`]: one key on one host kind
//! - [`FacetValueProcessor`]: value processor written against a facet type
//! - [`DataProcessor`]: one bundle kind on one host kind
//! - [`ProcessorRegistry`]: frozen, memoized most-specific resolution
//!
//! # Example
//!
//! ```rust
//! use propdata_processor::{
//!     FacetValueProcessor, Host, HostKind, ProcessorRegistryBuilder, ValueProcessor,
//! };
//! use propdata_value::{Key, KeyRegistryBuilder};
//! use std::any::Any;
//!
//! static LAMP: HostKind = HostKind::root("lamp");
//!
//! struct Lamp {
//!     lit: bool,
//! }
//!
//! impl Host for Lamp {
//!     fn kind(&self) -> &'static HostKind {
//!         &LAMP
//!     }
//!     fn facet(&self, kind: &HostKind) -> Option<&dyn Any> {
//!         (kind == &LAMP).then_some(self as &dyn Any)
//!     }
//!     fn facet_mut(&mut self, kind: &HostKind) -> Option<&mut dyn Any> {
//!         (kind == &LAMP).then_some(self as &mut dyn Any)
//!     }
//! }
//!
//! struct LitProcessor(Key<bool>);
//!
//! impl FacetValueProcessor for LitProcessor {
//!     type Facet = Lamp;
//!     type Value = bool;
//!     fn key(&self) -> &Key<bool> {
//!         &self.0
//!     }
//!     fn host_kind(&self) -> &'static HostKind {
//!         &LAMP
//!     }
//!     fn get_value(&self, lamp: &Lamp) -> Option<bool> {
//!         Some(lamp.lit)
//!     }
//!     fn set_value(&self, lamp: &mut Lamp, lit: bool) -> bool {
//!         lamp.lit = lit;
//!         true
//!     }
//! }
//!
//! let lit = Key::plain("demo:lit", false);
//! let mut keys = KeyRegistryBuilder::new();
//! keys.register(&lit).unwrap();
//! let keys = keys.build();
//!
//! let mut builder = ProcessorRegistryBuilder::new();
//! builder.register_facet(LitProcessor(lit.clone())).unwrap();
//! let registry = builder.freeze(&keys).unwrap();
//!
//! let mut lamp = Lamp { lit: false };
//! let processor = registry.resolve(&LAMP, &lit).unwrap();
//! assert!(processor.offer(&mut lamp, true).is_successful());
//! assert!(lamp.lit);
//! ```

pub mod data;
pub mod error;
pub mod facet;
pub mod host;
pub mod registry;
pub mod value;

// Re-exports
pub use data::{DataProcessor, ValueBackedDataProcessor};
pub use error::RegistryError;
pub use facet::{FacetProcessor, FacetValueProcessor};
pub use host::{facet, facet_mut, Host, HostKind};
pub use registry::{ProcessorRegistry, ProcessorRegistryBuilder};
pub use value::{downcast_processor, AnyValueProcessor, ValueProcessor};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
