//! Host objects and their kind tree
//!
//! The property layer does not own host objects. It only needs to know
//! which kind a host is (for processor resolution) and to reach the part of
//! the host a processor operates on. That part is a *facet*: a processor
//! registered against an ancestor kind asks the host for the facet of that
//! kind and downcasts it to the type it expects.

use smallvec::SmallVec;
use std::any::Any;
use std::fmt;

/// Static type tag of a host object kind
///
/// Kinds form a tree through their parent link. Tags are declared as
/// `static` items so the tree lives for the whole process:
///
/// ```rust
/// use propdata_processor::HostKind;
///
/// static ENTITY: HostKind = HostKind::root("entity");
/// static LIVING: HostKind = HostKind::child("living", &ENTITY);
///
/// assert!(LIVING.is_a(&ENTITY));
/// assert_eq!(LIVING.depth(), 1);
/// ```
///
/// Equality and hashing are structural over the whole ancestry.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostKind {
    name: &'static str,
    parent: Option<&'static HostKind>,
}

impl HostKind {
    /// Create a kind with no parent
    #[inline]
    #[must_use]
    pub const fn root(name: &'static str) -> Self {
        Self { name, parent: None }
    }

    /// Create a kind derived from `parent`
    #[inline]
    #[must_use]
    pub const fn child(name: &'static str, parent: &'static HostKind) -> Self {
        Self {
            name,
            parent: Some(parent),
        }
    }

    /// Kind name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Parent kind
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<&'static HostKind> {
        self.parent
    }

    /// This kind followed by every ancestor, most-derived first
    pub fn ancestry(&'static self) -> impl Iterator<Item = &'static HostKind> {
        std::iter::successors(Some(self), |kind| kind.parent)
    }

    /// Ancestry names, most-derived first
    #[must_use]
    pub fn lineage(&self) -> SmallVec<[&'static str; 8]> {
        let mut names = SmallVec::new();
        names.push(self.name);
        let mut next = self.parent;
        while let Some(kind) = next {
            names.push(kind.name);
            next = kind.parent;
        }
        names
    }

    /// Number of ancestors
    #[must_use]
    pub fn depth(&self) -> usize {
        self.lineage().len() - 1
    }

    /// Whether this kind is `other` or derives from it
    #[must_use]
    pub fn is_a(&self, other: &HostKind) -> bool {
        if self == other {
            return true;
        }
        let mut next = self.parent;
        while let Some(kind) = next {
            if kind == other {
                return true;
            }
            next = kind.parent;
        }
        false
    }
}

impl fmt::Debug for HostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostKind({})", self.lineage().join(" < "))
    }
}

impl fmt::Display for HostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Host object exposing properties through this layer
///
/// `facet(kind)` must return `Some` for the host's own kind and for every
/// ancestor kind that has processors registered against it.
pub trait Host: Send + Sync + 'static {
    /// Most-derived kind of this host
    fn kind(&self) -> &'static HostKind;

    /// Part of the host that processors for `kind` operate on
    fn facet(&self, kind: &HostKind) -> Option<&dyn Any>;

    /// Mutable access to the facet for `kind`
    fn facet_mut(&mut self, kind: &HostKind) -> Option<&mut dyn Any>;
}

/// Typed facet lookup
#[must_use]
pub fn facet<'a, F: Any>(host: &'a dyn Host, kind: &HostKind) -> Option<&'a F> {
    host.facet(kind).and_then(|f| f.downcast_ref::<F>())
}

/// Typed mutable facet lookup
#[must_use]
pub fn facet_mut<'a, F: Any>(host: &'a mut dyn Host, kind: &HostKind) -> Option<&'a mut F> {
    host.facet_mut(kind).and_then(|f| f.downcast_mut::<F>())
}

#[cfg(test)]
mod tests {
    use super::*;

    static ENTITY: HostKind = HostKind::root("entity");
    static LIVING: HostKind = HostKind::child("living", &ENTITY);
    static SHEEP: HostKind = HostKind::child("sheep", &LIVING);
    static BLOCK: HostKind = HostKind::root("block_state");
    static IMPOSTOR: HostKind = HostKind::child("living", &BLOCK);

    #[test]
    fn ancestry_is_most_derived_first() {
        let names: Vec<_> = SHEEP.ancestry().map(HostKind::name).collect();
        assert_eq!(names, ["sheep", "living", "entity"]);
        assert_eq!(SHEEP.depth(), 2);
        assert_eq!(ENTITY.depth(), 0);
    }

    #[test]
    fn is_a_follows_parents() {
        assert!(SHEEP.is_a(&ENTITY));
        assert!(SHEEP.is_a(&SHEEP));
        assert!(!ENTITY.is_a(&SHEEP));
        assert!(!SHEEP.is_a(&BLOCK));
    }

    #[test]
    fn equality_covers_ancestry() {
        assert_ne!(LIVING, IMPOSTOR);
        assert_eq!(LIVING.name(), IMPOSTOR.name());
        assert!(!SHEEP.is_a(&IMPOSTOR));
    }

    #[test]
    fn debug_shows_lineage() {
        assert_eq!(format!("{SHEEP:?}"), "HostKind(sheep < living < entity)");
        assert_eq!(SHEEP.to_string(), "sheep");
    }

    struct Counter {
        count: u32,
    }

    impl Host for Counter {
        fn kind(&self) -> &'static HostKind {
            &ENTITY
        }

        fn facet(&self, kind: &HostKind) -> Option<&dyn Any> {
            (kind == &ENTITY).then_some(&self.count as &dyn Any)
        }

        fn facet_mut(&mut self, kind: &HostKind) -> Option<&mut dyn Any> {
            (kind == &ENTITY).then_some(&mut self.count as &mut dyn Any)
        }
    }

    #[test]
    fn typed_facet_lookup() {
        let mut host = Counter { count: 3 };
        assert_eq!(facet::<u32>(&host, &ENTITY), Some(&3));
        assert!(facet::<u64>(&host, &ENTITY).is_none());
        assert!(facet::<u32>(&host, &LIVING).is_none());

        *facet_mut::<u32>(&mut host, &ENTITY).unwrap() = 9;
        assert_eq!(host.count, 9);
    }
}
