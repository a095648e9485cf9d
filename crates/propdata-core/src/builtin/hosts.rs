//! Built-in host objects
//!
//! Small stand-ins for the runtime objects the property layer is attached
//! to. Entities share an [`EntityState`] facet; block states are values and
//! implement `Clone` so they can be rebuilt through
//! [`DataService::state_with_value`](crate::DataService::state_with_value).

use super::keys::{DyeColor, EntitySnapshot, TreeType};
use super::kinds::{ARMOR_STAND, BLOCK_STATE, ENTITY, ITEM_STACK, LEAVES, SHEEP, VINDICATOR};
use propdata_processor::{Host, HostKind};
use std::any::Any;

/// State every entity carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityState {
    /// Entity id
    pub id: u64,
    /// Affected by gravity
    pub has_gravity: bool,
    /// Entity being ridden
    pub vehicle: Option<EntitySnapshot>,
    /// Entities riding this one
    pub passengers: Vec<EntitySnapshot>,
}

impl EntityState {
    /// Fresh entity: gravity on, not riding, no passengers
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self {
            id,
            has_gravity: true,
            vehicle: None,
            passengers: Vec::new(),
        }
    }
}

impl Host for EntityState {
    fn kind(&self) -> &'static HostKind {
        &ENTITY
    }

    fn facet(&self, kind: &HostKind) -> Option<&dyn Any> {
        (kind == &ENTITY).then_some(self as &dyn Any)
    }

    fn facet_mut(&mut self, kind: &HostKind) -> Option<&mut dyn Any> {
        (kind == &ENTITY).then_some(self as &mut dyn Any)
    }
}

/// Sheep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheep {
    /// Entity state
    pub entity: EntityState,
    /// Fleece colour
    pub color: DyeColor,
    /// Sheared
    pub sheared: bool,
}

impl Sheep {
    /// Unsheared sheep with `color` fleece
    #[must_use]
    pub fn new(id: u64, color: DyeColor) -> Self {
        Self {
            entity: EntityState::new(id),
            color,
            sheared: false,
        }
    }
}

/// Armor stand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmorStand {
    /// Entity state
    pub entity: EntityState,
    /// Base plate shown
    pub base_plate: bool,
}

impl ArmorStand {
    /// Armor stand with its base plate
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self {
            entity: EntityState::new(id),
            base_plate: true,
        }
    }
}

/// Vindicator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vindicator {
    /// Entity state
    pub entity: EntityState,
    /// "Johnny" mode
    pub johnny: bool,
}

impl Vindicator {
    /// Vindicator in its normal mode
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self {
            entity: EntityState::new(id),
            johnny: false,
        }
    }
}

/// Entity host whose own facet is the struct itself and whose entity facet
/// is its `entity` field
macro_rules! entity_host {
    ($host:ty, $kind:expr) => {
        impl Host for $host {
            fn kind(&self) -> &'static HostKind {
                &$kind
            }

            fn facet(&self, kind: &HostKind) -> Option<&dyn Any> {
                if kind == &ENTITY {
                    Some(&self.entity as &dyn Any)
                } else if kind == &$kind {
                    Some(self as &dyn Any)
                } else {
                    None
                }
            }

            fn facet_mut(&mut self, kind: &HostKind) -> Option<&mut dyn Any> {
                if kind == &ENTITY {
                    Some(&mut self.entity as &mut dyn Any)
                } else if kind == &$kind {
                    Some(self as &mut dyn Any)
                } else {
                    None
                }
            }
        }
    };
}

entity_host!(Sheep, SHEEP);
entity_host!(ArmorStand, ARMOR_STAND);
entity_host!(Vindicator, VINDICATOR);

/// Item type of a stack
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemType {
    /// Item name
    pub name: String,
    /// Maximum damage, `None` for items that cannot be damaged
    pub max_damage: Option<i32>,
}

impl ItemType {
    /// Item that wears out after `max_damage` uses
    #[must_use]
    pub fn damageable(name: impl Into<String>, max_damage: i32) -> Self {
        Self {
            name: name.into(),
            max_damage: Some(max_damage),
        }
    }

    /// Item that never wears out
    #[must_use]
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            max_damage: None,
        }
    }
}

/// Stack of items
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemStack {
    /// Item type
    pub item: ItemType,
    /// Accumulated damage
    pub damage: i32,
}

impl ItemStack {
    /// Undamaged stack of `item`
    #[must_use]
    pub fn new(item: ItemType) -> Self {
        Self { item, damage: 0 }
    }
}

impl Host for ItemStack {
    fn kind(&self) -> &'static HostKind {
        &ITEM_STACK
    }

    fn facet(&self, kind: &HostKind) -> Option<&dyn Any> {
        (kind == &ITEM_STACK).then_some(self as &dyn Any)
    }

    fn facet_mut(&mut self, kind: &HostKind) -> Option<&mut dyn Any> {
        (kind == &ITEM_STACK).then_some(self as &mut dyn Any)
    }
}

/// Leaves block variant; each variant can express a subset of tree types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeavesVariant {
    /// Oak, spruce, birch and jungle leaves
    Old,
    /// Acacia and dark oak leaves
    New,
}

impl LeavesVariant {
    /// Variant able to express `tree`
    #[must_use]
    pub fn for_tree(tree: TreeType) -> Self {
        match tree {
            TreeType::Oak | TreeType::Spruce | TreeType::Birch | TreeType::Jungle => Self::Old,
            TreeType::Acacia | TreeType::DarkOak => Self::New,
        }
    }

    /// Whether this variant can express `tree`
    #[must_use]
    pub fn accepts(self, tree: TreeType) -> bool {
        Self::for_tree(tree) == self
    }
}

/// Leaves block state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LeavesState {
    /// Block variant
    pub variant: LeavesVariant,
    /// Tree species
    pub tree: TreeType,
    /// Whether the leaves decay
    pub decayable: bool,
}

impl LeavesState {
    /// Decaying leaves of `tree`, on the variant that expresses it
    #[must_use]
    pub fn new(tree: TreeType) -> Self {
        Self {
            variant: LeavesVariant::for_tree(tree),
            tree,
            decayable: true,
        }
    }
}

impl Host for LeavesState {
    fn kind(&self) -> &'static HostKind {
        &LEAVES
    }

    fn facet(&self, kind: &HostKind) -> Option<&dyn Any> {
        (kind == &LEAVES).then_some(self as &dyn Any)
    }

    fn facet_mut(&mut self, kind: &HostKind) -> Option<&mut dyn Any> {
        (kind == &LEAVES).then_some(self as &mut dyn Any)
    }
}

/// Block state with no properties of its own
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlainBlock {
    /// Block name
    pub name: String,
}

impl PlainBlock {
    /// Block named `name`
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Host for PlainBlock {
    fn kind(&self) -> &'static HostKind {
        &BLOCK_STATE
    }

    fn facet(&self, kind: &HostKind) -> Option<&dyn Any> {
        (kind == &BLOCK_STATE).then_some(self as &dyn Any)
    }

    fn facet_mut(&mut self, kind: &HostKind) -> Option<&mut dyn Any> {
        (kind == &BLOCK_STATE).then_some(self as &mut dyn Any)
    }
}
