//! Built-in keys, data kinds and their value types

use once_cell::sync::Lazy;
use propdata_value::{DataKind, Key};
use std::fmt;

/// Wool and dye colours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum DyeColor {
    White,
    Orange,
    Magenta,
    LightBlue,
    Yellow,
    Lime,
    Pink,
    Gray,
    Silver,
    Cyan,
    Purple,
    Blue,
    Brown,
    Green,
    Red,
    Black,
}

/// Tree species
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum TreeType {
    Oak,
    Spruce,
    Birch,
    Jungle,
    Acacia,
    DarkOak,
}

impl TreeType {
    /// Every species
    pub const ALL: [TreeType; 6] = [
        TreeType::Oak,
        TreeType::Spruce,
        TreeType::Birch,
        TreeType::Jungle,
        TreeType::Acacia,
        TreeType::DarkOak,
    ];
}

/// Frozen reference to an entity (vehicle, passenger)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntitySnapshot {
    /// Entity id
    pub id: u64,
    /// Entity kind name
    pub kind: String,
}

impl EntitySnapshot {
    /// Snapshot of entity `id` of kind `kind`
    #[must_use]
    pub fn new(id: u64, kind: impl Into<String>) -> Self {
        Self {
            id,
            kind: kind.into(),
        }
    }
}

impl fmt::Display for EntitySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.id)
    }
}

/// Whether an entity is affected by gravity
pub static HAS_GRAVITY: Lazy<Key<bool>> = Lazy::new(|| Key::plain("core:has_gravity", true));

/// Entity being ridden
pub static VEHICLE: Lazy<Key<EntitySnapshot>> =
    Lazy::new(|| Key::plain("core:vehicle", EntitySnapshot::new(0, "entity")));

/// Entities riding this one
pub static PASSENGERS: Lazy<Key<Vec<EntitySnapshot>>> =
    Lazy::new(|| Key::list("core:passengers", Vec::new()));

/// Whether an armor stand shows its base plate
pub static ARMOR_STAND_HAS_BASE_PLATE: Lazy<Key<bool>> =
    Lazy::new(|| Key::plain("core:armor_stand_has_base_plate", true));

/// Whether a vindicator is in "johnny" mode
pub static IS_JOHNNY: Lazy<Key<bool>> = Lazy::new(|| Key::plain("core:is_johnny", false));

/// Colour of a dyeable host
pub static DYE_COLOR: Lazy<Key<DyeColor>> =
    Lazy::new(|| Key::plain("core:dye_color", DyeColor::White));

/// Whether a sheep is sheared
pub static IS_SHEARED: Lazy<Key<bool>> = Lazy::new(|| Key::plain("core:is_sheared", false));

/// Whether leaves decay
pub static DECAYABLE: Lazy<Key<bool>> = Lazy::new(|| Key::plain("core:decayable", false));

/// Tree species of a block
pub static TREE_TYPE: Lazy<Key<TreeType>> =
    Lazy::new(|| Key::plain("core:tree_type", TreeType::Oak));

/// Remaining uses of a damageable item
pub static ITEM_DURABILITY: Lazy<Key<i32>> =
    Lazy::new(|| Key::bounded("core:item_durability", 60, 0, i32::MAX));

/// Gravity bundle
pub static GRAVITY_DATA: Lazy<DataKind> =
    Lazy::new(|| DataKind::new("core:gravity", [HAS_GRAVITY.erased()]));

/// Vehicle bundle
pub static VEHICLE_DATA: Lazy<DataKind> =
    Lazy::new(|| DataKind::new("core:vehicle", [VEHICLE.erased()]));

/// Dye colour bundle
pub static DYEABLE_DATA: Lazy<DataKind> =
    Lazy::new(|| DataKind::new("core:dyeable", [DYE_COLOR.erased()]));

/// Sheared bundle
pub static SHEARED_DATA: Lazy<DataKind> =
    Lazy::new(|| DataKind::new("core:sheared", [IS_SHEARED.erased()]));

/// Johnny bundle
pub static JOHNNY_DATA: Lazy<DataKind> =
    Lazy::new(|| DataKind::new("core:johnny", [IS_JOHNNY.erased()]));

/// Base plate bundle
pub static BASE_PLATE_DATA: Lazy<DataKind> =
    Lazy::new(|| DataKind::new("core:base_plate", [ARMOR_STAND_HAS_BASE_PLATE.erased()]));

/// Decayable bundle
pub static DECAYABLE_DATA: Lazy<DataKind> =
    Lazy::new(|| DataKind::new("core:decayable", [DECAYABLE.erased()]));

/// Tree bundle
pub static TREE_DATA: Lazy<DataKind> =
    Lazy::new(|| DataKind::new("core:tree", [TREE_TYPE.erased()]));

/// Durability bundle
pub static DURABILITY_DATA: Lazy<DataKind> =
    Lazy::new(|| DataKind::new("core:durability", [ITEM_DURABILITY.erased()]));
