//! Built-in host kinds

use propdata_processor::HostKind;

/// Any entity
pub static ENTITY: HostKind = HostKind::root("entity");

/// Living entity
pub static LIVING: HostKind = HostKind::child("living", &ENTITY);

/// Animal
pub static ANIMAL: HostKind = HostKind::child("animal", &LIVING);

/// Sheep
pub static SHEEP: HostKind = HostKind::child("sheep", &ANIMAL);

/// Armor stand
pub static ARMOR_STAND: HostKind = HostKind::child("armor_stand", &LIVING);

/// Vindicator
pub static VINDICATOR: HostKind = HostKind::child("vindicator", &LIVING);

/// Item stack
pub static ITEM_STACK: HostKind = HostKind::root("item_stack");

/// Any block state
pub static BLOCK_STATE: HostKind = HostKind::root("block_state");

/// Leaves block state
pub static LEAVES: HostKind = HostKind::child("leaves", &BLOCK_STATE);

/// Every built-in kind, roots first
pub static ALL: [&HostKind; 9] = [
    &ENTITY,
    &LIVING,
    &ANIMAL,
    &SHEEP,
    &ARMOR_STAND,
    &VINDICATOR,
    &ITEM_STACK,
    &BLOCK_STATE,
    &LEAVES,
];
