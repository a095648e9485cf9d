//! Built-in value processors
//!
//! One facet processor per (host kind, key). Processors for small value
//! domains intern their immutable values; structural properties keep the
//! default NO_DATA removal.

use super::hosts::{ArmorStand, EntityState, ItemStack, LeavesState, Sheep, Vindicator};
use super::keys::{
    DyeColor, EntitySnapshot, TreeType, ARMOR_STAND_HAS_BASE_PLATE, DECAYABLE, DYE_COLOR,
    HAS_GRAVITY, IS_JOHNNY, IS_SHEARED, ITEM_DURABILITY, PASSENGERS, TREE_TYPE, VEHICLE,
};
use super::kinds::{ARMOR_STAND, ENTITY, ITEM_STACK, LEAVES, SHEEP, VINDICATOR};
use propdata_processor::{FacetValueProcessor, HostKind};
use propdata_value::{ErasedValue, Key, TransactionResult};

/// Gravity on any entity
#[derive(Debug, Clone, Copy, Default)]
pub struct GravityProcessor;

impl FacetValueProcessor for GravityProcessor {
    type Facet = EntityState;
    type Value = bool;

    fn key(&self) -> &Key<bool> {
        &HAS_GRAVITY
    }

    fn host_kind(&self) -> &'static HostKind {
        &ENTITY
    }

    fn get_value(&self, entity: &EntityState) -> Option<bool> {
        Some(entity.has_gravity)
    }

    fn set_value(&self, entity: &mut EntityState, value: bool) -> bool {
        entity.has_gravity = value;
        true
    }

    fn intern_values(&self) -> bool {
        true
    }
}

/// Entity being ridden; removing it dismounts
#[derive(Debug, Clone, Copy, Default)]
pub struct VehicleProcessor;

impl FacetValueProcessor for VehicleProcessor {
    type Facet = EntityState;
    type Value = EntitySnapshot;

    fn key(&self) -> &Key<EntitySnapshot> {
        &VEHICLE
    }

    fn host_kind(&self) -> &'static HostKind {
        &ENTITY
    }

    fn get_value(&self, entity: &EntityState) -> Option<EntitySnapshot> {
        entity.vehicle.clone()
    }

    fn set_value(&self, entity: &mut EntityState, vehicle: EntitySnapshot) -> bool {
        // an entity cannot ride itself
        if vehicle.id == entity.id {
            return false;
        }
        entity.vehicle = Some(vehicle);
        true
    }

    fn remove_value(&self, entity: &mut EntityState) -> TransactionResult {
        match entity.vehicle.take() {
            Some(previous) => TransactionResult::success_removed(ErasedValue::of(&VEHICLE, previous)),
            None => TransactionResult::success_no_data(),
        }
    }
}

/// Read-only passenger list
#[derive(Debug, Clone, Copy, Default)]
pub struct PassengersProcessor;

impl FacetValueProcessor for PassengersProcessor {
    type Facet = EntityState;
    type Value = Vec<EntitySnapshot>;

    fn key(&self) -> &Key<Vec<EntitySnapshot>> {
        &PASSENGERS
    }

    fn host_kind(&self) -> &'static HostKind {
        &ENTITY
    }

    fn get_value(&self, entity: &EntityState) -> Option<Vec<EntitySnapshot>> {
        Some(entity.passengers.clone())
    }

    fn set_value(&self, _entity: &mut EntityState, _passengers: Vec<EntitySnapshot>) -> bool {
        false
    }
}

/// Armor stand base plate
#[derive(Debug, Clone, Copy, Default)]
pub struct BasePlateProcessor;

impl FacetValueProcessor for BasePlateProcessor {
    type Facet = ArmorStand;
    type Value = bool;

    fn key(&self) -> &Key<bool> {
        &ARMOR_STAND_HAS_BASE_PLATE
    }

    fn host_kind(&self) -> &'static HostKind {
        &ARMOR_STAND
    }

    fn get_value(&self, stand: &ArmorStand) -> Option<bool> {
        Some(stand.base_plate)
    }

    fn set_value(&self, stand: &mut ArmorStand, value: bool) -> bool {
        stand.base_plate = value;
        true
    }

    fn intern_values(&self) -> bool {
        true
    }
}

/// Vindicator "johnny" mode
#[derive(Debug, Clone, Copy, Default)]
pub struct JohnnyProcessor;

impl FacetValueProcessor for JohnnyProcessor {
    type Facet = Vindicator;
    type Value = bool;

    fn key(&self) -> &Key<bool> {
        &IS_JOHNNY
    }

    fn host_kind(&self) -> &'static HostKind {
        &VINDICATOR
    }

    fn get_value(&self, vindicator: &Vindicator) -> Option<bool> {
        Some(vindicator.johnny)
    }

    fn set_value(&self, vindicator: &mut Vindicator, value: bool) -> bool {
        vindicator.johnny = value;
        true
    }

    fn intern_values(&self) -> bool {
        true
    }
}

/// Sheep fleece colour
#[derive(Debug, Clone, Copy, Default)]
pub struct SheepColorProcessor;

impl FacetValueProcessor for SheepColorProcessor {
    type Facet = Sheep;
    type Value = DyeColor;

    fn key(&self) -> &Key<DyeColor> {
        &DYE_COLOR
    }

    fn host_kind(&self) -> &'static HostKind {
        &SHEEP
    }

    fn get_value(&self, sheep: &Sheep) -> Option<DyeColor> {
        Some(sheep.color)
    }

    fn set_value(&self, sheep: &mut Sheep, color: DyeColor) -> bool {
        sheep.color = color;
        true
    }

    fn intern_values(&self) -> bool {
        true
    }
}

/// Sheep sheared flag
#[derive(Debug, Clone, Copy, Default)]
pub struct ShearedProcessor;

impl FacetValueProcessor for ShearedProcessor {
    type Facet = Sheep;
    type Value = bool;

    fn key(&self) -> &Key<bool> {
        &IS_SHEARED
    }

    fn host_kind(&self) -> &'static HostKind {
        &SHEEP
    }

    fn get_value(&self, sheep: &Sheep) -> Option<bool> {
        Some(sheep.sheared)
    }

    fn set_value(&self, sheep: &mut Sheep, sheared: bool) -> bool {
        sheep.sheared = sheared;
        true
    }

    fn intern_values(&self) -> bool {
        true
    }
}

/// Remaining uses of a damageable item
///
/// Durability is `max_damage - damage`; a stack damaged past its maximum has
/// no durability rather than a negative one.
#[derive(Debug, Clone, Copy, Default)]
pub struct DurabilityProcessor;

impl FacetValueProcessor for DurabilityProcessor {
    type Facet = ItemStack;
    type Value = i32;

    fn key(&self) -> &Key<i32> {
        &ITEM_DURABILITY
    }

    fn host_kind(&self) -> &'static HostKind {
        &ITEM_STACK
    }

    fn supports_facet(&self, stack: &ItemStack) -> bool {
        stack.item.max_damage.is_some()
    }

    fn get_value(&self, stack: &ItemStack) -> Option<i32> {
        let remaining = stack.item.max_damage?.checked_sub(stack.damage)?;
        (remaining >= 0).then_some(remaining)
    }

    fn set_value(&self, stack: &mut ItemStack, durability: i32) -> bool {
        match stack.item.max_damage {
            Some(max) if (0..=max).contains(&durability) => {
                stack.damage = max - durability;
                true
            }
            _ => false,
        }
    }
}

/// Whether leaves decay
#[derive(Debug, Clone, Copy, Default)]
pub struct DecayableProcessor;

impl FacetValueProcessor for DecayableProcessor {
    type Facet = LeavesState;
    type Value = bool;

    fn key(&self) -> &Key<bool> {
        &DECAYABLE
    }

    fn host_kind(&self) -> &'static HostKind {
        &LEAVES
    }

    fn get_value(&self, leaves: &LeavesState) -> Option<bool> {
        Some(leaves.decayable)
    }

    fn set_value(&self, leaves: &mut LeavesState, decayable: bool) -> bool {
        leaves.decayable = decayable;
        true
    }

    fn intern_values(&self) -> bool {
        true
    }
}

/// Tree species of leaves, limited to what the leaves variant can express
#[derive(Debug, Clone, Copy, Default)]
pub struct LeavesTreeProcessor;

impl FacetValueProcessor for LeavesTreeProcessor {
    type Facet = LeavesState;
    type Value = TreeType;

    fn key(&self) -> &Key<TreeType> {
        &TREE_TYPE
    }

    fn host_kind(&self) -> &'static HostKind {
        &LEAVES
    }

    fn get_value(&self, leaves: &LeavesState) -> Option<TreeType> {
        Some(leaves.tree)
    }

    fn set_value(&self, leaves: &mut LeavesState, tree: TreeType) -> bool {
        if !leaves.variant.accepts(tree) {
            return false;
        }
        leaves.tree = tree;
        true
    }

    fn intern_values(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::hosts::ItemType;

    #[test]
    fn durability_is_remaining_uses() {
        let mut stack = ItemStack::new(ItemType::damageable("iron_pickaxe", 250));
        stack.damage = 50;
        assert_eq!(DurabilityProcessor.get_value(&stack), Some(200));

        assert!(DurabilityProcessor.set_value(&mut stack, 10));
        assert_eq!(stack.damage, 240);
        assert!(!DurabilityProcessor.set_value(&mut stack, 251));
        assert_eq!(stack.damage, 240);
    }

    #[test]
    fn overdamaged_item_has_no_durability() {
        let mut stack = ItemStack::new(ItemType::damageable("shears", 238));
        stack.damage = 300;
        assert_eq!(DurabilityProcessor.get_value(&stack), None);
    }

    #[test]
    fn vehicle_removal_reports_previous() {
        let mut entity = EntityState::new(1);
        assert_eq!(
            VehicleProcessor.remove_value(&mut entity),
            TransactionResult::success_no_data()
        );

        let boat = EntitySnapshot::new(2, "boat");
        assert!(VehicleProcessor.set_value(&mut entity, boat.clone()));
        let result = VehicleProcessor.remove_value(&mut entity);
        assert_eq!(result.replaced()[0].get::<EntitySnapshot>(), Some(&boat));
        assert!(entity.vehicle.is_none());
    }

    #[test]
    fn entity_cannot_ride_itself() {
        let mut entity = EntityState::new(3);
        assert!(!VehicleProcessor.set_value(&mut entity, EntitySnapshot::new(3, "entity")));
        assert!(entity.vehicle.is_none());
    }

    #[test]
    fn old_leaves_refuse_new_trees() {
        let mut leaves = LeavesState::new(TreeType::Oak);
        assert!(LeavesTreeProcessor.set_value(&mut leaves, TreeType::Jungle));
        assert!(!LeavesTreeProcessor.set_value(&mut leaves, TreeType::Acacia));
        assert_eq!(leaves.tree, TreeType::Jungle);
    }
}
