//! Testing utilities for the propdata workspace
//!
//! Ready services, host fixtures and result assertions.

#![allow(missing_docs)]

use propdata_core::builtin::hosts::{
    ArmorStand, EntityState, ItemStack, ItemType, LeavesState, PlainBlock, Sheep, Vindicator,
};
use propdata_core::builtin::keys::{DyeColor, TreeType};
use propdata_core::{DataConfig, DataService};
use propdata_processor::{Host, HostKind};
use propdata_value::{DataValue, ResultKind, TransactionResult};
use std::any::Any;

/// Host kind no processor is ever registered against
pub static ORPHAN: HostKind = HostKind::root("orphan");

/// Host of the [`ORPHAN`] kind
#[derive(Debug, Clone, Default)]
pub struct Orphan;

impl Host for Orphan {
    fn kind(&self) -> &'static HostKind {
        &ORPHAN
    }

    fn facet(&self, kind: &HostKind) -> Option<&dyn Any> {
        (kind == &ORPHAN).then_some(self as &dyn Any)
    }

    fn facet_mut(&mut self, kind: &HostKind) -> Option<&mut dyn Any> {
        (kind == &ORPHAN).then_some(self as &mut dyn Any)
    }
}

pub fn setup_service() -> DataService {
    setup_service_with(DataConfig::new())
}

pub fn setup_service_with(config: DataConfig) -> DataService {
    DataService::builtin(config).unwrap()
}

pub fn plain_entity() -> EntityState {
    EntityState::new(1)
}

pub fn sheep(color: DyeColor) -> Sheep {
    Sheep::new(2, color)
}

pub fn armor_stand() -> ArmorStand {
    ArmorStand::new(3)
}

pub fn vindicator() -> Vindicator {
    Vindicator::new(4)
}

pub fn damageable_item(max_damage: i32) -> ItemStack {
    ItemStack::new(ItemType::damageable("iron_sword", max_damage))
}

pub fn plain_item() -> ItemStack {
    ItemStack::new(ItemType::plain("stone"))
}

pub fn leaves(tree: TreeType) -> LeavesState {
    LeavesState::new(tree)
}

pub fn stone() -> PlainBlock {
    PlainBlock::new("stone")
}

#[track_caller]
pub fn assert_no_data(result: &TransactionResult) {
    assert_eq!(result, &TransactionResult::fail_no_data());
}

#[track_caller]
pub fn assert_success_replacing<V: DataValue>(result: &TransactionResult, new: &V, old: &V) {
    assert_eq!(result.kind(), ResultKind::Success, "{result:?}");
    assert_eq!(result.successful().len(), 1);
    assert_eq!(result.successful()[0].get::<V>(), Some(new));
    assert_eq!(result.replaced().len(), 1);
    assert_eq!(result.replaced()[0].get::<V>(), Some(old));
}

#[track_caller]
pub fn assert_rejected<V: DataValue>(result: &TransactionResult, value: &V) {
    assert_eq!(result.kind(), ResultKind::Failure, "{result:?}");
    assert!(result.successful().is_empty());
    assert_eq!(result.rejected()[0].get::<V>(), Some(value));
}
