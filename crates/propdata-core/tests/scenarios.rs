//! End-to-end property access through the built-in catalog

use propdata_core::builtin::keys::{
    DyeColor, EntitySnapshot, DECAYABLE, DYEABLE_DATA, DYE_COLOR, HAS_GRAVITY, IS_SHEARED,
    ITEM_DURABILITY, PASSENGERS, SHEARED_DATA, TreeType, VEHICLE, VEHICLE_DATA,
};
use propdata_core::{DataConfig, ResultKind, TransactionResult};
use propdata_test_utils::{
    armor_stand, assert_no_data, assert_rejected, assert_success_replacing, damageable_item,
    leaves, plain_entity, plain_item, setup_service, setup_service_with, sheep, stone,
};

#[test]
fn gravity_set_reports_replaced_default() {
    let service = setup_service();
    let mut entity = plain_entity();

    assert_eq!(service.get(&entity, &HAS_GRAVITY), Some(true));
    let result = service.set(&mut entity, &HAS_GRAVITY, false);
    assert_success_replacing(&result, &false, &true);
    assert_eq!(service.get(&entity, &HAS_GRAVITY), Some(false));
    assert!(!entity.has_gravity);
}

#[test]
fn gravity_inherited_by_every_entity() {
    let service = setup_service();
    let mut stand = armor_stand();

    let result = service.set(&mut stand, &HAS_GRAVITY, false);
    assert!(result.is_successful());
    assert!(!stand.entity.has_gravity);
}

#[test]
fn decayable_unsupported_without_decay() {
    let service = setup_service();
    let mut block = stone();
    let mut animal = sheep(DyeColor::White);

    assert_eq!(service.get(&block, &DECAYABLE), None);
    assert_no_data(&service.remove(&mut block, DECAYABLE.id()));
    assert_no_data(&service.set(&mut block, &DECAYABLE, true));
    assert!(!service.supports(&block, DECAYABLE.id()));

    assert_eq!(service.get(&animal, &DECAYABLE), None);
    assert_no_data(&service.remove(&mut animal, DECAYABLE.id()));
}

#[test]
fn dye_bundle_survives_immutable_round_trip() {
    let service = setup_service();
    let animal = sheep(DyeColor::Red);

    let bundle = service.get_manipulator(&animal, DYEABLE_DATA.id()).unwrap();
    assert_eq!(bundle.get(&DYE_COLOR), Some(DyeColor::Red));

    let round_trip = bundle.as_immutable().as_mutable();
    assert_eq!(round_trip.get(&DYE_COLOR), Some(DyeColor::Red));
    assert_eq!(round_trip, bundle);
}

#[test]
fn durability_never_negative() {
    let service = setup_service();

    assert_eq!(*ITEM_DURABILITY.default_value(), 60);
    assert_eq!(service.get(&plain_item(), &ITEM_DURABILITY), None);
    assert!(service.get_value(&plain_item(), &ITEM_DURABILITY).is_none());

    let mut worn = damageable_item(100);
    worn.damage = 150;
    assert_eq!(service.get(&worn, &ITEM_DURABILITY), None);

    let mut fresh = damageable_item(100);
    assert_eq!(service.get(&fresh, &ITEM_DURABILITY), Some(100));
    let result = service.set(&mut fresh, &ITEM_DURABILITY, -1);
    assert_rejected(&result, &-1);
    assert_eq!(service.get(&fresh, &ITEM_DURABILITY), Some(100));
}

#[test]
fn durability_above_item_maximum_is_refused() {
    let service = setup_service();
    let mut item = damageable_item(100);
    item.damage = 30;

    let result = service.set(&mut item, &ITEM_DURABILITY, 101);
    assert_rejected(&result, &101);
    assert_eq!(item.damage, 30);

    let result = service.set(&mut item, &ITEM_DURABILITY, 100);
    assert_success_replacing(&result, &100, &70);
    assert_eq!(item.damage, 0);
}

#[test]
fn durability_unsupported_on_plain_items() {
    let service = setup_service();
    let mut item = plain_item();
    assert_no_data(&service.set(&mut item, &ITEM_DURABILITY, 5));
    assert_no_data(&service.remove(&mut item, ITEM_DURABILITY.id()));
}

#[test]
fn vehicle_can_be_removed() {
    let service = setup_service();
    let mut rider = plain_entity();
    let horse = EntitySnapshot::new(40, "horse");

    assert_eq!(service.get(&rider, &VEHICLE), None);
    let result = service.set(&mut rider, &VEHICLE, horse.clone());
    assert_eq!(result.kind(), ResultKind::Success);
    assert!(result.replaced().is_empty());

    let result = service.remove(&mut rider, VEHICLE.id());
    assert_eq!(result.kind(), ResultKind::Success);
    assert_eq!(result.replaced()[0].get::<EntitySnapshot>(), Some(&horse));
    assert_eq!(service.get(&rider, &VEHICLE), None);

    let again = service.remove(&mut rider, VEHICLE.id());
    assert_eq!(again, TransactionResult::success_no_data());
}

#[test]
fn structural_removal_refused() {
    let service = setup_service();
    let mut animal = sheep(DyeColor::Lime);

    assert_no_data(&service.remove(&mut animal, HAS_GRAVITY.id()));
    assert_no_data(&service.remove(&mut animal, DYE_COLOR.id()));
    assert!(animal.entity.has_gravity);
    assert_eq!(animal.color, DyeColor::Lime);
}

#[test]
fn passengers_are_read_only() {
    let service = setup_service();
    let mut entity = plain_entity();
    let pig = EntitySnapshot::new(9, "pig");
    entity.passengers.push(pig.clone());

    assert_eq!(service.get(&entity, &PASSENGERS), Some(vec![pig]));
    let result = service.set(&mut entity, &PASSENGERS, Vec::new());
    assert_eq!(result.kind(), ResultKind::Failure);
    assert_eq!(entity.passengers.len(), 1);
}

#[test]
fn transform_reads_then_writes() {
    let service = setup_service();
    let mut item = damageable_item(100);

    let result = service.transform(&mut item, &ITEM_DURABILITY, |d| d - 25);
    assert_success_replacing(&result, &75, &100);
    assert_eq!(item.damage, 25);

    let mut rider = plain_entity();
    let result = service.transform(&mut rider, &VEHICLE, EntitySnapshot::clone);
    assert_no_data(&result);
}

#[test]
fn value_view_writes_through() {
    let service = setup_service();
    let mut animal = sheep(DyeColor::White);

    {
        let mut view = service.value_view(&mut animal, &DYE_COLOR).unwrap();
        assert_eq!(view.get(), Some(DyeColor::White));
        assert!(view.set(DyeColor::Black).is_successful());
        assert_eq!(view.as_immutable().unwrap().get(), &DyeColor::Black);
        assert_no_data(&view.remove());
    }
    assert_eq!(animal.color, DyeColor::Black);

    let mut stand = armor_stand();
    assert!(service.value_view(&mut stand, &DYE_COLOR).is_none());
}

#[test]
fn manipulators_listed_in_registration_order() {
    let service = setup_service();
    let mut animal = sheep(DyeColor::Pink);

    let ids: Vec<String> = service
        .get_manipulators(&animal)
        .iter()
        .map(|m| m.kind().id().to_string())
        .collect();
    assert_eq!(ids, ["core:gravity", "core:dyeable", "core:sheared"]);

    assert!(service
        .set(&mut animal, &VEHICLE, EntitySnapshot::new(5, "boat"))
        .is_successful());
    let ids: Vec<String> = service
        .get_manipulators(&animal)
        .iter()
        .map(|m| m.kind().id().to_string())
        .collect();
    assert_eq!(ids, ["core:gravity", "core:vehicle", "core:dyeable", "core:sheared"]);
}

#[test]
fn manipulators_are_interned_when_configured() {
    let service = setup_service();
    let animal = sheep(DyeColor::Pink);
    let first = service.get_manipulators(&animal);
    let second = service.get_manipulators(&animal);
    assert!(first.iter().zip(&second).all(|(a, b)| a.ptr_eq(b)));

    let plain = setup_service_with(DataConfig::new().with_intern_immutables(false));
    let first = plain.get_manipulators(&animal);
    let second = plain.get_manipulators(&animal);
    assert_eq!(first, second);
    assert!(!first[0].ptr_eq(&second[0]));
}

#[test]
fn offer_manipulator_applies_every_value() {
    let service = setup_service();
    let mut animal = sheep(DyeColor::Red);

    let mut bundle = service.get_manipulator(&animal, DYEABLE_DATA.id()).unwrap();
    assert!(bundle.set(&DYE_COLOR, DyeColor::Blue).is_successful());
    let result = service.offer_manipulator(&mut animal, &bundle);
    assert_success_replacing(&result, &DyeColor::Blue, &DyeColor::Red);
    assert_eq!(animal.color, DyeColor::Blue);

    let mut stand = armor_stand();
    assert_no_data(&service.offer_manipulator(&mut stand, &bundle));
    assert!(service.get_manipulator(&stand, SHEARED_DATA.id()).is_none());
}

#[test]
fn remove_manipulator_dismounts() {
    let service = setup_service();
    let mut rider = plain_entity();
    assert!(service
        .set(&mut rider, &VEHICLE, EntitySnapshot::new(8, "minecart"))
        .is_successful());

    let result = service.remove_manipulator(&mut rider, VEHICLE_DATA.id());
    assert!(result.is_successful());
    assert_eq!(result.replaced().len(), 1);
    assert!(rider.vehicle.is_none());

    let mut animal = sheep(DyeColor::Red);
    assert_no_data(&service.remove_manipulator(&mut animal, DYEABLE_DATA.id()));
}

#[test]
fn interned_reads_share_instances() {
    let service = setup_service();
    let animal = sheep(DyeColor::Cyan);

    let a = service.get_erased(&animal, IS_SHEARED.id()).unwrap();
    let b = service.get_erased(&animal, IS_SHEARED.id()).unwrap();
    assert!(a.ptr_eq(&b));
    assert!(a.ptr_eq(&service.intern_value(&IS_SHEARED, false)));
}

#[test]
fn unmemoized_service_resolves_the_same() {
    let service = setup_service_with(DataConfig::new().with_memoize_resolution(false));
    let mut entity = plain_entity();

    assert!(service.set(&mut entity, &HAS_GRAVITY, false).is_successful());
    assert_eq!(service.get(&entity, &HAS_GRAVITY), Some(false));
    assert!(!service.processors().is_memoized());
    assert_eq!(service.processors().memo_len(), 0);
}

#[test]
fn leaves_support_tree_keys() {
    let service = setup_service();
    let block = leaves(TreeType::Birch);
    assert!(service.supports(&block, DECAYABLE.id()));
    assert_eq!(service.get(&block, &DECAYABLE), Some(true));
}
