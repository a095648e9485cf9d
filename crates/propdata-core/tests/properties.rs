//! Property tests over the built-in catalog

use proptest::prelude::*;
use propdata_core::builtin::keys::{
    DyeColor, DYEABLE_DATA, DYE_COLOR, HAS_GRAVITY, IS_SHEARED, ITEM_DURABILITY, SHEARED_DATA,
    TREE_TYPE, TreeType,
};
use propdata_core::builtin::processors::GravityProcessor;
use propdata_core::{DataConfig, DataManipulator, DataService, RegistryError};
use propdata_test_utils::{assert_no_data, assert_rejected, damageable_item, setup_service, Orphan};
use propdata_value::KeyError;

const COLORS: [DyeColor; 16] = [
    DyeColor::White,
    DyeColor::Orange,
    DyeColor::Magenta,
    DyeColor::LightBlue,
    DyeColor::Yellow,
    DyeColor::Lime,
    DyeColor::Pink,
    DyeColor::Gray,
    DyeColor::Silver,
    DyeColor::Cyan,
    DyeColor::Purple,
    DyeColor::Blue,
    DyeColor::Brown,
    DyeColor::Green,
    DyeColor::Red,
    DyeColor::Black,
];

fn color() -> impl Strategy<Value = DyeColor> {
    proptest::sample::select(COLORS.to_vec())
}

fn tree() -> impl Strategy<Value = TreeType> {
    proptest::sample::select(TreeType::ALL.to_vec())
}

proptest! {
    #[test]
    fn unregistered_host_kind_has_no_properties(flag in any::<bool>(), durability in any::<i32>(), dye in color()) {
        let service = setup_service();
        let mut orphan = Orphan;

        prop_assert_eq!(service.get(&orphan, &HAS_GRAVITY), None);
        prop_assert_eq!(service.get(&orphan, &ITEM_DURABILITY), None);
        prop_assert_eq!(service.get(&orphan, &DYE_COLOR), None);
        assert_no_data(&service.set(&mut orphan, &HAS_GRAVITY, flag));
        assert_no_data(&service.set(&mut orphan, &ITEM_DURABILITY, durability));
        assert_no_data(&service.set(&mut orphan, &DYE_COLOR, dye));
        assert_no_data(&service.remove(&mut orphan, IS_SHEARED.id()));
        prop_assert!(service.get_manipulators(&orphan).is_empty());
    }

    #[test]
    fn bundle_immutable_round_trip(dye in color(), sheared in any::<bool>()) {
        let mut dyeable = DataManipulator::new((*DYEABLE_DATA).clone());
        prop_assert!(dyeable.set(&DYE_COLOR, dye).is_successful());
        let back = dyeable.as_immutable().as_mutable();
        prop_assert_eq!(back.keys().collect::<Vec<_>>(), dyeable.keys().collect::<Vec<_>>());
        prop_assert_eq!(&back, &dyeable);

        let mut shorn = DataManipulator::new((*SHEARED_DATA).clone());
        prop_assert!(shorn.set(&IS_SHEARED, sheared).is_successful());
        prop_assert_eq!(shorn.as_immutable().as_mutable().get(&IS_SHEARED), Some(sheared));
    }

    #[test]
    fn negative_durability_rejected(max in 1..10_000i32, used in 0..10_000i32, value in i32::MIN..0) {
        let service = setup_service();
        let mut item = damageable_item(max);
        item.damage = used.min(max);
        let before = service.get(&item, &ITEM_DURABILITY);

        let result = service.set(&mut item, &ITEM_DURABILITY, value);
        assert_rejected(&result, &value);
        prop_assert_eq!(service.get(&item, &ITEM_DURABILITY), before);
    }

    #[test]
    fn interned_values_identical_by_value(a in color(), b in color()) {
        let service = setup_service();
        let first = service.intern_value(&DYE_COLOR, a);
        let again = service.intern_value(&DYE_COLOR, a);
        let other = service.intern_value(&DYE_COLOR, b);

        prop_assert!(first.ptr_eq(&again));
        prop_assert_eq!(first.ptr_eq(&other), a == b);
        prop_assert_eq!(first == other, a == b);
    }

    #[test]
    fn leaves_accept_only_expressible_trees(start in tree(), target in tree()) {
        let service = setup_service();
        let state = propdata_test_utils::leaves(start);

        let next = service.state_with_value(&state, &TREE_TYPE, target);
        prop_assert_eq!(next.is_some(), state.variant.accepts(target));
        prop_assert_eq!(state.tree, start);
    }
}

#[test]
fn duplicate_processor_fails_construction() {
    let mut builder = DataService::builder(DataConfig::default());
    builder.register_builtin().unwrap();
    let err = builder.register_facet(GravityProcessor).unwrap_err();
    assert!(matches!(
        err,
        RegistryError::DuplicateProcessor { host: "entity", ref key } if key == HAS_GRAVITY.id()
    ));
}

#[test]
fn duplicate_key_fails_construction() {
    let mut builder = DataService::builder(DataConfig::default());
    builder.register_builtin().unwrap();
    let err = builder.register_builtin().unwrap_err();
    assert!(matches!(err, RegistryError::Key(KeyError::DuplicateKey(_))));
}
