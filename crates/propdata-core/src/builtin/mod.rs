//! Built-in property catalog
//!
//! A small set of host kinds, keys, bundles and processors covering the
//! common property shapes: plain flags, removable references, read-only
//! lists, bounded numbers and values restricted by the host's variant.

pub mod hosts;
pub mod keys;
pub mod kinds;
pub mod processors;

use crate::service::DataServiceBuilder;
use keys::{
    ARMOR_STAND_HAS_BASE_PLATE, BASE_PLATE_DATA, DECAYABLE, DECAYABLE_DATA, DURABILITY_DATA,
    DYEABLE_DATA, DYE_COLOR, GRAVITY_DATA, HAS_GRAVITY, IS_JOHNNY, IS_SHEARED, ITEM_DURABILITY,
    JOHNNY_DATA, PASSENGERS, SHEARED_DATA, TREE_DATA, TREE_TYPE, VEHICLE, VEHICLE_DATA,
};
use kinds::{ARMOR_STAND, ENTITY, ITEM_STACK, LEAVES, SHEEP, VINDICATOR};
use processors::{
    BasePlateProcessor, DecayableProcessor, DurabilityProcessor, GravityProcessor,
    JohnnyProcessor, LeavesTreeProcessor, PassengersProcessor, SheepColorProcessor,
    ShearedProcessor, VehicleProcessor,
};
use propdata_processor::RegistryError;

/// Register every built-in key, bundle kind and processor on `builder`
///
/// # Errors
/// Registration errors, e.g. when one of the built-in keys is already
/// registered.
pub fn register(builder: &mut DataServiceBuilder) -> Result<(), RegistryError> {
    builder
        .register_key(&*HAS_GRAVITY)?
        .register_key(&*VEHICLE)?
        .register_key(&*PASSENGERS)?
        .register_key(&*ARMOR_STAND_HAS_BASE_PLATE)?
        .register_key(&*IS_JOHNNY)?
        .register_key(&*DYE_COLOR)?
        .register_key(&*IS_SHEARED)?
        .register_key(&*DECAYABLE)?
        .register_key(&*TREE_TYPE)?
        .register_key(&*ITEM_DURABILITY)?;

    for kind in [
        &GRAVITY_DATA,
        &VEHICLE_DATA,
        &DYEABLE_DATA,
        &SHEARED_DATA,
        &JOHNNY_DATA,
        &BASE_PLATE_DATA,
        &DECAYABLE_DATA,
        &TREE_DATA,
        &DURABILITY_DATA,
    ] {
        builder.register_kind((**kind).clone())?;
    }

    builder
        .register_facet(GravityProcessor)?
        .register_facet(VehicleProcessor)?
        .register_facet(PassengersProcessor)?
        .register_facet(BasePlateProcessor)?
        .register_facet(JohnnyProcessor)?
        .register_facet(SheepColorProcessor)?
        .register_facet(ShearedProcessor)?
        .register_facet(DurabilityProcessor)?
        .register_facet(DecayableProcessor)?
        .register_facet(LeavesTreeProcessor)?;

    builder
        .register_value_backed(&ENTITY, GRAVITY_DATA.id())?
        .register_value_backed(&ENTITY, VEHICLE_DATA.id())?
        .register_value_backed(&ARMOR_STAND, BASE_PLATE_DATA.id())?
        .register_value_backed(&VINDICATOR, JOHNNY_DATA.id())?
        .register_value_backed(&SHEEP, DYEABLE_DATA.id())?
        .register_value_backed(&SHEEP, SHEARED_DATA.id())?
        .register_value_backed(&ITEM_STACK, DURABILITY_DATA.id())?
        .register_value_backed(&LEAVES, DECAYABLE_DATA.id())?
        .register_value_backed(&LEAVES, TREE_DATA.id())?;

    tracing::debug!("registered built-in catalog");
    Ok(())
}
