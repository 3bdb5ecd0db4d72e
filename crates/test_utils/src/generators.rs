//! Property-Based Test Generators
//!
//! Provides proptest strategies for records built from the closed set of
//! attribute kinds. Generated doubles are always finite so records compare
//! equal to themselves.

use chrono::{DateTime, Utc};
use core_kernel::{EntityId, Money};
use domain_entity::{
    AliasedValue, AttributeValue, Entity, EntityCollection, EntityReference, OptionSetValue,
};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Earliest and latest instants the platform stores (years 1 and 9999)
const MIN_TIMESTAMP: i64 = -62_135_596_800;
const MAX_TIMESTAMP: i64 = 253_402_300_799;

/// Strategy for generating record ids, including the nil id
pub fn entity_id_strategy() -> impl Strategy<Value = EntityId> {
    prop_oneof![
        1 => Just(EntityId::nil()),
        9 => any::<u128>().prop_map(|n| EntityId::from_uuid(Uuid::from_u128(n))),
    ]
}

/// Strategy for generating entity logical names
pub fn logical_name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z_]{0,11}"
}

/// Strategy for generating attribute names
pub fn attribute_name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_.]{0,15}"
}

/// Strategy for string values, including markup characters and whitespace
pub fn text_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 <>&'\"]{0,24}"
}

/// Strategy for generating decimals with up to 10 fractional digits
pub fn decimal_strategy() -> impl Strategy<Value = Decimal> {
    (any::<i64>(), 0u32..=10u32).prop_map(|(m, s)| Decimal::new(m, s))
}

/// Strategy for generating money amounts with 0 to 4 fractional digits
pub fn money_strategy() -> impl Strategy<Value = Money> {
    (-1_000_000_000_000i64..1_000_000_000_000i64, 0u32..=4u32)
        .prop_map(|(m, s)| Money::new(Decimal::new(m, s)))
}

/// Strategy for generating instants between years 1 and 9999
pub fn date_time_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (MIN_TIMESTAMP..=MAX_TIMESTAMP, 0u32..1_000_000_000u32).prop_map(|(secs, nanos)| {
        DateTime::from_timestamp(secs, nanos).unwrap_or(DateTime::<Utc>::MIN_UTC)
    })
}

/// Strategy for generating finite doubles
pub fn double_strategy() -> impl Strategy<Value = f64> {
    prop::num::f64::NORMAL | prop::num::f64::SUBNORMAL | prop::num::f64::ZERO
}

/// Strategy for generating references, with and without a display name
pub fn entity_reference_strategy() -> impl Strategy<Value = EntityReference> {
    (
        logical_name_strategy(),
        entity_id_strategy(),
        prop::option::of(text_strategy()),
    )
        .prop_map(|(logical_name, id, name)| EntityReference {
            logical_name,
            id,
            name,
        })
}

/// Strategy for every non-nested attribute kind
pub fn scalar_value_strategy() -> impl Strategy<Value = AttributeValue> {
    prop_oneof![
        text_strategy().prop_map(AttributeValue::String),
        any::<i32>().prop_map(AttributeValue::Integer),
        any::<i64>().prop_map(AttributeValue::BigInt),
        double_strategy().prop_map(AttributeValue::Double),
        decimal_strategy().prop_map(AttributeValue::Decimal),
        any::<bool>().prop_map(AttributeValue::Boolean),
        date_time_strategy().prop_map(AttributeValue::DateTime),
        any::<u128>().prop_map(|n| AttributeValue::Guid(Uuid::from_u128(n))),
        any::<i32>().prop_map(|v| AttributeValue::OptionSet(OptionSetValue::new(v))),
        money_strategy().prop_map(AttributeValue::Money),
        entity_reference_strategy().prop_map(AttributeValue::EntityReference),
    ]
}

fn attribute_map_strategy<S>(
    values: S,
    size: std::ops::Range<usize>,
) -> impl Strategy<Value = BTreeMap<String, Option<AttributeValue>>>
where
    S: Strategy<Value = AttributeValue>,
{
    prop::collection::btree_map(
        attribute_name_strategy(),
        prop::option::weighted(0.85, values),
        size,
    )
}

fn assemble(
    logical_name: String,
    id: EntityId,
    attributes: BTreeMap<String, Option<AttributeValue>>,
) -> Entity {
    let mut entity = Entity::with_id(logical_name, id);
    for (name, value) in attributes {
        entity.insert_optional(name, value);
    }
    entity
}

/// Strategy for every attribute kind, nesting aliased values and
/// collections of records a few levels deep
pub fn attribute_value_strategy() -> impl Strategy<Value = AttributeValue> {
    scalar_value_strategy().prop_recursive(3, 32, 4, |inner| {
        let child = (
            logical_name_strategy(),
            entity_id_strategy(),
            attribute_map_strategy(inner.clone(), 0..4),
        )
            .prop_map(|(logical_name, id, attributes)| assemble(logical_name, id, attributes));

        prop_oneof![
            (logical_name_strategy(), attribute_name_strategy(), inner)
                .prop_map(|(entity, attribute, value)| {
                    AttributeValue::Aliased(AliasedValue::new(entity, attribute, value))
                }),
            (logical_name_strategy(), prop::collection::vec(child, 0..3)).prop_map(
                |(entity_name, entities)| {
                    AttributeValue::EntityCollection(EntityCollection {
                        entity_name,
                        entities,
                    })
                }
            ),
        ]
    })
}

/// Strategy for generating whole records
pub fn entity_strategy() -> impl Strategy<Value = Entity> {
    (
        logical_name_strategy(),
        entity_id_strategy(),
        attribute_map_strategy(attribute_value_strategy(), 0..8),
    )
        .prop_map(|(logical_name, id, attributes)| assemble(logical_name, id, attributes))
}

/// Strategy for generating activity records with attached parties
///
/// Each record carries `activitytypecode`, `activityid`, its own primary key,
/// and a `to` collection of `activityparty` records that still point back at
/// the activity.
pub fn activity_strategy() -> impl Strategy<Value = Entity> {
    let party = (
        any::<u128>(),
        attribute_map_strategy(scalar_value_strategy(), 0..4),
    )
        .prop_map(|(party_id, attributes)| {
            let mut party = assemble("activityparty".to_string(), EntityId::nil(), attributes);
            party.insert("activitypartyid", Uuid::from_u128(party_id));
            party
        });

    (
        prop_oneof![Just("email"), Just("task"), Just("appointment"), Just("phonecall")],
        any::<u128>(),
        attribute_map_strategy(scalar_value_strategy(), 0..6),
        prop::collection::vec(party, 0..4),
    )
        .prop_map(|(logical_name, activity_id, attributes, mut parties)| {
            let id = EntityId::from_uuid(Uuid::from_u128(activity_id));
            let mut activity = assemble(logical_name.to_string(), id, attributes);
            let primary_key = activity.primary_key_name();
            activity.insert(primary_key, *id.as_uuid());
            activity.insert("activityid", *id.as_uuid());
            activity.insert("activitytypecode", logical_name);

            for party in &mut parties {
                party.insert("activityid", EntityReference::new(logical_name, id));
            }
            activity.insert(
                "to",
                EntityCollection {
                    entity_name: "activityparty".to_string(),
                    entities: parties,
                },
            );
            activity
        })
}
