//! Property tests over generated records

use proptest::prelude::*;

use domain_entity::{
    AliasedValue, AttributeAccess, AttributeValue, ClonePolicy, Entity, EntityCollection,
    EntityReference,
};
use test_utils::generators::*;

/// What a policy-free copy of `value` should hold: nested records lose
/// their ids and references lose their display names
fn as_copied(value: &AttributeValue) -> AttributeValue {
    match value {
        AttributeValue::EntityReference(r) => {
            AttributeValue::EntityReference(EntityReference::new(r.logical_name.clone(), r.id))
        }
        AttributeValue::Aliased(a) => AttributeValue::Aliased(AliasedValue::new(
            a.entity_logical_name.clone(),
            a.attribute_logical_name.clone(),
            as_copied(&a.value),
        )),
        AttributeValue::EntityCollection(c) => {
            let mut copy = EntityCollection::new(c.entity_name.clone());
            for child in &c.entities {
                copy.push(as_copied_entity(child));
            }
            AttributeValue::EntityCollection(copy)
        }
        other => other.clone(),
    }
}

fn as_copied_entity(entity: &Entity) -> Entity {
    let mut copy = Entity::new(entity.logical_name.clone());
    for (name, slot) in entity.iter() {
        copy.insert_optional(name, slot.map(as_copied));
    }
    copy
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn test_xml_round_trip(entity in entity_strategy()) {
        let xml = entity.serialize().unwrap();
        let restored = Entity::deserialize(&xml).unwrap();
        prop_assert_eq!(restored, entity);
    }

    #[test]
    fn test_clone_round_trip(activity in activity_strategy()) {
        let copy = activity.deep_clone();
        let restored = Entity::deserialize(&copy.serialize().unwrap()).unwrap();
        prop_assert_eq!(restored, copy);
    }

    #[test]
    fn test_deep_clone_drops_primary_key(entity in entity_strategy()) {
        let copy = entity.deep_clone();
        let primary_key = entity.primary_key_name();

        prop_assert!(copy.id.is_nil());
        prop_assert_eq!(&copy.logical_name, &entity.logical_name);
        prop_assert!(!copy.contains(&primary_key));
        if entity.contains("activitytypecode") {
            prop_assert!(!copy.contains("activityid"));
        }

        for name in entity.names() {
            let excluded = name == primary_key
                || (name == "activityid" && entity.contains("activitytypecode"));
            prop_assert_eq!(copy.contains(name), !excluded, "attribute {}", name);
        }
    }

    #[test]
    fn test_deep_clone_of_activity(activity in activity_strategy()) {
        let copy = activity.deep_clone();

        prop_assert!(!copy.contains("activityid"));
        prop_assert!(!copy.contains(&activity.primary_key_name()));
        prop_assert!(copy.contains("activitytypecode"));

        let parties = copy
            .get("to")
            .and_then(AttributeValue::as_entity_collection)
            .unwrap();
        for party in &parties.entities {
            prop_assert!(!party.contains("activityid"));
            prop_assert!(!party.contains("activitypartyid"));
            prop_assert!(party.id.is_nil());
        }
    }

    #[test]
    fn test_clone_without_policy_is_structurally_equal(entity in entity_strategy()) {
        let copy = entity.deep_clone_with(&ClonePolicy::none());
        prop_assert!(copy.id.is_nil());
        prop_assert_eq!(copy, as_copied_entity(&entity));
    }

    #[test]
    fn test_setter_keeps_last_value(
        name in attribute_name_strategy(),
        first in any::<i32>(),
        second in any::<i32>(),
    ) {
        let mut entity = Entity::new("account");
        entity.set_picklist_value(&name, first);
        entity.set_picklist_value(&name, second);

        prop_assert_eq!(entity.len(), 1);
        prop_assert_eq!(entity.get_picklist_value(&name), second);
    }

    #[test]
    fn test_picklist_default_for_non_option_sets(
        value in scalar_value_strategy(),
        default in any::<i32>(),
    ) {
        let mut entity = Entity::new("account");
        entity.insert("industrycode", value.clone());

        let expected = value.as_option_set().map(|o| o.value()).unwrap_or(default);
        prop_assert_eq!(entity.get_picklist_value_or("industrycode", default), expected);
        prop_assert_eq!(entity.get_picklist_value_or("missing", default), default);
    }

    #[test]
    fn test_accessors_never_panic(entity in entity_strategy(), name in attribute_name_strategy()) {
        let _ = entity.get_value(&name);
        let _ = entity.get_string_value(&name);
        let _ = entity.get_picklist_value(&name);
        let _ = entity.get_date_time_value(&name);
        let _ = entity.get_lookup_value(&name);
        let _ = entity.get_money_value(&name);
        let _ = entity.get_number_value(&name);
        let _ = entity.get_float_value(&name);
        let _ = entity.get_decimal_value(&name);
        for present in entity.names() {
            let _ = entity.get_value(present);
            let _ = entity.get_number_value(present);
            let _ = entity.get_decimal_value(present);
        }
    }
}
