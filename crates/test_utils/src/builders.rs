//! Test Data Builders
//!
//! Provides a builder for constructing records with only the attributes a
//! test cares about.

use chrono::{DateTime, Utc};
use core_kernel::{EntityId, Money};
use domain_entity::{
    AliasedValue, AttributeValue, Entity, EntityCollection, EntityReference, OptionSetValue,
};
use rust_decimal::Decimal;

/// Builder for constructing test records
pub struct EntityBuilder {
    entity: Entity,
}

impl EntityBuilder {
    /// Starts a record of the given type with a nil id
    pub fn new(logical_name: impl Into<String>) -> Self {
        Self {
            entity: Entity::new(logical_name),
        }
    }

    /// Sets the record id
    pub fn with_id(mut self, id: EntityId) -> Self {
        self.entity.id = id;
        self
    }

    /// Sets a fresh id and the matching primary-key attribute
    pub fn with_generated_id(mut self) -> Self {
        let id = EntityId::new();
        let primary_key = self.entity.primary_key_name();
        self.entity.id = id;
        self.entity.insert(primary_key, *id.as_uuid());
        self
    }

    /// Sets any attribute
    pub fn with(mut self, name: &str, value: impl Into<AttributeValue>) -> Self {
        self.entity.insert(name, value);
        self
    }

    /// Sets an attribute to null
    pub fn with_null(mut self, name: &str) -> Self {
        self.entity.insert_null(name);
        self
    }

    pub fn with_string(self, name: &str, value: impl Into<String>) -> Self {
        self.with(name, AttributeValue::String(value.into()))
    }

    pub fn with_option(self, name: &str, value: i32) -> Self {
        self.with(name, OptionSetValue::new(value))
    }

    pub fn with_money(self, name: &str, amount: Decimal) -> Self {
        self.with(name, Money::new(amount))
    }

    pub fn with_date(self, name: &str, value: DateTime<Utc>) -> Self {
        self.with(name, value)
    }

    /// Sets a lookup to another record
    pub fn with_lookup(self, name: &str, logical_name: &str, id: EntityId) -> Self {
        self.with(name, EntityReference::new(logical_name, id))
    }

    /// Sets an aliased value as returned by a linked query
    pub fn with_aliased(
        self,
        name: &str,
        entity_logical_name: &str,
        attribute_logical_name: &str,
        value: impl Into<AttributeValue>,
    ) -> Self {
        self.with(
            name,
            AliasedValue::new(entity_logical_name, attribute_logical_name, value),
        )
    }

    /// Sets a nested collection of records
    pub fn with_children(self, name: &str, entity_name: &str, children: Vec<Entity>) -> Self {
        let mut collection = EntityCollection::new(entity_name);
        for child in children {
            collection.push(child);
        }
        self.with(name, collection)
    }

    /// Builds the record
    pub fn build(self) -> Entity {
        self.entity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_builder_defaults() {
        let entity = EntityBuilder::new("account").build();
        assert_eq!(entity.logical_name, "account");
        assert!(entity.id.is_nil());
        assert!(entity.is_empty());
    }

    #[test]
    fn test_builder_with_generated_id() {
        let entity = EntityBuilder::new("contact").with_generated_id().build();
        assert!(!entity.id.is_nil());
        assert_eq!(
            entity.get("contactid"),
            Some(&AttributeValue::Guid(*entity.id.as_uuid()))
        );
    }

    #[test]
    fn test_builder_attributes() {
        let entity = EntityBuilder::new("account")
            .with_string("name", "Contoso")
            .with_option("industrycode", 4)
            .with_money("revenue", dec!(10.00))
            .with_null("fax")
            .with_children("contacts", "contact", vec![Entity::new("contact")])
            .build();

        assert_eq!(entity.len(), 5);
        assert!(entity.contains("fax"));
        assert_eq!(
            entity
                .get("contacts")
                .and_then(AttributeValue::as_entity_collection)
                .map(EntityCollection::len),
            Some(1)
        );
    }
}
