//! Attribute values
//!
//! The platform stores attributes as untyped objects and callers inspect the
//! run-time type to decide how to read them. Here the set of shapes an
//! attribute can take is closed: every value is one variant of
//! [`AttributeValue`], and the carrier types for the structured shapes
//! (option sets, references, aliased values, nested collections) live
//! alongside it.

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use core_kernel::{EntityId, Money};

use crate::entity::Entity;

/// Integer-coded choice value (option set / picklist)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionSetValue(i32);

impl OptionSetValue {
    pub fn new(value: i32) -> Self {
        Self(value)
    }

    /// Returns the integer code
    pub fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for OptionSetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pointer to another record, identified by logical name and id
///
/// A reference never owns the record it points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityReference {
    pub logical_name: String,
    pub id: EntityId,
    /// Primary name of the referenced record, when the service returned it
    pub name: Option<String>,
}

impl EntityReference {
    pub fn new(logical_name: impl Into<String>, id: EntityId) -> Self {
        Self {
            logical_name: logical_name.into(),
            id,
            name: None,
        }
    }

    /// Sets the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl fmt::Display for EntityReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.logical_name, self.id)
    }
}

/// Value returned through a linked (joined) query
///
/// Wraps the real value together with the entity and attribute it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasedValue {
    pub entity_logical_name: String,
    pub attribute_logical_name: String,
    pub value: Box<AttributeValue>,
}

impl AliasedValue {
    pub fn new(
        entity_logical_name: impl Into<String>,
        attribute_logical_name: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        Self {
            entity_logical_name: entity_logical_name.into(),
            attribute_logical_name: attribute_logical_name.into(),
            value: Box::new(value.into()),
        }
    }
}

/// Ordered list of child records sharing one logical name
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntityCollection {
    pub entity_name: String,
    pub entities: Vec<Entity>,
}

impl EntityCollection {
    pub fn new(entity_name: impl Into<String>) -> Self {
        Self {
            entity_name: entity_name.into(),
            entities: Vec::new(),
        }
    }

    /// Appends a child record
    pub fn push(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl FromIterator<Entity> for EntityCollection {
    /// Collects records, taking the collection name from the first one
    fn from_iter<I: IntoIterator<Item = Entity>>(iter: I) -> Self {
        let entities: Vec<Entity> = iter.into_iter().collect();
        let entity_name = entities
            .first()
            .map(|e| e.logical_name.clone())
            .unwrap_or_default();
        Self {
            entity_name,
            entities,
        }
    }
}

/// A typed attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    String(String),
    Integer(i32),
    BigInt(i64),
    Double(f64),
    Decimal(Decimal),
    Boolean(bool),
    DateTime(DateTime<Utc>),
    Guid(Uuid),
    OptionSet(OptionSetValue),
    Money(Money),
    EntityReference(EntityReference),
    Aliased(AliasedValue),
    EntityCollection(EntityCollection),
}

/// Tag naming each [`AttributeValue`] variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueKind {
    String,
    Integer,
    BigInt,
    Double,
    Decimal,
    Boolean,
    DateTime,
    Guid,
    OptionSet,
    Money,
    EntityReference,
    Aliased,
    EntityCollection,
}

impl ValueKind {
    /// Every kind, in declaration order
    pub const ALL: [ValueKind; 13] = [
        ValueKind::String,
        ValueKind::Integer,
        ValueKind::BigInt,
        ValueKind::Double,
        ValueKind::Decimal,
        ValueKind::Boolean,
        ValueKind::DateTime,
        ValueKind::Guid,
        ValueKind::OptionSet,
        ValueKind::Money,
        ValueKind::EntityReference,
        ValueKind::Aliased,
        ValueKind::EntityCollection,
    ];

    /// Type tag used in the XML form
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Integer => "int",
            ValueKind::BigInt => "bigint",
            ValueKind::Double => "double",
            ValueKind::Decimal => "decimal",
            ValueKind::Boolean => "boolean",
            ValueKind::DateTime => "dateTime",
            ValueKind::Guid => "guid",
            ValueKind::OptionSet => "optionSetValue",
            ValueKind::Money => "money",
            ValueKind::EntityReference => "entityReference",
            ValueKind::Aliased => "aliasedValue",
            ValueKind::EntityCollection => "entityCollection",
        }
    }

    /// Looks up a kind by its type tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AttributeValue {
    /// Returns the variant tag
    pub fn kind(&self) -> ValueKind {
        match self {
            AttributeValue::String(_) => ValueKind::String,
            AttributeValue::Integer(_) => ValueKind::Integer,
            AttributeValue::BigInt(_) => ValueKind::BigInt,
            AttributeValue::Double(_) => ValueKind::Double,
            AttributeValue::Decimal(_) => ValueKind::Decimal,
            AttributeValue::Boolean(_) => ValueKind::Boolean,
            AttributeValue::DateTime(_) => ValueKind::DateTime,
            AttributeValue::Guid(_) => ValueKind::Guid,
            AttributeValue::OptionSet(_) => ValueKind::OptionSet,
            AttributeValue::Money(_) => ValueKind::Money,
            AttributeValue::EntityReference(_) => ValueKind::EntityReference,
            AttributeValue::Aliased(_) => ValueKind::Aliased,
            AttributeValue::EntityCollection(_) => ValueKind::EntityCollection,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_option_set(&self) -> Option<OptionSetValue> {
        match self {
            AttributeValue::OptionSet(o) => Some(*o),
            _ => None,
        }
    }

    pub fn as_entity_reference(&self) -> Option<&EntityReference> {
        match self {
            AttributeValue::EntityReference(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_entity_collection(&self) -> Option<&EntityCollection> {
        match self {
            AttributeValue::EntityCollection(c) => Some(c),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::String(s) => f.write_str(s),
            AttributeValue::Integer(v) => write!(f, "{}", v),
            AttributeValue::BigInt(v) => write!(f, "{}", v),
            AttributeValue::Double(v) => write!(f, "{}", v),
            AttributeValue::Decimal(v) => write!(f, "{}", v),
            AttributeValue::Boolean(v) => write!(f, "{}", v),
            AttributeValue::DateTime(v) => {
                f.write_str(&v.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            AttributeValue::Guid(v) => write!(f, "{}", v),
            AttributeValue::OptionSet(v) => write!(f, "{}", v),
            AttributeValue::Money(v) => write!(f, "{}", v),
            AttributeValue::EntityReference(v) => write!(f, "{}", v),
            AttributeValue::Aliased(v) => write!(f, "{}", v.value),
            AttributeValue::EntityCollection(v) => {
                write!(f, "{}[{}]", v.entity_name, v.entities.len())
            }
        }
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        AttributeValue::Integer(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::BigInt(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Double(value)
    }
}

impl From<Decimal> for AttributeValue {
    fn from(value: Decimal) -> Self {
        AttributeValue::Decimal(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Boolean(value)
    }
}

impl From<DateTime<Utc>> for AttributeValue {
    fn from(value: DateTime<Utc>) -> Self {
        AttributeValue::DateTime(value)
    }
}

impl From<Uuid> for AttributeValue {
    fn from(value: Uuid) -> Self {
        AttributeValue::Guid(value)
    }
}

impl From<OptionSetValue> for AttributeValue {
    fn from(value: OptionSetValue) -> Self {
        AttributeValue::OptionSet(value)
    }
}

impl From<Money> for AttributeValue {
    fn from(value: Money) -> Self {
        AttributeValue::Money(value)
    }
}

impl From<EntityReference> for AttributeValue {
    fn from(value: EntityReference) -> Self {
        AttributeValue::EntityReference(value)
    }
}

impl From<AliasedValue> for AttributeValue {
    fn from(value: AliasedValue) -> Self {
        AttributeValue::Aliased(value)
    }
}

impl From<EntityCollection> for AttributeValue {
    fn from(value: EntityCollection) -> Self {
        AttributeValue::EntityCollection(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_kind_tags_round_trip() {
        for kind in ValueKind::ALL {
            assert_eq!(ValueKind::from_tag(kind.as_str()), Some(kind));
        }
        assert_eq!(ValueKind::from_tag("partylist"), None);
    }

    #[test]
    fn test_display_forms() {
        assert_eq!(AttributeValue::from("Contoso").to_string(), "Contoso");
        assert_eq!(AttributeValue::from(42).to_string(), "42");
        assert_eq!(AttributeValue::from(OptionSetValue::new(3)).to_string(), "3");
        assert_eq!(AttributeValue::from(Money::new(dec!(9.50))).to_string(), "9.50");

        let aliased = AliasedValue::new("contact", "fullname", "Jane Doe");
        assert_eq!(AttributeValue::from(aliased).to_string(), "Jane Doe");
    }

    #[test]
    fn test_reference_display_includes_logical_name() {
        let id = EntityId::new();
        let reference = EntityReference::new("contact", id).with_name("Jane");
        assert_eq!(reference.to_string(), format!("contact({})", id));
        assert_eq!(reference.name.as_deref(), Some("Jane"));
    }

    #[test]
    fn test_collection_from_iter_takes_first_name() {
        let collection: EntityCollection =
            vec![Entity::new("activityparty"), Entity::new("activityparty")]
                .into_iter()
                .collect();
        assert_eq!(collection.entity_name, "activityparty");
        assert_eq!(collection.len(), 2);
        assert_eq!(AttributeValue::from(collection).to_string(), "activityparty[2]");
    }

    #[test]
    fn test_accessors_reject_other_kinds() {
        let value = AttributeValue::from(7);
        assert!(value.as_str().is_none());
        assert!(value.as_option_set().is_none());
        assert!(value.as_entity_reference().is_none());
        assert!(value.as_entity_collection().is_none());
        assert_eq!(value.kind(), ValueKind::Integer);
    }
}
