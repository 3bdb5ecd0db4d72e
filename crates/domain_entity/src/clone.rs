//! Record copying
//!
//! Deep copies rebuild every carrier value and recurse into nested
//! collections. Which attributes are left out is decided by a
//! [`ClonePolicy`], so the copy routine itself knows nothing about activity
//! records or any other entity type.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::trace;

use crate::entity::Entity;
use crate::error::EntityError;
use crate::value::{AliasedValue, AttributeValue, EntityCollection, EntityReference};

/// Drop `exclude` from the copy when the source carries `when_present`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalExclusion {
    pub when_present: String,
    pub exclude: String,
}

impl ConditionalExclusion {
    pub fn new(when_present: impl Into<String>, exclude: impl Into<String>) -> Self {
        Self {
            when_present: when_present.into(),
            exclude: exclude.into(),
        }
    }
}

/// Decides which attributes a deep copy leaves out
///
/// The default policy matches how the platform expects copies to be created:
///
/// - the primary key `<logical_name>id` is never copied;
/// - activities (records with `activitytypecode`) also drop `activityid`;
/// - nested `activityparty` records drop `activityid` and `activitypartyid`
///   so they can be attached to the new activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClonePolicy {
    /// Leave out `<logical_name>id` when copying a whole record
    pub skip_primary_key: bool,
    /// Exclusions that apply when another attribute is present
    pub conditional_exclusions: Vec<ConditionalExclusion>,
    /// Attributes stripped from nested records, keyed by their logical name
    pub child_exclusions: BTreeMap<String, Vec<String>>,
}

impl Default for ClonePolicy {
    fn default() -> Self {
        let mut child_exclusions = BTreeMap::new();
        child_exclusions.insert(
            "activityparty".to_string(),
            vec!["activityid".to_string(), "activitypartyid".to_string()],
        );

        Self {
            skip_primary_key: true,
            conditional_exclusions: vec![ConditionalExclusion::new(
                "activitytypecode",
                "activityid",
            )],
            child_exclusions,
        }
    }
}

impl ClonePolicy {
    /// A policy that copies everything
    pub fn none() -> Self {
        Self {
            skip_primary_key: false,
            conditional_exclusions: Vec::new(),
            child_exclusions: BTreeMap::new(),
        }
    }

    /// Adds a conditional exclusion
    pub fn exclude_when(mut self, when_present: impl Into<String>, exclude: impl Into<String>) -> Self {
        self.conditional_exclusions
            .push(ConditionalExclusion::new(when_present, exclude));
        self
    }

    /// Adds attributes to strip from nested records of `logical_name`
    pub fn strip_from_children<I, S>(mut self, logical_name: impl Into<String>, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.child_exclusions
            .entry(logical_name.into())
            .or_default()
            .extend(attributes.into_iter().map(Into::into));
        self
    }

    /// Names the policy leaves out when copying the whole of `source`
    fn skipped_fields(&self, source: &Entity) -> Vec<String> {
        let mut skipped = Vec::new();
        if self.skip_primary_key {
            skipped.push(source.primary_key_name());
        }
        for rule in &self.conditional_exclusions {
            if source.contains(&rule.when_present) {
                skipped.push(rule.exclude.clone());
            }
        }
        skipped
    }

    /// Strips child exclusions from a cloned nested record
    fn strip_child(&self, child: &mut Entity) {
        if let Some(names) = self.child_exclusions.get(&child.logical_name) {
            for name in names {
                child.remove(name);
            }
        }
    }

    fn clone_value(&self, value: &AttributeValue) -> AttributeValue {
        match value {
            AttributeValue::Aliased(aliased) => AttributeValue::Aliased(AliasedValue {
                entity_logical_name: aliased.entity_logical_name.clone(),
                attribute_logical_name: aliased.attribute_logical_name.clone(),
                value: Box::new(self.clone_value(&aliased.value)),
            }),
            AttributeValue::EntityCollection(collection) => {
                let mut copy = EntityCollection::new(collection.entity_name.clone());
                for child in &collection.entities {
                    let mut cloned = self.clone_entity(child);
                    self.strip_child(&mut cloned);
                    copy.push(cloned);
                }
                AttributeValue::EntityCollection(copy)
            }
            // Copies point at the same record without its display name
            AttributeValue::EntityReference(reference) => AttributeValue::EntityReference(
                EntityReference::new(reference.logical_name.clone(), reference.id),
            ),
            // Scalars and flat carriers own no shared state
            other => other.clone(),
        }
    }

    fn clone_slot(&self, slot: Option<&AttributeValue>) -> Option<AttributeValue> {
        slot.map(|value| self.clone_value(value))
    }

    /// Copies every attribute the policy does not exclude
    pub fn clone_entity(&self, source: &Entity) -> Entity {
        let skipped = self.skipped_fields(source);
        let mut result = Entity::new(source.logical_name.clone());

        for (name, slot) in source.iter() {
            if skipped.iter().any(|s| s == name) {
                trace!(entity = %source.logical_name, attribute = name, "skipping attribute");
                continue;
            }
            result.insert_optional(name, self.clone_slot(slot));
        }

        result
    }

    /// Copies only the named attributes
    ///
    /// Names the source does not carry are skipped.
    ///
    /// # Errors
    ///
    /// `EntityError::ArgumentNull` when `fields` is `None`.
    pub fn clone_fields<S: AsRef<str>>(
        &self,
        source: &Entity,
        fields: Option<&[S]>,
    ) -> Result<Entity, EntityError> {
        let fields = fields.ok_or(EntityError::ArgumentNull("fields"))?;
        let mut result = Entity::new(source.logical_name.clone());

        for field in fields {
            let field = field.as_ref();
            if !source.contains(field) {
                continue;
            }
            result.insert_optional(field, self.clone_slot(source.get(field)));
        }

        Ok(result)
    }
}

impl Entity {
    /// Deep copy with the default policy
    pub fn deep_clone(&self) -> Entity {
        ClonePolicy::default().clone_entity(self)
    }

    /// Deep copy with a caller-supplied policy
    pub fn deep_clone_with(&self, policy: &ClonePolicy) -> Entity {
        policy.clone_entity(self)
    }

    /// Deep copy of the named attributes with the default policy
    pub fn clone_fields<S: AsRef<str>>(&self, fields: Option<&[S]>) -> Result<Entity, EntityError> {
        ClonePolicy::default().clone_fields(self, fields)
    }

    /// Deep copy of the named attributes with a caller-supplied policy
    pub fn clone_fields_with<S: AsRef<str>>(
        &self,
        policy: &ClonePolicy,
        fields: Option<&[S]>,
    ) -> Result<Entity, EntityError> {
        policy.clone_fields(self, fields)
    }

    /// True when the attribute exists and is not null
    pub fn contains_not_null(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// A record holding only the logical name and id of this one
    ///
    /// The primary-key attribute is set to the id when this record carries
    /// that attribute.
    pub fn create_empty(&self) -> Entity {
        let mut result = Entity::with_id(self.logical_name.clone(), self.id);

        let key_name = self.primary_key_name();
        if self.contains(&key_name) {
            result.insert(key_name, *self.id.as_uuid());
        }

        result
    }
}
