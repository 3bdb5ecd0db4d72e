//! Records and their attribute bags

use std::collections::btree_map::{self, BTreeMap};
use std::ops::{Deref, DerefMut};

use core_kernel::EntityId;

use crate::value::AttributeValue;

/// Presence of a named attribute
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttributeState<'a> {
    /// The collection has no attribute with this name
    Absent,
    /// The attribute is present with a null value
    Null,
    /// The attribute is present with a value
    Present(&'a AttributeValue),
}

/// Named attribute bag of a record
///
/// A present attribute may hold `None`, which is how the platform represents
/// a cleared field. Names are kept in sorted order so iteration and the XML
/// form are deterministic.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributeCollection {
    values: BTreeMap<String, Option<AttributeValue>>,
}

impl AttributeCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if an attribute with this name exists, null or not
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Returns the value if the attribute exists and is not null
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.values.get(name).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut AttributeValue> {
        self.values.get_mut(name).and_then(Option::as_mut)
    }

    /// Distinguishes absent, null, and present attributes
    pub fn state(&self, name: &str) -> AttributeState<'_> {
        match self.values.get(name) {
            None => AttributeState::Absent,
            Some(None) => AttributeState::Null,
            Some(Some(value)) => AttributeState::Present(value),
        }
    }

    /// Inserts or overwrites an attribute
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) {
        self.values.insert(name.into(), Some(value.into()));
    }

    /// Inserts or overwrites an attribute with an optional value
    pub fn insert_optional(&mut self, name: impl Into<String>, value: Option<AttributeValue>) {
        self.values.insert(name.into(), value);
    }

    /// Inserts or overwrites an attribute with a null value
    pub fn insert_null(&mut self, name: impl Into<String>) {
        self.values.insert(name.into(), None);
    }

    /// Removes an attribute, returning its slot if it existed
    pub fn remove(&mut self, name: &str) -> Option<Option<AttributeValue>> {
        self.values.remove(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Attribute names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.values.iter(),
        }
    }
}

/// Iterator over `(name, value)` pairs of an [`AttributeCollection`]
pub struct Iter<'a> {
    inner: btree_map::Iter<'a, String, Option<AttributeValue>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, Option<&'a AttributeValue>);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(name, value)| (name.as_str(), value.as_ref()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a> IntoIterator for &'a AttributeCollection {
    type Item = (&'a str, Option<&'a AttributeValue>);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Into<String>> FromIterator<(K, Option<AttributeValue>)> for AttributeCollection {
    fn from_iter<I: IntoIterator<Item = (K, Option<AttributeValue>)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// One record of a business entity
///
/// `Entity` dereferences to its [`AttributeCollection`], so attribute
/// operations can be called on the record directly.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Entity {
    /// Logical name of the entity type, e.g. "account"
    pub logical_name: String,
    /// Record identifier; nil until the record is created
    pub id: EntityId,
    pub attributes: AttributeCollection,
}

impl Entity {
    /// Creates an empty record of the given type with a nil id
    pub fn new(logical_name: impl Into<String>) -> Self {
        Self {
            logical_name: logical_name.into(),
            id: EntityId::nil(),
            attributes: AttributeCollection::new(),
        }
    }

    /// Creates an empty record with a known id
    pub fn with_id(logical_name: impl Into<String>, id: EntityId) -> Self {
        Self {
            id,
            ..Self::new(logical_name)
        }
    }

    /// Name of the primary-key attribute, `<logical_name>id`
    pub fn primary_key_name(&self) -> String {
        format!("{}id", self.logical_name)
    }

    /// Builds a reference pointing at this record
    pub fn to_entity_reference(&self) -> crate::value::EntityReference {
        crate::value::EntityReference::new(self.logical_name.clone(), self.id)
    }
}

impl Deref for Entity {
    type Target = AttributeCollection;

    fn deref(&self) -> &Self::Target {
        &self.attributes
    }
}

impl DerefMut for Entity {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.attributes
    }
}
