//! Domain Entity - Record model for the CRM organization service
//!
//! This crate models a platform record and the helpers that operate on it:
//! - `Entity` and its `AttributeCollection`, a bag of named, dynamically
//!   typed attributes where a present attribute may be null
//! - `AttributeValue`, the closed set of value kinds the platform stores
//! - Typed getters and setters through the [`AttributeAccess`] trait
//! - Deep cloning driven by a [`ClonePolicy`]
//! - An XML form of a record with a registry of known value kinds
//!
//! # Example
//!
//! ```
//! use domain_entity::{AttributeAccess, Entity};
//!
//! let mut account = Entity::new("account");
//! account.set_string_value("name", "Contoso");
//! account.set_picklist_value("industrycode", 7);
//!
//! assert_eq!(account.get_picklist_value("industrycode"), 7);
//! assert_eq!(account.get_picklist_value("missing"), -1);
//!
//! let copy = account.deep_clone();
//! let xml = copy.serialize().unwrap();
//! assert_eq!(Entity::deserialize(&xml).unwrap(), copy);
//! ```

pub mod attributes;
pub mod clone;
pub mod entity;
pub mod error;
pub mod value;
pub mod xml;

pub use attributes::{
    min_date_time, AttributeAccess, DEFAULT_PICKLIST_VALUE, STATE_CODE, STATUS_CODE,
};
pub use clone::{ClonePolicy, ConditionalExclusion};
pub use entity::{AttributeCollection, AttributeState, Entity};
pub use error::{EntityError, SerializationError};
pub use value::{
    AliasedValue, AttributeValue, EntityCollection, EntityReference, OptionSetValue, ValueKind,
};
pub use xml::{EntitySerializer, KnownTypes};
