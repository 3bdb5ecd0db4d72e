//! Typed attribute access
//!
//! [`AttributeAccess`] reads and writes an attribute bag through typed
//! getters and setters. Getters never fail on a missing attribute: absent
//! and null attributes yield a documented default instead.
//!
//! | getter                | default when absent/null          |
//! |-----------------------|-----------------------------------|
//! | `get_value`           | `None`                            |
//! | `get_string_value`    | `None`                            |
//! | `get_picklist_value`  | `-1` (or the caller's default)    |
//! | `get_date_time_value` | [`min_date_time`] (0001-01-01)    |
//! | `get_lookup_value`    | nil id                            |
//! | numeric getters       | `Ok(0)`                           |
//!
//! For picklists, dates and lookups a value of the wrong type is treated the
//! same as an absent one. The numeric getters instead convert what they can
//! and return [`EntityError::Conversion`] for what they cannot. Use
//! [`AttributeCollection::state`] when the difference between absent, null
//! and present matters.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use core_kernel::{EntityId, Money};

use crate::entity::{AttributeCollection, Entity};
use crate::error::EntityError;
use crate::value::{AttributeValue, EntityReference, OptionSetValue};

/// Reserved name of the status reason attribute
pub const STATUS_CODE: &str = "statuscode";

/// Reserved name of the state attribute
pub const STATE_CODE: &str = "statecode";

/// Picklist value returned when no option is set
pub const DEFAULT_PICKLIST_VALUE: i32 = -1;

/// Seconds from 0001-01-01T00:00:00Z to the Unix epoch
const MIN_DATE_UNIX_SECONDS: i64 = -62_135_596_800;

/// The "no date" sentinel, 0001-01-01T00:00:00Z
pub fn min_date_time() -> DateTime<Utc> {
    DateTime::from_timestamp(MIN_DATE_UNIX_SECONDS, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Typed getters and setters over an attribute bag
pub trait AttributeAccess {
    fn attributes(&self) -> &AttributeCollection;

    fn attributes_mut(&mut self) -> &mut AttributeCollection;

    /// Returns the attribute with carrier types unwrapped
    ///
    /// References become their id (`Guid`), option sets their code
    /// (`Integer`), money its amount (`Decimal`), and aliased values their
    /// inner value. All other values are returned as stored.
    fn get_value(&self, name: &str) -> Option<AttributeValue> {
        let value = self.attributes().get(name)?;
        let unwrapped = match value {
            AttributeValue::EntityReference(reference) => {
                AttributeValue::Guid(*reference.id.as_uuid())
            }
            AttributeValue::OptionSet(option) => AttributeValue::Integer(option.value()),
            AttributeValue::Money(money) => AttributeValue::Decimal(money.amount()),
            AttributeValue::Aliased(aliased) => (*aliased.value).clone(),
            other => other.clone(),
        };
        Some(unwrapped)
    }

    /// Returns the string form of the attribute
    fn get_string_value(&self, name: &str) -> Option<String> {
        self.attributes().get(name).map(|value| match value {
            AttributeValue::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// Returns the option set code, or `-1`
    fn get_picklist_value(&self, name: &str) -> i32 {
        self.get_picklist_value_or(name, DEFAULT_PICKLIST_VALUE)
    }

    /// Returns the option set code, or `default` when absent or not an option set
    fn get_picklist_value_or(&self, name: &str, default: i32) -> i32 {
        self.attributes()
            .get(name)
            .and_then(AttributeValue::as_option_set)
            .map(|option| option.value())
            .unwrap_or(default)
    }

    /// Returns the `statuscode` option, or `-1`
    fn get_status_value(&self) -> i32 {
        self.get_picklist_value(STATUS_CODE)
    }

    /// Returns the `statecode` option, or `-1`
    fn get_state_value(&self) -> i32 {
        self.get_picklist_value(STATE_CODE)
    }

    /// Returns the date, or [`min_date_time`] when absent or not a date
    fn get_date_time_value(&self, name: &str) -> DateTime<Utc> {
        match self.attributes().get(name) {
            Some(AttributeValue::DateTime(value)) => *value,
            _ => min_date_time(),
        }
    }

    /// Returns the referenced id, or the nil id when absent or not a reference
    fn get_lookup_value(&self, name: &str) -> EntityId {
        self.get_reference(name)
            .map(|reference| reference.id)
            .unwrap_or_else(EntityId::nil)
    }

    /// Returns the reference stored under `name`, if any
    fn get_reference(&self, name: &str) -> Option<&EntityReference> {
        self.attributes()
            .get(name)
            .and_then(AttributeValue::as_entity_reference)
    }

    /// Returns the money amount, or zero when absent
    ///
    /// # Errors
    ///
    /// `EntityError::Conversion` if the attribute holds something other than money.
    fn get_money_value(&self, name: &str) -> Result<Decimal, EntityError> {
        match self.attributes().get(name) {
            None => Ok(Decimal::ZERO),
            Some(value) => money_amount(name, value),
        }
    }

    /// Returns the attribute as an `i32`, or zero when absent
    ///
    /// # Errors
    ///
    /// `EntityError::Conversion` if the stored value cannot be converted.
    fn get_number_value(&self, name: &str) -> Result<i32, EntityError> {
        match self.attributes().get(name) {
            None => Ok(0),
            Some(value) => to_i32(name, value),
        }
    }

    /// Returns the attribute as an `f64`, or zero when absent
    ///
    /// # Errors
    ///
    /// `EntityError::Conversion` if the stored value cannot be converted.
    fn get_float_value(&self, name: &str) -> Result<f64, EntityError> {
        match self.attributes().get(name) {
            None => Ok(0.0),
            Some(value) => to_f64(name, value),
        }
    }

    /// Returns the attribute as a `Decimal`, or zero when absent
    ///
    /// # Errors
    ///
    /// `EntityError::Conversion` if the stored value cannot be converted.
    fn get_decimal_value(&self, name: &str) -> Result<Decimal, EntityError> {
        match self.attributes().get(name) {
            None => Ok(Decimal::ZERO),
            Some(value) => to_decimal(name, value),
        }
    }

    fn set_picklist_value(&mut self, name: &str, value: i32) {
        self.attributes_mut().insert(name, OptionSetValue::new(value));
    }

    fn set_string_value(&mut self, name: &str, value: impl Into<String>) {
        self.attributes_mut().insert(name, AttributeValue::String(value.into()));
    }

    fn set_date_time_value(&mut self, name: &str, value: DateTime<Utc>) {
        self.attributes_mut().insert(name, value);
    }

    fn set_lookup_value(&mut self, name: &str, logical_name: impl Into<String>, id: EntityId) {
        self.attributes_mut()
            .insert(name, EntityReference::new(logical_name, id));
    }

    fn set_number_value(&mut self, name: &str, value: i32) {
        self.attributes_mut().insert(name, value);
    }

    fn set_money_value(&mut self, name: &str, value: Decimal) {
        self.attributes_mut().insert(name, Money::new(value));
    }

    fn set_decimal_value(&mut self, name: &str, value: Decimal) {
        self.attributes_mut().insert(name, value);
    }

    fn set_float_value(&mut self, name: &str, value: f64) {
        self.attributes_mut().insert(name, value);
    }
}

impl AttributeAccess for AttributeCollection {
    fn attributes(&self) -> &AttributeCollection {
        self
    }

    fn attributes_mut(&mut self) -> &mut AttributeCollection {
        self
    }
}

impl AttributeAccess for Entity {
    fn attributes(&self) -> &AttributeCollection {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut AttributeCollection {
        &mut self.attributes
    }
}

fn mismatch(name: &str, value: &AttributeValue, target: &'static str) -> EntityError {
    EntityError::conversion(name, value.kind().as_str(), target)
}

fn money_amount(name: &str, value: &AttributeValue) -> Result<Decimal, EntityError> {
    match value {
        AttributeValue::Money(money) => Ok(money.amount()),
        AttributeValue::Aliased(aliased) => money_amount(name, &aliased.value),
        other => Err(mismatch(name, other, "money")),
    }
}

fn to_i32(name: &str, value: &AttributeValue) -> Result<i32, EntityError> {
    let converted = match value {
        AttributeValue::Integer(v) => Some(*v),
        AttributeValue::BigInt(v) => i32::try_from(*v).ok(),
        AttributeValue::Double(v) => {
            let rounded = v.round_ties_even();
            (rounded.is_finite() && rounded >= i32::MIN as f64 && rounded <= i32::MAX as f64)
                .then_some(rounded as i32)
        }
        AttributeValue::Decimal(v) => v
            .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
            .to_i32(),
        AttributeValue::Boolean(v) => Some(i32::from(*v)),
        AttributeValue::String(s) => s.trim().parse::<i32>().ok(),
        AttributeValue::Aliased(aliased) => return to_i32(name, &aliased.value),
        _ => None,
    };
    converted.ok_or_else(|| mismatch(name, value, "i32"))
}

fn to_f64(name: &str, value: &AttributeValue) -> Result<f64, EntityError> {
    let converted = match value {
        AttributeValue::Double(v) => Some(*v),
        AttributeValue::Integer(v) => Some(f64::from(*v)),
        AttributeValue::BigInt(v) => Some(*v as f64),
        AttributeValue::Decimal(v) => v.to_f64(),
        AttributeValue::Boolean(v) => Some(if *v { 1.0 } else { 0.0 }),
        AttributeValue::String(s) => s.trim().parse::<f64>().ok(),
        AttributeValue::Aliased(aliased) => return to_f64(name, &aliased.value),
        _ => None,
    };
    converted.ok_or_else(|| mismatch(name, value, "f64"))
}

fn to_decimal(name: &str, value: &AttributeValue) -> Result<Decimal, EntityError> {
    let converted = match value {
        AttributeValue::Decimal(v) => Some(*v),
        AttributeValue::Integer(v) => Some(Decimal::from(*v)),
        AttributeValue::BigInt(v) => Some(Decimal::from(*v)),
        AttributeValue::Double(v) => Decimal::try_from(*v).ok(),
        AttributeValue::Boolean(v) => Some(if *v { Decimal::ONE } else { Decimal::ZERO }),
        AttributeValue::String(s) => Decimal::from_str(s.trim()).ok(),
        AttributeValue::Aliased(aliased) => return to_decimal(name, &aliased.value),
        _ => None,
    };
    converted.ok_or_else(|| mismatch(name, value, "decimal"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{AliasedValue, EntityCollection};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn sample() -> Entity {
        let mut entity = Entity::new("account");
        entity.insert("name", "Contoso");
        entity.insert("numberofemployees", 120);
        entity.insert("revenue", Money::new(dec!(1500.25)));
        entity.insert("industrycode", OptionSetValue::new(7));
        entity.insert("exchangerate", dec!(1.25));
        entity.insert("latitude", 47.64);
        entity.insert_null("fax");
        entity
    }

    #[test]
    fn test_get_value_unwraps_carriers() {
        let mut entity = sample();
        let contact = EntityId::new();
        entity.set_lookup_value("primarycontactid", "contact", contact);
        entity.insert("parent.name", AliasedValue::new("account", "name", "Parent Co"));

        assert_eq!(
            entity.get_value("primarycontactid"),
            Some(AttributeValue::Guid(*contact.as_uuid()))
        );
        assert_eq!(entity.get_value("industrycode"), Some(AttributeValue::Integer(7)));
        assert_eq!(entity.get_value("revenue"), Some(AttributeValue::Decimal(dec!(1500.25))));
        assert_eq!(
            entity.get_value("parent.name"),
            Some(AttributeValue::from("Parent Co"))
        );
        assert_eq!(entity.get_value("numberofemployees"), Some(AttributeValue::Integer(120)));
        assert_eq!(entity.get_value("latitude"), Some(AttributeValue::Double(47.64)));
    }

    #[test]
    fn test_get_value_passes_other_values_through() {
        let mut entity = Entity::new("email");
        let collection = EntityCollection::new("activityparty");
        entity.insert("to", collection.clone());
        entity.insert("flag", true);

        assert_eq!(
            entity.get_value("to"),
            Some(AttributeValue::EntityCollection(collection))
        );
        assert_eq!(entity.get_value("flag"), Some(AttributeValue::Boolean(true)));
    }

    #[test]
    fn test_absent_and_null_yield_defaults() {
        let entity = sample();

        for name in ["missing", "fax"] {
            assert_eq!(entity.get_value(name), None);
            assert_eq!(entity.get_string_value(name), None);
            assert_eq!(entity.get_picklist_value(name), -1);
            assert_eq!(entity.get_date_time_value(name), min_date_time());
            assert!(entity.get_lookup_value(name).is_nil());
            assert_eq!(entity.get_money_value(name).unwrap(), Decimal::ZERO);
            assert_eq!(entity.get_number_value(name).unwrap(), 0);
            assert_eq!(entity.get_float_value(name).unwrap(), 0.0);
            assert_eq!(entity.get_decimal_value(name).unwrap(), Decimal::ZERO);
        }
    }

    #[test]
    fn test_min_date_time_is_year_one() {
        assert_eq!(
            min_date_time(),
            Utc.with_ymd_and_hms(1, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_get_string_value_formats_non_strings() {
        let entity = sample();
        assert_eq!(entity.get_string_value("name").as_deref(), Some("Contoso"));
        assert_eq!(entity.get_string_value("numberofemployees").as_deref(), Some("120"));
        assert_eq!(entity.get_string_value("revenue").as_deref(), Some("1500.25"));
    }

    #[test]
    fn test_picklist_default_on_mismatch() {
        let entity = sample();
        assert_eq!(entity.get_picklist_value_or("industrycode", 99), 7);
        assert_eq!(entity.get_picklist_value_or("missing", 7), 7);
        assert_eq!(entity.get_picklist_value_or("name", 7), 7);
        assert_eq!(entity.get_picklist_value_or("numberofemployees", 9), 9);
    }

    #[test]
    fn test_status_and_state() {
        let mut entity = Entity::new("incident");
        assert_eq!(entity.get_status_value(), -1);
        assert_eq!(entity.get_state_value(), -1);

        entity.set_picklist_value(STATUS_CODE, 5);
        entity.set_picklist_value(STATE_CODE, 1);
        assert_eq!(entity.get_status_value(), 5);
        assert_eq!(entity.get_state_value(), 1);
    }

    #[test]
    fn test_lookup_mismatch_is_nil() {
        let entity = sample();
        assert!(entity.get_lookup_value("name").is_nil());
        assert!(entity.get_reference("name").is_none());
    }

    #[test]
    fn test_numeric_conversions() {
        let mut entity = Entity::new("opportunity");
        entity.insert("probability", 62.5);
        entity.insert("budget", dec!(10.5));
        entity.insert("count", "  42 ");
        entity.insert("big", 5_000_000_000i64);
        entity.insert("done", true);

        assert_eq!(entity.get_number_value("probability").unwrap(), 62);
        assert_eq!(entity.get_number_value("budget").unwrap(), 10);
        assert_eq!(entity.get_number_value("count").unwrap(), 42);
        assert_eq!(entity.get_number_value("done").unwrap(), 1);
        assert_eq!(entity.get_float_value("budget").unwrap(), 10.5);
        assert_eq!(entity.get_decimal_value("count").unwrap(), dec!(42));
        assert_eq!(entity.get_decimal_value("big").unwrap(), dec!(5000000000));
    }

    #[test]
    fn test_numeric_conversion_failures_propagate() {
        let mut entity = sample();
        entity.insert("big", 5_000_000_000i64);

        let overflow = entity.get_number_value("big").unwrap_err();
        assert!(matches!(overflow, EntityError::Conversion { target: "i32", .. }));

        let text = entity.get_float_value("name").unwrap_err();
        assert!(text.to_string().contains("'name'"));

        assert!(entity.get_number_value("industrycode").is_err());
        assert!(entity.get_money_value("exchangerate").is_err());
    }

    #[test]
    fn test_money_through_alias() {
        let mut entity = Entity::new("account");
        entity.insert(
            "parent.revenue",
            AliasedValue::new("account", "revenue", Money::new(dec!(99.99))),
        );
        assert_eq!(entity.get_money_value("parent.revenue").unwrap(), dec!(99.99));
    }

    #[test]
    fn test_setters_wrap_carriers_and_overwrite() {
        let mut entity = Entity::new("account");
        let when = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

        entity.set_string_value("name", "a");
        entity.set_string_value("name", "b");
        entity.set_money_value("revenue", dec!(10));
        entity.set_decimal_value("exchangerate", dec!(1.1));
        entity.set_float_value("latitude", 1.5);
        entity.set_number_value("numberofemployees", 3);
        entity.set_date_time_value("lastusedincampaign", when);

        assert_eq!(entity.len(), 6);
        assert_eq!(entity.get_string_value("name").as_deref(), Some("b"));
        assert_eq!(entity.get("revenue"), Some(&AttributeValue::Money(Money::new(dec!(10)))));
        assert_eq!(entity.get_decimal_value("exchangerate").unwrap(), dec!(1.1));
        assert_eq!(entity.get_float_value("latitude").unwrap(), 1.5);
        assert_eq!(entity.get_number_value("numberofemployees").unwrap(), 3);
        assert_eq!(entity.get_date_time_value("lastusedincampaign"), when);
    }

    #[test]
    fn test_accessors_work_on_bare_collection() {
        let mut attributes = AttributeCollection::new();
        attributes.set_picklist_value("prioritycode", 2);
        assert_eq!(attributes.get_picklist_value("prioritycode"), 2);
    }
}
