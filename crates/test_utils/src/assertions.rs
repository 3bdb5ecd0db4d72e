//! Custom Test Assertions
//!
//! Provides assertion helpers for records that name the offending attribute
//! in their failure messages.

use domain_entity::{AttributeState, AttributeValue, Entity};
use rust_decimal::Decimal;

/// Asserts that the record has no attribute with this name
pub fn assert_attribute_absent(entity: &Entity, name: &str) {
    assert!(
        !entity.contains(name),
        "Expected {} to have no '{}' attribute, found {:?}",
        entity.logical_name,
        name,
        entity.state(name)
    );
}

/// Asserts that the attribute is present and null
pub fn assert_attribute_null(entity: &Entity, name: &str) {
    assert_eq!(
        entity.state(name),
        AttributeState::Null,
        "Expected {}.{} to be null",
        entity.logical_name,
        name
    );
}

/// Asserts that the attribute holds exactly `expected`
pub fn assert_attribute_eq(entity: &Entity, name: &str, expected: impl Into<AttributeValue>) {
    let expected = expected.into();
    assert_eq!(
        entity.get(name),
        Some(&expected),
        "Attribute {}.{} mismatch",
        entity.logical_name,
        name
    );
}

/// Asserts that a decimal is within a tolerance of the expected value
pub fn assert_decimal_approx_eq(actual: Decimal, expected: Decimal, tolerance: Decimal) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "Decimals differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual,
        expected,
        diff,
        tolerance
    );
}

/// Asserts that a copy carries the source's type, a nil id, and none of the
/// listed attributes
pub fn assert_fresh_copy(source: &Entity, copy: &Entity, excluded: &[&str]) {
    assert_eq!(copy.logical_name, source.logical_name, "Logical name changed in copy");
    assert!(copy.id.is_nil(), "Copy of {} kept id {}", source.logical_name, copy.id);
    for name in excluded {
        assert_attribute_absent(copy, name);
    }
}

/// Asserts that every nested record in `collection` lacks the listed attributes
pub fn assert_children_stripped(entity: &Entity, collection: &str, excluded: &[&str]) {
    let children = entity
        .get(collection)
        .and_then(AttributeValue::as_entity_collection)
        .unwrap_or_else(|| panic!("{}.{} is not a collection", entity.logical_name, collection));

    for child in &children.entities {
        for name in excluded {
            assert_attribute_absent(child, name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_attribute_assertions() {
        let mut entity = Entity::new("account");
        entity.insert("name", "Contoso");
        entity.insert_null("fax");

        assert_attribute_eq(&entity, "name", "Contoso");
        assert_attribute_null(&entity, "fax");
        assert_attribute_absent(&entity, "telephone1");
    }

    #[test]
    #[should_panic(expected = "mismatch")]
    fn test_attribute_eq_fails() {
        let mut entity = Entity::new("account");
        entity.insert("name", "Contoso");
        assert_attribute_eq(&entity, "name", "Fabrikam");
    }

    #[test]
    fn test_decimal_approx_eq() {
        assert_decimal_approx_eq(dec!(100.001), dec!(100.00), dec!(0.01));
    }

    #[test]
    #[should_panic]
    fn test_decimal_approx_eq_fails() {
        assert_decimal_approx_eq(dec!(101.00), dec!(100.00), dec!(0.01));
    }
}
