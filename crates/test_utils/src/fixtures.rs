//! Pre-built Test Fixtures
//!
//! Provides ready-to-use records for the entity types the toolkit treats
//! specially. Ids are fresh on every call; everything else is predictable.

use chrono::{DateTime, TimeZone, Utc};
use core_kernel::EntityId;
use domain_entity::Entity;
use rust_decimal_macros::dec;

use crate::builders::EntityBuilder;

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Record creation timestamp (Jan 15, 2024 09:30 UTC)
    pub fn created_on() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap()
    }

    /// Scheduled activity start (Mar 1, 2024 14:00 UTC)
    pub fn scheduled_start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 14, 0, 0).unwrap()
    }
}

/// Fixture for common records
pub struct EntityFixtures;

impl EntityFixtures {
    /// An account with one of every common scalar kind and a null
    pub fn account() -> Entity {
        EntityBuilder::new("account")
            .with_generated_id()
            .with_string("name", "Contoso Ltd")
            .with_string("telephone1", "555-0100")
            .with_option("industrycode", 7)
            .with_option("statuscode", 1)
            .with_option("statecode", 0)
            .with_money("revenue", dec!(2500000.00))
            .with("numberofemployees", 320)
            .with("exchangerate", dec!(1.0000))
            .with("donotemail", true)
            .with_date("createdon", TemporalFixtures::created_on())
            .with_null("fax")
            .build()
    }

    /// A contact linked to `account`
    pub fn contact(account: &Entity) -> Entity {
        EntityBuilder::new("contact")
            .with_generated_id()
            .with_string("firstname", "Jane")
            .with_string("lastname", "Doe")
            .with_lookup("parentcustomerid", &account.logical_name, account.id)
            .build()
    }

    /// An activity party pointing at `party`, already attached to an activity
    pub fn activity_party(activity_id: EntityId, party: &Entity) -> Entity {
        EntityBuilder::new("activityparty")
            .with_generated_id()
            .with_lookup("activityid", "email", activity_id)
            .with_lookup("partyid", &party.logical_name, party.id)
            .with_option("participationtypemask", 2)
            .build()
    }

    /// An email activity with sender and recipient parties
    pub fn email(from: &Entity, to: &[Entity]) -> Entity {
        let activity_id = EntityId::new();
        let recipients = to
            .iter()
            .map(|party| Self::activity_party(activity_id, party))
            .collect();

        EntityBuilder::new("email")
            .with_id(activity_id)
            .with("activityid", *activity_id.as_uuid())
            .with("emailid", *activity_id.as_uuid())
            .with_string("activitytypecode", "email")
            .with_string("subject", "Renewal <draft> & notes")
            .with_date("scheduledstart", TemporalFixtures::scheduled_start())
            .with_children(
                "from",
                "activityparty",
                vec![Self::activity_party(activity_id, from)],
            )
            .with_children("to", "activityparty", recipients)
            .with_aliased("regarding.name", "account", "name", "Contoso Ltd")
            .build()
    }
}
