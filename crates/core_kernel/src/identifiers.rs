//! Strongly-typed record identifiers
//!
//! The organization service identifies every record by a UUID. An all-zero
//! UUID is the platform's "empty" identifier: it is what a freshly built
//! record carries before creation and what lookups return when nothing is
//! referenced.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of a record in the organization service
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(Uuid);

impl EntityId {
    /// Creates a new random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a new time-ordered identifier (v7)
    pub fn new_v7() -> Self {
        Self(Uuid::now_v7())
    }

    /// The empty identifier
    pub const fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// Creates from an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Returns true for the empty identifier
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

/// Defaults to the empty identifier, matching a record that has not been created yet.
impl Default for EntityId {
    fn default() -> Self {
        Self::nil()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The platform writes identifiers with or without braces
        let trimmed = s.trim().trim_start_matches('{').trim_end_matches('}');
        Ok(Self(Uuid::parse_str(trimmed)?))
    }
}

impl From<Uuid> for EntityId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<EntityId> for Uuid {
    fn from(id: EntityId) -> Uuid {
        id.0
    }
}
