//! Organization Service Port
//!
//! The organization service is the platform's record store. This crate never
//! talks to it directly; hosts hand in an implementation of
//! [`OrganizationService`] and the toolkit layers convenience calls on top
//! through [`OrganizationServiceExt`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_service::{OrganizationService, OrganizationServiceExt};
//! use std::sync::Arc;
//!
//! pub struct FollowUp {
//!     service: Arc<dyn OrganizationService>,
//! }
//!
//! impl FollowUp {
//!     pub async fn customer_of(&self, order: &Entity) -> Result<Option<Entity>, PortError> {
//!         self.service.retrieve_referenced(order, "customerid").await
//!     }
//! }
//! ```

use async_trait::async_trait;
use tracing::{debug, instrument};

use core_kernel::{DomainPort, EntityId, PortError};
use domain_entity::{AttributeAccess, Entity, EntityReference};

/// Attributes to return from a retrieve
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ColumnSet {
    /// Every attribute of the record
    #[default]
    All,
    /// Only the named attributes
    Columns(Vec<String>),
}

impl ColumnSet {
    /// Builds a column set from names; an empty list means every column
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        if names.is_empty() {
            ColumnSet::All
        } else {
            ColumnSet::Columns(names.iter().map(|n| n.as_ref().to_string()).collect())
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, ColumnSet::All)
    }

    /// True if the column set returns `name`
    pub fn includes(&self, name: &str) -> bool {
        match self {
            ColumnSet::All => true,
            ColumnSet::Columns(columns) => columns.iter().any(|c| c == name),
        }
    }
}

/// Calls the toolkit needs from the platform's record store
///
/// Implementations perform the actual I/O. Errors are passed through the
/// extension methods unchanged.
#[async_trait]
pub trait OrganizationService: DomainPort {
    /// Creates a record
    ///
    /// # Returns
    ///
    /// The id assigned to the new record
    async fn create(&self, entity: &Entity) -> Result<EntityId, PortError>;

    /// Retrieves a record by logical name and id
    ///
    /// # Returns
    ///
    /// The record with the requested columns, or `PortError::NotFound`
    async fn retrieve(
        &self,
        logical_name: &str,
        id: EntityId,
        columns: &ColumnSet,
    ) -> Result<Entity, PortError>;
}

/// Extension trait for OrganizationService with convenience methods
#[async_trait]
pub trait OrganizationServiceExt: OrganizationService {
    /// Creates the record unless there is nothing to create
    ///
    /// Returns the nil id without calling the service when `entity` is `None`
    /// or has no attributes.
    #[instrument(skip_all)]
    async fn create_entity(&self, entity: Option<&Entity>) -> Result<EntityId, PortError> {
        match entity {
            Some(entity) if !entity.is_empty() => {
                let id = self.create(entity).await?;
                debug!(entity = %entity.logical_name, %id, "created record");
                Ok(id)
            }
            _ => {
                debug!("no attributes to create, skipping service call");
                Ok(EntityId::nil())
            }
        }
    }

    /// Retrieves every column of a record
    async fn retrieve_all(&self, logical_name: &str, id: EntityId) -> Result<Entity, PortError> {
        self.retrieve(logical_name, id, &ColumnSet::All).await
    }

    /// Retrieves every column of the referenced record
    async fn retrieve_reference(&self, reference: &EntityReference) -> Result<Entity, PortError> {
        self.retrieve_all(&reference.logical_name, reference.id).await
    }

    /// Follows a lookup attribute of `source`
    ///
    /// Returns `None` when the attribute is absent, null, or not a reference.
    #[instrument(skip(self, source), fields(entity = %source.logical_name))]
    async fn retrieve_referenced(
        &self,
        source: &Entity,
        attribute: &str,
    ) -> Result<Option<Entity>, PortError> {
        match source.get_reference(attribute) {
            Some(reference) => self.retrieve_reference(reference).await.map(Some),
            None => {
                debug!("attribute is not a reference");
                Ok(None)
            }
        }
    }

    /// Retrieves the named columns of a record; an empty list means all
    async fn retrieve_columns<S>(
        &self,
        logical_name: &str,
        id: EntityId,
        columns: &[S],
    ) -> Result<Entity, PortError>
    where
        S: AsRef<str> + Sync,
    {
        let columns = ColumnSet::from_names(columns);
        self.retrieve(logical_name, id, &columns).await
    }
}

// Blanket implementation for all OrganizationService implementors
impl<T: OrganizationService + ?Sized> OrganizationServiceExt for T {}

/// Mock implementation of OrganizationService for testing
///
/// Records live in memory keyed by logical name and id.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::RwLock;

    /// In-memory mock implementation of OrganizationService
    #[derive(Debug, Default)]
    pub struct MockOrganizationService {
        records: RwLock<HashMap<(String, EntityId), Entity>>,
        last_columns: RwLock<Option<ColumnSet>>,
        create_calls: AtomicUsize,
        retrieve_calls: AtomicUsize,
    }

    impl MockOrganizationService {
        /// Creates an empty mock service
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with records for testing
        pub async fn with_records(records: Vec<Entity>) -> Self {
            let service = Self::new();
            {
                let mut store = service.records.write().await;
                for record in records {
                    store.insert((record.logical_name.clone(), record.id), record);
                }
            }
            service
        }

        /// Number of `create` calls received
        pub fn create_calls(&self) -> usize {
            self.create_calls.load(Ordering::SeqCst)
        }

        /// Number of `retrieve` calls received
        pub fn retrieve_calls(&self) -> usize {
            self.retrieve_calls.load(Ordering::SeqCst)
        }

        /// Column set of the most recent `retrieve`
        pub async fn last_columns(&self) -> Option<ColumnSet> {
            self.last_columns.read().await.clone()
        }

        /// Stored record, all columns
        pub async fn stored(&self, logical_name: &str, id: EntityId) -> Option<Entity> {
            self.records
                .read()
                .await
                .get(&(logical_name.to_string(), id))
                .cloned()
        }
    }

    impl DomainPort for MockOrganizationService {}

    #[async_trait]
    impl OrganizationService for MockOrganizationService {
        async fn create(&self, entity: &Entity) -> Result<EntityId, PortError> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);

            if entity.logical_name.is_empty() {
                return Err(PortError::validation_field(
                    "Logical name is required",
                    "logical_name",
                ));
            }

            let id = if entity.id.is_nil() {
                EntityId::new_v7()
            } else {
                entity.id
            };
            let key = (entity.logical_name.clone(), id);

            let mut records = self.records.write().await;
            if records.contains_key(&key) {
                return Err(PortError::validation(format!(
                    "Duplicate {} record {}",
                    entity.logical_name, id
                )));
            }

            let mut stored = entity.clone();
            stored.id = id;
            let primary_key = stored.primary_key_name();
            stored.insert(primary_key, *id.as_uuid());
            records.insert(key, stored);

            Ok(id)
        }

        async fn retrieve(
            &self,
            logical_name: &str,
            id: EntityId,
            columns: &ColumnSet,
        ) -> Result<Entity, PortError> {
            self.retrieve_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_columns.write().await = Some(columns.clone());

            let records = self.records.read().await;
            let stored = records
                .get(&(logical_name.to_string(), id))
                .ok_or_else(|| PortError::not_found(logical_name, id))?;

            let mut result = Entity::with_id(stored.logical_name.clone(), stored.id);
            for (name, slot) in stored.iter() {
                if columns.includes(name) {
                    result.insert_optional(name, slot.cloned());
                }
            }
            Ok(result)
        }
    }
}
