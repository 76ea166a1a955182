//! Storage Layer - interchangeable persistence backends
//!
//! Two implementations of one persistence contract:
//! - `JsonStore`: one JSON array file per entity type under a storage root
//! - `SqliteStore`: one SQL table per entity type behind a bounded
//!   connection pool, with transactional batch writes
//!
//! Callers pick a backend at construction time; everything downstream goes
//! through [`RecordStore`].

pub mod json;
pub mod pool;
pub mod sql;
pub mod sqlite;

pub use json::JsonStore;
pub use pool::{ConnectionPool, PooledConnection};
pub use sqlite::SqliteStore;

use crate::Result;
use crate::entity::Entity;
use crate::filter::FilterSet;

/// The persistence contract consumed by the request-handling layer.
///
/// Every operation resolves the physical location from the entity type's
/// name, performs the operation, and returns typed results or a typed
/// failure. Only `get_by_id` treats absence as a non-error.
pub trait RecordStore {
    /// Create the physical table/file for `E`; errors if it already exists
    fn create_table<E: Entity>(&self) -> Result<bool>;

    /// Destroy the physical table/file for `E` and reset its id sequence
    fn delete_table<E: Entity>(&self) -> Result<bool>;

    /// Persist one record, assigning its identifier
    fn add_record<E: Entity>(&self, entity: E) -> Result<E>;

    /// Persist a batch of records; all-or-nothing where the backend allows
    fn add_records<E: Entity>(&self, entities: Vec<E>) -> Result<Vec<E>>;

    /// Overwrite the fields of the record with `id` from `entity`
    fn update_record<E: Entity>(&self, entity: &E, id: i64) -> Result<E>;

    /// Remove one record; true when something was removed
    fn remove_record<E: Entity>(&self, id: i64) -> Result<bool>;

    /// Remove several records; true when anything was removed
    fn remove_records<E: Entity>(&self, ids: &[i64]) -> Result<bool>;

    /// Remove every record, keeping the table itself
    fn remove_all_records<E: Entity>(&self) -> Result<()>;

    /// Fetch one record, `None` when absent
    fn get_by_id<E: Entity>(&self, id: i64) -> Result<Option<E>>;

    /// Fetch a window of records in insertion order;
    /// `limit` must be in `1..=max_page_size`
    fn get_all_records<E: Entity>(&self, limit: u32, offset: u32) -> Result<Vec<E>>;

    /// Fetch the records satisfying every constraint in the filter set
    fn get_by_filters<E: Entity>(&self, filters: &FilterSet) -> Result<Vec<E>>;
}
