//! # Recordstore - Generic Entity Persistence Engine
//!
//! Storage-agnostic CRUD service for typed records.
//!
//! Recordstore provides:
//! - Compile-time entity descriptors (field names, SQL types, accessors)
//! - A common persistence contract with two interchangeable backends
//! - JSON-file-backed storage (one array file per entity type)
//! - SQLite-backed storage with a bounded connection pool
//! - Filter validation, pagination, and transactional batch writes

pub mod allocator;
pub mod config;
pub mod entity;
pub mod filter;
pub mod storage;

#[cfg(test)]
pub(crate) mod testutil;

// Re-exports for convenient access
pub use allocator::IdAllocator;
pub use config::StoreConfig;
pub use entity::{Entity, FieldSpec, FieldValue, SqlType};
pub use filter::FilterSet;
pub use storage::{JsonStore, RecordStore, SqliteStore};

/// Result type alias for recordstore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for recordstore operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Table/file already exists or cannot be created
    #[error("Cannot create table: {0}")]
    Creation(String),

    /// Operation targets a non-existent table/file
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// Table/file could not be removed
    #[error("Cannot delete table: {0}")]
    Deletion(String),

    /// Record collection could not be serialized to JSON
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Stored JSON could not be deserialized into records
    #[error("Deserialize error: {0}")]
    Deserialize(#[source] serde_json::Error),

    /// Caller supplied an id on a create path
    #[error("Id must not be provided manually for {0}")]
    IdProvidedManually(String),

    /// Update/lookup targeted a non-existent id
    #[error("No record with id {id} in table {table}")]
    IdNotFound { table: String, id: i64 },

    /// Limit/offset outside allowed bounds
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Empty batch input where a non-empty list is required
    #[error("Empty batch: {0}")]
    EmptyBatch(String),

    /// Filter name or value list is blank or empty
    #[error("Empty filter: {0}")]
    EmptyFilter(String),

    /// Filter property does not exist on the entity descriptor
    #[error("Unknown property '{property}' on {entity}")]
    UnknownProperty { entity: String, property: String },

    /// Pool exhausted or closed
    #[error("No free database connection: {0}")]
    NoFreeConnection(String),

    /// Field descriptor accessor/mutator failure (programming/schema error)
    #[error("Field access error: {0}")]
    FieldAccess(String),

    /// Underlying SQL driver failure
    #[error("Sql error: {0}")]
    Sql(#[from] rusqlite::Error),

    /// Underlying IO failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
