//! SQLite-backed store - one SQL table per entity type
//!
//! Statements are generated from the entity descriptor and always
//! parameterized. Identifier assignment is delegated to the
//! auto-increment primary key and read back per insert. Batch inserts and
//! deletes run in chunks inside one explicit transaction; any failure rolls
//! the whole batch back, and the connection is back in autocommit before it
//! returns to the pool.

use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};

use crate::config::StoreConfig;
use crate::entity::{Entity, FieldValue, SqlType};
use crate::filter::{self, FilterSet};
use crate::storage::pool::ConnectionPool;
use crate::storage::{RecordStore, sql};
use crate::{Error, Result};

/// SQLite-backed record store behind a bounded connection pool.
pub struct SqliteStore {
    pool: ConnectionPool,
    batch_size: usize,
    max_page_size: u32,
}

impl SqliteStore {
    /// Open a store over the configured database file, creating parent
    /// directories and the connection pool.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        if let Some(parent) = config.database_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let pool = ConnectionPool::new(
            &config.database_path,
            config.initial_pool_size,
            config.max_pool_size,
        )?;
        Ok(Self {
            pool,
            batch_size: config.batch_size.max(1),
            max_page_size: config.max_page_size,
        })
    }

    /// Close the underlying connection pool; the store is unusable after.
    pub fn close(&self) {
        self.pool.close();
    }

    fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
        let mut stmt = conn.prepare(sql::TABLE_EXISTS)?;
        Ok(stmt.exists([name])?)
    }

    fn require_table<E: Entity>(conn: &Connection) -> Result<()> {
        if Self::table_exists(conn, E::TYPE_NAME)? {
            Ok(())
        } else {
            Err(Error::TableNotFound(E::TYPE_NAME.to_string()))
        }
    }

    /// Helper to rebuild an entity from a SELECT row: column 0 is the id,
    /// the remaining columns follow descriptor order.
    fn row_to_entity<E: Entity>(row: &Row) -> rusqlite::Result<E> {
        let mut entity = E::default();
        entity.set_id(Some(row.get(0)?));
        for (index, field) in E::fields().iter().enumerate() {
            let column = index + 1;
            let value = read_field(row, column, field.sql_type)?;
            (field.set)(&mut entity, value).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    column,
                    rusqlite::types::Type::Null,
                    Box::new(e),
                )
            })?;
        }
        Ok(entity)
    }

    fn field_values<E: Entity>(entity: &E) -> Vec<FieldValue> {
        E::fields().iter().map(|f| (f.get)(entity)).collect()
    }
}

/// Typed column read driven by the field's SQL type tag
fn read_field(row: &Row, index: usize, ty: SqlType) -> rusqlite::Result<FieldValue> {
    Ok(match ty {
        SqlType::Int => FieldValue::Int(row.get(index)?),
        SqlType::BigInt => FieldValue::Long(row.get(index)?),
        SqlType::Varchar => FieldValue::Text(row.get(index)?),
        SqlType::Boolean => FieldValue::Bool(row.get(index)?),
        SqlType::Double => FieldValue::Double(row.get(index)?),
        SqlType::Date => FieldValue::Date(row.get(index)?),
    })
}

/// Run `f` inside an explicit transaction, rolling back on any failure.
/// The connection is in autocommit again when this returns.
fn with_transaction<T>(
    conn: &Connection,
    f: impl FnOnce(&Connection) -> Result<T>,
) -> Result<T> {
    conn.execute("BEGIN TRANSACTION", [])?;
    match f(conn) {
        Ok(value) => {
            conn.execute("COMMIT", [])?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback) = conn.execute("ROLLBACK", []) {
                tracing::warn!("rollback failed: {}", rollback);
            }
            Err(e)
        }
    }
}

impl RecordStore for SqliteStore {
    fn create_table<E: Entity>(&self) -> Result<bool> {
        let conn = self.pool.acquire()?;
        conn.execute(&sql::create_table::<E>(), [])
            .map_err(|e| Error::Creation(format!("{}: {}", E::TYPE_NAME, e)))?;
        tracing::debug!("created table {}", E::TYPE_NAME);
        Ok(true)
    }

    fn delete_table<E: Entity>(&self) -> Result<bool> {
        let conn = self.pool.acquire()?;
        Self::require_table::<E>(&conn)?;
        conn.execute(&sql::drop_table::<E>(), [])
            .map_err(|e| Error::Deletion(format!("{}: {}", E::TYPE_NAME, e)))?;
        tracing::debug!("dropped table {}", E::TYPE_NAME);
        Ok(true)
    }

    fn add_record<E: Entity>(&self, mut entity: E) -> Result<E> {
        if entity.id().is_some() {
            return Err(Error::IdProvidedManually(E::TYPE_NAME.to_string()));
        }

        let conn = self.pool.acquire()?;
        Self::require_table::<E>(&conn)?;
        conn.execute(
            &sql::insert::<E>(),
            params_from_iter(Self::field_values(&entity).iter()),
        )?;
        entity.set_id(Some(conn.last_insert_rowid()));
        Ok(entity)
    }

    fn add_records<E: Entity>(&self, mut entities: Vec<E>) -> Result<Vec<E>> {
        if entities.is_empty() {
            return Err(Error::EmptyBatch(format!("no {} records to add", E::TYPE_NAME)));
        }
        if entities.iter().any(|e| e.id().is_some()) {
            return Err(Error::IdProvidedManually(E::TYPE_NAME.to_string()));
        }

        let conn = self.pool.acquire()?;
        Self::require_table::<E>(&conn)?;
        with_transaction(&conn, |conn| {
            let mut stmt = conn.prepare(&sql::insert::<E>())?;
            for chunk in entities.chunks_mut(self.batch_size) {
                for entity in chunk.iter_mut() {
                    stmt.execute(params_from_iter(Self::field_values(entity).iter()))?;
                    entity.set_id(Some(conn.last_insert_rowid()));
                }
                tracing::debug!("inserted {} {} records", chunk.len(), E::TYPE_NAME);
            }
            Ok(())
        })?;
        Ok(entities)
    }

    fn update_record<E: Entity>(&self, entity: &E, id: i64) -> Result<E> {
        let conn = self.pool.acquire()?;
        let mut values = Self::field_values(entity);
        values.push(FieldValue::Long(id));
        let affected = conn.execute(&sql::update::<E>(), params_from_iter(values.iter()))?;
        if affected == 0 {
            return Err(Error::IdNotFound { table: E::TYPE_NAME.to_string(), id });
        }

        let mut updated = entity.clone();
        updated.set_id(Some(id));
        Ok(updated)
    }

    fn remove_record<E: Entity>(&self, id: i64) -> Result<bool> {
        let conn = self.pool.acquire()?;
        let affected = conn.execute(&sql::delete_by_id::<E>(), params![id])?;
        Ok(affected > 0)
    }

    fn remove_records<E: Entity>(&self, ids: &[i64]) -> Result<bool> {
        if ids.is_empty() {
            return Err(Error::EmptyBatch(format!("no {} ids to remove", E::TYPE_NAME)));
        }

        let conn = self.pool.acquire()?;
        Self::require_table::<E>(&conn)?;
        let affected = with_transaction(&conn, |conn| {
            let mut affected = 0;
            for chunk in ids.chunks(self.batch_size) {
                affected +=
                    conn.execute(&sql::delete_by_ids::<E>(chunk.len()), params_from_iter(chunk))?;
            }
            Ok(affected)
        })?;
        Ok(affected > 0)
    }

    fn remove_all_records<E: Entity>(&self) -> Result<()> {
        let conn = self.pool.acquire()?;
        conn.execute(&sql::delete_all::<E>(), [])?;
        Ok(())
    }

    fn get_by_id<E: Entity>(&self, id: i64) -> Result<Option<E>> {
        let conn = self.pool.acquire()?;
        conn.query_row(&sql::select_by_id::<E>(), params![id], Self::row_to_entity::<E>)
            .optional()
            .map_err(Into::into)
    }

    fn get_all_records<E: Entity>(&self, limit: u32, offset: u32) -> Result<Vec<E>> {
        if limit == 0 || limit > self.max_page_size {
            return Err(Error::InvalidParameter(format!(
                "limit must be in 1..={}, got {}",
                self.max_page_size, limit
            )));
        }

        let conn = self.pool.acquire()?;
        let mut stmt = conn.prepare(&sql::select_page::<E>())?;
        let records = stmt
            .query_map(params![limit, offset], Self::row_to_entity::<E>)?
            .collect::<rusqlite::Result<Vec<E>>>()?;
        Ok(records)
    }

    fn get_by_filters<E: Entity>(&self, filters: &FilterSet) -> Result<Vec<E>> {
        filter::validate::<E>(filters)?;

        // Parse accepted values through each field's type tag; a property
        // whose values all fail to parse can never match anything.
        let mut clauses: Vec<(&str, Vec<FieldValue>)> = Vec::new();
        for (name, values) in filters {
            let field = E::fields()
                .iter()
                .find(|f| f.name == name.as_str())
                .ok_or_else(|| Error::UnknownProperty {
                    entity: E::TYPE_NAME.to_string(),
                    property: name.clone(),
                })?;
            let parsed: Vec<FieldValue> = values
                .iter()
                .filter_map(|v| FieldValue::parse(v, field.sql_type))
                .collect();
            if parsed.is_empty() {
                return Ok(Vec::new());
            }
            clauses.push((field.name, parsed));
        }

        let shape: Vec<(&str, usize)> =
            clauses.iter().map(|(name, values)| (*name, values.len())).collect();
        let bound: Vec<&FieldValue> =
            clauses.iter().flat_map(|(_, values)| values.iter()).collect();

        let conn = self.pool.acquire()?;
        let mut stmt = conn.prepare(&sql::select_by_filters::<E>(&shape))?;
        let records = stmt
            .query_map(params_from_iter(bound), Self::row_to_entity::<E>)?
            .collect::<rusqlite::Result<Vec<E>>>()?;
        Ok(records)
    }
}
