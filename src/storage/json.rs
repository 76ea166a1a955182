//! File-backed store - one JSON array file per entity type
//!
//! Every operation reads the whole collection, mutates it in memory, and
//! rewrites the file. O(n) per write, with a single logical writer assumed
//! per table: concurrent writers can race on the read-modify-write cycle.
//! Identifiers come from a store-owned allocator seeded from the stored
//! maximum.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::allocator::IdAllocator;
use crate::config::StoreConfig;
use crate::entity::Entity;
use crate::filter::{self, FilterSet};
use crate::storage::RecordStore;
use crate::{Error, Result};

/// JSON-file-backed record store.
///
/// Table files are named `<TypeName>Table.json` under the configured
/// storage root.
pub struct JsonStore {
    root: PathBuf,
    max_page_size: u32,
    allocator: IdAllocator,
}

impl JsonStore {
    /// Open a store over the configured storage root, creating the
    /// directory if needed.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        fs::create_dir_all(&config.storage_root)?;
        Ok(Self {
            root: config.storage_root.clone(),
            max_page_size: config.max_page_size,
            allocator: IdAllocator::new(),
        })
    }

    fn table_path<E: Entity>(&self) -> PathBuf {
        self.root.join(format!("{}Table.json", E::TYPE_NAME))
    }

    fn read_all<E: Entity>(&self) -> Result<Vec<E>> {
        let path = self.table_path::<E>();
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::TableNotFound(E::TYPE_NAME.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&contents).map_err(Error::Deserialize)
    }

    fn write_all<E: Entity>(&self, records: &[E]) -> Result<()> {
        let contents = serde_json::to_string_pretty(records).map_err(Error::Serialize)?;
        fs::write(self.table_path::<E>(), contents)?;
        Ok(())
    }
}

fn stored_max<E: Entity>(records: &[E]) -> i64 {
    records.iter().filter_map(Entity::id).max().unwrap_or(-1)
}

impl RecordStore for JsonStore {
    fn create_table<E: Entity>(&self) -> Result<bool> {
        let path = self.table_path::<E>();
        if path.exists() {
            return Err(Error::Creation(format!("{} already exists", path.display())));
        }
        fs::write(&path, "[]")
            .map_err(|e| Error::Creation(format!("{}: {}", path.display(), e)))?;
        tracing::debug!("created table file {}", path.display());
        Ok(true)
    }

    fn delete_table<E: Entity>(&self) -> Result<bool> {
        let path = self.table_path::<E>();
        if !path.exists() {
            return Err(Error::TableNotFound(E::TYPE_NAME.to_string()));
        }
        fs::remove_file(&path)
            .map_err(|e| Error::Deletion(format!("{}: {}", path.display(), e)))?;
        self.allocator.reset(E::TYPE_NAME);
        tracing::debug!("deleted table file {}", path.display());
        Ok(true)
    }

    fn add_record<E: Entity>(&self, mut entity: E) -> Result<E> {
        if entity.id().is_some() {
            return Err(Error::IdProvidedManually(E::TYPE_NAME.to_string()));
        }

        let mut records = self.read_all::<E>()?;
        let id = self.allocator.next_id(E::TYPE_NAME, || stored_max(&records));
        entity.set_id(Some(id));
        records.push(entity.clone());
        self.write_all(&records)?;
        Ok(entity)
    }

    fn add_records<E: Entity>(&self, mut entities: Vec<E>) -> Result<Vec<E>> {
        if entities.is_empty() {
            return Err(Error::EmptyBatch(format!("no {} records to add", E::TYPE_NAME)));
        }
        if entities.iter().any(|e| e.id().is_some()) {
            return Err(Error::IdProvidedManually(E::TYPE_NAME.to_string()));
        }

        let mut records = self.read_all::<E>()?;
        for entity in &mut entities {
            let id = self.allocator.next_id(E::TYPE_NAME, || stored_max(&records));
            entity.set_id(Some(id));
            records.push(entity.clone());
        }
        self.write_all(&records)?;
        Ok(entities)
    }

    fn update_record<E: Entity>(&self, entity: &E, id: i64) -> Result<E> {
        let mut records = self.read_all::<E>()?;
        let target = records
            .iter_mut()
            .find(|r| r.id() == Some(id))
            .ok_or_else(|| Error::IdNotFound { table: E::TYPE_NAME.to_string(), id })?;

        // Field values are copied through the descriptor; the stored id is
        // untouched.
        for field in E::fields() {
            (field.set)(target, (field.get)(entity))?;
        }
        let updated = target.clone();
        self.write_all(&records)?;
        Ok(updated)
    }

    fn remove_record<E: Entity>(&self, id: i64) -> Result<bool> {
        let mut records = self.read_all::<E>()?;
        let before = records.len();
        records.retain(|r| r.id() != Some(id));
        let changed = records.len() != before;
        if changed {
            self.write_all(&records)?;
        }
        Ok(changed)
    }

    fn remove_records<E: Entity>(&self, ids: &[i64]) -> Result<bool> {
        if ids.is_empty() {
            return Err(Error::EmptyBatch(format!("no {} ids to remove", E::TYPE_NAME)));
        }

        let mut records = self.read_all::<E>()?;
        let before = records.len();
        records.retain(|r| !r.id().is_some_and(|id| ids.contains(&id)));
        let changed = records.len() != before;
        if changed {
            self.write_all(&records)?;
        }
        Ok(changed)
    }

    fn remove_all_records<E: Entity>(&self) -> Result<()> {
        if !self.table_path::<E>().exists() {
            return Err(Error::TableNotFound(E::TYPE_NAME.to_string()));
        }
        self.write_all::<E>(&[])
    }

    fn get_by_id<E: Entity>(&self, id: i64) -> Result<Option<E>> {
        let records = self.read_all::<E>()?;
        Ok(records.into_iter().find(|r| r.id() == Some(id)))
    }

    fn get_all_records<E: Entity>(&self, limit: u32, offset: u32) -> Result<Vec<E>> {
        if limit == 0 || limit > self.max_page_size {
            return Err(Error::InvalidParameter(format!(
                "limit must be in 1..={}, got {}",
                self.max_page_size, limit
            )));
        }

        let records = self.read_all::<E>()?;
        Ok(records
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    fn get_by_filters<E: Entity>(&self, filters: &FilterSet) -> Result<Vec<E>> {
        filter::validate::<E>(filters)?;
        let records = self.read_all::<E>()?;
        Ok(records.into_iter().filter(|r| filter::matches(r, filters)).collect())
    }
}
