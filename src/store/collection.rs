use std::sync::{Arc, RwLock};

use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use super::id::{IdGenerator, IdStrategy};
use crate::error::ResourceError;
use crate::resource::{build_record, merge_patch, Resource};

struct Inner<M> {
    records: RwLock<Vec<M>>,
    ids: IdGenerator,
}

/// Ordered in-memory collection of records of one type.
///
/// Clone-friendly via Arc: clones share the same records.
pub struct Collection<M> {
    inner: Arc<Inner<M>>,
}

impl<M> Clone for Collection<M> {
    fn clone(&self) -> Self {
        Collection {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<M: Resource> Default for Collection<M> {
    fn default() -> Self {
        Self::new(IdStrategy::default())
    }
}

impl<M: Resource> Collection<M> {
    /// Create an empty collection.
    pub fn new(strategy: IdStrategy) -> Self {
        Collection {
            inner: Arc::new(Inner {
                records: RwLock::new(Vec::new()),
                ids: IdGenerator::new(strategy),
            }),
        }
    }

    /// Create a collection holding `records` in the given order.
    ///
    /// Fails with `Conflict` if two seed records share an id.
    pub fn seeded(strategy: IdStrategy, records: Vec<M>) -> Result<Self, ResourceError> {
        let collection = Self::new(strategy);
        for record in records {
            collection.insert(record)?;
        }
        Ok(collection)
    }

    /// Insert a fully formed record, keeping its id and timestamp.
    pub fn insert(&self, record: M) -> Result<(), ResourceError> {
        let mut records = self
            .inner
            .records
            .write()
            .map_err(|_| ResourceError::LockPoisoned("insert"))?;

        if records.iter().any(|r| r.id() == record.id()) {
            return Err(ResourceError::Conflict {
                collection: M::COLLECTION.to_string(),
                id: record.id().to_string(),
            });
        }

        self.inner.ids.observe(record.id());
        records.push(record);
        Ok(())
    }

    /// Snapshot of every record in insertion order.
    pub fn list(&self) -> Result<Vec<M>, ResourceError> {
        let records = self
            .inner
            .records
            .read()
            .map_err(|_| ResourceError::LockPoisoned("list"))?;
        Ok(records.clone())
    }

    pub fn get(&self, id: &str) -> Result<M, ResourceError> {
        let records = self
            .inner
            .records
            .read()
            .map_err(|_| ResourceError::LockPoisoned("get"))?;
        records
            .iter()
            .find(|r| r.id() == id)
            .cloned()
            .ok_or_else(|| ResourceError::not_found(M::COLLECTION, id))
    }

    /// Append a new record built from `fields` with a fresh id and timestamp.
    pub fn create<D: Serialize + ?Sized>(&self, fields: &D) -> Result<M, ResourceError> {
        let mut records = self
            .inner
            .records
            .write()
            .map_err(|_| ResourceError::LockPoisoned("create"))?;

        let id = loop {
            let candidate = self.inner.ids.next_id();
            if !records.iter().any(|r| r.id() == candidate) {
                break candidate;
            }
        };

        let record: M = build_record(&id, Utc::now(), fields)?;
        records.push(record.clone());
        debug!(collection = M::COLLECTION, %id, "record created");
        Ok(record)
    }

    /// Merge `patch` into the record with this id.
    pub fn update<P: Serialize + ?Sized>(&self, id: &str, patch: &P) -> Result<M, ResourceError> {
        let mut records = self
            .inner
            .records
            .write()
            .map_err(|_| ResourceError::LockPoisoned("update"))?;

        let slot = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| ResourceError::not_found(M::COLLECTION, id))?;

        let updated: M = merge_patch(slot, patch)?;
        *slot = updated.clone();
        debug!(collection = M::COLLECTION, %id, "record updated");
        Ok(updated)
    }

    /// Remove the record with this id. Returns true if it existed.
    pub fn remove(&self, id: &str) -> Result<bool, ResourceError> {
        let mut records = self
            .inner
            .records
            .write()
            .map_err(|_| ResourceError::LockPoisoned("remove"))?;

        let before = records.len();
        records.retain(|r| r.id() != id);
        let removed = records.len() != before;
        debug!(collection = M::COLLECTION, %id, removed, "record removed");
        Ok(removed)
    }

    pub fn len(&self) -> Result<usize, ResourceError> {
        let records = self
            .inner
            .records
            .read()
            .map_err(|_| ResourceError::LockPoisoned("len"))?;
        Ok(records.len())
    }

    pub fn is_empty(&self) -> Result<bool, ResourceError> {
        Ok(self.len()? == 0)
    }

    pub fn id_strategy(&self) -> IdStrategy {
        self.inner.ids.strategy()
    }
}
