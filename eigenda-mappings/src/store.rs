//! The entity persistence boundary.
//!
//! The store is constructor-injected into every projector call rather than
//! reached through process-global state, so each test can run against its
//! own isolated [`MemoryStore`]. Records are stored as JSON under a
//! `(kind, id)` key; each save is atomic and durable from the projector's
//! perspective, with no cross-save transactions.

use std::collections::HashMap;

use crate::entities::{Entity, EntityKind};
use crate::error::{MappingError, StoreError};

/// Key-value persistence for projected entities.
pub trait EntityStore {
    /// Load the raw record bytes for `(kind, id)`, if present.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing store cannot be read.
    fn load_raw(&self, kind: EntityKind, id: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    /// Persist the raw record bytes for `(kind, id)`, overwriting any
    /// previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing store cannot be written.
    fn save_raw(&mut self, kind: EntityKind, id: &[u8], bytes: Vec<u8>) -> Result<(), StoreError>;

    /// Load a typed entity by id.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::Store`] on a backing-store failure and
    /// [`MappingError::Codec`] for an undecodable record.
    fn load<E: Entity>(&self, id: &[u8]) -> Result<Option<E>, MappingError>
    where
        Self: Sized,
    {
        match self.load_raw(E::KIND, id)? {
            None => Ok(None),
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        }
    }

    /// Persist a typed entity under its own id.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::Store`] on a backing-store failure and
    /// [`MappingError::Codec`] for an unencodable record.
    fn save<E: Entity>(&mut self, entity: &E) -> Result<(), MappingError>
    where
        Self: Sized,
    {
        let bytes = serde_json::to_vec(entity)?;
        Ok(self.save_raw(E::KIND, entity.id(), bytes)?)
    }

    /// Load-or-create followed by mutate-and-save, as a single helper.
    ///
    /// If no record exists under `id`, `default` constructs a fresh one
    /// with safe defaults; `mutate` is then applied and the result saved.
    /// Fields the mutation does not touch survive from the loaded record —
    /// this is an upsert, not a blind overwrite.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError`] on a backing-store or codec failure.
    fn upsert<E: Entity>(
        &mut self,
        id: &[u8],
        default: impl FnOnce() -> E,
        mutate: impl FnOnce(&mut E),
    ) -> Result<E, MappingError>
    where
        Self: Sized,
    {
        let mut entity = self.load::<E>(id)?.unwrap_or_else(default);
        mutate(&mut entity);
        self.save(&entity)?;
        Ok(entity)
    }
}

/// In-memory [`EntityStore`], the reference implementation used by tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: HashMap<(EntityKind, Vec<u8>), Vec<u8>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records of the given kind.
    #[must_use]
    pub fn count(&self, kind: EntityKind) -> usize {
        self.records.keys().filter(|(k, _)| *k == kind).count()
    }

    /// Total number of records across all kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl EntityStore for MemoryStore {
    fn load_raw(&self, kind: EntityKind, id: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.records.get(&(kind, id.to_vec())).cloned())
    }

    fn save_raw(&mut self, kind: EntityKind, id: &[u8], bytes: Vec<u8>) -> Result<(), StoreError> {
        self.records.insert((kind, id.to_vec()), bytes);
        Ok(())
    }
}
