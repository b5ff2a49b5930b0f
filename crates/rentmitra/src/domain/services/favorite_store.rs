use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;

use crate::domain::{
    entities::favorite::{FavoriteId, FavoriteSet},
    repositories::storage::Storage,
};

pub const FAVORITES_KEY: &str = "favoriteProductIds";

/// Client-side view of the favorited items, mirrored to [`Storage`].
///
/// The store is the only writer of [`FAVORITES_KEY`]. Persisting failures
/// are logged and otherwise ignored; the in-memory set stays authoritative.
pub struct FavoriteStore {
    storage: Arc<dyn Storage>,
    ids: RwLock<FavoriteSet>,
}

impl FavoriteStore {
    /// Opens the store with whatever was persisted by a previous session.
    pub fn open(storage: Arc<dyn Storage>) -> Self {
        let ids = Self::read(storage.as_ref());
        debug!("loaded {} favorites from storage", ids.len());

        Self {
            storage,
            ids: RwLock::new(ids),
        }
    }

    /// Reads the persisted set. Missing or malformed data is the empty set.
    pub fn load(&self) -> FavoriteSet {
        Self::read(self.storage.as_ref())
    }

    fn read(storage: &dyn Storage) -> FavoriteSet {
        match storage.get_item(FAVORITES_KEY) {
            Ok(Some(raw)) => FavoriteSet::from_json(&raw),
            Ok(None) => FavoriteSet::new(),
            Err(e) => {
                warn!("failed to read favorites: {}", e);
                FavoriteSet::new()
            }
        }
    }

    pub fn replace<I>(&self, ids: I)
    where
        I: IntoIterator<Item = FavoriteId>,
    {
        let ids: FavoriteSet = ids.into_iter().collect();
        self.update(|current| *current = ids);
    }

    pub fn clear(&self) {
        self.update(|current| *current = FavoriteSet::new());
    }

    /// Applies `f` to the set and persists the result while holding the
    /// write lock, so concurrent updates are never lost.
    pub fn update<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&mut FavoriteSet) -> T,
    {
        let mut ids = self.ids.write().unwrap_or_else(PoisonError::into_inner);
        let result = f(&mut *ids);
        self.persist(&*ids);
        result
    }

    fn persist(&self, ids: &FavoriteSet) {
        if let Err(e) = self.storage.set_item(FAVORITES_KEY, &ids.to_json()) {
            warn!("failed to persist favorites: {}", e);
        }
    }

    pub fn contains(&self, id: FavoriteId) -> bool {
        self.ids
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }

    /// Membership test for ids of unknown shape; values that do not coerce
    /// to an id are never members.
    pub fn contains_value(&self, id: &Value) -> bool {
        FavoriteId::from_value(id).is_some_and(|id| self.contains(id))
    }

    pub fn snapshot_ids(&self) -> Vec<FavoriteId> {
        self.ids.read().unwrap_or_else(PoisonError::into_inner).ids()
    }

    pub fn len(&self) -> usize {
        self.ids.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
