use std::{
    collections::HashSet,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};

use tokio::sync::broadcast;

use crate::{
    domain::{
        entities::favorite::FavoriteId,
        repositories::{favorites::FavoritesRepository, storage::Storage},
        services::{auth::read_token, favorite_store::FavoriteStore},
    },
    notifier::Notifier,
};

pub const LOGIN_REQUIRED_MESSAGE: &str = "Please login to add favorites";
pub const UPDATE_FAILED_MESSAGE: &str = "Could not update favorites";

pub type FavoritesEventReceiver = broadcast::Receiver<FavoritesEvent>;
pub type FavoritesEventSender = broadcast::Sender<FavoritesEvent>;

/// Published whenever a favorites change is committed, so views holding
/// cached item lists know to reload them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoritesEvent {
    Updated { id: FavoriteId, favorited: bool },
    Refreshed,
    Cleared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// The remote call failed and the optimistic change was reverted.
    RolledBack,
    /// Another toggle for the same id is still in flight.
    AlreadyPending,
    LoginRequired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Refreshed(usize),
    /// No session, the set was emptied without contacting the server.
    Cleared,
    /// The server could not be reached, local state was kept.
    Failed,
}

type PendingSet = Arc<Mutex<HashSet<FavoriteId>>>;

/// Marks an id as in flight for as long as it lives.
struct PendingGuard {
    pending: PendingSet,
    id: FavoriteId,
}

impl PendingGuard {
    fn acquire(pending: &PendingSet, id: FavoriteId) -> Option<Self> {
        let inserted = pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id);

        inserted.then(|| Self {
            pending: pending.clone(),
            id,
        })
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

/// Counts a server fetch as in flight for as long as it lives.
struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
    fn enter(loading: &'a AtomicUsize) -> Self {
        loading.fetch_add(1, Ordering::SeqCst);
        Self(loading)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// The part of the service a toggle keeps using after its caller is gone.
struct Shared<R> {
    repo: R,
    store: Arc<FavoriteStore>,
    notifier: Arc<dyn Notifier>,
    events: FavoritesEventSender,
}

impl<R> Shared<R>
where
    R: FavoritesRepository,
{
    fn publish(&self, event: FavoritesEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }

    fn roll_back(&self, id: FavoriteId, was_favorite: bool) {
        self.store.update(|ids| ids.set(id, was_favorite));
        self.notifier.show(UPDATE_FAILED_MESSAGE.to_string());
    }

    /// Sends the change made optimistically by a toggle and reverts it when
    /// the server rejects it.
    async fn settle(&self, id: FavoriteId, was_favorite: bool) -> ToggleOutcome {
        let res = if was_favorite {
            self.repo.remove_favorite(id).await
        } else {
            self.repo.add_favorite(id).await
        };

        match res {
            Ok(()) => {
                debug!("favorite {} set to {}", id, !was_favorite);
                self.publish(FavoritesEvent::Updated {
                    id,
                    favorited: !was_favorite,
                });
                if was_favorite {
                    ToggleOutcome::Removed
                } else {
                    ToggleOutcome::Added
                }
            }
            Err(e) => {
                error!("failed to toggle favorite {}: {}", id, e);
                self.roll_back(id, was_favorite);
                ToggleOutcome::RolledBack
            }
        }
    }
}

/// Drives favorite toggles with an optimistic local update that is rolled
/// back when the server rejects it.
pub struct FavoritesService<R>
where
    R: FavoritesRepository,
{
    shared: Arc<Shared<R>>,
    storage: Arc<dyn Storage>,
    pending: PendingSet,
    loading: AtomicUsize,
}

impl<R> FavoritesService<R>
where
    R: FavoritesRepository + 'static,
{
    pub fn new(
        repo: R,
        store: Arc<FavoriteStore>,
        storage: Arc<dyn Storage>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (events, _) = broadcast::channel(16);

        Self {
            shared: Arc::new(Shared {
                repo,
                store,
                notifier,
                events,
            }),
            storage,
            pending: Arc::new(Mutex::new(HashSet::new())),
            loading: AtomicUsize::new(0),
        }
    }

    pub fn store(&self) -> &Arc<FavoriteStore> {
        &self.shared.store
    }

    pub fn subscribe(&self) -> FavoritesEventReceiver {
        self.shared.events.subscribe()
    }

    fn is_authenticated(&self) -> bool {
        read_token(self.storage.as_ref()).is_some()
    }

    /// Starts a session: syncs with the server when logged in, otherwise
    /// drops whatever a previous session left behind.
    pub async fn init(&self) -> RefreshOutcome {
        self.refresh_from_server().await
    }

    /// Ends a session. In-flight toggles still settle but no longer matter.
    pub fn dispose(&self) {
        self.shared.store.clear();
        self.shared.publish(FavoritesEvent::Cleared);
    }

    pub fn is_favorite(&self, id: FavoriteId) -> bool {
        self.shared.store.contains(id)
    }

    pub fn favorite_ids(&self) -> Vec<FavoriteId> {
        self.shared.store.snapshot_ids()
    }

    pub fn is_updating(&self, id: FavoriteId) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst) > 0
    }

    /// Flips `id` locally, then confirms the change with the server.
    ///
    /// The remote call and its rollback run on a spawned task, so a toggle
    /// settles even when the returned future is dropped early. The id stays
    /// pending until then.
    pub async fn toggle(&self, id: FavoriteId) -> ToggleOutcome {
        if !self.is_authenticated() {
            self.shared.notifier.show(LOGIN_REQUIRED_MESSAGE.to_string());
            return ToggleOutcome::LoginRequired;
        }

        let Some(guard) = PendingGuard::acquire(&self.pending, id) else {
            debug!("favorite {} already has a request in flight", id);
            return ToggleOutcome::AlreadyPending;
        };

        let was_favorite = self.shared.store.update(|ids| {
            let was_favorite = ids.contains(id);
            ids.set(id, !was_favorite);
            was_favorite
        });

        let shared = self.shared.clone();
        let task = tokio::spawn(async move {
            let _guard = guard;
            shared.settle(id, was_favorite).await
        });

        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("toggle of favorite {} did not finish: {}", id, e);
                self.shared.roll_back(id, was_favorite);
                ToggleOutcome::RolledBack
            }
        }
    }

    /// Replaces local favorites with the server's list.
    ///
    /// A response may overwrite an optimistic change made by a toggle that
    /// started after the request went out.
    pub async fn refresh_from_server(&self) -> RefreshOutcome {
        if !self.is_authenticated() {
            self.shared.store.clear();
            self.shared.publish(FavoritesEvent::Cleared);
            return RefreshOutcome::Cleared;
        }

        let res = {
            let _loading = LoadingGuard::enter(&self.loading);
            self.shared.repo.get_favorites().await
        };

        match res {
            Ok(ids) => {
                self.shared.store.replace(ids);
                let count = self.shared.store.len();
                info!("refreshed {} favorites", count);
                self.shared.publish(FavoritesEvent::Refreshed);
                RefreshOutcome::Refreshed(count)
            }
            Err(e) => {
                error!("failed to refresh favorites: {}", e);
                RefreshOutcome::Failed
            }
        }
    }
}
