use std::{sync::Arc, time::Duration};

use crate::{
    domain::{
        repositories::storage::Storage,
        services::{
            auth::{AuthError, AuthService},
            favorite_store::FavoriteStore,
            favorites::{FavoritesService, RefreshOutcome},
        },
    },
    infrastructure::{
        config::Config,
        http::ApiClient,
        repositories::{auth::AuthRepositoryImpl, favorites::FavoritesRepositoryImpl},
        storage::FileStorage,
    },
    notifier::Notifier,
};

pub type Auth = AuthService<AuthRepositoryImpl>;
pub type Favorites = FavoritesService<FavoritesRepositoryImpl>;

/// Session-wide services. Build one per session, call [`Context::init`]
/// once, and [`Context::logout`] to tear it down.
pub struct Context {
    pub auth: Arc<Auth>,
    pub favorites: Arc<Favorites>,
}

impl Context {
    pub fn new(config: &Config, notifier: Arc<dyn Notifier>) -> Result<Self, anyhow::Error> {
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(&config.storage_path));
        Self::with_storage(config, storage, notifier)
    }

    pub fn with_storage(
        config: &Config,
        storage: Arc<dyn Storage>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, anyhow::Error> {
        let client = ApiClient::new(
            &config.api_url,
            Duration::from_secs(config.request_timeout),
            storage.clone(),
        )?;

        let auth_repo = AuthRepositoryImpl::new(client.clone(), config.endpoints.clone());
        let auth = Arc::new(AuthService::new(auth_repo, storage.clone()));

        let favorites_repo = FavoritesRepositoryImpl::new(client, config.endpoints.clone());
        let store = Arc::new(FavoriteStore::open(storage.clone()));
        let favorites = Arc::new(FavoritesService::new(
            favorites_repo,
            store,
            storage,
            notifier,
        ));

        Ok(Self { auth, favorites })
    }

    pub async fn init(&self) -> RefreshOutcome {
        self.auth.check().await;
        self.favorites.init().await
    }

    pub async fn logout(&self) -> Result<(), AuthError> {
        let res = self.auth.logout().await;
        self.favorites.dispose();
        res
    }
}
