use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::favorite::FavoriteId;

#[derive(Debug, Error)]
pub enum FavoritesRepositoryError {
    #[error("request error: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("other: {0}")]
    Other(String),
}

/// Server-side favorites of the authenticated user.
#[async_trait]
pub trait FavoritesRepository: Send + Sync {
    async fn get_favorites(&self) -> Result<Vec<FavoriteId>, FavoritesRepositoryError>;

    async fn add_favorite(&self, id: FavoriteId) -> Result<(), FavoritesRepositoryError>;

    async fn remove_favorite(&self, id: FavoriteId) -> Result<(), FavoritesRepositoryError>;
}
