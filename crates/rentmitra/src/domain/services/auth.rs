use std::sync::Arc;

use thiserror::Error;

use crate::domain::repositories::{
    auth::AuthRepository,
    storage::{Storage, StorageError},
};

pub const TOKEN_KEY: &str = "token";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token is empty")]
    EmptyToken,
    #[error("storage error: {0}")]
    StorageError(#[from] StorageError),
}

/// Reads the bearer token. An unreadable or empty entry counts as logged out.
pub fn read_token(storage: &dyn Storage) -> Option<String> {
    match storage.get_item(TOKEN_KEY) {
        Ok(Some(token)) if !token.is_empty() => Some(token),
        Ok(_) => None,
        Err(e) => {
            warn!("failed to read token: {}", e);
            None
        }
    }
}

pub struct AuthService<R>
where
    R: AuthRepository,
{
    repo: R,
    storage: Arc<dyn Storage>,
}

impl<R> AuthService<R>
where
    R: AuthRepository,
{
    pub fn new(repo: R, storage: Arc<dyn Storage>) -> Self {
        Self { repo, storage }
    }

    pub fn token(&self) -> Option<String> {
        read_token(self.storage.as_ref())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn refresh_token(&self) -> Option<String> {
        match self.storage.get_item(REFRESH_TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!("failed to read refresh token: {}", e);
                None
            }
        }
    }

    pub fn login(&self, token: &str, refresh_token: Option<&str>) -> Result<(), AuthError> {
        if token.is_empty() {
            return Err(AuthError::EmptyToken);
        }

        self.storage.set_item(TOKEN_KEY, token)?;
        match refresh_token {
            Some(refresh_token) if !refresh_token.is_empty() => {
                self.storage.set_item(REFRESH_TOKEN_KEY, refresh_token)?
            }
            _ => {}
        }

        info!("logged in");
        Ok(())
    }

    /// Reports whether a token is present. The token is also validated
    /// against the backend, but a rejection is only logged.
    pub async fn check(&self) -> bool {
        if !self.is_authenticated() {
            return false;
        }

        if let Err(e) = self.repo.me().await {
            error!("auth check failed: {}", e);
        }

        true
    }

    pub async fn refresh(&self) {
        let Some(refresh_token) = self.refresh_token() else {
            return;
        };

        if let Err(e) = self.repo.refresh_token(&refresh_token).await {
            warn!("failed to refresh token: {}", e);
            if let Err(e) = self.storage.remove_item(REFRESH_TOKEN_KEY) {
                warn!("failed to remove refresh token: {}", e);
            }
        }
    }

    pub async fn logout(&self) -> Result<(), AuthError> {
        if let Some(refresh_token) = self.refresh_token() {
            if let Err(e) = self.repo.logout(&refresh_token).await {
                warn!("remote logout failed: {}", e);
            }
            self.storage.remove_item(REFRESH_TOKEN_KEY)?;
        }

        self.storage.remove_item(TOKEN_KEY)?;

        info!("logged out");
        Ok(())
    }
}
