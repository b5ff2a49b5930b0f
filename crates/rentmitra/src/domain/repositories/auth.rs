use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthRepositoryError {
    #[error("request error: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("other: {0}")]
    Other(String),
}

#[async_trait]
pub trait AuthRepository: Send + Sync {
    /// Asks the backend whether the stored token is still accepted.
    async fn me(&self) -> Result<(), AuthRepositoryError>;

    async fn logout(&self, refresh_token: &str) -> Result<(), AuthRepositoryError>;

    async fn refresh_token(&self, refresh_token: &str) -> Result<(), AuthRepositoryError>;
}
