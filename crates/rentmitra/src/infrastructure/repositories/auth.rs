use async_trait::async_trait;
use serde_json::json;

use crate::{
    domain::repositories::auth::{AuthRepository, AuthRepositoryError},
    infrastructure::{config::Endpoints, http::ApiClient},
};

#[derive(Clone)]
pub struct AuthRepositoryImpl {
    client: ApiClient,
    endpoints: Endpoints,
}

impl AuthRepositoryImpl {
    pub fn new(client: ApiClient, endpoints: Endpoints) -> Self {
        Self { client, endpoints }
    }
}

#[async_trait]
impl AuthRepository for AuthRepositoryImpl {
    async fn me(&self) -> Result<(), AuthRepositoryError> {
        self.client.get(&self.endpoints.me).await?;

        Ok(())
    }

    async fn logout(&self, refresh_token: &str) -> Result<(), AuthRepositoryError> {
        let body = json!({ "refreshToken": refresh_token });
        self.client.post(&self.endpoints.logout, Some(&body)).await?;

        Ok(())
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<(), AuthRepositoryError> {
        let body = json!({ "refreshToken": refresh_token });
        self.client
            .post(&self.endpoints.refresh_token, Some(&body))
            .await?;

        Ok(())
    }
}
