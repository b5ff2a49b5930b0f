use async_trait::async_trait;
use serde_json::Value;

use crate::{
    domain::{
        entities::favorite::FavoriteId,
        repositories::favorites::{FavoritesRepository, FavoritesRepositoryError},
    },
    infrastructure::{config::Endpoints, http::ApiClient},
};

#[derive(Clone)]
pub struct FavoritesRepositoryImpl {
    client: ApiClient,
    endpoints: Endpoints,
}

impl FavoritesRepositoryImpl {
    pub fn new(client: ApiClient, endpoints: Endpoints) -> Self {
        Self { client, endpoints }
    }
}

/// Extracts product ids from a favorites listing.
///
/// Entries carry the id either directly as `productId` or nested under
/// `product`. Entries without a usable id are skipped and anything that is
/// not a list yields no ids.
pub fn favorite_ids(body: &Value) -> Vec<FavoriteId> {
    let Some(entries) = body.as_array() else {
        return vec![];
    };

    entries
        .iter()
        .filter_map(|entry| {
            entry
                .pointer("/product/productId")
                .filter(|id| !id.is_null())
                .or_else(|| entry.get("productId"))
                .and_then(FavoriteId::from_value)
        })
        .collect()
}

#[async_trait]
impl FavoritesRepository for FavoritesRepositoryImpl {
    async fn get_favorites(&self) -> Result<Vec<FavoriteId>, FavoritesRepositoryError> {
        let body = self.client.get(&self.endpoints.get_favorites).await?;

        Ok(favorite_ids(&body))
    }

    async fn add_favorite(&self, id: FavoriteId) -> Result<(), FavoritesRepositoryError> {
        let path = Endpoints::with_id(&self.endpoints.add_favorite, id);
        self.client.post::<Value>(&path, None).await?;

        Ok(())
    }

    async fn remove_favorite(&self, id: FavoriteId) -> Result<(), FavoritesRepositoryError> {
        let path = Endpoints::with_id(&self.endpoints.remove_favorite, id);
        self.client.delete(&path).await?;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_favorite_ids_shapes() {
        let body = json!([
            {"productId": 7},
            {"product": {"productId": "42", "name": "Tent"}},
            {"product": null, "productId": 9},
            {"product": {"name": "no id"}},
            {"productId": null},
            {"product": {"productId": null}, "productId": 11},
            "garbage",
        ]);

        assert_eq!(
            favorite_ids(&body),
            vec![
                FavoriteId::new(7),
                FavoriteId::new(42),
                FavoriteId::new(9),
                FavoriteId::new(11)
            ]
        );
    }

    #[test]
    fn test_favorite_ids_non_list() {
        assert!(favorite_ids(&json!({"message": "ok"})).is_empty());
        assert!(favorite_ids(&Value::Null).is_empty());
    }
}
