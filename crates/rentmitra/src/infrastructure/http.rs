use std::{sync::Arc, time::Duration};

use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use serde_json::Value;

use crate::domain::{repositories::storage::Storage, services::auth::read_token};

/// Thin wrapper over [`reqwest::Client`] that talks to the RentMitra api.
///
/// The bearer token is read from storage on every request, so logging in or
/// out takes effect without rebuilding the client.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    storage: Arc<dyn Storage>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        storage: Arc<dyn Storage>,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            storage,
        })
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!("{} {}", method, url);

        let mut req = self.client.request(method, url);
        if let Some(token) = read_token(self.storage.as_ref()) {
            req = req.bearer_auth(token);
        }
        req
    }

    async fn send(req: RequestBuilder) -> Result<Response, reqwest::Error> {
        req.send().await?.error_for_status()
    }

    pub async fn get(&self, path: &str) -> Result<Value, reqwest::Error> {
        let res = Self::send(self.request(Method::GET, path)).await?;
        Ok(unwrap_data(read_json(res).await?))
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<Value, reqwest::Error> {
        let mut req = self.request(Method::POST, path);
        if let Some(body) = body {
            req = req.json(body);
        }
        let res = Self::send(req).await?;
        Ok(unwrap_data(read_json(res).await?))
    }

    pub async fn delete(&self, path: &str) -> Result<Value, reqwest::Error> {
        let res = Self::send(self.request(Method::DELETE, path)).await?;
        Ok(unwrap_data(read_json(res).await?))
    }
}

/// Empty or non-JSON success bodies read as `null`.
async fn read_json(res: Response) -> Result<Value, reqwest::Error> {
    let body = res.bytes().await?;
    Ok(serde_json::from_slice(&body).unwrap_or(Value::Null))
}

/// Strips the `{ "data": ... }` envelope some endpoints wrap their payload in.
///
/// Sibling keys such as `success` or `message` are dropped with the envelope.
pub fn unwrap_data(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        body => body,
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;
    use crate::infrastructure::storage::MemoryStorage;

    #[test]
    fn test_unwrap_data() {
        assert_eq!(unwrap_data(json!({"data": [1, 2]})), json!([1, 2]));
        assert_eq!(unwrap_data(json!([1, 2])), json!([1, 2]));
        assert_eq!(unwrap_data(json!({"data": [1], "total": 1})), json!([1]));
        assert_eq!(
            unwrap_data(json!({"success": true, "data": [{"productId": 7}]})),
            json!([{"productId": 7}])
        );
        assert_eq!(
            unwrap_data(json!({"message": "ok"})),
            json!({"message": "ok"})
        );
        assert_eq!(unwrap_data(Value::Null), Value::Null);
    }

    #[test]
    fn test_url_join() {
        let client = ApiClient::new(
            "http://localhost:8086/",
            Duration::from_secs(1),
            Arc::new(MemoryStorage::new()),
        )
        .unwrap();

        assert_eq!(
            client.url("/api/favorites/7"),
            "http://localhost:8086/api/favorites/7"
        );
        assert_eq!(client.url("auth/me"), "http://localhost:8086/auth/me");
        assert_eq!(
            client.url("http://localhost:8089/api/client/auth/logout"),
            "http://localhost:8089/api/client/auth/logout"
        );
    }
}
