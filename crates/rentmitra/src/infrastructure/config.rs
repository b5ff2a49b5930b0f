use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::entities::favorite::FavoriteId;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    #[serde(default = "default_get_favorites")]
    pub get_favorites: String,
    #[serde(default = "default_add_favorite")]
    pub add_favorite: String,
    #[serde(default = "default_remove_favorite")]
    pub remove_favorite: String,
    #[serde(default = "default_me")]
    pub me: String,
    #[serde(default = "default_logout")]
    pub logout: String,
    #[serde(default = "default_refresh_token")]
    pub refresh_token: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            get_favorites: default_get_favorites(),
            add_favorite: default_add_favorite(),
            remove_favorite: default_remove_favorite(),
            me: default_me(),
            logout: default_logout(),
            refresh_token: default_refresh_token(),
        }
    }
}

impl Endpoints {
    /// Substitutes `{id}` in an endpoint template.
    pub fn with_id(template: &str, id: FavoriteId) -> String {
        template.replace("{id}", &id.to_string())
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Config {
    #[serde(skip)]
    path: PathBuf,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_storage_path")]
    pub storage_path: String,
    /// Seconds before a request to the api is abandoned.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    #[serde(default)]
    pub endpoints: Endpoints,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: rentmitra_home().join("config.yml"),
            api_url: default_api_url(),
            storage_path: default_storage_path(),
            request_timeout: default_request_timeout(),
            endpoints: Endpoints::default(),
        }
    }
}

pub fn rentmitra_home() -> PathBuf {
    match std::env::var("RENTMITRA_HOME") {
        Ok(path) => PathBuf::from(path),
        Err(_) => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".rentmitra"),
    }
}

fn default_api_url() -> String {
    "http://localhost:8086".to_string()
}

fn default_storage_path() -> String {
    rentmitra_home().join("storage.json").display().to_string()
}

fn default_request_timeout() -> u64 {
    180
}

fn default_get_favorites() -> String {
    "/api/favorites/get-favorite".to_string()
}

fn default_add_favorite() -> String {
    "/api/favorites/{id}".to_string()
}

fn default_remove_favorite() -> String {
    "/api/favorites/remove-from-favorites/{id}".to_string()
}

fn default_me() -> String {
    "/auth/me".to_string()
}

fn default_logout() -> String {
    "/api/client/auth/logout".to_string()
}

fn default_refresh_token() -> String {
    "/auth/refresh-token".to_string()
}

impl Config {
    pub fn open<P: AsRef<Path>>(path: Option<P>) -> Result<Config, anyhow::Error> {
        let config_path = match path {
            Some(p) => PathBuf::new().join(p),
            None => rentmitra_home().join("config.yml"),
        };

        match std::fs::File::open(&config_path) {
            Ok(file) => {
                info!("Open config from {:?}", config_path);
                let mut cfg: Self = serde_yml::from_reader(file)?;
                cfg.path = config_path;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Config {
                    path: config_path,
                    ..Default::default()
                };
                cfg.save()?;
                info!("Write default config at {:?}", cfg.path);
                Ok(cfg)
            }
        }
    }

    pub fn save(&self) -> Result<(), anyhow::Error> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_yml::to_string(&self)?)?;

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
