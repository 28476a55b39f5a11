use std::env;

use crate::utils::error::ConfigError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MONGO_URI: &str = "mongodb://localhost:27017/MERNAPP25";
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

/// Which `UserStore` backs the handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Mongo,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub mongo_uri: String,
    pub store: StoreBackend,
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Reads HOST, PORT, MONGO_URI, USER_STORE and CORS_ORIGINS.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(value))?,
            None => DEFAULT_PORT,
        };

        let mongo_uri = lookup("MONGO_URI").unwrap_or_else(|| DEFAULT_MONGO_URI.to_string());

        let store = match lookup("USER_STORE").as_deref().map(str::trim) {
            None | Some("") | Some("mongo") => StoreBackend::Mongo,
            Some("memory") => StoreBackend::Memory,
            Some(other) => return Err(ConfigError::UnknownStore(other.to_string())),
        };

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        Ok(Config {
            host,
            port,
            mongo_uri,
            store,
            cors_origins,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
