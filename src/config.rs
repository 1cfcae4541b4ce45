use crate::error::{AppResult, Error};
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::fs;

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 3000;

/// Default Redis connection string
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Main configuration structure for the service
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to
    pub bind_address: String,
    /// HTTP port
    pub port: u16,
    /// Redis connection string
    pub redis_url: String,
}

/// Optional overrides read from `config/varaamo.toml`
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    bind_address: Option<String>,
    port: Option<u16>,
    redis_url: Option<String>,
}

impl Config {
    /// Load configuration from environment and the optional config file.
    /// Environment variables win over the file; everything has a default.
    pub fn load() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let file = match fs::read_to_string("config/varaamo.toml") {
            Ok(content) => toml::from_str::<FileConfig>(&content)?,
            Err(_) => FileConfig::default(),
        };

        let bind_address = env::var("BIND_ADDRESS")
            .ok()
            .or(file.bind_address)
            .unwrap_or_else(|| String::from("127.0.0.1"));

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| Error::Config(format!("Invalid PORT value: {}", raw)))?,
            Err(_) => file.port.unwrap_or(DEFAULT_PORT),
        };

        let redis_url = env::var("REDIS_URL")
            .ok()
            .or(file.redis_url)
            .unwrap_or_else(|| String::from(DEFAULT_REDIS_URL));

        Ok(Config {
            bind_address,
            port,
            redis_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_config_parses_partial_overrides() {
        let file: FileConfig = toml::from_str("port = 8080").unwrap();
        assert_eq!(file.port, Some(8080));
        assert!(file.redis_url.is_none());
        assert!(file.bind_address.is_none());
    }

    #[test]
    fn test_file_config_rejects_bad_types() {
        assert!(toml::from_str::<FileConfig>("port = \"eighty\"").is_err());
    }
}
