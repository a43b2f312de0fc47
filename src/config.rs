use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    Memory,
    Sqlite,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "sqlite" => Ok(StorageBackend::Sqlite),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

/// How a friend request becomes a confirmed friendship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FriendshipPolicy {
    /// Both users add each other, then one of them confirms
    RequestConfirm,
    /// Confirmed as soon as the second direction is added
    AutoConfirm,
}

impl FromStr for FriendshipPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "request_confirm" => Ok(FriendshipPolicy::RequestConfirm),
            "auto_confirm" => Ok(FriendshipPolicy::AutoConfirm),
            other => Err(format!("unknown friendship policy '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StorageBackend,
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub friendship_policy: FriendshipPolicy,
    /// Used by the popular-films endpoint when no count is given
    pub default_top_count: i64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key/value source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            database: DatabaseConfig {
                backend: parse_var(&lookup, "STORAGE_BACKEND", StorageBackend::Sqlite)?,
                url: lookup("DATABASE_URL")
                    .unwrap_or_else(|| "sqlite:data/filmgraph.db".to_string()),
                max_connections: parse_var(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
            },
            server: ServerConfig {
                host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_var(&lookup, "SERVER_PORT", 8080)?,
            },
            cache: CacheConfig {
                capacity: parse_var(&lookup, "CACHE_CAPACITY", 1000)?,
            },
            catalog: CatalogConfig {
                friendship_policy: parse_var(
                    &lookup,
                    "FRIENDSHIP_POLICY",
                    FriendshipPolicy::RequestConfirm,
                )?,
                default_top_count: parse_var(&lookup, "TOP_FILMS_DEFAULT", 10)?,
            },
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                backend: StorageBackend::Memory,
                url: "sqlite::memory:".to_string(),
                max_connections: 1,
            },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            cache: CacheConfig { capacity: 1000 },
            catalog: CatalogConfig {
                friendship_policy: FriendshipPolicy::RequestConfirm,
                default_top_count: 10,
            },
        }
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .parse()
            .map_err(|e| anyhow!("Invalid value '{}' for {}: {}", raw, key, e)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.database.backend, StorageBackend::Sqlite);
        assert_eq!(config.database.url, "sqlite:data/filmgraph.db");
        assert_eq!(config.server_address(), "0.0.0.0:8080");
        assert_eq!(config.cache.capacity, 1000);
        assert_eq!(config.catalog.friendship_policy, FriendshipPolicy::RequestConfirm);
        assert_eq!(config.catalog.default_top_count, 10);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("STORAGE_BACKEND", "memory"),
            ("SERVER_PORT", "3000"),
            ("FRIENDSHIP_POLICY", "auto_confirm"),
            ("TOP_FILMS_DEFAULT", "5"),
        ]))
        .unwrap();
        assert_eq!(config.database.backend, StorageBackend::Memory);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.catalog.friendship_policy, FriendshipPolicy::AutoConfirm);
        assert_eq!(config.catalog.default_top_count, 5);
    }

    #[test]
    fn test_malformed_values_are_errors() {
        assert!(Config::from_lookup(lookup_from(&[("SERVER_PORT", "eighty")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("STORAGE_BACKEND", "postgres")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("FRIENDSHIP_POLICY", "maybe")])).is_err());
    }
}
