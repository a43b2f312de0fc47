#![allow(dead_code)]

use chrono::NaiveDate;
use std::sync::Arc;
use tempfile::TempDir;

use filmgraph::config::{Config, FriendshipPolicy};
use filmgraph::core::{FilmId, UserId};
use filmgraph::infrastructure::{SqliteDatabase, Storage};
use filmgraph::models::{Film, User};
use filmgraph::services::{FilmService, UserService};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn user(login: &str) -> User {
    User::new(&format!("{}@example.com", login), login, None, date(1990, 5, 17))
}

pub fn film(name: &str) -> Film {
    Film::new(name, "a film worth watching", date(1999, 3, 31), 136, 3)
}

pub async fn sqlite_storage() -> Storage {
    Storage::from_backend(Arc::new(SqliteDatabase::new_in_memory().await.unwrap()))
}

/// SQLite on a temporary file with a real connection pool. The directory
/// must outlive the storage.
pub async fn file_sqlite_storage(max_connections: u32) -> (TempDir, Storage) {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("catalog.db").display());
    let db = SqliteDatabase::connect(&url, max_connections, 100).await.unwrap();
    (dir, Storage::from_backend(Arc::new(db)))
}

/// Every storage backend, each freshly created and empty
pub async fn backends() -> Vec<(&'static str, Storage)> {
    vec![("memory", Storage::in_memory()), ("sqlite", sqlite_storage().await)]
}

pub struct Catalog {
    pub users: UserService,
    pub films: FilmService,
}

impl Catalog {
    pub fn new(storage: &Storage) -> Self {
        Self::with_policy(storage, FriendshipPolicy::RequestConfirm)
    }

    pub fn with_policy(storage: &Storage, policy: FriendshipPolicy) -> Self {
        Self {
            users: UserService::new(storage, policy),
            films: FilmService::new(storage),
        }
    }

    pub async fn add_user(&self, login: &str) -> UserId {
        self.users.create_user(user(login)).await.unwrap().id.unwrap()
    }

    pub async fn add_film(&self, name: &str) -> FilmId {
        self.films.create_film(film(name)).await.unwrap().id.unwrap()
    }
}

/// Catalogs over every backend
pub async fn catalogs() -> Vec<(&'static str, Catalog)> {
    backends()
        .await
        .into_iter()
        .map(|(name, storage)| (name, Catalog::new(&storage)))
        .collect()
}

/// Catalogs for race tests: both in-process backends plus a pooled SQLite file
pub async fn pooled_catalogs() -> (TempDir, Vec<(&'static str, Catalog)>) {
    let (dir, file_storage) = file_sqlite_storage(5).await;
    let mut all = catalogs().await;
    all.push(("sqlite-file", Catalog::new(&file_storage)));
    (dir, all)
}

pub fn memory_config() -> Config {
    Config::default()
}
