// Database Interface - storage operations the catalog core depends on
// Both the in-memory and the SQLite backend implement every trait here.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::{CacheConfig, DatabaseConfig, StorageBackend};
use crate::core::{FilmId, UserId};
use crate::error::AppResult;
use crate::infrastructure::memory_database::MemoryDatabase;
use crate::infrastructure::sqlite_database::SqliteDatabase;
use crate::models::{Entity, Film, User};

/// Identity store for one entity kind
#[async_trait]
pub trait EntityStore<E: Entity>: Send + Sync {
    /// Persist a new entity and return the identifier the store assigned.
    /// Any identifier already on the entity is ignored.
    async fn put(&self, entity: &E) -> AppResult<E::Id>;

    async fn get(&self, id: E::Id) -> AppResult<Option<E>>;

    /// Replace the stored entity with the same id. `false` if there is none.
    async fn update(&self, entity: &E) -> AppResult<bool>;

    /// Remove the entity together with every friend edge and like that
    /// references it. `false` if there was nothing to delete.
    async fn delete(&self, id: E::Id) -> AppResult<bool>;

    /// All entities, ascending by id
    async fn list(&self) -> AppResult<Vec<E>>;

    async fn exists(&self, id: E::Id) -> AppResult<bool>;
}

/// Directed friend edges with a confirmed flag
#[async_trait]
pub trait FriendshipStore: Send + Sync {
    /// Insert an unconfirmed edge `user -> friend`. `false` if the edge exists.
    async fn add_edge(&self, user_id: UserId, friend_id: UserId) -> AppResult<bool>;

    /// Remove the edge `user -> friend` only. `false` if it was absent.
    async fn remove_edge(&self, user_id: UserId, friend_id: UserId) -> AppResult<bool>;

    /// Outgoing edges of `user_id`, keyed by friend id
    async fn edges(&self, user_id: UserId) -> AppResult<BTreeMap<UserId, bool>>;

    /// Mark both directions confirmed. `false` unless both edges exist.
    async fn confirm(&self, user_id: UserId, friend_id: UserId) -> AppResult<bool>;

    /// Targets shared by the outgoing edges of both users, ascending by id
    async fn mutual(&self, user_id: UserId, other_id: UserId) -> AppResult<Vec<UserId>>;
}

/// User/film like relation
#[async_trait]
pub trait LikesStore: Send + Sync {
    /// `false` if the user already likes the film
    async fn add_like(&self, film_id: FilmId, user_id: UserId) -> AppResult<bool>;

    /// `false` if there was no such like
    async fn remove_like(&self, film_id: FilmId, user_id: UserId) -> AppResult<bool>;

    /// Users who liked the film, in insertion order
    async fn likes_of(&self, film_id: FilmId) -> AppResult<Vec<UserId>>;

    /// Up to `count` liked films, most likes first, ties by ascending film id.
    /// Films without likes are never returned.
    async fn top_film_ids(&self, count: usize) -> AppResult<Vec<FilmId>>;
}

/// Handles to one storage backend, split by concern
#[derive(Clone)]
pub struct Storage {
    pub users: Arc<dyn EntityStore<User>>,
    pub films: Arc<dyn EntityStore<Film>>,
    pub friendships: Arc<dyn FriendshipStore>,
    pub likes: Arc<dyn LikesStore>,
}

impl Storage {
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: EntityStore<User> + EntityStore<Film> + FriendshipStore + LikesStore + 'static,
    {
        Self {
            users: backend.clone(),
            films: backend.clone(),
            friendships: backend.clone(),
            likes: backend,
        }
    }

    pub fn in_memory() -> Self {
        Self::from_backend(Arc::new(MemoryDatabase::new()))
    }
}

/// Open the backend selected by configuration
pub async fn open_storage(database: &DatabaseConfig, cache: &CacheConfig) -> AppResult<Storage> {
    match database.backend {
        StorageBackend::Memory => {
            tracing::info!("Using in-memory storage");
            Ok(Storage::in_memory())
        }
        StorageBackend::Sqlite => {
            tracing::info!("Using SQLite storage at {}", database.url);
            let db =
                SqliteDatabase::connect(&database.url, database.max_connections, cache.capacity)
                    .await?;
            Ok(Storage::from_backend(Arc::new(db)))
        }
    }
}
