use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite, Transaction};
use std::collections::BTreeMap;
use std::str::FromStr;
use tokio::sync::Mutex;

use crate::core::{FilmId, UserId};
use crate::error::{AppError, AppResult};
use crate::infrastructure::cache::Cache;
use crate::infrastructure::database::{EntityStore, FriendshipStore, LikesStore};
use crate::models::{Entity, Film, Genre, Mpa, User};

/// SQLite implementation of the catalog storage traits.
///
/// User and film rows go through a read-through LRU cache. The cache mutex is
/// held across the database round trip on a miss and across every write, so a
/// reader can never put a row back into the cache after it was invalidated.
pub struct SqliteDatabase {
    pool: SqlitePool,
    user_cache: Mutex<Cache<UserId, User>>,
    film_cache: Mutex<Cache<FilmId, Film>>,
}

impl SqliteDatabase {
    pub async fn connect(url: &str, max_connections: u32, cache_capacity: usize) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| AppError::ConfigurationError(format!("Invalid database URL {}: {}", url, e)))?
            .create_if_missing(true)
            .foreign_keys(true);

        // every connection to an in-memory database sees its own empty database,
        // so the pool must keep exactly one connection alive
        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            // get_filename takes the options by value
            let filename = options.clone().get_filename();
            if let Some(parent) = filename.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        AppError::ConfigurationError(format!(
                            "Failed to create database directory {}: {}",
                            parent.display(),
                            e
                        ))
                    })?;
                }
            }
            SqlitePoolOptions::new().max_connections(max_connections.max(1))
        };

        let pool = pool_options.connect_with(options).await.map_err(|e| {
            AppError::DatabaseError(format!("Failed to connect to {}: {}", url, e))
        })?;

        let db = Self {
            pool,
            user_cache: Mutex::new(Cache::new(cache_capacity)),
            film_cache: Mutex::new(Cache::new(cache_capacity)),
        };
        db.initialize().await?;
        Ok(db)
    }

    pub async fn new_in_memory() -> AppResult<Self> {
        Self::connect("sqlite::memory:", 1, 100).await
    }

    /// Create catalog tables if they do not exist yet
    pub async fn initialize(&self) -> AppResult<()> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL,
                login TEXT NOT NULL,
                name TEXT,
                birthday TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS films (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                release_date TEXT NOT NULL,
                duration INTEGER NOT NULL,
                mpa_id INTEGER NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS film_genres (
                film_id INTEGER NOT NULL REFERENCES films(id),
                genre_id INTEGER NOT NULL,
                PRIMARY KEY (film_id, genre_id)
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS user_friends (
                user_id INTEGER NOT NULL REFERENCES users(id),
                friend_id INTEGER NOT NULL REFERENCES users(id),
                confirmed INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (user_id, friend_id)
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS film_likes (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                film_id INTEGER NOT NULL REFERENCES films(id),
                user_id INTEGER NOT NULL REFERENCES users(id),
                UNIQUE (film_id, user_id)
            )
            "#,
            "CREATE INDEX IF NOT EXISTS idx_user_friends_friend ON user_friends(friend_id)",
            "CREATE INDEX IF NOT EXISTS idx_film_likes_user ON film_likes(user_id)",
        ];

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(format!("Failed to create schema: {}", e)))?;
        }
        Ok(())
    }

    async fn genres_of(&self, film_id: FilmId) -> AppResult<Vec<Genre>> {
        let rows = sqlx::query("SELECT genre_id FROM film_genres WHERE film_id = ? ORDER BY genre_id")
            .bind(film_id.value())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to get genres of film {}: {}", film_id, e))
            })?;

        rows.iter()
            .map(|row| -> AppResult<Genre> { Ok(genre_from_id(row.try_get("genre_id")?)) })
            .collect()
    }
}

fn user_from_row(row: &SqliteRow) -> AppResult<User> {
    Ok(User {
        id: Some(UserId::new(row.try_get("id")?)),
        email: row.try_get("email")?,
        login: row.try_get("login")?,
        name: row.try_get("name")?,
        birthday: row.try_get::<NaiveDate, _>("birthday")?,
        friends: BTreeMap::new(),
    })
}

fn film_from_row(row: &SqliteRow, genres: Vec<Genre>) -> AppResult<Film> {
    let mpa_id: i32 = row.try_get("mpa_id")?;
    Ok(Film {
        id: Some(FilmId::new(row.try_get("id")?)),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        release_date: row.try_get::<NaiveDate, _>("release_date")?,
        duration: row.try_get("duration")?,
        mpa: Mpa::find(mpa_id).unwrap_or(Mpa { id: mpa_id, name: String::new() }),
        genres,
        likes: Vec::new(),
    })
}

fn genre_from_id(genre_id: i32) -> Genre {
    Genre::find(genre_id).unwrap_or(Genre { id: genre_id, name: String::new() })
}

/// Foreign key failures on edge inserts mean one endpoint vanished
fn edge_insert_error(err: sqlx::Error, what: &str) -> AppError {
    match err.as_database_error() {
        Some(db_err) if db_err.is_foreign_key_violation() => {
            AppError::NotFound(format!("{} references a missing user or film", what))
        }
        _ => AppError::DatabaseError(format!("Failed to insert {}: {}", what, err)),
    }
}

async fn insert_genres(
    tx: &mut Transaction<'_, Sqlite>,
    film_id: FilmId,
    genres: &[Genre],
) -> AppResult<()> {
    for genre in genres {
        sqlx::query("INSERT OR IGNORE INTO film_genres (film_id, genre_id) VALUES (?, ?)")
            .bind(film_id.value())
            .bind(genre.id)
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to set genres of film {}: {}", film_id, e))
            })?;
    }
    Ok(())
}

#[async_trait]
impl EntityStore<User> for SqliteDatabase {
    async fn put(&self, user: &User) -> AppResult<UserId> {
        let result = sqlx::query("INSERT INTO users (email, login, name, birthday) VALUES (?, ?, ?, ?)")
            .bind(&user.email)
            .bind(&user.login)
            .bind(&user.name)
            .bind(user.birthday)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to create user: {}", e)))?;

        Ok(UserId::new(result.last_insert_rowid()))
    }

    async fn get(&self, id: UserId) -> AppResult<Option<User>> {
        let mut cache = self.user_cache.lock().await;
        if let Some(user) = cache.get(&id) {
            return Ok(Some(user.clone()));
        }

        let row = sqlx::query("SELECT id, email, login, name, birthday FROM users WHERE id = ?")
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to get user {}: {}", id, e)))?;

        match row {
            Some(row) => {
                let user = user_from_row(&row)?;
                cache.insert(id, user.clone());
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    async fn update(&self, user: &User) -> AppResult<bool> {
        let id = user
            .id
            .ok_or_else(|| AppError::InvalidArgument(format!("{} id is required for update", User::KIND)))?;

        let mut cache = self.user_cache.lock().await;
        let result = sqlx::query("UPDATE users SET email = ?, login = ?, name = ?, birthday = ? WHERE id = ?")
            .bind(&user.email)
            .bind(&user.login)
            .bind(&user.name)
            .bind(user.birthday)
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to update user {}: {}", id, e)))?;
        cache.remove(&id);

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: UserId) -> AppResult<bool> {
        let mut cache = self.user_cache.lock().await;
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(format!("Failed to begin transaction: {}", e))
        })?;

        sqlx::query("DELETE FROM user_friends WHERE user_id = ? OR friend_id = ?")
            .bind(id.value())
            .bind(id.value())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to delete friendships of user {}: {}", id, e))
            })?;
        sqlx::query("DELETE FROM film_likes WHERE user_id = ?")
            .bind(id.value())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to delete likes of user {}: {}", id, e))
            })?;
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.value())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete user {}: {}", id, e)))?;

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(format!("Failed to commit transaction: {}", e))
        })?;
        cache.remove(&id);

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let rows = sqlx::query("SELECT id, email, login, name, birthday FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to list users: {}", e)))?;

        rows.iter().map(user_from_row).collect()
    }

    async fn exists(&self, id: UserId) -> AppResult<bool> {
        let row = sqlx::query("SELECT 1 FROM users WHERE id = ?")
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to check if user {} exists: {}", id, e))
            })?;
        Ok(row.is_some())
    }
}

#[async_trait]
impl EntityStore<Film> for SqliteDatabase {
    async fn put(&self, film: &Film) -> AppResult<FilmId> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(format!("Failed to begin transaction: {}", e))
        })?;

        let result = sqlx::query(
            "INSERT INTO films (name, description, release_date, duration, mpa_id) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&film.name)
        .bind(&film.description)
        .bind(film.release_date)
        .bind(film.duration)
        .bind(film.mpa.id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create film: {}", e)))?;

        let id = FilmId::new(result.last_insert_rowid());
        insert_genres(&mut tx, id, &film.genres).await?;

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(format!("Failed to commit transaction: {}", e))
        })?;
        Ok(id)
    }

    async fn get(&self, id: FilmId) -> AppResult<Option<Film>> {
        let mut cache = self.film_cache.lock().await;
        if let Some(film) = cache.get(&id) {
            return Ok(Some(film.clone()));
        }

        let row = sqlx::query(
            "SELECT id, name, description, release_date, duration, mpa_id FROM films WHERE id = ?",
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to get film {}: {}", id, e)))?;

        match row {
            Some(row) => {
                let film = film_from_row(&row, self.genres_of(id).await?)?;
                cache.insert(id, film.clone());
                Ok(Some(film))
            }
            None => Ok(None),
        }
    }

    async fn update(&self, film: &Film) -> AppResult<bool> {
        let id = film
            .id
            .ok_or_else(|| AppError::InvalidArgument(format!("{} id is required for update", Film::KIND)))?;

        let mut cache = self.film_cache.lock().await;
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(format!("Failed to begin transaction: {}", e))
        })?;

        let result = sqlx::query(
            "UPDATE films SET name = ?, description = ?, release_date = ?, duration = ?, mpa_id = ? WHERE id = ?",
        )
        .bind(&film.name)
        .bind(&film.description)
        .bind(film.release_date)
        .bind(film.duration)
        .bind(film.mpa.id)
        .bind(id.value())
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to update film {}: {}", id, e)))?;

        if result.rows_affected() == 0 {
            tx.rollback().await.map_err(|e| {
                AppError::DatabaseError(format!("Failed to rollback transaction: {}", e))
            })?;
            return Ok(false);
        }

        sqlx::query("DELETE FROM film_genres WHERE film_id = ?")
            .bind(id.value())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to clear genres of film {}: {}", id, e))
            })?;
        insert_genres(&mut tx, id, &film.genres).await?;

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(format!("Failed to commit transaction: {}", e))
        })?;
        cache.remove(&id);

        Ok(true)
    }

    async fn delete(&self, id: FilmId) -> AppResult<bool> {
        let mut cache = self.film_cache.lock().await;
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(format!("Failed to begin transaction: {}", e))
        })?;

        for statement in [
            "DELETE FROM film_likes WHERE film_id = ?",
            "DELETE FROM film_genres WHERE film_id = ?",
        ] {
            sqlx::query(statement)
                .bind(id.value())
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::DatabaseError(format!("Failed to delete relations of film {}: {}", id, e))
                })?;
        }
        let result = sqlx::query("DELETE FROM films WHERE id = ?")
            .bind(id.value())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete film {}: {}", id, e)))?;

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(format!("Failed to commit transaction: {}", e))
        })?;
        cache.remove(&id);

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> AppResult<Vec<Film>> {
        let rows = sqlx::query(
            "SELECT id, name, description, release_date, duration, mpa_id FROM films ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list films: {}", e)))?;

        let genre_rows = sqlx::query("SELECT film_id, genre_id FROM film_genres ORDER BY film_id, genre_id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to list film genres: {}", e)))?;

        let mut genres: BTreeMap<i64, Vec<Genre>> = BTreeMap::new();
        for row in &genre_rows {
            let film_id: i64 = row.try_get("film_id")?;
            genres
                .entry(film_id)
                .or_default()
                .push(genre_from_id(row.try_get("genre_id")?));
        }

        rows.iter()
            .map(|row| -> AppResult<Film> {
                let film_id: i64 = row.try_get("id")?;
                film_from_row(row, genres.remove(&film_id).unwrap_or_default())
            })
            .collect()
    }

    async fn exists(&self, id: FilmId) -> AppResult<bool> {
        let row = sqlx::query("SELECT 1 FROM films WHERE id = ?")
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to check if film {} exists: {}", id, e))
            })?;
        Ok(row.is_some())
    }
}

#[async_trait]
impl FriendshipStore for SqliteDatabase {
    async fn add_edge(&self, user_id: UserId, friend_id: UserId) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO user_friends (user_id, friend_id, confirmed) VALUES (?, ?, 0)",
        )
        .bind(user_id.value())
        .bind(friend_id.value())
        .execute(&self.pool)
        .await
        .map_err(|e| edge_insert_error(e, "friendship"))?;

        Ok(result.rows_affected() == 1)
    }

    async fn remove_edge(&self, user_id: UserId, friend_id: UserId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM user_friends WHERE user_id = ? AND friend_id = ?")
            .bind(user_id.value())
            .bind(friend_id.value())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!(
                    "Failed to remove friendship {} -> {}: {}",
                    user_id, friend_id, e
                ))
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn edges(&self, user_id: UserId) -> AppResult<BTreeMap<UserId, bool>> {
        let rows = sqlx::query(
            "SELECT friend_id, confirmed FROM user_friends WHERE user_id = ? ORDER BY friend_id",
        )
        .bind(user_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!("Failed to get friends of user {}: {}", user_id, e))
        })?;

        rows.iter()
            .map(|row| -> AppResult<(UserId, bool)> {
                Ok((
                    UserId::new(row.try_get("friend_id")?),
                    row.try_get::<bool, _>("confirmed")?,
                ))
            })
            .collect()
    }

    async fn confirm(&self, user_id: UserId, friend_id: UserId) -> AppResult<bool> {
        // single statement: flips both edges only when both are present
        let result = sqlx::query(
            r#"
            UPDATE user_friends SET confirmed = 1
            WHERE ((user_id = ? AND friend_id = ?) OR (user_id = ? AND friend_id = ?))
              AND (SELECT COUNT(*) FROM user_friends
                   WHERE (user_id = ? AND friend_id = ?) OR (user_id = ? AND friend_id = ?)) = 2
            "#,
        )
        .bind(user_id.value())
        .bind(friend_id.value())
        .bind(friend_id.value())
        .bind(user_id.value())
        .bind(user_id.value())
        .bind(friend_id.value())
        .bind(friend_id.value())
        .bind(user_id.value())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!(
                "Failed to confirm friendship {} <-> {}: {}",
                user_id, friend_id, e
            ))
        })?;

        Ok(result.rows_affected() == 2)
    }

    async fn mutual(&self, user_id: UserId, other_id: UserId) -> AppResult<Vec<UserId>> {
        let rows = sqlx::query(
            r#"
            SELECT mine.friend_id AS friend_id
            FROM user_friends AS mine
            JOIN user_friends AS theirs ON theirs.friend_id = mine.friend_id
            WHERE mine.user_id = ? AND theirs.user_id = ?
            ORDER BY mine.friend_id
            "#,
        )
        .bind(user_id.value())
        .bind(other_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!(
                "Failed to get mutual friends of {} and {}: {}",
                user_id, other_id, e
            ))
        })?;

        rows.iter()
            .map(|row| -> AppResult<UserId> { Ok(UserId::new(row.try_get("friend_id")?)) })
            .collect()
    }
}

#[async_trait]
impl LikesStore for SqliteDatabase {
    async fn add_like(&self, film_id: FilmId, user_id: UserId) -> AppResult<bool> {
        let result = sqlx::query("INSERT OR IGNORE INTO film_likes (film_id, user_id) VALUES (?, ?)")
            .bind(film_id.value())
            .bind(user_id.value())
            .execute(&self.pool)
            .await
            .map_err(|e| edge_insert_error(e, "like"))?;

        Ok(result.rows_affected() == 1)
    }

    async fn remove_like(&self, film_id: FilmId, user_id: UserId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM film_likes WHERE film_id = ? AND user_id = ?")
            .bind(film_id.value())
            .bind(user_id.value())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!(
                    "Failed to remove like of film {} by user {}: {}",
                    film_id, user_id, e
                ))
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn likes_of(&self, film_id: FilmId) -> AppResult<Vec<UserId>> {
        let rows = sqlx::query("SELECT user_id FROM film_likes WHERE film_id = ? ORDER BY seq")
            .bind(film_id.value())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to get likes of film {}: {}", film_id, e))
            })?;

        rows.iter()
            .map(|row| -> AppResult<UserId> { Ok(UserId::new(row.try_get("user_id")?)) })
            .collect()
    }

    async fn top_film_ids(&self, count: usize) -> AppResult<Vec<FilmId>> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT film_id, COUNT(*) AS like_count
            FROM film_likes
            GROUP BY film_id
            ORDER BY like_count DESC, film_id ASC
            LIMIT ?
            "#,
        )
        .bind(i64::try_from(count).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to rank films: {}", e)))?;

        rows.iter()
            .map(|row| -> AppResult<FilmId> { Ok(FilmId::new(row.try_get("film_id")?)) })
            .collect()
    }
}
