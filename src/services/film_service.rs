// FilmService - films, likes and the popular-films ranking

use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::{FilmId, UserId};
use crate::error::{AppError, AppResult};
use crate::infrastructure::{EntityStore, LikesStore, Storage};
use crate::models::{Film, Genre, Mpa, User};
use crate::services::ranking;
use crate::services::validation::{validate_film, Intent};

#[derive(Clone)]
pub struct FilmService {
    films: Arc<dyn EntityStore<Film>>,
    users: Arc<dyn EntityStore<User>>,
    likes: Arc<dyn LikesStore>,
}

fn film_not_found(id: FilmId) -> AppError {
    AppError::NotFound(format!("Film {} not found", id))
}

impl FilmService {
    pub fn new(storage: &Storage) -> Self {
        Self {
            films: storage.films.clone(),
            users: storage.users.clone(),
            likes: storage.likes.clone(),
        }
    }

    pub async fn create_film(&self, film: Film) -> AppResult<Film> {
        let film = validate_film(film, Intent::Create)?;
        let id = self.films.put(&film).await?;
        info!("Created film {} ({})", id, film.name);
        self.get_film(id).await
    }

    pub async fn update_film(&self, film: Film) -> AppResult<Film> {
        let film = validate_film(film, Intent::Update)?;
        let id = film
            .id
            .ok_or_else(|| AppError::InvalidArgument("film id is required for update".into()))?;

        if !self.films.update(&film).await? {
            warn!("Update rejected, film {} does not exist", id);
            return Err(film_not_found(id));
        }
        info!("Updated film {}", id);
        self.get_film(id).await
    }

    /// Delete the film; the store drops its likes and genres with it
    pub async fn delete_film(&self, id: FilmId) -> AppResult<()> {
        if !self.films.delete(id).await? {
            warn!("Delete rejected, film {} does not exist", id);
            return Err(film_not_found(id));
        }
        info!("Deleted film {} with all likes", id);
        Ok(())
    }

    pub async fn get_film(&self, id: FilmId) -> AppResult<Film> {
        debug!("Fetching film {}", id);
        let film = self.films.get(id).await?.ok_or_else(|| film_not_found(id))?;
        self.with_likes(film).await
    }

    pub async fn list_films(&self) -> AppResult<Vec<Film>> {
        let films = self.films.list().await?;
        try_join_all(films.into_iter().map(|film| self.with_likes(film))).await
    }

    async fn with_likes(&self, mut film: Film) -> AppResult<Film> {
        if let Some(id) = film.id {
            film.likes = self.likes.likes_of(id).await?;
        }
        Ok(film)
    }

    async fn require_film_and_user(&self, film_id: FilmId, user_id: UserId) -> AppResult<()> {
        if !self.films.exists(film_id).await? {
            return Err(film_not_found(film_id));
        }
        if !self.users.exists(user_id).await? {
            return Err(AppError::NotFound(format!("User {} not found", user_id)));
        }
        Ok(())
    }

    pub async fn add_like(&self, film_id: FilmId, user_id: UserId) -> AppResult<()> {
        self.require_film_and_user(film_id, user_id).await?;

        if !self.likes.add_like(film_id, user_id).await? {
            warn!("User {} has already liked film {}", user_id, film_id);
            return Err(AppError::AlreadyLiked { film_id, user_id });
        }
        info!("User {} liked film {}", user_id, film_id);
        Ok(())
    }

    pub async fn remove_like(&self, film_id: FilmId, user_id: UserId) -> AppResult<()> {
        self.require_film_and_user(film_id, user_id).await?;

        if !self.likes.remove_like(film_id, user_id).await? {
            warn!("User {} has no like on film {}", user_id, film_id);
            return Err(AppError::NotLiked { film_id, user_id });
        }
        info!("User {} removed their like from film {}", user_id, film_id);
        Ok(())
    }

    /// Users who liked the film, in the order they did
    pub async fn film_likes(&self, film_id: FilmId) -> AppResult<Vec<UserId>> {
        if !self.films.exists(film_id).await? {
            return Err(film_not_found(film_id));
        }
        self.likes.likes_of(film_id).await
    }

    /// Up to `count` films ordered by like count, ties by ascending id.
    /// Only films with at least one like are ranked.
    pub async fn top_films(&self, count: i64) -> AppResult<Vec<Film>> {
        let limit = ranking::requested_count(count)?;
        let ids = self.likes.top_film_ids(limit).await?;
        debug!("Top {} films: {:?}", limit, ids);

        let films = try_join_all(ids.into_iter().map(|id| self.films.get(id))).await?;
        try_join_all(films.into_iter().flatten().map(|film| self.with_likes(film))).await
    }

    pub fn genres(&self) -> Vec<Genre> {
        Genre::all()
    }

    pub fn genre(&self, id: i32) -> AppResult<Genre> {
        Genre::find(id).ok_or_else(|| AppError::NotFound(format!("Genre {} not found", id)))
    }

    pub fn mpa_ratings(&self) -> Vec<Mpa> {
        Mpa::all()
    }

    pub fn mpa(&self, id: i32) -> AppResult<Mpa> {
        Mpa::find(id).ok_or_else(|| AppError::NotFound(format!("MPA rating {} not found", id)))
    }
}
