// HTTP handlers for films, likes and the reference catalogs

use axum::{
    extract::{Path as AxumPath, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app_state::AppState;
use crate::core::{FilmId, UserId};
use crate::error::AppResult;
use crate::models::{Film, Genre, Mpa};

#[derive(Deserialize)]
pub struct PopularQuery {
    pub count: Option<i64>,
}

pub async fn create_film_handler(
    State(state): State<AppState>,
    Json(film): Json<Film>,
) -> AppResult<(StatusCode, Json<Film>)> {
    let film = state.films.create_film(film).await?;
    Ok((StatusCode::CREATED, Json(film)))
}

pub async fn update_film_handler(
    State(state): State<AppState>,
    Json(film): Json<Film>,
) -> AppResult<Json<Film>> {
    Ok(Json(state.films.update_film(film).await?))
}

pub async fn list_films_handler(State(state): State<AppState>) -> AppResult<Json<Vec<Film>>> {
    Ok(Json(state.films.list_films().await?))
}

pub async fn get_film_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
) -> AppResult<Json<Film>> {
    Ok(Json(state.films.get_film(FilmId::new(id)).await?))
}

pub async fn delete_film_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
) -> AppResult<Json<Value>> {
    state.films.delete_film(FilmId::new(id)).await?;
    Ok(Json(json!({"id": id, "deleted": true})))
}

pub async fn popular_films_handler(
    State(state): State<AppState>,
    Query(params): Query<PopularQuery>,
) -> AppResult<Json<Vec<Film>>> {
    let count = params
        .count
        .unwrap_or(state.config.catalog.default_top_count);
    Ok(Json(state.films.top_films(count).await?))
}

pub async fn add_like_handler(
    State(state): State<AppState>,
    AxumPath((id, user_id)): AxumPath<(i64, i64)>,
) -> AppResult<Json<Value>> {
    state
        .films
        .add_like(FilmId::new(id), UserId::new(user_id))
        .await?;
    Ok(Json(json!({"film_id": id, "user_id": user_id, "liked": true})))
}

pub async fn remove_like_handler(
    State(state): State<AppState>,
    AxumPath((id, user_id)): AxumPath<(i64, i64)>,
) -> AppResult<Json<Value>> {
    state
        .films
        .remove_like(FilmId::new(id), UserId::new(user_id))
        .await?;
    Ok(Json(json!({"film_id": id, "user_id": user_id, "liked": false})))
}

pub async fn film_likes_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
) -> AppResult<Json<Vec<UserId>>> {
    Ok(Json(state.films.film_likes(FilmId::new(id)).await?))
}

pub async fn list_genres_handler(State(state): State<AppState>) -> Json<Vec<Genre>> {
    Json(state.films.genres())
}

pub async fn get_genre_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i32>,
) -> AppResult<Json<Genre>> {
    Ok(Json(state.films.genre(id)?))
}

pub async fn list_mpa_handler(State(state): State<AppState>) -> Json<Vec<Mpa>> {
    Json(state.films.mpa_ratings())
}

pub async fn get_mpa_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i32>,
) -> AppResult<Json<Mpa>> {
    Ok(Json(state.films.mpa(id)?))
}
