// HTTP surface of the catalog

pub mod films;
pub mod users;

use axum::{
    routing::{get, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::app_state::AppState;
use films::*;
use users::*;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Users
        .route(
            "/users",
            get(list_users_handler)
                .post(create_user_handler)
                .put(update_user_handler),
        )
        .route("/users/{id}", get(get_user_handler).delete(delete_user_handler))
        // Friendships
        .route("/users/{id}/friends", get(list_friends_handler))
        .route(
            "/users/{id}/friends/{friend_id}",
            put(add_friend_handler).delete(remove_friend_handler),
        )
        .route(
            "/users/{id}/friends/{friend_id}/confirm",
            put(confirm_friend_handler),
        )
        .route(
            "/users/{id}/friends/common/{other_id}",
            get(common_friends_handler),
        )
        // Films
        .route(
            "/films",
            get(list_films_handler)
                .post(create_film_handler)
                .put(update_film_handler),
        )
        .route("/films/popular", get(popular_films_handler))
        .route("/films/{id}", get(get_film_handler).delete(delete_film_handler))
        // Likes
        .route("/films/{id}/likes", get(film_likes_handler))
        .route(
            "/films/{id}/like/{user_id}",
            put(add_like_handler).delete(remove_like_handler),
        )
        // Reference data
        .route("/genres", get(list_genres_handler))
        .route("/genres/{id}", get(get_genre_handler))
        .route("/mpa", get(list_mpa_handler))
        .route("/mpa/{id}", get(get_mpa_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
