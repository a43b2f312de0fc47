// HTTP handlers for users and friendships

use axum::{
    extract::{Path as AxumPath, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};

use crate::app_state::AppState;
use crate::core::UserId;
use crate::error::AppResult;
use crate::models::User;

pub async fn create_user_handler(
    State(state): State<AppState>,
    Json(user): Json<User>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = state.users.create_user(user).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update_user_handler(
    State(state): State<AppState>,
    Json(user): Json<User>,
) -> AppResult<Json<User>> {
    Ok(Json(state.users.update_user(user).await?))
}

pub async fn list_users_handler(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.users.list_users().await?))
}

pub async fn get_user_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
) -> AppResult<Json<User>> {
    Ok(Json(state.users.get_user(UserId::new(id)).await?))
}

pub async fn delete_user_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
) -> AppResult<Json<Value>> {
    state.users.delete_user(UserId::new(id)).await?;
    Ok(Json(json!({"id": id, "deleted": true})))
}

pub async fn add_friend_handler(
    State(state): State<AppState>,
    AxumPath((id, friend_id)): AxumPath<(i64, i64)>,
) -> AppResult<Json<User>> {
    let user = state
        .users
        .add_friend(UserId::new(id), UserId::new(friend_id))
        .await?;
    Ok(Json(user))
}

pub async fn remove_friend_handler(
    State(state): State<AppState>,
    AxumPath((id, friend_id)): AxumPath<(i64, i64)>,
) -> AppResult<Json<Value>> {
    state
        .users
        .remove_friend(UserId::new(id), UserId::new(friend_id))
        .await?;
    Ok(Json(json!({"id": id, "friend_id": friend_id, "removed": true})))
}

pub async fn confirm_friend_handler(
    State(state): State<AppState>,
    AxumPath((id, friend_id)): AxumPath<(i64, i64)>,
) -> AppResult<Json<User>> {
    let user = state
        .users
        .confirm_friend(UserId::new(id), UserId::new(friend_id))
        .await?;
    Ok(Json(user))
}

pub async fn list_friends_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.users.list_friends(UserId::new(id)).await?))
}

pub async fn common_friends_handler(
    State(state): State<AppState>,
    AxumPath((id, other_id)): AxumPath<(i64, i64)>,
) -> AppResult<Json<Vec<User>>> {
    let users = state
        .users
        .list_mutual_friends(UserId::new(id), UserId::new(other_id))
        .await?;
    Ok(Json(users))
}
