use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use crate::core::{FilmId, UserId};

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    AlreadyRelated { user_id: UserId, friend_id: UserId },
    AlreadyLiked { film_id: FilmId, user_id: UserId },
    NotRelated { user_id: UserId, friend_id: UserId },
    NotLiked { film_id: FilmId, user_id: UserId },
    SelfRelation(UserId),
    InvalidArgument(String),
    DatabaseError(String),
    ConfigurationError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::AlreadyRelated { user_id, friend_id } => {
                write!(f, "User {} has already added user {} as a friend", user_id, friend_id)
            }
            AppError::AlreadyLiked { film_id, user_id } => {
                write!(f, "User {} has already liked film {}", user_id, film_id)
            }
            AppError::NotRelated { user_id, friend_id } => {
                write!(f, "No friendship from user {} to user {}", user_id, friend_id)
            }
            AppError::NotLiked { film_id, user_id } => {
                write!(f, "User {} has not liked film {}", user_id, film_id)
            }
            AppError::SelfRelation(user_id) => {
                write!(f, "User {} cannot befriend themselves", user_id)
            }
            AppError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// HTTP status the boundary layer reports for this failure
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) | AppError::NotRelated { .. } | AppError::NotLiked { .. } => {
                StatusCode::NOT_FOUND
            }
            AppError::AlreadyRelated { .. } | AppError::AlreadyLiked { .. } => StatusCode::CONFLICT,
            AppError::SelfRelation(_) | AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::DatabaseError(_) | AppError::ConfigurationError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = if status.is_server_error() {
            tracing::error!("{}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
