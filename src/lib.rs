pub mod api;
pub mod app_state;
pub mod config;
pub mod core;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod services;

pub use error::{AppError, AppResult};
