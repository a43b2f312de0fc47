// Service layer - the catalog core the HTTP layer talks to

pub mod film_service;
pub mod ranking;
pub mod user_service;
pub mod validation;

pub use film_service::FilmService;
pub use user_service::UserService;
