// Catalog entities and the static reference data they point at

pub mod film;
pub mod reference;
pub mod user;

pub use film::Film;
pub use reference::{Genre, Mpa};
pub use user::User;

use std::fmt;

/// Entity trait implemented by everything the identity store persists
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Copy + Ord + fmt::Display + Send + Sync + 'static;

    /// Entity kind used in log lines and error messages
    const KIND: &'static str;
}
