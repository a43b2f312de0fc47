// Field validation for users and films, run once by the services before
// anything reaches storage. Every violation is collected and reported together.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AppError, AppResult};
use crate::models::{Film, Genre, Mpa, User};

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

pub const MAX_DESCRIPTION_CHARS: usize = 200;

/// Date of the first public film screening
pub fn earliest_release_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1895, 12, 28).unwrap_or(NaiveDate::MIN)
}

/// Whether the entity is being created or replaced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Create,
    Update,
}

fn check_identity(has_id: bool, intent: Intent, kind: &str, violations: &mut Vec<String>) {
    match (intent, has_id) {
        (Intent::Create, true) => {
            violations.push(format!("{} id is assigned by the server and must not be set", kind))
        }
        (Intent::Update, false) => violations.push(format!("{} id is required for update", kind)),
        _ => {}
    }
}

fn into_result<T>(value: T, violations: Vec<String>) -> AppResult<T> {
    if violations.is_empty() {
        Ok(value)
    } else {
        Err(AppError::InvalidArgument(violations.join("; ")))
    }
}

/// Check a user and return it normalized (trimmed email, name defaulted to login)
pub fn validate_user(mut user: User, intent: Intent, today: NaiveDate) -> AppResult<User> {
    let mut violations = Vec::new();
    check_identity(user.id.is_some(), intent, "user", &mut violations);

    if user.login.trim().is_empty() {
        violations.push("login must not be blank".to_string());
    } else if user.login.chars().any(char::is_whitespace) {
        violations.push("login must not contain whitespace".to_string());
    }

    user.email = user.email.trim().to_string();
    if !EMAIL_PATTERN.is_match(&user.email) {
        violations.push(format!("'{}' is not a valid email address", user.email));
    }

    if user.birthday > today {
        violations.push("birthday must not be in the future".to_string());
    }

    user.name = Some(user.display_name().trim().to_string());
    user.friends.clear();

    into_result(user, violations)
}

/// Check a film and return it normalized: trimmed text, reference data
/// resolved, genres deduplicated and ordered by id
pub fn validate_film(mut film: Film, intent: Intent) -> AppResult<Film> {
    let mut violations = Vec::new();
    check_identity(film.id.is_some(), intent, "film", &mut violations);

    film.name = film.name.trim().to_string();
    if film.name.is_empty() {
        violations.push("name must not be blank".to_string());
    }

    film.description = film.description.trim().to_string();
    if film.description.is_empty() {
        violations.push("description must not be blank".to_string());
    } else if film.description.chars().count() > MAX_DESCRIPTION_CHARS {
        violations.push(format!(
            "description must be at most {} characters",
            MAX_DESCRIPTION_CHARS
        ));
    }

    if film.release_date < earliest_release_date() {
        violations.push(format!(
            "release date must not be before {}",
            earliest_release_date()
        ));
    }

    if film.duration <= 0 {
        violations.push("duration must be positive".to_string());
    }

    match Mpa::find(film.mpa.id) {
        Some(mpa) => film.mpa = mpa,
        None => violations.push(format!("unknown MPA rating {}", film.mpa.id)),
    }

    let mut genres = Vec::with_capacity(film.genres.len());
    for requested in &film.genres {
        match Genre::find(requested.id) {
            Some(genre) => genres.push(genre),
            None => violations.push(format!("unknown genre {}", requested.id)),
        }
    }
    genres.sort_by_key(|genre| genre.id);
    genres.dedup_by_key(|genre| genre.id);
    film.genres = genres;
    film.likes.clear();

    into_result(film, violations)
}
