use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::{FilmId, UserId};
use crate::models::{Entity, Genre, Mpa};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Film {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<FilmId>,
    pub name: String,
    pub description: String,
    pub release_date: NaiveDate,
    /// Length in minutes
    pub duration: i32,
    pub mpa: Mpa,
    #[serde(default)]
    pub genres: Vec<Genre>,
    /// Users who liked the film, in the order the likes were given.
    /// Filled in on read.
    #[serde(default, skip_deserializing)]
    pub likes: Vec<UserId>,
}

impl Film {
    pub fn new(
        name: &str,
        description: &str,
        release_date: NaiveDate,
        duration: i32,
        mpa_id: i32,
    ) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            description: description.to_string(),
            release_date,
            duration,
            mpa: Mpa { id: mpa_id, name: String::new() },
            genres: Vec::new(),
            likes: Vec::new(),
        }
    }

    pub fn with_genres(mut self, genre_ids: &[i32]) -> Self {
        self.genres = genre_ids
            .iter()
            .map(|id| Genre { id: *id, name: String::new() })
            .collect();
        self
    }
}

impl Entity for Film {
    type Id = FilmId;
    const KIND: &'static str = "film";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_uses_camel_case() {
        let film = Film::new("Alien", "Space horror", NaiveDate::from_ymd_opt(1979, 5, 25).unwrap(), 117, 4);
        let json = serde_json::to_value(&film).unwrap();
        assert_eq!(json["releaseDate"], "1979-05-25");
        assert_eq!(json["mpa"]["id"], 4);
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_genres_accept_id_only() {
        let json = r#"{"name":"Up","description":"Balloons","releaseDate":"2009-05-29",
            "duration":96,"mpa":{"id":2},"genres":[{"id":3}]}"#;
        let film: Film = serde_json::from_str(json).unwrap();
        assert_eq!(film.genres, vec![Genre { id: 3, name: String::new() }]);
        assert_eq!(film.mpa.id, 2);
    }
}
