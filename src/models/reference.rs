// Static reference data: genres and MPA ratings

use serde::{Deserialize, Serialize};

const GENRES: [(i32, &str); 6] = [
    (1, "Comedy"),
    (2, "Drama"),
    (3, "Animation"),
    (4, "Thriller"),
    (5, "Documentary"),
    (6, "Action"),
];

const MPA_RATINGS: [(i32, &str); 5] = [
    (1, "G"),
    (2, "PG"),
    (3, "PG-13"),
    (4, "R"),
    (5, "NC-17"),
];

/// Film genre. Clients may send only the id; the name is resolved from the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i32,
    #[serde(default)]
    pub name: String,
}

impl Genre {
    pub fn all() -> Vec<Genre> {
        GENRES
            .iter()
            .map(|(id, name)| Genre { id: *id, name: name.to_string() })
            .collect()
    }

    pub fn find(id: i32) -> Option<Genre> {
        GENRES
            .iter()
            .find(|(genre_id, _)| *genre_id == id)
            .map(|(id, name)| Genre { id: *id, name: name.to_string() })
    }
}

/// MPA age rating
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mpa {
    pub id: i32,
    #[serde(default)]
    pub name: String,
}

impl Mpa {
    pub fn all() -> Vec<Mpa> {
        MPA_RATINGS
            .iter()
            .map(|(id, name)| Mpa { id: *id, name: name.to_string() })
            .collect()
    }

    pub fn find(id: i32) -> Option<Mpa> {
        MPA_RATINGS
            .iter()
            .find(|(rating_id, _)| *rating_id == id)
            .map(|(id, name)| Mpa { id: *id, name: name.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(Genre::find(2).map(|g| g.name), Some("Drama".to_string()));
        assert_eq!(Mpa::find(3).map(|m| m.name), Some("PG-13".to_string()));
        assert!(Genre::find(0).is_none());
        assert!(Mpa::find(6).is_none());
    }

    #[test]
    fn test_tables_are_ordered_by_id() {
        let ids: Vec<i32> = Genre::all().iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(Mpa::all().len(), 5);
    }
}
