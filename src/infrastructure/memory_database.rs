// In-memory storage backend
// A single RwLock guards every map, so each mutation (including cascading
// deletes) happens in one critical section.

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::core::{FilmId, UserId};
use crate::error::{AppError, AppResult};
use crate::infrastructure::database::{EntityStore, FriendshipStore, LikesStore};
use crate::infrastructure::id_generator::IdSequence;
use crate::models::{Entity, Film, User};
use crate::services::ranking;

#[derive(Default)]
struct MemoryState {
    users: BTreeMap<UserId, User>,
    films: BTreeMap<FilmId, Film>,
    friends: BTreeMap<UserId, BTreeMap<UserId, bool>>,
    likes: BTreeMap<FilmId, Vec<UserId>>,
}

impl MemoryState {
    fn require_user(&self, id: UserId) -> AppResult<()> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("User {} not found", id)))
        }
    }

    fn require_film(&self, id: FilmId) -> AppResult<()> {
        if self.films.contains_key(&id) {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Film {} not found", id)))
        }
    }
}

pub struct MemoryDatabase {
    state: RwLock<MemoryState>,
    user_ids: IdSequence,
    film_ids: IdSequence,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
            user_ids: IdSequence::new(),
            film_ids: IdSequence::new(),
        }
    }
}

impl Default for MemoryDatabase {
    fn default() -> Self {
        Self::new()
    }
}

fn stored_user(user: &User, id: UserId) -> User {
    User {
        id: Some(id),
        friends: BTreeMap::new(),
        ..user.clone()
    }
}

fn stored_film(film: &Film, id: FilmId) -> Film {
    Film {
        id: Some(id),
        likes: Vec::new(),
        ..film.clone()
    }
}

#[async_trait]
impl EntityStore<User> for MemoryDatabase {
    async fn put(&self, user: &User) -> AppResult<UserId> {
        let id = UserId::new(self.user_ids.next_id());
        self.state.write().await.users.insert(id, stored_user(user, id));
        Ok(id)
    }

    async fn get(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn update(&self, user: &User) -> AppResult<bool> {
        let id = user
            .id
            .ok_or_else(|| AppError::InvalidArgument(format!("{} id is required for update", User::KIND)))?;
        let mut state = self.state.write().await;
        match state.users.get_mut(&id) {
            Some(slot) => {
                *slot = stored_user(user, id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: UserId) -> AppResult<bool> {
        let mut state = self.state.write().await;
        if state.users.remove(&id).is_none() {
            return Ok(false);
        }

        state.friends.remove(&id);
        for edges in state.friends.values_mut() {
            edges.remove(&id);
        }
        state.friends.retain(|_, edges| !edges.is_empty());
        for likers in state.likes.values_mut() {
            likers.retain(|liker| *liker != id);
        }
        state.likes.retain(|_, likers| !likers.is_empty());
        Ok(true)
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        Ok(self.state.read().await.users.values().cloned().collect())
    }

    async fn exists(&self, id: UserId) -> AppResult<bool> {
        Ok(self.state.read().await.users.contains_key(&id))
    }
}

#[async_trait]
impl EntityStore<Film> for MemoryDatabase {
    async fn put(&self, film: &Film) -> AppResult<FilmId> {
        let id = FilmId::new(self.film_ids.next_id());
        self.state.write().await.films.insert(id, stored_film(film, id));
        Ok(id)
    }

    async fn get(&self, id: FilmId) -> AppResult<Option<Film>> {
        Ok(self.state.read().await.films.get(&id).cloned())
    }

    async fn update(&self, film: &Film) -> AppResult<bool> {
        let id = film
            .id
            .ok_or_else(|| AppError::InvalidArgument(format!("{} id is required for update", Film::KIND)))?;
        let mut state = self.state.write().await;
        match state.films.get_mut(&id) {
            Some(slot) => {
                *slot = stored_film(film, id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: FilmId) -> AppResult<bool> {
        let mut state = self.state.write().await;
        if state.films.remove(&id).is_none() {
            return Ok(false);
        }
        state.likes.remove(&id);
        Ok(true)
    }

    async fn list(&self) -> AppResult<Vec<Film>> {
        Ok(self.state.read().await.films.values().cloned().collect())
    }

    async fn exists(&self, id: FilmId) -> AppResult<bool> {
        Ok(self.state.read().await.films.contains_key(&id))
    }
}

#[async_trait]
impl FriendshipStore for MemoryDatabase {
    async fn add_edge(&self, user_id: UserId, friend_id: UserId) -> AppResult<bool> {
        let mut state = self.state.write().await;
        state.require_user(user_id)?;
        state.require_user(friend_id)?;

        let edges = state.friends.entry(user_id).or_default();
        if edges.contains_key(&friend_id) {
            return Ok(false);
        }
        edges.insert(friend_id, false);
        Ok(true)
    }

    async fn remove_edge(&self, user_id: UserId, friend_id: UserId) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let removed = match state.friends.get_mut(&user_id) {
            Some(edges) => edges.remove(&friend_id).is_some(),
            None => false,
        };
        if state.friends.get(&user_id).is_some_and(|edges| edges.is_empty()) {
            state.friends.remove(&user_id);
        }
        Ok(removed)
    }

    async fn edges(&self, user_id: UserId) -> AppResult<BTreeMap<UserId, bool>> {
        Ok(self
            .state
            .read()
            .await
            .friends
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn confirm(&self, user_id: UserId, friend_id: UserId) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let has_edge = |state: &MemoryState, from: UserId, to: UserId| {
            state
                .friends
                .get(&from)
                .is_some_and(|edges| edges.contains_key(&to))
        };
        if !has_edge(&*state, user_id, friend_id) || !has_edge(&*state, friend_id, user_id) {
            return Ok(false);
        }

        for (from, to) in [(user_id, friend_id), (friend_id, user_id)] {
            if let Some(confirmed) = state.friends.get_mut(&from).and_then(|edges| edges.get_mut(&to)) {
                *confirmed = true;
            }
        }
        Ok(true)
    }

    async fn mutual(&self, user_id: UserId, other_id: UserId) -> AppResult<Vec<UserId>> {
        let state = self.state.read().await;
        let (Some(mine), Some(theirs)) = (state.friends.get(&user_id), state.friends.get(&other_id))
        else {
            return Ok(Vec::new());
        };
        Ok(mine
            .keys()
            .filter(|id| theirs.contains_key(id))
            .copied()
            .collect())
    }
}

#[async_trait]
impl LikesStore for MemoryDatabase {
    async fn add_like(&self, film_id: FilmId, user_id: UserId) -> AppResult<bool> {
        let mut state = self.state.write().await;
        state.require_film(film_id)?;
        state.require_user(user_id)?;

        let likers = state.likes.entry(film_id).or_default();
        if likers.contains(&user_id) {
            return Ok(false);
        }
        likers.push(user_id);
        Ok(true)
    }

    async fn remove_like(&self, film_id: FilmId, user_id: UserId) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let Some(likers) = state.likes.get_mut(&film_id) else {
            return Ok(false);
        };
        let Some(position) = likers.iter().position(|liker| *liker == user_id) else {
            return Ok(false);
        };
        likers.remove(position);
        if likers.is_empty() {
            state.likes.remove(&film_id);
        }
        Ok(true)
    }

    async fn likes_of(&self, film_id: FilmId) -> AppResult<Vec<UserId>> {
        Ok(self
            .state
            .read()
            .await
            .likes
            .get(&film_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn top_film_ids(&self, count: usize) -> AppResult<Vec<FilmId>> {
        let state = self.state.read().await;
        let tallies = state
            .likes
            .iter()
            .map(|(film_id, likers)| (*film_id, likers.len()));
        Ok(ranking::top_k(tallies, count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn user(login: &str) -> User {
        User::new(
            &format!("{}@example.com", login),
            login,
            None,
            NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_user_delete_leaves_no_empty_edge_maps() {
        let db = MemoryDatabase::new();
        let a = db.put(&user("a")).await.unwrap();
        let b = db.put(&user("b")).await.unwrap();
        let c = db.put(&user("c")).await.unwrap();

        db.add_edge(b, a).await.unwrap();
        db.add_edge(c, a).await.unwrap();
        db.add_edge(c, b).await.unwrap();

        assert!(EntityStore::<User>::delete(&db, a).await.unwrap());

        let state = db.state.read().await;
        assert!(!state.friends.contains_key(&a));
        assert!(!state.friends.contains_key(&b));
        assert_eq!(state.friends.get(&c).map(|edges| edges.len()), Some(1));
    }

    #[tokio::test]
    async fn test_removing_last_edge_drops_the_map() {
        let db = MemoryDatabase::new();
        let a = db.put(&user("a")).await.unwrap();
        let b = db.put(&user("b")).await.unwrap();

        db.add_edge(a, b).await.unwrap();
        assert!(db.remove_edge(a, b).await.unwrap());
        assert!(db.state.read().await.friends.is_empty());
    }
}
