mod common;

use common::{backends, film, user};
use filmgraph::core::{FilmId, UserId};
use filmgraph::AppError;

#[tokio::test]
async fn test_put_assigns_distinct_positive_ids() {
    for (backend, storage) in backends().await {
        let a = storage.users.put(&user("alice")).await.unwrap();
        let b = storage.users.put(&user("bob")).await.unwrap();
        assert!(a.is_valid() && b.is_valid(), "{}", backend);
        assert_ne!(a, b, "{}", backend);

        let stored = storage.users.get(a).await.unwrap().unwrap();
        assert_eq!(stored.id, Some(a), "{}", backend);
        assert_eq!(stored.login, "alice", "{}", backend);
    }
}

#[tokio::test]
async fn test_get_missing_is_none() {
    for (backend, storage) in backends().await {
        assert!(storage.users.get(UserId::new(99)).await.unwrap().is_none(), "{}", backend);
        assert!(storage.films.get(FilmId::new(99)).await.unwrap().is_none(), "{}", backend);
        assert!(!storage.users.exists(UserId::new(99)).await.unwrap(), "{}", backend);
    }
}

#[tokio::test]
async fn test_update_replaces_fields_and_reports_missing() {
    for (backend, storage) in backends().await {
        let id = storage.films.put(&film("Matrix")).await.unwrap();

        let mut changed = storage.films.get(id).await.unwrap().unwrap();
        changed.name = "The Matrix".into();
        changed.genres = filmgraph::models::Genre::find(6).into_iter().collect();
        assert!(storage.films.update(&changed).await.unwrap(), "{}", backend);

        let stored = storage.films.get(id).await.unwrap().unwrap();
        assert_eq!(stored.name, "The Matrix", "{}", backend);
        assert_eq!(stored.genres.len(), 1, "{}", backend);
        assert_eq!(stored.genres[0].name, "Action", "{}", backend);

        changed.id = Some(FilmId::new(1000));
        assert!(!storage.films.update(&changed).await.unwrap(), "{}", backend);
    }
}

#[tokio::test]
async fn test_list_is_ordered_by_id() {
    for (backend, storage) in backends().await {
        for login in ["carol", "alice", "bob"] {
            storage.users.put(&user(login)).await.unwrap();
        }
        let logins: Vec<String> = storage
            .users
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.login)
            .collect();
        assert_eq!(logins, vec!["carol", "alice", "bob"], "{}", backend);
    }
}

#[tokio::test]
async fn test_friend_edges_are_directed() {
    for (backend, storage) in backends().await {
        let a = storage.users.put(&user("a")).await.unwrap();
        let b = storage.users.put(&user("b")).await.unwrap();

        assert!(storage.friendships.add_edge(a, b).await.unwrap(), "{}", backend);
        assert!(!storage.friendships.add_edge(a, b).await.unwrap(), "{}", backend);

        assert_eq!(storage.friendships.edges(a).await.unwrap().get(&b), Some(&false));
        assert!(storage.friendships.edges(b).await.unwrap().is_empty(), "{}", backend);

        assert!(storage.friendships.remove_edge(a, b).await.unwrap(), "{}", backend);
        assert!(!storage.friendships.remove_edge(a, b).await.unwrap(), "{}", backend);
    }
}

#[tokio::test]
async fn test_edge_to_missing_user_is_not_found() {
    for (backend, storage) in backends().await {
        let a = storage.users.put(&user("a")).await.unwrap();
        let result = storage.friendships.add_edge(a, UserId::new(404)).await;
        assert!(matches!(result, Err(AppError::NotFound(_))), "{}: {:?}", backend, result);

        let result = storage.likes.add_like(FilmId::new(404), a).await;
        assert!(matches!(result, Err(AppError::NotFound(_))), "{}: {:?}", backend, result);
    }
}

#[tokio::test]
async fn test_confirm_needs_both_directions() {
    for (backend, storage) in backends().await {
        let a = storage.users.put(&user("a")).await.unwrap();
        let b = storage.users.put(&user("b")).await.unwrap();

        storage.friendships.add_edge(a, b).await.unwrap();
        assert!(!storage.friendships.confirm(a, b).await.unwrap(), "{}", backend);
        assert_eq!(storage.friendships.edges(a).await.unwrap()[&b], false);

        storage.friendships.add_edge(b, a).await.unwrap();
        assert!(storage.friendships.confirm(b, a).await.unwrap(), "{}", backend);
        assert_eq!(storage.friendships.edges(a).await.unwrap()[&b], true);
        assert_eq!(storage.friendships.edges(b).await.unwrap()[&a], true);
    }
}

#[tokio::test]
async fn test_mutual_is_intersection_in_id_order() {
    for (backend, storage) in backends().await {
        let mut ids = Vec::new();
        for login in ["a", "b", "c", "d", "e", "f"] {
            ids.push(storage.users.put(&user(login)).await.unwrap());
        }
        let [a, b, c, d, e, f] = [ids[0], ids[1], ids[2], ids[3], ids[4], ids[5]];

        for friend in [d, b, c] {
            storage.friendships.add_edge(a, friend).await.unwrap();
        }
        for friend in [f, d, c] {
            storage.friendships.add_edge(e, friend).await.unwrap();
        }

        assert_eq!(storage.friendships.mutual(a, e).await.unwrap(), vec![c, d], "{}", backend);
        assert_eq!(storage.friendships.mutual(e, a).await.unwrap(), vec![c, d], "{}", backend);
        assert!(storage.friendships.mutual(a, f).await.unwrap().is_empty(), "{}", backend);
    }
}

#[tokio::test]
async fn test_likes_keep_insertion_order() {
    for (backend, storage) in backends().await {
        let film_id = storage.films.put(&film("Heat")).await.unwrap();
        let mut users = Vec::new();
        for login in ["x", "y", "z"] {
            users.push(storage.users.put(&user(login)).await.unwrap());
        }

        for liker in [users[2], users[0], users[1]] {
            assert!(storage.likes.add_like(film_id, liker).await.unwrap(), "{}", backend);
        }
        assert!(!storage.likes.add_like(film_id, users[0]).await.unwrap(), "{}", backend);

        assert_eq!(
            storage.likes.likes_of(film_id).await.unwrap(),
            vec![users[2], users[0], users[1]],
            "{}",
            backend
        );

        assert!(storage.likes.remove_like(film_id, users[0]).await.unwrap(), "{}", backend);
        assert!(!storage.likes.remove_like(film_id, users[0]).await.unwrap(), "{}", backend);
        assert_eq!(
            storage.likes.likes_of(film_id).await.unwrap(),
            vec![users[2], users[1]],
            "{}",
            backend
        );
    }
}

#[tokio::test]
async fn test_top_film_ids_ranks_by_likes_then_id() {
    for (backend, storage) in backends().await {
        let mut films = Vec::new();
        for name in ["F1", "F2", "F3", "F4"] {
            films.push(storage.films.put(&film(name)).await.unwrap());
        }
        let mut users = Vec::new();
        for login in ["u1", "u2", "u3"] {
            users.push(storage.users.put(&user(login)).await.unwrap());
        }

        // F1: 1 like, F2: 3 likes, F3: 1 like, F4: none
        storage.likes.add_like(films[0], users[0]).await.unwrap();
        for liker in &users {
            storage.likes.add_like(films[1], *liker).await.unwrap();
        }
        storage.likes.add_like(films[2], users[1]).await.unwrap();

        assert_eq!(
            storage.likes.top_film_ids(2).await.unwrap(),
            vec![films[1], films[0]],
            "{}",
            backend
        );
        assert_eq!(
            storage.likes.top_film_ids(10).await.unwrap(),
            vec![films[1], films[0], films[2]],
            "{}",
            backend
        );
        assert!(storage.likes.top_film_ids(0).await.unwrap().is_empty(), "{}", backend);
    }
}

#[tokio::test]
async fn test_deleting_user_cascades_edges_and_likes() {
    for (backend, storage) in backends().await {
        let a = storage.users.put(&user("a")).await.unwrap();
        let b = storage.users.put(&user("b")).await.unwrap();
        let film_id = storage.films.put(&film("Ran")).await.unwrap();

        storage.friendships.add_edge(a, b).await.unwrap();
        storage.friendships.add_edge(b, a).await.unwrap();
        storage.likes.add_like(film_id, a).await.unwrap();
        storage.likes.add_like(film_id, b).await.unwrap();

        assert!(storage.users.delete(a).await.unwrap(), "{}", backend);
        assert!(!storage.users.delete(a).await.unwrap(), "{}", backend);

        assert!(storage.friendships.edges(b).await.unwrap().is_empty(), "{}", backend);
        assert!(storage.friendships.edges(a).await.unwrap().is_empty(), "{}", backend);
        assert_eq!(storage.likes.likes_of(film_id).await.unwrap(), vec![b], "{}", backend);
    }
}

#[tokio::test]
async fn test_deleting_film_drops_its_likes() {
    for (backend, storage) in backends().await {
        let a = storage.users.put(&user("a")).await.unwrap();
        let film_id = storage.films.put(&film("Ran").with_genres(&[2])).await.unwrap();
        storage.likes.add_like(film_id, a).await.unwrap();

        assert!(storage.films.delete(film_id).await.unwrap(), "{}", backend);
        assert!(storage.likes.likes_of(film_id).await.unwrap().is_empty(), "{}", backend);
        assert!(storage.likes.top_film_ids(5).await.unwrap().is_empty(), "{}", backend);
    }
}

#[tokio::test]
async fn test_like_given_again_moves_to_the_end() {
    for (backend, storage) in backends().await {
        let film_id = storage.films.put(&film("Heat")).await.unwrap();
        let a = storage.users.put(&user("a")).await.unwrap();
        let b = storage.users.put(&user("b")).await.unwrap();

        storage.likes.add_like(film_id, a).await.unwrap();
        storage.likes.add_like(film_id, b).await.unwrap();
        storage.likes.remove_like(film_id, a).await.unwrap();
        storage.likes.add_like(film_id, a).await.unwrap();

        assert_eq!(storage.likes.likes_of(film_id).await.unwrap(), vec![b, a], "{}", backend);
    }
}
