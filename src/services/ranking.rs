// Ranking Engine - top films by like count
// Order: more likes first; equal counts keep ascending film id.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::core::FilmId;
use crate::error::{AppError, AppResult};

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct RankKey {
    likes: usize,
    film_id: Reverse<FilmId>,
}

/// Convert a caller-supplied count into a ranking limit
pub fn requested_count(count: i64) -> AppResult<usize> {
    usize::try_from(count).map_err(|_| {
        AppError::InvalidArgument(format!("count must not be negative, got {}", count))
    })
}

/// Bounded top-k over `(film, like count)` tallies. Films with no likes are
/// skipped. Keeps at most `k` candidates in memory at any time.
pub fn top_k<I>(tallies: I, k: usize) -> Vec<FilmId>
where
    I: IntoIterator<Item = (FilmId, usize)>,
{
    if k == 0 {
        return Vec::new();
    }

    let mut heap: BinaryHeap<Reverse<RankKey>> = BinaryHeap::new();
    for (film_id, likes) in tallies {
        if likes == 0 {
            continue;
        }
        heap.push(Reverse(RankKey {
            likes,
            film_id: Reverse(film_id),
        }));
        if heap.len() > k {
            // drops the weakest candidate
            heap.pop();
        }
    }

    heap.into_sorted_vec()
        .into_iter()
        .map(|Reverse(key)| key.film_id.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[i64]) -> Vec<FilmId> {
        raw.iter().copied().map(FilmId::new).collect()
    }

    #[test]
    fn test_orders_by_like_count() {
        let tallies = vec![
            (FilmId::new(1), 4),
            (FilmId::new(2), 3),
            (FilmId::new(3), 2),
            (FilmId::new(4), 6),
        ];
        assert_eq!(top_k(tallies.clone(), 10), ids(&[4, 1, 2, 3]));
        assert_eq!(top_k(tallies.clone(), 2), ids(&[4, 1]));
        assert_eq!(top_k(tallies, 0), ids(&[]));
    }

    #[test]
    fn test_ties_keep_ascending_id() {
        let tallies = vec![
            (FilmId::new(9), 2),
            (FilmId::new(3), 2),
            (FilmId::new(5), 7),
            (FilmId::new(1), 2),
        ];
        assert_eq!(top_k(tallies.clone(), 3), ids(&[5, 1, 3]));
        assert_eq!(top_k(tallies, 10), ids(&[5, 1, 3, 9]));
    }

    #[test]
    fn test_unliked_films_are_not_ranked() {
        let tallies = vec![(FilmId::new(1), 0), (FilmId::new(2), 1)];
        assert_eq!(top_k(tallies, 5), ids(&[2]));
    }

    #[test]
    fn test_requested_count() {
        assert_eq!(requested_count(0).unwrap(), 0);
        assert_eq!(requested_count(10).unwrap(), 10);
        assert!(matches!(requested_count(-1), Err(AppError::InvalidArgument(_))));
    }
}
