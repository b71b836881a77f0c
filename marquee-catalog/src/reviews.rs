use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub user_id: String,
    pub movie_id: Uuid,
    pub rating: u8,
    pub comment: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Per-movie user reviews. One review per (user, movie); posting again
/// replaces the earlier one.
pub struct ReviewBoard {
    reviews: RwLock<HashMap<(String, Uuid), Review>>,
}

impl ReviewBoard {
    pub fn new() -> Self {
        Self {
            reviews: RwLock::new(HashMap::new()),
        }
    }

    pub fn upsert(
        &self,
        user_id: &str,
        movie_id: Uuid,
        rating: u8,
        comment: Option<String>,
    ) -> Result<Review, ReviewError> {
        if !(1..=5).contains(&rating) {
            return Err(ReviewError::RatingOutOfRange(rating));
        }

        let review = Review {
            user_id: user_id.to_string(),
            movie_id,
            rating,
            comment,
            updated_at: Utc::now(),
        };
        self.reviews
            .write()
            .unwrap()
            .insert((user_id.to_string(), movie_id), review.clone());
        Ok(review)
    }

    pub fn list_for_movie(&self, movie_id: Uuid) -> Vec<Review> {
        let mut result: Vec<Review> = self
            .reviews
            .read()
            .unwrap()
            .values()
            .filter(|r| r.movie_id == movie_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        result
    }

    pub fn average_rating(&self, movie_id: Uuid) -> Option<f64> {
        let reviews = self.list_for_movie(movie_id);
        if reviews.is_empty() {
            return None;
        }
        let sum: u32 = reviews.iter().map(|r| r.rating as u32).sum();
        Some(sum as f64 / reviews.len() as f64)
    }
}

impl Default for ReviewBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("Rating must be between 1 and 5, got {0}")]
    RatingOutOfRange(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_review_replaces_the_first() {
        let board = ReviewBoard::new();
        let movie_id = Uuid::new_v4();

        board.upsert("user-1", movie_id, 5, None).unwrap();
        board
            .upsert("user-1", movie_id, 3, Some("changed my mind".to_string()))
            .unwrap();

        let reviews = board.list_for_movie(movie_id);
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].rating, 3);
    }

    #[test]
    fn average_spans_users() {
        let board = ReviewBoard::new();
        let movie_id = Uuid::new_v4();

        board.upsert("user-1", movie_id, 4, None).unwrap();
        board.upsert("user-2", movie_id, 2, None).unwrap();

        assert_eq!(board.average_rating(movie_id), Some(3.0));
        assert_eq!(board.average_rating(Uuid::new_v4()), None);
    }

    #[test]
    fn out_of_range_rating_is_rejected() {
        let board = ReviewBoard::new();
        let err = board.upsert("user-1", Uuid::new_v4(), 6, None).unwrap_err();
        assert!(matches!(err, ReviewError::RatingOutOfRange(6)));
    }
}
