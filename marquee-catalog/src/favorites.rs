use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Favorite {
    pub user_id: String,
    pub movie_id: Uuid,
    pub added_at: DateTime<Utc>,
}

/// Many-to-many user/movie association. Uniqueness is enforced on the
/// (user, movie) pair by keying the map on it.
pub struct FavoriteStore {
    favorites: RwLock<HashMap<(String, Uuid), Favorite>>,
}

impl FavoriteStore {
    pub fn new() -> Self {
        Self {
            favorites: RwLock::new(HashMap::new()),
        }
    }

    /// Returns false when the pair already existed.
    pub fn add(&self, user_id: &str, movie_id: Uuid) -> bool {
        let mut favorites = self.favorites.write().unwrap();
        let key = (user_id.to_string(), movie_id);
        if favorites.contains_key(&key) {
            return false;
        }
        favorites.insert(
            key,
            Favorite {
                user_id: user_id.to_string(),
                movie_id,
                added_at: Utc::now(),
            },
        );
        true
    }

    pub fn remove(&self, user_id: &str, movie_id: Uuid) -> bool {
        self.favorites
            .write()
            .unwrap()
            .remove(&(user_id.to_string(), movie_id))
            .is_some()
    }

    /// Flips the association. Returns true when the movie ends up
    /// favorited.
    pub fn toggle(&self, user_id: &str, movie_id: Uuid) -> bool {
        if self.remove(user_id, movie_id) {
            false
        } else {
            self.add(user_id, movie_id)
        }
    }

    pub fn is_favorited(&self, user_id: &str, movie_id: Uuid) -> bool {
        self.favorites
            .read()
            .unwrap()
            .contains_key(&(user_id.to_string(), movie_id))
    }

    pub fn list_for_user(&self, user_id: &str) -> Vec<Favorite> {
        let mut result: Vec<Favorite> = self
            .favorites
            .read()
            .unwrap()
            .values()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.added_at.cmp(&a.added_at));
        result
    }
}

impl Default for FavoriteStore {
    fn default() -> Self {
        Self::new()
    }
}
