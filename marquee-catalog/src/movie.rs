use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Read-only catalog record for a film. Marquee never mutates movie
/// metadata outside the admin console.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    pub id: Uuid,
    pub title: String,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub runtime_minutes: Option<u32>,
    pub genres: Vec<String>,
    pub vote_average: Option<f64>,
    pub release_date: Option<chrono::NaiveDate>,
}

impl Movie {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            overview: None,
            poster_path: None,
            runtime_minutes: None,
            genres: Vec::new(),
            vote_average: None,
            release_date: None,
        }
    }
}
