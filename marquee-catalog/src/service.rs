use crate::hall::{HallConfig, InvalidConfiguration};
use crate::movie::Movie;
use crate::show::{Show, ShowStatus};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// In-memory catalog of movies, halls and shows. The reservation engine
/// treats this as a read-only collaborator; mutation happens through the
/// admin surface only.
pub struct CatalogService {
    movies: RwLock<HashMap<Uuid, Movie>>,
    halls: RwLock<HashMap<Uuid, HallConfig>>,
    shows: RwLock<HashMap<Uuid, Show>>,
}

impl CatalogService {
    pub fn new() -> Self {
        Self {
            movies: RwLock::new(HashMap::new()),
            halls: RwLock::new(HashMap::new()),
            shows: RwLock::new(HashMap::new()),
        }
    }

    pub fn add_movie(&self, movie: Movie) -> Movie {
        let mut movies = self.movies.write().unwrap();
        movies.insert(movie.id, movie.clone());
        movie
    }

    pub fn get_movie(&self, movie_id: &Uuid) -> Option<Movie> {
        self.movies.read().unwrap().get(movie_id).cloned()
    }

    pub fn list_movies(&self) -> Vec<Movie> {
        let mut movies: Vec<Movie> = self.movies.read().unwrap().values().cloned().collect();
        movies.sort_by(|a, b| a.title.cmp(&b.title));
        movies
    }

    /// Register a hall layout, rejecting malformed configurations up front.
    pub fn add_hall(&self, hall: HallConfig) -> Result<HallConfig, CatalogError> {
        hall.validate()?;
        let mut halls = self.halls.write().unwrap();
        halls.insert(hall.id, hall.clone());
        tracing::info!(hall_id = %hall.id, capacity = hall.capacity(), "hall registered");
        Ok(hall)
    }

    pub fn get_hall(&self, hall_id: &Uuid) -> Option<HallConfig> {
        self.halls.read().unwrap().get(hall_id).cloned()
    }

    pub fn seat_map(&self, hall_id: &Uuid) -> Result<Vec<String>, CatalogError> {
        let hall = self
            .get_hall(hall_id)
            .ok_or_else(|| CatalogError::HallNotFound(hall_id.to_string()))?;
        Ok(hall.seat_map()?)
    }

    /// Schedule a screening. Movie and hall must already exist.
    pub fn create_show(
        &self,
        movie_id: Uuid,
        hall_id: Uuid,
        starts_at: DateTime<Utc>,
        price_cents: i32,
    ) -> Result<Show, CatalogError> {
        if price_cents <= 0 {
            return Err(CatalogError::InvalidPrice(price_cents));
        }
        if self.get_movie(&movie_id).is_none() {
            return Err(CatalogError::MovieNotFound(movie_id.to_string()));
        }
        if self.get_hall(&hall_id).is_none() {
            return Err(CatalogError::HallNotFound(hall_id.to_string()));
        }

        let show = Show::new(movie_id, hall_id, starts_at, price_cents);
        let mut shows = self.shows.write().unwrap();
        shows.insert(show.id, show.clone());
        tracing::info!(show_id = %show.id, %movie_id, %hall_id, "show scheduled");
        Ok(show)
    }

    pub fn get_show(&self, show_id: &Uuid) -> Option<Show> {
        self.shows.read().unwrap().get(show_id).cloned()
    }

    pub fn list_shows(&self) -> Vec<Show> {
        let mut shows: Vec<Show> = self.shows.read().unwrap().values().cloned().collect();
        shows.sort_by(|a, b| a.starts_at.cmp(&b.starts_at));
        shows
    }

    /// Soft-cancel. The record stays so existing bookings keep a valid
    /// show reference.
    pub fn cancel_show(&self, show_id: &Uuid) -> Result<Show, CatalogError> {
        self.transition_show(show_id, ShowStatus::Cancelled)
    }

    pub fn complete_show(&self, show_id: &Uuid) -> Result<Show, CatalogError> {
        self.transition_show(show_id, ShowStatus::Completed)
    }

    fn transition_show(&self, show_id: &Uuid, status: ShowStatus) -> Result<Show, CatalogError> {
        let mut shows = self.shows.write().unwrap();
        let show = shows
            .get_mut(show_id)
            .ok_or_else(|| CatalogError::ShowNotFound(show_id.to_string()))?;
        show.set_status(status);
        Ok(show.clone())
    }

    /// Seat map of the hall the show is scheduled in.
    pub fn seat_map_for_show(&self, show_id: &Uuid) -> Result<Vec<String>, CatalogError> {
        let show = self
            .get_show(show_id)
            .ok_or_else(|| CatalogError::ShowNotFound(show_id.to_string()))?;
        self.seat_map(&show.hall_id)
    }
}

impl Default for CatalogService {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Invalid hall configuration: {0}")]
    InvalidConfiguration(#[from] InvalidConfiguration),

    #[error("Hall not found: {0}")]
    HallNotFound(String),

    #[error("Movie not found: {0}")]
    MovieNotFound(String),

    #[error("Show not found: {0}")]
    ShowNotFound(String),

    #[error("Price must be positive, got {0}")]
    InvalidPrice(i32),
}
