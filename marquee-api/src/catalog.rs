use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use marquee_catalog::{HallConfig, Movie, Review, Show};
use serde::Serialize;
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/movies", get(list_movies))
        .route("/v1/movies/{movie_id}", get(get_movie))
        .route("/v1/movies/{movie_id}/reviews", get(list_reviews))
        .route("/v1/shows", get(list_shows))
        .route("/v1/shows/{show_id}", get(get_show))
        .route("/v1/shows/{show_id}/occupied-seats", get(occupied_seats))
        .route("/v1/halls/{hall_id}/seat-map", get(seat_map))
}

#[derive(Debug, Serialize)]
struct MovieResponse {
    #[serde(flatten)]
    movie: Movie,
    average_rating: Option<f64>,
}

#[derive(Debug, Serialize)]
struct ShowDetailResponse {
    #[serde(flatten)]
    show: Show,
    movie_title: Option<String>,
    hall_name: Option<String>,
}

#[derive(Debug, Serialize)]
struct SeatMapResponse {
    hall_id: Uuid,
    seats: Vec<String>,
}

#[derive(Debug, Serialize)]
struct OccupiedSeatsResponse {
    show_id: Uuid,
    occupied: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ReviewsResponse {
    reviews: Vec<Review>,
    average_rating: Option<f64>,
}

async fn list_movies(State(state): State<AppState>) -> Json<Vec<MovieResponse>> {
    let movies = state
        .catalog
        .list_movies()
        .into_iter()
        .map(|movie| {
            let average_rating = state.reviews.average_rating(movie.id);
            MovieResponse {
                movie,
                average_rating,
            }
        })
        .collect();
    Json(movies)
}

async fn get_movie(
    State(state): State<AppState>,
    Path(movie_id): Path<Uuid>,
) -> Result<Json<MovieResponse>, AppError> {
    let movie = state
        .catalog
        .get_movie(&movie_id)
        .ok_or_else(|| AppError::NotFoundError(format!("Movie not found: {}", movie_id)))?;
    let average_rating = state.reviews.average_rating(movie.id);
    Ok(Json(MovieResponse {
        movie,
        average_rating,
    }))
}

async fn list_reviews(
    State(state): State<AppState>,
    Path(movie_id): Path<Uuid>,
) -> Result<Json<ReviewsResponse>, AppError> {
    if state.catalog.get_movie(&movie_id).is_none() {
        return Err(AppError::NotFoundError(format!(
            "Movie not found: {}",
            movie_id
        )));
    }
    Ok(Json(ReviewsResponse {
        reviews: state.reviews.list_for_movie(movie_id),
        average_rating: state.reviews.average_rating(movie_id),
    }))
}

async fn list_shows(State(state): State<AppState>) -> Json<Vec<ShowDetailResponse>> {
    let shows = state
        .catalog
        .list_shows()
        .into_iter()
        .map(|show| detail(&state, show))
        .collect();
    Json(shows)
}

async fn get_show(
    State(state): State<AppState>,
    Path(show_id): Path<Uuid>,
) -> Result<Json<ShowDetailResponse>, AppError> {
    let show = state
        .catalog
        .get_show(&show_id)
        .ok_or_else(|| AppError::NotFoundError(format!("Show not found: {}", show_id)))?;
    Ok(Json(detail(&state, show)))
}

fn detail(state: &AppState, show: Show) -> ShowDetailResponse {
    let movie_title = state.catalog.get_movie(&show.movie_id).map(|m| m.title);
    let hall_name = state
        .catalog
        .get_hall(&show.hall_id)
        .map(|h: HallConfig| h.name);
    ShowDetailResponse {
        show,
        movie_title,
        hall_name,
    }
}

/// Current occupancy for rendering the seat picker. Never served from a
/// cache; the engine prunes expired holds on the way out.
async fn occupied_seats(
    State(state): State<AppState>,
    Path(show_id): Path<Uuid>,
) -> Result<Json<OccupiedSeatsResponse>, AppError> {
    if state.catalog.get_show(&show_id).is_none() {
        return Err(AppError::NotFoundError(format!(
            "Show not found: {}",
            show_id
        )));
    }
    let mut occupied: Vec<String> = state.engine.occupied_seats(&show_id).into_iter().collect();
    occupied.sort();
    Ok(Json(OccupiedSeatsResponse { show_id, occupied }))
}

async fn seat_map(
    State(state): State<AppState>,
    Path(hall_id): Path<Uuid>,
) -> Result<Json<SeatMapResponse>, AppError> {
    let seats = state.catalog.seat_map(&hall_id)?;
    Ok(Json(SeatMapResponse { hall_id, seats }))
}
