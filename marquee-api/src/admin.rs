use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use marquee_catalog::{HallConfig, HallRow, Movie, Show};
use marquee_ledger::analytics;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/admin/halls", post(create_hall))
        .route("/v1/admin/movies", post(create_movie))
        .route("/v1/admin/shows", post(create_show))
        .route("/v1/admin/shows/{show_id}/cancel", post(cancel_show))
        .route("/v1/admin/bookings", get(list_bookings))
        .route("/v1/admin/dashboard", get(dashboard))
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct CreateHallRequest {
    name: String,
    rows: Vec<HallRowSpec>,
}

#[derive(Debug, Deserialize)]
struct HallRowSpec {
    label: String,
    seat_count: u32,
}

#[derive(Debug, Deserialize)]
struct CreateMovieRequest {
    title: String,
    overview: Option<String>,
    poster_path: Option<String>,
    runtime_minutes: Option<u32>,
    #[serde(default)]
    genres: Vec<String>,
    vote_average: Option<f64>,
    release_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct CreateShowRequest {
    movie_id: Uuid,
    hall_id: Uuid,
    starts_at: DateTime<Utc>,
    price_cents: i32,
}

/// Flat projection for the admin booking table, with catalog names joined
/// in so the console does not chase ids.
#[derive(Debug, Serialize)]
struct AdminBookingRow {
    id: Uuid,
    booking_reference: String,
    customer_email: String,
    movie_title: String,
    hall_name: String,
    show_starts_at: Option<DateTime<Utc>>,
    seat_ids: Vec<String>,
    amount_cents: i32,
    payment_state: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct DashboardResponse {
    total_bookings: usize,
    total_revenue_cents: i64,
    unique_customers: usize,
    active_shows: usize,
    daily: Vec<analytics::DailyStat>,
}

// ============================================================================
// Handlers
// ============================================================================

async fn create_hall(
    State(state): State<AppState>,
    Json(req): Json<CreateHallRequest>,
) -> Result<Json<HallConfig>, AppError> {
    let hall = HallConfig::new(
        req.name,
        req.rows
            .into_iter()
            .map(|row| HallRow {
                label: row.label,
                seat_count: row.seat_count,
            })
            .collect(),
    );
    let hall = state.catalog.add_hall(hall)?;
    Ok(Json(hall))
}

async fn create_movie(
    State(state): State<AppState>,
    Json(req): Json<CreateMovieRequest>,
) -> Result<Json<Movie>, AppError> {
    let mut movie = Movie::new(req.title);
    movie.overview = req.overview;
    movie.poster_path = req.poster_path;
    movie.runtime_minutes = req.runtime_minutes;
    movie.genres = req.genres;
    movie.vote_average = req.vote_average;
    movie.release_date = req.release_date;
    Ok(Json(state.catalog.add_movie(movie)))
}

async fn create_show(
    State(state): State<AppState>,
    Json(req): Json<CreateShowRequest>,
) -> Result<Json<Show>, AppError> {
    let show = state
        .catalog
        .create_show(req.movie_id, req.hall_id, req.starts_at, req.price_cents)?;
    Ok(Json(show))
}

async fn cancel_show(
    State(state): State<AppState>,
    Path(show_id): Path<Uuid>,
) -> Result<Json<Show>, AppError> {
    let show = state.catalog.cancel_show(&show_id)?;
    tracing::info!(%show_id, "show cancelled");
    Ok(Json(show))
}

async fn list_bookings(State(state): State<AppState>) -> Json<Vec<AdminBookingRow>> {
    let rows = state
        .ledger
        .list_all()
        .into_iter()
        .map(|booking| {
            let show = state.catalog.get_show(&booking.show_id);
            let movie_title = show
                .as_ref()
                .and_then(|s| state.catalog.get_movie(&s.movie_id))
                .map(|m| m.title)
                .unwrap_or_else(|| "Unknown".to_string());
            let hall_name = show
                .as_ref()
                .and_then(|s| state.catalog.get_hall(&s.hall_id))
                .map(|h| h.name)
                .unwrap_or_else(|| "Unknown".to_string());

            AdminBookingRow {
                id: booking.id,
                booking_reference: booking.reference(),
                customer_email: booking.customer_email.clone(),
                movie_title,
                hall_name,
                show_starts_at: show.map(|s| s.starts_at),
                seat_ids: booking.seat_ids.clone(),
                amount_cents: booking.amount_cents,
                payment_state: booking.payment_state.as_str().to_string(),
                created_at: booking.created_at,
            }
        })
        .collect();
    Json(rows)
}

async fn dashboard(State(state): State<AppState>) -> Json<DashboardResponse> {
    let stats = analytics::dashboard_stats(&state.ledger);
    let active_shows = state
        .catalog
        .list_shows()
        .iter()
        .filter(|s| s.is_active())
        .count();

    Json(DashboardResponse {
        total_bookings: stats.total_bookings,
        total_revenue_cents: stats.total_revenue_cents,
        unique_customers: stats.unique_customers,
        active_shows,
        daily: stats.daily,
    })
}
