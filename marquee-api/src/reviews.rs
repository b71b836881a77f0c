use axum::{
    extract::{Path, State},
    routing::put,
    Extension, Json, Router,
};
use marquee_catalog::Review;
use marquee_core::identity::UserIdentity;
use serde::Deserialize;
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/reviews/{movie_id}", put(upsert_review))
}

#[derive(Debug, Deserialize)]
struct UpsertReviewRequest {
    rating: u8,
    comment: Option<String>,
}

/// One review per customer per movie; a second submission replaces the
/// first.
async fn upsert_review(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(movie_id): Path<Uuid>,
    Json(req): Json<UpsertReviewRequest>,
) -> Result<Json<Review>, AppError> {
    if state.catalog.get_movie(&movie_id).is_none() {
        return Err(AppError::NotFoundError(format!(
            "Movie not found: {}",
            movie_id
        )));
    }

    let review = state
        .reviews
        .upsert(&identity.id, movie_id, req.rating, req.comment)
        .map_err(|e| AppError::ValidationError(e.to_string()))?;
    Ok(Json(review))
}
