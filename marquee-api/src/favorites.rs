use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use marquee_catalog::Movie;
use marquee_core::identity::UserIdentity;
use serde::Serialize;
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/favorites", get(list_favorites))
        .route("/v1/favorites/{movie_id}", put(add_favorite))
        .route("/v1/favorites/{movie_id}", delete(remove_favorite))
        .route("/v1/favorites/{movie_id}/toggle", post(toggle_favorite))
}

#[derive(Debug, Serialize)]
struct FavoriteResponse {
    movie: Movie,
    added_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct FavoriteStatusResponse {
    movie_id: Uuid,
    favorited: bool,
}

async fn list_favorites(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> Json<Vec<FavoriteResponse>> {
    let favorites = state
        .favorites
        .list_for_user(&identity.id)
        .into_iter()
        .filter_map(|favorite| {
            state
                .catalog
                .get_movie(&favorite.movie_id)
                .map(|movie| FavoriteResponse {
                    movie,
                    added_at: favorite.added_at,
                })
        })
        .collect();
    Json(favorites)
}

async fn add_favorite(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(movie_id): Path<Uuid>,
) -> Result<Json<FavoriteStatusResponse>, AppError> {
    require_movie(&state, &movie_id)?;
    state.favorites.add(&identity.id, movie_id);
    Ok(Json(FavoriteStatusResponse {
        movie_id,
        favorited: true,
    }))
}

async fn remove_favorite(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(movie_id): Path<Uuid>,
) -> Result<Json<FavoriteStatusResponse>, AppError> {
    require_movie(&state, &movie_id)?;
    state.favorites.remove(&identity.id, movie_id);
    Ok(Json(FavoriteStatusResponse {
        movie_id,
        favorited: false,
    }))
}

async fn toggle_favorite(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(movie_id): Path<Uuid>,
) -> Result<Json<FavoriteStatusResponse>, AppError> {
    require_movie(&state, &movie_id)?;
    let favorited = state.favorites.toggle(&identity.id, movie_id);
    Ok(Json(FavoriteStatusResponse {
        movie_id,
        favorited,
    }))
}

fn require_movie(state: &AppState, movie_id: &Uuid) -> Result<(), AppError> {
    if state.catalog.get_movie(movie_id).is_none() {
        return Err(AppError::NotFoundError(format!(
            "Movie not found: {}",
            movie_id
        )));
    }
    Ok(())
}
