use axum::{
    extract::{ConnectInfo, Request, State},
    http::Method,
    middleware::Next,
    response::IntoResponse,
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod admin;
pub mod auth;
pub mod bookings;
pub mod catalog;
pub mod error;
pub mod favorites;
pub mod holds;
pub mod middleware;
pub mod reviews;
pub mod state;
pub mod worker;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    let public = Router::new().merge(auth::routes()).merge(catalog::routes());

    let customer = Router::new()
        .merge(holds::routes())
        .merge(bookings::routes())
        .merge(favorites::routes())
        .merge(reviews::routes())
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::customer_auth_middleware,
        ));

    let admin = Router::new().merge(admin::routes()).route_layer(
        axum::middleware::from_fn_with_state(state.clone(), middleware::admin_auth_middleware),
    );

    let router = Router::new()
        .merge(public)
        .merge(customer)
        .merge(admin)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    // Rate limiting rides on Redis counters; without Redis there is
    // nothing to count against, so the layer is skipped entirely.
    if state.redis.is_some() {
        router.layer(axum::middleware::from_fn_with_state(
            state,
            rate_limit_middleware,
        ))
    } else {
        router
    }
}

async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<impl IntoResponse, impl IntoResponse> {
    let Some(redis) = &state.redis else {
        return Ok(next.run(req).await);
    };
    let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>().copied()
    else {
        return Ok(next.run(req).await);
    };

    let key = format!("ratelimit:{}", addr.ip());
    match redis.check_rate_limit(&key, 100, 60).await {
        Ok(true) => Ok(next.run(req).await),
        Ok(false) => Err((
            axum::http::StatusCode::TOO_MANY_REQUESTS,
            "Rate limit exceeded",
        )),
        Err(_) => Ok(next.run(req).await), // Fail open
    }
}
