use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use marquee_catalog::CatalogError;
use marquee_ledger::LedgerError;
use marquee_reserve::ReserveError;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    AuthorizationError(String),
    ValidationError(String),
    NotFoundError(String),
    PaymentFailed(String),
    Reserve(ReserveError),
    Catalog(CatalogError),
    Ledger(LedgerError),
    InternalServerError(String),
    Anyhow(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, message, seats) = match self {
            AppError::AuthenticationError(msg) => {
                (StatusCode::UNAUTHORIZED, "AUTHENTICATION", msg, None)
            }
            AppError::AuthorizationError(msg) => {
                (StatusCode::FORBIDDEN, "AUTHORIZATION", msg, None)
            }
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, "VALIDATION", msg, None),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None),
            AppError::PaymentFailed(msg) => {
                (StatusCode::PAYMENT_REQUIRED, "PAYMENT_FAILED", msg, None)
            }
            AppError::Reserve(err) => return reserve_response(err),
            AppError::Catalog(err) => return catalog_response(err),
            AppError::Ledger(err) => return ledger_response(err),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "Internal Server Error".to_string(),
                    None,
                )
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "Internal Server Error".to_string(),
                    None,
                )
            }
        };

        error_body(status, kind, &message, seats)
    }
}

/// Reservation failures carry seat-level detail so clients can re-render
/// the exact contested seats instead of guessing.
fn reserve_response(err: ReserveError) -> Response {
    let message = err.to_string();
    match err {
        ReserveError::SeatUnavailable { seats } => error_body(
            StatusCode::CONFLICT,
            "SEAT_UNAVAILABLE",
            &message,
            Some(seats),
        ),
        ReserveError::UnknownSeats { seats } => error_body(
            StatusCode::BAD_REQUEST,
            "UNKNOWN_SEATS",
            &message,
            Some(seats),
        ),
        ReserveError::HoldExpired => error_body(StatusCode::GONE, "HOLD_EXPIRED", &message, None),
        ReserveError::HoldNotFound => {
            error_body(StatusCode::NOT_FOUND, "HOLD_NOT_FOUND", &message, None)
        }
        ReserveError::HoldOwnership => {
            error_body(StatusCode::FORBIDDEN, "AUTHORIZATION", &message, None)
        }
        ReserveError::ShowNotFound(_) => {
            error_body(StatusCode::NOT_FOUND, "NOT_FOUND", &message, None)
        }
        ReserveError::ShowNotActive(_) => {
            error_body(StatusCode::CONFLICT, "SHOW_NOT_ACTIVE", &message, None)
        }
        ReserveError::EmptySeatSet
        | ReserveError::TooManySeats { .. }
        | ReserveError::DuplicateSeat(_) => {
            error_body(StatusCode::BAD_REQUEST, "VALIDATION", &message, None)
        }
        ReserveError::Catalog(inner) => catalog_response(inner),
        ReserveError::Ledger(inner) => ledger_response(inner),
    }
}

fn catalog_response(err: CatalogError) -> Response {
    let message = err.to_string();
    match err {
        CatalogError::InvalidConfiguration(_) | CatalogError::InvalidPrice(_) => error_body(
            StatusCode::BAD_REQUEST,
            "INVALID_CONFIGURATION",
            &message,
            None,
        ),
        CatalogError::HallNotFound(_)
        | CatalogError::MovieNotFound(_)
        | CatalogError::ShowNotFound(_) => {
            error_body(StatusCode::NOT_FOUND, "NOT_FOUND", &message, None)
        }
    }
}

fn ledger_response(err: LedgerError) -> Response {
    let message = err.to_string();
    match err {
        LedgerError::NotFound(_) => error_body(StatusCode::NOT_FOUND, "NOT_FOUND", &message, None),
        LedgerError::InvalidTransition { .. } => {
            error_body(StatusCode::CONFLICT, "INVALID_TRANSITION", &message, None)
        }
    }
}

fn error_body(
    status: StatusCode,
    kind: &str,
    message: &str,
    seats: Option<Vec<String>>,
) -> Response {
    let body = match seats {
        Some(seats) => Json(json!({
            "error": message,
            "kind": kind,
            "seats": seats,
        })),
        None => Json(json!({
            "error": message,
            "kind": kind,
        })),
    };
    (status, body).into_response()
}

impl From<ReserveError> for AppError {
    fn from(err: ReserveError) -> Self {
        Self::Reserve(err)
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        Self::Catalog(err)
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        Self::Ledger(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Anyhow(err)
    }
}
