pub mod identity;
pub mod payment;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Internal service error: {0}")]
    InternalError(String),
    #[error("Identity verification failed: {0}")]
    IdentityError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
