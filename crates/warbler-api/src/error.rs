use axum::http::StatusCode;
use tracing::error;
use warbler_db::StoreError;

/// Map storage errors onto HTTP status codes at the edge. The typed
/// variants stay distinguishable; anything else is a 500.
pub fn store_status(e: StoreError) -> StatusCode {
    match e {
        StoreError::Validation(_) => StatusCode::BAD_REQUEST,
        StoreError::UniqueViolation(_) | StoreError::DuplicateEdge => StatusCode::CONFLICT,
        StoreError::Unauthorized => StatusCode::FORBIDDEN,
        StoreError::NotFound => StatusCode::NOT_FOUND,
        StoreError::Storage(_) | StoreError::Internal(_) => {
            error!("storage failure: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
