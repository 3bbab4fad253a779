//! API error types with HTTP response mapping.

use audit::AuditError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{CartError, DomainError, ProductError};

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Domain logic error.
    Domain(DomainError),
    /// Audit query error.
    Audit(AuditError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Domain(err) => domain_error_to_response(err),
            ApiError::Audit(err) => audit_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, String) {
    if err.is_concurrency_conflict() {
        return (StatusCode::CONFLICT, err.to_string());
    }

    match &err {
        DomainError::Cart(cart_err) => match cart_err {
            CartError::NotCreated | CartError::ItemNotFound { .. } => {
                (StatusCode::NOT_FOUND, err.to_string())
            }
            CartError::CheckedOut { .. } | CartError::AlreadyCreated => {
                (StatusCode::CONFLICT, err.to_string())
            }
            CartError::InvalidQuantity { .. } | CartError::Empty => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
        },
        DomainError::Product(product_err) => match product_err {
            ProductError::NotCreated => (StatusCode::NOT_FOUND, err.to_string()),
            ProductError::AlreadyCreated => (StatusCode::CONFLICT, err.to_string()),
            ProductError::InvalidPrice { .. } | ProductError::InvalidStock { .. } => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
        },
        _ => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

fn audit_error_to_response(err: AuditError) -> (StatusCode, String) {
    match &err {
        AuditError::InvalidWindow { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        AuditError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<AuditError> for ApiError {
    fn from(err: AuditError) -> Self {
        ApiError::Audit(err)
    }
}
