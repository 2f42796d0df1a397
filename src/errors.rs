use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// JSON body returned for every failed request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Not Found", "Unprocessable Entity")
    pub error: String,
    /// Human-readable error description
    pub message: String,
    /// Field-path → message map for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, String>>,
    /// ISO 8601 timestamp when the error occurred
    pub timestamp: String,
}

/// Business and infrastructure failures surfaced by the service layer.
///
/// Business-rule failures are constructed locally and returned as values;
/// only database errors arrive via `?`, and the response mapping converts
/// them to a generic internal-error message so no driver detail reaches
/// the client.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::error::DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Field-level validation failure keyed by dotted path
    /// (`tasks.0.parts.1.code`).
    #[error("Validation failed")]
    ValidationFailed(BTreeMap<String, String>),

    /// Part codes referenced by a claim that do not exist in the catalog.
    /// All missing codes are collected before failing.
    #[error("Missing part codes: {}", .0.join(", "))]
    MissingParts(Vec<String>),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Status transition attempted on an order no longer in PENDIENTE.
    #[error("La orden ya fue procesada")]
    AlreadyProcessed,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Internal server error")]
    InternalError,
}

impl ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::ValidationError(_)
            | ServiceError::ValidationFailed(_)
            | ServiceError::MissingParts(_)
            | ServiceError::InvalidStatus(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::AlreadyProcessed | ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::DatabaseError(_) | ServiceError::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let (message, fields) = match &self {
            // Never leak driver/storage detail to the client.
            ServiceError::DatabaseError(err) => {
                tracing::error!(error = %err, "database failure reached response boundary");
                ("Internal server error".to_string(), None)
            }
            ServiceError::InternalError => ("Internal server error".to_string(), None),
            ServiceError::ValidationFailed(map) => {
                ("Validation failed".to_string(), Some(map.clone()))
            }
            other => (other.to_string(), None),
        };

        let body = ErrorResponse {
            error: status
                .canonical_reason()
                .unwrap_or("Unknown")
                .to_string(),
            message,
            fields,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(body)).into_response()
    }
}
