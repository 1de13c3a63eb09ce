use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::utils::response::error as error_response;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    /// The boleto row exists but generating or storing its QR artifact
    /// failed. Distinct from a creation failure so the caller can retry the
    /// artifact without issuing a second boleto.
    #[error("Boleto {id_boleto} created but artifact generation failed: {reason}")]
    ArtifactGeneration { id_boleto: i64, reason: String },

    #[error("External service error: {0}")]
    ExternalServiceError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ArtifactGeneration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ExternalServiceError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::AuthError(_) => "AUTH_ERROR",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::ArtifactGeneration { .. } => "ARTIFACT_GENERATION_FAILED",
            AppError::ExternalServiceError(_) => "EXTERNAL_SERVICE_ERROR",
        }
    }

    fn log(&self) {
        match self {
            AppError::ValidationError(msg)
            | AppError::AuthError(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::ExternalServiceError(msg) => {
                error!(error = ?self, message = %msg, "Application error");
            }
            AppError::ArtifactGeneration { id_boleto, reason } => {
                error!(id_boleto, reason = %reason, "Artifact generation failed");
            }
            AppError::DatabaseError(e) => {
                error!(error = ?e, "Database error");
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        // Log internal details
        self.log();

        // Only expose high-level message to the client
        let public_message = match &self {
            AppError::ValidationError(msg)
            | AppError::AuthError(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::ExternalServiceError(msg) => msg.clone(),
            AppError::ArtifactGeneration { id_boleto, .. } => {
                format!("El boleto {id_boleto} fue creado pero no se pudo generar su código QR")
            }
            AppError::DatabaseError(_) => "A database error occurred".to_string(),
        };

        // The retryable case carries the id so the caller can recover the
        // already-created boleto instead of purchasing again.
        let details = match &self {
            AppError::ArtifactGeneration { id_boleto, .. } => {
                Some(json!({ "id_boleto": id_boleto }))
            }
            _ => None,
        };

        error_response(code, public_message, details, status)
    }
}
