//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! maps to a specific numeric code and HTTP status. Errors raised inside the
//! pairing pipeline (lookup, persistence, delivery) are mostly recovered
//! locally; they surface through return values and the event bus rather than
//! through HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ParticipantId;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "invalid request: tags must not contain empty strings",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                |
/// |-----------|-----------------|----------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request            |
/// | 2000–2999 | State/Not Found | 404 Not Found              |
/// | 3000–3999 | Server          | 500 Internal Server Error  |
/// | 5000–5999 | Delivery        | 502 Bad Gateway            |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Participant is not waiting in the registry.
    #[error("participant not waiting: {0}")]
    ParticipantNotFound(ParticipantId),

    /// Topic or metatopic lookup failed in the backing store.
    #[error("lookup error: {0}")]
    LookupError(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// A single write to a participant sink failed.
    #[error("delivery failed: {0}")]
    DeliveryFailed(String),

    /// Every retry for a delivery was used up without success.
    #[error("delivery to {participant} abandoned after {attempts} attempts")]
    DeliveryAbandoned {
        /// Intended recipient.
        participant: ParticipantId,
        /// Number of write attempts made.
        attempts: u32,
    },

    /// The delivery was cancelled because the recipient's connection closed.
    #[error("delivery to {0} cancelled")]
    DeliveryCancelled(ParticipantId),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::ParticipantNotFound(_) => 2001,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::LookupError(_) => 3002,
            Self::DeliveryFailed(_) => 5001,
            Self::DeliveryAbandoned { .. } => 5002,
            Self::DeliveryCancelled(_) => 5003,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::ParticipantNotFound(_) => StatusCode::NOT_FOUND,
            Self::PersistenceError(_) | Self::LookupError(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::DeliveryFailed(_)
            | Self::DeliveryAbandoned { .. }
            | Self::DeliveryCancelled(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_ranges() {
        assert_eq!(GatewayError::InvalidRequest("x".into()).error_code(), 1001);
        assert_eq!(
            GatewayError::ParticipantNotFound(ParticipantId::from("7")).error_code(),
            2001
        );
        assert_eq!(
            GatewayError::DeliveryAbandoned {
                participant: ParticipantId::from("7"),
                attempts: 6,
            }
            .error_code(),
            5002
        );
    }

    #[test]
    fn abandoned_message_names_participant() {
        let err = GatewayError::DeliveryAbandoned {
            participant: ParticipantId::from("42"),
            attempts: 6,
        };
        assert_eq!(err.to_string(), "delivery to 42 abandoned after 6 attempts");
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn persistence_maps_to_server_error() {
        let err = GatewayError::PersistenceError("down".into());
        assert_eq!(err.error_code(), 3001);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn into_response_sets_status() {
        let response = GatewayError::ParticipantNotFound(ParticipantId::from("1")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
