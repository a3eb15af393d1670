//! HTTP response envelopes.
//!
//! Success responses use `{code, message, data}`; failures use the
//! problem-details shape `{title, status, detail, instance}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::error::ServiceError;

/// Success envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Problem-details error envelope.
#[derive(Debug, Serialize)]
pub struct Problem {
    pub title: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

/// Builds a success response with the standard envelope.
pub fn success_response<T: Serialize>(status: StatusCode, message: &str, data: T) -> Response {
    (
        status,
        Json(ApiResponse {
            code: status.as_u16(),
            message: message.to_string(),
            data: Some(data),
        }),
    )
        .into_response()
}

/// Builds a problem-details response for a service error. `instance` is the
/// request path. The detail field carries the error display only; causes
/// stay in the logs.
pub fn error_response(instance: &str, err: &ServiceError) -> Response {
    let status = status_for(err);
    (
        status,
        Json(Problem {
            title: title_for(err).to_string(),
            status: status.as_u16(),
            detail: Some(err.to_string()),
            instance: Some(instance.to_string()),
        }),
    )
        .into_response()
}

fn status_for(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::Validation { .. } => StatusCode::BAD_REQUEST,
        ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
        ServiceError::Conflict { .. } => StatusCode::CONFLICT,
        ServiceError::Storage(_) | ServiceError::Broker { .. } | ServiceError::Unexpected { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn title_for(err: &ServiceError) -> &'static str {
    match err {
        ServiceError::Validation { .. } => "validation error",
        ServiceError::NotFound { .. } => "not found",
        ServiceError::Conflict { .. } => "conflict",
        ServiceError::Storage(_) => "internal server error",
        ServiceError::Broker { .. } => "internal server error",
        ServiceError::Unexpected { .. } => "internal server error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds_map_to_expected_status_codes() {
        assert_eq!(
            status_for(&ServiceError::validation("bad")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&ServiceError::not_found("transaction")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&ServiceError::conflict("dup")),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&ServiceError::Storage(sqlx::Error::RowNotFound)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(&ServiceError::unexpected("boom")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn problem_serializes_without_empty_fields() {
        let problem = Problem {
            title: "conflict".to_string(),
            status: 409,
            detail: None,
            instance: None,
        };
        let json = serde_json::to_value(&problem).unwrap();
        assert!(json.get("detail").is_none());
        assert!(json.get("instance").is_none());
    }
}
