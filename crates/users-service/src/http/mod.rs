//! HTTP adapter for the users service.

use std::sync::Arc;

use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::extract::{OriginalUri, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::{get, post};
use axum::Json;
use outbox_shared::http::{error_response, success_response};
use outbox_shared::ServiceError;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use crate::application::{CreateUser, CreateUserInput};

#[derive(Clone)]
pub struct AppState {
    pub create: Arc<CreateUser>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/users", post(create_user))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

#[derive(Deserialize)]
struct CreateUserRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

async fn create_user(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(json) => json,
        Err(rejection) => {
            let err = ServiceError::validation(format!("invalid request body: {rejection}"));
            return error_response(uri.path(), &err);
        }
    };

    let result = state
        .create
        .execute(CreateUserInput {
            email: req.email,
            password: req.password,
        })
        .await;

    match result {
        Ok(out) => success_response(
            StatusCode::CREATED,
            "user created",
            serde_json::json!({"id": out.id}),
        ),
        Err(err) => error_response(uri.path(), &err),
    }
}
