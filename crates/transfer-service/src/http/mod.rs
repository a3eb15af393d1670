//! HTTP adapter for the transfer service.

use std::sync::Arc;

use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::extract::{OriginalUri, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Json;
use outbox_shared::http::{error_response, success_response};
use outbox_shared::ServiceError;
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::application::{CreateTransaction, CreateTransactionInput, GetBalance, GetTransactionStatus};

const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";
const IDEMPOTENCY_KEY_MAX_LEN: usize = 255;

#[derive(Clone)]
pub struct AppState {
    pub create: Arc<CreateTransaction>,
    pub status: Arc<GetTransactionStatus>,
    pub balance: Arc<GetBalance>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/transactions", post(create_transaction))
        .route("/api/v1/transactions/{id}", get(get_transaction_status))
        .route("/api/v1/balance/{user_id}", get(get_balance))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

#[derive(Deserialize)]
struct CreateTransactionRequest {
    #[serde(default)]
    from_user_id: String,
    #[serde(default)]
    to_user_id: String,
    #[serde(default)]
    amount: i64,
    #[serde(default)]
    description: String,
}

async fn create_transaction(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    payload: Result<Json<CreateTransactionRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(json) => json,
        Err(rejection) => {
            let err = ServiceError::validation(format!("invalid request body: {rejection}"));
            return error_response(uri.path(), &err);
        }
    };

    let idempotency_key = match idempotency_key(&headers) {
        Ok(key) => key,
        Err(err) => return error_response(uri.path(), &err),
    };

    let result = state
        .create
        .execute(CreateTransactionInput {
            from_user_id: req.from_user_id,
            to_user_id: req.to_user_id,
            amount: req.amount,
            description: req.description,
            idempotency_key,
        })
        .await;

    match result {
        Ok(out) => {
            let data = serde_json::json!({"id": out.id, "status": out.status.as_str()});
            if out.idempotent {
                success_response(StatusCode::OK, "transaction already exists", data)
            } else {
                success_response(StatusCode::CREATED, "transaction created", data)
            }
        }
        Err(err) => error_response(uri.path(), &err),
    }
}

async fn get_transaction_status(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
) -> Response {
    let Ok(id) = Uuid::parse_str(&id) else {
        return error_response(uri.path(), &ServiceError::not_found("transaction"));
    };

    match state.status.execute(id).await {
        Ok(out) => success_response(
            StatusCode::OK,
            "ok",
            serde_json::json!({"id": out.id, "status": out.status.as_str()}),
        ),
        Err(err) => error_response(uri.path(), &err),
    }
}

async fn get_balance(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(user_id): Path<String>,
) -> Response {
    match state.balance.execute(&user_id).await {
        Ok(out) => success_response(
            StatusCode::OK,
            "ok",
            serde_json::json!({"userId": out.user_id, "balance": out.balance}),
        ),
        Err(err) => error_response(uri.path(), &err),
    }
}

/// Reads the optional `Idempotency-Key` header: an opaque string of at most
/// 255 characters.
fn idempotency_key(headers: &HeaderMap) -> Result<Option<String>, ServiceError> {
    let Some(value) = headers.get(IDEMPOTENCY_KEY_HEADER) else {
        return Ok(None);
    };

    let key = value
        .to_str()
        .map_err(|_| ServiceError::validation("Idempotency-Key must be valid UTF-8"))?;

    if key.is_empty() {
        return Ok(None);
    }
    if key.len() > IDEMPOTENCY_KEY_MAX_LEN {
        return Err(ServiceError::validation(format!(
            "Idempotency-Key must be at most {IDEMPOTENCY_KEY_MAX_LEN} characters"
        )));
    }

    Ok(Some(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Transaction, TransactionRepository};
    use axum::body::Body;
    use axum::http::Request;
    use outbox::NewOutboxEvent;
    use std::sync::Mutex;
    use tower::ServiceExt;

    /// In-memory repository backing the router tests, including the unique
    /// idempotency-key behavior of the real store.
    #[derive(Default)]
    struct InMemoryRepository {
        transactions: Mutex<Vec<Transaction>>,
        events: Mutex<Vec<NewOutboxEvent>>,
    }

    #[async_trait::async_trait]
    impl TransactionRepository for InMemoryRepository {
        async fn create(
            &self,
            transaction: &Transaction,
            event: &NewOutboxEvent,
        ) -> Result<(), ServiceError> {
            let mut transactions = self.transactions.lock().unwrap();
            if let Some(key) = &transaction.idempotency_key {
                if transactions
                    .iter()
                    .any(|t| t.idempotency_key.as_ref() == Some(key))
                {
                    return Err(ServiceError::conflict("duplicate idempotency key"));
                }
            }
            transactions.push(transaction.clone());
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<Transaction>, ServiceError> {
            Ok(self
                .transactions
                .lock()
                .unwrap()
                .iter()
                .find(|t| t.id == id)
                .cloned())
        }

        async fn find_by_idempotency_key(
            &self,
            key: &str,
        ) -> Result<Option<Transaction>, ServiceError> {
            Ok(self
                .transactions
                .lock()
                .unwrap()
                .iter()
                .find(|t| t.idempotency_key.as_deref() == Some(key))
                .cloned())
        }

        async fn get_balance(&self, _user_id: &str) -> Result<i64, ServiceError> {
            Ok(420)
        }
    }

    fn test_router() -> (Router, Arc<InMemoryRepository>) {
        let repo = Arc::new(InMemoryRepository::default());
        let as_dyn: Arc<dyn TransactionRepository> = repo.clone();
        let state = AppState {
            create: Arc::new(CreateTransaction::new(as_dyn.clone())),
            status: Arc::new(GetTransactionStatus::new(as_dyn.clone())),
            balance: Arc::new(GetBalance::new(as_dyn)),
        };
        (router(state), repo)
    }

    fn post_transaction(body: serde_json::Value, idempotency_key: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/v1/transactions")
            .header("content-type", "application/json");
        if let Some(key) = idempotency_key {
            builder = builder.header(IDEMPOTENCY_KEY_HEADER, key);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn valid_body() -> serde_json::Value {
        serde_json::json!({
            "from_user_id": "u1",
            "to_user_id": "u2",
            "amount": 500,
            "description": "x"
        })
    }

    #[tokio::test]
    async fn create_transaction_returns_201_with_envelope() {
        let (router, repo) = test_router();

        let response = router.oneshot(post_transaction(valid_body(), None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        assert_eq!(body["code"], 201);
        assert_eq!(body["data"]["status"], "PENDING");
        Uuid::parse_str(body["data"]["id"].as_str().unwrap()).unwrap();

        // One aggregate row, one outbox event.
        assert_eq!(repo.transactions.lock().unwrap().len(), 1);
        let events = repo.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "TransactionCreated");
        assert!(events[0].payload.get("transactionId").is_some());
    }

    #[tokio::test]
    async fn repeated_idempotency_key_returns_200_with_same_id() {
        let (router, repo) = test_router();

        let first = router
            .clone()
            .oneshot(post_transaction(valid_body(), Some("key-A")))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::CREATED);
        let first_id = body_json(first).await["data"]["id"].clone();

        let second = router
            .oneshot(post_transaction(valid_body(), Some("key-A")))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::OK);
        let second_id = body_json(second).await["data"]["id"].clone();

        assert_eq!(first_id, second_id);
        assert_eq!(repo.transactions.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn same_user_transfer_returns_400_and_writes_nothing() {
        let (router, repo) = test_router();

        let body = serde_json::json!({
            "from_user_id": "u1",
            "to_user_id": "u1",
            "amount": 100
        });
        let response = router.oneshot(post_transaction(body, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let problem = body_json(response).await;
        assert_eq!(problem["title"], "validation error");
        assert_eq!(problem["status"], 400);
        assert_eq!(problem["instance"], "/api/v1/transactions");
        assert!(repo.transactions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_body_returns_400() {
        let (router, _) = test_router();

        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/transactions")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn oversized_idempotency_key_returns_400() {
        let (router, _) = test_router();

        let key = "k".repeat(300);
        let response = router
            .oneshot(post_transaction(valid_body(), Some(&key)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_transaction_returns_404() {
        let (router, _) = test_router();

        let request = Request::builder()
            .uri(format!("/api/v1/transactions/{}", Uuid::new_v4()))
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let problem = body_json(response).await;
        assert_eq!(problem["title"], "not found");
    }

    #[tokio::test]
    async fn transaction_status_is_returned_after_create() {
        let (router, _) = test_router();

        let created = router
            .clone()
            .oneshot(post_transaction(valid_body(), None))
            .await
            .unwrap();
        let id = body_json(created).await["data"]["id"]
            .as_str()
            .unwrap()
            .to_string();

        let request = Request::builder()
            .uri(format!("/api/v1/transactions/{id}"))
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["data"]["id"], id.as_str());
        assert_eq!(body["data"]["status"], "PENDING");
    }

    #[tokio::test]
    async fn balance_endpoint_returns_user_balance() {
        let (router, _) = test_router();

        let request = Request::builder()
            .uri("/api/v1/balance/u2")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["data"]["userId"], "u2");
        assert_eq!(body["data"]["balance"], 420);
    }
}
