#![allow(clippy::unwrap_used)]
// Integration tests for the REST surface, driven through the router
// in-process with `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use gatepass_core::{MemoryStore, TokenService};
use gatepass_server::{AppState, InitUrlRenderer, router};

// ── Helpers ─────────────────────────────────────────────────────────

fn app() -> Router {
    app_with_origins(&[])
}

fn app_with_origins(origins: &[String]) -> Router {
    let service = TokenService::new(Arc::new(MemoryStore::new()));
    let renderer = Arc::new(InitUrlRenderer::new("https://passes.example.com"));
    router(AppState::new(service, renderer, 200, 2), origins)
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    split(response).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    split(response).await
}

async fn split(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

/// Issue one token and return its id string.
async fn issue_one(app: &Router) -> String {
    let (status, body) = post_json(app, "/api/generate", json!({ "count": 1 })).await;
    assert_eq!(status, StatusCode::OK);
    body["codes"][0]["code_id"].as_str().unwrap().to_owned()
}

// ── Issuance ────────────────────────────────────────────────────────

#[tokio::test]
async fn generate_issues_requested_count() {
    let app = app();
    let (status, body) = post_json(&app, "/api/generate", json!({ "count": 5 })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["codes"].as_array().unwrap().len(), 5);

    let first = &body["codes"][0];
    assert_eq!(first["qr_number"], json!(1));
    let url = first["qr_url"].as_str().unwrap();
    assert!(url.starts_with("https://passes.example.com/init?code="));
}

#[tokio::test]
async fn generate_without_body_uses_configured_default() {
    let app = app();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/generate")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let (status, _) = split(response).await;
    assert_eq!(status, StatusCode::OK);

    let (_, listing) = get(&app, "/api/codes").await;
    assert_eq!(listing["total"], json!(200));
}

#[tokio::test]
async fn generate_rejects_zero_count() {
    let app = app();
    let (status, body) = post_json(&app, "/api/generate", json!({ "count": 0 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("count"));
}

// ── Initialization ──────────────────────────────────────────────────

#[tokio::test]
async fn init_binds_name_exactly_once() {
    let app = app();
    let id = issue_one(&app).await;

    let (status, body) = post_json(
        &app,
        "/api/init",
        json!({ "code_id": id, "name": "  Ada Lovelace  " }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["name"], json!("Ada Lovelace"));

    // Second attempt is refused.
    let (status, body) = post_json(
        &app,
        "/api/init",
        json!({ "code_id": id, "name": "Grace Hopper" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("already initialized"));
}

#[tokio::test]
async fn init_rejects_blank_name() {
    let app = app();
    let id = issue_one(&app).await;

    let (status, _) = post_json(&app, "/api/init", json!({ "code_id": id, "name": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn init_unknown_id_is_404() {
    let app = app();
    let (status, _) = post_json(
        &app,
        "/api/init",
        json!({ "code_id": "00000000-0000-4000-8000-000000000000", "name": "Ada" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Redemption ──────────────────────────────────────────────────────

#[tokio::test]
async fn scan_walks_the_quota_down() {
    let app = app();
    let id = issue_one(&app).await;
    post_json(&app, "/api/init", json!({ "code_id": id, "name": "Ada" })).await;

    let (status, body) = post_json(&app, "/api/scan", json!({ "code_id": id })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("valid"));
    assert_eq!(body["name"], json!("Ada"));
    assert_eq!(body["scans_left"], json!(1));
    assert_eq!(body["qr_number"], json!(1));

    let (_, body) = post_json(&app, "/api/scan", json!({ "code_id": id })).await;
    assert_eq!(body["scans_left"], json!(0));

    // Quota spent: still 200, but the envelope flips to invalid.
    let (status, body) = post_json(&app, "/api/scan", json!({ "code_id": id })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("invalid"));
    assert_eq!(body["reason"], json!("Maximum scans (2) already used"));
}

#[tokio::test]
async fn scan_of_uninitialized_token_is_invalid() {
    let app = app();
    let id = issue_one(&app).await;

    let (status, body) = post_json(&app, "/api/scan", json!({ "code_id": id })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("invalid"));
    assert_eq!(body["reason"], json!("QR code not initialized"));
}

#[tokio::test]
async fn scan_of_unknown_id_is_invalid() {
    let app = app();
    let (status, body) = post_json(&app, "/api/scan", json!({ "code_id": "garbage" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("invalid"));
    assert_eq!(body["reason"], json!("QR code not found"));
}

// ── Lookups and listings ────────────────────────────────────────────

#[tokio::test]
async fn code_info_roundtrip_and_404() {
    let app = app();
    let id = issue_one(&app).await;

    let (status, body) = get(&app, &format!("/api/code/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"]["code_id"], json!(id));
    assert_eq!(body["code"]["scan_count"], json!(0));

    let (status, _) = get(&app, "/api/code/00000000-0000-4000-8000-000000000000").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn codes_listing_is_ordered_by_number() {
    let app = app();
    post_json(&app, "/api/generate", json!({ "count": 3 })).await;

    let (status, body) = get(&app, "/api/codes").await;
    assert_eq!(status, StatusCode::OK);
    let numbers: Vec<u64> = body["codes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["qr_number"].as_u64().unwrap())
        .collect();
    assert_eq!(numbers, vec![1, 2, 3]);
}

#[tokio::test]
async fn attendees_lists_only_initialized() {
    let app = app();
    let (_, body) = post_json(&app, "/api/generate", json!({ "count": 3 })).await;
    let ids: Vec<String> = body["codes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["code_id"].as_str().unwrap().to_owned())
        .collect();

    post_json(&app, "/api/init", json!({ "code_id": ids[1], "name": "Ada" })).await;
    post_json(&app, "/api/init", json!({ "code_id": ids[0], "name": "Grace" })).await;

    let (status, body) = get(&app, "/api/attendees").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], json!(2));
    // Ordered by initialization time, not batch number.
    assert_eq!(body["attendees"][0]["name"], json!("Ada"));
    assert_eq!(body["attendees"][1]["name"], json!("Grace"));
}

// ── Stats and health ────────────────────────────────────────────────

#[tokio::test]
async fn stats_reflect_the_lifecycle() {
    let app = app();
    let (_, body) = post_json(&app, "/api/generate", json!({ "count": 3 })).await;
    let ids: Vec<String> = body["codes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["code_id"].as_str().unwrap().to_owned())
        .collect();

    post_json(&app, "/api/init", json!({ "code_id": ids[0], "name": "Ada" })).await;
    post_json(&app, "/api/init", json!({ "code_id": ids[1], "name": "Grace" })).await;
    post_json(&app, "/api/scan", json!({ "code_id": ids[0] })).await;

    let (status, body) = get(&app, "/api/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["stats"],
        json!({
            "total": 3,
            "initialized": 2,
            "used": 1,
            "exhausted": 0,
            "unused": 2,
        })
    );
}

#[tokio::test]
async fn health_reports_connected_store() {
    let app = app();
    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("healthy"));
    assert_eq!(body["database"], json!("connected"));
}

// ── CORS ────────────────────────────────────────────────────────────

const FRONTEND: &str = "https://passes.example.com";

#[tokio::test]
async fn preflight_allows_configured_origin() {
    let app = app_with_origins(&[FRONTEND.to_owned()]);

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/scan")
                .header(header::ORIGIN, FRONTEND)
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        FRONTEND
    );
}

#[tokio::test]
async fn simple_request_carries_allow_origin_header() {
    let app = app_with_origins(&[FRONTEND.to_owned()]);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header(header::ORIGIN, FRONTEND)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        FRONTEND
    );
}

#[tokio::test]
async fn unparseable_origin_is_skipped_not_fatal() {
    // A config typo with an embedded newline cannot become a header
    // value; the layer must drop it and keep serving the valid origin.
    let app = app_with_origins(&["bad\norigin".to_owned(), FRONTEND.to_owned()]);

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/scan")
                .header(header::ORIGIN, FRONTEND)
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        FRONTEND
    );
}

// ── Partial batch reporting ─────────────────────────────────────────

mod partial_batch {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use gatepass_core::{
        BadgeRenderer, RenderError, RenderedBadge, StoreError, Token, TokenId, TokenStore,
        Versioned,
    };

    use super::*;

    /// Store that refuses inserts once its write budget is spent.
    struct CappedStore {
        inner: MemoryStore,
        budget: AtomicU32,
    }

    impl CappedStore {
        fn new(budget: u32) -> Self {
            Self {
                inner: MemoryStore::new(),
                budget: AtomicU32::new(budget),
            }
        }
    }

    #[async_trait]
    impl TokenStore for CappedStore {
        async fn insert(&self, token: Token) -> Result<(), StoreError> {
            if self
                .budget
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_err()
            {
                return Err(StoreError::Unavailable {
                    reason: "write budget exhausted".into(),
                });
            }
            self.inner.insert(token).await
        }

        async fn get(&self, id: TokenId) -> Result<Option<Versioned<Token>>, StoreError> {
            self.inner.get(id).await
        }

        async fn update(
            &self,
            id: TokenId,
            expected_version: u64,
            token: Token,
        ) -> Result<(), StoreError> {
            self.inner.update(id, expected_version, token).await
        }

        async fn scan(&self) -> Result<Vec<Token>, StoreError> {
            self.inner.scan().await
        }

        async fn ping(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    struct BrokenRenderer;

    impl BadgeRenderer for BrokenRenderer {
        fn render(&self, _id: TokenId, _sequence: u32) -> Result<RenderedBadge, RenderError> {
            Err(RenderError::new("no pixels today"))
        }
    }

    fn capped_app(budget: u32, renderer: Arc<dyn BadgeRenderer>) -> Router {
        let service = TokenService::new(Arc::new(CappedStore::new(budget)));
        router(AppState::new(service, renderer, 200, 2), &[])
    }

    #[tokio::test]
    async fn partial_failure_returns_the_durable_prefix() {
        let app = capped_app(2, Arc::new(InitUrlRenderer::new(FRONTEND)));

        let (status, body) = post_json(&app, "/api/generate", json!({ "count": 5 })).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["completed"], json!(2));
        assert!(body["error"].as_str().unwrap().contains("2 of 5"));

        let codes = body["codes"].as_array().unwrap();
        assert_eq!(codes.len(), 2);
        assert_eq!(codes[1]["qr_number"], json!(2));
    }

    #[tokio::test]
    async fn renderer_failure_never_hides_the_completed_count() {
        let app = capped_app(2, Arc::new(BrokenRenderer));

        let (status, body) = post_json(&app, "/api/generate", json!({ "count": 5 })).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        // Badges are gone but the persisted prefix is still reported.
        assert_eq!(body["completed"], json!(2));
        assert!(body["error"].as_str().unwrap().contains("2 of 5"));
        assert_eq!(body["codes"].as_array().unwrap().len(), 0);
    }
}
