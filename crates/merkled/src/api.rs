use crate::metrics::{self, Metrics};
use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, FromRef, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use engine::{
    merkle_root,
    types::{MerkleRequest, MerkleResponse},
    Digest, MerkleError,
};
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub max_leaves: usize,
    pub metrics: Metrics,
}

impl FromRef<AppState> for Metrics {
    fn from_ref(st: &AppState) -> Self {
        st.metrics.clone()
    }
}

pub fn router(state: AppState, body_limit_bytes: usize) -> Router {
    Router::new()
        .route("/merkle", post(merkle))
        .route("/health", get(health))
        .route_layer(middleware::from_fn_with_state(
            state.metrics.clone(),
            metrics::track,
        ))
        .route("/metrics", get(metrics::export))
        .layer(DefaultBodyLimit::max(body_limit_bytes))
        .with_state(state)
}

async fn merkle(
    State(st): State<AppState>,
    body: Result<Json<MerkleRequest>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, format!("invalid input: {}", e.body_text()))
                .into_response()
        }
    };

    let leaf_count = req.len();
    if leaf_count > st.max_leaves {
        return (
            StatusCode::PAYLOAD_TOO_LARGE,
            format!("too many leaves: {leaf_count} > {}", st.max_leaves),
        )
            .into_response();
    }

    let leaves = match req.into_leaves() {
        Ok(leaves) => leaves,
        Err(e) => return (StatusCode::BAD_REQUEST, format!("invalid input: {e}")).into_response(),
    };

    let result = merkle_root(&leaves);
    if result.is_ok() {
        st.metrics.record_root(leaf_count);
    }
    root_response(result, leaf_count)
}

fn root_response(result: Result<Digest, MerkleError>, leaf_count: usize) -> Response {
    match result {
        Ok(root) => {
            let resp = MerkleResponse::new(&root, leaf_count);
            info!(leaf_count, root = %resp.merkle_root, "merkle root computed");
            (StatusCode::OK, Json(resp)).into_response()
        }
        Err(e @ MerkleError::EmptyInput) => {
            (StatusCode::BAD_REQUEST, format!("error: {e}")).into_response()
        }
        Err(e @ MerkleError::AllocationFailure) => {
            warn!(leaf_count, "merkle root failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("error: {e}")).into_response()
        }
    }
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use engine::crypto::sha256;
    use serde_json::json;
    use tower::ServiceExt;

    fn app() -> Router {
        router(
            AppState {
                max_leaves: 4,
                metrics: Metrics::new(),
            },
            1024,
        )
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn post_json(app: Router, body: serde_json::Value) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method("POST")
            .uri("/merkle")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn bare_array_returns_hex_root() {
        let (status, body) = post_json(app(), json!(["hello"])).await;
        assert_eq!(status, StatusCode::OK);
        let resp: MerkleResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(resp.leaf_count, 1);
        assert_eq!(resp.root().unwrap(), sha256(b"hello"));
    }

    #[tokio::test]
    async fn encoded_leaves_match_library() {
        let (status, body) =
            post_json(app(), json!({"leaves": ["00ff", "", "01"], "encoding": "hex"})).await;
        assert_eq!(status, StatusCode::OK);
        let resp: MerkleResponse = serde_json::from_slice(&body).unwrap();
        let expected = merkle_root([vec![0x00u8, 0xff], vec![], vec![0x01]]).unwrap();
        assert_eq!(resp.root().unwrap(), expected);
        assert_eq!(resp.leaf_count, 3);
    }

    #[tokio::test]
    async fn empty_list_is_bad_request() {
        let (status, body) = post_json(app(), json!([])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(String::from_utf8(body).unwrap(), "error: empty input");
    }

    #[tokio::test]
    async fn undecodable_leaf_is_bad_request() {
        let (status, _) =
            post_json(app(), json!({"leaves": ["not base64!"], "encoding": "base64"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn too_many_leaves_is_rejected() {
        let (status, _) = post_json(app(), json!(["a", "b", "c", "d", "e"])).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let (status, body) = post_json(app(), json!([1, 2])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(String::from_utf8(body).unwrap().starts_with("invalid input: "));

        let (status, _) = post_json(app(), json!({"leaves": ["a"], "encoding": "rot13"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_content_type_is_bad_request() {
        let request = Request::builder()
            .method("POST")
            .uri("/merkle")
            .body(Body::from(r#"["a"]"#))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.starts_with("invalid input: "));
    }

    #[tokio::test]
    async fn allocation_failure_is_internal_error() {
        let response = root_response(Err(MerkleError::AllocationFailure), 2);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "error: allocation failure");
    }

    #[tokio::test]
    async fn metrics_count_merkle_requests() {
        let app = app();
        let (status, _) = post_json(app.clone(), json!(["a", "b", "c"])).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = post_json(app.clone(), json!([])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let text = body_text(response).await;
        assert!(text.contains("merkled_roots_computed_total 1"));
        assert!(text.contains("merkled_leaves_hashed_total 3"));
        assert!(text.contains(r#"status="200""#));
        assert!(text.contains(r#"status="400""#));
        assert!(text.contains(r#"path="/merkle""#));
    }

    #[tokio::test]
    async fn health_is_ok() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
