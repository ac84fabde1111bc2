use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;

use crate::server::Server;

/// Create an Axum router for the JSON-RPC server.
///
/// `POST /` always answers 200 with a JSON-RPC body, even for malformed
/// input. `GET /healthz` is a liveness probe.
pub fn http_router(server: Server) -> Router {
    Router::new()
        .route("/", post(handle_rpc))
        .route("/healthz", get(handle_healthz))
        .with_state(Arc::new(server))
}

async fn handle_healthz() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

// Raw bytes, not `Json<_>`: axum's extractor would answer bad JSON with a 4xx.
async fn handle_rpc(State(server): State<Arc<Server>>, body: Bytes) -> impl IntoResponse {
    Json(server.handle_body(&body).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use std::fs;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_router() -> (TempDir, Router) {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("docs")).unwrap();
        fs::write(tmp.path().join("docs/readme.md"), "# hi").unwrap();
        let srv = Server::builder(tmp.path()).build();
        (tmp, http_router(srv))
    }

    fn post_json(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap()
    }

    async fn body_json(resp: axum::response::Response) -> Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let (_tmp, app) = test_router();
        let req = Request::builder()
            .method("GET")
            .uri("/healthz")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_resources_list() {
        let (_tmp, app) = test_router();
        let body = json!({"jsonrpc": "2.0", "method": "resources/list", "params": {}, "id": "abc"});
        let resp = app.oneshot(post_json(body.to_string())).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            body_json(resp).await,
            json!({
                "jsonrpc": "2.0",
                "id": "abc",
                "result": {"resources": [
                    {"uri": "file:///docs/readme.md", "name": "readme.md", "mimeType": "text/markdown"}
                ]}
            })
        );
    }

    #[tokio::test]
    async fn test_invalid_json_is_still_200() {
        let (_tmp, app) = test_router();
        let resp = app.oneshot(post_json("{bad json")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["id"], json!(0));
        assert_eq!(body["error"]["code"], json!(-32603));
        assert!(!body["error"]["data"].is_null());
    }

    #[tokio::test]
    async fn test_invalid_request_is_200() {
        let (_tmp, app) = test_router();
        let body = json!({"jsonrpc": "2.0", "method": "resources/list", "id": 4});
        let resp = app.oneshot(post_json(body.to_string())).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["id"], json!(4));
        assert_eq!(body["error"]["code"], json!(-32600));
        assert_eq!(body["error"]["message"], json!("Invalid Request"));
    }

    #[tokio::test]
    async fn test_method_not_allowed() {
        let (_tmp, app) = test_router();
        let req = Request::builder()
            .method("GET")
            .uri("/")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
