use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use flux_axum::axum;
use flux_blob::{FluxAdapter, FluxConfig};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

fn memory_router() -> Router {
    axum(FluxAdapter::memory(FluxConfig::default())).router
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let res = router.clone().oneshot(request).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn start(file_name: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/uploads")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "fileName": file_name }).to_string()))
        .unwrap()
}

fn chunk(upload_id: &str, index: &str, bytes: &'static [u8]) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(format!("/uploads/{upload_id}/chunks/{index}"))
        .header("content-type", "application/octet-stream")
        .body(Body::from(bytes))
        .unwrap()
}

fn complete(upload_id: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/uploads/{upload_id}/complete"))
        .body(Body::empty())
        .unwrap()
}

fn cancel(upload_id: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(format!("/uploads/{upload_id}"))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn full_round_trip_on_disk() {
    let dir = TempDir::new().unwrap();
    let adapter = FluxAdapter::local(FluxConfig::default().with_upload_dir(dir.path()))
        .await
        .unwrap();
    let router = axum(adapter).router;

    let (status, body) = send(&router, start("doc.pdf")).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["uploadId"].as_str().unwrap().to_string();
    assert!(id.starts_with("doc_") && id.ends_with(".pdf"));

    let (status, body) = send(&router, chunk(&id, "0", &[1, 2, 3])).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["chunk"].as_str().unwrap().ends_with("_chunk_0.pdf"));
    let (status, _) = send(&router, chunk(&id, "1", &[4, 5, 6])).await;
    assert_eq!(status, StatusCode::OK);

    let (status, receipt) = send(&router, complete(&id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["fileName"], id.as_str());
    assert_eq!(receipt["sizeBytes"], 6);
    assert_eq!(receipt["chunks"], 2);
    assert!(receipt["completedAt"].is_string());

    assert_eq!(std::fs::read(dir.path().join(&id)).unwrap(), vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn cancel_then_complete_is_not_found() {
    let router = memory_router();
    let (_, body) = send(&router, start("clip.mp4")).await;
    let id = body["uploadId"].as_str().unwrap().to_string();

    send(&router, chunk(&id, "0", b"aa")).await;
    let (status, body) = send(&router, cancel(&id)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = send(&router, complete(&id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["name"], "NotFound");
    assert_eq!(body["code"], 404);
    assert_eq!(body["className"], "not-found");
    assert_eq!(body["message"], "No chunks found for the specified file.");
}

#[tokio::test]
async fn empty_file_name_is_bad_request() {
    let router = memory_router();
    let (status, body) = send(&router, start("")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["name"], "BadRequest");
    assert_eq!(body["className"], "bad-request");
    assert_eq!(body["message"], "Flux file identifier cannot be empty.");
}

#[tokio::test]
async fn missing_extension_is_bad_request() {
    let router = memory_router();
    let (status, body) = send(&router, complete("no_extension")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "File name must have an extension.");
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let router = memory_router();
    let request = Request::builder()
        .method("POST")
        .uri("/uploads")
        .header("content-type", "application/json")
        .body(Body::from("{\"fileName\":\"x"))
        .unwrap();

    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
    assert!(body.get("errors").is_some());
}

#[tokio::test]
async fn upload_ids_cannot_escape_the_upload_dir() {
    let root = TempDir::new().unwrap();
    let upload_dir = root.path().join("uploads");
    let adapter = FluxAdapter::local(FluxConfig::default().with_upload_dir(&upload_dir))
        .await
        .unwrap();
    let router = axum(adapter).router;

    let (status, body) = send(&router, chunk("..%2Fescaped.pdf", "0", b"pwned")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["className"], "bad-request");
    assert_eq!(body["message"], "Invalid upload identifier");

    let (status, _) = send(&router, complete("..%2Fescaped.pdf")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&router, cancel("..%2Fescaped.pdf")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for id in ["%2E%2E", "%2Fetc%2Fescaped.pdf", "..%5Cescaped.pdf", "a%00.pdf"] {
        let (status, _) = send(&router, complete(id)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "id: {id}");
    }

    assert!(!root.path().join("escaped.pdf").exists());
    assert_eq!(std::fs::read_dir(&upload_dir).unwrap().count(), 0);
}

#[tokio::test]
async fn dotted_stems_are_still_plain_ids() {
    let router = memory_router();
    let (status, _) = send(&router, chunk("v1..2_abc.pdf", "0", b"ok")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, receipt) = send(&router, complete("v1..2_abc.pdf")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["sizeBytes"], 2);
}

#[tokio::test]
async fn non_numeric_chunk_index_is_bad_request() {
    let router = memory_router();
    let (status, body) = send(&router, chunk("a_1.bin", "first", b"x")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["className"], "bad-request");
}

#[tokio::test]
async fn request_id_is_echoed() {
    let router = memory_router();
    let res = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/uploads")
                .header("content-type", "application/json")
                .header("x-request-id", "req-flux-1")
                .body(Body::from(json!({ "fileName": "a.txt" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.headers().get("x-request-id").unwrap(), "req-flux-1");
}
