use super::*;
use crate::documents::DocumentStore;
use crate::embeddings::chunking::Chunker;
use crate::llm::LanguageModel;
use crate::pipeline::Collaborators;
use crate::test_support::{EchoModel, HashEmbedder, Utf8Extractor};
use crate::vector_store::IndexStore;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "incident-intel-test-boundary";

struct TestApp {
    app: Router,
    pipeline: Arc<RagPipeline>,
    _temp_dir: TempDir,
}

fn create_test_app() -> TestApp {
    create_test_app_with(ServerConfig::default())
}

fn create_test_app_with(config: ServerConfig) -> TestApp {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let pipeline = Arc::new(RagPipeline::new(
        DocumentStore::new(temp_dir.path().join("pdfs")),
        Arc::new(IndexStore::new(temp_dir.path().join("vector_store"))),
        Chunker::default(),
        3,
        Collaborators {
            extractor: Arc::new(Utf8Extractor),
            embedder: Arc::new(HashEmbedder::default()),
            model: Arc::new(EchoModel::default()) as Arc<dyn LanguageModel>,
        },
    ));
    let app = router(Arc::clone(&pipeline), &config).expect("should build router");

    TestApp {
        app,
        pipeline,
        _temp_dir: temp_dir,
    }
}

fn multipart_request(field: &str, filename: &str, content: &str) -> Request<Body> {
    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
         Content-Type: application/pdf\r\n\
         \r\n\
         {content}\r\n\
         --{BOUNDARY}--\r\n"
    );

    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .expect("should build request")
}

fn ask_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/ask")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("should build request")
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("should read body");
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn health_is_always_ok() {
    let test_app = create_test_app();

    for _ in 0..2 {
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .expect("should build request");
        let (status, body) = send(&test_app.app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "status": "ok" }));
    }

    let (status, _) = send(
        &test_app.app,
        multipart_request("file", "a.pdf", "the sky is blue"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .expect("should build request");
    let (_, body) = send(&test_app.app, request).await;
    assert_eq!(body, serde_json::json!({ "status": "ok" }));
}

#[tokio::test]
async fn upload_indexes_document() {
    let test_app = create_test_app();
    let content = "a".repeat(1001);

    let (status, body) = send(
        &test_app.app,
        multipart_request("file", "incident.pdf", &content),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "indexed");
    assert_eq!(body["filename"], "incident.pdf");
    assert_eq!(body["chunks"], 3);
}

#[tokio::test]
async fn upload_without_text_is_bad_request() {
    let test_app = create_test_app();

    let (status, body) = send(&test_app.app, multipart_request("file", "scan.pdf", "   ")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["detail"],
        "PDF has no readable text (probably scanned image PDF)"
    );
    assert!(!test_app.pipeline.store().exists());
}

#[tokio::test]
async fn upload_without_file_field_is_bad_request() {
    let test_app = create_test_app();

    let (status, body) = send(&test_app.app, multipart_request("other", "a.pdf", "text")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn upload_with_unreadable_document_is_server_error() {
    let test_app = create_test_app();
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"bin.pdf\"\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(&[0xff, 0xfe, 0xfd]);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("should build request");
    let (status, body) = send(&test_app.app, request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        body["detail"]
            .as_str()
            .is_some_and(|d| d.contains("Text extraction error"))
    );
}

#[tokio::test]
async fn ask_before_upload_returns_informational_error() {
    let test_app = create_test_app();

    let (status, body) = send(&test_app.app, ask_request(r#"{"question": "what broke?"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        serde_json::json!({ "error": "No documents indexed yet. Please upload PDFs first." })
    );
}

#[tokio::test]
async fn ask_validates_question() {
    let test_app = create_test_app();

    for payload in [r#"{}"#, r#"{"question": ""}"#, r#"{"question": "   "}"#, "not json"] {
        let (status, body) = send(&test_app.app, ask_request(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {payload}");
        assert!(body["detail"].is_string(), "payload {payload}");
    }

    let (_, body) = send(&test_app.app, ask_request(r#"{"question": null}"#)).await;
    assert_eq!(body["detail"], "Missing question");
}

#[tokio::test]
async fn ask_answers_from_uploaded_document() {
    let test_app = create_test_app();

    send(
        &test_app.app,
        multipart_request("file", "a.pdf", "the sky is blue"),
    )
    .await;
    let (status, body) = send(
        &test_app.app,
        ask_request(r#"{"question": "what color is the sky"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["question"], "what color is the sky");
    assert!(
        body["answer"]
            .as_str()
            .is_some_and(|a| a.contains("the sky is blue"))
    );

    send(
        &test_app.app,
        multipart_request("file", "b.pdf", "the grass is green"),
    )
    .await;
    let (_, body) = send(
        &test_app.app,
        ask_request(r#"{"question": "what color is the sky"}"#),
    )
    .await;

    let answer = body["answer"].as_str().expect("answer should be a string");
    assert!(!answer.contains("the sky is blue"));
    assert!(answer.contains("the grass is green"));
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let test_app = create_test_app_with(ServerConfig {
        max_upload_bytes: 64,
        ..ServerConfig::default()
    });

    let response = test_app
        .app
        .clone()
        .oneshot(multipart_request("file", "big.pdf", &"x".repeat(1000)))
        .await
        .expect("router should respond");

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(!test_app.pipeline.store().exists());
}

#[tokio::test]
async fn cors_allows_any_origin_by_default() {
    let test_app = create_test_app();

    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .expect("should build request");
    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond");

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

#[test]
fn cors_rejects_invalid_origin() {
    assert!(cors_layer(&["http://ok.example".to_string()]).is_ok());
    assert!(matches!(
        cors_layer(&["bad\norigin".to_string()]),
        Err(RagError::Config(_))
    ));
}

#[test]
fn api_error_status_mapping() {
    assert_eq!(
        ApiError::from(RagError::EmptyDocument).status,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        ApiError::from(RagError::InvalidInput("Missing question".to_string())),
        ApiError::bad_request("Missing question")
    );
    assert_eq!(
        ApiError::from(RagError::Embedding("down".to_string())).status,
        StatusCode::INTERNAL_SERVER_ERROR
    );
}
