//! HTTP contract tests for the upload service, driven through
//! `tower::ServiceExt::oneshot` without opening a socket.

#![cfg(feature = "server")]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use http_body_util::BodyExt;
use image::{DynamicImage, ImageFormat, RgbImage};
use img2pptx::server::router;
use img2pptx::{DeckConfig, PPTX_MIME_TYPE};
use std::io::Cursor;
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "----img2pptx-test-boundary";

fn png(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::new(width, height))
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

/// Encode `(field, filename, data)` parts as `multipart/form-data`.
fn multipart(parts: &[(&str, &str, Vec<u8>)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (field, filename, data) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn send(config: DeckConfig, request: Request<Body>) -> Response {
    router(Arc::new(config)).oneshot(request).await.unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

async fn error_message(response: Response) -> String {
    let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    json["error"].as_str().unwrap().to_string()
}

// ── Static routes ───────────────────────────────────────────────────────────

#[tokio::test]
async fn index_serves_upload_form() {
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = send(DeckConfig::default(), request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("<form"));
    assert!(html.contains("/upload"));
    assert!(html.contains("'files'"));
}

#[tokio::test]
async fn health_reports_version() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = send(DeckConfig::default(), request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

// ── Upload: failures ────────────────────────────────────────────────────────

#[tokio::test]
async fn upload_without_files_is_400() {
    let response = send(DeckConfig::default(), upload_request(multipart(&[]))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(response).await, "No files selected");
}

#[tokio::test]
async fn blank_file_input_is_400() {
    let body = multipart(&[("files", "", Vec::new())]);
    let response = send(DeckConfig::default(), upload_request(body)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!error_message(response).await.is_empty());
}

#[tokio::test]
async fn nothing_usable_is_400_with_message() {
    let body = multipart(&[
        ("files", "notes.txt", b"plain text".to_vec()),
        ("files", "broken.png", b"not a png".to_vec()),
    ]);
    let response = send(DeckConfig::default(), upload_request(body)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let message = error_message(response).await;
    assert!(message.starts_with("No valid images or PDF pages"), "{message}");
}

#[tokio::test]
async fn files_under_other_field_names_are_ignored() {
    let body = multipart(&[("attachment", "a.png", png(10, 10))]);
    let response = send(DeckConfig::default(), upload_request(body)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn non_multipart_body_is_400() {
    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("hello"))
        .unwrap();
    let response = send(DeckConfig::default(), request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(error_message(response).await.starts_with("Invalid upload"));
}

#[tokio::test]
async fn missing_content_type_is_json_400() {
    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .body(Body::empty())
        .unwrap();
    let response = send(DeckConfig::default(), request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!error_message(response).await.is_empty());
}

#[tokio::test]
async fn oversized_body_is_413() {
    let config = DeckConfig::builder().max_upload_bytes(1024).build().unwrap();
    let body = multipart(&[("files", "big.png", vec![0u8; 16 * 1024])]);
    let response = send(config, upload_request(body)).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(error_message(response).await.starts_with("Invalid upload"));
}

// ── Upload: success ─────────────────────────────────────────────────────────

#[tokio::test]
async fn corrupt_and_valid_upload_returns_one_slide_deck() {
    let body = multipart(&[
        ("files", "broken.jpg", b"\xFF\xD8 garbage".to_vec()),
        ("files", "photo.png", png(800, 600)),
    ]);
    let response = send(DeckConfig::default(), upload_request(body)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE].to_str().unwrap(),
        PPTX_MIME_TYPE
    );
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains("presentation.pptx"));

    let bytes = body_bytes(response).await;
    let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let slides = archive
        .file_names()
        .filter(|n| n.starts_with("ppt/slides/slide") && n.ends_with(".xml"))
        .count();
    assert_eq!(slides, 1);
}
