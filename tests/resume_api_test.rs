mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::{json, Value as JsonValue};

use common::{Options, TestApp};

fn upload(token: &str, filename: Option<&str>, body: Vec<u8>) -> Request<Body> {
    let uri = match filename {
        Some(name) => format!("/api/upload-resume?filename={name}"),
        None => "/api/upload-resume".to_string(),
    };
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn uploaded_resume_is_served_back() {
    let app = TestApp::new();
    let candidate = app.candidate("ravi@mail.test").await;
    let pdf = b"%PDF-1.7 fake resume".to_vec();

    let (status, _, body) = app.send(upload(&candidate, None, pdf.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let body: JsonValue = serde_json::from_slice(&body).unwrap();
    let url = body["url"].as_str().unwrap();
    assert!(url.starts_with("http://localhost:8000/uploads/resumes/"));
    assert!(url.ends_with("-resume.pdf"));

    let path = url.strip_prefix("http://localhost:8000").unwrap();
    let fetch = Request::builder().uri(path).body(Body::empty()).unwrap();
    let (status, _, served) = app.send(fetch).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(served.to_vec(), pdf);
}

#[tokio::test]
async fn upload_rejects_bad_files() {
    let app = TestApp::with_options(Options {
        max_upload_bytes: 1024,
        ..Options::default()
    });
    let hr = app.hr("asha@acme.test").await;

    let (status, _, _) = app
        .send(upload(&hr, Some("payload.exe"), b"MZ".to_vec()))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = app
        .send(upload(&hr, Some("cv.pdf"), b"plain text".to_vec()))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = app.send(upload(&hr, Some("cv.txt"), Vec::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = app
        .send(upload(&hr, Some("cv.txt"), vec![b'a'; 4096]))
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

    let anonymous = Request::builder()
        .method("POST")
        .uri("/api/upload-resume?filename=cv.txt")
        .body(Body::from("hello"))
        .unwrap();
    assert_eq!(app.send(anonymous).await.0, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn skills_fall_back_to_splitting_and_are_saved() {
    let app = TestApp::with_options(Options {
        model_answer: "Python, Go; Rust".to_string(),
        ..Options::default()
    });
    let candidate = app.candidate("ravi@mail.test").await;

    let (status, body) = app
        .call(
            "POST",
            "/api/extract-skills",
            Some(&candidate),
            Some(json!({
                "resumeUrl": "https://files.example/ravi.txt",
                "mimeType": "text/plain"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["skills"], json!(["Python", "Go", "Rust"]));

    let (_, profile) = app
        .call("GET", "/api/user/profile", Some(&candidate), None)
        .await;
    assert_eq!(profile["skills"], json!(["Python", "Go", "Rust"]));
}

#[tokio::test]
async fn skill_extraction_rejects_unsupported_input() {
    let app = TestApp::new();
    let candidate = app.candidate("ravi@mail.test").await;
    let hr = app.hr("asha@acme.test").await;

    let (status, _) = app
        .call(
            "POST",
            "/api/extract-skills",
            Some(&candidate),
            Some(json!({ "resumeUrl": "https://files.example/cv.png", "mimeType": "image/png" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(
            "POST",
            "/api/extract-skills",
            Some(&candidate),
            Some(json!({ "mimeType": "text/plain" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(
            "POST",
            "/api/extract-skills",
            Some(&hr),
            Some(json!({ "resumeUrl": "https://files.example/cv.txt", "mimeType": "text/plain" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
