use std::fs;
use std::io::{Cursor, Read};
use std::path::PathBuf;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use flowforce::config::AppConfig;
use flowforce::{router, AppState};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

const BOUNDARY: &str = "flowforce-test-boundary";

enum Part<'a> {
    File { name: &'a str, content: Vec<u8> },
    Text { field: &'a str, value: &'a str },
}

fn fixture(name: &str) -> Vec<u8> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../flowforce-parser/tests/data")
        .join(name);
    fs::read(&path).unwrap_or_else(|err| panic!("failed to read fixture {}: {}", path.display(), err))
}

fn app() -> Router {
    router(AppState::default())
}

fn multipart_request(uri: &str, parts: Vec<Part<'_>>) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::File { name, content } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(&content);
            }
            Part::Text { field, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{field}\"\r\n\r\n{value}").as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn json_request(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

async fn send_json(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, request).await;
    let value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|err| panic!("response is not JSON ({err}): {}", String::from_utf8_lossy(&bytes)));
    (status, value)
}

#[tokio::test]
async fn index_serves_the_form() {
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("Water Flow Forces Calculator"));
}

#[tokio::test]
async fn defaults_follow_the_requested_shape() {
    let request = Request::builder()
        .uri("/api/defaults?shape=lattice_leg")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send_json(app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["parameters"]["shape"], "lattice_leg");
    assert_eq!(body["parameters"]["drag_coefficient"], 0.8);
    assert_eq!(body["parameters"]["face_area"], 20.0);
    assert_eq!(body["events"].as_array().unwrap().len(), 6);
    assert_eq!(body["default_event"], "1% AEP");
}

#[tokio::test]
async fn defaults_reject_unknown_shape() {
    let request = Request::builder()
        .uri("/api/defaults?shape=hexagonal")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send_json(app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("hexagonal"));
}

#[tokio::test]
async fn configured_defaults_apply_under_request_values() {
    let config = AppConfig::from_toml_str("[parameters]\nload_factor = 1.0\nwidth = 0.5\n").unwrap();
    let app = router(AppState::from_config(&config));
    let request = json_request(
        "/api/preview",
        &json!({
            "observation": { "depth": 2.0, "velocity": 3.0, "scour": 0.0 },
            "parameters": { "shape": "rectangular", "drag_coefficient": 1.2 }
        }),
    );
    let (status, body) = send_json(app, request).await;

    assert_eq!(status, StatusCode::OK);
    let f1 = body["forces"]["water_flow"]["force_kn"].as_f64().unwrap();
    assert!((f1 - 5.4).abs() < 1e-9, "F1 = {f1}");
    assert_eq!(body["parameters"]["load_factor"], 1.0);
}

#[tokio::test]
async fn preview_rejects_negative_velocity() {
    let request = json_request(
        "/api/preview",
        &json!({ "observation": { "depth": 2.0, "velocity": -1.0, "scour": 0.0 } }),
    );
    let (status, body) = send_json(app(), request).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("velocity"));
}

#[tokio::test]
async fn preview_rejects_malformed_json() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/preview")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"observation\": "))
        .unwrap();
    let (status, body) = send_json(app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn calculate_reports_each_file() {
    let request = multipart_request(
        "/api/calculate",
        vec![
            Part::File {
                name: "flood_events.csv",
                content: fixture("flood_events.csv"),
            },
            Part::File {
                name: "missing_scour.csv",
                content: fixture("missing_scour.csv"),
            },
            Part::Text {
                field: "events",
                value: "1% AEP",
            },
            Part::Text {
                field: "parameters",
                value: r#"{"load_factor": 1.0}"#,
            },
        ],
    );
    let (status, body) = send_json(app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["events"], "1% AEP");
    let reports = body["reports"].as_array().unwrap();
    assert_eq!(reports.len(), 2);

    let first = &reports[0];
    assert_eq!(first["row_count"], 4);
    let results = first["events"][0]["forces"]["results"].as_array().unwrap();
    assert_eq!(results.len(), 4);
    let f1 = results[0]["forces"]["water_flow"]["force_kn"].as_f64().unwrap();
    assert!((f1 - 4.901).abs() < 0.01);
    assert_eq!(results[2]["status"], "invalid");
    assert_eq!(first["events"][0]["summary"]["chart"].as_array().unwrap().len(), 3);

    let second = &reports[1];
    assert!(second["events"].as_array().unwrap().is_empty());
    assert_eq!(second["warnings"][0]["kind"], "missing_columns");
    assert_eq!(second["warnings"][0]["missing"][0], "1% AEP Event Scour");
}

#[tokio::test]
async fn unreadable_file_does_not_stop_the_others() {
    let request = multipart_request(
        "/api/calculate",
        vec![
            Part::File {
                name: "photo.png",
                content: vec![0x89, 0x50, 0x4e, 0x47, 0xff, 0x00],
            },
            Part::File {
                name: "flood_events.xlsx",
                content: fixture("flood_events.xlsx"),
            },
        ],
    );
    let (status, body) = send_json(app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reports"].as_array().unwrap().len(), 1);
    assert_eq!(body["reports"][0]["file_format"], "XLSX");
    assert_eq!(body["failures"][0]["file_name"], "photo.png");
}

#[tokio::test]
async fn invalid_parameters_are_unprocessable() {
    let request = multipart_request(
        "/api/calculate",
        vec![
            Part::File {
                name: "flood_events.csv",
                content: fixture("flood_events.csv"),
            },
            Part::Text {
                field: "parameters",
                value: r#"{"width": 0}"#,
            },
        ],
    );
    let (status, body) = send_json(app(), request).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("width"));
}

#[tokio::test]
async fn calculate_without_files_is_a_bad_request() {
    let request = multipart_request(
        "/api/calculate",
        vec![Part::Text {
            field: "events",
            value: "PMF",
        }],
    );
    let (status, _) = send_json(app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn uploads_over_the_limit_are_refused() {
    let state = AppState {
        max_upload_bytes: 64,
        ..AppState::default()
    };
    let request = multipart_request(
        "/api/calculate",
        vec![Part::File {
            name: "flood_events.csv",
            content: fixture("flood_events.csv"),
        }],
    );
    let (status, _) = send(router(state), request).await;

    assert!(status.is_client_error(), "status {status}");
}

#[tokio::test]
async fn bundle_returns_a_zip() {
    let request = multipart_request(
        "/api/bundle",
        vec![
            Part::File {
                name: "flood_events.csv",
                content: fixture("flood_events.csv"),
            },
            Part::Text {
                field: "events",
                value: "1% AEP, PMF",
            },
        ],
    );
    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/zip"
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
    let mut manifest = String::new();
    archive
        .by_name("parameters.json")
        .unwrap()
        .read_to_string(&mut manifest)
        .unwrap();
    let manifest: Value = serde_json::from_str(&manifest).unwrap();
    assert_eq!(manifest["events"], "1% AEP, PMF");

    let mut csv = String::new();
    archive
        .by_name("forces_results_flood_events.csv")
        .unwrap()
        .read_to_string(&mut csv)
        .unwrap();
    assert!(csv.lines().next().unwrap().contains("PMF Flow+Debris Force"));
}

#[tokio::test]
async fn bundle_manifest_lists_unreadable_uploads() {
    let request = multipart_request(
        "/api/bundle",
        vec![
            Part::File {
                name: "flood_events.csv",
                content: fixture("flood_events.csv"),
            },
            Part::File {
                name: "photo.png",
                content: vec![0x89, 0x50, 0x4e, 0x47, 0xff, 0x00],
            },
        ],
    );
    let (status, bytes) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    assert!(archive.by_name("forces_results_flood_events.csv").is_ok());
    assert!(archive.by_name("forces_results_photo.csv").is_err());

    let mut manifest = String::new();
    archive
        .by_name("parameters.json")
        .unwrap()
        .read_to_string(&mut manifest)
        .unwrap();
    let manifest: Value = serde_json::from_str(&manifest).unwrap();
    assert_eq!(manifest["files"].as_array().unwrap().len(), 1);
    assert_eq!(manifest["failures"][0]["file_name"], "photo.png");
    assert!(!manifest["failures"][0]["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn bundle_with_no_usable_files_is_unprocessable() {
    let request = multipart_request(
        "/api/bundle",
        vec![Part::File {
            name: "notes.bin",
            content: vec![0xff, 0xfe, 0x00, 0x01],
        }],
    );
    let (status, body) = send_json(app(), request).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("notes.bin"));
}
