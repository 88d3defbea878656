use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::{TestResponse, TestServer};
use pretty_assertions::assert_eq;
use std::path::Path;
use std::sync::Arc;
use upload_relay::{
    app::{App, AppServices},
    models::UploadResult,
    storage::{LocalDiskStore, MockStorage, RelayClient},
    web::create_app,
};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn server_with(storage: MockStorage, relay: Option<RelayClient>) -> TestServer {
    let app = App::with_services(AppServices {
        storage: Box::new(storage),
        relay,
    });
    TestServer::new(create_app(Arc::new(app), Path::new("wwwroot"))).unwrap()
}

fn file_part(name: &str, content: &[u8]) -> Part {
    Part::bytes(content.to_vec())
        .file_name(name)
        .mime_type("application/octet-stream")
}

/// Rendered page with HTML-escaped slashes turned back into `/`.
fn page_text(response: &TestResponse) -> String {
    response.text().replace("&#x2f;", "/")
}

#[tokio::test]
async fn test_index_renders_upload_form() {
    let server = server_with(MockStorage::new(), None);

    let response = server.get("/").await;

    response.assert_status_ok();
    assert!(response.text().contains("action=\"/UploadFiles\""));
}

#[tokio::test]
async fn test_upload_files_renders_success_with_last_locator() {
    let storage = MockStorage::new().with_base_url("https://cdn.test".to_string());
    let server = server_with(storage.clone(), None);

    let form = MultipartForm::new()
        .add_part("files", file_part("first.jpg", b"one"))
        .add_part("files", file_part("second.jpg", b"two"));
    let response = server.post("/UploadFiles").multipart(form).await;

    response.assert_status_ok();
    let html = page_text(&response);
    assert!(html.contains("Upload succeeded"));
    assert!(html.contains("https://cdn.test/second.jpg"));
    assert!(!html.contains("https://cdn.test/first.jpg"));
    assert_eq!(storage.get_stored_names(), vec!["first.jpg", "second.jpg"]);
}

#[tokio::test]
async fn test_upload_files_skips_empty_parts_and_other_fields() {
    let storage = MockStorage::new();
    let server = server_with(storage.clone(), None);

    let form = MultipartForm::new()
        .add_text("note", "hello")
        .add_part("files", file_part("empty.txt", b""))
        .add_part("files", file_part("real.txt", b"content"));
    let response = server.post("/UploadFiles").multipart(form).await;

    response.assert_status_ok();
    assert_eq!(storage.get_stored_names(), vec!["real.txt"]);
}

#[tokio::test]
async fn test_upload_files_with_only_empty_parts_renders_error() {
    let storage = MockStorage::new();
    let server = server_with(storage.clone(), None);

    let form = MultipartForm::new().add_part("files", file_part("empty.txt", b""));
    let response = server.post("/UploadFiles").multipart(form).await;

    response.assert_status_ok();
    assert!(response.text().contains("Upload failed"));
    assert_eq!(storage.get_store_count(), 0);
}

#[tokio::test]
async fn test_upload_files_last_failure_renders_error_view() {
    let storage = MockStorage::new()
        .with_response(UploadResult::succeeded("https://cdn.test/ok.jpg"))
        .with_response(UploadResult::failed(Some("remote server error".to_string())));
    let server = server_with(storage, None);

    let form = MultipartForm::new()
        .add_part("files", file_part("ok.jpg", b"1"))
        .add_part("files", file_part("bad.jpg", b"2"));
    let response = server.post("/UploadFiles").multipart(form).await;

    let html = response.text();
    assert!(html.contains("Upload failed"));
    assert!(html.contains("remote server error"));
}

#[tokio::test]
async fn test_upload_files_through_relay_strategy() {
    let relay_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/UpLoadForByte.ashx"))
        .and(header("TxoooUploadFileType", ".PNG"))
        .respond_with(ResponseTemplate::new(200).set_body_string("http://img.test/x.png"))
        .expect(1)
        .mount(&relay_server)
        .await;

    let app = App::with_services(AppServices {
        storage: Box::new(RelayClient::new(relay_server.uri())),
        relay: None,
    });
    let server = TestServer::new(create_app(Arc::new(app), Path::new("wwwroot"))).unwrap();

    let form = MultipartForm::new().add_part("files", file_part("x.png", b"png"));
    let response = server.post("/UploadFiles").multipart(form).await;

    response.assert_status_ok();
    assert!(page_text(&response).contains("https://img.test/x.png"));
}

#[tokio::test]
async fn test_local_upload_is_served_back() {
    let root = tempfile::tempdir().unwrap();
    let app = App::with_services(AppServices {
        storage: Box::new(LocalDiskStore::new(root.path())),
        relay: None,
    });
    let server = TestServer::new(create_app(Arc::new(app), root.path())).unwrap();

    let form = MultipartForm::new().add_part("files", file_part("note.txt", b"stored text"));
    let html = page_text(&server.post("/UploadFiles").multipart(form).await);

    let start = html.find("/upload/img_").unwrap();
    let end = start + html[start..].find('"').unwrap();
    let link = &html[start..end];
    assert!(link.ends_with(".txt"));

    let served = server.get(link).await;
    served.assert_status_ok();
    assert_eq!(served.text(), "stored text");
}

#[tokio::test]
async fn test_upload_file_by_url_blank_is_bad_request_without_outbound_call() {
    let relay_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&relay_server)
        .await;

    let server = server_with(
        MockStorage::new(),
        Some(RelayClient::new(relay_server.uri())),
    );

    let response = server
        .get("/UploadFileByUrl")
        .add_query_param("url", "")
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = server.get("/UploadFileByUrl").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_file_by_url_returns_rewritten_uri() {
    let relay_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/UpLoadForByte.ashx"))
        .and(query_param("tx_down_url", "http://origin.test/a.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_string("http://img.test/a.jpg"))
        .mount(&relay_server)
        .await;

    let server = server_with(
        MockStorage::new(),
        Some(RelayClient::new(relay_server.uri())),
    );

    let response = server
        .get("/UploadFileByUrl")
        .add_query_param("url", "http://origin.test/a.jpg")
        .await;

    response.assert_status_ok();
    assert_eq!(response.text(), "https://img.test/a.jpg");
}

#[tokio::test]
async fn test_upload_file_by_url_sentinel_is_server_error() {
    let relay_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/UpLoadForByte.ashx"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ERROR"))
        .mount(&relay_server)
        .await;

    let server = server_with(
        MockStorage::new(),
        Some(RelayClient::new(relay_server.uri())),
    );

    let response = server
        .get("/UploadFileByUrl")
        .add_query_param("url", "http://origin.test/a.jpg")
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.text(), "remote server error");
}

#[tokio::test]
async fn test_upload_file_by_url_relay_failure_reports_status() {
    let relay_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/UpLoadForByte.ashx"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&relay_server)
        .await;

    let server = server_with(
        MockStorage::new(),
        Some(RelayClient::new(relay_server.uri())),
    );

    let response = server
        .get("/UploadFileByUrl")
        .add_query_param("url", "http://origin.test/a.jpg")
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.text().contains("503"));
}

#[tokio::test]
async fn test_upload_file_by_url_without_relay_is_server_error() {
    let server = server_with(MockStorage::new(), None);

    let response = server
        .get("/UploadFileByUrl")
        .add_query_param("url", "http://origin.test/a.jpg")
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.text(), "internal server error");
}

#[tokio::test]
async fn test_local_disk_fault_is_server_error() {
    let root = tempfile::tempdir().unwrap();
    // A regular file where the upload directory should be.
    std::fs::write(root.path().join("upload"), b"not a dir").unwrap();

    let app = App::with_services(AppServices {
        storage: Box::new(LocalDiskStore::new(root.path())),
        relay: None,
    });
    let server = TestServer::new(create_app(Arc::new(app), root.path())).unwrap();

    let form = MultipartForm::new().add_part("files", file_part("note.txt", b"stored text"));
    let response = server.post("/UploadFiles").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.text(), "internal server error");
}

#[tokio::test]
async fn test_routes_are_case_sensitive() {
    let server = server_with(MockStorage::new(), None);

    let form = MultipartForm::new().add_part("files", file_part("a.jpg", b"a"));
    let response = server.post("/uploadfiles").multipart(form).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = server
        .get("/uploadfilebyurl")
        .add_query_param("url", "http://origin.test/a.jpg")
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_calc_endpoints() {
    let server = server_with(MockStorage::new(), None);

    let response = server
        .get("/api/Calc/Sum")
        .add_query_param("num1", 2)
        .add_query_param("num2", 3)
        .await;
    response.assert_status_ok();
    assert_eq!(response.text(), "2 + 3 = 5.");

    let response = server
        .get("/api/Calc/SumInts")
        .add_query_param("num1", 2)
        .add_query_param("num2", 3)
        .await;
    assert_eq!(response.text(), "[ints]  2 + 3 = 5.");

    let response = server
        .get("/api/Calc/SumDoubles")
        .add_query_param("num1", 1.5)
        .add_query_param("num2", 2.25)
        .await;
    assert_eq!(response.text(), "[doubles]  1.5 + 2.25 = 3.75.");
}

#[tokio::test]
async fn test_calc_missing_operand_defaults_to_zero() {
    let server = server_with(MockStorage::new(), None);

    let response = server.get("/api/Calc/Sum").add_query_param("num1", 7).await;

    assert_eq!(response.text(), "7 + 0 = 7.");
}

#[tokio::test]
async fn test_calc_rejects_malformed_operand() {
    let server = server_with(MockStorage::new(), None);

    let response = server
        .get("/api/Calc/Sum")
        .add_query_param("num1", "two")
        .add_query_param("num2", 3)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}
