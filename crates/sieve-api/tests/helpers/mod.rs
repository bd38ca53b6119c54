#![allow(dead_code)]

use axum_test::multipart::{MultipartForm, Part};
use axum_test::{TestResponse, TestServer};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

use sieve_api::{initialize_app, App};
use sieve_core::{IngestConfig, UploadStatus};

pub const PDF: &[u8] = &[0x25, 0x50, 0x44, 0x46, 0x2D, 0x31, 0x2E, 0x37, 0x0A];
pub const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46];
pub const EXE: &[u8] = &[0x4D, 0x5A, 0x90, 0x00, 0x03, 0x00];
pub const UNKNOWN: &[u8] = &[0x00, 0x01, 0x02, 0x03];

/// Test application backed by a temporary storage root
pub struct TestApp {
    pub server: TestServer,
    pub app: App,
    pub storage_root: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.storage_root.path().join("uploads")
    }
}

/// Defaults with a temp storage root, no background sweep, and one trusted proxy so
/// tests can pick the client address through `X-Forwarded-For`.
pub fn test_config(storage_root: &TempDir) -> IngestConfig {
    let mut config = IngestConfig {
        storage_root: storage_root.path().to_path_buf(),
        rate_limit_sweep_interval_secs: 0,
        ..IngestConfig::default()
    };
    config.base.trusted_proxy_count = 1;
    config
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(|_| {}).await
}

pub async fn setup_test_app_with(customize: impl FnOnce(&mut IngestConfig)) -> TestApp {
    let storage_root = TempDir::new().expect("Failed to create temp storage root");
    let mut config = test_config(&storage_root);
    customize(&mut config);

    let app = initialize_app(config.into())
        .await
        .expect("Failed to initialize app");
    let server = TestServer::new(app.router.clone()).expect("Failed to start test server");

    TestApp {
        server,
        app,
        storage_root,
    }
}

/// Like [`setup_test_app_with`], but served over a real socket with `ConnectInfo`, the way
/// the binary serves it.
pub async fn setup_socket_test_app_with(customize: impl FnOnce(&mut IngestConfig)) -> TestApp {
    let storage_root = TempDir::new().expect("Failed to create temp storage root");
    let mut config = test_config(&storage_root);
    customize(&mut config);

    let app = initialize_app(config.into())
        .await
        .expect("Failed to initialize app");
    let server = TestServer::new(
        app.router
            .clone()
            .into_make_service_with_connect_info::<SocketAddr>(),
    )
    .expect("Failed to start test server");

    TestApp {
        server,
        app,
        storage_root,
    }
}

pub fn file_form(filename: &str, content: &[u8]) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(content.to_vec())
            .file_name(filename)
            .mime_type("application/octet-stream"),
    )
}

/// POST /upload from the given client address (`None` sends no forwarding headers).
pub async fn upload(
    client: &TestServer,
    ip: Option<&str>,
    filename: &str,
    content: &[u8],
) -> TestResponse {
    let request = client.post("/upload").multipart(file_form(filename, content));
    match ip {
        Some(ip) => request.add_header("x-forwarded-for", ip.to_string()).await,
        None => request.await,
    }
}

pub fn processing_id(response: &TestResponse) -> String {
    let body: serde_json::Value = response.json();
    body["processingId"]
        .as_str()
        .expect("processingId missing from upload response")
        .to_string()
}

pub async fn current_status(client: &TestServer, id: &str) -> Option<UploadStatus> {
    let response = client.get(&format!("/status/{}", id)).await;
    if response.status_code() != 200 {
        return None;
    }
    let body: serde_json::Value = response.json();
    body["status"].as_str().and_then(|s| s.parse().ok())
}

/// Poll GET /status/{id} until `expected` is reported or `timeout` elapses.
pub async fn wait_for_status(
    client: &TestServer,
    id: &str,
    expected: UploadStatus,
    timeout: Duration,
) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if current_status(client, id).await == Some(expected) {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
