// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code)]

use async_trait::async_trait;
use roster_model::{NewReport, NewUser, Report, ReportId, User, UserId};
use roster_render::{write_pdf, RasterizeError, Rasterizer, TemplateRenderer};
use roster_server::{build_router, AppState, ReportService};
use roster_store::{RecordStore, SqliteStore, StoreError};
use serde_json::Value;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

pub const FAKE_PDF: &[u8] = b"%PDF-1.4\n1 0 obj<<>>endobj\n%%EOF\n";

/// Writes a fixed PDF and remembers the HTML it was handed.
#[derive(Default)]
pub struct RecordingRasterizer {
    calls: AtomicUsize,
    last_html: Mutex<Option<String>>,
}

impl RecordingRasterizer {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_html(&self) -> String {
        self.last_html
            .lock()
            .expect("lock html")
            .clone()
            .expect("rasterizer was called")
    }
}

#[async_trait]
impl Rasterizer for RecordingRasterizer {
    fn engine_tag(&self) -> &'static str {
        "recording"
    }

    async fn rasterize(&self, html: &str, output: &Path) -> Result<(), RasterizeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_html.lock().expect("lock html") = Some(html.to_string());
        write_pdf(output, FAKE_PDF).await
    }
}

pub struct FailingRasterizer;

#[async_trait]
impl Rasterizer for FailingRasterizer {
    fn engine_tag(&self) -> &'static str {
        "failing"
    }

    async fn rasterize(&self, _html: &str, _output: &Path) -> Result<(), RasterizeError> {
        Err(RasterizeError::Launch(
            "no browser available in test".to_string(),
        ))
    }
}

/// Delegates to SQLite but refuses to record reports.
pub struct ReportHistoryDown(pub SqliteStore);

#[async_trait]
impl RecordStore for ReportHistoryDown {
    fn backend_tag(&self) -> &'static str {
        "report-history-down"
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        self.0.list_users().await
    }

    async fn get_user(&self, id: UserId) -> Result<User, StoreError> {
        self.0.get_user(id).await
    }

    async fn create_user(&self, user: NewUser) -> Result<UserId, StoreError> {
        self.0.create_user(user).await
    }

    async fn list_users_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError> {
        self.0.list_users_by_ids(ids).await
    }

    async fn list_users_by_name(&self) -> Result<Vec<User>, StoreError> {
        self.0.list_users_by_name().await
    }

    async fn list_reports(&self) -> Result<Vec<Report>, StoreError> {
        self.0.list_reports().await
    }

    async fn create_report(&self, _report: NewReport) -> Result<ReportId, StoreError> {
        Err(StoreError::Persistence("reports table is read-only".to_string()))
    }
}

pub struct TestApp {
    pub addr: SocketAddr,
    pub store: SqliteStore,
    pub output_dir: PathBuf,
    pub template_dir: PathBuf,
    _root: TempDir,
}

impl TestApp {
    pub fn report_files(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.output_dir) else {
            return Vec::new();
        };
        let mut names = entries
            .filter_map(Result::ok)
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        names.sort();
        names
    }
}

pub async fn spawn_app(rasterizer: Arc<dyn Rasterizer>) -> TestApp {
    spawn_app_with(rasterizer, |store| Arc::new(store) as Arc<dyn RecordStore>).await
}

/// Starts the router on an ephemeral port over a fresh seeded database.
pub async fn spawn_app_with(
    rasterizer: Arc<dyn Rasterizer>,
    wrap_store: impl FnOnce(SqliteStore) -> Arc<dyn RecordStore>,
) -> TestApp {
    let root = tempfile::tempdir().expect("tempdir");
    let output_dir = root.path().join("generated-reports");
    let template_dir = root.path().join("templates");
    std::fs::create_dir_all(&template_dir).expect("template dir");

    let store = SqliteStore::open(&root.path().join("roster.sqlite")).expect("open store");
    store.seed_sample_users().await.expect("seed");
    let dyn_store = wrap_store(store.clone());

    let renderer = TemplateRenderer::new(&template_dir).expect("renderer");
    let reports = ReportService::new(dyn_store.clone(), renderer, rasterizer, output_dir.clone());
    let app = build_router(AppState::new(dyn_store, reports));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    TestApp {
        addr,
        store,
        output_dir,
        template_dir,
        _root: root,
    }
}

pub struct RawResponse {
    pub status: u16,
    pub head: String,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn header(&self, name: &str) -> Option<String> {
        self.head.lines().skip(1).find_map(|line| {
            let (k, v) = line.split_once(':')?;
            k.trim()
                .eq_ignore_ascii_case(name)
                .then(|| v.trim().to_string())
        })
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("json body")
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

pub async fn send_raw(
    addr: SocketAddr,
    method: &str,
    path: &str,
    headers: &[(&str, &str)],
    body: Option<&str>,
) -> RawResponse {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    let mut req = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    for (k, v) in headers {
        req.push_str(&format!("{k}: {v}\r\n"));
    }
    if let Some(body) = body {
        req.push_str("Content-Type: application/json\r\n");
        req.push_str(&format!("Content-Length: {}\r\n\r\n{body}", body.len()));
    } else {
        req.push_str("\r\n");
    }
    stream.write_all(req.as_bytes()).await.expect("write request");

    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await.expect("read response");
    let split = buf
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("http response must have separator");
    let head = String::from_utf8_lossy(&buf[..split]).into_owned();
    let body = buf[split + 4..].to_vec();
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .expect("http status");
    RawResponse { status, head, body }
}

pub async fn get(addr: SocketAddr, path: &str) -> RawResponse {
    send_raw(addr, "GET", path, &[], None).await
}

pub async fn post_json(addr: SocketAddr, path: &str, body: &str) -> RawResponse {
    send_raw(addr, "POST", path, &[], Some(body)).await
}
