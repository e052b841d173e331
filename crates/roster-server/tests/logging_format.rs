// SPDX-License-Identifier: Apache-2.0

mod support;

use roster_model::{GenerateReportInput, GenerateReportRequest};
use roster_render::TemplateRenderer;
use roster_server::ReportService;
use roster_store::SqliteStore;
use serde_json::Value;
use std::io;
use std::sync::{Arc, Mutex};
use support::{RecordingRasterizer, ReportHistoryDown};
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

struct BufferWriter(Arc<Mutex<Vec<u8>>>);

impl<'a> MakeWriter<'a> for SharedBuffer {
    type Writer = BufferWriter;

    fn make_writer(&'a self) -> Self::Writer {
        BufferWriter(Arc::clone(&self.0))
    }
}

impl io::Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "lock poisoned"))?;
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn captured_lines(sink: &SharedBuffer) -> Vec<Value> {
    let bytes = sink.0.lock().expect("lock output").clone();
    String::from_utf8(bytes)
        .expect("utf8 log output")
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).expect("each log line is json"))
        .collect()
}

fn json_capture() -> (SharedBuffer, tracing::subscriber::DefaultGuard) {
    let sink = SharedBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(sink.clone())
        .json()
        .with_max_level(Level::INFO)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (sink, guard)
}

fn summary_request() -> GenerateReportRequest {
    GenerateReportRequest::validate(GenerateReportInput {
        report_type: Some("summary".to_string()),
        ..GenerateReportInput::default()
    })
    .expect("request")
}

#[tokio::test]
async fn report_stages_are_logged_as_structured_json() {
    let (sink, _guard) = json_capture();

    let dir = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(SqliteStore::open_in_memory().expect("store"));
    store.seed_sample_users().await.expect("seed");
    let service = ReportService::new(
        store,
        TemplateRenderer::new(dir.path().join("templates")).expect("renderer"),
        Arc::new(RecordingRasterizer::default()),
        dir.path().join("out"),
    );
    let generated = service.generate(summary_request()).await.expect("generate");

    let lines = captured_lines(&sink);
    let stages = lines
        .iter()
        .filter(|l| l["fields"]["message"] == "stage complete")
        .filter_map(|l| l["fields"]["stage"].as_str())
        .collect::<Vec<_>>();
    assert_eq!(stages, vec!["resolve_users", "render", "rasterize", "persist"]);
    for line in &lines {
        assert!(line.get("timestamp").is_some());
        assert!(line.get("level").is_some());
    }

    let done = lines
        .iter()
        .find(|l| l["fields"]["message"] == "report generated")
        .expect("completion event");
    assert_eq!(done["fields"]["file"], generated.filename.as_str());
    assert_eq!(done["fields"]["users"], 5);
    assert!(done["fields"]["elapsed_ms"].is_u64());
}

#[tokio::test]
async fn unrecorded_pdf_warning_names_the_store_backend() {
    let (sink, _guard) = json_capture();

    let dir = tempfile::tempdir().expect("tempdir");
    let store = SqliteStore::open_in_memory().expect("store");
    let service = ReportService::new(
        Arc::new(ReportHistoryDown(store)),
        TemplateRenderer::new(dir.path().join("templates")).expect("renderer"),
        Arc::new(RecordingRasterizer::default()),
        dir.path().join("out"),
    );
    service
        .generate(summary_request())
        .await
        .expect_err("report history is down");

    let lines = captured_lines(&sink);
    let warning = lines
        .iter()
        .find(|l| l["fields"]["message"] == "pdf written but report row was not recorded")
        .expect("orphan warning");
    assert_eq!(warning["level"], "WARN");
    assert_eq!(warning["fields"]["backend"], "report-history-down");
}
