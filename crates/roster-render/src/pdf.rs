// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use futures::StreamExt;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

pub const A4_WIDTH_MM: f64 = 210.0;
pub const A4_HEIGHT_MM: f64 = 297.0;
pub const PAGE_MARGIN_MM: f64 = 20.0;
const MM_PER_INCH: f64 = 25.4;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RasterizeError {
    Launch(String),
    Load(String),
    Timeout(Duration),
    Print(String),
    Write(String),
}

impl Display for RasterizeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Launch(msg) => write!(f, "browser launch failed: {msg}"),
            Self::Load(msg) => write!(f, "content load failed: {msg}"),
            Self::Timeout(after) => write!(f, "content load timed out after {after:?}"),
            Self::Print(msg) => write!(f, "pdf print failed: {msg}"),
            Self::Write(msg) => write!(f, "pdf write failed: {msg}"),
        }
    }
}

impl std::error::Error for RasterizeError {}

/// Turns a self-contained HTML document into a PDF file.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    fn engine_tag(&self) -> &'static str;

    async fn rasterize(&self, html: &str, output: &Path) -> Result<(), RasterizeError>;
}

#[derive(Debug, Clone)]
pub struct RasterizerConfig {
    /// Auto-detected when unset.
    pub chrome_executable: Option<PathBuf>,
    pub no_sandbox: bool,
    pub launch_timeout: Duration,
    pub load_timeout: Duration,
}

impl Default for RasterizerConfig {
    fn default() -> Self {
        Self {
            chrome_executable: None,
            no_sandbox: false,
            launch_timeout: Duration::from_secs(20),
            load_timeout: Duration::from_secs(30),
        }
    }
}

fn mm_to_inches(mm: f64) -> f64 {
    mm / MM_PER_INCH
}

/// A4, backgrounds on, 20mm margins on every side.
#[must_use]
pub fn print_params() -> PrintToPdfParams {
    let margin = mm_to_inches(PAGE_MARGIN_MM);
    PrintToPdfParams {
        print_background: Some(true),
        paper_width: Some(mm_to_inches(A4_WIDTH_MM)),
        paper_height: Some(mm_to_inches(A4_HEIGHT_MM)),
        margin_top: Some(margin),
        margin_bottom: Some(margin),
        margin_left: Some(margin),
        margin_right: Some(margin),
        prefer_css_page_size: Some(false),
        ..PrintToPdfParams::default()
    }
}

/// One private Chromium process and its CDP event loop.
///
/// `close` shuts the browser down cleanly. If the session is dropped without
/// it, the event loop is aborted and the browser child is killed by
/// `Browser`'s own drop; the profile directory is removed either way.
struct EngineSession {
    browser: Option<Browser>,
    events: JoinHandle<()>,
    _profile: TempDir,
}

impl EngineSession {
    async fn launch(cfg: &RasterizerConfig) -> Result<Self, RasterizeError> {
        let profile = tempfile::Builder::new()
            .prefix("roster-chromium-")
            .tempdir()
            .map_err(|e| RasterizeError::Launch(format!("profile dir: {e}")))?;

        let mut builder = BrowserConfig::builder()
            .user_data_dir(profile.path())
            .launch_timeout(cfg.launch_timeout)
            .request_timeout(cfg.load_timeout)
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--hide-scrollbars");
        if let Some(path) = &cfg.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        if cfg.no_sandbox {
            builder = builder.no_sandbox();
        }
        let config = builder.build().map_err(RasterizeError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RasterizeError::Launch(e.to_string()))?;
        let events = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "chromium event loop stopped");
                    break;
                }
            }
        });

        Ok(Self {
            browser: Some(browser),
            events,
            _profile: profile,
        })
    }

    async fn print(&self, html: &str, load_timeout: Duration) -> Result<Vec<u8>, RasterizeError> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| RasterizeError::Launch("session already closed".to_string()))?;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| RasterizeError::Load(e.to_string()))?;

        // set_content resolves once the written document has loaded.
        match timeout(load_timeout, page.set_content(html)).await {
            Err(_) => return Err(RasterizeError::Timeout(load_timeout)),
            Ok(Err(e)) => return Err(RasterizeError::Load(e.to_string())),
            Ok(Ok(_)) => {}
        }

        page.pdf(print_params())
            .await
            .map_err(|e| RasterizeError::Print(e.to_string()))
    }

    async fn close(mut self) {
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                warn!(error = %e, "chromium close failed");
            }
            if let Err(e) = browser.wait().await {
                warn!(error = %e, "chromium wait failed");
            }
        }
        self.events.abort();
    }
}

impl Drop for EngineSession {
    fn drop(&mut self) {
        self.events.abort();
    }
}

/// Launches a fresh headless Chromium for every call.
#[derive(Debug, Clone, Default)]
pub struct ChromiumRasterizer {
    config: RasterizerConfig,
}

impl ChromiumRasterizer {
    #[must_use]
    pub fn new(config: RasterizerConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Rasterizer for ChromiumRasterizer {
    fn engine_tag(&self) -> &'static str {
        "chromium"
    }

    #[instrument(skip(self, html), fields(html_bytes = html.len(), output = %output.display()))]
    async fn rasterize(&self, html: &str, output: &Path) -> Result<(), RasterizeError> {
        let started = Instant::now();
        let session = EngineSession::launch(&self.config).await?;
        let printed = session.print(html, self.config.load_timeout).await;
        session.close().await;
        let bytes = printed?;
        write_pdf(output, &bytes).await?;
        info!(
            pdf_bytes = bytes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pdf rasterized"
        );
        Ok(())
    }
}

/// Writes through a sibling `.part` file so a failed write never leaves a
/// truncated PDF under the final name.
pub async fn write_pdf(output: &Path, bytes: &[u8]) -> Result<(), RasterizeError> {
    let mut partial = output.as_os_str().to_owned();
    partial.push(".part");
    let partial = PathBuf::from(partial);
    tokio::fs::write(&partial, bytes)
        .await
        .map_err(|e| RasterizeError::Write(format!("{}: {e}", partial.display())))?;
    if let Err(e) = tokio::fs::rename(&partial, output).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(RasterizeError::Write(format!("{}: {e}", output.display())));
    }
    Ok(())
}
