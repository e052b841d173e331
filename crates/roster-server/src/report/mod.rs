// SPDX-License-Identifier: Apache-2.0

//! The report pipeline: resolve users, render HTML, rasterize, record.
//!
//! A report row is written only after the PDF exists on disk, so the
//! history never points at a file that was not produced. The reverse is
//! allowed: a PDF whose row failed to persist stays behind as an orphan.

use chrono::Utc;
use roster_model::{GenerateReportRequest, NewReport, ReportId, User, UserId, ValidationError};
use roster_render::{
    RasterizeError, Rasterizer, RenderError, RenderedReport, ReportContext, TemplateRenderer,
};
use roster_store::{RecordStore, StoreError};
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub const DOWNLOAD_ROUTE_PREFIX: &str = "/downloads";
pub const REPORT_FILE_PREFIX: &str = "report_";
pub const REPORT_FILE_EXTENSION: &str = ".pdf";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStage {
    ResolveUsers,
    Render,
    Rasterize,
    Persist,
}

impl ReportStage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ResolveUsers => "resolve_users",
            Self::Render => "render",
            Self::Rasterize => "rasterize",
            Self::Persist => "persist",
        }
    }
}

#[derive(Debug)]
#[non_exhaustive]
pub enum ReportError {
    Validation(ValidationError),
    ResolveUsers(StoreError),
    Render(RenderError),
    Rasterize(RasterizeError),
    Persist(StoreError),
}

impl ReportError {
    /// Stage the pipeline stopped at; `None` for rejected input.
    #[must_use]
    pub const fn stage(&self) -> Option<ReportStage> {
        match self {
            Self::Validation(_) => None,
            Self::ResolveUsers(_) => Some(ReportStage::ResolveUsers),
            Self::Render(_) => Some(ReportStage::Render),
            Self::Rasterize(_) => Some(ReportStage::Rasterize),
            Self::Persist(_) => Some(ReportStage::Persist),
        }
    }
}

impl Display for ReportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(e) => write!(f, "{e}"),
            Self::ResolveUsers(e) => write!(f, "resolving users failed: {e}"),
            Self::Render(e) => write!(f, "rendering failed: {e}"),
            Self::Rasterize(e) => write!(f, "pdf generation failed: {e}"),
            Self::Persist(e) => write!(f, "recording report failed: {e}"),
        }
    }
}

impl std::error::Error for ReportError {}

impl From<ValidationError> for ReportError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedReport {
    pub report_id: ReportId,
    pub filename: String,
    pub download_url: String,
    pub user_count: usize,
}

/// True for names this service could have produced: `report_` followed by
/// ASCII alphanumerics or `-`, ending in `.pdf`.
#[must_use]
pub fn is_report_file_name(name: &str) -> bool {
    let Some(stem) = name
        .strip_prefix(REPORT_FILE_PREFIX)
        .and_then(|rest| rest.strip_suffix(REPORT_FILE_EXTENSION))
    else {
        return false;
    };
    !stem.is_empty() && stem.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[must_use]
pub fn new_report_file_name() -> String {
    format!(
        "{REPORT_FILE_PREFIX}{}{REPORT_FILE_EXTENSION}",
        Uuid::new_v4()
    )
}

#[must_use]
pub fn download_url(filename: &str) -> String {
    format!("{DOWNLOAD_ROUTE_PREFIX}/{filename}")
}

pub struct ReportService {
    store: Arc<dyn RecordStore>,
    renderer: Arc<TemplateRenderer>,
    rasterizer: Arc<dyn Rasterizer>,
    output_dir: PathBuf,
}

impl ReportService {
    #[must_use]
    pub fn new(
        store: Arc<dyn RecordStore>,
        renderer: TemplateRenderer,
        rasterizer: Arc<dyn Rasterizer>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            renderer: Arc::new(renderer),
            rasterizer,
            output_dir: output_dir.into(),
        }
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    #[instrument(
        skip_all,
        fields(
            report_type = %request.report_type,
            requested_ids = request.user_ids.len(),
            engine = self.rasterizer.engine_tag(),
        )
    )]
    pub async fn generate(
        &self,
        request: GenerateReportRequest,
    ) -> Result<GeneratedReport, ReportError> {
        let started = Instant::now();

        let stage_started = Instant::now();
        let users = self
            .resolve_users(&request.user_ids)
            .await
            .map_err(ReportError::ResolveUsers)?;
        stage_done(ReportStage::ResolveUsers, stage_started, users.len());
        let user_count = users.len();

        let stage_started = Instant::now();
        let rendered = self.render(&request, users).await?;
        stage_done(ReportStage::Render, stage_started, user_count);

        let stage_started = Instant::now();
        let filename = new_report_file_name();
        let output = self.output_dir.join(&filename);
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| {
                ReportError::Rasterize(RasterizeError::Write(format!(
                    "{}: {e}",
                    self.output_dir.display()
                )))
            })?;
        self.rasterizer
            .rasterize(&rendered.html, &output)
            .await
            .map_err(ReportError::Rasterize)?;
        stage_done(ReportStage::Rasterize, stage_started, user_count);

        let stage_started = Instant::now();
        let report_id = self
            .store
            .create_report(NewReport {
                title: request.resolved_title(),
                description: request.description.clone(),
                report_type: request.report_type.clone(),
                generated_by: request.generated_by.clone(),
                file_path: filename.clone(),
            })
            .await
            .map_err(|e| {
                warn!(
                    file = %output.display(),
                    backend = self.store.backend_tag(),
                    error = %e,
                    "pdf written but report row was not recorded"
                );
                ReportError::Persist(e)
            })?;
        stage_done(ReportStage::Persist, stage_started, user_count);

        info!(
            report_id,
            file = %filename,
            users = user_count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "report generated"
        );
        Ok(GeneratedReport {
            report_id,
            download_url: download_url(&filename),
            filename,
            user_count,
        })
    }

    async fn resolve_users(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError> {
        if ids.is_empty() {
            self.store.list_users_by_name().await
        } else {
            self.store.list_users_by_ids(ids).await
        }
    }

    async fn render(
        &self,
        request: &GenerateReportRequest,
        users: Vec<User>,
    ) -> Result<RenderedReport, ReportError> {
        let renderer = Arc::clone(&self.renderer);
        let report_type = request.report_type.clone();
        let title = request.title.clone();
        let description = request.description.clone();
        let generated_at = Utc::now();
        tokio::task::spawn_blocking(move || {
            let ctx = ReportContext {
                title: title.as_deref(),
                description: description.as_deref(),
                generated_at,
            };
            renderer.render(&report_type, &users, &ctx)
        })
        .await
        .map_err(|e| {
            ReportError::Render(RenderError::Render {
                template: request.report_type.to_string(),
                reason: format!("render task failed: {e}"),
            })
        })?
        .map_err(ReportError::Render)
    }
}

fn stage_done(stage: ReportStage, started: Instant, users: usize) {
    info!(
        stage = stage.as_str(),
        users,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "stage complete"
    );
}
