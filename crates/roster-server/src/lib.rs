// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! HTTP surface of the roster-reports service.
//!
//! [`build_router`] wires the user, report and download routes onto an
//! [`AppState`]; `main.rs` only reads configuration and serves it.

use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use roster_store::RecordStore;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

pub mod config;
pub mod http;
mod middleware;
pub mod report;
pub mod telemetry;

pub const CRATE_NAME: &str = "roster-server";

pub use config::{validate_startup_config, ApiConfig, Environment, ServerConfig};
pub use http::request_tracing::RequestId;
pub use http::response_contract::{ApiError, ApiErrorCode};
pub use report::{GeneratedReport, ReportError, ReportService, ReportStage};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub reports: Arc<ReportService>,
    pub api: ApiConfig,
    /// Cleared once shutdown starts; `/healthz` then answers 503.
    pub accepting_requests: Arc<AtomicBool>,
    pub(crate) request_id_seed: Arc<AtomicU64>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, reports: ReportService) -> Self {
        Self::with_config(store, reports, ApiConfig::default())
    }

    #[must_use]
    pub fn with_config(
        store: Arc<dyn RecordStore>,
        reports: ReportService,
        api: ApiConfig,
    ) -> Self {
        Self {
            store,
            reports: Arc::new(reports),
            api,
            accepting_requests: Arc::new(AtomicBool::new(true)),
            request_id_seed: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn begin_shutdown_drain(&self) {
        self.accepting_requests.store(false, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_draining(&self) -> bool {
        !self.accepting_requests.load(Ordering::Relaxed)
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(http::handlers::healthz_handler))
        .route(
            "/api/users",
            get(http::users::list_users_handler).post(http::users::create_user_handler),
        )
        .route("/api/users/:id", get(http::users::get_user_handler))
        .route("/api/reports", get(http::reports::list_reports_handler))
        .route("/api/generate-pdf", post(http::reports::generate_pdf_handler))
        .route("/downloads/:filename", get(http::downloads::download_handler))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::request_tracing::request_tracing_middleware,
        ))
        .layer(DefaultBodyLimit::max(state.api.max_body_bytes))
        .with_state(state)
}
