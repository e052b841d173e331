// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use roster_render::{ChromiumRasterizer, TemplateRenderer};
use roster_server::telemetry::init_tracing;
use roster_server::{build_router, validate_startup_config, AppState, ReportService, ServerConfig};
use roster_store::SqliteStore;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("register SIGTERM");
        let mut sigint = signal(SignalKind::interrupt()).expect("register SIGINT");
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let cfg = ServerConfig::from_env();
    init_tracing(&cfg);
    validate_startup_config(&cfg)?;
    let bind_addr = cfg.bind_addr()?;

    let store = SqliteStore::open(&cfg.db_path)
        .map_err(|e| format!("open database {}: {e}", cfg.db_path.display()))?;
    if cfg.seed_sample_data {
        match store.seed_sample_users().await {
            Ok(0) => info!("user table not empty, sample data skipped"),
            Ok(n) => info!(users = n, "seeded sample users"),
            Err(e) => warn!(error = %e, "seeding sample users failed"),
        }
    }

    tokio::fs::create_dir_all(&cfg.output_dir)
        .await
        .map_err(|e| format!("create output dir {}: {e}", cfg.output_dir.display()))?;
    if !cfg.template_dir.is_dir() {
        warn!(
            template_dir = %cfg.template_dir.display(),
            "template directory missing, every report uses the default template"
        );
    }
    let renderer = TemplateRenderer::new(&cfg.template_dir)
        .map_err(|e| format!("load default template: {e}"))?;
    let rasterizer = Arc::new(ChromiumRasterizer::new(cfg.rasterizer.clone()));

    let store = Arc::new(store);
    let reports = ReportService::new(store.clone(), renderer, rasterizer, cfg.output_dir.clone());
    let state = AppState::with_config(store, reports, cfg.api.clone());
    let app = build_router(state.clone());

    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|e| format!("bind {bind_addr}: {e}"))?;
    info!(
        addr = %bind_addr,
        environment = cfg.environment.as_str(),
        db = %cfg.db_path.display(),
        output_dir = %cfg.output_dir.display(),
        "roster-server listening"
    );

    let drain = cfg.shutdown_drain;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            wait_for_shutdown_signal().await;
            state.begin_shutdown_drain();
            info!(drain_ms = drain.as_millis() as u64, "shutdown requested, draining");
            tokio::time::sleep(drain).await;
        })
        .await
        .map_err(|e| format!("server failed: {e}"))
}
