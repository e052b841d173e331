// SPDX-License-Identifier: Apache-2.0

use crate::config::{Environment, ServerConfig};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` when set and valid, otherwise the mode's default.
#[must_use]
pub fn env_filter(environment: Environment) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(environment.default_log_filter()))
}

pub fn init_tracing(cfg: &ServerConfig) {
    let filter = env_filter(cfg.environment);
    if cfg.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
