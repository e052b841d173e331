// SPDX-License-Identifier: Apache-2.0

use roster_render::RasterizerConfig;
use serde::Serialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;

/// Deployment mode. Only changes log verbosity and format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }

    #[must_use]
    pub const fn default_log_filter(self) -> &'static str {
        match self {
            Self::Development => "debug,hyper=info,tower=info,chromiumoxide=warn",
            Self::Production => "info,chromiumoxide=warn",
        }
    }

    #[must_use]
    pub const fn default_log_json(self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiConfig {
    pub max_body_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 64 * 1024,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub environment: Environment,
    pub log_json: bool,
    pub bind_host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub output_dir: PathBuf,
    pub template_dir: PathBuf,
    pub seed_sample_data: bool,
    pub shutdown_drain: Duration,
    pub api: ApiConfig,
    pub rasterizer: RasterizerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let environment = Environment::Development;
        Self {
            environment,
            log_json: environment.default_log_json(),
            bind_host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            db_path: PathBuf::from("data/roster.sqlite"),
            output_dir: PathBuf::from("generated-reports"),
            template_dir: PathBuf::from("templates"),
            seed_sample_data: false,
            shutdown_drain: Duration::from_millis(2000),
            api: ApiConfig::default(),
            rasterizer: RasterizerConfig::default(),
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source; unparsable values fall
    /// back to their defaults.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let d = Self::default();
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let flag = |name: &str, default: bool| {
            var(name)
                .and_then(|v| match v.trim() {
                    "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
                    "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
                    _ => None,
                })
                .unwrap_or(default)
        };
        let number = |name: &str, default: u64| {
            var(name)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(default)
        };
        let path = |name: &str, default: PathBuf| var(name).map(PathBuf::from).unwrap_or(default);

        let environment = var("ROSTER_ENV")
            .map(|v| Environment::parse(&v))
            .unwrap_or(d.environment);

        Self {
            environment,
            log_json: flag("ROSTER_LOG_JSON", environment.default_log_json()),
            bind_host: var("ROSTER_BIND_HOST").unwrap_or(d.bind_host),
            port: var("PORT")
                .and_then(|v| v.trim().parse::<u16>().ok())
                .unwrap_or(d.port),
            db_path: path("ROSTER_DB_PATH", d.db_path),
            output_dir: path("ROSTER_OUTPUT_DIR", d.output_dir),
            template_dir: path("ROSTER_TEMPLATE_DIR", d.template_dir),
            seed_sample_data: flag("ROSTER_SEED_SAMPLE_DATA", d.seed_sample_data),
            shutdown_drain: Duration::from_millis(number(
                "ROSTER_SHUTDOWN_DRAIN_MS",
                d.shutdown_drain.as_millis() as u64,
            )),
            api: ApiConfig {
                max_body_bytes: number("ROSTER_MAX_BODY_BYTES", d.api.max_body_bytes as u64)
                    as usize,
            },
            rasterizer: RasterizerConfig {
                chrome_executable: var("ROSTER_CHROME_PATH").map(PathBuf::from),
                no_sandbox: flag("ROSTER_CHROME_NO_SANDBOX", d.rasterizer.no_sandbox),
                load_timeout: Duration::from_millis(number(
                    "ROSTER_RENDER_TIMEOUT_MS",
                    d.rasterizer.load_timeout.as_millis() as u64,
                )),
                ..d.rasterizer
            },
        }
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, String> {
        let raw = format!("{}:{}", self.bind_host, self.port);
        raw.parse()
            .map_err(|e| format!("invalid bind address {raw}: {e}"))
    }
}

pub fn validate_startup_config(cfg: &ServerConfig) -> Result<(), String> {
    if cfg.api.max_body_bytes == 0 {
        return Err("ROSTER_MAX_BODY_BYTES must be > 0".to_string());
    }
    if cfg.rasterizer.load_timeout.is_zero() {
        return Err("ROSTER_RENDER_TIMEOUT_MS must be > 0".to_string());
    }
    if cfg.output_dir.as_os_str().is_empty() {
        return Err("ROSTER_OUTPUT_DIR must not be empty".to_string());
    }
    cfg.bind_addr().map(|_| ())
}
