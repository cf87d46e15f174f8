use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::workflows::proxy::PROXY_PATH;

pub const DEFAULT_MODEL: &str = "deepseek-v3-0324";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://api.lkeap.cloud.tencent.com/v1";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Test => "test",
            Self::Production => "production",
        }
    }
}

/// Top-level configuration, resolved once at startup and injected into the components.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub analysis: AnalysisConfig,
    pub upstream: UpstreamConfig,
    pub catalog_path: Option<PathBuf>,
    proxy_url_configured: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = match env::var("APP_PORT") {
            Ok(raw) => raw.parse::<u16>().map_err(|_| ConfigError::InvalidPort)?,
            Err(_) => DEFAULT_PORT,
        };
        let server = ServerConfig { host, port };

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_format = LogFormat::from_str(
            &env::var("APP_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string()),
        );

        let default_model = non_empty_var("LKEAP_DEFAULT_MODEL")
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let timeout = Duration::from_millis(parse_u64("API_TIMEOUT", DEFAULT_TIMEOUT_MS)?);

        let provider = match non_empty_var("ANALYSIS_PROVIDER") {
            Some(raw) => ProviderKind::parse(&raw).ok_or(ConfigError::InvalidProvider(raw))?,
            None => ProviderKind::Remote,
        };

        let configured_proxy_url = non_empty_var("ANALYSIS_PROXY_URL");
        let proxy_url_configured = configured_proxy_url.is_some();
        let analysis = AnalysisConfig {
            proxy_url: configured_proxy_url.unwrap_or_else(|| server.local_url(PROXY_PATH)),
            default_model: default_model.clone(),
            timeout,
            max_retries: parse_u32("ANALYSIS_MAX_RETRIES", 0)?,
            retry_backoff: Duration::from_millis(parse_u64("ANALYSIS_RETRY_BACKOFF_MS", 500)?),
            provider,
        };

        let upstream = UpstreamConfig {
            base_url: non_empty_var("LKEAP_BASE_URL")
                .unwrap_or_else(|| DEFAULT_UPSTREAM_BASE_URL.to_string()),
            api_key: non_empty_var("LKEAP_API_KEY"),
            default_model,
            timeout,
        };

        Ok(Self {
            environment,
            server,
            telemetry: TelemetryConfig {
                log_level,
                format: log_format,
            },
            analysis,
            upstream,
            catalog_path: non_empty_var("QUESTION_CATALOG_PATH").map(PathBuf::from),
            proxy_url_configured,
        })
    }

    /// Applies command-line bind overrides. Unless `ANALYSIS_PROXY_URL` was set, the
    /// pipeline keeps pointing at this server's own proxy route.
    pub fn override_server(&mut self, host: Option<String>, port: Option<u16>) {
        if let Some(host) = host {
            self.server.host = host;
        }
        if let Some(port) = port {
            self.server.port = port;
        }
        if !self.proxy_url_configured {
            self.analysis.proxy_url = self.server.local_url(PROXY_PATH);
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_u64(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match non_empty_var(key) {
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { key, value: raw }),
        None => Ok(default),
    }
}

fn parse_u32(key: &'static str, default: u32) -> Result<u32, ConfigError> {
    match non_empty_var(key) {
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidNumber { key, value: raw }),
        None => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }

    /// URL under which this server is reachable from the same host. Wildcard binds map to
    /// loopback.
    pub fn local_url(&self, path: &str) -> String {
        let host = match self.host.parse::<IpAddr>() {
            Ok(IpAddr::V4(ip)) if ip.is_unspecified() => DEFAULT_HOST.to_string(),
            Ok(IpAddr::V6(ip)) if ip.is_unspecified() => "[::1]".to_string(),
            Ok(IpAddr::V6(ip)) => format!("[{ip}]"),
            _ => self.host.clone(),
        };
        format!("http://{host}:{}{path}", self.port)
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
}

impl LogFormat {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" => Self::Pretty,
            _ => Self::Compact,
        }
    }
}

/// Which provider answers analysis requests first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Remote,
    Canned,
}

impl ProviderKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "remote" | "proxy" => Some(Self::Remote),
            "canned" | "offline" | "mock" => Some(Self::Canned),
            _ => None,
        }
    }
}

/// Values consumed by the analysis pipeline.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub proxy_url: String,
    pub default_model: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
    pub provider: ProviderKind,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            proxy_url: ServerConfig {
                host: DEFAULT_HOST.to_string(),
                port: DEFAULT_PORT,
            }
            .local_url(PROXY_PATH),
            default_model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            max_retries: 0,
            retry_backoff: Duration::from_millis(500),
            provider: ProviderKind::Remote,
        }
    }
}

/// Upstream chat-completion endpoint the proxy forwards to.
#[derive(Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub default_model: String,
    pub timeout: Duration,
}

impl UpstreamConfig {
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

// Keeps the credential out of debug logs.
impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("default_model", &self.default_model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str, value: String },
    InvalidProvider(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key} must be a non-negative integer (got '{value}')")
            }
            ConfigError::InvalidProvider(value) => {
                write!(f, "ANALYSIS_PROVIDER must be 'remote' or 'canned' (got '{value}')")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidProvider(_) => None,
        }
    }
}
