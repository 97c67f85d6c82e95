// Configuration types module
// Typed view of `config.toml` plus `CALENDAR_*` overrides; defaults live in `Config::load_from`

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub storage: StorageConfig,
}

/// Bind address and runtime size
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Tokio worker threads, CPU cores when unset
    pub workers: Option<usize>,
    /// PEM certificate chain; HTTPS only when both this and `tls_key` load
    pub tls_cert: Option<String>,
    /// PEM private key (PKCS#8, PKCS#1 or SEC1)
    pub tls_key: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// error, warn, info or debug
    pub level: String,
    pub access_log: bool,
    /// `combined`, `common`, `json` or a `$variable` pattern
    pub access_log_format: String,
    /// stdout when unset
    pub access_log_file: Option<String>,
    /// stderr when unset
    pub error_log_file: Option<String>,
}

/// Connection limits, all timeouts in seconds
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    /// 0 disables keep-alive
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    /// Unlimited when unset
    pub max_connections: Option<u64>,
}

/// Request handling shared by the API and the client bundle
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    /// Value of the `Server` header
    pub server_name: String,
    /// Origins echoed back in `Access-Control-Allow-Origin`
    pub allowed_origins: Vec<String>,
    /// Largest accepted request body in bytes
    pub max_body_size: u64,
    /// Directory holding the client bundle
    pub public_dir: String,
    /// File served for `/`
    pub index_file: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// JSON file holding `{"events": [...]}`
    pub data_path: String,
}
