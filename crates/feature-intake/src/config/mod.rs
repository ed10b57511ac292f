use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::workflows::proposal::ScoreScale;

const DEFAULT_SHEET_RANGE: &str = "Sheet1!A1";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const DEFAULT_CSV_PATH: &str = "feature-requests.csv";

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
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub store: StoreConfig,
    pub scale: ScoreScale,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let scale = match env::var("RICE_SCALE") {
            Ok(raw) => ScoreScale::parse(&raw).ok_or(ConfigError::InvalidScale(raw))?,
            Err(_) => ScoreScale::default(),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            store: StoreConfig::from_env()?,
            scale,
        })
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
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Which append-only store receives submitted proposals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    GoogleSheets(SheetsConfig),
    CsvFile { path: PathBuf },
}

impl StoreConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let backend = env::var("PROPOSAL_STORE").unwrap_or_else(|_| "csv".to_string());
        match backend.trim().to_ascii_lowercase().as_str() {
            "sheets" | "google-sheets" | "google_sheets" => {
                Ok(Self::GoogleSheets(SheetsConfig::from_env()?))
            }
            "csv" | "file" => {
                let path = env::var("PROPOSAL_CSV_PATH")
                    .unwrap_or_else(|_| DEFAULT_CSV_PATH.to_string());
                Ok(Self::CsvFile {
                    path: PathBuf::from(path),
                })
            }
            _ => Err(ConfigError::InvalidStore(backend)),
        }
    }
}

/// Spreadsheet destination and the service account allowed to write to it.
#[derive(Clone, PartialEq, Eq)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    pub range: String,
    pub client_email: String,
    pub private_key: String,
    pub token_uri: String,
}

impl SheetsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            spreadsheet_id: required("GOOGLE_SHEET_ID")?,
            range: env::var("GOOGLE_SHEET_RANGE")
                .unwrap_or_else(|_| DEFAULT_SHEET_RANGE.to_string()),
            client_email: required("GOOGLE_CLIENT_EMAIL")?,
            private_key: expand_newlines(&required("GOOGLE_PRIVATE_KEY")?),
            token_uri: env::var("GOOGLE_TOKEN_URI")
                .unwrap_or_else(|_| DEFAULT_TOKEN_URI.to_string()),
        })
    }
}

impl fmt::Debug for SheetsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetsConfig")
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("range", &self.range)
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(name)),
    }
}

/// Keys pasted into a single-line env var carry literal `\n` sequences.
fn expand_newlines(raw: &str) -> String {
    raw.replace("\\n", "\n")
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidStore(String),
    InvalidScale(String),
    MissingVar(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidStore(value) => {
                write!(f, "PROPOSAL_STORE must be 'sheets' or 'csv', got '{value}'")
            }
            ConfigError::InvalidScale(value) => {
                write!(f, "RICE_SCALE must be 'weighted' or 'slider', got '{value}'")
            }
            ConfigError::MissingVar(name) => write!(f, "{name} must be set"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidStore(_)
            | ConfigError::InvalidScale(_)
            | ConfigError::MissingVar(_) => None,
        }
    }
}

/// Serialises tests that read or mutate process environment variables.
#[cfg(test)]
pub(crate) fn env_guard() -> &'static std::sync::Mutex<()> {
    static GUARD: std::sync::OnceLock<std::sync::Mutex<()>> = std::sync::OnceLock::new();
    GUARD.get_or_init(|| std::sync::Mutex::new(()))
}
