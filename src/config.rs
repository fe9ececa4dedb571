//! Application configuration.
//!
//! Values are read with priority config.toml > environment (.env) > default.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::paths;

// ==================== Config File ====================

/// Configuration file structure for config.toml
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    database: Option<DatabaseConfig>,
    server: Option<ServerConfig>,
    generator: Option<GeneratorFileConfig>,
}

#[derive(Debug, Deserialize)]
struct DatabaseConfig {
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ServerConfig {
    addr: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct GeneratorFileConfig {
    endpoint: Option<String>,
    model: Option<String>,
    api_key_env: Option<String>,
    temperature: Option<f32>,
    timeout_secs: Option<u64>,
    attempts: Option<u32>,
}

const CONFIG_FILE: &str = "config.toml";

fn read_config_file() -> FileConfig {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    match std::fs::read_to_string(CONFIG_FILE) {
        Ok(contents) => parse_config(&contents),
        Err(_) => FileConfig::default(),
    }
}

fn parse_config(contents: &str) -> FileConfig {
    toml::from_str(contents).unwrap_or_else(|e| {
        tracing::warn!("Ignoring malformed {}: {}", CONFIG_FILE, e);
        FileConfig::default()
    })
}

// ==================== Database Configuration ====================

/// Load database path with priority: config.toml > .env > default
pub fn load_database_path() -> PathBuf {
    let config = read_config_file();

    // Priority 1: config.toml
    if let Some(path) = config.database.and_then(|db| db.path) {
        tracing::info!("Using database from config.toml: {}", path);
        return PathBuf::from(path);
    }

    // Priority 2: .env DATABASE_PATH
    if let Ok(path) = std::env::var("DATABASE_PATH") {
        tracing::info!("Using database from DATABASE_PATH env: {}", path);
        return PathBuf::from(path);
    }

    // Default
    let default = PathBuf::from(paths::db_path());
    tracing::info!("Using default database path: {}", default.display());
    default
}

// ==================== Server Configuration ====================

/// Server address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

/// Server port
pub const SERVER_PORT: u16 = 3000;

/// Get the full server bind address (config.toml > PORT env > default)
pub fn server_bind_addr() -> String {
    let server = read_config_file().server;
    let addr = server
        .as_ref()
        .and_then(|s| s.addr.clone())
        .unwrap_or_else(|| SERVER_ADDR.to_string());
    let port = server
        .and_then(|s| s.port)
        .or_else(|| std::env::var("PORT").ok().and_then(|p| p.parse().ok()))
        .unwrap_or(SERVER_PORT);
    format!("{}:{}", addr, port)
}

// ==================== Session Configuration ====================

/// Review session expiration time in hours of inactivity
pub const SESSION_EXPIRY_HOURS: i64 = 1;

/// Probability threshold for session cleanup (0-255, lower = more frequent)
/// Value of 25 means ~10% chance (25/256) on each session access
pub const SESSION_CLEANUP_THRESHOLD: u8 = 25;

/// Cookie carrying the review session id
pub const SESSION_COOKIE: &str = "review_session";

// ==================== Generation Configuration ====================

/// Cards requested when the client does not say
pub const DEFAULT_MAX_ITEMS: usize = 20;

/// Upper bound on requested cards
pub const MAX_ITEMS_LIMIT: usize = 100;

/// Upper bound on cards produced by the local fallback
pub const FALLBACK_MAX_ITEMS: usize = 40;

/// Characters of source text embedded in the model prompt
pub const PROMPT_TEXT_LIMIT: usize = 30_000;

/// Largest accepted upload
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

pub const DEFAULT_AI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_AI_MODEL: &str = "gpt-4o";
pub const DEFAULT_AI_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_AI_TEMPERATURE: f32 = 0.4;
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_AI_ATTEMPTS: u32 = 1;

/// Settings for the remote flashcard generator
#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    pub endpoint: String,
    pub model: String,
    /// None disables the remote generator; the local fallback is used alone
    pub api_key: Option<String>,
    pub temperature: f32,
    pub timeout: Duration,
    pub attempts: u32,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_AI_ENDPOINT.to_string(),
            model: DEFAULT_AI_MODEL.to_string(),
            api_key: None,
            temperature: DEFAULT_AI_TEMPERATURE,
            timeout: Duration::from_secs(DEFAULT_AI_TIMEOUT_SECS),
            attempts: DEFAULT_AI_ATTEMPTS,
        }
    }
}

/// Load generator settings; the API key always comes from the environment
pub fn load_generator_settings() -> GeneratorSettings {
    let file = read_config_file().generator.unwrap_or_default();
    let settings = generator_settings_from(file, |var| std::env::var(var).ok());

    if settings.api_key.is_some() {
        tracing::info!("Remote generator enabled: {} ({})", settings.model, settings.endpoint);
    } else {
        tracing::info!("No generator API key set; using the local fallback generator only");
    }
    settings
}

fn generator_settings_from(
    file: GeneratorFileConfig,
    env: impl Fn(&str) -> Option<String>,
) -> GeneratorSettings {
    let defaults = GeneratorSettings::default();
    let key_env = file
        .api_key_env
        .unwrap_or_else(|| DEFAULT_AI_KEY_ENV.to_string());

    GeneratorSettings {
        endpoint: file
            .endpoint
            .or_else(|| env("AI_ENDPOINT"))
            .unwrap_or(defaults.endpoint),
        model: file.model.or_else(|| env("AI_MODEL")).unwrap_or(defaults.model),
        api_key: env(&key_env).filter(|k| !k.trim().is_empty()),
        temperature: file.temperature.unwrap_or(defaults.temperature),
        timeout: file
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout),
        attempts: file.attempts.unwrap_or(defaults.attempts).max(1),
    }
}
