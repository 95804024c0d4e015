//! Analyzer Configuration
//!
//! Loads runtime configuration by layering, in order: built-in defaults,
//! the `.env` file in the working directory, then process environment
//! variables. Process environment wins so deployments can override the
//! file without editing it.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// The secrets file scaffolded by setup and consumed here.
pub const ENV_FILE: &str = ".env";

/// Staging directory for incoming documents.
pub const INCOMING_DIR: &str = "incoming_pdfs";

/// The results ledger file.
pub const RESULTS_FILE: &str = "grading_results.json";

/// The rubric definitions file.
pub const RUBRICS_FILE: &str = "rubrics.json";

/// Runtime configuration for the analyzer.
#[derive(Clone, Debug)]
pub struct AnalyzerConfig {
    /// Google AI Studio API key for document analysis.
    pub gemini_api_key: String,
    /// Gemini API base URL.
    pub gemini_api_url: String,
    /// Gemini model identifier.
    pub gemini_model: String,
    /// Gmail address the analyzer sends and receives as.
    pub email_address: String,
    /// Gmail app password. Kept for the legacy IMAP deployment path;
    /// the built-in worker authenticates with the access token below.
    pub email_password: String,
    /// OAuth client ID for the Gmail API.
    pub gmail_client_id: String,
    /// OAuth client secret for the Gmail API.
    pub gmail_client_secret: String,
    /// Short-lived OAuth access token for the Gmail API.
    pub gmail_access_token: String,
    /// Address the HTTP server binds to.
    pub bind_addr: String,
    /// Port the HTTP server listens on.
    pub port: u16,
    /// Inbox poll interval in seconds.
    pub poll_interval_secs: u64,
}

/// Built-in defaults; secret fields start empty.
pub fn default_config() -> AnalyzerConfig {
    AnalyzerConfig {
        gemini_api_key: String::new(),
        gemini_api_url: "https://generativelanguage.googleapis.com".to_string(),
        gemini_model: "gemini-2.5-flash".to_string(),
        email_address: String::new(),
        email_password: String::new(),
        gmail_client_id: String::new(),
        gmail_client_secret: String::new(),
        gmail_access_token: String::new(),
        bind_addr: "0.0.0.0".to_string(),
        port: 10000,
        poll_interval_secs: 30,
    }
}

/// Parse `KEY=value` lines from an env file body. Blank lines and lines
/// starting with `#` are skipped; surrounding whitespace and matching
/// quotes around the value are trimmed.
pub fn parse_env_lines(contents: &str) -> HashMap<String, String> {
    let mut pairs = HashMap::new();

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            let mut value = value.trim();
            if value.len() >= 2
                && ((value.starts_with('"') && value.ends_with('"'))
                    || (value.starts_with('\'') && value.ends_with('\'')))
            {
                value = &value[1..value.len() - 1];
            }
            pairs.insert(key.to_string(), value.to_string());
        }
    }

    pairs
}

/// Load configuration from `.env` (if present) and the process environment.
///
/// A missing `.env` is not an error; deployments may supply everything via
/// real environment variables.
pub fn load_config() -> Result<AnalyzerConfig> {
    load_config_from(Path::new(ENV_FILE))
}

/// Load configuration using an explicit env-file path.
pub fn load_config_from(env_path: &Path) -> Result<AnalyzerConfig> {
    let mut pairs = HashMap::new();

    if env_path.exists() {
        let contents = fs::read_to_string(env_path)
            .with_context(|| format!("Failed to read {}", env_path.display()))?;
        pairs = parse_env_lines(&contents);
    }

    let get = |key: &str| -> Option<String> {
        env::var(key).ok().or_else(|| pairs.get(key).cloned())
    };

    let mut config = default_config();

    if let Some(v) = get("GEMINI_API_KEY") {
        config.gemini_api_key = v;
    }
    if let Some(v) = get("GEMINI_API_URL") {
        config.gemini_api_url = v;
    }
    if let Some(v) = get("GEMINI_MODEL") {
        config.gemini_model = v;
    }
    if let Some(v) = get("EMAIL_ADDRESS") {
        config.email_address = v;
    }
    if let Some(v) = get("EMAIL_PASSWORD") {
        config.email_password = v;
    }
    if let Some(v) = get("GMAIL_CLIENT_ID") {
        config.gmail_client_id = v;
    }
    if let Some(v) = get("GMAIL_CLIENT_SECRET") {
        config.gmail_client_secret = v;
    }
    if let Some(v) = get("GMAIL_ACCESS_TOKEN") {
        config.gmail_access_token = v;
    }
    if let Some(v) = get("BIND_ADDR") {
        config.bind_addr = v;
    }
    if let Some(v) = get("PORT") {
        config.port = v
            .parse()
            .with_context(|| format!("Invalid PORT value: {}", v))?;
    }
    if let Some(v) = get("POLL_INTERVAL_SECS") {
        config.poll_interval_secs = v
            .parse()
            .with_context(|| format!("Invalid POLL_INTERVAL_SECS value: {}", v))?;
    }

    Ok(config)
}

impl AnalyzerConfig {
    /// Whether the Gmail worker has enough credentials to start.
    pub fn has_gmail_credentials(&self) -> bool {
        !self.email_address.is_empty() && !self.gmail_access_token.is_empty()
    }
}
