use std::collections::HashMap;

use anyhow::Result;

/// Placeholder key shipped in sample env files; treated as "not configured".
pub const PLACEHOLDER_API_KEY: &str = "your-watson-api-key";

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Process-wide configuration, loaded once at start-up and read-only after.
#[derive(Debug, Clone)]
pub struct Config {
    // Web server
    pub web_bind: String,
    pub web_port: u16,

    // Ingestion
    pub upload_dir: String,
    pub max_upload_bytes: usize,
    pub pdftotext_bin: String,
    pub extraction_timeout_s: u64,

    // NLU service
    pub watson_nlu_apikey: String,
    pub watson_nlu_url: String,
    pub watson_nlu_version: String,
    pub nlu_timeout_s: u64,
    pub nlu_max_chars: usize,

    /// "pretty" (default) or "json".
    pub log_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn parse_dotenv_str(contents: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((k, v)) = line.split_once('=') {
            let v = v.trim().trim_matches('"').trim_matches('\'');
            map.insert(k.trim().to_string(), v.to_string());
        }
    }
    map
}

fn parse_dotenv() -> HashMap<String, String> {
    std::fs::read_to_string(".env")
        .map(|contents| parse_dotenv_str(&contents))
        .unwrap_or_default()
}

fn get_str(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key).unwrap_or_else(|| default.to_string())
}

fn get_parsed<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load from the process environment, falling back to `.env` in the
    /// working directory, then to built-in defaults.
    pub fn from_env() -> Result<Self> {
        let dotenv = parse_dotenv();
        let config = Self::from_lookup(|key| {
            std::env::var(key).ok().or_else(|| dotenv.get(key).cloned())
        });
        if config.max_upload_bytes == 0 {
            anyhow::bail!("MAX_UPLOAD_BYTES must be greater than zero");
        }
        Ok(config)
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Config {
            web_bind: get_str(&lookup, "WEB_BIND", "0.0.0.0"),
            web_port: get_parsed(&lookup, "WEB_PORT", 5000),
            upload_dir: get_str(&lookup, "UPLOAD_DIR", "uploads"),
            max_upload_bytes: get_parsed(&lookup, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
            pdftotext_bin: get_str(&lookup, "PDFTOTEXT_BIN", "pdftotext"),
            extraction_timeout_s: get_parsed(&lookup, "EXTRACTION_TIMEOUT_S", 30),
            watson_nlu_apikey: get_str(&lookup, "WATSON_NLU_APIKEY", ""),
            watson_nlu_url: get_str(&lookup, "WATSON_NLU_URL", ""),
            watson_nlu_version: get_str(&lookup, "WATSON_NLU_VERSION", "2022-04-07"),
            nlu_timeout_s: get_parsed(&lookup, "NLU_TIMEOUT_S", 10),
            nlu_max_chars: get_parsed(&lookup, "NLU_MAX_CHARS", 50_000),
            log_format: get_str(&lookup, "LOG_FORMAT", "pretty"),
        }
    }

    /// True when both the NLU key and URL are set to real values.
    pub fn nlu_configured(&self) -> bool {
        let key = self.watson_nlu_apikey.trim();
        !key.is_empty() && key != PLACEHOLDER_API_KEY && !self.watson_nlu_url.trim().is_empty()
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.web_bind, self.web_port)
    }
}
