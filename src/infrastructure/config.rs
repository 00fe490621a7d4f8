use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_SUGGEST_PATH: &str = "/api/suggest-mapping";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Runtime settings for talking to the extraction service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    /// Base URL of the extraction service, without a trailing slash
    pub api_url: String,
    /// Path of the mapping-suggestion endpoint
    pub suggest_path: String,
    /// Upper bound for a single request; extraction can take minutes
    pub timeout: Duration,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL, DEFAULT_SUGGEST_PATH, DEFAULT_TIMEOUT_SECS)
    }
}

impl EditorConfig {
    pub fn new(api_url: &str, suggest_path: &str, timeout_secs: u64) -> Self {
        let suggest_path = if suggest_path.starts_with('/') {
            suggest_path.to_string()
        } else {
            format!("/{suggest_path}")
        };
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            suggest_path,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }
}
