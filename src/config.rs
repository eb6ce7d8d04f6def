use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::category::RankingCategory;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_TOP_N: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    En,
    ZhTw,
}

impl Locale {
    pub fn from_tag(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "en" | "en-us" | "en-gb" => Some(Locale::En),
            "zh" | "zh-tw" | "zh-hant" => Some(Locale::ZhTw),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_url: String,
    pub request_timeout: Duration,
    pub analysis_timeout: Duration,
    pub top_n: usize,
    pub locale: Locale,
    pub default_category: RankingCategory,
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(10),
            analysis_timeout: Duration::from_secs(120),
            top_n: DEFAULT_TOP_N,
            locale: Locale::En,
            default_category: RankingCategory::SenSingles,
            log_file: None,
        }
    }
}

impl AppConfig {
    /// Reads the environment. Call after dotenvy has loaded `.env` files.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let api_url = env_string("API_URL")
            .or_else(|| env_string("NEXT_PUBLIC_API_URL"))
            .map(|raw| normalize_base_url(&raw))
            .unwrap_or(defaults.api_url);
        let request_timeout = env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .map(|secs| Duration::from_secs(secs.max(1)))
            .unwrap_or(defaults.request_timeout);
        let analysis_timeout = env::var("ANALYSIS_TIMEOUT_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .map(|secs| Duration::from_secs(secs.max(5)))
            .unwrap_or(defaults.analysis_timeout);
        let top_n = env::var("RANKING_TOP_N")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(defaults.top_n)
            .clamp(1, 200);
        let locale = env_string("APP_LOCALE")
            .and_then(|raw| Locale::from_tag(&raw))
            .unwrap_or(defaults.locale);
        let default_category = env_string("RANKING_CATEGORY")
            .and_then(|raw| RankingCategory::from_code(&raw))
            .unwrap_or(defaults.default_category);
        let log_file = env_string("APP_LOG_FILE").map(PathBuf::from);

        Self {
            api_url,
            request_timeout,
            analysis_timeout,
            top_n,
            locale,
            default_category,
            log_file,
        }
    }

    pub fn with_api_url(mut self, raw: &str) -> Self {
        self.api_url = normalize_base_url(raw);
        self
    }
}

pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        DEFAULT_API_URL.to_string()
    } else {
        trimmed.to_string()
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_loses_trailing_slashes() {
        assert_eq!(normalize_base_url("http://api.local:5000//"), "http://api.local:5000");
        assert_eq!(normalize_base_url("   "), DEFAULT_API_URL);
    }

    #[test]
    fn locale_tags_are_lenient() {
        assert_eq!(Locale::from_tag("zh_TW"), Some(Locale::ZhTw));
        assert_eq!(Locale::from_tag("EN"), Some(Locale::En));
        assert_eq!(Locale::from_tag("fr"), None);
    }
}
