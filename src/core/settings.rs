use chrono::Duration;
use serde::{
    Deserialize,
    Serialize,
};

use crate::persistence::load_json_or_default;

pub const SETTINGS_FILE: &str = "settings.json";
pub const DEFAULT_BASE_URL: &str = "https://vocab.perseus.org";
const DEFAULT_CACHE_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub base_url: String,
    pub cache_ttl_days: i64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            cache_ttl_days: DEFAULT_CACHE_TTL_DAYS,
            request_timeout_secs: 60,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36".to_string(),
        }
    }
}

impl Settings {
    pub fn load() -> Self {
        load_json_or_default(SETTINGS_FILE)
    }

    /// Negative or out-of-range values fall back to the default TTL.
    pub fn cache_ttl(&self) -> Duration {
        match Duration::try_days(self.cache_ttl_days) {
            Some(ttl) if self.cache_ttl_days >= 0 => ttl,
            _ => {
                log::warn!(
                    "Invalid cache_ttl_days {}, using {} days",
                    self.cache_ttl_days,
                    DEFAULT_CACHE_TTL_DAYS
                );
                Duration::days(DEFAULT_CACHE_TTL_DAYS)
            }
        }
    }

    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn catalog_url(&self) -> String {
        format!("{}/", self.base_url())
    }

    pub fn word_list_url(&self, urn: &str) -> String {
        format!("{}/word-list/{}/?page=all", self.base_url(), urn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_fill_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"cache_ttl_days": 1}"#).unwrap();
        assert_eq!(settings.cache_ttl_days, 1);
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.request_timeout_secs, 60);
    }

    #[test]
    fn test_cache_ttl_rejects_out_of_range_days() {
        let settings: Settings =
            serde_json::from_str(r#"{"cache_ttl_days": 9223372036854775807}"#).unwrap();
        assert_eq!(settings.cache_ttl(), Duration::days(7));

        let settings = Settings { cache_ttl_days: -3, ..Default::default() };
        assert_eq!(settings.cache_ttl(), Duration::days(7));

        let settings = Settings { cache_ttl_days: 30, ..Default::default() };
        assert_eq!(settings.cache_ttl(), Duration::days(30));
    }

    #[test]
    fn test_word_list_url_requests_all_pages() {
        let settings = Settings { base_url: "https://example.org/".to_string(), ..Default::default() };
        assert_eq!(
            settings.word_list_url("urn:cts:greekLit:tlg0012.tlg001.perseus-grc2"),
            "https://example.org/word-list/urn:cts:greekLit:tlg0012.tlg001.perseus-grc2/?page=all"
        );
        assert_eq!(settings.catalog_url(), "https://example.org/");
    }
}
