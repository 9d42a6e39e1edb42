use crate::query::NormalizedQuery;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Static settings shared by every resolution.
///
/// Endpoint templates use `{artist}`, `{title}` and `{query}` placeholders,
/// which are filled with URL-encoded values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Structured lyrics API
    pub primary_endpoint: String,
    /// HTML web search used by the fallback path
    pub search_endpoint: String,
    /// CSS selector for organic result anchors on the search page
    pub result_selector: String,
    /// Substring identifying the search engine's redirect wrapper links
    pub redirect_marker: String,
    /// Query parameter of the redirect wrapper holding the real destination
    pub redirect_param: String,
    pub user_agent: String,
    pub primary_timeout_secs: u64,
    pub search_timeout_secs: u64,
    pub page_timeout_secs: u64,
    /// Scraped lyrics must be longer than this after cleaning
    pub min_lyrics_len: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            primary_endpoint: "https://api.lyrics.ovh/v1/{artist}/{title}".to_string(),
            search_endpoint: "https://html.duckduckgo.com/html/?q={query}".to_string(),
            result_selector: "a.result__a".to_string(),
            redirect_marker: "duckduckgo.com/l/".to_string(),
            redirect_param: "uddg".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            primary_timeout_secs: 20,
            search_timeout_secs: 15,
            page_timeout_secs: 15,
            min_lyrics_len: 100,
        }
    }
}

impl ResolverConfig {
    /// Load a JSON config file; missing fields keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: ResolverConfig = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::info!("Loaded resolver config from {}", path.display());
        Ok(config)
    }

    pub fn primary_url(&self, query: &NormalizedQuery) -> String {
        self.primary_endpoint
            .replace("{artist}", &urlencoding::encode(&query.artist))
            .replace("{title}", &urlencoding::encode(&query.title))
    }

    pub fn search_url(&self, terms: &str) -> String {
        self.search_endpoint
            .replace("{query}", &urlencoding::encode(terms))
    }

    pub fn primary_timeout(&self) -> Duration {
        Duration::from_secs(self.primary_timeout_secs)
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_secs)
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::LyricsQuery;
    use std::io::Write;

    #[test]
    fn test_primary_url_is_encoded() {
        let config = ResolverConfig::default();
        let query = LyricsQuery::new("Shape of You (feat. Nobody)", "Ed Sheeran").normalized();
        assert_eq!(
            config.primary_url(&query),
            "https://api.lyrics.ovh/v1/Ed%20Sheeran/Shape%20of%20You"
        );
    }

    #[test]
    fn test_search_url() {
        let config = ResolverConfig::default();
        assert_eq!(
            config.search_url("AC/DC Thunderstruck lyrics"),
            "https://html.duckduckgo.com/html/?q=AC%2FDC%20Thunderstruck%20lyrics"
        );
    }

    #[test]
    fn test_load_partial_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"primary_timeout_secs": 5, "user_agent": "test-agent"}}"#).unwrap();

        let config = ResolverConfig::load(file.path()).unwrap();
        assert_eq!(config.primary_timeout(), Duration::from_secs(5));
        assert_eq!(config.user_agent, "test-agent");
        assert_eq!(config.search_timeout_secs, 15);
        assert_eq!(config.result_selector, "a.result__a");
    }

    #[test]
    fn test_load_missing_file() {
        assert!(ResolverConfig::load(Path::new("/nonexistent/getlyrics.json")).is_err());
    }
}
