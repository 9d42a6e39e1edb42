use crate::api::{primary, search, HttpFetch, ReqwestFetcher};
use crate::config::ResolverConfig;
use crate::error::FetchError;
use crate::query::{LyricsQuery, NormalizedQuery};
use crate::sanitize;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Which provider produced the lyrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LyricsSource {
    Primary,
    Fallback,
}

impl LyricsSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for LyricsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LyricsSource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "primary" => Ok(Self::Primary),
            "fallback" => Ok(Self::Fallback),
            other => anyhow::bail!("Unknown lyrics source: {}", other),
        }
    }
}

/// Lyrics text together with the provider it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLyrics {
    pub text: String,
    pub source: LyricsSource,
}

/// Record handed to the cache; `lyrics_text` is never empty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricsResult {
    pub track_id: String,
    pub title: String,
    pub artist: String,
    pub lyrics_text: String,
    pub source: LyricsSource,
    pub created_at: DateTime<Utc>,
}

/// Runs the primary API and then the search-and-scrape fallback.
///
/// Holds no mutable state, so one instance can be shared behind an `Arc`
/// and called from many tasks at once.
pub struct LyricsResolver {
    http: Arc<dyn HttpFetch>,
    config: ResolverConfig,
}

impl LyricsResolver {
    pub fn new(http: Arc<dyn HttpFetch>, config: ResolverConfig) -> Self {
        Self { http, config }
    }

    /// Resolver backed by a real reqwest client using the configured User-Agent
    pub fn with_reqwest(config: ResolverConfig) -> Result<Self, FetchError> {
        let http = ReqwestFetcher::new(&config.user_agent)?;
        Ok(Self::new(Arc::new(http), config))
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Find lyrics for a song, or `None` when every provider misses
    pub async fn resolve(&self, title: &str, artist: &str) -> Option<ResolvedLyrics> {
        let query = LyricsQuery::new(title, artist).normalized();
        tracing::debug!("Resolving {} - {}", query.artist, query.title);

        // Structured API first
        if let Some(text) = self.try_primary(&query).await {
            tracing::info!("Lyrics found via primary API: {} - {}", artist, title);
            return Some(ResolvedLyrics {
                text,
                source: LyricsSource::Primary,
            });
        }

        // Web search and scrape on a primary miss
        if let Some(text) = self.try_fallback(&query).await {
            tracing::info!("Lyrics found via web search: {} - {}", artist, title);
            return Some(ResolvedLyrics {
                text,
                source: LyricsSource::Fallback,
            });
        }

        tracing::info!("No lyrics found: {} - {}", artist, title);
        None
    }

    /// [`resolve`](Self::resolve) wrapped into a cacheable record
    pub async fn resolve_track(
        &self,
        track_id: &str,
        title: &str,
        artist: &str,
    ) -> Option<LyricsResult> {
        let resolved = self.resolve(title, artist).await?;

        Some(LyricsResult {
            track_id: track_id.to_string(),
            title: title.to_string(),
            artist: artist.to_string(),
            lyrics_text: resolved.text,
            source: resolved.source,
            created_at: Utc::now(),
        })
    }

    async fn try_primary(&self, query: &NormalizedQuery) -> Option<String> {
        let text = match primary::fetch_lyrics(self.http.as_ref(), &self.config, query).await {
            Ok(text) => text?,
            Err(e) => {
                tracing::warn!("Primary lookup failed for {} - {}: {}", query.artist, query.title, e);
                return None;
            }
        };

        // API text still has to pass the playlist checks
        if let Some(reason) = sanitize::rejection(&text) {
            tracing::debug!("Primary lyrics rejected: {:?}", reason);
            return None;
        }

        Some(text)
    }

    async fn try_fallback(&self, query: &NormalizedQuery) -> Option<String> {
        match search::fetch_lyrics(self.http.as_ref(), &self.config, query).await {
            Ok(candidate) => candidate.map(|candidate| candidate.text),
            Err(e) => {
                tracing::warn!("Web search fallback failed for {} - {}: {}", query.artist, query.title, e);
                None
            }
        }
    }
}
