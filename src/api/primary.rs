use super::{types::PrimaryResponse, HttpFetch};
use crate::config::ResolverConfig;
use crate::error::ProviderError;
use crate::query::NormalizedQuery;

/// Ask the structured lyrics API.
/// Returns `None` unless the status is 200 and `lyrics` is non-blank.
pub async fn fetch_lyrics(
    http: &dyn HttpFetch,
    config: &ResolverConfig,
    query: &NormalizedQuery,
) -> Result<Option<String>, ProviderError> {
    let url = config.primary_url(query);
    let page = http.get(&url, config.primary_timeout()).await?;

    if !page.is_ok() {
        tracing::debug!(
            "Primary lookup miss for {} - {} (status: {})",
            query.artist,
            query.title,
            page.status
        );
        return Ok(None);
    }

    let response: PrimaryResponse = serde_json::from_str(&page.body)?;
    let lyrics = response
        .lyrics
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty());

    if lyrics.is_none() {
        tracing::debug!(
            "Primary lookup returned no lyrics for {} - {} ({})",
            query.artist,
            query.title,
            response.error.as_deref().unwrap_or("empty field")
        );
    }

    Ok(lyrics)
}
