use super::HttpFetch;
use crate::config::ResolverConfig;
use crate::error::ProviderError;
use crate::extract::{probe, score, strip_boilerplate, Candidate};
use crate::query::NormalizedQuery;
use crate::sanitize;
use scraper::{Html, Selector};

/// Search the web for a lyrics page and scrape the first organic result
pub async fn fetch_lyrics(
    http: &dyn HttpFetch,
    config: &ResolverConfig,
    query: &NormalizedQuery,
) -> Result<Option<Candidate>, ProviderError> {
    let search_url = config.search_url(&query.search_terms());
    let page = http.get(&search_url, config.search_timeout()).await?;

    if !page.is_ok() {
        tracing::debug!("Web search failed (status: {})", page.status);
        return Ok(None);
    }

    let Some(result_url) = first_result_url(&page.body, config)? else {
        tracing::debug!("No search results for {} - {}", query.artist, query.title);
        return Ok(None);
    };
    tracing::debug!("First search result: {}", result_url);

    let page = http.get(&result_url, config.page_timeout()).await?;
    if !page.is_ok() {
        tracing::debug!("Result page fetch failed (status: {})", page.status);
        return Ok(None);
    }

    Ok(extract_lyrics(&page.body, config.min_lyrics_len))
}

/// Absolute destination of the first result anchor on a search page
pub fn first_result_url(
    html: &str,
    config: &ResolverConfig,
) -> Result<Option<String>, ProviderError> {
    let selector = Selector::parse(&config.result_selector)
        .map_err(|_| ProviderError::Selector(config.result_selector.clone()))?;
    let document = Html::parse_document(html);

    let href = document
        .select(&selector)
        .next()
        .and_then(|anchor| anchor.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty());

    Ok(href.map(|href| resolve_result_url(href, config)))
}

/// Give a result href a scheme and unwrap the search engine's redirect link
pub fn resolve_result_url(href: &str, config: &ResolverConfig) -> String {
    let url = with_scheme(href);

    if url.contains(&config.redirect_marker) {
        if let Some(target) = query_param(&url, &config.redirect_param) {
            tracing::debug!("Unwrapped redirect to {}", target);
            return with_scheme(&target);
        }
    }

    url
}

fn with_scheme(url: &str) -> String {
    if url.starts_with("//") {
        format!("https:{url}")
    } else if !url.starts_with("http") {
        format!("https://{url}")
    } else {
        url.to_string()
    }
}

fn query_param(url: &str, name: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    let query = query.split('#').next().unwrap_or(query);

    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .and_then(|(_, value)| {
            urlencoding::decode(&value.replace('+', " "))
                .ok()
                .map(|decoded| decoded.into_owned())
        })
}

/// Pull cleaned lyrics out of a fetched page.
///
/// Known containers are tried in rank order and the first one that survives
/// sanitizing wins; otherwise the best-scoring block of the same stripped
/// document gets one chance.
pub fn extract_lyrics(html: &str, min_len: usize) -> Option<Candidate> {
    let mut document = Html::parse_document(html);
    strip_boilerplate(&mut document);

    for candidate in probe::candidates(&document) {
        if let Some(accepted) = accept(candidate, min_len) {
            return Some(accepted);
        }
    }

    tracing::debug!("No known lyrics container survived, scoring page blocks");
    score::score_all_blocks(&document).and_then(|candidate| accept(candidate, min_len))
}

fn accept(candidate: Candidate, min_len: usize) -> Option<Candidate> {
    let cleaned = sanitize::sanitize(&candidate.text);
    let length = cleaned.chars().count();

    if length > min_len {
        Some(Candidate {
            text: cleaned,
            ..candidate
        })
    } else {
        tracing::debug!(
            "Candidate rejected (rank: {:?}, score: {:?}, {} chars after cleaning)",
            candidate.origin_selector_rank,
            candidate.score,
            length
        );
        None
    }
}
