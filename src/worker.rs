use crate::{
    cache::{signature::TrackSignature, LyricsCache, DEFAULT_MISS_WINDOW},
    messages::BatchEvent,
    query::LyricsQuery,
    resolver::LyricsResolver,
};
use anyhow::Result;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::fmt;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex, Semaphore};

const DEFAULT_RATE_LIMIT_PER_SEC: u32 = 2;
const DEFAULT_MAX_CONCURRENT_WORKERS: usize = 4;

/// One song read from a batch file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchTrack {
    /// 1-based line number in the input
    pub line: usize,
    pub artist: String,
    pub title: String,
}

impl BatchTrack {
    pub fn new(line: usize, artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            line,
            artist: artist.into(),
            title: title.into(),
        }
    }

    /// Cache key derived from the normalized artist and title
    pub fn track_id(&self) -> String {
        TrackSignature::from_query(&LyricsQuery::new(&self.title, &self.artist)).generate_hash()
    }
}

impl fmt::Display for BatchTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.artist, self.title)
    }
}

/// Parse a single `Artist - Title` or tab separated line
pub fn parse_track_line(line_no: usize, line: &str) -> Option<BatchTrack> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let (artist, title) = line.split_once('\t').or_else(|| line.split_once(" - "))?;
    let (artist, title) = (artist.trim(), title.trim());
    if artist.is_empty() || title.is_empty() {
        tracing::warn!("Skipping incomplete line {}: {}", line_no, line);
        return None;
    }

    Some(BatchTrack::new(line_no, artist, title))
}

/// Every usable track of a batch file; blank, comment and malformed lines are skipped
pub fn parse_track_list(text: &str) -> Vec<BatchTrack> {
    text.lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let track = parse_track_line(index + 1, line);
            if track.is_none() && !line.trim().is_empty() && !line.trim().starts_with('#') {
                tracing::warn!("Unrecognized line {}: {}", index + 1, line.trim());
            }
            track
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub workers: usize,
    /// Resolutions started per second across all workers
    pub rate_per_sec: u32,
    /// Recently missed tracks are skipped for this long
    pub miss_window: Duration,
    /// Ignore cached lyrics and recent misses
    pub refresh: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            workers: DEFAULT_MAX_CONCURRENT_WORKERS,
            rate_per_sec: DEFAULT_RATE_LIMIT_PER_SEC,
            miss_window: DEFAULT_MISS_WINDOW,
            refresh: false,
        }
    }
}

/// Final counts of a batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub found: usize,
    pub cached: usize,
    pub recent_misses: usize,
    pub not_found: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.found + self.cached + self.recent_misses + self.not_found + self.failed
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Done: {} tracks ({} found, {} cached, {} skipped, {} not found, {} failed)",
            self.total(),
            self.found,
            self.cached,
            self.recent_misses,
            self.not_found,
            self.failed
        )
    }
}

/// Shared state for the worker pool
struct WorkerPoolState {
    resolver: Arc<LyricsResolver>,
    cache: Arc<Mutex<LyricsCache>>,
    summary: Mutex<BatchSummary>,
    rate_limiter: DefaultDirectRateLimiter,
    options: BatchOptions,
}

/// Resolve every track with a bounded pool, streaming progress over `tx`
pub async fn run(
    tracks: Vec<BatchTrack>,
    resolver: Arc<LyricsResolver>,
    cache: Arc<Mutex<LyricsCache>>,
    options: BatchOptions,
    tx: mpsc::UnboundedSender<BatchEvent>,
) -> Result<BatchSummary> {
    tracing::info!(
        "Batch started: {} tracks, {} workers, {}/s",
        tracks.len(),
        options.workers,
        options.rate_per_sec
    );
    tx.send(BatchEvent::Started {
        total: tracks.len(),
    })?;

    // Shared rate limiter and worker limit
    let quota = Quota::per_second(NonZeroU32::new(options.rate_per_sec).unwrap_or(NonZeroU32::MIN));
    let semaphore = Arc::new(Semaphore::new(options.workers.max(1)));
    let state = Arc::new(WorkerPoolState {
        resolver,
        cache,
        summary: Mutex::new(BatchSummary::default()),
        rate_limiter: RateLimiter::direct(quota),
        options,
    });

    // Spawn one task per track, at most `workers` in flight
    let mut handles = Vec::with_capacity(tracks.len());
    for track in tracks {
        let permit = semaphore.clone().acquire_owned().await?;
        let state = state.clone();
        let tx = tx.clone();

        handles.push(tokio::spawn(async move {
            let _permit = permit;
            if let Err(e) = process_track(&track, &state, &tx).await {
                tracing::error!("Error processing line {} ({}): {}", track.line, track, e);
                state.summary.lock().await.failed += 1;
                let _ = tx.send(BatchEvent::Error {
                    track,
                    error: e.to_string(),
                });
            }
        }));
    }

    // Wait for all tasks to complete
    for handle in handles {
        if let Err(e) = handle.await {
            tracing::error!("Batch task panicked: {}", e);
            state.summary.lock().await.failed += 1;
        }
    }

    // Final counts
    let summary = state.summary.lock().await.clone();
    tracing::info!("Batch complete: {}", summary);
    tx.send(BatchEvent::Complete {
        summary: summary.clone(),
    })?;

    Ok(summary)
}

/// Process a single track
async fn process_track(
    track: &BatchTrack,
    state: &WorkerPoolState,
    tx: &mpsc::UnboundedSender<BatchEvent>,
) -> Result<()> {
    let track_id = track.track_id();

    // Check the cache and recent misses
    if !state.options.refresh {
        let (cached, recently_missing) = {
            let cache = state.cache.lock().await;
            let cached = cache.get(&track_id)?.is_some();
            let recently_missing =
                !cached && cache.recently_missing(&track_id, state.options.miss_window)?;
            (cached, recently_missing)
        };

        if cached {
            state.summary.lock().await.cached += 1;
            tx.send(BatchEvent::CacheHit {
                track: track.clone(),
            })?;
            return Ok(());
        }

        if recently_missing {
            state.summary.lock().await.recent_misses += 1;
            tx.send(BatchEvent::RecentMiss {
                track: track.clone(),
            })?;
            return Ok(());
        }
    }

    // Wait for rate limiter
    state.rate_limiter.until_ready().await;
    tx.send(BatchEvent::Resolving {
        track: track.clone(),
    })?;

    // Fetch lyrics
    match state
        .resolver
        .resolve_track(&track_id, &track.title, &track.artist)
        .await
    {
        Some(result) => {
            state.cache.lock().await.put(&result)?;
            state.summary.lock().await.found += 1;
            tx.send(BatchEvent::LyricsFound {
                track: track.clone(),
                source: result.source,
            })?;
        }
        None => {
            // Remember the miss so later runs skip it
            state.cache.lock().await.mark_missing(&track_id)?;
            state.summary.lock().await.not_found += 1;
            tx.send(BatchEvent::LyricsNotFound {
                track: track.clone(),
            })?;
        }
    }

    Ok(())
}
