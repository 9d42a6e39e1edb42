use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use getlyrics::{
    cache::{signature::TrackSignature, LyricsCache},
    messages::BatchEvent,
    query::{self, LyricsQuery},
    worker::{self, BatchOptions},
    LyricsResolver, ResolverConfig,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "getlyrics", version)]
#[command(about = "Resolve plain-text song lyrics from a lyrics API with a web search fallback")]
struct Cli {
    /// JSON resolver config; defaults are used for missing fields
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve lyrics for one song
    Fetch {
        #[arg(long)]
        artist: String,
        #[arg(long)]
        title: String,
        /// Cache key; derived from artist and title when omitted
        #[arg(long)]
        track_id: Option<String>,
        /// Ignore any cached lyrics
        #[arg(long)]
        refresh: bool,
        /// Print the full record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Resolve every `Artist - Title` line of a file
    Batch {
        file: PathBuf,
        #[arg(long, default_value_t = BatchOptions::default().workers)]
        workers: usize,
        /// Resolutions started per second
        #[arg(long, default_value_t = BatchOptions::default().rate_per_sec)]
        rate: u32,
        /// Retry cached and recently missed tracks
        #[arg(long)]
        refresh: bool,
    },
    /// Print the normalized form of a title or artist
    Normalize { text: String },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Handle subcommands that don't need logging
    if let Command::Normalize { text } = &cli.command {
        println!("{}", query::normalize(text));
        return Ok(ExitCode::SUCCESS);
    }

    // Initialize file-based logging
    let log_dir = getlyrics::paths::get_log_dir()?;
    let file_appender = tracing_appender::rolling::never(&log_dir, "getlyrics.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "getlyrics=debug,reqwest=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .init();

    // Load resolver config, falling back to defaults
    let config = match &cli.config {
        Some(path) => ResolverConfig::load(path)?,
        None => ResolverConfig::default(),
    };
    let resolver = LyricsResolver::with_reqwest(config).context("Failed to build HTTP client")?;

    // Open the lyrics cache using XDG-compliant paths
    let cache_path = getlyrics::paths::get_cache_db_path()?;
    tracing::info!("Cache database: {}", cache_path.display());
    let cache = LyricsCache::open(&cache_path)?;

    match cli.command {
        Command::Fetch {
            artist,
            title,
            track_id,
            refresh,
            json,
        } => run_fetch(&resolver, &cache, &artist, &title, track_id, refresh, json).await,
        Command::Batch {
            file,
            workers,
            rate,
            refresh,
        } => {
            let options = BatchOptions {
                workers,
                rate_per_sec: rate,
                refresh,
                ..BatchOptions::default()
            };
            run_batch(&file, resolver, cache, options).await
        }
        Command::Normalize { .. } => Ok(ExitCode::SUCCESS),
    }
}

async fn run_fetch(
    resolver: &LyricsResolver,
    cache: &LyricsCache,
    artist: &str,
    title: &str,
    track_id: Option<String>,
    refresh: bool,
    json: bool,
) -> Result<ExitCode> {
    let track_id = track_id.unwrap_or_else(|| {
        TrackSignature::from_query(&LyricsQuery::new(title, artist)).generate_hash()
    });

    // Check cache first unless asked to refresh
    let cached = if refresh { None } else { cache.get(&track_id)? };
    let result = match cached {
        Some(result) => {
            tracing::info!("Cache hit for {} - {}", artist, title);
            Some(result)
        }
        None => {
            let result = resolver.resolve_track(&track_id, title, artist).await;
            match &result {
                Some(result) => cache.put(result)?,
                None => cache.mark_missing(&track_id)?,
            }
            result
        }
    };

    let Some(result) = result else {
        eprintln!("No lyrics found for {} - {}", artist, title);
        return Ok(ExitCode::FAILURE);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.lyrics_text);
    }

    Ok(ExitCode::SUCCESS)
}

async fn run_batch(
    file: &Path,
    resolver: LyricsResolver,
    cache: LyricsCache,
    options: BatchOptions,
) -> Result<ExitCode> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read track list: {}", file.display()))?;
    let tracks = worker::parse_track_list(&text);
    if tracks.is_empty() {
        anyhow::bail!("No tracks found in {}", file.display());
    }

    // Print progress events as they arrive
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<BatchEvent>();
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if let Some(line) = event.status_line() {
                println!("{}", line);
            }
        }
    });

    let summary = worker::run(
        tracks,
        Arc::new(resolver),
        Arc::new(Mutex::new(cache)),
        options,
        tx,
    )
    .await?;
    // Printer exits once the sender is dropped
    printer.await?;

    Ok(if summary.failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
