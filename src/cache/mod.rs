pub mod signature;

use crate::resolver::{LyricsResult, LyricsSource};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::Duration;

/// How long a miss is remembered before the track is retried
pub const DEFAULT_MISS_WINDOW: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Resolved lyrics plus a record of recent misses
pub struct LyricsCache {
    conn: Connection,
}

impl LyricsCache {
    /// Open or create the SQLite database
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open cache database: {}", path.display()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS lyrics_cache (
                track_id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                artist TEXT NOT NULL,
                lyrics_text TEXT NOT NULL,
                source TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS not_found (
                track_id TEXT PRIMARY KEY,
                timestamp INTEGER NOT NULL
            )",
            [],
        )?;

        Ok(Self { conn })
    }

    /// Cached lyrics for a track id
    pub fn get(&self, track_id: &str) -> Result<Option<LyricsResult>> {
        let row = self
            .conn
            .query_row(
                "SELECT track_id, title, artist, lyrics_text, source, created_at
                 FROM lyrics_cache WHERE track_id = ?1",
                [track_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, String>(5)?,
                    ))
                },
            )
            .optional()?;

        let Some((track_id, title, artist, lyrics_text, source, created_at)) = row else {
            return Ok(None);
        };

        let source: LyricsSource = source.parse()?;
        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .with_context(|| format!("Invalid created_at for {}: {}", track_id, created_at))?
            .with_timezone(&Utc);

        Ok(Some(LyricsResult {
            track_id,
            title,
            artist,
            lyrics_text,
            source,
            created_at,
        }))
    }

    /// Store (or replace) a result and forget any earlier miss for it
    pub fn put(&self, result: &LyricsResult) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO lyrics_cache
                (track_id, title, artist, lyrics_text, source, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                result.track_id,
                result.title,
                result.artist,
                result.lyrics_text,
                result.source.as_str(),
                result.created_at.to_rfc3339(),
            ],
        )?;

        self.conn
            .execute("DELETE FROM not_found WHERE track_id = ?1", [&result.track_id])?;

        tracing::debug!("Cached lyrics for {}", result.track_id);
        Ok(())
    }

    /// Remember that no provider had lyrics for this track
    pub fn mark_missing(&self, track_id: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO not_found (track_id, timestamp) VALUES (?1, ?2)",
            params![track_id, Utc::now().timestamp()],
        )?;

        Ok(())
    }

    /// Whether the track missed within the last `window`
    pub fn recently_missing(&self, track_id: &str, window: Duration) -> Result<bool> {
        let timestamp: Option<i64> = self
            .conn
            .query_row(
                "SELECT timestamp FROM not_found WHERE track_id = ?1",
                [track_id],
                |row| row.get(0),
            )
            .optional()?;

        let Some(timestamp) = timestamp else {
            return Ok(false);
        };

        let age = Utc::now().timestamp() - timestamp;
        Ok(age >= 0 && (age as u64) < window.as_secs())
    }
}
