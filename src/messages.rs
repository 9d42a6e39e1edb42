use crate::resolver::LyricsSource;
use crate::worker::{BatchSummary, BatchTrack};

/// Progress events sent from the batch workers to the printer
#[derive(Debug, Clone)]
pub enum BatchEvent {
    Started {
        total: usize,
    },
    Resolving {
        track: BatchTrack,
    },
    LyricsFound {
        track: BatchTrack,
        source: LyricsSource,
    },
    CacheHit {
        track: BatchTrack,
    },
    /// Missed recently, not retried yet
    RecentMiss {
        track: BatchTrack,
    },
    LyricsNotFound {
        track: BatchTrack,
    },
    Error {
        track: BatchTrack,
        error: String,
    },
    Complete {
        summary: BatchSummary,
    },
}

impl BatchEvent {
    /// One progress line, or `None` for events that print nothing
    pub fn status_line(&self) -> Option<String> {
        match self {
            Self::Started { total } => Some(format!("Resolving {} tracks", total)),
            Self::Resolving { .. } => None,
            Self::LyricsFound { track, source } => Some(format!("[✓] {} ({})", track, source)),
            Self::CacheHit { track } => Some(format!("[~] {} (cached)", track)),
            Self::RecentMiss { track } => Some(format!("[○] {} (missed recently)", track)),
            Self::LyricsNotFound { track } => Some(format!("[✗] {}", track)),
            Self::Error { track, error } => Some(format!("[!] {}: {}", track, error)),
            Self::Complete { summary } => Some(summary.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_lines() {
        let track = BatchTrack::new(3, "Ed Sheeran", "Perfect");
        let found = BatchEvent::LyricsFound {
            track: track.clone(),
            source: LyricsSource::Fallback,
        };
        assert_eq!(
            found.status_line().unwrap(),
            "[✓] Ed Sheeran - Perfect (fallback)"
        );
        assert!(BatchEvent::Resolving { track }.status_line().is_none());
    }
}
