use crate::query::LyricsQuery;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Identity of a song as seen by the cache
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TrackSignature {
    pub artist: String,
    pub title: String,
}

impl TrackSignature {
    /// Signature of the normalized artist and title, so noise such as
    /// feature credits does not split one song into several cache entries
    pub fn from_query(query: &LyricsQuery) -> Self {
        let normalized = query.normalized();
        Self {
            artist: normalized.artist.to_lowercase(),
            title: normalized.title.to_lowercase(),
        }
    }

    /// Hex-encoded SHA-256 of the JSON form, used as the default track id
    pub fn generate_hash(&self) -> String {
        let mut hasher = Sha256::new();
        if let Ok(serialized) = serde_json::to_vec(self) {
            hasher.update(&serialized);
        }
        format!("{:x}", hasher.finalize())
    }
}
