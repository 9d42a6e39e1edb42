use serde::Deserialize;

/// Body of the structured lyrics API; misses carry an `error` field instead
#[derive(Debug, Deserialize)]
pub struct PrimaryResponse {
    pub lyrics: Option<String>,
    pub error: Option<String>,
}
