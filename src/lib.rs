pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod messages;
pub mod paths;
pub mod query;
pub mod resolver;
pub mod sanitize;
pub mod worker;

pub use config::ResolverConfig;
pub use resolver::{LyricsResolver, LyricsResult, LyricsSource, ResolvedLyrics};
