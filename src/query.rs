use regex::Regex;
use std::sync::OnceLock;

/// Lazy-initialized noise patterns, applied in order
static NOISE_REGEXES: OnceLock<Vec<Regex>> = OnceLock::new();
static WHITESPACE_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_noise_regexes() -> &'static [Regex] {
    NOISE_REGEXES.get_or_init(|| {
        [
            // Feature credits
            r"(?i)\(feat\.[^)]*\)",
            r"(?i)\(ft\.[^)]*\)",
            r"(?i)\(featuring[^)]*\)",
            // Bracketed annotations
            r"\[[^\]]*\]",
            // Remix / version / edit / official markers
            r"(?i)\([^)]*remix[^)]*\)",
            r"(?i)\([^)]*version[^)]*\)",
            r"(?i)\([^)]*edit[^)]*\)",
            r"(?i)\(official[^)]*\)",
        ]
        .iter()
        .map(|pattern| Regex::new(pattern).unwrap())
        .collect()
    })
}

fn get_whitespace_regex() -> &'static Regex {
    WHITESPACE_REGEX.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Raw (title, artist) pair as supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricsQuery {
    pub title: String,
    pub artist: String,
}

/// Noise-stripped form of a [`LyricsQuery`], recomputed per call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedQuery {
    pub title: String,
    pub artist: String,
}

impl LyricsQuery {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
        }
    }

    pub fn normalized(&self) -> NormalizedQuery {
        NormalizedQuery {
            title: normalize(&self.title),
            artist: normalize(&self.artist),
        }
    }
}

impl NormalizedQuery {
    /// Free-text query sent to the web search provider
    pub fn search_terms(&self) -> String {
        format!("{} {} lyrics", self.artist, self.title)
    }
}

/// Strip feature credits, bracketed annotations and remix/version markers,
/// then collapse whitespace.
///
/// Each pattern is a single left-to-right pass and never crosses its own
/// closing delimiter, so `"(Live [2019] Remix)"` loses the bracket first and
/// then the remaining parenthetical.
pub fn normalize(text: &str) -> String {
    let mut result = text.to_string();

    for regex in get_noise_regexes() {
        result = regex.replace_all(&result, "").into_owned();
    }

    get_whitespace_regex()
        .replace_all(&result, " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_feature_and_bracket() {
        let query = LyricsQuery::new("Shape of You (feat. Nobody) [Remix]", "Ed Sheeran");
        let normalized = query.normalized();
        assert_eq!(normalized.title, "Shape of You");
        assert_eq!(normalized.artist, "Ed Sheeran");
    }

    #[test]
    fn test_normalize_markers() {
        assert_eq!(normalize("Song (FT. Someone)"), "Song");
        assert_eq!(normalize("Song (Featuring Someone Else)"), "Song");
        assert_eq!(normalize("Song (Club Remix) extra"), "Song extra");
        assert_eq!(normalize("Song (Radio Edit)"), "Song");
        assert_eq!(normalize("Song (Acoustic Version)"), "Song");
        assert_eq!(normalize("Song (Official Video)"), "Song");
    }

    #[test]
    fn test_normalize_keeps_plain_parentheticals() {
        assert_eq!(normalize("Song (Live)"), "Song (Live)");
        assert_eq!(normalize("Song (Live) and more (x)"), "Song (Live) and more (x)");
    }

    #[test]
    fn test_normalize_nested_bracket_inside_marker() {
        assert_eq!(normalize("Song (Live [2019] Remix)"), "Song");
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize("  Extra \t  Spaces\n here "), "Extra Spaces here");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_normalize_output_is_clean() {
        let inputs = [
            "A (feat. B) (ft. C) [D] (E Remix) (F Version) (G Edit) (Official H)",
            "[Intro]   Title   (featuring   X)",
            "Ünïcödé  (Official)  Title",
        ];
        for input in inputs {
            let out = normalize(input);
            let lower = out.to_lowercase();
            assert!(!lower.contains("(feat."), "{out}");
            assert!(!lower.contains("(ft."), "{out}");
            assert!(!lower.contains('['), "{out}");
            assert!(!lower.contains("remix"), "{out}");
            assert!(!lower.contains("(official"), "{out}");
            assert!(!out.contains("  "), "{out}");
            assert_eq!(normalize(&out), out);
        }
    }

    #[test]
    fn test_search_terms() {
        let normalized = LyricsQuery::new("Creep (Radio Edit)", "Radiohead").normalized();
        assert_eq!(normalized.search_terms(), "Radiohead Creep lyrics");
    }
}
