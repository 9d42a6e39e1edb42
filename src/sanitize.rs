use regex::Regex;
use std::sync::OnceLock;

const PLAYLIST_MIN_LINES: usize = 20;
const PLAYLIST_DASH_RATIO: f64 = 0.3;
const DASH_LINE_MAX_LEN: usize = 100;
const ELLIPSIS_LINE_MAX_LEN: usize = 100;
const PLAYLIST_KEYWORD_THRESHOLD: usize = 2;

const PLAYLIST_KEYWORDS: &[&str] = &[
    "playlist",
    "tracklist",
    "feel free to comment",
    "must play",
    "explicit",
];

/// Language switcher entries scraped along with the lyrics
const LANGUAGE_HEADERS: &[&str] = &[
    "English",
    "Russian",
    "Español",
    "Deutsch",
    "Français",
    "Italiano",
    "Português",
    "Slovenčina",
    "Ελληνικά",
    "فارسی",
    "Magyar",
    "Türkçe",
    "Русский (Russian)",
    "Română",
    "Polski",
    "Українська",
    "日本語",
    "한국어",
    "العربية",
    "Svenska",
    "azərbaycan",
    "עברית",
    "हिन्दी",
    "srpski",
    "Česky",
    "Македонски",
    "עברית (Hebrew)",
];

static CONTRIBUTORS_REGEX: OnceLock<Regex> = OnceLock::new();
static TRANSLATIONS_REGEX: OnceLock<Regex> = OnceLock::new();
static READ_MORE_REGEX: OnceLock<Regex> = OnceLock::new();
static DESCRIPTION_REGEX: OnceLock<Regex> = OnceLock::new();
static SECTION_HEADER_REGEX: OnceLock<Regex> = OnceLock::new();
static TITLE_SUFFIX_REGEX: OnceLock<Regex> = OnceLock::new();
static EMBED_REGEX: OnceLock<Regex> = OnceLock::new();
static EXTRA_NEWLINES_REGEX: OnceLock<Regex> = OnceLock::new();

fn cached_regex<'a>(cell: &'a OnceLock<Regex>, pattern: &str) -> &'a Regex {
    cell.get_or_init(|| Regex::new(pattern).unwrap())
}

/// Why a whole text was thrown away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Too many `Artist - Title` shaped lines
    PlaylistLayout,
    /// Two or more playlist keywords present
    PlaylistKeywords,
}

/// One entry of the per-line filter table
pub struct LineRule {
    pub reason: &'static str,
    pub matches: fn(&str) -> bool,
}

/// Ordered line filters; a trimmed, non-empty line is dropped when any matches
pub const LINE_RULES: &[LineRule] = &[
    LineRule {
        reason: "contributors counter",
        matches: is_contributors_marker,
    },
    LineRule {
        reason: "translations header",
        matches: is_translations_header,
    },
    LineRule {
        reason: "read more link",
        matches: is_read_more,
    },
    LineRule {
        reason: "track description",
        matches: is_description_sentence,
    },
    LineRule {
        reason: "truncated description",
        matches: is_truncated_text,
    },
    LineRule {
        reason: "language header",
        matches: is_language_header,
    },
    LineRule {
        reason: "section annotation",
        matches: is_section_annotation,
    },
    LineRule {
        reason: "page title suffix",
        matches: is_title_suffix,
    },
    LineRule {
        reason: "embed marker",
        matches: is_embed_marker,
    },
];

fn is_contributors_marker(line: &str) -> bool {
    cached_regex(&CONTRIBUTORS_REGEX, r"(?i)^\d+\s*Contributors").is_match(line)
}

fn is_translations_header(line: &str) -> bool {
    cached_regex(&TRANSLATIONS_REGEX, r"(?i)^Translations").is_match(line)
}

fn is_read_more(line: &str) -> bool {
    cached_regex(&READ_MORE_REGEX, r"(?i)^Read More$").is_match(line)
}

fn is_description_sentence(line: &str) -> bool {
    cached_regex(
        &DESCRIPTION_REGEX,
        r#"(?i)^["“].*?["”]?\s+is\s+(the|a|about)\b"#,
    )
    .is_match(line)
}

fn is_truncated_text(line: &str) -> bool {
    (line.contains('…') && line.chars().count() > ELLIPSIS_LINE_MAX_LEN) || line.ends_with('…')
}

fn is_language_header(line: &str) -> bool {
    LANGUAGE_HEADERS.contains(&line)
}

fn is_section_annotation(line: &str) -> bool {
    cached_regex(&SECTION_HEADER_REGEX, r"^\[[^\]]+\]$").is_match(line)
}

fn is_title_suffix(line: &str) -> bool {
    cached_regex(&TITLE_SUFFIX_REGEX, r"(?i)^.*? Lyrics$").is_match(line)
}

fn is_embed_marker(line: &str) -> bool {
    cached_regex(&EMBED_REGEX, r"(?i)^Embed$").is_match(line)
}

/// First rule that drops this (already trimmed) line, if any
pub fn matching_rule(line: &str) -> Option<&'static LineRule> {
    LINE_RULES.iter().find(|rule| (rule.matches)(line))
}

/// Whole-text checks run before any line filtering
pub fn rejection(text: &str) -> Option<Rejection> {
    let dash_lines = text
        .split('\n')
        .filter(|line| line.contains(" - ") && line.chars().count() < DASH_LINE_MAX_LEN)
        .count();
    let total_lines = text
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .count();

    if total_lines > PLAYLIST_MIN_LINES
        && dash_lines as f64 / total_lines.max(1) as f64 > PLAYLIST_DASH_RATIO
    {
        return Some(Rejection::PlaylistLayout);
    }

    let lower = text.to_lowercase();
    let keyword_count = PLAYLIST_KEYWORDS
        .iter()
        .filter(|keyword| lower.contains(**keyword))
        .count();
    if keyword_count >= PLAYLIST_KEYWORD_THRESHOLD {
        return Some(Rejection::PlaylistKeywords);
    }

    None
}

/// Clean extracted text into plain lyrics.
///
/// Returns an empty string when the text is rejected outright or nothing
/// survives the line filters; callers treat that as "not found".
pub fn sanitize(raw: &str) -> String {
    if let Some(reason) = rejection(raw) {
        tracing::debug!("Rejecting candidate text: {:?}", reason);
        return String::new();
    }

    let mut kept: Vec<&str> = Vec::new();
    for line in raw.split('\n') {
        let line = line.trim();
        if line.is_empty() {
            kept.push("");
            continue;
        }

        if let Some(rule) = matching_rule(line) {
            tracing::trace!("Dropping line ({}): {}", rule.reason, line);
            continue;
        }

        kept.push(line);
    }

    let joined = kept.join("\n");
    let cleaned = cached_regex(&EXTRA_NEWLINES_REGEX, r"\n{3,}")
        .replace_all(&joined, "\n\n")
        .trim()
        .to_string();

    // Dropped lines can push the dash ratio over the limit
    if let Some(reason) = rejection(&cleaned) {
        tracing::debug!("Rejecting cleaned text: {:?}", reason);
        return String::new();
    }

    cleaned
}
