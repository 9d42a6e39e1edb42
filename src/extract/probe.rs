use super::{block_text, elements, Candidate};
use regex::Regex;
use scraper::{ElementRef, Html};
use std::sync::OnceLock;

/// Minimum extracted length for a container to be taken as lyrics
const MIN_CONTAINER_TEXT_LEN: usize = 100;

static LOCATORS: OnceLock<Vec<Locator>> = OnceLock::new();

/// One way of finding a lyrics container in a page
#[derive(Debug)]
pub enum Locator {
    /// Element carrying an exact attribute value; every match is merged
    Attribute {
        tag: &'static str,
        name: &'static str,
        value: &'static str,
    },
    /// Element with at least one class matching the pattern
    ClassPattern { tag: &'static str, pattern: Regex },
    /// Element whose id matches the pattern
    IdPattern { tag: &'static str, pattern: Regex },
    /// Any element with this tag
    Tag(&'static str),
}

impl Locator {
    fn class(tag: &'static str, pattern: &str) -> Self {
        Self::ClassPattern {
            tag,
            pattern: Regex::new(&format!("(?i){pattern}")).unwrap(),
        }
    }

    fn id(tag: &'static str, pattern: &str) -> Self {
        Self::IdPattern {
            tag,
            pattern: Regex::new(&format!("(?i){pattern}")).unwrap(),
        }
    }

    fn tag(&self) -> &'static str {
        match self {
            Self::Attribute { tag, .. }
            | Self::ClassPattern { tag, .. }
            | Self::IdPattern { tag, .. }
            | Self::Tag(tag) => *tag,
        }
    }

    pub fn matches(&self, element: &ElementRef<'_>) -> bool {
        let el = element.value();
        if el.name() != self.tag() {
            return false;
        }

        match self {
            Self::Attribute { name, value, .. } => el.attr(name) == Some(*value),
            Self::ClassPattern { pattern, .. } => el.classes().any(|class| pattern.is_match(class)),
            Self::IdPattern { pattern, .. } => el.id().is_some_and(|id| pattern.is_match(id)),
            Self::Tag(_) => true,
        }
    }

    /// First matching element in document order
    pub fn find<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        elements(document).find(|element| self.matches(element))
    }

    /// Text of the located container, if any
    pub fn extract(&self, document: &Html) -> Option<String> {
        match self {
            Self::Attribute { .. } => {
                let parts: Vec<String> = elements(document)
                    .filter(|element| self.matches(element))
                    .map(block_text)
                    .filter(|text| !text.is_empty())
                    .collect();
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join("\n\n"))
                }
            }
            _ => self.find(document).map(block_text),
        }
    }
}

/// Locators in priority order: site-specific markup first, generic last
pub fn locators() -> &'static [Locator] {
    LOCATORS.get_or_init(|| {
        vec![
            // Genius
            Locator::Attribute {
                tag: "div",
                name: "data-lyrics-container",
                value: "true",
            },
            Locator::class("div", "Lyrics__Container"),
            // Generic
            Locator::class("div", "lyrics"),
            Locator::id("div", "lyrics"),
            // AZLyrics
            Locator::class("div", "ringtone"),
            // Musixmatch
            Locator::class("div", "mxm-lyrics"),
            Locator::class("span", "lyrics__content"),
            // SongLyrics and friends
            Locator::class("div", "lyrics-body"),
            Locator::class("div", "lyric-body"),
            Locator::class("p", "verse"),
            Locator::Tag("pre"),
        ]
    })
}

/// Every located container long enough to be lyrics, in rank order
pub fn candidates(document: &Html) -> impl Iterator<Item = Candidate> + '_ {
    locators()
        .iter()
        .enumerate()
        .filter_map(move |(rank, locator)| {
            let text = locator.extract(document)?;
            let length = text.chars().count();
            if length > MIN_CONTAINER_TEXT_LEN {
                tracing::debug!("Locator #{} matched a {} char container", rank, length);
                Some(Candidate {
                    text,
                    origin_selector_rank: Some(rank),
                    score: None,
                })
            } else {
                None
            }
        })
}

/// Highest-ranked container candidate
pub fn probe(document: &Html) -> Option<Candidate> {
    candidates(document).next()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verse(prefix: &str, lines: usize) -> String {
        (0..lines)
            .map(|i| format!("{prefix} line number {i} of the song"))
            .collect::<Vec<_>>()
            .join("<br>")
    }

    #[test]
    fn test_probe_prefers_higher_rank() {
        let html = format!(
            "<html><body><pre>{}</pre><div class='song-lyrics'>{}</div></body></html>",
            "p".repeat(150),
            verse("generic", 6)
        );
        let document = Html::parse_document(&html);
        let candidate = probe(&document).unwrap();
        assert_eq!(candidate.origin_selector_rank, Some(2));
        assert!(candidate.text.starts_with("generic line number 0"));
        assert_eq!(candidate.score, None);
    }

    #[test]
    fn test_attribute_containers_are_merged() {
        let html = format!(
            "<div data-lyrics-container='true'>{}</div><p>ad</p>\
             <div data-lyrics-container='true'>{}</div>",
            verse("first", 3),
            verse("second", 3)
        );
        let document = Html::parse_document(&html);
        let candidate = probe(&document).unwrap();
        assert_eq!(candidate.origin_selector_rank, Some(0));
        assert!(candidate.text.contains("of the song\n\nsecond line number 0"));
    }

    #[test]
    fn test_short_container_falls_through() {
        let html = format!(
            "<div class='lyrics'>too short</div><pre>{}</pre>",
            verse("pre", 6).replace("<br>", "\n")
        );
        let document = Html::parse_document(&html);

        let ranks: Vec<_> = candidates(&document)
            .map(|candidate| candidate.origin_selector_rank)
            .collect();
        assert_eq!(ranks, vec![Some(10)]);
    }

    #[test]
    fn test_locator_kinds() {
        let document = Html::parse_document(
            "<div id='songLyricsDiv'>a</div><span class='x lyrics__content'>b</span>\
             <p class='VERSE'>c</p>",
        );
        let locators = locators();
        assert!(locators[3].find(&document).is_some());
        assert!(locators[6].find(&document).is_some());
        assert!(locators[9].find(&document).is_some());
        assert!(locators[0].find(&document).is_none());
        assert!(locators[10].find(&document).is_none());
    }

    #[test]
    fn test_probe_nothing_found() {
        let document = Html::parse_document("<div><p>Just an article about music.</p></div>");
        assert!(probe(&document).is_none());
    }
}
