use super::{block_text, elements, Candidate};
use scraper::Html;

/// Blocks shorter than this are never scored
const MIN_BLOCK_TEXT_LEN: usize = 200;
const SHORT_LINE_MIN: usize = 5;
const SHORT_LINE_MAX: usize = 100;
const LONG_LINE_MIN: usize = 200;
const SHORT_LINE_WEIGHT: f64 = 2.0;
const LONG_LINE_WEIGHT: f64 = 3.0;
const STANZA_BREAK_WEIGHT: f64 = 50.0;
/// This many paragraph-length lines marks a block as prose
const MAX_LONG_LINES: usize = 5;

const SCORED_TAGS: &[&str] = &["div", "article", "section"];

/// Line-shape statistics for one block of text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockStats {
    pub short_lines: usize,
    pub long_lines: usize,
    pub empty_ratio: f64,
}

impl BlockStats {
    pub fn of(text: &str) -> Self {
        let mut short_lines = 0;
        let mut long_lines = 0;

        for line in text.split('\n').map(str::trim).filter(|line| !line.is_empty()) {
            let length = line.chars().count();
            if length > SHORT_LINE_MIN && length < SHORT_LINE_MAX {
                short_lines += 1;
            }
            if length > LONG_LINE_MIN {
                long_lines += 1;
            }
        }

        let stanza_breaks = text.matches("\n\n").count();
        let empty_ratio = stanza_breaks as f64 / text.chars().count().max(1) as f64;

        Self {
            short_lines,
            long_lines,
            empty_ratio,
        }
    }

    pub fn score(&self) -> f64 {
        self.short_lines as f64 * SHORT_LINE_WEIGHT - self.long_lines as f64 * LONG_LINE_WEIGHT
            + self.empty_ratio * STANZA_BREAK_WEIGHT
    }

    pub fn looks_like_prose(&self) -> bool {
        self.long_lines >= MAX_LONG_LINES
    }
}

/// Score a single block of text; `None` when it is too short or reads as prose
pub fn score_text(text: &str) -> Option<f64> {
    if text.chars().count() < MIN_BLOCK_TEXT_LEN {
        return None;
    }

    let stats = BlockStats::of(text);
    if stats.looks_like_prose() {
        return None;
    }

    Some(stats.score())
}

/// Best-scoring `div`/`article`/`section` of the page.
///
/// A block has to beat the running best, which starts at zero, so pages made
/// only of long prose never produce a candidate.
pub fn score_all_blocks(document: &Html) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;
    let mut best_score = 0.0;

    for element in elements(document).filter(|e| SCORED_TAGS.contains(&e.value().name())) {
        let text = block_text(element);
        let Some(score) = score_text(&text) else {
            continue;
        };

        if score > best_score {
            best_score = score;
            best = Some(Candidate {
                text,
                origin_selector_rank: None,
                score: Some(score),
            });
        }
    }

    if let Some(candidate) = &best {
        tracing::debug!(
            "Best scoring block: {:.2} ({} chars)",
            best_score,
            candidate.text.chars().count()
        );
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    // The weights and thresholds below are calibration constants; these
    // expectations move with them if the scorer is retuned.

    fn lyric_lines(count: usize) -> Vec<String> {
        (0..count)
            .map(|i| format!("short sung line number {i:02}"))
            .collect()
    }

    #[test]
    fn test_block_stats() {
        let text = format!(
            "tiny\n{}\n\n{}\n{}",
            "a".repeat(50),
            "b".repeat(201),
            "c".repeat(150)
        );
        let stats = BlockStats::of(&text);
        assert_eq!(stats.short_lines, 1);
        assert_eq!(stats.long_lines, 1);
        assert!(stats.empty_ratio > 0.0);
    }

    #[test]
    fn test_score_formula() {
        let stats = BlockStats {
            short_lines: 10,
            long_lines: 2,
            empty_ratio: 0.1,
        };
        assert!((stats.score() - (20.0 - 6.0 + 5.0)).abs() < 1e-9);
    }

    #[test]
    fn test_short_text_not_scored() {
        assert_eq!(score_text(&"x\n".repeat(50)), None);
    }

    #[test]
    fn test_prose_rejected() {
        let text = vec!["p".repeat(250); 5].join("\n");
        assert_eq!(score_text(&text), None);

        let text = vec!["p".repeat(250); 4].join("\n");
        assert!(score_text(&text).is_some());
    }

    #[test]
    fn test_lyric_shape_outranks_prose_shape() {
        // Same total length: many short lines versus a few long ones.
        let a = lyric_lines(40).join("\n");
        let long = "l".repeat(260);
        let mut b = vec![long.clone(), long.clone(), long];
        let filler = a.chars().count() - b.join("\n").chars().count() - 1;
        b.push("f".repeat(filler));
        let b = b.join("\n");
        assert_eq!(a.chars().count(), b.chars().count());

        let score_a = score_text(&a).unwrap();
        let score_b = score_text(&b).unwrap();
        assert!(score_a > score_b, "{score_a} <= {score_b}");
    }

    #[test]
    fn test_score_all_blocks_picks_lyrics() {
        let verses: Vec<String> = lyric_lines(16)
            .chunks(4)
            .map(|chunk| format!("<p>{}</p>", chunk.join("<br>")))
            .collect();
        let article = vec![format!("<p>{}</p>", "word ".repeat(60)); 6].join("");
        let html = format!(
            "<html><body><article>{article}</article>\
             <section><div class='content'>{}</div></section></body></html>",
            verses.join("")
        );
        let document = Html::parse_document(&html);

        let candidate = score_all_blocks(&document).unwrap();
        assert!(candidate.text.starts_with("short sung line number 00"));
        assert!(candidate.text.contains("number 03\n\nshort sung line number 04"));
        assert_eq!(candidate.origin_selector_rank, None);
        assert!(candidate.score.unwrap() > 0.0);
    }

    #[test]
    fn test_score_all_blocks_nothing_qualifies() {
        let document = Html::parse_document("<div>short</div><section>also short</section>");
        assert!(score_all_blocks(&document).is_none());
    }
}
