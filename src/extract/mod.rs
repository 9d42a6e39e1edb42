pub mod probe;
pub mod score;

use regex::Regex;
use scraper::{node::Node, ElementRef, Html};
use std::sync::OnceLock;

/// Elements removed from a fetched page before any probing
const BOILERPLATE_TAGS: &[&str] = &[
    "script", "style", "noscript", "nav", "header", "footer", "aside", "form", "button", "iframe",
    "svg",
];

/// Elements whose text never counts as content even if still attached
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Elements that start and end on their own line
const BLOCK_TAGS: &[&str] = &[
    "address",
    "article",
    "blockquote",
    "dd",
    "div",
    "dl",
    "dt",
    "figcaption",
    "figure",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "hr",
    "li",
    "main",
    "ol",
    "pre",
    "section",
    "table",
    "tr",
    "ul",
];

/// Elements separated from their neighbours by a blank line
const PARAGRAPH_TAGS: &[&str] = &["p"];

static EXTRA_NEWLINES_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_extra_newlines_regex() -> &'static Regex {
    EXTRA_NEWLINES_REGEX.get_or_init(|| Regex::new(r"\n{3,}").unwrap())
}

/// A block of page text that might be the lyrics
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub text: String,
    /// Rank of the container locator that produced it
    pub origin_selector_rank: Option<usize>,
    /// Heuristic score, when found by block scoring
    pub score: Option<f64>,
}

/// All elements of the document in document order
pub fn elements(document: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    document.tree.root().descendants().filter_map(ElementRef::wrap)
}

/// Detach script, style, navigation and similar chrome from the tree.
/// Returns how many subtrees were removed.
pub fn strip_boilerplate(document: &mut Html) -> usize {
    let ids: Vec<_> = elements(document)
        .filter(|element| BOILERPLATE_TAGS.contains(&element.value().name()))
        .map(|element| element.id())
        .collect();

    let mut removed = 0;
    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
            removed += 1;
        }
    }

    tracing::debug!("Stripped {} boilerplate elements", removed);
    removed
}

/// Text of an element with line breaks at `<br>` and block boundaries.
///
/// Whitespace inside a line is collapsed, `<pre>` content is kept verbatim,
/// every line is trimmed and runs of blank lines shrink to one.
pub fn block_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(element, &mut raw, element.value().name() == "pre");

    let lines: Vec<&str> = raw.split('\n').map(str::trim).collect();
    let joined = lines.join("\n");
    get_extra_newlines_regex()
        .replace_all(&joined, "\n\n")
        .trim()
        .to_string()
}

fn collect_text(element: ElementRef<'_>, out: &mut String, preformatted: bool) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                if preformatted {
                    out.push_str(text);
                } else {
                    push_collapsed(out, text);
                }
            }
            Node::Element(el) => {
                let name = el.name();
                if SKIPPED_TAGS.contains(&name) {
                    continue;
                }
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                let Some(child_element) = ElementRef::wrap(child) else {
                    continue;
                };

                let paragraph = PARAGRAPH_TAGS.contains(&name);
                let block = paragraph || BLOCK_TAGS.contains(&name);
                if paragraph {
                    paragraph_break(out);
                } else if block {
                    line_break(out);
                }

                collect_text(child_element, out, preformatted || name == "pre");

                if paragraph {
                    paragraph_break(out);
                } else if block {
                    line_break(out);
                }
            }
            _ => {}
        }
    }
}

fn push_collapsed(out: &mut String, text: &str) {
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !out.is_empty() && !out.ends_with([' ', '\n']) {
                out.push(' ');
            }
        } else {
            out.push(ch);
        }
    }
}

fn line_break(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn paragraph_break(out: &mut String) {
    line_break(out);
    if !out.is_empty() && !out.ends_with("\n\n") {
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;

    fn first<'a>(document: &'a Html, selector: &str) -> ElementRef<'a> {
        let selector = Selector::parse(selector).unwrap();
        document.select(&selector).next().unwrap()
    }

    #[test]
    fn test_block_text_line_breaks() {
        let document = Html::parse_document(
            "<div id='x'>First   line<br>Second <b>bold</b> line<br><br>After break\
             <div>Nested block</div>tail</div>",
        );
        let text = block_text(first(&document, "#x"));
        assert_eq!(
            text,
            "First line\nSecond bold line\n\nAfter break\nNested block\ntail"
        );
    }

    #[test]
    fn test_block_text_paragraphs() {
        let document =
            Html::parse_document("<div id='x'><p>Verse one<br>line two</p><p>Verse two</p></div>");
        let text = block_text(first(&document, "#x"));
        assert_eq!(text, "Verse one\nline two\n\nVerse two");
    }

    #[test]
    fn test_block_text_pre_and_scripts() {
        let document = Html::parse_document(
            "<div id='x'><script>var a = 1;</script><pre>one\n  two\nthree</pre></div>",
        );
        let text = block_text(first(&document, "#x"));
        assert_eq!(text, "one\ntwo\nthree");
    }

    #[test]
    fn test_strip_boilerplate() {
        let mut document = Html::parse_document(
            "<html><head><style>.a{}</style></head><body><nav>Home | About</nav>\
             <div id='x'>Content</div><footer>Copyright</footer>\
             <script>track()</script></body></html>",
        );
        let removed = strip_boilerplate(&mut document);
        assert_eq!(removed, 4);

        let body = block_text(first(&document, "body"));
        assert_eq!(body, "Content");
    }
}
