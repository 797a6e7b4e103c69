//! Response text normalization.
//!
//! Server text arrives with proprietary markup: citation spans delimited by the
//! private-use characters `U+E200`/`U+E201`, HTML line breaks, and capitalized
//! pseudo-tags such as `<Highlight>`. [`format_response`] turns that into plain
//! text with `[N]` footnote markers and a numbered `Sources:` list that always
//! has an entry for every marker.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use convo_api::ResponseAttribution;
use regex::{Captures, Regex};

/// Header line placed above the source list.
pub const SOURCES_HEADER: &str = "Sources:";

fn citation_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| {
        Regex::new(r"\x{E200}([^\x{E200}\x{E201}]*)\x{E201}").expect("citation regex must compile")
    })
}

fn line_break_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| Regex::new(r"(?i)<br\s*/?\s*>").expect("line break regex must compile"))
}

fn inline_tag_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| Regex::new(r"</?[A-Z][A-Za-z0-9]*>").expect("inline tag regex must compile"))
}

fn trailing_space_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| Regex::new(r"[ \t]+\n").expect("trailing space regex must compile"))
}

fn blank_run_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| Regex::new(r"\n{3,}").expect("blank run regex must compile"))
}

/// Strip markup and normalize whitespace.
///
/// Each pass only shortens the text (or turns `\r` into `\n`), so repeating
/// passes until nothing changes terminates, and the result is a fixed point:
/// `sanitize(&sanitize(x)) == sanitize(x)`.
pub fn sanitize(input: &str) -> String {
    let mut current = sanitize_pass(input);
    loop {
        let next = sanitize_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn sanitize_pass(input: &str) -> String {
    let output = input.replace("\r\n", "\n").replace('\r', "\n");
    let output = line_break_regex().replace_all(&output, "\n");
    let output = inline_tag_regex().replace_all(&output, "");
    let output = trailing_space_regex().replace_all(&output, "\n");
    let output = blank_run_regex().replace_all(&output, "\n\n");
    output.trim().to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationRewrite {
    pub text: String,
    /// Number of distinct citation tokens, which is also the highest marker.
    pub citation_count: usize,
}

/// Replace citation spans with `[N]` markers, left to right.
///
/// A repeated token reuses its first index; each new token takes the next one.
pub fn rewrite_citations(input: &str) -> CitationRewrite {
    let mut indices: HashMap<String, usize> = HashMap::new();
    let text = citation_regex()
        .replace_all(input, |caps: &Captures<'_>| {
            let next = indices.len() + 1;
            let index = *indices.entry(caps[1].to_string()).or_insert(next);
            format!("[{index}]")
        })
        .into_owned();

    CitationRewrite {
        text,
        citation_count: indices.len(),
    }
}

/// One cited source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribution {
    pub title: String,
    pub url: String,
}

impl Attribution {
    #[must_use]
    pub fn new(title: impl AsRef<str>, url: impl AsRef<str>) -> Self {
        Self {
            title: title.as_ref().trim().to_string(),
            url: url.as_ref().trim().to_string(),
        }
    }

    fn is_blank(&self) -> bool {
        self.title.is_empty() && self.url.is_empty()
    }

    fn fingerprint(&self) -> String {
        format!("{}|{}", self.title.to_lowercase(), self.url.to_lowercase())
    }
}

impl From<&ResponseAttribution> for Attribution {
    fn from(value: &ResponseAttribution) -> Self {
        Self::new(
            value.provider_display_name.as_deref().unwrap_or_default(),
            value.see_more_web_url.as_deref().unwrap_or_default(),
        )
    }
}

/// Numbered source list with `max(required_count, unique attributions)` lines.
///
/// Attributions are deduplicated case-insensitively on `(title, url)`; blank
/// ones are ignored. Indices without metadata, or without a title, are
/// labelled `Source N`.
pub fn build_source_appendix(attributions: &[Attribution], required_count: usize) -> String {
    let mut seen = HashSet::new();
    let unique: Vec<&Attribution> = attributions
        .iter()
        .filter(|attribution| !attribution.is_blank())
        .filter(|attribution| seen.insert(attribution.fingerprint()))
        .collect();

    let total = required_count.max(unique.len());
    (1..=total)
        .map(|index| match unique.get(index - 1) {
            Some(source) => format_source(index, source),
            None => format!("{index}. Source {index}"),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_source(index: usize, source: &Attribution) -> String {
    let title = if source.title.is_empty() {
        format!("Source {index}")
    } else {
        source.title.clone()
    };

    if source.url.is_empty() {
        format!("{index}. {title}")
    } else {
        format!("{index}. {title} ({})", source.url)
    }
}

/// Full normalization of one server message.
///
/// Returns an empty string when nothing renderable is left, in which case no
/// source list is attached either.
pub fn format_response(raw: &str, attributions: &[Attribution]) -> String {
    let rewritten = rewrite_citations(raw);
    let cleaned = sanitize(&rewritten.text);
    if cleaned.is_empty() {
        return String::new();
    }

    let appendix = build_source_appendix(attributions, rewritten.citation_count);
    if appendix.is_empty() {
        cleaned
    } else {
        format!("{cleaned}\n\n{SOURCES_HEADER}\n{appendix}")
    }
}
