//! Plain-text views of markup and rendered HTML.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::escape::compile_static;
use crate::tokenizer::tokenize;

static HTML_TAG_OR_ENTITY: Lazy<Option<Regex>> = Lazy::new(|| compile_static(r"(?s)<.*?>|&.*?;"));
static EXCERPT: Lazy<Option<Regex>> =
    Lazy::new(|| compile_static(r#"(?s)\[".*?\]+?.*?\[/".*?\]+?"#));
static ANY_TAG: Lazy<Option<Regex>> = Lazy::new(|| compile_static(r"(?s)\[.*?\]"));

/// Markup with every tag token removed.
pub fn strip_bbcode(markup: &str) -> String {
    tokenize(markup)
        .filter(|token| !token.is_tag())
        .map(|token| token.text)
        .collect()
}

/// Rendered HTML reduced to text, for search snippets.
pub fn textilize(html: &str) -> String {
    let html = html.replace("<p>", " ");
    match HTML_TAG_OR_ENTITY.as_ref() {
        Some(regex) => regex.replace_all(&html, "").into_owned(),
        None => html,
    }
}

/// The first `["]…[/"]` excerpt of a post, with breaks kept and tags dropped.
pub fn excerpt(markup: &str) -> String {
    let (Some(excerpt), Some(any_tag)) = (EXCERPT.as_ref(), ANY_TAG.as_ref()) else {
        return String::new();
    };
    match excerpt.find(markup) {
        Some(found) => {
            let text = found.as_str().replace('\n', "<br/>");
            any_tag.replace_all(&text, "").into_owned()
        }
        None => String::new(),
    }
}
