//! Pre-pass that wraps bare URLs in `[url]` tags.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::RenderError;
use crate::escape::compile_static;
use crate::registry::TagRegistry;
use crate::tokenizer::{TokenKind, parse_tag, tokenize};

const URL_PATTERN: &str = r"https?:(?://)+[\w:#@%/;$()~?+,\-.=\\&]*";

static URL: Lazy<Option<Regex>> = Lazy::new(|| compile_static(URL_PATTERN));

/// Wraps every bare `http(s)://` URL in text outside enclosed and opaque tags (code,
/// links, images) with `[url]…[/url]`.
pub fn autolink(markup: &str, registry: &TagRegistry) -> Result<String, RenderError> {
    let url = URL.as_ref().ok_or(RenderError::Pattern(URL_PATTERN))?;
    let mut out = String::with_capacity(markup.len());
    // Per tag name, how many opaque regions are open.
    let mut opaque: HashMap<String, usize> = HashMap::new();
    // Open enclosed tag; only its own close tag is markup until then.
    let mut enclosed: Option<String> = None;

    for token in tokenize(markup) {
        if token.kind == TokenKind::Text {
            if opaque.is_empty() {
                link_urls(url, token.text, &mut out);
            } else {
                out.push_str(token.text);
            }
            continue;
        }

        let tag = parse_tag(token.text);
        if let Some(name) = &enclosed {
            if !(tag.closing && tag.name == *name) {
                out.push_str(token.text);
                continue;
            }
            enclosed = None;
        }
        if let Some(descriptor) = registry.lookup(&tag.name)
            && descriptor.suppresses_autolink()
        {
            if tag.closing {
                if let Some(depth) = opaque.get_mut(&tag.name) {
                    *depth -= 1;
                    if *depth == 0 {
                        opaque.remove(&tag.name);
                    }
                }
            } else if !descriptor.closes_immediately(tag.params) {
                if descriptor.is_enclosed() {
                    enclosed = Some(tag.name.clone());
                }
                *opaque.entry(tag.name).or_insert(0) += 1;
            }
        }
        out.push_str(token.text);
    }
    Ok(out)
}

fn link_urls(url: &Regex, text: &str, out: &mut String) {
    let mut last = 0;
    for found in url.find_iter(text) {
        let end = trim_url_punct(text, found.start(), found.end());
        if end == found.start() {
            continue;
        }
        out.push_str(&text[last..found.start()]);
        out.push_str("[url]");
        out.push_str(&text[found.start()..end]);
        out.push_str("[/url]");
        last = end;
    }
    out.push_str(&text[last..]);
}

/// Sentence punctuation and unbalanced closing parentheses after a URL are not part of it.
fn trim_url_punct(text: &str, start: usize, mut end: usize) -> usize {
    let bytes = text.as_bytes();
    while end > start && matches!(bytes[end - 1], b'.' | b',' | b';' | b':' | b'!' | b'?') {
        end -= 1;
    }
    if end > start && bytes[end - 1] == b')' {
        let opens = bytes[start..end].iter().filter(|b| **b == b'(').count();
        let mut closes = bytes[start..end].iter().filter(|b| **b == b')').count();
        while end > start && bytes[end - 1] == b')' && closes > opens {
            end -= 1;
            closes -= 1;
        }
    }
    end
}
