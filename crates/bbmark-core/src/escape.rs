use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static COSMETIC: Lazy<Option<Regex>> =
    Lazy::new(|| compile_static(r"\.\.\.|---|--|\(tm\)|\(reg\)|\(c\)"));
static DOUBLE_QUOTES: Lazy<Option<Regex>> = Lazy::new(|| compile_static(r"&quot;(.*?)&quot;"));
static SINGLE_QUOTES: Lazy<Option<Regex>> = Lazy::new(|| compile_static(r"\s'(.+?)'"));

/// Compiles one of the crate's built-in patterns. A pattern that fails to compile disables
/// the pass that uses it instead of aborting the process.
pub(crate) fn compile_static(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(err) => {
            log::error!("built-in pattern {pattern:?} failed to compile: {err}");
            None
        }
    }
}

/// Escapes text for HTML and turns newlines into `<br/>`.
pub fn escape(text: &str) -> String {
    escape_with(text, true)
}

/// Escapes text for HTML, keeping newlines as they are.
pub fn escape_no_breaks(text: &str) -> String {
    escape_with(text, false)
}

fn escape_with(text: &str, breaks: bool) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' if breaks => out.push_str("<br/>"),
            _ => out.push(ch),
        }
    }
    out
}

/// Reverses [`escape_no_breaks`] for the entities it produces.
pub fn unescape(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}

/// Typographic substitutions on already escaped text: dashes, ellipsis, symbols and
/// curly quotes.
pub fn cosmetic_replace(escaped: &str) -> String {
    let mut out = match COSMETIC.as_ref() {
        Some(regex) => regex
            .replace_all(escaped, |caps: &Captures| {
                match &caps[0] {
                    "..." => "&#8230;",
                    "---" => "&mdash;",
                    "--" => "&ndash;",
                    "(tm)" => "&trade;",
                    "(reg)" => "&reg;",
                    _ => "&copy;",
                }
                .to_string()
            })
            .into_owned(),
        None => escaped.to_string(),
    };
    if let Some(regex) = DOUBLE_QUOTES.as_ref() {
        out = regex.replace_all(&out, "&ldquo;${1}&rdquo;").into_owned();
    }
    if let Some(regex) = SINGLE_QUOTES.as_ref() {
        out = regex.replace_all(&out, " &lsquo;${1}&rsquo;").into_owned();
    }
    out
}
