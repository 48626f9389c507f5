use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::RenderError;
use crate::escape::compile_static;

const BLANK_PAIR_PATTERN: &str = r"<(\w+)>\s*</\1>";

// The back-reference needs fancy-regex.
static BLANK_PAIR: Lazy<Option<fancy_regex::Regex>> =
    Lazy::new(|| match fancy_regex::Regex::new(BLANK_PAIR_PATTERN) {
        Ok(regex) => Some(regex),
        Err(err) => {
            log::error!("built-in pattern {BLANK_PAIR_PATTERN:?} failed to compile: {err}");
            None
        }
    });
static NEWLINE_RUNS: Lazy<Option<Regex>> = Lazy::new(|| compile_static(r"\n{2,}"));

/// Removes attribute-less element pairs holding only whitespace, repeating until nothing
/// changes, then collapses newline runs outside `<pre>` blocks.
pub fn cleanup_html(html: &str) -> Result<String, RenderError> {
    let blank = BLANK_PAIR
        .as_ref()
        .ok_or(RenderError::Pattern(BLANK_PAIR_PATTERN))?;
    let mut html = html.to_string();
    loop {
        let cleaned = remove_blank_pairs(blank, &html)?;
        if cleaned == html {
            break;
        }
        html = cleaned;
    }
    Ok(collapse_newlines(&html))
}

fn remove_blank_pairs(blank: &fancy_regex::Regex, html: &str) -> Result<String, RenderError> {
    let mut out = String::with_capacity(html.len());
    let mut last = 0;
    for found in blank.find_iter(html) {
        let found = found.map_err(Box::new)?;
        out.push_str(&html[last..found.start()]);
        out.push(' ');
        last = found.end();
    }
    out.push_str(&html[last..]);
    Ok(out)
}

fn collapse_newlines(html: &str) -> String {
    let Some(runs) = NEWLINE_RUNS.as_ref() else {
        return html.to_string();
    };
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(start) = rest.find("<pre") {
        let end = rest[start..]
            .find("</pre>")
            .map(|off| start + off + "</pre>".len())
            .unwrap_or(rest.len());
        out.push_str(&runs.replace_all(&rest[..start], "\n"));
        out.push_str(&rest[start..end]);
        rest = &rest[end..];
    }
    out.push_str(&runs.replace_all(rest, "\n"));
    out
}
