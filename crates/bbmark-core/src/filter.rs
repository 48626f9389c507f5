//! HTML-aware text filter: rewrites text between tags and leaves markup, entities and the
//! contents of excluded elements untouched.

use memchr::{memchr, memchr2};

use crate::error::FilterError;

/// Elements whose contents the post-render passes never rewrite.
pub const DEFAULT_EXCLUDED_TAGS: &[&str] = &["a", "pre", "strike"];

const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";

fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input" | "link" | "meta"
            | "param" | "source" | "track" | "wbr"
    )
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b':' | b'_' | b'-')
}

/// Applies `rewrite` to every run of text data in `html` outside `excluded` elements.
/// Tags, comments and entity references are copied as they are.
pub fn filter_text<F>(html: &str, excluded: &[&str], mut rewrite: F) -> Result<String, FilterError>
where
    F: FnMut(&str) -> String,
{
    let bytes = html.as_bytes();
    let mut out = String::with_capacity(html.len());
    let mut excluded_depth = 0usize;
    let mut data_start = 0;
    let mut i = 0;

    let mut flush = |out: &mut String, data: &str, depth: usize| {
        if data.is_empty() {
            return;
        }
        if depth == 0 {
            out.push_str(&rewrite(data));
        } else {
            out.push_str(data);
        }
    };

    while let Some(rel) = memchr2(b'<', b'&', &bytes[i..]) {
        let at = i + rel;
        if bytes[at] == b'&' {
            match entity_end(bytes, at) {
                Some(end) => {
                    flush(&mut out, &html[data_start..at], excluded_depth);
                    out.push_str(&html[at..end]);
                    data_start = end;
                    i = end;
                }
                // A bare ampersand is data.
                None => i = at + 1,
            }
            continue;
        }

        flush(&mut out, &html[data_start..at], excluded_depth);
        let end = if html[at..].starts_with(COMMENT_START) {
            html[at + COMMENT_START.len()..]
                .find(COMMENT_END)
                .map(|off| at + COMMENT_START.len() + off + COMMENT_END.len())
        } else {
            memchr(b'>', &bytes[at..]).map(|off| at + off + 1)
        }
        .ok_or(FilterError::UnterminatedTag { offset: at })?;

        let tag = &html[at..end];
        if let Some((name, closing)) = tag_name(tag) {
            let name = name.to_ascii_lowercase();
            let is_excluded = excluded.iter().any(|candidate| candidate.eq_ignore_ascii_case(&name));
            if is_excluded {
                if closing {
                    excluded_depth = excluded_depth.saturating_sub(1);
                } else if !tag.ends_with("/>") && !is_void_element(&name) {
                    excluded_depth += 1;
                }
            }
        }
        out.push_str(tag);
        data_start = end;
        i = end;
    }
    flush(&mut out, &html[data_start..], excluded_depth);
    Ok(out)
}

/// End of a `&name;`, `&#123;` or `&#x1f;` reference starting at `at`.
fn entity_end(bytes: &[u8], at: usize) -> Option<usize> {
    let mut end = at + 1;
    if bytes.get(end) == Some(&b'#') {
        end += 1;
    }
    let name_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_alphanumeric) {
        end += 1;
    }
    (end > name_start && bytes.get(end) == Some(&b';')).then_some(end + 1)
}

fn tag_name(tag: &str) -> Option<(&str, bool)> {
    let inner = tag.strip_prefix('<')?;
    let (inner, closing) = match inner.strip_prefix('/') {
        Some(rest) => (rest, true),
        None => (inner, false),
    };
    let len = inner.bytes().take_while(|b| is_name_byte(*b)).count();
    (len > 0).then(|| (&inner[..len], closing))
}
