//! Behaviors of the standard tag set.

use std::borrow::Cow;

use url::Url;
use url::form_urlencoded::byte_serialize;

use crate::context::{LINK_KIND, LIST_KIND};
use crate::error::TagError;
use crate::escape::{escape, escape_no_breaks};
use crate::tag::{ListStyle, TagCall};
use crate::text::strip_bbcode;

const WEB_SCHEMES: &[&str] = &["http", "https"];
const IMAGE_SCHEMES: &[&str] = &["http", "https", "ftp"];
const IFRAME_DOMAINS: &[&str] = &["youtube.com", "player.vimeo.com", "dailymotion.com"];

pub(crate) fn open_simple(call: &mut TagCall<'_>, element: &str) -> Option<String> {
    if call.context().enter(element) > 1 {
        return None;
    }
    Some(format!("<{element}>"))
}

pub(crate) fn close_simple(call: &mut TagCall<'_>, element: &str) -> Option<String> {
    if call.context().leave(element) > 0 {
        return None;
    }
    Some(format!("</{element}>"))
}

/// Parses a user supplied target. Targets without a scheme are taken as `http://`.
pub(crate) fn parse_url(target: &str, schemes: &[&str]) -> Result<Url, TagError> {
    let target = target.trim();
    if target.is_empty() {
        return Err(TagError::EmptyUrl);
    }
    let candidate: Cow<'_, str> = if target.contains(':') {
        Cow::Borrowed(target)
    } else {
        Cow::Owned(format!("http://{target}"))
    };
    let url = Url::parse(&candidate).map_err(|err| TagError::InvalidUrl {
        url: candidate.to_string(),
        reason: err.to_string(),
    })?;
    if !schemes.contains(&url.scheme()) {
        return Err(TagError::DisallowedScheme {
            scheme: url.scheme().to_string(),
        });
    }
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(TagError::MissingHost {
            url: candidate.to_string(),
        }),
    }
}

fn display_domain(url: &Url) -> String {
    let host = url.host_str().unwrap_or("").to_lowercase();
    match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    }
}

fn link_target(call: &TagCall<'_>) -> String {
    let params = call.params().trim();
    if params.is_empty() {
        call.contents_text().trim().to_string()
    } else {
        params.to_string()
    }
}

pub(crate) fn open_link(call: &mut TagCall<'_>, annotate: bool) -> Result<Option<String>, TagError> {
    if call.context().enter(LINK_KIND) > 1 {
        return Ok(None);
    }
    let url = parse_url(&link_target(call), WEB_SCHEMES)?;
    let mut close = String::from("</a>");
    if annotate {
        close.push_str(&format!(" [{}]", escape(&display_domain(&url))));
    }
    call.set_close(close);
    Ok(Some(format!("<a href=\"{}\">", escape_no_breaks(url.as_str()))))
}

/// Shared by links and search tags; only the outermost anchor closes.
pub(crate) fn close_link(call: &mut TagCall<'_>) -> Option<String> {
    if call.context().leave(LINK_KIND) > 0 {
        return None;
    }
    call.take_close()
}

pub(crate) fn open_quote(call: &mut TagCall<'_>) -> String {
    let params = call.params();
    if params.is_empty() {
        "<blockquote>".to_string()
    } else {
        format!("<blockquote><em>{}</em><br/>", escape(params))
    }
}

pub(crate) fn open_search(
    call: &mut TagCall<'_>,
    url: &str,
    label: &str,
    annotate: bool,
) -> Option<String> {
    if call.context().enter(LINK_KIND) > 1 {
        return None;
    }
    let query = match call.params() {
        "" => call.contents_text(),
        params => params.to_string(),
    };
    let encoded: String = byte_serialize(query.trim().as_bytes()).collect();
    let href = url.replace("%s", &encoded);

    let mut close = String::from("</a>");
    if annotate && !label.is_empty() {
        close.push_str(&format!(" [{}]", escape(label)));
    }
    call.set_close(close);
    Some(format!("<a href=\"{}\">", escape_no_breaks(&href)))
}

fn code_language(params: &str) -> Option<&str> {
    let lang = params.split_whitespace().next()?;
    let valid = lang.len() <= 32
        && lang
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '+' | '#' | '.'));
    valid.then_some(lang)
}

pub(crate) fn open_code(call: &mut TagCall<'_>) -> String {
    let contents = call.contents().trim_matches('\n');
    call.skip_contents();
    let body = escape_no_breaks(contents);
    match code_language(call.params()) {
        Some(lang) => format!(
            "<div class=\"code\"><pre class=\"language-{}\">{body}</pre></div>",
            escape(&lang.to_ascii_lowercase())
        ),
        None => format!("<div class=\"code\"><pre>{body}</pre></div>"),
    }
}

pub(crate) fn open_image(call: &mut TagCall<'_>) -> Result<Option<String>, TagError> {
    let contents = call.contents();
    call.skip_contents();
    if !call.is_first_segment() {
        return Ok(None);
    }
    let target = match call.params().trim() {
        "" => strip_bbcode(contents),
        params => params.to_string(),
    };
    let target = target.replace('"', "%22");
    let url = parse_url(&target, IMAGE_SCHEMES)?;
    Ok(Some(format!(
        "<img src=\"{}\" alt=\"\"/>",
        escape_no_breaks(url.as_str())
    )))
}

pub(crate) fn open_list(call: &mut TagCall<'_>, style: ListStyle) -> Option<String> {
    if call.context().enter(LIST_KIND) > 1 {
        return None;
    }
    call.context().list_item_pending = true;
    let (open, close) = match (style, call.params()) {
        (ListStyle::Decimal, _) | (ListStyle::ByParam, "1") => ("<ol><li>", "</li></ol>"),
        (ListStyle::ByParam, "a") => (
            "<ol style=\"list-style-type: lower-alpha;\"><li>",
            "</li></ol>",
        ),
        (ListStyle::ByParam, "A") => (
            "<ol style=\"list-style-type: upper-alpha;\"><li>",
            "</li></ol>",
        ),
        (ListStyle::ByParam, _) => ("<ul><li>", "</li></ul>"),
    };
    call.set_close(close);
    Some(open.to_string())
}

pub(crate) fn close_list(call: &mut TagCall<'_>) -> Option<String> {
    call.context().leave(LIST_KIND);
    call.take_close()
}

pub(crate) fn open_list_item(call: &mut TagCall<'_>) -> Option<String> {
    let ctx = call.context();
    if ctx.depth(LIST_KIND) == 0 {
        return None;
    }
    if ctx.list_item_pending {
        ctx.list_item_pending = false;
        return None;
    }
    Some("</li><li>".to_string())
}

pub(crate) fn open_size(call: &mut TagCall<'_>) -> Result<Option<String>, TagError> {
    let digits: String = call.params().chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(TagError::InvalidSize(call.params().to_string()));
    }
    let size = digits.parse::<u32>().unwrap_or(u32::MAX).clamp(4, 64);
    call.set_close("</span>");
    Ok(Some(format!("<span style=\"font-size:{size}px\">")))
}

pub(crate) fn open_color(call: &mut TagCall<'_>) -> Result<Option<String>, TagError> {
    let token = call
        .params()
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_lowercase();
    let mut color: String = token
        .chars()
        .filter(|ch| *ch == '#' || ch.is_ascii_digit() || ch.is_ascii_lowercase())
        .collect();
    if color.is_empty() {
        return Err(TagError::InvalidColor(call.params().to_string()));
    }
    if !color.starts_with('#')
        && matches!(color.len(), 3 | 6)
        && color.chars().all(|ch| ch.is_ascii_hexdigit())
    {
        color.insert(0, '#');
    }
    call.set_close("</span>");
    Ok(Some(format!("<span style=\"color:{color}\">")))
}

pub(crate) fn open_spoiler(call: &mut TagCall<'_>) -> String {
    let id = format!("spoiler-{}", call.node_index());
    let title = match call.params() {
        "" => "Spoiler".to_string(),
        params => escape(params),
    };
    format!(
        "<div class=\"spoiler\"><div class=\"spoiler-heading\">\
         <a data-toggle=\"collapse\" href=\"#{id}\" aria-expanded=\"false\" aria-controls=\"{id}\">{title}</a>\
         </div><div id=\"{id}\" class=\"spoiler-body collapse\">"
    )
}

pub(crate) fn open_video(call: &mut TagCall<'_>) -> Result<Option<String>, TagError> {
    let target = link_target(call);
    call.skip_contents();
    if call.context().enter(LINK_KIND) > 1 || !call.is_first_segment() {
        return Ok(None);
    }
    let url = parse_url(&target, WEB_SCHEMES)?;
    let src = escape_no_breaks(url.as_str());
    if IFRAME_DOMAINS.contains(&display_domain(&url).as_str()) {
        Ok(Some(format!(
            "<div class=\"embed-responsive embed-responsive-16by9\">\
             <iframe class=\"embed-responsive-item\" src=\"{src}\" frameborder=\"0\" allowfullscreen=\"true\"></iframe></div>"
        )))
    } else {
        Ok(Some(format!(
            "<video loop=\"true\" controls=\"true\" src=\"{src}\"></video>"
        )))
    }
}

pub(crate) fn open_section(call: &mut TagCall<'_>) {
    let name = call.params().trim().to_lowercase().replace(' ', "_");
    let contents = call.contents();
    call.skip_contents();
    call.context().add_section(name, contents);
}
