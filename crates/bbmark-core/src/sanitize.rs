use ammonia::Builder;
use std::collections::{HashMap, HashSet};

/// Passes rendered HTML through an allow-list of the elements and attributes the standard
/// tags produce. Anything else, including script and event handler attributes, is removed.
pub fn sanitize_html(html: &str) -> String {
    let tags: HashSet<&'static str> = [
        "a",
        "blockquote",
        "br",
        "div",
        "em",
        "iframe",
        "img",
        "li",
        "ol",
        "p",
        "pre",
        "span",
        "strike",
        "strong",
        "u",
        "ul",
        "video",
    ]
    .iter()
    .copied()
    .collect();

    let mut generic_attributes: HashSet<&'static str> = HashSet::new();
    generic_attributes.insert("class");
    generic_attributes.insert("id");

    let mut tag_attributes = HashMap::new();
    tag_attributes.insert("a", ["href", "title"].iter().copied().collect());
    tag_attributes.insert("img", ["alt", "src"].iter().copied().collect());
    tag_attributes.insert("span", ["style"].iter().copied().collect());
    tag_attributes.insert("div", ["style"].iter().copied().collect());
    tag_attributes.insert("ol", ["style"].iter().copied().collect());
    tag_attributes.insert(
        "iframe",
        ["src", "frameborder", "allowfullscreen"]
            .iter()
            .copied()
            .collect(),
    );
    tag_attributes.insert(
        "video",
        ["src", "loop", "controls"].iter().copied().collect(),
    );

    // Spoiler toggles.
    let mut generic_attribute_prefixes = HashSet::new();
    generic_attribute_prefixes.insert("data-");
    generic_attribute_prefixes.insert("aria-");

    Builder::new()
        .tags(tags)
        .generic_attributes(generic_attributes)
        .tag_attributes(tag_attributes)
        .generic_attribute_prefixes(generic_attribute_prefixes)
        .link_rel(None)
        .clean(html)
        .to_string()
}
