use std::collections::{BTreeSet, HashMap};

use crate::tag::{TagDescriptor, TagFlags};

const WIKI_URL: &str = "http://en.wikipedia.org/wiki/Special:Search?search=%s";
const GOOGLE_URL: &str = "http://www.google.com/search?hl=en&q=%s&btnG=Google+Search";
const DICTIONARY_URL: &str = "http://dictionary.reference.com/browse/%s";

/// Tag name to behavior mapping. Built once, then shared read-only between renders.
#[derive(Clone, Debug)]
pub struct TagRegistry {
    tags: HashMap<String, TagDescriptor>,
    fallback: TagDescriptor,
}

impl Default for TagRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TagRegistry {
    /// An empty registry whose fallback renders tags as escaped text.
    pub fn new() -> Self {
        Self {
            tags: HashMap::new(),
            fallback: TagDescriptor::literal(),
        }
    }

    /// The standard forum tag set, without link annotations.
    pub fn standard() -> Self {
        RegistryBuilder::new().build()
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Registers `descriptor` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, descriptor: TagDescriptor) {
        self.tags.insert(name.into().to_lowercase(), descriptor);
    }

    pub fn lookup(&self, name: &str) -> Option<&TagDescriptor> {
        self.tags.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    /// Descriptor used for unregistered tags when unknown tags are rendered.
    pub fn fallback(&self) -> &TagDescriptor {
        &self.fallback
    }

    pub fn set_fallback(&mut self, descriptor: TagDescriptor) {
        self.fallback = descriptor;
    }

    /// Registered names, sorted.
    pub fn tag_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tags.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// Assembles a [`TagRegistry`] from the standard tag set plus custom tags.
#[derive(Clone, Debug)]
pub struct RegistryBuilder {
    standard: bool,
    include: Option<BTreeSet<String>>,
    exclude: BTreeSet<String>,
    annotate_links: bool,
    extra: Vec<(String, TagDescriptor)>,
    fallback: Option<TagDescriptor>,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            standard: true,
            include: None,
            exclude: BTreeSet::new(),
            annotate_links: false,
            extra: Vec::new(),
            fallback: None,
        }
    }

    /// Starts from no standard tags at all.
    pub fn empty() -> Self {
        Self {
            standard: false,
            ..Self::new()
        }
    }

    /// Keeps only the named standard tags.
    pub fn include<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Leaves the named standard tags out.
    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(names.into_iter().map(Into::into));
        self
    }

    /// Appends ` [domain]` after links and search links.
    pub fn annotate_links(mut self, annotate: bool) -> Self {
        self.annotate_links = annotate;
        self
    }

    /// Adds a tag on top of the standard set. Include and exclude filters do not apply.
    pub fn tag(mut self, name: impl Into<String>, descriptor: TagDescriptor) -> Self {
        self.extra.push((name.into(), descriptor));
        self
    }

    pub fn fallback(mut self, descriptor: TagDescriptor) -> Self {
        self.fallback = Some(descriptor);
        self
    }

    pub fn build(self) -> TagRegistry {
        let mut registry = TagRegistry::new();
        if self.standard {
            for (name, descriptor) in standard_tags(self.annotate_links) {
                let included = self
                    .include
                    .as_ref()
                    .is_none_or(|include| include.contains(name));
                if included && !self.exclude.contains(name) {
                    registry.register(name, descriptor);
                }
            }
        }
        for (name, descriptor) in self.extra {
            registry.register(name, descriptor);
        }
        if let Some(fallback) = self.fallback {
            registry.set_fallback(fallback);
        }
        log::debug!("tag registry built with {} tags", registry.len());
        registry
    }
}

fn standard_tags(annotate: bool) -> Vec<(&'static str, TagDescriptor)> {
    vec![
        ("b", TagDescriptor::simple("strong")),
        ("i", TagDescriptor::simple("em")),
        ("u", TagDescriptor::simple("u")),
        (
            "s",
            TagDescriptor::simple("strike").with_flags(TagFlags {
                opaque: true,
                ..TagFlags::INLINE
            }),
        ),
        ("link", TagDescriptor::link(annotate)),
        ("url", TagDescriptor::link(annotate)),
        ("quote", TagDescriptor::quote()),
        (
            "wiki",
            TagDescriptor::search(WIKI_URL, "wikipedia.com", annotate),
        ),
        (
            "google",
            TagDescriptor::search(GOOGLE_URL, "google.com", annotate),
        ),
        (
            "dictionary",
            TagDescriptor::search(DICTIONARY_URL, "dictionary.com", annotate),
        ),
        (
            "dict",
            TagDescriptor::search(DICTIONARY_URL, "dictionary.com", annotate),
        ),
        ("img", TagDescriptor::image()),
        ("list", TagDescriptor::list()),
        ("ul", TagDescriptor::list()),
        ("ol", TagDescriptor::ordered_list()),
        ("*", TagDescriptor::list_item()),
        ("li", TagDescriptor::list_item()),
        ("size", TagDescriptor::size()),
        ("color", TagDescriptor::color()),
        ("center", TagDescriptor::center()),
        ("code", TagDescriptor::code()),
        ("spoiler", TagDescriptor::spoiler()),
        ("video", TagDescriptor::video()),
    ]
}
