use std::collections::BTreeSet;

/// Knobs of a single render.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RenderOptions {
    /// Wrap bare `http(s)://` URLs in link tags before rendering.
    pub auto_link_urls: bool,
    /// Split blank-line separated text into `<p>` elements.
    pub paragraphs: bool,
    /// Remove empty element pairs and collapse newline runs afterwards.
    pub cleanup_empty_tags: bool,
    /// Curly quotes, dashes, ellipsis and symbol entities in text.
    pub cosmetic_replace: bool,
    /// Tag names whose tokens are dropped.
    pub excluded_tags: BTreeSet<String>,
    /// Render unregistered tags as escaped text instead of dropping them.
    pub render_unknown_tags: bool,
    /// Input longer than this many chars is truncated before rendering.
    pub max_input_len: Option<usize>,
    /// Pass the result through the HTML allow-list.
    pub sanitize: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            auto_link_urls: true,
            paragraphs: false,
            cleanup_empty_tags: true,
            cosmetic_replace: true,
            excluded_tags: BTreeSet::new(),
            render_unknown_tags: false,
            max_input_len: None,
            sanitize: false,
        }
    }
}

impl RenderOptions {
    pub fn exclude_tag(mut self, name: impl Into<String>) -> Self {
        self.excluded_tags.insert(name.into().to_lowercase());
        self
    }

    pub(crate) fn is_excluded(&self, name: &str) -> bool {
        self.excluded_tags.contains(name)
            || self
                .excluded_tags
                .iter()
                .any(|excluded| excluded.eq_ignore_ascii_case(name))
    }
}
