//! Render entry points: input preparation, node-list execution and post-processing.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::autolink::autolink;
use crate::builder;
use crate::cleanup::cleanup_html;
use crate::context::RenderContext;
use crate::error::RenderError;
use crate::escape::{compile_static, escape};
use crate::node::{Node, NodeList};
use crate::options::RenderOptions;
use crate::registry::TagRegistry;
use crate::sanitize::sanitize_html;
use crate::tag::{TagCall, TagDescriptor};

static STANDARD: Lazy<Arc<TagRegistry>> = Lazy::new(|| Arc::new(TagRegistry::standard()));
static SECTIONED: Lazy<Arc<TagRegistry>> = Lazy::new(|| {
    Arc::new(
        TagRegistry::builder()
            .tag("section", TagDescriptor::section())
            .build(),
    )
});
static BREAK_GROUPS: Lazy<Option<Regex>> = Lazy::new(|| compile_static(r"\n{2,}"));

/// Renders markup with the standard tag set.
pub fn render(text: &str, options: &RenderOptions) -> String {
    render_lenient(&STANDARD, options, text).html
}

/// HTML plus the auxiliary output collected by tags during the render.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Rendered {
    pub html: String,
    /// Raw contents of section tags, by section name, in document order.
    pub sections: BTreeMap<String, Vec<String>>,
}

/// A tag registry paired with render options.
///
/// The registry is shared read-only, so one `Markup` (or clones of it) can serve
/// concurrent renders; every render gets its own [`RenderContext`].
#[derive(Clone, Debug)]
pub struct Markup {
    registry: Arc<TagRegistry>,
    options: RenderOptions,
}

impl Default for Markup {
    fn default() -> Self {
        Self::standard()
    }
}

impl Markup {
    pub fn new(registry: TagRegistry) -> Self {
        Self::from_shared(Arc::new(registry))
    }

    pub fn from_shared(registry: Arc<TagRegistry>) -> Self {
        Self {
            registry,
            options: RenderOptions::default(),
        }
    }

    /// The standard tag set with default options.
    pub fn standard() -> Self {
        Self::from_shared(Arc::clone(&STANDARD))
    }

    /// The standard tag set plus `[section=name]`, which fills [`Rendered::sections`].
    pub fn with_sections() -> Self {
        Self::from_shared(Arc::clone(&SECTIONED))
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut RenderOptions {
        &mut self.options
    }

    pub fn registry(&self) -> &TagRegistry {
        &self.registry
    }

    /// Renders `text` to HTML. Never fails: bad tags render as nothing and failing
    /// post-processors are skipped.
    pub fn render(&self, text: &str) -> String {
        self.render_document(text).html
    }

    pub fn render_document(&self, text: &str) -> Rendered {
        render_lenient(&self.registry, &self.options, text)
    }

    /// Like [`Markup::render_document`], but the first suppressed tag error or skipped
    /// post-processor is returned instead of logged.
    pub fn try_render(&self, text: &str) -> Result<Rendered, RenderError> {
        run(&self.registry, &self.options, text, true)
    }

    /// Runs the first render phase only.
    pub fn compile(&self, text: &str) -> NodeList<'_> {
        let markup = prepare(&self.registry, &self.options, text, false)
            .unwrap_or_else(|_| text.to_string());
        let mut ctx = RenderContext::new();
        builder::compile(&self.registry, &self.options, markup, &mut ctx)
    }
}

fn render_lenient(registry: &TagRegistry, options: &RenderOptions, text: &str) -> Rendered {
    match run(registry, options, text, false) {
        Ok(rendered) => rendered,
        Err(err) => {
            log::error!("render failed, falling back to escaped text: {err}");
            Rendered {
                html: escape(text),
                sections: BTreeMap::new(),
            }
        }
    }
}

fn run(
    registry: &TagRegistry,
    options: &RenderOptions,
    text: &str,
    strict: bool,
) -> Result<Rendered, RenderError> {
    let markup = prepare(registry, options, text, strict)?;
    let mut ctx = RenderContext::new();
    let list = builder::compile(registry, options, markup, &mut ctx);
    let mut html = execute(&list, &mut ctx, strict)?;

    if options.cleanup_empty_tags {
        match cleanup_html(&html) {
            Ok(cleaned) => html = cleaned,
            Err(err) if strict => return Err(err),
            Err(err) => log::warn!("html cleanup skipped: {err}"),
        }
    }
    if options.sanitize {
        html = sanitize_html(&html);
    }
    Ok(Rendered {
        html,
        sections: ctx.take_sections(),
    })
}

fn prepare(
    registry: &TagRegistry,
    options: &RenderOptions,
    text: &str,
    strict: bool,
) -> Result<String, RenderError> {
    let mut text = Cow::Borrowed(text);
    if let Some(max) = options.max_input_len
        && let Some((cut, _)) = text.char_indices().nth(max)
    {
        log::warn!("input of {} bytes truncated to {max} chars", text.len());
        text = Cow::Owned(text[..cut].to_owned());
    }

    let mut markup = if options.auto_link_urls {
        match autolink(&text, registry) {
            Ok(linked) => linked,
            Err(err) if strict => return Err(err),
            Err(err) => {
                log::warn!("url auto-linking skipped: {err}");
                text.into_owned()
            }
        }
    } else {
        text.into_owned()
    };

    if markup.contains('\r') {
        markup = markup.replace("\r\n", "\n");
    }
    if options.paragraphs
        && let Some(groups) = BREAK_GROUPS.as_ref()
    {
        markup = groups.replace_all(&markup, "\n\n").into_owned();
    }
    Ok(markup)
}

/// Second render phase. Walks the nodes by index because a tag may skip its own contents.
fn execute(
    list: &NodeList<'_>,
    ctx: &mut RenderContext,
    strict: bool,
) -> Result<String, RenderError> {
    let mut out = String::with_capacity(list.source.len() + list.source.len() / 4);
    let mut index = 0;
    while let Some(node) = list.nodes.get(index) {
        let (instance, opening) = match node {
            Node::Text { html, .. } => {
                out.push_str(html);
                index += 1;
                continue;
            }
            Node::Markup(html) => {
                out.push_str(html);
                index += 1;
                continue;
            }
            Node::Open { instance, .. } => (*instance, true),
            Node::Close { instance } => (*instance, false),
        };
        let Some(tag) = list.instances.get(instance) else {
            index += 1;
            continue;
        };

        let mut call = TagCall::new(list, instance, index, ctx);
        let result = if opening {
            tag.descriptor.render_open(&mut call)
        } else {
            tag.descriptor.render_close(&mut call)
        };
        let skip_to = call.skip_to;

        match result {
            Ok(Some(html)) => out.push_str(&html),
            Ok(None) => {}
            Err(source) if strict => {
                return Err(RenderError::Tag {
                    tag: tag.name.clone(),
                    span: tag.token,
                    source,
                });
            }
            Err(err) => log::debug!("[{}] at {:?} rendered empty: {err}", tag.name, tag.token),
        }

        // The close node of a skipped segment still runs.
        match skip_to {
            Some(target) if target > index => index = target,
            _ => index += 1,
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{Markup, render};
    use crate::options::RenderOptions;

    #[test]
    fn renders_simple_tags() {
        assert_eq!(
            render("[b]hello[/b]", &RenderOptions::default()),
            "<strong>hello</strong>"
        );
    }

    #[test]
    fn strict_mode_reports_bad_tags() {
        let markup = Markup::standard();
        let err = markup.try_render("[url=javascript:alert(1)]x[/url]").unwrap_err();
        assert_eq!(err.span().map(|span| span.start), Some(0));
        assert_eq!(markup.render("[url=javascript:alert(1)]x[/url]"), "x");
    }

    #[test]
    fn truncates_long_input() {
        let options = RenderOptions {
            max_input_len: Some(3),
            ..RenderOptions::default()
        };
        assert_eq!(render("héllo", &options), "hél");
    }
}
