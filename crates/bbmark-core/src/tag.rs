use std::fmt;
use std::sync::Arc;

use crate::context::RenderContext;
use crate::error::TagError;
use crate::node::{Node, NodeList, TagInstance};
use crate::span::Span;
use crate::tags;

/// When a tag closes without an explicit `[/name]`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum AutoClose {
    #[default]
    Never,
    Always,
    /// Closes immediately when the opening token carries a parameter, as in `[img=url]`.
    WithParams,
}

/// Structural flags the tree builder consults.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TagFlags {
    /// Inline tags are closed and reopened around block tags.
    pub inline: bool,
    /// Contents are not parsed as markup.
    pub enclosed: bool,
    pub auto_close: AutoClose,
    /// Drop leading whitespace of the first text inside the tag.
    pub strip_first_newline: bool,
    /// Text inside keeps its newlines instead of becoming `<br/>`.
    pub no_breaks: bool,
    /// Bare URLs inside are not auto-linked.
    pub opaque: bool,
}

impl TagFlags {
    pub const INLINE: TagFlags = TagFlags {
        inline: true,
        enclosed: false,
        auto_close: AutoClose::Never,
        strip_first_newline: false,
        no_breaks: false,
        opaque: false,
    };

    pub const BLOCK: TagFlags = TagFlags {
        inline: false,
        enclosed: false,
        auto_close: AutoClose::Never,
        strip_first_newline: false,
        no_breaks: false,
        opaque: false,
    };
}

/// Ordered list numbering selected by a list tag.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ListStyle {
    /// `[list]`: unordered unless the parameter is `1`, `a` or `A`.
    ByParam,
    Decimal,
}

/// Behavior behind a custom tag.
pub trait TagRender: Send + Sync {
    fn render_open(&self, call: &mut TagCall<'_>) -> Result<Option<String>, TagError>;

    fn render_close(&self, _call: &mut TagCall<'_>) -> Result<Option<String>, TagError> {
        Ok(None)
    }
}

#[derive(Clone)]
pub(crate) enum TagKind {
    Simple { element: String },
    Link { annotate: bool },
    Quote,
    Search {
        url: String,
        label: String,
        annotate: bool,
    },
    Code,
    Image,
    List(ListStyle),
    ListItem,
    Size,
    Color,
    Center,
    Spoiler,
    Video,
    Section,
    Literal,
    Custom(Arc<dyn TagRender>),
}

impl fmt::Debug for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagKind::Simple { element } => write!(f, "Simple({element})"),
            TagKind::Link { annotate } => write!(f, "Link(annotate: {annotate})"),
            TagKind::Search { url, .. } => write!(f, "Search({url})"),
            TagKind::List(style) => write!(f, "List({style:?})"),
            TagKind::Custom(_) => f.write_str("Custom"),
            other => f.write_str(match other {
                TagKind::Quote => "Quote",
                TagKind::Code => "Code",
                TagKind::Image => "Image",
                TagKind::ListItem => "ListItem",
                TagKind::Size => "Size",
                TagKind::Color => "Color",
                TagKind::Center => "Center",
                TagKind::Spoiler => "Spoiler",
                TagKind::Video => "Video",
                TagKind::Section => "Section",
                _ => "Literal",
            }),
        }
    }
}

/// How a tag name renders: structural flags plus open/close behavior.
#[derive(Clone, Debug)]
pub struct TagDescriptor {
    pub(crate) flags: TagFlags,
    pub(crate) kind: TagKind,
}

impl TagDescriptor {
    fn new(flags: TagFlags, kind: TagKind) -> Self {
        Self { flags, kind }
    }

    /// Inline tag rendered as `<element>`; nested repeats collapse into one element.
    pub fn simple(element: impl Into<String>) -> Self {
        Self::new(
            TagFlags::INLINE,
            TagKind::Simple {
                element: element.into(),
            },
        )
    }

    pub fn link(annotate: bool) -> Self {
        Self::new(
            TagFlags {
                opaque: true,
                ..TagFlags::INLINE
            },
            TagKind::Link { annotate },
        )
    }

    pub fn quote() -> Self {
        Self::new(
            TagFlags {
                strip_first_newline: true,
                ..TagFlags::BLOCK
            },
            TagKind::Quote,
        )
    }

    /// Link to a search engine. `url` contains `%s` where the encoded query goes.
    pub fn search(url: impl Into<String>, label: impl Into<String>, annotate: bool) -> Self {
        Self::new(
            TagFlags {
                opaque: true,
                ..TagFlags::INLINE
            },
            TagKind::Search {
                url: url.into(),
                label: label.into(),
                annotate,
            },
        )
    }

    pub fn code() -> Self {
        Self::new(
            TagFlags {
                enclosed: true,
                strip_first_newline: true,
                no_breaks: true,
                opaque: true,
                ..TagFlags::BLOCK
            },
            TagKind::Code,
        )
    }

    pub fn image() -> Self {
        Self::new(
            TagFlags {
                auto_close: AutoClose::WithParams,
                opaque: true,
                ..TagFlags::INLINE
            },
            TagKind::Image,
        )
    }

    pub fn list() -> Self {
        Self::new(
            TagFlags {
                strip_first_newline: true,
                ..TagFlags::BLOCK
            },
            TagKind::List(ListStyle::ByParam),
        )
    }

    pub fn ordered_list() -> Self {
        Self::new(
            TagFlags {
                strip_first_newline: true,
                ..TagFlags::BLOCK
            },
            TagKind::List(ListStyle::Decimal),
        )
    }

    pub fn list_item() -> Self {
        Self::new(
            TagFlags {
                auto_close: AutoClose::Always,
                ..TagFlags::BLOCK
            },
            TagKind::ListItem,
        )
    }

    pub fn size() -> Self {
        Self::new(TagFlags::INLINE, TagKind::Size)
    }

    pub fn color() -> Self {
        Self::new(TagFlags::INLINE, TagKind::Color)
    }

    pub fn center() -> Self {
        Self::new(TagFlags::BLOCK, TagKind::Center)
    }

    pub fn spoiler() -> Self {
        Self::new(
            TagFlags {
                strip_first_newline: true,
                ..TagFlags::BLOCK
            },
            TagKind::Spoiler,
        )
    }

    pub fn video() -> Self {
        Self::new(
            TagFlags {
                opaque: true,
                ..TagFlags::INLINE
            },
            TagKind::Video,
        )
    }

    /// Stores its raw contents under a named section of the render output.
    pub fn section() -> Self {
        Self::new(
            TagFlags {
                enclosed: true,
                strip_first_newline: true,
                ..TagFlags::BLOCK
            },
            TagKind::Section,
        )
    }

    /// Renders the tag token itself as escaped text.
    pub fn literal() -> Self {
        Self::new(
            TagFlags {
                auto_close: AutoClose::Always,
                ..TagFlags::INLINE
            },
            TagKind::Literal,
        )
    }

    pub fn custom(flags: TagFlags, render: impl TagRender + 'static) -> Self {
        Self::new(flags, TagKind::Custom(Arc::new(render)))
    }

    pub fn with_flags(mut self, flags: TagFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn flags(&self) -> TagFlags {
        self.flags
    }

    pub fn is_inline(&self) -> bool {
        self.flags.inline
    }

    pub fn is_enclosed(&self) -> bool {
        self.flags.enclosed
    }

    pub(crate) fn closes_immediately(&self, params: &str) -> bool {
        match self.flags.auto_close {
            AutoClose::Never => false,
            AutoClose::Always => true,
            AutoClose::WithParams => !params.trim().is_empty(),
        }
    }

    pub(crate) fn suppresses_autolink(&self) -> bool {
        self.flags.enclosed || self.flags.opaque
    }

    pub(crate) fn render_open(&self, call: &mut TagCall<'_>) -> Result<Option<String>, TagError> {
        match &self.kind {
            TagKind::Simple { element } => Ok(tags::open_simple(call, element)),
            TagKind::Link { annotate } => tags::open_link(call, *annotate),
            TagKind::Quote => Ok(Some(tags::open_quote(call))),
            TagKind::Search {
                url,
                label,
                annotate,
            } => Ok(tags::open_search(call, url, label, *annotate)),
            TagKind::Code => Ok(Some(tags::open_code(call))),
            TagKind::Image => tags::open_image(call),
            TagKind::List(style) => Ok(tags::open_list(call, *style)),
            TagKind::ListItem => Ok(tags::open_list_item(call)),
            TagKind::Size => tags::open_size(call),
            TagKind::Color => tags::open_color(call),
            TagKind::Center => Ok(Some("<div style=\"text-align:center;\">".to_string())),
            TagKind::Spoiler => Ok(Some(tags::open_spoiler(call))),
            TagKind::Video => tags::open_video(call),
            TagKind::Section => {
                tags::open_section(call);
                Ok(None)
            }
            TagKind::Literal => Ok(Some(crate::escape::escape(call.outer_contents()))),
            TagKind::Custom(render) => render.render_open(call),
        }
    }

    pub(crate) fn render_close(&self, call: &mut TagCall<'_>) -> Result<Option<String>, TagError> {
        match &self.kind {
            TagKind::Simple { element } => Ok(tags::close_simple(call, element)),
            TagKind::Link { .. } | TagKind::Search { .. } => Ok(tags::close_link(call)),
            TagKind::Quote => Ok(Some("</blockquote>".to_string())),
            TagKind::List(_) => Ok(tags::close_list(call)),
            TagKind::Size | TagKind::Color => Ok(call.take_close()),
            TagKind::Center => Ok(Some("</div>".to_string())),
            TagKind::Spoiler => Ok(Some("</div></div>".to_string())),
            TagKind::Video => {
                call.context().leave(crate::context::LINK_KIND);
                Ok(None)
            }
            TagKind::Custom(render) => render.render_close(call),
            TagKind::Code
            | TagKind::Image
            | TagKind::ListItem
            | TagKind::Section
            | TagKind::Literal => Ok(None),
        }
    }
}

/// What a tag behavior sees while the node list executes: its own instance, the compiled
/// markup and the render context.
pub struct TagCall<'a> {
    list: &'a NodeList<'a>,
    instance: usize,
    node_index: usize,
    ctx: &'a mut RenderContext,
    pub(crate) skip_to: Option<usize>,
}

impl<'a> TagCall<'a> {
    pub(crate) fn new(
        list: &'a NodeList<'a>,
        instance: usize,
        node_index: usize,
        ctx: &'a mut RenderContext,
    ) -> Self {
        Self {
            list,
            instance,
            node_index,
            ctx,
            skip_to: None,
        }
    }

    fn instance(&self) -> Option<&'a TagInstance<'a>> {
        let list: &'a NodeList<'a> = self.list;
        list.instances.get(self.instance)
    }

    pub fn name(&self) -> &'a str {
        self.instance().map(|tag| tag.name.as_str()).unwrap_or("")
    }

    pub fn params(&self) -> &'a str {
        self.instance().map(|tag| tag.params.as_str()).unwrap_or("")
    }

    /// Span of the opening tag token.
    pub fn span(&self) -> Span {
        self.instance().map(|tag| tag.token).unwrap_or_default()
    }

    /// Identifies the tag instance for the whole render.
    pub fn instance_id(&self) -> usize {
        self.instance
    }

    /// Index of the node being executed. Unique within a render.
    pub fn node_index(&self) -> usize {
        self.node_index
    }

    /// Raw markup between the opening and closing tokens.
    pub fn contents(&self) -> &'a str {
        let list: &'a NodeList<'a> = self.list;
        let len = list.source.len();
        self.instance()
            .map(|tag| tag.contents_span(len).slice(&list.source))
            .unwrap_or("")
    }

    /// Raw markup from the opening token through the contents.
    pub fn outer_contents(&self) -> &'a str {
        let list: &'a NodeList<'a> = self.list;
        let len = list.source.len();
        self.instance()
            .map(|tag| tag.outer_span(len).slice(&list.source))
            .unwrap_or("")
    }

    /// Text nodes between the tag's open and close, without any markup.
    pub fn contents_text(&self) -> String {
        let Some(tag) = self.instance() else {
            return String::new();
        };
        let end = tag.close_node.unwrap_or(self.list.nodes.len());
        self.list
            .nodes
            .get(tag.open_node..end)
            .unwrap_or(&[])
            .iter()
            .filter_map(|node| match node {
                Node::Text { raw, .. } => Some(raw.as_str()),
                _ => None,
            })
            .collect()
    }

    /// False when overlap repair reopened the tag after a block split.
    pub fn is_first_segment(&self) -> bool {
        self.instance()
            .is_none_or(|tag| tag.open_node == self.node_index)
    }

    /// Makes the walker jump over this segment's contents to its close node.
    pub fn skip_contents(&mut self) {
        if let Some(Node::Open { segment_end, .. }) = self.list.nodes.get(self.node_index) {
            self.skip_to = Some(*segment_end);
        }
    }

    pub fn context(&mut self) -> &mut RenderContext {
        self.ctx
    }

    pub(crate) fn set_close(&mut self, html: impl Into<String>) {
        self.ctx.set_close(self.instance, html);
    }

    pub(crate) fn take_close(&mut self) -> Option<String> {
        self.ctx.take_close(self.instance)
    }
}
