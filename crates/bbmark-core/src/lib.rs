mod autolink;
mod builder;
mod cache;
mod cleanup;
mod context;
mod dialect;
mod emoticons;
mod error;
mod escape;
mod filter;
mod legacy;
mod mentions;
mod node;
mod options;
mod pipeline;
mod registry;
mod render;
mod sanitize;
mod source_map;
mod span;
mod tag;
mod tags;
mod text;
mod tokenizer;

pub use autolink::autolink;
pub use cache::RenderCache;
pub use cleanup::cleanup_html;
pub use context::{LINK_KIND, LIST_KIND, RenderContext};
pub use dialect::{Dialect, DialectError};
pub use emoticons::EmoticonTable;
pub use error::{FilterError, RenderError, TagError};
pub use escape::{cosmetic_replace, escape, escape_no_breaks, unescape};
pub use filter::{DEFAULT_EXCLUDED_TAGS, filter_text};
pub use legacy::rewrite_legacy_tags;
pub use mentions::{KnownUsers, UserDirectory, UserHandle, mentioned_users, tag_mentions};
pub use node::NodeList;
pub use options::RenderOptions;
pub use pipeline::ContentRenderer;
pub use registry::{RegistryBuilder, TagRegistry};
pub use render::{Markup, Rendered, render};
pub use sanitize::sanitize_html;
pub use source_map::{Position, Range, SourceMap};
pub use span::{Span, SpanError};
pub use tag::{AutoClose, ListStyle, TagCall, TagDescriptor, TagFlags, TagRender};
pub use text::{excerpt, strip_bbcode, textilize};
pub use tokenizer::{TagToken, Token, TokenKind, Tokenizer, parse_tag, tokenize};
