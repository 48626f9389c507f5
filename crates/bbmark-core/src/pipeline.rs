//! Content rendering by dialect: markup, then mentions and emoticons over the HTML.

use std::fmt;
use std::sync::Arc;

use crate::dialect::Dialect;
use crate::emoticons::EmoticonTable;
use crate::error::RenderError;
use crate::escape::escape;
use crate::filter::{DEFAULT_EXCLUDED_TAGS, filter_text};
use crate::legacy::rewrite_legacy_tags;
use crate::mentions::{UserDirectory, UserHandle, mentioned_users, tag_mentions};
use crate::options::RenderOptions;
use crate::render::{Markup, Rendered};

/// Renders user content the way posts, messages and previews are displayed.
#[derive(Clone, Default)]
pub struct ContentRenderer {
    markup: Markup,
    emoticons: Option<Arc<EmoticonTable>>,
    users: Option<Arc<dyn UserDirectory>>,
}

impl fmt::Debug for ContentRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentRenderer")
            .field("markup", &self.markup)
            .field("emoticons", &self.emoticons.as_ref().map(|table| table.len()))
            .field("users", &self.users.is_some())
            .finish()
    }
}

impl ContentRenderer {
    pub fn new(markup: Markup) -> Self {
        Self {
            markup,
            emoticons: None,
            users: None,
        }
    }

    /// Standard tags without typographic replacements, as forum posts render.
    pub fn forum() -> Self {
        Self::new(Markup::standard().with_options(RenderOptions {
            cosmetic_replace: false,
            ..RenderOptions::default()
        }))
    }

    pub fn with_emoticons(mut self, table: EmoticonTable) -> Self {
        self.emoticons = Some(Arc::new(table));
        self
    }

    pub fn with_users(mut self, users: impl UserDirectory + 'static) -> Self {
        self.users = Some(Arc::new(users));
        self
    }

    pub fn markup(&self) -> &Markup {
        &self.markup
    }

    pub fn render(&self, text: &str, dialect: Dialect) -> String {
        self.render_document(text, dialect).html
    }

    /// Never fails; a failing filter pass is logged and skipped.
    pub fn render_document(&self, text: &str, dialect: Dialect) -> Rendered {
        match dialect {
            Dialect::Plain => plain(text),
            Dialect::BbCode => {
                let markup = rewrite_legacy_tags(text);
                let mut rendered = self.markup.render_document(&markup);
                rendered.html = match self.post_process(&rendered.html) {
                    Ok(html) => html,
                    Err(err) => {
                        log::warn!("mention and emoticon pass skipped: {err}");
                        rendered.html
                    }
                };
                rendered
            }
        }
    }

    pub fn try_render(&self, text: &str, dialect: Dialect) -> Result<Rendered, RenderError> {
        match dialect {
            Dialect::Plain => Ok(plain(text)),
            Dialect::BbCode => {
                let markup = rewrite_legacy_tags(text);
                let mut rendered = self.markup.try_render(&markup)?;
                rendered.html = self.post_process(&rendered.html)?;
                Ok(rendered)
            }
        }
    }

    /// Known users mentioned in `text`, without duplicates.
    pub fn mentioned_users(&self, text: &str) -> Vec<UserHandle> {
        match &self.users {
            Some(users) => mentioned_users(text, users.as_ref()),
            None => Vec::new(),
        }
    }

    fn post_process(&self, html: &str) -> Result<String, RenderError> {
        let mut html = html.to_string();
        if let Some(users) = &self.users {
            html = filter_text(&html, DEFAULT_EXCLUDED_TAGS, |text| {
                tag_mentions(text, users.as_ref())
            })?;
        }
        if let Some(table) = &self.emoticons {
            html = filter_text(&html, DEFAULT_EXCLUDED_TAGS, |text| table.replace(text))?;
        }
        Ok(html)
    }
}

fn plain(text: &str) -> Rendered {
    Rendered {
        html: escape(&text.replace("\r\n", "\n")),
        ..Rendered::default()
    }
}
