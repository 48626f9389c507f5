use thiserror::Error;

use crate::span::Span;

/// Why a single tag rendered as nothing.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TagError {
    #[error("empty url")]
    EmptyUrl,
    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("scheme {scheme:?} is not allowed")]
    DisallowedScheme { scheme: String },
    #[error("url {url:?} has no host")]
    MissingHost { url: String },
    #[error("invalid size {0:?}")]
    InvalidSize(String),
    #[error("invalid color {0:?}")]
    InvalidColor(String),
    #[error("{0}")]
    Custom(String),
}

/// Raised by the HTML-aware text filter on input it cannot tokenize.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum FilterError {
    #[error("unterminated html tag at byte {offset}")]
    UnterminatedTag { offset: usize },
}

/// Failures surfaced by the strict entry points. The lenient entry points log these and
/// carry on.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("[{tag}] at {span:?}: {source}")]
    Tag {
        tag: String,
        span: Span,
        #[source]
        source: TagError,
    },
    #[error("html filter failed: {0}")]
    Filter(#[from] FilterError),
    #[error("html cleanup failed: {0}")]
    Cleanup(#[from] Box<fancy_regex::Error>),
    #[error("built-in pattern {0:?} is unavailable")]
    Pattern(&'static str),
}

impl RenderError {
    /// Location of the offending markup, for errors tied to a tag.
    pub fn span(&self) -> Option<Span> {
        match self {
            RenderError::Tag { span, .. } => Some(*span),
            _ => None,
        }
    }
}
