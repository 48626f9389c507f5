use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Markup language a piece of content is written in.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Dialect {
    /// Square-bracket tags.
    #[default]
    BbCode,
    /// Escaped text with line breaks, nothing else.
    Plain,
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("unknown markup dialect {0:?} (expected \"bbcode\" or \"plain\")")]
pub struct DialectError(pub String);

impl FromStr for Dialect {
    type Err = DialectError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "bbcode" => Ok(Dialect::BbCode),
            "plain" | "text" => Ok(Dialect::Plain),
            _ => Err(DialectError(value.to_string())),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Dialect::BbCode => "bbcode",
            Dialect::Plain => "plain",
        })
    }
}
