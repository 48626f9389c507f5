//! Emoticon substitution over rendered text.

use regex::{Captures, Regex};
use url::form_urlencoded::byte_serialize;

use crate::escape::escape_no_breaks;

// `:/` goes first so the slashes of `http://` never turn into other emoticons.
const BOF: (&str, &str) = (r":-?/", "bof");

const SPECIAL: &[(&str, &str)] = &[
    (r":-?\)", "special-smile"),
    (r";-?\)", "special-wink"),
    (r":-?\(", "special-sad"),
    (r":o", "-o"),
    (r":-?D", "green"),
    (r":-?v", "v"),
    (r":\?:", "special-question"),
    (r":\?\?\?:", "special-3question"),
    (r":jap:", "respect"),
    (r":clap:", "bravo"),
];

/// Compiled emoticon patterns, built once from the available image names.
#[derive(Clone, Debug)]
pub struct EmoticonTable {
    pattern: Regex,
    images: Vec<String>,
}

impl EmoticonTable {
    /// `names` are image basenames (without `.gif`) found under `{static_url}img/smileys/`.
    /// Every name not starting with `special-` is reachable as `:name:`.
    pub fn new<I, S>(static_url: &str, names: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rules: Vec<(String, String)> = vec![(BOF.0.to_string(), BOF.1.to_string())];
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() || name.starts_with("special-") {
                continue;
            }
            rules.push((format!(":{}:", regex::escape(name)), name.to_string()));
        }
        rules.extend(
            SPECIAL
                .iter()
                .map(|(pattern, name)| (pattern.to_string(), name.to_string())),
        );

        let alternation = rules
            .iter()
            .map(|(pattern, _)| format!("({pattern})"))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&alternation)?;
        let images = rules
            .iter()
            .map(|(_, name)| {
                let encoded: String = byte_serialize(name.as_bytes()).collect();
                format!(
                    "<img class=\"smiley\" src=\"{}img/smileys/{}.gif\"/>",
                    escape_no_breaks(static_url),
                    encoded
                )
            })
            .collect();
        log::debug!("emoticon table compiled with {} rules", rules.len());
        Ok(Self { pattern, images })
    }

    /// Replaces emoticons in a run of text.
    pub fn replace(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, |caps: &Captures| {
                (1..caps.len())
                    .find(|group| caps.get(*group).is_some())
                    .and_then(|group| self.images.get(group - 1))
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
