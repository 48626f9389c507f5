//! `@username` mentions.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::escape::{compile_static, escape_no_breaks};

const MENTION_PATTERN: &str = r"(^|[ \n\]])@([-'0-9A-Za-z_\x{C0}-\x{D6}\x{D8}-\x{DD}\x{E0}-\x{F6}\x{F9}-\x{FD}\x{FF}]+)";

static MENTION: Lazy<Option<Regex>> = Lazy::new(|| compile_static(MENTION_PATTERN));

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct UserHandle {
    pub id: u64,
    pub username: String,
}

/// Resolves mentioned names to users. Lookups must not block: load the user table
/// before rendering.
pub trait UserDirectory: Send + Sync {
    fn resolve_user(&self, name: &str) -> Option<UserHandle>;
}

impl<F> UserDirectory for F
where
    F: Fn(&str) -> Option<UserHandle> + Send + Sync,
{
    fn resolve_user(&self, name: &str) -> Option<UserHandle> {
        self(name)
    }
}

/// An in-memory directory keyed by exact username.
#[derive(Clone, Debug, Default)]
pub struct KnownUsers {
    users: HashMap<String, UserHandle>,
}

impl KnownUsers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, user: UserHandle) {
        self.users.insert(user.username.clone(), user);
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl FromIterator<UserHandle> for KnownUsers {
    fn from_iter<T: IntoIterator<Item = UserHandle>>(iter: T) -> Self {
        let mut users = KnownUsers::new();
        for user in iter {
            users.insert(user);
        }
        users
    }
}

impl UserDirectory for KnownUsers {
    fn resolve_user(&self, name: &str) -> Option<UserHandle> {
        self.users.get(name).cloned()
    }
}

/// Wraps mentions of known users in a `user-tag` element. Unknown names stay as written.
pub fn tag_mentions(text: &str, users: &dyn UserDirectory) -> String {
    let Some(mention) = MENTION.as_ref() else {
        return text.to_string();
    };
    mention
        .replace_all(text, |caps: &Captures| {
            let name = &caps[2];
            match users.resolve_user(name) {
                Some(_) => format!(
                    "{}<u class=\"user-tag\">@{}</u>",
                    &caps[1],
                    escape_no_breaks(name)
                ),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Distinct known users mentioned in `markup`, in order of first mention.
pub fn mentioned_users(markup: &str, users: &dyn UserDirectory) -> Vec<UserHandle> {
    let Some(mention) = MENTION.as_ref() else {
        return Vec::new();
    };
    let mut seen = HashSet::new();
    mention
        .captures_iter(markup)
        .filter_map(|caps| {
            let name = caps.get(2)?.as_str();
            if !seen.insert(name.to_string()) {
                return None;
            }
            users.resolve_user(name)
        })
        .collect()
}
