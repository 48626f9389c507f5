use std::collections::{BTreeMap, HashMap};

/// Nesting counter shared by every tag that renders an anchor.
pub const LINK_KIND: &str = "link";
/// Nesting counter shared by every list tag.
pub const LIST_KIND: &str = "list";

/// Mutable state of one render. Tag behaviors read and update it while the node list is
/// executed; nothing in it outlives the render.
#[derive(Debug, Default)]
pub struct RenderContext {
    nesting: HashMap<String, usize>,
    sections: BTreeMap<String, Vec<String>>,
    pending_close: HashMap<usize, String>,
    pub(crate) no_breaks: usize,
    pub(crate) list_item_pending: bool,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bumps the counter for `kind` and returns the new depth.
    pub fn enter(&mut self, kind: &str) -> usize {
        let depth = self.nesting.entry(kind.to_string()).or_insert(0);
        *depth += 1;
        *depth
    }

    /// Drops the counter for `kind` and returns the remaining depth.
    pub fn leave(&mut self, kind: &str) -> usize {
        match self.nesting.get_mut(kind) {
            Some(depth) => {
                *depth = depth.saturating_sub(1);
                *depth
            }
            None => 0,
        }
    }

    pub fn depth(&self, kind: &str) -> usize {
        self.nesting.get(kind).copied().unwrap_or(0)
    }

    pub fn add_section(&mut self, name: impl Into<String>, contents: impl Into<String>) {
        self.sections
            .entry(name.into())
            .or_default()
            .push(contents.into());
    }

    pub fn sections(&self) -> &BTreeMap<String, Vec<String>> {
        &self.sections
    }

    pub(crate) fn take_sections(&mut self) -> BTreeMap<String, Vec<String>> {
        std::mem::take(&mut self.sections)
    }

    /// Remembers the markup that closes the tag instance `instance`.
    pub fn set_close(&mut self, instance: usize, html: impl Into<String>) {
        self.pending_close.insert(instance, html.into());
    }

    pub fn take_close(&mut self, instance: usize) -> Option<String> {
        self.pending_close.remove(&instance)
    }

    /// Depth of the no-breaks regions enclosing the text being compiled.
    pub fn no_breaks(&self) -> usize {
        self.no_breaks
    }
}

#[cfg(test)]
mod tests {
    use super::{LINK_KIND, RenderContext};

    #[test]
    fn nesting_counters_are_per_kind() {
        let mut ctx = RenderContext::new();
        assert_eq!(ctx.enter(LINK_KIND), 1);
        assert_eq!(ctx.enter(LINK_KIND), 2);
        assert_eq!(ctx.enter("strong"), 1);
        assert_eq!(ctx.leave(LINK_KIND), 1);
        assert_eq!(ctx.depth("strong"), 1);
        assert_eq!(ctx.leave("em"), 0);
    }

    #[test]
    fn pending_close_is_taken_once() {
        let mut ctx = RenderContext::new();
        ctx.set_close(3, "</a>");
        assert_eq!(ctx.take_close(3).as_deref(), Some("</a>"));
        assert_eq!(ctx.take_close(3), None);
    }

    #[test]
    fn sections_keep_insertion_order_per_name() {
        let mut ctx = RenderContext::new();
        ctx.add_section("sidebar", "one");
        ctx.add_section("sidebar", "two");
        assert_eq!(ctx.sections()["sidebar"], vec!["one", "two"]);
    }
}
