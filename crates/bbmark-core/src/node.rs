use crate::span::Span;
use crate::tag::TagDescriptor;

/// One entry of a compiled render-node list.
#[derive(Clone, Debug)]
pub(crate) enum Node {
    /// Literal text: `raw` as written, `html` escaped for output.
    Text { raw: String, html: String },
    /// Structural markup inserted by the builder (paragraph breaks).
    Markup(&'static str),
    /// Deferred open call. `segment_end` indexes the close node of the same segment.
    Open { instance: usize, segment_end: usize },
    Close { instance: usize },
}

/// A tag occurrence. One instance spans from its opening token to its matching close, even
/// when overlap repair splits its output into several open/close segments.
#[derive(Clone, Debug)]
pub(crate) struct TagInstance<'r> {
    pub(crate) name: String,
    pub(crate) descriptor: &'r TagDescriptor,
    pub(crate) params: String,
    pub(crate) token: Span,
    pub(crate) close_pos: Option<usize>,
    pub(crate) open_node: usize,
    pub(crate) close_node: Option<usize>,
    pub(crate) last_close: Option<usize>,
    pub(crate) segment_open: Option<usize>,
    pub(crate) strip_first_newline: bool,
}

impl TagInstance<'_> {
    pub(crate) fn contents_span(&self, source_len: usize) -> Span {
        let end = self.close_pos.unwrap_or(source_len).max(self.token.end);
        Span {
            start: self.token.end,
            end,
        }
    }

    pub(crate) fn outer_span(&self, source_len: usize) -> Span {
        Span {
            start: self.token.start,
            end: self.contents_span(source_len).end,
        }
    }
}

/// The output of the first render phase: normalized markup plus the ordered node list
/// that the second phase executes.
#[derive(Clone, Debug)]
pub struct NodeList<'r> {
    pub(crate) source: String,
    pub(crate) nodes: Vec<Node>,
    pub(crate) instances: Vec<TagInstance<'r>>,
}

impl<'r> NodeList<'r> {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of tag instances (matched or force-closed tags).
    pub fn tag_count(&self) -> usize {
        self.instances.len()
    }

    /// The markup the list was compiled from, after input normalization.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Checks that every instance's open node precedes its close node and that every
    /// open node points at a close node of the same instance.
    pub fn is_well_formed(&self) -> bool {
        let instances_ok = self.instances.iter().all(|instance| {
            instance
                .close_node
                .is_some_and(|close| instance.open_node < close)
        });
        let segments_ok = self.nodes.iter().enumerate().all(|(idx, node)| match node {
            Node::Open {
                instance,
                segment_end,
            } => {
                *segment_end > idx
                    && matches!(
                        self.nodes.get(*segment_end),
                        Some(Node::Close { instance: closing }) if closing == instance
                    )
            }
            _ => true,
        });
        instances_ok && segments_ok
    }
}
